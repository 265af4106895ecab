//! # linq-rs-core
//!
//! Foundation crate for linq-rs. Provides the error taxonomy, the naming
//! conventions that map member/type names to SQL identifiers, and logging
//! setup. This crate has no dependency on the compiler itself.
//!
//! ## Modules
//!
//! - [`error`] - Error types and the [`LinqResult`] alias
//! - [`naming`] - Naming conventions ([`NamingConvention`]) and qualifier splitting
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod naming;

// Re-export the most commonly used types at the crate root.
pub use error::{LinqError, LinqResult};
pub use naming::NamingConvention;
