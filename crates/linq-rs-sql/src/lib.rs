//! # linq-rs-sql
//!
//! Expression-to-SQL compiler for linq-rs. Callers compose a typed
//! [`Query`](query::Query) chain over an [`Entity`](schema::Entity)-mapped
//! type; the [`SqlCompiler`](compiler::SqlCompiler) translates the chain
//! into parameterized SQL for a target [`Dialect`](dialect::Dialect).
//!
//! ## Architecture
//!
//! Everything is lazy until compilation. Building a chain allocates nodes
//! and eagerly evaluates captured values into literals, but touches no
//! database; `compile` decomposes the chain, translates each predicate and
//! projection into SQL fragments with sequentially numbered parameters, and
//! assembles one statement. Joins and grouped chains compile through their
//! dedicated planners. Compilation is pure and synchronous; sending the
//! resulting [`CompiledSql`](compiler::CompiledSql) is the job of a
//! [`SqlExecutor`](executor::SqlExecutor) implementation.
//!
//! ## Module Overview
//!
//! - [`schema`] - The [`Entity`](schema::Entity) trait and static column metadata
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`expr`] - The lowered expression tree and its builders
//! - [`query`] - The operation chain and its decomposer
//! - [`dialect`] - Backend syntax descriptors
//! - [`translate`] - Expression-to-fragment translation
//! - [`compiler`] - Single-source statement assembly
//! - [`join`] - The two-source join planner
//! - [`group`] - The two-stage group/aggregate planner
//! - [`executor`] - The async execution seam and row materialization

// These clippy lints are intentionally allowed for the compiler crate:
// - result_large_err: LinqError is the framework error type and should be used consistently
// - format_push_string: format! with push_str is clearer than write! for SQL generation
// - doc_markdown: backtick requirements for documentation items are too strict
// - return_self_not_must_use: builder pattern methods are self-documenting
#![allow(clippy::result_large_err)]
#![allow(clippy::format_push_string)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::match_same_arms)]

pub mod compiler;
pub mod dialect;
pub mod executor;
pub mod expr;
pub mod group;
pub mod join;
pub mod query;
pub mod schema;
pub mod translate;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use compiler::{CompiledSql, SqlCompiler};
pub use dialect::{Dialect, PagingStyle};
pub use executor::{fetch_all, FromRow, FromValue, Row, SqlExecutor};
pub use expr::{col, inner_col, val, CompareOp, Expr, LogicOp, Source, StrFunc};
pub use group::{AggregateFunc, AggregateSpec, GroupPlan};
pub use join::{JoinKind, JoinQuery};
pub use query::{Decomposed, Grouping, Query, QueryOp};
pub use schema::{ColumnDef, Entity, EntityMeta};
pub use value::Value;
