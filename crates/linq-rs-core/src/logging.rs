//! Logging integration for linq-rs.
//!
//! Provides helpers for configuring [`tracing`]-based logging and for
//! creating per-compilation spans. Compilation is pure and synchronous, so
//! the only events the library emits are debug-level records of each
//! generated statement.

/// Sets up the global tracing subscriber.
///
/// The filter directive follows the `tracing_subscriber::EnvFilter` syntax
/// (e.g. `"info"`, `"linq_rs_sql=debug"`). With `pretty` set, a
/// human-readable format is used; otherwise structured JSON output.
///
/// Installing a subscriber when one is already set is a no-op.
pub fn setup_logging(filter: &str, pretty: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    if pretty {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span covering one query compilation.
///
/// # Examples
///
/// ```
/// use linq_rs_core::logging::compile_span;
///
/// let span = compile_span("User");
/// let _guard = span.enter();
/// tracing::debug!("compiling query");
/// ```
pub fn compile_span(entity: &str) -> tracing::Span {
    tracing::debug_span!("compile", entity = entity)
}
