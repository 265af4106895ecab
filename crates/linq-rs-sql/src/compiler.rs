//! The statement assembler: chain in, parameterized SQL out.
//!
//! [`SqlCompiler`] pairs a [`Dialect`] with a [`NamingConvention`] and turns
//! a decomposed query chain into a single parameterized `SELECT`. Clause
//! order is fixed: select list, `FROM`, `WHERE`, `ORDER BY`, paging. Every
//! literal becomes a bound parameter; no user-supplied value is ever spliced
//! into the SQL text.
//!
//! # Examples
//!
//! ```
//! use linq_rs_core::naming::NamingConvention;
//! use linq_rs_sql::compiler::SqlCompiler;
//! use linq_rs_sql::dialect::Dialect;
//! use linq_rs_sql::expr::{col, val};
//! use linq_rs_sql::query::Query;
//! # use std::sync::LazyLock;
//! # use linq_rs_sql::schema::{ColumnDef, Entity, EntityMeta};
//! # struct User;
//! # impl Entity for User {
//! #     fn meta() -> &'static EntityMeta {
//! #         static META: LazyLock<EntityMeta> = LazyLock::new(|| EntityMeta {
//! #             entity_name: "User",
//! #             explicit_table: None,
//! #             columns: vec![ColumnDef::new("UserId").primary_key(), ColumnDef::new("Age")],
//! #         });
//! #         &META
//! #     }
//! # }
//!
//! let compiler = SqlCompiler::new(Dialect::sqlite(), NamingConvention::SnakeCase);
//! let query = Query::<User>::new().filter(col("Age").gt(val(18)));
//! let compiled = compiler.compile(&query)?;
//! assert_eq!(compiled.text, "SELECT * FROM \"user\" WHERE \"age\" > @p0");
//! # Ok::<(), linq_rs_core::error::LinqError>(())
//! ```

use linq_rs_core::error::{LinqError, LinqResult};
use linq_rs_core::logging::compile_span;
use linq_rs_core::naming::NamingConvention;

use crate::dialect::Dialect;
use crate::expr::Expr;
use crate::query::{Decomposed, Query};
use crate::schema::{Entity, EntityMeta};
use crate::translate::{translate, ParamSink, SourceBinding};
use crate::value::Value;

/// A finished statement: SQL text plus its ordered parameters.
///
/// Parameter names are plain (`p0`, `p1`, ...); the text refers to them with
/// the `@` prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    /// The parameterized SQL text.
    pub text: String,
    /// Bound parameters in placeholder order.
    pub parameters: Vec<(String, Value)>,
}

/// Compiles query chains into parameterized SQL for one dialect and naming
/// convention.
///
/// The compiler is stateless across calls: every compilation allocates its
/// own parameter sequence starting at `p0`.
#[derive(Debug, Clone)]
pub struct SqlCompiler {
    pub(crate) dialect: Dialect,
    pub(crate) convention: NamingConvention,
}

impl SqlCompiler {
    /// Creates a compiler for the given dialect and naming convention.
    pub const fn new(dialect: Dialect, convention: NamingConvention) -> Self {
        Self {
            dialect,
            convention,
        }
    }

    /// Compiles a single-source chain into one `SELECT` statement.
    ///
    /// Grouped chains are refused here; they compile to two statements via
    /// [`compile_group`](Self::compile_group).
    pub fn compile<E: Entity>(&self, query: &Query<E>) -> LinqResult<CompiledSql> {
        let meta = E::meta();
        let span = compile_span(meta.entity_name);
        let _guard = span.enter();

        let shape = query.decompose();
        if shape.group.is_some() {
            return Err(LinqError::unsupported_projection(
                "grouped chains compile through compile_group",
            ));
        }

        let binding = SourceBinding::single(meta, &self.dialect, self.convention);
        let mut params = ParamSink::new();

        let select_list = match &shape.projection {
            Some(projection) => self.projection_list(projection, meta)?,
            None => "*".to_string(),
        };

        let mut text = format!(
            "SELECT {select_list} FROM {}",
            self.dialect.quote_qualified(&meta.table_name(self.convention))
        );
        if let Some(clause) = where_clause(&shape, &binding, &mut params)? {
            text.push_str(" WHERE ");
            text.push_str(&clause);
        }
        if let Some(clause) = self.order_clause(&shape, meta) {
            text.push_str(" ORDER BY ");
            text.push_str(&clause);
        }
        if let Some(clause) = self.paging(&shape) {
            text.push(' ');
            text.push_str(&clause);
        }

        let compiled = CompiledSql {
            text,
            parameters: params.into_parameters(),
        };
        tracing::debug!(
            dialect = self.dialect.name,
            sql = %compiled.text,
            params = compiled.parameters.len(),
            "compiled query"
        );
        Ok(compiled)
    }

    /// Renders a single-source projection as a select list.
    ///
    /// A bare member projects one column; a record projects each binding as
    /// `column AS alias`. Anything else is not a projectable shape.
    fn projection_list(&self, projection: &Expr, meta: &EntityMeta) -> LinqResult<String> {
        match projection {
            Expr::Member { member, .. } => Ok(self
                .dialect
                .quote_qualified(&meta.column_name(member, self.convention))),
            Expr::Record { bindings } => {
                let mut items = Vec::with_capacity(bindings.len());
                for (alias, bound) in bindings {
                    let Expr::Member { member, .. } = bound else {
                        return Err(LinqError::unsupported_projection(format!(
                            "record binding '{alias}' is not a member access"
                        )));
                    };
                    items.push(format!(
                        "{} AS {}",
                        self.dialect
                            .quote_qualified(&meta.column_name(member, self.convention)),
                        self.dialect.quote(alias)
                    ));
                }
                Ok(items.join(", "))
            }
            other => Err(LinqError::unsupported_projection(format!(
                "{} node cannot shape a result row",
                other.node_kind()
            ))),
        }
    }

    /// Renders the `ORDER BY` clause body from the first collected sort key.
    ///
    /// Secondary keys are collected by the decomposer but not emitted.
    fn order_clause(&self, shape: &Decomposed, meta: &EntityMeta) -> Option<String> {
        let (member, ascending) = shape.sort_keys.first()?;
        let column = self
            .dialect
            .quote_qualified(&meta.column_name(member, self.convention));
        let direction = if *ascending { "ASC" } else { "DESC" };
        Some(format!("{column} {direction}"))
    }

    /// Renders the paging clause. Skip without take pages with the
    /// dialect's unbounded sentinel; take without skip starts at row zero.
    pub(crate) fn paging(&self, shape: &Decomposed) -> Option<String> {
        match (shape.skip, shape.take) {
            (None, None) => None,
            (skip, take) => Some(self.dialect.paging_clause(skip.unwrap_or(0), take)),
        }
    }
}

/// Renders the `WHERE` clause body, if any filters were composed.
///
/// A single filter renders bare; multiple filters are each parenthesized and
/// conjoined with `AND`. A fragment produced by a logical combinator already
/// carries its own parentheses and is not wrapped again.
pub(crate) fn where_clause(
    shape: &Decomposed,
    binding: &SourceBinding,
    params: &mut ParamSink,
) -> LinqResult<Option<String>> {
    if shape.filters.is_empty() {
        return Ok(None);
    }
    if let [only] = shape.filters.as_slice() {
        return translate(only, binding, params).map(Some);
    }
    let mut parts = Vec::with_capacity(shape.filters.len());
    for filter in &shape.filters {
        let fragment = translate(filter, binding, params)?;
        if matches!(filter, Expr::Logic { .. }) {
            parts.push(fragment);
        } else {
            parts.push(format!("({fragment})"));
        }
    }
    Ok(Some(parts.join(" AND ")))
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::expr::{col, val};
    use crate::schema::ColumnDef;

    struct User;

    impl Entity for User {
        fn meta() -> &'static EntityMeta {
            static META: LazyLock<EntityMeta> = LazyLock::new(|| EntityMeta {
                entity_name: "User",
                explicit_table: None,
                columns: vec![
                    ColumnDef::new("UserId").primary_key().auto_generated(),
                    ColumnDef::new("Name"),
                    ColumnDef::new("Age"),
                    ColumnDef::new("SessionToken").ignored(),
                ],
            });
            &META
        }
    }

    fn sqlite() -> SqlCompiler {
        SqlCompiler::new(Dialect::sqlite(), NamingConvention::SnakeCase)
    }

    fn mysql() -> SqlCompiler {
        SqlCompiler::new(Dialect::mysql(), NamingConvention::SnakeCase)
    }

    #[test]
    fn test_bare_chain_selects_all() {
        let compiled = sqlite().compile(&Query::<User>::new()).unwrap();
        assert_eq!(compiled.text, "SELECT * FROM \"user\"");
        assert!(compiled.parameters.is_empty());
    }

    #[test]
    fn test_single_filter_has_no_outer_parens() {
        let query = Query::<User>::new().filter(col("Age").gt(val(18)));
        let compiled = sqlite().compile(&query).unwrap();
        assert_eq!(compiled.text, "SELECT * FROM \"user\" WHERE \"age\" > @p0");
        assert_eq!(compiled.parameters, vec![("p0".to_string(), Value::Int(18))]);
    }

    #[test]
    fn test_sequential_filters_are_parenthesized_and_conjoined() {
        let query = Query::<User>::new()
            .filter(col("Age").gt(val(18)))
            .filter(col("Name").starts_with("A"));
        let compiled = sqlite().compile(&query).unwrap();
        assert_eq!(
            compiled.text,
            "SELECT * FROM \"user\" WHERE (\"age\" > @p0) AND (\"name\" LIKE @p1)"
        );
        assert_eq!(
            compiled.parameters,
            vec![
                ("p0".to_string(), Value::Int(18)),
                ("p1".to_string(), Value::String("A%".to_string())),
            ]
        );
    }

    #[test]
    fn test_logic_filter_is_not_double_wrapped() {
        let query = Query::<User>::new()
            .filter(col("Age").gt(val(18)) | col("Age").lt(val(10)))
            .filter(col("Name").eq(val("x")));
        let compiled = sqlite().compile(&query).unwrap();
        assert_eq!(
            compiled.text,
            "SELECT * FROM \"user\" WHERE (\"age\" > @p0 OR \"age\" < @p1) AND (\"name\" = @p2)"
        );
    }

    #[test]
    fn test_full_pipeline_sqlite() {
        let query = Query::<User>::new()
            .filter(col("Age").gt(val(18)))
            .order_by("Name")
            .skip(5)
            .take(10);
        let compiled = sqlite().compile(&query).unwrap();
        assert_eq!(
            compiled.text,
            "SELECT * FROM \"user\" WHERE \"age\" > @p0 ORDER BY \"name\" ASC LIMIT 10 OFFSET 5"
        );
    }

    #[test]
    fn test_full_pipeline_mysql() {
        let query = Query::<User>::new()
            .filter(col("Age").gt(val(18)))
            .order_by("Name")
            .skip(5)
            .take(10);
        let compiled = mysql().compile(&query).unwrap();
        assert_eq!(
            compiled.text,
            "SELECT * FROM `user` WHERE `age` > @p0 ORDER BY `name` ASC LIMIT 5, 10"
        );
    }

    #[test]
    fn test_only_first_sort_key_is_emitted() {
        let query = Query::<User>::new().order_by("Name").then_by_desc("Age");
        let compiled = sqlite().compile(&query).unwrap();
        assert_eq!(
            compiled.text,
            "SELECT * FROM \"user\" ORDER BY \"name\" ASC"
        );
    }

    #[test]
    fn test_order_by_desc() {
        let query = Query::<User>::new().order_by_desc("Age");
        let compiled = sqlite().compile(&query).unwrap();
        assert_eq!(
            compiled.text,
            "SELECT * FROM \"user\" ORDER BY \"age\" DESC"
        );
    }

    #[test]
    fn test_take_without_skip_starts_at_zero() {
        let compiled = sqlite().compile(&Query::<User>::new().take(10)).unwrap();
        assert_eq!(compiled.text, "SELECT * FROM \"user\" LIMIT 10 OFFSET 0");
    }

    #[test]
    fn test_skip_without_take_uses_unbounded_sentinel() {
        let compiled = sqlite().compile(&Query::<User>::new().skip(20)).unwrap();
        assert_eq!(compiled.text, "SELECT * FROM \"user\" LIMIT -1 OFFSET 20");

        let compiled = mysql().compile(&Query::<User>::new().skip(20)).unwrap();
        assert_eq!(
            compiled.text,
            "SELECT * FROM `user` LIMIT 20, 18446744073709551615"
        );
    }

    #[test]
    fn test_member_projection() {
        let query = Query::<User>::new().select(col("Name"));
        let compiled = sqlite().compile(&query).unwrap();
        assert_eq!(compiled.text, "SELECT \"name\" FROM \"user\"");
    }

    #[test]
    fn test_record_projection_aliases() {
        let query = Query::<User>::new().select(Expr::record(vec![
            ("Id", col("UserId")),
            ("Who", col("Name")),
        ]));
        let compiled = sqlite().compile(&query).unwrap();
        assert_eq!(
            compiled.text,
            "SELECT \"user_id\" AS \"Id\", \"name\" AS \"Who\" FROM \"user\""
        );
    }

    #[test]
    fn test_literal_projection_rejected() {
        let query = Query::<User>::new().select(val(1));
        let err = sqlite().compile(&query).unwrap_err();
        assert!(matches!(err, LinqError::UnsupportedProjection { .. }));
    }

    #[test]
    fn test_grouped_chain_refused() {
        let query = Query::<User>::new().group_by("Age");
        let err = sqlite().compile(&query).unwrap_err();
        assert!(matches!(err, LinqError::UnsupportedProjection { .. }));
    }

    #[test]
    fn test_parameters_restart_per_compilation() {
        let compiler = sqlite();
        let query = Query::<User>::new().filter(col("Age").gt(val(1)));
        let first = compiler.compile(&query).unwrap();
        let second = compiler.compile(&query).unwrap();
        assert_eq!(first.parameters[0].0, "p0");
        assert_eq!(second.parameters[0].0, "p0");
    }

    #[test]
    fn test_explicit_table_override() {
        struct Audit;
        impl Entity for Audit {
            fn meta() -> &'static EntityMeta {
                static META: LazyLock<EntityMeta> = LazyLock::new(|| EntityMeta {
                    entity_name: "Audit",
                    explicit_table: Some("ops.audit_log"),
                    columns: vec![ColumnDef::new("Id").primary_key()],
                });
                &META
            }
        }
        let compiled = sqlite().compile(&Query::<Audit>::new()).unwrap();
        assert_eq!(compiled.text, "SELECT * FROM \"ops\".\"audit_log\"");
    }
}
