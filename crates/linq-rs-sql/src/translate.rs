//! Rendering a single expression tree into a SQL fragment.
//!
//! [`translate`] walks one lowered [`Expr`] and produces a SQL fragment plus
//! the parameters it binds. Member accesses resolve to quoted column
//! identifiers through a [`SourceBinding`]; literals allocate sequential
//! placeholders through a [`ParamSink`]. The match over node kinds is
//! exhaustive: anything outside the translatable sublanguage fails with
//! [`LinqError::UnsupportedExpression`] naming the node kind, and a failed
//! translation never leaves a partial fragment behind.

use linq_rs_core::error::{LinqError, LinqResult};
use linq_rs_core::naming::NamingConvention;

use crate::dialect::Dialect;
use crate::expr::{Expr, Source};
use crate::schema::EntityMeta;
use crate::value::Value;

/// Allocates sequential placeholders (`@p0`, `@p1`, ...) and accumulates
/// their bound values.
///
/// Placeholder names are unique within one compiled statement, not across
/// statements.
#[derive(Debug, Default)]
pub struct ParamSink {
    params: Vec<(String, Value)>,
}

impl ParamSink {
    /// Creates an empty sink.
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Binds a value to the next placeholder and returns the placeholder
    /// text to splice into the SQL fragment.
    pub fn bind(&mut self, value: Value) -> String {
        let name = format!("p{}", self.params.len());
        let placeholder = format!("@{name}");
        self.params.push((name, value));
        placeholder
    }

    /// Returns the number of bound parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if no parameters have been bound.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Consumes the sink, yielding the ordered name/value pairs.
    pub fn into_parameters(self) -> Vec<(String, Value)> {
        self.params
    }
}

/// One bound source: its metadata and the table alias (if any) its columns
/// are qualified with.
#[derive(Debug)]
struct BoundSource<'a> {
    meta: &'a EntityMeta,
    alias: Option<&'static str>,
}

/// Maps each logical source of a query to metadata and an optional alias.
///
/// Single-source queries render members as bare quoted columns; joins
/// qualify them with the `o`/`i` aliases.
#[derive(Debug)]
pub struct SourceBinding<'a> {
    dialect: &'a Dialect,
    convention: NamingConvention,
    outer: BoundSource<'a>,
    inner: Option<BoundSource<'a>>,
}

impl<'a> SourceBinding<'a> {
    /// Binds a single-source query: members render unqualified.
    pub const fn single(
        meta: &'a EntityMeta,
        dialect: &'a Dialect,
        convention: NamingConvention,
    ) -> Self {
        Self {
            dialect,
            convention,
            outer: BoundSource { meta, alias: None },
            inner: None,
        }
    }

    /// Binds a two-source join: the outer source is aliased `o`, the inner
    /// source `i`.
    pub const fn join(
        outer: &'a EntityMeta,
        inner: &'a EntityMeta,
        dialect: &'a Dialect,
        convention: NamingConvention,
    ) -> Self {
        Self {
            dialect,
            convention,
            outer: BoundSource {
                meta: outer,
                alias: Some("o"),
            },
            inner: Some(BoundSource {
                meta: inner,
                alias: Some("i"),
            }),
        }
    }

    /// Renders a member access as a quoted (and possibly alias-qualified)
    /// column reference.
    pub fn column_ref(&self, source: Source, member: &str) -> LinqResult<String> {
        let bound = match source {
            Source::Outer => &self.outer,
            Source::Inner => self.inner.as_ref().ok_or_else(|| {
                // An inner-row member access only makes sense inside a join.
                LinqError::unsupported_expression("Member(inner)")
            })?,
        };
        let column = bound.meta.column_name(member, self.convention);
        let quoted = self.dialect.quote_qualified(&column);
        Ok(bound.alias.map_or(quoted.clone(), |alias| {
            format!("{}.{quoted}", self.dialect.quote(alias))
        }))
    }
}

/// Translates one expression tree into a SQL fragment, binding parameters
/// into `params`.
pub fn translate(expr: &Expr, binding: &SourceBinding, params: &mut ParamSink) -> LinqResult<String> {
    match expr {
        Expr::Member { source, member } => binding.column_ref(*source, member),
        Expr::Literal(value) => Ok(params.bind(value.clone())),
        Expr::Compare { op, left, right } => {
            let left = translate(left, binding, params)?;
            let right = translate(right, binding, params)?;
            Ok(format!("{left} {} {right}", op.sql_symbol()))
        }
        Expr::Logic { op, left, right } => {
            let left = translate(left, binding, params)?;
            let right = translate(right, binding, params)?;
            // Mandatory parentheses: fragments are later conjoined by the
            // decomposer and must not be precedence-sensitive.
            Ok(format!("({left} {} {right})", op.sql_keyword()))
        }
        Expr::StrMatch {
            func,
            receiver,
            pattern,
        } => {
            let receiver = translate(receiver, binding, params)?;
            let Expr::Literal(Value::String(text)) = pattern.as_ref() else {
                return Err(LinqError::unsupported_expression(pattern.node_kind()));
            };
            let placeholder = params.bind(Value::String(func.wrap_pattern(text)));
            Ok(format!("{receiver} LIKE {placeholder}"))
        }
        other @ (Expr::Record { .. } | Expr::Call { .. } | Expr::Arith { .. }) => {
            Err(LinqError::unsupported_expression(other.node_kind()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::expr::{col, inner_col, val};
    use crate::schema::ColumnDef;

    static USER: LazyLock<EntityMeta> = LazyLock::new(|| EntityMeta {
        entity_name: "User",
        explicit_table: None,
        columns: vec![
            ColumnDef::new("UserId").primary_key().auto_generated(),
            ColumnDef::new("Name"),
            ColumnDef::new("Age"),
        ],
    });

    static DIALECT: Dialect = Dialect::sqlite();

    fn binding() -> SourceBinding<'static> {
        SourceBinding::single(&USER, &DIALECT, NamingConvention::SnakeCase)
    }

    #[test]
    fn test_comparison() {
        let mut params = ParamSink::new();
        let sql = translate(&col("Age").gt(val(18)), &binding(), &mut params).unwrap();
        assert_eq!(sql, "\"age\" > @p0");
        assert_eq!(params.into_parameters(), vec![("p0".to_string(), Value::Int(18))]);
    }

    #[test]
    fn test_all_comparison_operators() {
        for (expr, symbol) in [
            (col("Age").eq(1), "="),
            (col("Age").ne(1), "!="),
            (col("Age").gt(1), ">"),
            (col("Age").ge(1), ">="),
            (col("Age").lt(1), "<"),
            (col("Age").le(1), "<="),
        ] {
            let mut params = ParamSink::new();
            let sql = translate(&expr, &binding(), &mut params).unwrap();
            assert_eq!(sql, format!("\"age\" {symbol} @p0"));
        }
    }

    #[test]
    fn test_logic_is_parenthesized() {
        let mut params = ParamSink::new();
        let expr = col("Age").gt(18) & col("Age").lt(65);
        let sql = translate(&expr, &binding(), &mut params).unwrap();
        assert_eq!(sql, "(\"age\" > @p0 AND \"age\" < @p1)");
    }

    #[test]
    fn test_or_is_parenthesized() {
        let mut params = ParamSink::new();
        let expr = col("Name").eq("Alice") | col("Name").eq("Bob");
        let sql = translate(&expr, &binding(), &mut params).unwrap();
        assert_eq!(sql, "(\"name\" = @p0 OR \"name\" = @p1)");
    }

    #[test]
    fn test_contains_wildcards_live_in_parameter() {
        let mut params = ParamSink::new();
        let sql = translate(&col("Name").contains("ru"), &binding(), &mut params).unwrap();
        assert_eq!(sql, "\"name\" LIKE @p0");
        assert!(!sql.contains('%'));
        assert_eq!(
            params.into_parameters(),
            vec![("p0".to_string(), Value::String("%ru%".to_string()))]
        );
    }

    #[test]
    fn test_starts_with_and_ends_with_patterns() {
        let mut params = ParamSink::new();
        translate(&col("Name").starts_with("Al"), &binding(), &mut params).unwrap();
        translate(&col("Name").ends_with("ce"), &binding(), &mut params).unwrap();
        assert_eq!(
            params.into_parameters(),
            vec![
                ("p0".to_string(), Value::String("Al%".to_string())),
                ("p1".to_string(), Value::String("%ce".to_string())),
            ]
        );
    }

    #[test]
    fn test_arithmetic_is_rejected() {
        let mut params = ParamSink::new();
        let expr = (col("Age") + val(1)).gt(val(18));
        let err = translate(&expr, &binding(), &mut params).unwrap_err();
        assert_eq!(
            err,
            LinqError::UnsupportedExpression {
                node_kind: "Arith".to_string()
            }
        );
    }

    #[test]
    fn test_call_is_rejected_in_predicates() {
        let mut params = ParamSink::new();
        let err = translate(&Expr::count(), &binding(), &mut params).unwrap_err();
        assert_eq!(
            err,
            LinqError::UnsupportedExpression {
                node_kind: "Call".to_string()
            }
        );
    }

    #[test]
    fn test_inner_member_rejected_outside_join() {
        let mut params = ParamSink::new();
        let err = translate(
            &inner_col("DeptId").eq(val(1)),
            &binding(),
            &mut params,
        )
        .unwrap_err();
        assert!(matches!(err, LinqError::UnsupportedExpression { .. }));
    }

    #[test]
    fn test_join_binding_qualifies_with_aliases() {
        static DEPT: LazyLock<EntityMeta> = LazyLock::new(|| EntityMeta {
            entity_name: "Department",
            explicit_table: None,
            columns: vec![ColumnDef::new("DeptId").primary_key()],
        });
        let binding =
            SourceBinding::join(&USER, &DEPT, &DIALECT, NamingConvention::SnakeCase);
        let mut params = ParamSink::new();
        let sql = translate(
            &col("Age").gt(val(30)),
            &binding,
            &mut params,
        )
        .unwrap();
        assert_eq!(sql, "\"o\".\"age\" > @p0");
        assert_eq!(
            binding.column_ref(Source::Inner, "DeptId").unwrap(),
            "\"i\".\"dept_id\""
        );
    }

    #[test]
    fn test_explicit_override_with_qualifier_is_split_and_quoted() {
        static AUDIT: LazyLock<EntityMeta> = LazyLock::new(|| EntityMeta {
            entity_name: "Audit",
            explicit_table: None,
            columns: vec![ColumnDef::new("Actor").named("audit.actor_name")],
        });
        let binding = SourceBinding::single(&AUDIT, &DIALECT, NamingConvention::SnakeCase);
        assert_eq!(
            binding.column_ref(Source::Outer, "Actor").unwrap(),
            "\"audit\".\"actor_name\""
        );
    }

    #[test]
    fn test_literal_on_left_side() {
        let mut params = ParamSink::new();
        let sql = translate(&val(18).lt(col("Age")), &binding(), &mut params).unwrap();
        assert_eq!(sql, "@p0 < \"age\"");
    }
}
