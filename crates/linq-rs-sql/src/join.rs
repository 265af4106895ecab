//! The two-source join planner.
//!
//! A [`JoinQuery`] pairs an outer and an inner entity on a single key
//! equality and projects columns from both rows. The planner aliases the
//! outer source `o` and the inner source `i`, reads the select list from a
//! record projection when one is given, and otherwise falls back to every
//! non-ignored column of both sources with the inner set prefixed to avoid
//! name collisions.
//!
//! Full joins on dialects without native `FULL OUTER JOIN` support lower to
//! a `UNION` of the left-join and right-join renditions with the identical
//! select list. `UNION` (not `UNION ALL`) is used so rows matched on both
//! sides appear exactly once.

use std::marker::PhantomData;

use linq_rs_core::error::LinqResult;

use crate::compiler::{CompiledSql, SqlCompiler};
use crate::expr::{Expr, Source};
use crate::schema::{Entity, EntityMeta};
use crate::translate::SourceBinding;

/// Prefix applied to inner-source columns in the fallback select list.
const INNER_FALLBACK_PREFIX: &str = "inner_";

/// The supported join flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Rows matched on both sides.
    Inner,
    /// All outer rows, matched inner rows or NULLs.
    Left,
    /// All inner rows, matched outer rows or NULLs.
    Right,
    /// All rows from both sides.
    Full,
}

impl JoinKind {
    /// Returns the SQL join keyword.
    pub const fn sql_keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL OUTER JOIN",
        }
    }
}

/// A two-source join: kind, key members, and an optional result projection.
///
/// The ON predicate is always a single equality between the resolved outer
/// and inner key columns; composite and non-equality join predicates are not
/// representable.
#[derive(Debug, Clone)]
pub struct JoinQuery<O: Entity, I: Entity> {
    kind: JoinKind,
    outer_key: String,
    inner_key: String,
    projection: Option<Expr>,
    _sources: PhantomData<(O, I)>,
}

impl<O: Entity, I: Entity> JoinQuery<O, I> {
    /// Creates a join of the given kind on `outer.outer_key = inner.inner_key`.
    pub fn new(kind: JoinKind, outer_key: impl Into<String>, inner_key: impl Into<String>) -> Self {
        Self {
            kind,
            outer_key: outer_key.into(),
            inner_key: inner_key.into(),
            projection: None,
            _sources: PhantomData,
        }
    }

    /// Sets the result projection. Expected to be a field-selecting record
    /// over members of either source; other shapes use the fallback list.
    #[must_use]
    pub fn select(mut self, projection: Expr) -> Self {
        self.projection = Some(projection);
        self
    }
}

impl SqlCompiler {
    /// Compiles a join into one `SELECT` statement, or a `UNION` pair for a
    /// full join the dialect cannot express natively.
    pub fn compile_join<O: Entity, I: Entity>(
        &self,
        join: &JoinQuery<O, I>,
    ) -> LinqResult<CompiledSql> {
        let outer = O::meta();
        let inner = I::meta();
        let binding = SourceBinding::join(outer, inner, &self.dialect, self.convention);

        let select_list = self.join_select_list(join.projection.as_ref(), &binding, outer, inner)?;
        let on_clause = format!(
            "{} = {}",
            binding.column_ref(Source::Outer, &join.outer_key)?,
            binding.column_ref(Source::Inner, &join.inner_key)?,
        );

        let statement = |kind: JoinKind| {
            format!(
                "SELECT {select_list} FROM {} AS {} {} {} AS {} ON {on_clause}",
                self.dialect
                    .quote_qualified(&outer.table_name(self.convention)),
                self.dialect.quote("o"),
                kind.sql_keyword(),
                self.dialect
                    .quote_qualified(&inner.table_name(self.convention)),
                self.dialect.quote("i"),
            )
        };

        let text = if join.kind == JoinKind::Full && !self.dialect.supports_full_outer_join {
            // UNION, not UNION ALL: rows matched on both sides must appear
            // exactly once across the two branches.
            format!(
                "{} UNION {}",
                statement(JoinKind::Left),
                statement(JoinKind::Right)
            )
        } else {
            statement(join.kind)
        };

        tracing::debug!(
            dialect = self.dialect.name,
            kind = join.kind.sql_keyword(),
            sql = %text,
            "compiled join"
        );
        Ok(CompiledSql {
            text,
            parameters: Vec::new(),
        })
    }

    /// Builds the join select list from the projection, or the fallback list
    /// when the projection is absent or not a plain field-selecting record.
    fn join_select_list(
        &self,
        projection: Option<&Expr>,
        binding: &SourceBinding,
        outer: &EntityMeta,
        inner: &EntityMeta,
    ) -> LinqResult<String> {
        if let Some(Expr::Record { bindings }) = projection {
            let mut items = Vec::with_capacity(bindings.len());
            for (alias, bound) in bindings {
                // Any non-member binding makes the whole shape unrecognizable.
                let Expr::Member { source, member } = bound else {
                    items.clear();
                    break;
                };
                items.push(format!(
                    "{} AS {}",
                    binding.column_ref(*source, member)?,
                    self.dialect.quote(alias)
                ));
            }
            if !items.is_empty() {
                return Ok(items.join(", "));
            }
        }
        self.join_fallback_list(binding, outer, inner)
    }

    /// Every non-ignored column of both sources; inner columns carry a fixed
    /// prefix so same-named columns do not collide.
    fn join_fallback_list(
        &self,
        binding: &SourceBinding,
        outer: &EntityMeta,
        inner: &EntityMeta,
    ) -> LinqResult<String> {
        let mut items = Vec::new();
        for column in outer.projectable_columns() {
            items.push(binding.column_ref(Source::Outer, column.member)?);
        }
        for column in inner.projectable_columns() {
            let resolved = inner.column_name(column.member, self.convention);
            items.push(format!(
                "{} AS {}",
                binding.column_ref(Source::Inner, column.member)?,
                self.dialect
                    .quote(&format!("{INNER_FALLBACK_PREFIX}{resolved}"))
            ));
        }
        Ok(items.join(", "))
    }
}
