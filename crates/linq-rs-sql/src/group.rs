//! The group/aggregate planner.
//!
//! Grouping compiles to two statements rather than one. SQL `GROUP BY`
//! cannot return original row shapes alongside aggregates, so stage one
//! selects full rows ordered by the grouping key (the execution collaborator
//! buckets them in memory) and stage two projects the aggregate list with a
//! real `GROUP BY`. Both stages are returned together in a [`GroupPlan`].
//!
//! The stage-two select list is read from the group-result projection: a
//! member bound to the grouping key renders as `key_col AS name`, and a
//! member bound to one of the five recognized aggregate calls renders as
//! `FUNC(col) AS name`. `Count` always emits `COUNT(*)`; any other aggregate
//! without a column argument emits `FUNC(*)`. Anything else fails with
//! `UnsupportedProjection`.

use linq_rs_core::error::{LinqError, LinqResult};

use crate::compiler::{CompiledSql, SqlCompiler};
use crate::expr::{Expr, Source};
use crate::query::Query;
use crate::schema::{Entity, EntityMeta};

/// The five recognized aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    /// `COUNT(*)` — always star, the argument is ignored.
    Count,
    /// `SUM(col)`
    Sum,
    /// `AVG(col)`
    Average,
    /// `MIN(col)`
    Min,
    /// `MAX(col)`
    Max,
}

impl AggregateFunc {
    /// Returns the SQL function name.
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Average => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }

    /// Recognizes a call by its lowered function name.
    fn recognize(function: &str) -> Option<Self> {
        match function {
            "Count" => Some(Self::Count),
            "Sum" => Some(Self::Sum),
            "Average" => Some(Self::Average),
            "Min" => Some(Self::Min),
            "Max" => Some(Self::Max),
            _ => None,
        }
    }
}

/// One parsed aggregate: the function and the member it ranges over, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    /// The recognized function.
    pub func: AggregateFunc,
    /// The aggregated member; `None` renders as `FUNC(*)`.
    pub member: Option<String>,
}

impl AggregateSpec {
    /// Parses an aggregate from a call node. `None` if the call is not a
    /// recognized aggregate over a plain member (or no member at all).
    fn parse(function: &str, args: &[Expr]) -> Option<Self> {
        let func = AggregateFunc::recognize(function)?;
        if func == AggregateFunc::Count {
            // COUNT counts rows; any selector argument is ignored.
            return Some(Self { func, member: None });
        }
        match args {
            [] => Some(Self { func, member: None }),
            [Expr::Member { source: Source::Outer, member }] => Some(Self {
                func,
                member: Some(member.clone()),
            }),
            _ => None,
        }
    }
}

/// The two statements a grouped chain compiles to.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlan {
    /// Stage one: full rows ordered by the grouping key, for in-memory
    /// bucketing by the execution collaborator.
    pub rows: CompiledSql,
    /// Stage two: the aggregate projection with `GROUP BY`.
    pub aggregates: CompiledSql,
}

impl SqlCompiler {
    /// Compiles a grouped chain into its two-stage [`GroupPlan`].
    ///
    /// The chain must contain a `GroupBy` and a following projection that is
    /// a field-selecting record of key and aggregate bindings.
    pub fn compile_group<E: Entity>(&self, query: &Query<E>) -> LinqResult<GroupPlan> {
        let meta = E::meta();
        let shape = query.decompose();
        let Some(group) = shape.group else {
            return Err(LinqError::unsupported_projection(
                "chain has no grouping key",
            ));
        };
        let Some(projection) = group.projection else {
            return Err(LinqError::unsupported_projection(
                "grouped chain has no result projection",
            ));
        };

        let table = self
            .dialect
            .quote_qualified(&meta.table_name(self.convention));
        let key_col = self
            .dialect
            .quote_qualified(&meta.column_name(&group.key_member, self.convention));

        let rows = CompiledSql {
            text: format!("SELECT * FROM {table} ORDER BY {key_col}"),
            parameters: Vec::new(),
        };

        let select_list = self.aggregate_list(&projection, &group.key_member, &key_col, meta)?;
        let aggregates = CompiledSql {
            text: format!("SELECT {select_list} FROM {table} GROUP BY {key_col}"),
            parameters: Vec::new(),
        };

        tracing::debug!(
            dialect = self.dialect.name,
            key = %group.key_member,
            sql = %aggregates.text,
            "compiled group plan"
        );
        Ok(GroupPlan { rows, aggregates })
    }

    /// Builds the stage-two select list from the group-result projection.
    fn aggregate_list(
        &self,
        projection: &Expr,
        key_member: &str,
        key_col: &str,
        meta: &EntityMeta,
    ) -> LinqResult<String> {
        let Expr::Record { bindings } = projection else {
            return Err(LinqError::unsupported_projection(format!(
                "group result must be a record, got {}",
                projection.node_kind()
            )));
        };
        let mut items = Vec::with_capacity(bindings.len());
        for (alias, bound) in bindings {
            let rendered = match bound {
                // The grouping key itself, accessed either through the key
                // member or the conventional `Key` name.
                Expr::Member { source: Source::Outer, member }
                    if member == key_member || member == "Key" =>
                {
                    key_col.to_string()
                }
                Expr::Call { function, args } => {
                    let spec = AggregateSpec::parse(function, args).ok_or_else(|| {
                        LinqError::unsupported_projection(format!(
                            "binding '{alias}' calls '{function}', which is not a recognized aggregate"
                        ))
                    })?;
                    let argument = match &spec.member {
                        Some(member) => self
                            .dialect
                            .quote_qualified(&meta.column_name(member, self.convention)),
                        None => "*".to_string(),
                    };
                    format!("{}({argument})", spec.func.sql_name())
                }
                other => {
                    return Err(LinqError::unsupported_projection(format!(
                        "binding '{alias}' is a {} node, expected the key or an aggregate call",
                        other.node_kind()
                    )));
                }
            };
            items.push(format!("{rendered} AS {}", self.dialect.quote(alias)));
        }
        Ok(items.join(", "))
    }
}
