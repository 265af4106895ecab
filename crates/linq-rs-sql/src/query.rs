//! The query operation chain and its decomposer.
//!
//! A [`Query`] is an immutable, append-only chain: every builder call wraps
//! the predecessor node with one more operation, so the chain is a singly
//! linked list with exactly one root (the source entity). Nothing executes
//! at build time; the chain is handed to the compiler, which decomposes it
//! back into clause inputs. A chain is built once per logical query and
//! discarded after compilation — compiled SQL is produced fresh on every
//! request, so captured values mutated between compilations are re-read.
//!
//! # Examples
//!
//! ```
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
//! let query = Query::<User>::new()
//!     .filter(col("Age").gt(val(18)))
//!     .order_by("Name")
//!     .skip(5)
//!     .take(10);
//! ```

use std::marker::PhantomData;

use crate::expr::Expr;
use crate::schema::Entity;

/// One chained query operation.
#[derive(Debug, Clone)]
pub enum QueryOp {
    /// Restricts rows by a predicate expression.
    Filter(Expr),
    /// Defines the output shape.
    Select(Expr),
    /// Primary ascending sort by a member.
    OrderBy(String),
    /// Secondary ascending sort by a member.
    ThenBy(String),
    /// Primary descending sort by a member.
    OrderByDesc(String),
    /// Secondary descending sort by a member.
    ThenByDesc(String),
    /// Skips the first `n` rows.
    Skip(u64),
    /// Bounds the result to `n` rows.
    Take(u64),
    /// Groups rows by a key member; hands compilation off to the group
    /// planner.
    GroupBy(String),
}

/// A node in the chain: either the source root or an operation wrapping its
/// predecessor.
#[derive(Debug, Clone)]
enum Node {
    Root,
    Op { prev: Box<Node>, op: QueryOp },
}

/// An immutable chain of query operations over one source entity.
#[derive(Debug, Clone)]
pub struct Query<E: Entity> {
    tip: Node,
    _entity: PhantomData<E>,
}

impl<E: Entity> Default for Query<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Query<E> {
    /// Creates an empty chain over the source entity.
    pub const fn new() -> Self {
        Self {
            tip: Node::Root,
            _entity: PhantomData,
        }
    }

    fn push(self, op: QueryOp) -> Self {
        Self {
            tip: Node::Op {
                prev: Box::new(self.tip),
                op,
            },
            _entity: PhantomData,
        }
    }

    /// Appends a filter predicate. Sequential filters AND-combine.
    #[must_use]
    pub fn filter(self, predicate: Expr) -> Self {
        self.push(QueryOp::Filter(predicate))
    }

    /// Appends a projection defining the output shape.
    #[must_use]
    pub fn select(self, projection: Expr) -> Self {
        self.push(QueryOp::Select(projection))
    }

    /// Appends a primary ascending sort key.
    #[must_use]
    pub fn order_by(self, member: impl Into<String>) -> Self {
        self.push(QueryOp::OrderBy(member.into()))
    }

    /// Appends a secondary ascending sort key.
    #[must_use]
    pub fn then_by(self, member: impl Into<String>) -> Self {
        self.push(QueryOp::ThenBy(member.into()))
    }

    /// Appends a primary descending sort key.
    #[must_use]
    pub fn order_by_desc(self, member: impl Into<String>) -> Self {
        self.push(QueryOp::OrderByDesc(member.into()))
    }

    /// Appends a secondary descending sort key.
    #[must_use]
    pub fn then_by_desc(self, member: impl Into<String>) -> Self {
        self.push(QueryOp::ThenByDesc(member.into()))
    }

    /// Skips the first `n` rows.
    #[must_use]
    pub fn skip(self, n: u64) -> Self {
        self.push(QueryOp::Skip(n))
    }

    /// Bounds the result to `n` rows.
    #[must_use]
    pub fn take(self, n: u64) -> Self {
        self.push(QueryOp::Take(n))
    }

    /// Groups rows by a key member.
    #[must_use]
    pub fn group_by(self, member: impl Into<String>) -> Self {
        self.push(QueryOp::GroupBy(member.into()))
    }

    /// Recovers the clause inputs from the chain.
    ///
    /// The walk recurses into each node's predecessor first, so filters and
    /// sort keys come out in the order they were composed. Decomposition
    /// always terminates: predecessor links lead to the single root.
    pub fn decompose(&self) -> Decomposed {
        // Flatten tip -> root, then replay in composition order.
        let mut ops: Vec<&QueryOp> = Vec::new();
        let mut node = &self.tip;
        while let Node::Op { prev, op } = node {
            ops.push(op);
            node = prev;
        }
        ops.reverse();

        let mut shape = Decomposed::default();
        for op in ops {
            match op {
                QueryOp::Filter(predicate) => shape.filters.push(predicate.clone()),
                QueryOp::Select(projection) => match &mut shape.group {
                    Some(group) => {
                        if group.projection.is_none() {
                            group.projection = Some(projection.clone());
                        }
                    }
                    None => {
                        if shape.projection.is_none() {
                            shape.projection = Some(projection.clone());
                        }
                    }
                },
                QueryOp::OrderBy(member) | QueryOp::ThenBy(member) => {
                    shape.sort_keys.push((member.clone(), true));
                }
                QueryOp::OrderByDesc(member) | QueryOp::ThenByDesc(member) => {
                    shape.sort_keys.push((member.clone(), false));
                }
                QueryOp::Skip(n) => shape.skip = Some(*n),
                QueryOp::Take(n) => shape.take = Some(*n),
                QueryOp::GroupBy(member) => {
                    shape.group = Some(Grouping {
                        key_member: member.clone(),
                        projection: None,
                    });
                }
            }
        }
        shape
    }
}

/// The clause inputs recovered from a chain.
#[derive(Debug, Clone, Default)]
pub struct Decomposed {
    /// Filter predicates in composition order; always AND-combined.
    pub filters: Vec<Expr>,
    /// Sort keys in composition order as `(member, ascending)` pairs. The
    /// assembler emits only the first.
    pub sort_keys: Vec<(String, bool)>,
    /// The output shape: the projection nearest the root that is reachable
    /// without crossing a `GroupBy`.
    pub projection: Option<Expr>,
    /// Rows to skip.
    pub skip: Option<u64>,
    /// Row bound.
    pub take: Option<u64>,
    /// Grouping state, present when the chain contains a `GroupBy`.
    pub group: Option<Grouping>,
}

/// Grouping recovered from a chain: the key member and the result
/// projection composed after the `GroupBy`.
#[derive(Debug, Clone)]
pub struct Grouping {
    /// The member the rows are grouped by.
    pub key_member: String,
    /// The group-result projection, if one was composed.
    pub projection: Option<Expr>,
}
