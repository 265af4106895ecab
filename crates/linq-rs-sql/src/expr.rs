//! The predicate/projection expression tree.
//!
//! [`Expr`] is a closed tagged-variant tree covering exactly the sublanguage
//! the compiler can translate, plus a small set of kinds that exist in the
//! tree language but are deliberately untranslatable (arithmetic, arbitrary
//! calls outside a group projection). The host representation of a predicate
//! is lowered into this tree once, at the API boundary, by the builder
//! functions below — captured variables are evaluated eagerly into
//! [`Literal`](Expr::Literal) nodes at that point, so the compiler re-reads
//! their current value on every compilation.
//!
//! # Examples
//!
//! ```
//! use linq_rs_sql::expr::{col, val, Expr};
//!
//! // Age > 18 AND Name contains "a"
//! let predicate = col("Age").gt(val(18)) & col("Name").contains("a");
//! ```

use std::ops;

use crate::value::Value;

/// The logical source a member access resolves against.
///
/// Single-source queries bind every member through [`Outer`](Source::Outer);
/// two-source joins additionally bind the right-hand row variable through
/// [`Inner`](Source::Inner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The single (or left/outer) row variable.
    Outer,
    /// The right/inner row variable of a join.
    Inner,
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl CompareOp {
    /// Returns the SQL operator symbol.
    pub const fn sql_symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// Logical combinators. Rendered fully parenthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl LogicOp {
    /// Returns the SQL keyword.
    pub const fn sql_keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// The whitelisted string-matching functions, each lowering to `LIKE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrFunc {
    /// `receiver LIKE '%v%'`
    Contains,
    /// `receiver LIKE 'v%'`
    StartsWith,
    /// `receiver LIKE '%v'`
    EndsWith,
}

impl StrFunc {
    /// Wraps the match argument with `%` wildcards in the position this
    /// function requires. The wildcards live inside the bound parameter
    /// value, never in the SQL text.
    pub fn wrap_pattern(self, value: &str) -> String {
        match self {
            Self::Contains => format!("%{value}%"),
            Self::StartsWith => format!("{value}%"),
            Self::EndsWith => format!("%{value}"),
        }
    }
}

/// Arithmetic operators. Recognized by the tree, rejected by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

/// One node of the lowered expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Member access through a query parameter (the row variable).
    Member {
        /// Which row variable the member was accessed through.
        source: Source,
        /// The member name as declared on the mapped type.
        member: String,
    },
    /// A literal, or a captured variable evaluated eagerly at lowering time.
    Literal(Value),
    /// A binary comparison.
    Compare {
        /// The comparison operator.
        op: CompareOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// A logical conjunction or disjunction.
    Logic {
        /// AND or OR.
        op: LogicOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// A whitelisted string-matching call.
    StrMatch {
        /// Which of the three whitelisted functions was called.
        func: StrFunc,
        /// The receiver (the text column being matched).
        receiver: Box<Expr>,
        /// The match argument; must lower to a string literal.
        pattern: Box<Expr>,
    },
    /// A field-selecting record construction, used as a projection shape.
    Record {
        /// Output-member name to source-expression pairs, in declaration order.
        bindings: Vec<(String, Expr)>,
    },
    /// A named call. Only aggregate calls inside a group-result projection
    /// are meaningful; anywhere else this is untranslatable.
    Call {
        /// The called function's name.
        function: String,
        /// The call arguments.
        args: Vec<Expr>,
    },
    /// Arithmetic. Outside the translatable sublanguage by design.
    Arith {
        /// The arithmetic operator.
        op: ArithOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
}

/// Creates a member access through the single/outer row variable.
pub fn col(member: impl Into<String>) -> Expr {
    Expr::Member {
        source: Source::Outer,
        member: member.into(),
    }
}

/// Creates a member access through the inner row variable of a join.
pub fn inner_col(member: impl Into<String>) -> Expr {
    Expr::Member {
        source: Source::Inner,
        member: member.into(),
    }
}

/// Creates a literal node from any value convertible to [`Value`].
pub fn val(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

impl Expr {
    /// Returns the node-kind name, used in `UnsupportedExpression` errors.
    pub const fn node_kind(&self) -> &'static str {
        match self {
            Self::Member { .. } => "Member",
            Self::Literal(_) => "Literal",
            Self::Compare { .. } => "Compare",
            Self::Logic { .. } => "Logic",
            Self::StrMatch { .. } => "StrMatch",
            Self::Record { .. } => "Record",
            Self::Call { .. } => "Call",
            Self::Arith { .. } => "Arith",
        }
    }

    fn compare(self, op: CompareOp, right: Self) -> Self {
        Self::Compare {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// `self = other`
    #[must_use]
    pub fn eq(self, other: impl Into<Self>) -> Self {
        self.compare(CompareOp::Eq, other.into())
    }

    /// `self != other`
    #[must_use]
    pub fn ne(self, other: impl Into<Self>) -> Self {
        self.compare(CompareOp::Ne, other.into())
    }

    /// `self > other`
    #[must_use]
    pub fn gt(self, other: impl Into<Self>) -> Self {
        self.compare(CompareOp::Gt, other.into())
    }

    /// `self >= other`
    #[must_use]
    pub fn ge(self, other: impl Into<Self>) -> Self {
        self.compare(CompareOp::Ge, other.into())
    }

    /// `self < other`
    #[must_use]
    pub fn lt(self, other: impl Into<Self>) -> Self {
        self.compare(CompareOp::Lt, other.into())
    }

    /// `self <= other`
    #[must_use]
    pub fn le(self, other: impl Into<Self>) -> Self {
        self.compare(CompareOp::Le, other.into())
    }

    fn str_match(self, func: StrFunc, pattern: impl Into<Value>) -> Self {
        Self::StrMatch {
            func,
            receiver: Box::new(self),
            pattern: Box::new(Self::Literal(pattern.into())),
        }
    }

    /// `self LIKE '%pattern%'`
    #[must_use]
    pub fn contains(self, pattern: impl Into<Value>) -> Self {
        self.str_match(StrFunc::Contains, pattern)
    }

    /// `self LIKE 'pattern%'`
    #[must_use]
    pub fn starts_with(self, pattern: impl Into<Value>) -> Self {
        self.str_match(StrFunc::StartsWith, pattern)
    }

    /// `self LIKE '%pattern'`
    #[must_use]
    pub fn ends_with(self, pattern: impl Into<Value>) -> Self {
        self.str_match(StrFunc::EndsWith, pattern)
    }

    /// Creates a field-selecting record projection from alias/expression pairs.
    pub fn record(bindings: Vec<(impl Into<String>, Self)>) -> Self {
        Self::Record {
            bindings: bindings
                .into_iter()
                .map(|(name, expr)| (name.into(), expr))
                .collect(),
        }
    }

    /// `COUNT(*)` — ignores any argument by definition.
    pub fn count() -> Self {
        Self::Call {
            function: "Count".to_string(),
            args: Vec::new(),
        }
    }

    /// `SUM(member)`
    pub fn sum(member: impl Into<String>) -> Self {
        Self::aggregate_call("Sum", member)
    }

    /// `AVG(member)`
    pub fn average(member: impl Into<String>) -> Self {
        Self::aggregate_call("Average", member)
    }

    /// `MIN(member)`
    pub fn min(member: impl Into<String>) -> Self {
        Self::aggregate_call("Min", member)
    }

    /// `MAX(member)`
    pub fn max(member: impl Into<String>) -> Self {
        Self::aggregate_call("Max", member)
    }

    fn aggregate_call(function: &str, member: impl Into<String>) -> Self {
        Self::Call {
            function: function.to_string(),
            args: vec![col(member)],
        }
    }
}

macro_rules! impl_expr_from {
    ($($ty:ty),+ $(,)?) => {
        $(impl From<$ty> for Expr {
            fn from(v: $ty) -> Self {
                Self::Literal(v.into())
            }
        })+
    };
}

impl_expr_from!(Value, bool, i16, i32, i64, f32, f64, &str, String);

impl ops::BitAnd for Expr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::Logic {
            op: LogicOp::And,
            left: Box::new(self),
            right: Box::new(rhs),
        }
    }
}

impl ops::BitOr for Expr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Logic {
            op: LogicOp::Or,
            left: Box::new(self),
            right: Box::new(rhs),
        }
    }
}

impl ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Arith {
            op: ArithOp::Add,
            left: Box::new(self),
            right: Box::new(rhs),
        }
    }
}

impl ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Arith {
            op: ArithOp::Sub,
            left: Box::new(self),
            right: Box::new(rhs),
        }
    }
}

impl ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::Arith {
            op: ArithOp::Mul,
            left: Box::new(self),
            right: Box::new(rhs),
        }
    }
}

impl ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self::Arith {
            op: ArithOp::Div,
            left: Box::new(self),
            right: Box::new(rhs),
        }
    }
}
