//! Dialect descriptors: backend syntax differences as data.
//!
//! Everything that varies between the supported SQL backends — identifier
//! quoting, paging clause shape, full-outer-join support, and the "no row
//! limit" sentinel — is captured in one [`Dialect`] value. The compiler is
//! written once against this descriptor instead of once per backend.

use linq_rs_core::naming::split_qualified;

/// How a dialect spells its paging clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingStyle {
    /// `LIMIT <count> OFFSET <skip>` (SQLite, PostgreSQL).
    OffsetFirst,
    /// `LIMIT <skip>, <count>` (MySQL positional form).
    LimitFirst,
}

/// One backend's syntax profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Human-readable dialect name, used in log events.
    pub name: &'static str,
    /// Opening identifier quote character.
    pub quote_open: char,
    /// Closing identifier quote character.
    pub quote_close: char,
    /// Paging clause shape.
    pub paging: PagingStyle,
    /// Whether `FULL OUTER JOIN` is natively available.
    pub supports_full_outer_join: bool,
    /// The literal emitted as the row count when a query skips rows without
    /// bounding the result ("no limit" sentinel).
    pub unbounded_row_count: &'static str,
}

impl Dialect {
    /// The SQLite dialect: double-quoted identifiers, `LIMIT n OFFSET m`,
    /// no native full outer join, and `-1` as the unbounded row count.
    pub const fn sqlite() -> Self {
        Self {
            name: "sqlite",
            quote_open: '"',
            quote_close: '"',
            paging: PagingStyle::OffsetFirst,
            supports_full_outer_join: false,
            unbounded_row_count: "-1",
        }
    }

    /// The MySQL dialect: backtick identifiers, `LIMIT m, n`, no full outer
    /// join, and the engine's documented maximum row count as the sentinel.
    pub const fn mysql() -> Self {
        Self {
            name: "mysql",
            quote_open: '`',
            quote_close: '`',
            paging: PagingStyle::LimitFirst,
            supports_full_outer_join: false,
            unbounded_row_count: "18446744073709551615",
        }
    }

    /// Quotes a single identifier.
    pub fn quote(&self, identifier: &str) -> String {
        format!("{}{identifier}{}", self.quote_open, self.quote_close)
    }

    /// Quotes an identifier that may carry a `schema.name` qualifier,
    /// splitting on the last separator and quoting both parts.
    pub fn quote_qualified(&self, identifier: &str) -> String {
        match split_qualified(identifier) {
            (Some(qualifier), name) => {
                format!("{}.{}", self.quote(qualifier), self.quote(name))
            }
            (None, name) => self.quote(name),
        }
    }

    /// Renders the paging clause. A `None` row count uses the dialect's
    /// unbounded sentinel (offset-only paging).
    pub fn paging_clause(&self, skip: u64, take: Option<u64>) -> String {
        let count = take.map_or_else(|| self.unbounded_row_count.to_string(), |n| n.to_string());
        match self.paging {
            PagingStyle::OffsetFirst => format!("LIMIT {count} OFFSET {skip}"),
            PagingStyle::LimitFirst => format!("LIMIT {skip}, {count}"),
        }
    }
}
