//! Naming conventions for mapping member and type names to SQL identifiers.
//!
//! Mapped types declare their members in Rust/PascalCase style; the physical
//! column and table names are derived by applying a [`NamingConvention`].
//! The mapping is one-way: converting `"UserId"` to `"user_id"` is well
//! defined, but the reverse requires metadata and is never attempted here.
//!
//! The convention is plain data passed explicitly into the compiler. It is
//! read, never written, during compilation, so independently built queries
//! can compile concurrently without synchronization.

use std::str::FromStr;

use crate::error::LinqError;

/// The rule used to convert a member or type name into a SQL identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingConvention {
    /// Names are used unchanged (`UserId` -> `UserId`).
    #[default]
    PascalCase,
    /// Only the first character is lower-cased (`UserId` -> `userId`).
    CamelCase,
    /// Words are separated by underscores (`UserId` -> `user_id`).
    SnakeCase,
    /// Words are separated by hyphens (`UserId` -> `user-id`).
    KebabCase,
}

impl NamingConvention {
    /// Applies this convention to a member or type name.
    ///
    /// # Examples
    ///
    /// ```
    /// use linq_rs_core::naming::NamingConvention;
    ///
    /// assert_eq!(NamingConvention::PascalCase.resolve("UserId"), "UserId");
    /// assert_eq!(NamingConvention::CamelCase.resolve("UserId"), "userId");
    /// assert_eq!(NamingConvention::SnakeCase.resolve("UserId"), "user_id");
    /// assert_eq!(NamingConvention::KebabCase.resolve("UserId"), "user-id");
    /// ```
    pub fn resolve(self, name: &str) -> String {
        match self {
            Self::PascalCase => name.to_string(),
            Self::CamelCase => lower_first(name),
            Self::SnakeCase => separate_words(name, '_'),
            Self::KebabCase => separate_words(name, '-'),
        }
    }
}

impl FromStr for NamingConvention {
    type Err = LinqError;

    /// Parses a convention name from configuration.
    ///
    /// Fails with [`LinqError::InvalidConfiguration`] for any value outside
    /// the four recognized conventions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PascalCase" => Ok(Self::PascalCase),
            "CamelCase" => Ok(Self::CamelCase),
            "SnakeCase" => Ok(Self::SnakeCase),
            "KebabCase" => Ok(Self::KebabCase),
            other => Err(LinqError::InvalidConfiguration {
                value: other.to_string(),
            }),
        }
    }
}

/// Lower-cases only the first character of a name.
fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |c| {
        let mut result = c.to_lowercase().to_string();
        result.extend(chars);
        result
    })
}

/// Lower-cases the first character, then inserts `sep` before every
/// subsequent upper-case letter and lower-cases it.
fn separate_words(name: &str, sep: char) -> String {
    let mut chars = name.chars();
    let mut result = String::with_capacity(name.len() + 4);
    if let Some(first) = chars.next() {
        result.extend(first.to_lowercase());
    }
    for c in chars {
        if c.is_uppercase() {
            result.push(sep);
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Splits an explicit name override on its *last* `.` separator.
///
/// Explicit overrides may embed a literal `schema.table`-style qualifier;
/// the compiler quotes the two parts as separate identifiers. Names without
/// a separator return `None` for the qualifier.
///
/// # Examples
///
/// ```
/// use linq_rs_core::naming::split_qualified;
///
/// assert_eq!(split_qualified("accounts.user"), (Some("accounts"), "user"));
/// assert_eq!(split_qualified("user"), (None, "user"));
/// ```
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    name.rfind('.').map_or((None, name), |idx| {
        (Some(&name[..idx]), &name[idx + 1..])
    })
}
