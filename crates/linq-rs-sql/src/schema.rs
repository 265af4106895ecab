//! Entity metadata: the mapping between record types and tables.
//!
//! The [`Entity`] trait is the seam through which the compiler learns about
//! a mapped type. All attribute information — explicit name overrides,
//! primary-key markers, ignore markers, auto-generated markers — is captured
//! once in a static [`EntityMeta`] and consumed by the compiler as pure,
//! read-only lookups. No runtime reflection is involved: in practice the
//! metadata is produced by a derive macro or written out by hand.
//!
//! # Examples
//!
//! ```
//! use std::sync::LazyLock;
//! use linq_rs_sql::schema::{ColumnDef, Entity, EntityMeta};
//!
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Entity for User {
//!     fn meta() -> &'static EntityMeta {
//!         static META: LazyLock<EntityMeta> = LazyLock::new(|| EntityMeta {
//!             entity_name: "User",
//!             explicit_table: None,
//!             columns: vec![
//!                 ColumnDef::new("UserId").primary_key().auto_generated(),
//!                 ColumnDef::new("Name"),
//!             ],
//!         });
//!         &META
//!     }
//! }
//! ```

use linq_rs_core::error::{LinqError, LinqResult};
use linq_rs_core::naming::NamingConvention;

/// The trait implemented by every mapped record type.
///
/// The compiler never constructs an instance of the entity; it only reads
/// the static metadata.
pub trait Entity {
    /// Returns the static metadata for this mapped type.
    fn meta() -> &'static EntityMeta;
}

/// Per-member column mapping attributes.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// The member name as declared on the record type (PascalCase).
    pub member: &'static str,
    /// Explicit column-name override; returned verbatim when present and
    /// may embed a literal `schema.column` two-part qualifier.
    pub explicit_name: Option<&'static str>,
    /// Marks the single primary-key member of the type.
    pub primary_key: bool,
    /// Excludes the member from all generated SQL.
    pub ignored: bool,
    /// Excludes the member from insert/update value lists.
    pub auto_generated: bool,
}

impl ColumnDef {
    /// Creates a plain column mapping for a member.
    pub const fn new(member: &'static str) -> Self {
        Self {
            member,
            explicit_name: None,
            primary_key: false,
            ignored: false,
            auto_generated: false,
        }
    }

    /// Attaches an explicit column-name override.
    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.explicit_name = Some(name);
        self
    }

    /// Marks this member as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Excludes this member from all generated SQL.
    #[must_use]
    pub const fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Marks this member as database-generated.
    #[must_use]
    pub const fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }
}

/// Static metadata describing one mapped type.
#[derive(Debug, Clone)]
pub struct EntityMeta {
    /// The Rust type name (PascalCase).
    pub entity_name: &'static str,
    /// Explicit table-name override; returned verbatim when present and may
    /// embed a literal `schema.table` two-part qualifier.
    pub explicit_table: Option<&'static str>,
    /// Column mappings, one per member.
    pub columns: Vec<ColumnDef>,
}

impl EntityMeta {
    /// Returns the primary-key column.
    ///
    /// Fails with [`LinqError::MissingPrimaryKey`] when no member is marked
    /// as the key, or when more than one is.
    pub fn primary_key(&self) -> LinqResult<&ColumnDef> {
        let mut keys = self.columns.iter().filter(|c| c.primary_key);
        match (keys.next(), keys.next()) {
            (Some(key), None) => Ok(key),
            _ => Err(LinqError::MissingPrimaryKey {
                entity: self.entity_name.to_string(),
            }),
        }
    }

    /// Looks up the column mapping for a member, if one is declared.
    pub fn column(&self, member: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.member == member)
    }

    /// Returns `true` if the member carries the ignore marker.
    pub fn is_ignored(&self, member: &str) -> bool {
        self.column(member).is_some_and(|c| c.ignored)
    }

    /// Columns that participate in generated SQL (everything not ignored).
    pub fn projectable_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.ignored)
    }

    /// Resolves a member to its physical column identifier.
    ///
    /// An explicit override wins verbatim; otherwise the convention is
    /// applied to the member name. Members without a declared mapping are
    /// resolved by convention alone, so the lookup never fails.
    pub fn column_name(&self, member: &str, convention: NamingConvention) -> String {
        match self.column(member).and_then(|c| c.explicit_name) {
            Some(explicit) => explicit.to_string(),
            None => convention.resolve(member),
        }
    }

    /// Resolves the physical table identifier for this type.
    pub fn table_name(&self, convention: NamingConvention) -> String {
        self.explicit_table.map_or_else(
            || convention.resolve(self.entity_name),
            ToString::to_string,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_meta() -> EntityMeta {
        EntityMeta {
            entity_name: "User",
            explicit_table: None,
            columns: vec![
                ColumnDef::new("UserId").primary_key().auto_generated(),
                ColumnDef::new("Name"),
                ColumnDef::new("Age"),
                ColumnDef::new("SessionToken").ignored(),
                ColumnDef::new("EmailAddress").named("email"),
            ],
        }
    }

    #[test]
    fn test_primary_key_found() {
        let meta = user_meta();
        assert_eq!(meta.primary_key().unwrap().member, "UserId");
    }

    #[test]
    fn test_primary_key_missing() {
        let meta = EntityMeta {
            entity_name: "Orphan",
            explicit_table: None,
            columns: vec![ColumnDef::new("Name")],
        };
        assert_eq!(
            meta.primary_key().unwrap_err(),
            LinqError::MissingPrimaryKey {
                entity: "Orphan".to_string()
            }
        );
    }

    #[test]
    fn test_primary_key_duplicate_rejected() {
        let meta = EntityMeta {
            entity_name: "Twin",
            explicit_table: None,
            columns: vec![
                ColumnDef::new("A").primary_key(),
                ColumnDef::new("B").primary_key(),
            ],
        };
        assert!(meta.primary_key().is_err());
    }

    #[test]
    fn test_column_name_by_convention() {
        let meta = user_meta();
        assert_eq!(
            meta.column_name("UserId", NamingConvention::SnakeCase),
            "user_id"
        );
        assert_eq!(
            meta.column_name("UserId", NamingConvention::CamelCase),
            "userId"
        );
    }

    #[test]
    fn test_column_name_explicit_override_wins() {
        let meta = user_meta();
        assert_eq!(
            meta.column_name("EmailAddress", NamingConvention::SnakeCase),
            "email"
        );
        // Overrides are verbatim, not re-converted
        assert_eq!(
            meta.column_name("EmailAddress", NamingConvention::PascalCase),
            "email"
        );
    }

    #[test]
    fn test_column_name_undeclared_member_uses_convention() {
        let meta = user_meta();
        assert_eq!(
            meta.column_name("LastLogin", NamingConvention::SnakeCase),
            "last_login"
        );
    }

    #[test]
    fn test_table_name() {
        let meta = user_meta();
        assert_eq!(meta.table_name(NamingConvention::SnakeCase), "user");
        assert_eq!(meta.table_name(NamingConvention::PascalCase), "User");
    }

    #[test]
    fn test_table_name_explicit_override() {
        let meta = EntityMeta {
            entity_name: "User",
            explicit_table: Some("accounts.app_user"),
            columns: vec![],
        };
        assert_eq!(
            meta.table_name(NamingConvention::SnakeCase),
            "accounts.app_user"
        );
    }

    #[test]
    fn test_is_ignored() {
        let meta = user_meta();
        assert!(meta.is_ignored("SessionToken"));
        assert!(!meta.is_ignored("Name"));
        assert!(!meta.is_ignored("Unknown"));
    }

    #[test]
    fn test_projectable_columns_skip_ignored() {
        let meta = user_meta();
        let members: Vec<&str> = meta.projectable_columns().map(|c| c.member).collect();
        assert_eq!(members, vec!["UserId", "Name", "Age", "EmailAddress"]);
    }
}
