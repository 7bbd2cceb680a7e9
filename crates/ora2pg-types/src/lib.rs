//! Plain value objects that make up the normalized source-catalog model,
//! plus the pure source-type -> target-type mapping.
//!
//! Everything here is side-effect free: no connections, no I/O. The
//! Introspector constructs these in a single pass and nothing mutates them
//! afterward.

mod catalog;
mod tablespec;
mod type_map;
mod value;

pub use catalog::{Catalog, Column, ForeignKey, Index, PrimaryKey, Sequence, TableRef};
pub use tablespec::TableSpec;
pub use type_map::map_type;
pub use value::Value;

/// Delete rule a foreign key triggers on the source side. `NO ACTION` is
/// the common case and is never emitted on the target (see
/// `ora2pg-planner`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DeleteRule {
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
}

impl DeleteRule {
    /// Parses the source catalog's textual delete-rule spelling. Unknown
    /// spellings fall back to `NoAction`, the safest (no-op) choice.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CASCADE" => DeleteRule::Cascade,
            "SET NULL" => DeleteRule::SetNull,
            "SET DEFAULT" => DeleteRule::SetDefault,
            "RESTRICT" => DeleteRule::Restrict,
            _ => DeleteRule::NoAction,
        }
    }

    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            DeleteRule::NoAction => None,
            DeleteRule::Cascade => Some("CASCADE"),
            DeleteRule::SetNull => Some("SET NULL"),
            DeleteRule::SetDefault => Some("SET DEFAULT"),
            DeleteRule::Restrict => Some("RESTRICT"),
        }
    }
}
