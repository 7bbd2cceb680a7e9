use crate::DeleteRule;
use serde::{Deserialize, Serialize};

/// A table identified by its owning schema and name, exactly as the source
/// catalog spells them (upper-case by Oracle convention).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub owner: String,
    pub name: String,
}

impl TableRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        TableRef {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// Whether a character column's length is measured in bytes or characters.
/// Carried through for diagnostics; it never changes Type Map dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharUsed {
    Byte,
    Char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub table: TableRef,
    pub name: String,
    pub type_name: String,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub nullable: bool,
    pub default_expr: Option<String>,
    /// Raw source column-id ordering; preserved so re-emission matches the
    /// order the Introspector observed it in.
    pub column_id: i64,
    pub raw_data_length: Option<i64>,
    pub char_used: Option<CharUsed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub table: TableRef,
    pub constraint_name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub constraint_name: String,
    pub table: TableRef,
    pub columns: Vec<String>,
    pub ref_table: TableRef,
    pub ref_columns: Vec<String>,
    pub delete_rule: DeleteRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub table: TableRef,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub increment: i64,
    /// Raw decimal text, not `i64`: Oracle's NUMBER can carry values that
    /// overflow a signed 64-bit integer, so these are kept as text until
    /// the Planner decides whether they fit the target's range.
    pub min: Option<String>,
    pub max: Option<String>,
    pub cache: Option<i64>,
    pub cycle: bool,
    pub last_value: Option<String>,
    /// Recorded but unused downstream: Postgres has no ORDER/NO ORDER
    /// concept for sequences.
    pub order_flag: bool,
}

/// The full normalized model of one source schema, produced by the
/// Introspector in a single pass and immutable thereafter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub tables: Vec<TableRef>,
    pub columns: Vec<Column>,
    pub primary_keys: Vec<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
    pub sequences: Vec<Sequence>,
}
