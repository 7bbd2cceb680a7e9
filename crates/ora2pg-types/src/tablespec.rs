use serde::{Deserialize, Serialize};

/// Describes one table the Data Loader should copy. Built from a `Catalog`
/// plus the target schema the Planner wrote to; may be overridden by the
/// operator (include/exclude lists, a `WHERE` predicate, or explicit target
/// names) before being handed to the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub owner: String,
    pub name: String,
    pub columns: Vec<String>,
    pub target_schema: String,
    pub where_clause: Option<String>,
    pub target_table_override: Option<String>,
    pub target_columns_override: Option<Vec<String>>,
}

impl TableSpec {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<String>,
        target_schema: impl Into<String>,
    ) -> Self {
        TableSpec {
            owner: owner.into(),
            name: name.into(),
            columns,
            target_schema: target_schema.into(),
            where_clause: None,
            target_table_override: None,
            target_columns_override: None,
        }
    }
}
