//! Pure mapping from source type triples (name, precision, scale) to target
//! type text. No connection, no catalog access: a plain function table.

/// Base target type text for a recognized source type name, before any
/// precision/scale is applied. `None` means the caller should fall back to
/// `text` and log a warning -- this function never fails.
fn base_type(source_name: &str) -> Option<&'static str> {
    match source_name.trim().to_ascii_uppercase().as_str() {
        // integer family
        "NUMBER" => Some("numeric"),
        "INTEGER" | "INT" => Some("integer"),
        "SMALLINT" => Some("smallint"),

        // floating
        "FLOAT" | "DOUBLE" => Some("double precision"),
        "BINARY_FLOAT" => Some("real"),
        "BINARY_DOUBLE" => Some("real"),

        // character
        "CHAR" | "NCHAR" | "CHARACTER" => Some("char"),
        "VARCHAR2" | "NVARCHAR2" => Some("varchar"),

        // large text
        "LONG" | "CLOB" | "NCLOB" => Some("text"),

        // binary
        "RAW" | "BLOB" | "BFILE" => Some("bytea"),

        // temporal
        "DATE" => Some("timestamp(0)"),
        "TIMESTAMP" => Some("timestamp"),

        // structured
        "XMLTYPE" => Some("xml"),
        "JSON" => Some("jsonb"),
        "BOOLEAN" => Some("boolean"),

        // spatial: SDO_Geometry, SDO_Topo_Geometry, SDO_GeoRaster, ...
        s if s.starts_with("SDO_") => Some("geometry"),

        // identity
        // ROWID has no clean Postgres equivalent; `ctid` is a row-identifier
        // placeholder that the Planner scrubs to `text` (see ora2pg-planner).
        "ROWID" => Some("ctid"),
        "UROWID" => Some("uuid"),

        _ => None,
    }
}

/// Formats the resolved base type with whatever precision/scale it has:
/// - both present -> `base(precision,scale)`
/// - only precision present -> `base(precision)`
/// - neither -> bare `base`
pub fn map_type(source_name: &str, precision: Option<i64>, scale: Option<i64>) -> Option<String> {
    let base = base_type(source_name)?;
    Some(match (precision, scale) {
        (Some(p), Some(s)) => format!("{base}({p},{s})"),
        (Some(p), None) => format!("{base}({p})"),
        _ => base.to_string(),
    })
}
