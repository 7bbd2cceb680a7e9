//! Column-definition emission: resolves a column's target type through
//! `ora2pg_types::map_type`, then scrubs the handful of malformed outputs
//! that fall out of naive precision/scale formatting (stray
//! `(None)`/`(None,None)` and the `ctid` row-identifier placeholder).

use lazy_static::lazy_static;
use ora2pg_namemap::NameMapper;
use ora2pg_types::{map_type, Column};
use regex::Regex;

lazy_static! {
    static ref NONE_PAREN: Regex = Regex::new(r"(?i)\(\s*none\s*(?:,\s*none\s*)?\)").unwrap();
    static ref EMPTY_PAREN: Regex = Regex::new(r"\(\s*\)$").unwrap();
}

fn scrub(raw: &str) -> String {
    if raw.trim().eq_ignore_ascii_case("ctid") {
        return "text".to_string();
    }
    let scrubbed = NONE_PAREN.replace_all(raw, "");
    EMPTY_PAREN.replace_all(&scrubbed, "").into_owned()
}

pub fn column_def(col: &Column, nm: &mut NameMapper) -> String {
    let name = nm.map_always_quoted(&col.name);

    let raw_type = map_type(&col.type_name, col.precision, col.scale).unwrap_or_else(|| {
        tracing::warn!(table = %col.table.name, column = %col.name, type_name = %col.type_name, "unknown source type, falling back to text");
        "text".to_string()
    });
    let pg_type = scrub(&raw_type);

    let mut parts = vec![name, pg_type];
    if let Some(default) = col.default_expr.as_ref().filter(|d| !d.is_empty()) {
        parts.push("DEFAULT".to_string());
        parts.push(default.clone());
    }
    if !col.nullable {
        parts.push("NOT NULL".to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ora2pg_types::TableRef;

    fn base_column(type_name: &str, precision: Option<i64>, scale: Option<i64>) -> Column {
        Column {
            table: TableRef::new("HR", "T"),
            name: "COL".to_string(),
            type_name: type_name.to_string(),
            precision,
            scale,
            nullable: true,
            default_expr: None,
            column_id: 1,
            raw_data_length: None,
            char_used: None,
        }
    }

    #[test]
    fn s2_rowid_scrubbed_to_text() {
        let mut nm = NameMapper::new();
        let col = base_column("ROWID", None, None);
        assert_eq!(column_def(&col, &mut nm), "\"col\" text");
    }

    #[test]
    fn s2_raw_with_precision() {
        let mut nm = NameMapper::new();
        let col = base_column("RAW", Some(16), None);
        assert_eq!(column_def(&col, &mut nm), "\"col\" bytea(16)");
    }

    #[test]
    fn scrub_strips_stray_none_parens() {
        assert_eq!(scrub("numeric(None)"), "numeric");
        assert_eq!(scrub("numeric(None,None)"), "numeric");
        assert_eq!(scrub("numeric"), "numeric");
    }

    #[test]
    fn not_null_and_default_are_appended() {
        let mut nm = NameMapper::new();
        let mut col = base_column("NUMBER", Some(10), Some(2));
        col.nullable = false;
        col.default_expr = Some("0".to_string());
        assert_eq!(column_def(&col, &mut nm), "\"col\" numeric(10,2) DEFAULT 0 NOT NULL");
    }

    #[test]
    fn unknown_type_falls_back_to_text() {
        let mut nm = NameMapper::new();
        let col = base_column("SYS.ANYDATA", None, None);
        assert_eq!(column_def(&col, &mut nm), "\"col\" text");
    }
}
