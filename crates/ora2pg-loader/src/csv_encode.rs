//! Per-value and per-row CSV encoding for the COPY payload.
//!
//! Quoting and doubling of embedded quotes is left to the `csv` crate's
//! writer, configured to mirror `crates/parser`'s character-separated
//! reader settings (comma delimiter, `"` quote, `\n` terminator) but for
//! writing instead of reading.

use ora2pg_types::Value;

/// NULL sentinel written for a `Value::Null` cell.
pub const NULL_SENTINEL: &str = "\\N";

/// Renders one value to the text the CSV writer should place in its field.
/// Quoting of the result (if it contains the delimiter, quote char, or a
/// newline) is the writer's job, not this function's.
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::Null => NULL_SENTINEL.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Decimal(text) => text.clone(),
        Value::Text(text) => text.clone(),
        Value::Bytes(bytes) => format!("\\x{}", hex_lower(bytes)),
        Value::Date(date) => date.format("%Y-%m-%d").to_string(),
        Value::Time(time) => time.format("%H:%M:%S%.f").to_string(),
        Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        Value::Other(text) => text.clone(),
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Builds a writer with the `COPY ... WITH (FORMAT csv)` framing Postgres
/// expects: `,` field terminator, `\n` record terminator, `"` quote/escape,
/// minimal quoting.
pub fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(b',')
        .quote(b'"')
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary);
    builder
}

/// Encodes one row of `Value`s into a CSV record, appending it to `out`.
pub fn encode_row(writer: &mut csv::Writer<Vec<u8>>, row: &[Value]) -> Result<(), csv::Error> {
    let fields: Vec<String> = row.iter().map(encode_value).collect();
    writer.write_record(&fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn s5_csv_framing() {
        let row = vec![
            Value::Int(1),
            Value::Text("he said \"hi\"".to_string()),
            Value::Null,
            Value::Bytes(vec![0x00, 0xff]),
            Value::DateTime(
                NaiveDateTime::parse_from_str("2024-01-02 03:04:05", "%Y-%m-%d %H:%M:%S").unwrap(),
            ),
        ];
        let mut writer = writer_builder().from_writer(Vec::new());
        encode_row(&mut writer, &row).unwrap();
        writer.flush().unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "1,\"he said \"\"hi\"\"\",\\N,\\x00ff,2024-01-02 03:04:05\n");
    }

    #[test]
    fn null_encodes_to_sentinel() {
        assert_eq!(encode_value(&Value::Null), "\\N");
    }

    #[test]
    fn bytes_encode_to_lowercase_hex_literal() {
        assert_eq!(encode_value(&Value::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF])), "\\xdeadbeef");
    }

    #[test]
    fn decimal_passes_through_canonical_text_unchanged() {
        assert_eq!(encode_value(&Value::Decimal("100000000000000000000000000000".to_string())), "100000000000000000000000000000");
    }

    #[test]
    fn row_shorter_than_columns_is_padded_by_caller_not_here() {
        // Row-shape defense (truncate/pad) happens before encoding, in
        // `worker::coerce_row`, so this module only ever sees fixed-arity rows.
        let row = vec![Value::Null, Value::Null];
        let mut writer = writer_builder().from_writer(Vec::new());
        encode_row(&mut writer, &row).unwrap();
        writer.flush().unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "\\N,\\N\n");
    }
}
