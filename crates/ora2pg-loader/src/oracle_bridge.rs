//! Converts one fetched Oracle row into the loader's tagged `Value`s,
//! dispatching on the column's runtime `OracleType` rather than any
//! schema known ahead of time. LOBs surface as native string/bytes, never
//! as streamed locators.

use chrono::NaiveDateTime;
use oracle::sql_type::OracleType;
use oracle::{Row, SqlValue};
use ora2pg_types::Value;

pub fn row_to_values(row: &Row) -> Result<Vec<Value>, oracle::Error> {
    row.sql_values().iter().map(convert).collect()
}

fn convert(sv: &SqlValue) -> Result<Value, oracle::Error> {
    if sv.is_null()? {
        return Ok(Value::Null);
    }

    match sv.oracle_type()? {
        OracleType::Number(_, scale) => {
            let text: String = sv.get()?;
            if *scale <= 0 {
                if let Ok(i) = text.trim().parse::<i64>() {
                    return Ok(Value::Int(i));
                }
            }
            Ok(Value::Decimal(text))
        }
        OracleType::Float(_) | OracleType::BinaryFloat | OracleType::BinaryDouble => {
            Ok(Value::Float(sv.get()?))
        }
        OracleType::Int64 => Ok(Value::Int(sv.get()?)),
        OracleType::Date => Ok(Value::DateTime(sv.get::<NaiveDateTime>()?)),
        OracleType::Timestamp(_) | OracleType::TimestampTZ(_) | OracleType::TimestampLTZ(_) => {
            Ok(Value::DateTime(sv.get::<NaiveDateTime>()?))
        }
        OracleType::Raw(_) | OracleType::LongRaw | OracleType::BLOB => Ok(Value::Bytes(sv.get()?)),
        OracleType::Varchar2(_)
        | OracleType::NVarchar2(_)
        | OracleType::Char(_)
        | OracleType::NChar(_)
        | OracleType::Long
        | OracleType::CLOB
        | OracleType::NCLOB
        | OracleType::Rowid => Ok(Value::Text(sv.get()?)),
        _ => {
            let text: String = sv.get().unwrap_or_default();
            Ok(Value::Other(text))
        }
    }
}

/// Coerces a fetched row to the fixed arity `width`, truncating longer
/// rows and right-padding shorter ones with NULL.
pub fn coerce_row(mut row: Vec<Value>, width: usize) -> Vec<Value> {
    row.truncate(width);
    while row.len() < width {
        row.push(Value::Null);
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_truncates_long_rows() {
        let row = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
        assert_eq!(coerce_row(row, 2), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn coerce_pads_short_rows_with_null() {
        let row = vec![Value::Int(1)];
        assert_eq!(coerce_row(row, 3), vec![Value::Int(1), Value::Null, Value::Null]);
    }

    #[test]
    fn coerce_is_noop_at_exact_width() {
        let row = vec![Value::Int(1), Value::Null];
        assert_eq!(coerce_row(row.clone(), 2), row);
    }
}
