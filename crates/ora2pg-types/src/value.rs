use serde::{Deserialize, Serialize};

/// A row cell, tagged by runtime shape. The Data Loader coerces whatever
/// the source driver hands back into one of these variants once, up front,
/// rather than re-dispatching on an open-ended type at encode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    /// Decimal kept as its canonical decimal text, since Oracle's NUMBER
    /// can exceed the precision of any fixed-width integer/float type.
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    DateTime(chrono::NaiveDateTime),
    /// Anything that doesn't fit the above; encoded via its natural string
    /// form.
    Other(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}
