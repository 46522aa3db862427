use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A single spreadsheet cell, as returned by the Sheets API.
///
/// With the default `FORMATTED_VALUE` rendering every cell comes back as a string, but
/// `UNFORMATTED_VALUE` yields numbers and booleans, so we keep the distinction and make
/// callers convert explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The text content, `Some("")` for an empty cell, `None` for a number.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Empty => Some(""),
            CellValue::Number(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Empty => "empty",
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::from(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Null => Ok(CellValue::Empty),
            Value::String(s) => Ok(CellValue::from(s)),
            Value::Bool(b) => Ok(CellValue::Text(if b { "TRUE" } else { "FALSE" }.to_string())),
            Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .ok_or_else(|| serde::de::Error::custom(format!("unrepresentable number {n}"))),
            other => Err(serde::de::Error::custom(format!(
                "unexpected cell value {other}"
            ))),
        }
    }
}
