//! Raw expense records as served by the backend.
//!
//! The backend is a spreadsheet-backed JSON API with no schema enforcement, so
//! every field is optional and values arrive as strings or bare numbers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One logged expense, exactly as fetched. Never mutated after fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// `dd-mm-yyyy`
    #[serde(rename = "tanggal", default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "kategori", default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Digits, possibly grouped with `.` or `,`
    #[serde(rename = "nominal", default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(rename = "keterangan", default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ExpenseRecord {
    pub fn new(date: &str, category: &str, amount: &str, note: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            category: Some(category.to_string()),
            amount: Some(amount.to_string()),
            note: Some(note.to_string()),
        }
    }

    pub fn date_or_dash(&self) -> &str {
        self.date.as_deref().unwrap_or("-")
    }

    pub fn category_or_dash(&self) -> &str {
        self.category.as_deref().unwrap_or("-")
    }

    pub fn note_or_dash(&self) -> &str {
        self.note.as_deref().unwrap_or("-")
    }
}

/// Accept strings, numbers and booleans; map null and containers to `None`.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Parse the backend's `getData` payload (a JSON array of records).
pub fn parse_records(json: &str) -> Result<Vec<ExpenseRecord>, serde_json::Error> {
    serde_json::from_str(json)
}
