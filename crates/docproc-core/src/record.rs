//! Decoding of the JSON record embedded in each [`Item`](crate::Item).
//!
//! The backend emits records keyed by Russian column names. Keys are kept
//! exactly as received; unknown keys are preserved in insertion order.

use serde_json::{Map, Value};

use crate::error::ItemParseError;

/// Well-known record keys.
pub mod fields {
    pub const NAME: &str = "Наименование";
    pub const QUANTITY: &str = "Количество";
    pub const QUANTITY_ALT: &str = "Кол-во";
    pub const UNIT: &str = "Ед.изм.";
    pub const UNIT_ALT: &str = "Ед. изм.";
    pub const PRICE: &str = "Цена";
    pub const CURRENCY: &str = "Валюта";
    pub const MATCH_PERCENT: &str = "Процент_совпадения";
    pub const CATEGORY: &str = "Категория";
    pub const SUBCATEGORY: &str = "Подкатегория";
    pub const ARTICLE: &str = "Артикул";
}

/// A decoded item record.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    fields: Map<String, Value>,
}

impl ItemRecord {
    /// Decode an item's `text` field. Anything other than a JSON object is rejected.
    pub fn parse(text: &str) -> Result<Self, ItemParseError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ItemParseError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Display text for `key`, or `None` when the key is missing, null, or an empty string.
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(display_value)
    }

    /// First present value among `keys`, in order.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.text(k))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Re-encode the record with its original keys.
    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

/// Render a JSON scalar the way a table cell shows it.
///
/// Integral floats drop their fractional part so `5.0` shows as `5`.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i.to_string());
            }
            if let Some(u) = n.as_u64() {
                return Some(u.to_string());
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
