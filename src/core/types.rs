use serde::{Serialize, Deserialize};

/// Internal sequential id assigned by the document collection.
pub type DocId = u32;

/// External, non-unique key. The same key may label several internal
/// documents when a source document has been split into segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey(pub i64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Stringified form used by facets, sorting fallback, and filter comparisons.
    pub fn stringify(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Null => String::new(),
        }
    }
}

/// Semantic field weight, mapped to a multiplier by `FieldWeights` unless
/// an explicit override is present on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldWeight {
    High,
    Med,
    Low,
}
