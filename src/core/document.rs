use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::core::config::FieldWeights;
use crate::core::types::{DocId, DocumentKey, FieldValue, FieldWeight};

/// Reserved private-use code point separating concatenated field values in
/// a document's indexed text. Distinct from the tokenizer's start/stop pad
/// code points so field boundaries never get mistaken for string edges.
pub const FIELD_DELIMITER: char = '\u{E002}';

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub value: FieldValue,
    pub indexable: bool,
    pub filterable: bool,
    pub facetable: bool,
    pub sortable: bool,
    pub word_indexing: bool,
    pub weight: FieldWeight,
    pub weight_override: Option<f32>,
}

impl Field {
    pub fn text(value: impl Into<String>) -> Self {
        Field {
            value: FieldValue::Text(value.into()),
            indexable: true,
            filterable: true,
            facetable: false,
            sortable: false,
            word_indexing: true,
            weight: FieldWeight::Med,
            weight_override: None,
        }
    }

    pub fn keyword(value: impl Into<String>) -> Self {
        Field {
            value: FieldValue::Text(value.into()),
            indexable: false,
            filterable: true,
            facetable: true,
            sortable: true,
            word_indexing: false,
            weight: FieldWeight::Low,
            weight_override: None,
        }
    }

    pub fn multiplier(&self, weights: &FieldWeights) -> f32 {
        if let Some(w) = self.weight_override {
            return w;
        }
        match self.weight {
            FieldWeight::High => weights.high,
            FieldWeight::Med => weights.med,
            FieldWeight::Low => weights.low,
        }
    }
}

/// Boundary marker emitted while concatenating a document's fields for
/// indexing: the char position in the concatenated text where a field
/// begins, and the weight that applies to tokens from that position on.
#[derive(Debug, Clone, Copy)]
pub struct FieldBoundary {
    pub position: usize,
    pub weight: f32,
}

/// Insertion-order-preserving mapping from field name to `Field`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFields {
    order: Vec<String>,
    fields: HashMap<String, Field>,
}

impl DocumentFields {
    pub fn new() -> Self {
        DocumentFields { order: Vec::new(), fields: HashMap::new() }
    }

    pub fn insert(&mut self, name: impl Into<String>, field: Field) {
        let name = name.into();
        if !self.fields.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.fields.insert(name, field);
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.order.iter().map(move |name| (name.as_str(), self.fields.get(name).unwrap()))
    }

    /// Concatenates every indexable, word-indexed field's text into a single
    /// string separated by `delimiter`, returning the boundary markers in
    /// ascending-position order so the tokenizer can attribute weight per span.
    pub fn concatenate_for_indexing(&self, delimiter: char, weights: &FieldWeights) -> (String, Vec<FieldBoundary>) {
        let mut text = String::new();
        let mut boundaries = Vec::new();

        for (_name, field) in self.iter() {
            if !field.indexable || !field.word_indexing {
                continue;
            }
            let weight = field.multiplier(weights);
            let values: Vec<&str> = match &field.value {
                FieldValue::Text(s) => vec![s.as_str()],
                FieldValue::List(items) => items.iter().map(|s| s.as_str()).collect(),
                FieldValue::Number(_) | FieldValue::Boolean(_) | FieldValue::Null => continue,
            };
            for value in values {
                boundaries.push(FieldBoundary { position: text.chars().count(), weight });
                if !text.is_empty() {
                    text.push(delimiter);
                }
                text.push_str(value);
            }
        }

        (text, boundaries)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub key: DocumentKey,
    pub id: DocId,
    pub segment_number: i32,
    pub fields: DocumentFields,
    pub indexed_text: String,
    pub client_information: Option<String>,
    pub deleted: bool,
}

impl Document {
    pub fn new(key: DocumentKey, id: DocId, fields: DocumentFields) -> Self {
        Document {
            key,
            id,
            segment_number: 0,
            fields,
            indexed_text: String::new(),
            client_information: None,
            deleted: false,
        }
    }

    /// Identifies the document family this segment belongs to: the id that
    /// segment 0 of the family would have been assigned.
    pub fn base_id(&self) -> DocId {
        self.id.wrapping_sub(self.segment_number as u32)
    }

    /// JSON encoding for debugging/export, alongside the binary form
    /// `Engine::save` uses for the whole collection.
    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::core::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DocumentKey, FieldValue};

    #[test]
    fn json_round_trip_preserves_fields_and_flags() {
        let mut fields = DocumentFields::new();
        fields.insert("title", Field::text("dragon hoard"));
        fields.insert("genre", Field::keyword("Fantasy"));

        let mut doc = Document::new(DocumentKey(7), 3, fields);
        doc.segment_number = 1;
        doc.client_information = Some("ingested-by-test".into());

        let json = doc.to_json().unwrap();
        let restored = Document::from_json(&json).unwrap();

        assert_eq!(restored.key, doc.key);
        assert_eq!(restored.segment_number, 1);
        assert_eq!(restored.client_information.as_deref(), Some("ingested-by-test"));
        match restored.fields.get("title").unwrap().value {
            FieldValue::Text(ref s) => assert_eq!(s, "dragon hoard"),
            _ => panic!("expected text field"),
        }
    }

    #[test]
    fn base_id_recovers_the_first_segment_of_a_family() {
        let doc_family_member = Document::new(DocumentKey(1), 42, DocumentFields::new());
        let mut segment = doc_family_member.clone();
        segment.id = 45;
        segment.segment_number = 3;
        assert_eq!(segment.base_id(), 42);
    }
}
