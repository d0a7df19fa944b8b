use std::cmp::Ordering;
use crate::core::document::Document;
use crate::core::types::FieldValue;

#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: String,
    pub ascending: bool,
}

/// Re-orders candidates by a sortable field's value: nulls sort first,
/// equal concrete types compare natively, otherwise both sides are
/// stringified and compared ordinally.
pub fn sort_documents<'a>(documents: &mut [&'a Document], spec: &SortSpec) {
    documents.sort_by(|a, b| {
        let ordering = compare_field(a, b, &spec.field);
        if spec.ascending { ordering } else { ordering.reverse() }
    });
}

fn compare_field(a: &Document, b: &Document, field: &str) -> Ordering {
    let av = a.fields.get(field).map(|f| &f.value);
    let bv = b.fields.get(field).map(|f| &f.value);

    match (av, bv) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(av), Some(bv)) => compare_values(av, bv),
    }
}

fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
        (FieldValue::Null, _) => Ordering::Less,
        (_, FieldValue::Null) => Ordering::Greater,
        (FieldValue::Number(x), FieldValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (FieldValue::Boolean(x), FieldValue::Boolean(y)) => x.cmp(y),
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        (x, y) => x.stringify().cmp(&y.stringify()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{DocumentFields, Field};
    use crate::core::types::DocumentKey;

    fn doc(key: i64, year: f64) -> Document {
        let mut fields = DocumentFields::new();
        let mut field = Field::keyword("");
        field.value = FieldValue::Number(year);
        fields.insert("year", field);
        Document::new(DocumentKey(key), key as u32, fields)
    }

    #[test]
    fn sorts_ascending_by_numeric_field() {
        let a = doc(1, 2010.0);
        let b = doc(2, 1990.0);
        let mut docs = vec![&a, &b];
        sort_documents(&mut docs, &SortSpec { field: "year".into(), ascending: true });
        assert_eq!(docs[0].key, DocumentKey(2));
    }
}
