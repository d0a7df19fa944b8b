use std::collections::HashMap;
use crate::core::document::Document;
use crate::core::types::FieldValue;

const DEFAULT_MAX_FACETS_PER_FIELD: usize = 100;

/// For every `Facetable` field present on the candidate set, counts
/// distinct stringified values (arrays expanded element-wise), sorted by
/// `(count desc, value asc)` and capped per field. Null/empty values are
/// dropped.
pub fn compute_facets(documents: &[&Document], max_per_field: Option<usize>) -> HashMap<String, Vec<(String, usize)>> {
    let cap = max_per_field.unwrap_or(DEFAULT_MAX_FACETS_PER_FIELD);
    let mut counts: HashMap<String, HashMap<String, usize>> = HashMap::new();

    for doc in documents {
        for (name, field) in doc.fields.iter() {
            if !field.facetable {
                continue;
            }
            let values: Vec<String> = match &field.value {
                FieldValue::List(items) => items.clone(),
                FieldValue::Null => continue,
                other => vec![other.stringify()],
            };
            let field_counts = counts.entry(name.to_string()).or_default();
            for value in values {
                if value.is_empty() {
                    continue;
                }
                *field_counts.entry(value).or_insert(0) += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(field, value_counts)| {
            let mut entries: Vec<(String, usize)> = value_counts.into_iter().collect();
            entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            entries.truncate(cap);
            (field, entries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{DocumentFields, Field};
    use crate::core::types::DocumentKey;

    fn doc(genre: &str) -> Document {
        let mut fields = DocumentFields::new();
        fields.insert("genre", Field::keyword(genre));
        Document::new(DocumentKey(1), 1, fields)
    }

    #[test]
    fn counts_distinct_values_sorted_by_count_desc() {
        let a = doc("Fantasy");
        let b = doc("Fantasy");
        let c = doc("Horror");
        let refs: Vec<&Document> = vec![&a, &b, &c];
        let facets = compute_facets(&refs, None);
        let genre = &facets["genre"];
        assert_eq!(genre[0], ("Fantasy".to_string(), 2));
        assert_eq!(genre[1], ("Horror".to_string(), 1));
    }
}
