use crate::collate::{Document, Export, INTERNAL_FIELD_PREFIX};
use crate::flatten::{flatten_doc, DEFAULT_SEPARATOR};
use crate::project::policy::ProjectionPolicy;
use crate::shape;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Fatal projection failures. Structural ambiguities (missing fields per
/// row, flattening collisions) are never errors; only configuration
/// violations and "nothing to do" conditions abort a run.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("collection '{name}' not found; available: {available:?}")]
    CollectionNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("collection is empty, nothing to project")]
    EmptyCollection,

    #[error("min_field_coverage must lie in 0..=100, got {0}")]
    InvalidThreshold(f64),

    #[error("shape cluster {given} is out of range; valid range is 1..={clusters}")]
    ShapeIndexOutOfRange { given: usize, clusters: usize },

    #[error("no fields left to project after applying filters")]
    EmptyFieldSet,
}

/// Result of a projection: the header plus one row per document.
/// Rows carry every selected field, with an empty string standing in for
/// values a document lacks.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Selected field names, lexicographically sorted
    pub fields: Vec<String>,

    /// One row per projected document, in original relative order
    pub rows: Vec<Map<String, Value>>,

    /// Requested include fields that were never discovered (non-fatal)
    pub missing_fields: Vec<String>,
}

/// Look up a collection in an export, failing with the list of available
/// names when it is missing or empty.
pub fn select_collection<'a>(
    export: &'a Export,
    name: &str,
) -> Result<&'a [Document], ProjectionError> {
    let documents = export.collections.get(name).ok_or_else(|| {
        ProjectionError::CollectionNotFound {
            name: name.to_string(),
            available: export.collections.keys().cloned().collect(),
        }
    })?;

    if documents.is_empty() {
        return Err(ProjectionError::EmptyCollection);
    }

    Ok(documents)
}

/// Project a document set into a fixed-schema table.
///
/// The field set is computed in a fixed stage order, each stage operating
/// on the previous stage's output: shape filter, flatten/serialize, field
/// union, coverage threshold, include intersection, exclude subtraction,
/// lexicographic sort. No partial output is produced on a fatal path.
pub fn project(
    documents: &[Document],
    policy: &ProjectionPolicy,
) -> Result<Projection, ProjectionError> {
    if !(0.0..=100.0).contains(&policy.min_field_coverage) {
        return Err(ProjectionError::InvalidThreshold(policy.min_field_coverage));
    }

    if documents.is_empty() {
        return Err(ProjectionError::EmptyCollection);
    }

    // Stage 1: restrict to one shape cluster if requested
    let selected: Vec<&Document> = match policy.shape_filter {
        Some(index) => {
            let clusters = shape::cluster(documents, policy.exclude_internal);
            if index == 0 || index > clusters.len() {
                return Err(ProjectionError::ShapeIndexOutOfRange {
                    given: index,
                    clusters: clusters.len(),
                });
            }
            let (_, positions) = clusters.get_index(index - 1).unwrap();
            positions.iter().map(|&i| &documents[i]).collect()
        }
        None => documents.iter().collect(),
    };

    // Stage 2: flatten, or serialize nested values to JSON strings
    let processed: Vec<Map<String, Value>> = selected
        .iter()
        .map(|doc| {
            if policy.flatten_nested {
                flatten_doc(doc, DEFAULT_SEPARATOR)
            } else {
                serialize_nested(doc)
            }
        })
        .collect();

    // Stage 3: union of fields, counting occurrences for coverage
    let mut field_counts: IndexMap<String, usize> = IndexMap::new();
    for doc in &processed {
        for key in doc.keys() {
            if policy.exclude_internal && key.starts_with(INTERNAL_FIELD_PREFIX) {
                continue;
            }
            *field_counts.entry(key.clone()).or_insert(0) += 1;
        }
    }

    // Stage 4: drop fields below the coverage threshold
    let total = processed.len() as f64;
    let mut fields: Vec<String> = field_counts
        .into_iter()
        .filter(|(_, count)| *count as f64 / total * 100.0 >= policy.min_field_coverage)
        .map(|(field, _)| field)
        .collect();

    // Stage 5: intersect with the include list, warning on absent names
    let mut missing_fields = Vec::new();
    if let Some(include) = &policy.include_fields {
        for requested in include {
            if !fields.contains(requested) {
                warn!(field = %requested, "requested field not found in collection");
                missing_fields.push(requested.clone());
            }
        }
        fields.retain(|f| include.contains(f));
    }

    // Stage 6: subtract the exclude list
    if let Some(exclude) = &policy.exclude_fields {
        fields.retain(|f| !exclude.contains(f));
    }

    // Stage 7: sort for deterministic column order
    fields.sort();

    if fields.is_empty() {
        return Err(ProjectionError::EmptyFieldSet);
    }

    debug!(
        documents = processed.len(),
        columns = fields.len(),
        "projection field set computed"
    );

    let rows = processed
        .iter()
        .map(|doc| {
            fields
                .iter()
                .map(|field| {
                    let value = doc
                        .get(field)
                        .cloned()
                        .unwrap_or_else(|| Value::String(String::new()));
                    (field.clone(), value)
                })
                .collect()
        })
        .collect();

    Ok(Projection {
        fields,
        rows,
        missing_fields,
    })
}

/// No-flatten mode: nested objects and arrays become compact JSON strings,
/// scalar fields pass through unchanged.
fn serialize_nested(doc: &Document) -> Map<String, Value> {
    doc.iter()
        .map(|(key, value)| {
            let projected = match value {
                Value::Object(_) | Value::Array(_) => {
                    // Value serialization cannot fail
                    Value::String(serde_json::to_string(value).unwrap_or_default())
                }
                other => other.clone(),
            };
            (key.clone(), projected)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn docs(values: Vec<Value>) -> Vec<Document> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                _ => panic!("expected object"),
            })
            .collect()
    }

    fn names(items: &[&str]) -> Option<BTreeSet<String>> {
        Some(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_default_projection() {
        let set = docs(vec![
            json!({"a": 1, "b": {"c": 2}}),
            json!({"a": 3}),
        ]);

        let result = project(&set, &ProjectionPolicy::default()).unwrap();
        assert_eq!(result.fields, vec!["a", "b_c"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].get("b_c").unwrap(), &json!(2));
        assert_eq!(result.rows[1].get("a").unwrap(), &json!(3));
        // Absent field filled with the empty value
        assert_eq!(result.rows[1].get("b_c").unwrap(), &json!(""));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let set = docs(vec![
            json!({"b": 1, "a": 2}),
            json!({"c": 3}),
        ]);

        let policy = ProjectionPolicy::default();
        let first = project(&set, &policy).unwrap();
        let second = project(&set, &policy).unwrap();

        assert_eq!(first.fields, second.fields);
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn test_include_then_exclude_composition() {
        let set = docs(vec![json!({"a": 1, "b": 2, "c": 3})]);

        let policy = ProjectionPolicy {
            include_fields: names(&["a", "b"]),
            exclude_fields: names(&["b"]),
            ..Default::default()
        };

        let result = project(&set, &policy).unwrap();
        assert_eq!(result.fields, vec!["a"]);
    }

    #[test]
    fn test_missing_include_field_is_warning_not_error() {
        let set = docs(vec![json!({"a": 1})]);
        let policy = ProjectionPolicy {
            include_fields: names(&["a", "nope"]),
            ..Default::default()
        };

        let result = project(&set, &policy).unwrap();
        assert_eq!(result.fields, vec!["a"]);
        assert_eq!(result.missing_fields, vec!["nope"]);
    }

    #[test]
    fn test_min_coverage_drops_rare_fields() {
        let set = docs(vec![
            json!({"a": 1, "b": {"c": 2}}),
            json!({"a": 3}),
        ]);

        let policy = ProjectionPolicy {
            min_field_coverage: 60.0,
            ..Default::default()
        };

        let result = project(&set, &policy).unwrap();
        assert_eq!(result.fields, vec!["a"]);
    }

    #[test]
    fn test_invalid_threshold_rejected_before_processing() {
        let set = docs(vec![json!({"a": 1})]);
        let policy = ProjectionPolicy {
            min_field_coverage: 150.0,
            ..Default::default()
        };

        assert!(matches!(
            project(&set, &policy),
            Err(ProjectionError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_empty_collection_is_fatal() {
        assert!(matches!(
            project(&[], &ProjectionPolicy::default()),
            Err(ProjectionError::EmptyCollection)
        ));
    }

    #[test]
    fn test_empty_field_set_is_fatal() {
        let set = docs(vec![json!({"a": 1})]);
        let policy = ProjectionPolicy {
            exclude_fields: names(&["a"]),
            ..Default::default()
        };

        assert!(matches!(
            project(&set, &policy),
            Err(ProjectionError::EmptyFieldSet)
        ));
    }

    #[test]
    fn test_internal_fields_dropped_by_default() {
        let set = docs(vec![json!({"a": 1, "_document_id": "u1"})]);

        let result = project(&set, &ProjectionPolicy::default()).unwrap();
        assert_eq!(result.fields, vec!["a"]);

        let policy = ProjectionPolicy {
            exclude_internal: false,
            ..Default::default()
        };
        let result = project(&set, &policy).unwrap();
        assert_eq!(result.fields, vec!["_document_id", "a"]);
    }

    #[test]
    fn test_shape_filter_restricts_documents() {
        let set = docs(vec![
            json!({"a": 1, "b": 2}),
            json!({"a": 3}),
            json!({"a": 4, "b": 5}),
        ]);

        // Cluster 1 is the first-seen shape: {a, b}
        let policy = ProjectionPolicy {
            shape_filter: Some(1),
            ..Default::default()
        };

        let result = project(&set, &policy).unwrap();
        assert_eq!(result.fields, vec!["a", "b"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].get("a").unwrap(), &json!(4));
    }

    #[test]
    fn test_shape_filter_out_of_range() {
        let set = docs(vec![json!({"a": 1})]);
        let policy = ProjectionPolicy {
            shape_filter: Some(5),
            ..Default::default()
        };

        match project(&set, &policy) {
            Err(ProjectionError::ShapeIndexOutOfRange { given, clusters }) => {
                assert_eq!(given, 5);
                assert_eq!(clusters, 1);
            }
            other => panic!("expected out-of-range error, got {:?}", other),
        }
    }

    #[test]
    fn test_coverage_computed_after_shape_filter() {
        // Within cluster 2 ({a} only), "a" has 100% coverage even though
        // "b" covers two thirds of the whole collection.
        let set = docs(vec![
            json!({"a": 1, "b": 2}),
            json!({"a": 3}),
            json!({"a": 4, "b": 5}),
        ]);

        let policy = ProjectionPolicy {
            shape_filter: Some(2),
            min_field_coverage: 100.0,
            ..Default::default()
        };

        let result = project(&set, &policy).unwrap();
        assert_eq!(result.fields, vec!["a"]);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_no_flatten_serializes_nested_values() {
        let set = docs(vec![json!({"a": 1, "b": {"c": 2}, "tags": [1, 2]})]);

        let policy = ProjectionPolicy {
            flatten_nested: false,
            ..Default::default()
        };

        let result = project(&set, &policy).unwrap();
        assert_eq!(result.fields, vec!["a", "b", "tags"]);
        assert_eq!(result.rows[0].get("b").unwrap(), &json!("{\"c\":2}"));
        assert_eq!(result.rows[0].get("tags").unwrap(), &json!("[1,2]"));
        assert_eq!(result.rows[0].get("a").unwrap(), &json!(1));
    }

    #[test]
    fn test_select_collection_reports_available() {
        let collated = crate::collate::collate(docs(vec![
            json!({"_key": {"path": "users/u1"}, "name": "Alice"}),
        ]));
        let export = Export::from_collated(collated, 1);

        assert!(select_collection(&export, "users").is_ok());

        match select_collection(&export, "posts") {
            Err(ProjectionError::CollectionNotFound { available, .. }) => {
                assert_eq!(available, vec!["users"]);
            }
            other => panic!("expected not-found error, got {:?}", other),
        }
    }
}
