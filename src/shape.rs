//! Shape analysis - cluster documents by field set and measure coverage
//!
//! Documents in one logical collection rarely share a single schema:
//! optional fields, schema evolution, and distinct sub-types co-located
//! under one name all produce different field sets. This module flattens
//! every document and groups them by the sorted set of field names, so the
//! structural variants of a collection can be inspected and filtered on.
//!
//! All analysis is recomputed per call; nothing is cached across document
//! sets.

use crate::collate::{Document, INTERNAL_FIELD_PREFIX};
use crate::flatten::{flatten_doc, DEFAULT_SEPARATOR};
use indexmap::IndexMap;

/// Sorted field names characterizing one structural variant
pub type ShapeSignature = Vec<String>;

/// Compute the shape signature of a single document: its flattened field
/// names, sorted, minus internal fields when `exclude_internal` is set.
pub fn signature(doc: &Document, exclude_internal: bool) -> ShapeSignature {
    let flat = flatten_doc(doc, DEFAULT_SEPARATOR);

    let mut fields: Vec<String> = flat
        .keys()
        .filter(|k| !exclude_internal || !k.starts_with(INTERNAL_FIELD_PREFIX))
        .cloned()
        .collect();

    fields.sort();
    fields
}

/// Group documents by shape signature.
///
/// Returns signature -> positions of the documents exhibiting it, in
/// first-seen signature order. The index lists partition the input: every
/// document appears in exactly one cluster, in its original position.
/// Field order and value types never affect clustering.
pub fn cluster(
    documents: &[Document],
    exclude_internal: bool,
) -> IndexMap<ShapeSignature, Vec<usize>> {
    let mut clusters: IndexMap<ShapeSignature, Vec<usize>> = IndexMap::new();

    for (idx, doc) in documents.iter().enumerate() {
        clusters
            .entry(signature(doc, exclude_internal))
            .or_default()
            .push(idx);
    }

    clusters
}

/// Compute per-field coverage: the percentage of documents whose flattened,
/// filtered field set contains each field.
///
/// Returned sorted descending by percentage, ties broken by first-seen
/// field order. The document set must be non-empty; callers guard before
/// calling (an empty set has no meaningful coverage).
pub fn coverage(documents: &[Document], exclude_internal: bool) -> Vec<(String, f64)> {
    debug_assert!(!documents.is_empty(), "coverage over empty document set");

    let mut counts: IndexMap<String, usize> = IndexMap::new();

    for doc in documents {
        for field in signature(doc, exclude_internal) {
            *counts.entry(field).or_insert(0) += 1;
        }
    }

    let total = documents.len() as f64;
    let mut table: Vec<(String, f64)> = counts
        .into_iter()
        .map(|(field, count)| (field, count as f64 / total * 100.0))
        .collect();

    // Stable sort keeps first-seen order for equal percentages
    table.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    table
}
