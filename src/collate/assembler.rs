use crate::collate::types::{
    Collated, Document, DOCUMENT_ID_FIELD, IDENTITY_KEY_FIELD,
};
use serde_json::Value;
use tracing::debug;

/// Group raw export records into named collections.
///
/// Each record's identity key (`_key.path`) is split on `/`: the first
/// segment names the collection, the second is the document identifier,
/// which is injected into the stored copy as `_document_id`. Records
/// without a resolvable key are routed to the orphaned set - a malformed
/// key is never an error. Duplicate identifiers are preserved positionally.
pub fn collate<I>(records: I) -> Collated
where
    I: IntoIterator<Item = Document>,
{
    let mut collated = Collated::default();

    for mut doc in records {
        match resolve_identity(&doc) {
            Some((collection, document_id)) => {
                doc.insert(
                    DOCUMENT_ID_FIELD.to_string(),
                    Value::String(document_id),
                );
                collated
                    .collections
                    .entry(collection)
                    .or_default()
                    .push(doc);
            }
            None => collated.orphaned.push(doc),
        }
    }

    debug!(
        collections = collated.collections.len(),
        orphaned = collated.orphaned.len(),
        "collated records"
    );

    collated
}

/// Extract (collection name, document id) from a record's identity key.
/// Returns None when the key field is absent, not an object with a string
/// `path`, or the path has fewer than two segments.
fn resolve_identity(doc: &Document) -> Option<(String, String)> {
    let path = doc
        .get(IDENTITY_KEY_FIELD)?
        .as_object()?
        .get("path")?
        .as_str()?;

    let mut segments = path.split('/');
    let collection = segments.next()?;
    let document_id = segments.next()?;

    Some((collection.to_string(), document_id.to_string()))
}
