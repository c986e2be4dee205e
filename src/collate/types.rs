use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record in a collection - a nested key/value structure
pub type Document = Map<String, Value>;

/// Collections keyed by name, in the order they were first seen.
/// Document order within a collection is source record order.
pub type NamedCollections = IndexMap<String, Vec<Document>>;

/// Field names starting with this prefix are internal metadata and are
/// excluded from shape signatures, coverage, and projected columns unless
/// explicitly requested
pub const INTERNAL_FIELD_PREFIX: &str = "_";

/// Record field holding the identity key, an object with a `path` member
/// of the form `collection/docid[/...]`
pub const IDENTITY_KEY_FIELD: &str = "_key";

/// Internal field the assembler injects so consumers can recover the
/// document identifier without re-parsing the identity key
pub const DOCUMENT_ID_FIELD: &str = "_document_id";

/// Result of assembling raw records into collections
#[derive(Debug, Clone, Default)]
pub struct Collated {
    /// Documents grouped by collection name, first-seen order
    pub collections: NamedCollections,

    /// Documents whose identity key could not be resolved
    pub orphaned: Vec<Document>,
}

impl Collated {
    /// Total number of documents across collections and orphans
    pub fn total_documents(&self) -> usize {
        self.collections.values().map(Vec::len).sum::<usize>() + self.orphaned.len()
    }
}

/// Serializable hand-off artifact: collated collections plus a metadata
/// block, in the layout consumed by the shape and projection tooling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub metadata: ExportMetadata,

    pub collections: NamedCollections,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphaned_documents: Vec<Document>,
}

/// Summary counts recorded alongside an export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub total_documents: usize,
    pub total_collections: usize,
    pub source_files_processed: usize,
}

impl Export {
    /// Wrap a collated set, filling in the metadata block
    pub fn from_collated(collated: Collated, source_files_processed: usize) -> Self {
        let metadata = ExportMetadata {
            total_documents: collated.total_documents(),
            total_collections: collated.collections.len(),
            source_files_processed,
        };

        Export {
            metadata,
            collections: collated.collections,
            orphaned_documents: collated.orphaned,
        }
    }
}
