//! Collection assembly - group raw export records into named collections
//!
//! Export records arrive as opaque JSON objects from the storage-format
//! parser. Each carries an identity key describing where the document lived;
//! this module resolves those keys and groups documents by collection,
//! preserving source order. Records whose key cannot be resolved are kept
//! in a separate orphaned set rather than dropped.

pub mod assembler;
pub mod types;

pub use assembler::collate;
pub use types::{Collated, Document, Export, ExportMetadata, NamedCollections};
pub use types::{DOCUMENT_ID_FIELD, IDENTITY_KEY_FIELD, INTERNAL_FIELD_PREFIX};
