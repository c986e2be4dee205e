//! # Strata - Document-Export Tabulation Toolkit
//!
//! A library for turning heterogeneous document-store exports into tabular
//! data: group raw records into named collections, discover the structural
//! shapes documents take, and project a chosen field subset into a
//! fixed-schema table that tolerates missing values.
//!
//! ## Modules
//!
//! - **collate**: group raw export records into named collections
//! - **flatten**: collapse nested documents into path-qualified keys
//! - **shape**: cluster documents by field set, measure field coverage
//! - **project**: emit a fixed-schema tabular view of a collection
//!
//! ## Quick Start
//!
//! ```rust
//! use strata::collate::collate;
//! use strata::project::{project, ProjectionPolicy};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let records = vec![
//!     json!({"_key": {"path": "users/u1"}, "name": "Alice", "profile": {"age": 30}}),
//!     json!({"_key": {"path": "users/u2"}, "name": "Bob"}),
//! ];
//!
//! let collated = collate(records.into_iter().map(|r| match r {
//!     serde_json::Value::Object(map) => map,
//!     _ => unreachable!(),
//! }));
//!
//! let users = collated.collections.get("users").unwrap();
//! let table = project(users, &ProjectionPolicy::default())?;
//!
//! assert_eq!(table.fields, vec!["name", "profile_age"]);
//! assert_eq!(table.rows.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Shape Analysis
//!
//! ```rust
//! use strata::shape;
//! use serde_json::json;
//!
//! let documents: Vec<_> = [
//!     json!({"a": 1, "b": {"c": 2}}),
//!     json!({"a": 3}),
//! ]
//! .into_iter()
//! .map(|v| match v {
//!     serde_json::Value::Object(map) => map,
//!     _ => unreachable!(),
//! })
//! .collect();
//!
//! let clusters = shape::cluster(&documents, true);
//! assert_eq!(clusters.len(), 2); // two structural variants
//!
//! let coverage = shape::coverage(&documents, true);
//! assert_eq!(coverage[0], ("a".to_string(), 100.0));
//! ```

pub mod collate;
pub mod flatten;
pub mod project;
pub mod shape;

// Re-export commonly used types for convenience
pub use collate::{collate, Collated, Document, Export, NamedCollections};
pub use flatten::{flatten_doc, DEFAULT_SEPARATOR};
pub use project::{project, select_collection, Projection, ProjectionError, ProjectionPolicy};
