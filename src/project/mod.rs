//! Tabular projection - emit a fixed-schema view of a heterogeneous
//! collection
//!
//! The engine flattens (or serializes) every document, computes the final
//! column set through a fixed pipeline of filters (shape cluster, coverage
//! threshold, include/exclude lists), and produces one row per document
//! with missing values filled in. The actual file write is left to the
//! caller; `writer` provides the CSV shape of it.

pub mod engine;
pub mod policy;
pub mod writer;

pub use engine::{project, select_collection, Projection, ProjectionError};
pub use policy::ProjectionPolicy;
pub use writer::write_csv;
