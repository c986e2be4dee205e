use std::collections::BTreeSet;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionPolicy {
    /// Drop fields starting with the internal marker from consideration
    pub exclude_internal: bool,

    /// If present, only these fields are kept (intersected with the
    /// discovered set); requested names that were never discovered are a
    /// warning, not an error
    pub include_fields: Option<BTreeSet<String>>,

    /// Fields removed after inclusion filtering
    pub exclude_fields: Option<BTreeSet<String>>,

    /// When false, nested objects and arrays are serialized to JSON
    /// strings instead of being flattened into columns
    pub flatten_nested: bool,

    /// Minimum coverage percentage (over the projected document set) a
    /// field needs to become a column. Must lie in 0..=100.
    pub min_field_coverage: f64,

    /// Restrict the projection to one shape cluster (1-based index over
    /// the collection's clusters)
    pub shape_filter: Option<usize>,
}

impl Default for ProjectionPolicy {
    fn default() -> Self {
        ProjectionPolicy {
            exclude_internal: true,
            include_fields: None,
            exclude_fields: None,
            flatten_nested: true,
            min_field_coverage: 0.0,
            shape_filter: None,
        }
    }
}
