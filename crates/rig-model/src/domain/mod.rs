mod label;
pub use label::LabelPair;

mod labels;
pub use labels::Labels;

mod constants;
pub use constants::{DEFAULT_NAMESPACE, MANAGED_BY_LABEL, MANAGED_BY_VALUE, managed_by_marker};

/// Name of a manifest as declared by the project configuration.
pub type ManifestName = String;

/// Namespace of a cluster object.
pub type Namespace = String;
