//! Well-known label keys and values shared by the deploy and teardown paths.

use crate::LabelPair;

/// Label key of the ownership marker.
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Label value of the ownership marker.
pub const MANAGED_BY_VALUE: &str = "rig";

/// Namespace assumed for cluster objects that do not declare one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// The ownership marker stamped onto every entity this tool creates.
///
/// Teardown only deletes entities carrying this exact pair.
pub fn managed_by_marker() -> LabelPair {
    LabelPair::new(MANAGED_BY_LABEL, MANAGED_BY_VALUE)
}
