mod domain;
pub use domain::{DEFAULT_NAMESPACE, MANAGED_BY_LABEL, MANAGED_BY_VALUE, managed_by_marker};
pub use domain::{LabelPair, Labels, ManifestName, Namespace};

mod error;
pub use error::{ModelError, ModelResult};

mod entity;
pub use entity::{ClusterEntity, parse_entities};

mod image;
pub use image::ImageRef;

mod manifest;
pub use manifest::{ClusterTarget, ComposeTarget, DeployTarget, Manifest};

mod workload;
pub use workload::*;
