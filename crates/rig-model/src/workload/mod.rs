mod container;
pub use container::{
    ContainerId, ContainerState, ContainerStatus, StateRunning, StateTerminated, StateWaiting,
};

mod snapshot;
pub use snapshot::{
    CONDITION_SCHEDULED, ContainerSpec, REASON_UNSCHEDULABLE, WorkloadCondition, WorkloadMeta,
    WorkloadRef, WorkloadSnapshot, WorkloadSpec, WorkloadStatus,
};
