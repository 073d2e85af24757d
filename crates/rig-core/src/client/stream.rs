use tokio::sync::mpsc;

use rig_model::WorkloadSnapshot;

use crate::client::ClientError;

/// Default buffer between a watch producer and its consumer.
pub const WATCH_BUFFER: usize = 64;

/// One delivery on a subscription: a snapshot, or the failure that ended it.
pub type SnapshotEvent = Result<WorkloadSnapshot, ClientError>;

/// Producer half of a workload subscription.
pub type SnapshotSender = mpsc::Sender<SnapshotEvent>;

/// Ordered stream of workload snapshots from a change subscription.
///
/// A producer that fails sends the error as its last event. Dropping the stream
/// releases the subscription: producers observe the closed channel
/// (`SnapshotSender::closed`) and stop.
#[derive(Debug)]
pub struct SnapshotStream {
    rx: mpsc::Receiver<SnapshotEvent>,
}

impl SnapshotStream {
    /// Create a connected producer/stream pair.
    pub fn channel(capacity: usize) -> (SnapshotSender, SnapshotStream) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, SnapshotStream { rx })
    }

    /// Next event in delivery order; `None` once every producer is gone.
    pub async fn next(&mut self) -> Option<SnapshotEvent> {
        self.rx.recv().await
    }
}
