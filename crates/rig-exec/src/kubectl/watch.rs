//! Incremental decoding of `kubectl get --watch -o json` output.
//!
//! kubectl prints one pretty-printed JSON object per change with no framing, so
//! bytes are buffered until at least one complete object is available.
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace, warn};

use rig_core::{ClientError, OpContext, SnapshotSender};
use rig_model::WorkloadSnapshot;

const READ_CHUNK: usize = 8 * 1024;

/// Buffer of undecoded bytes from a concatenated JSON stream.
#[derive(Debug, Default)]
pub struct JsonStreamDecoder {
    buf: Vec<u8>,
}

impl JsonStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and return every object completed by them.
    ///
    /// A trailing partial object stays buffered for the next call.
    pub fn push<T: DeserializeOwned>(&mut self, bytes: &[u8]) -> Result<Vec<T>, ClientError> {
        self.buf.extend_from_slice(bytes);

        let mut out = Vec::new();
        let mut stream = serde_json::Deserializer::from_slice(&self.buf).into_iter::<T>();
        let consumed = loop {
            let offset = stream.byte_offset();
            match stream.next() {
                Some(Ok(item)) => out.push(item),
                Some(Err(e)) if e.is_eof() => break offset,
                Some(Err(e)) => return Err(ClientError::Decode(e.to_string())),
                None => break stream.byte_offset(),
            }
        };
        self.buf.drain(..consumed);
        Ok(out)
    }

    /// Bytes still waiting for the rest of their object, ignoring whitespace.
    pub fn pending(&self) -> usize {
        self.buf.iter().filter(|b| !b.is_ascii_whitespace()).count()
    }
}

/// Why [`pump`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchEnd {
    /// The reader reached the end of its output.
    Eof,
    /// The consumer went away or `ctx` is done.
    Stopped,
    /// Output could not be read or decoded. The error was sent to the consumer.
    Failed,
}

/// Copy decoded snapshots from `reader` into `tx` until the reader ends, the
/// consumer goes away, or `ctx` is done.
pub(crate) async fn pump<R>(ctx: &OpContext, mut reader: R, tx: &SnapshotSender) -> WatchEnd
where
    R: AsyncRead + Unpin,
{
    let mut decoder = JsonStreamDecoder::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let read = tokio::select! {
            biased;
            err = ctx.done() => {
                debug!(reason = %err, "watch stopped by context");
                return WatchEnd::Stopped;
            }
            _ = tx.closed() => {
                debug!("watch consumer dropped");
                return WatchEnd::Stopped;
            }
            read = reader.read(&mut chunk) => read,
        };

        let n = match read {
            Ok(0) => {
                if decoder.pending() > 0 {
                    warn!(pending = decoder.pending(), "watch output ended mid-object");
                }
                debug!("watch output ended");
                return WatchEnd::Eof;
            }
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "failed to read watch output");
                let _ = tx.send(Err(ClientError::Io(e))).await;
                return WatchEnd::Failed;
            }
        };

        let snapshots = match decoder.push::<WorkloadSnapshot>(&chunk[..n]) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "undecodable watch output");
                let _ = tx.send(Err(e)).await;
                return WatchEnd::Failed;
            }
        };
        for snapshot in snapshots {
            trace!(workload = %snapshot.reference(), phase = ?snapshot.status.phase, "watch event");
            if tx.send(Ok(snapshot)).await.is_err() {
                return WatchEnd::Stopped;
            }
        }
    }
}
