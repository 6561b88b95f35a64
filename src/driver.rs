//! Driver spawns and manages the point cloud processing task

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::compositor::OutputBuffer;
use crate::processor::PointCloudProcessor;
use crate::provider::FrameSource;

/// Consecutive source errors tolerated before the driver gives up.
pub const MAX_SOURCE_ERRORS: u32 = 10;

/// Immutable copy of the composited output after one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudSnapshot {
    /// Source frames seen when this snapshot was taken, starting at 1
    pub sequence: u64,
    /// Flat `[x, y, z, ...]` of the valid points
    pub positions: Vec<f32>,
    /// Flat `[r, g, b, ...]` of the valid points, when coloring is active
    pub colors: Option<Vec<f32>>,
}

impl CloudSnapshot {
    /// Copy the valid region of `output`.
    pub fn capture(sequence: u64, output: &OutputBuffer) -> Self {
        Self {
            sequence,
            positions: output.valid_positions().to_vec(),
            colors: output.valid_colors().map(<[f32]>::to_vec),
        }
    }

    /// Number of points in the snapshot.
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for composited snapshots; `None` until the first frame
    pub snapshots: watch::Receiver<Option<Arc<CloudSnapshot>>>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the processing task
///
/// One task owns both the source and the processor, so frames are processed
/// strictly one at a time and each snapshot reflects a complete pass.
pub struct Driver;

impl Driver {
    /// Spawn the processing task for `source`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(source: S, processor: PointCloudProcessor) -> DriverChannels
    where
        S: FrameSource,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::process_task(source, processor, snapshot_tx, cancel_task).await;
        });

        DriverChannels { snapshots: snapshot_rx, cancel }
    }

    async fn process_task<S>(
        mut source: S,
        mut processor: PointCloudProcessor,
        snapshot_tx: watch::Sender<Option<Arc<CloudSnapshot>>>,
        cancel: CancellationToken,
    ) where
        S: FrameSource,
    {
        info!("Point cloud driver started");
        let mut published = 0u64;
        let mut error_count = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Driver cancelled");
                    break;
                }
                result = source.next_frame() => result,
            };

            match result {
                Ok(Some(frame)) => {
                    error_count = 0;

                    match processor.process(&frame) {
                        Ok(written) => {
                            let sequence = processor.frames_seen();
                            if !processor.samples(sequence) {
                                continue;
                            }

                            trace!("Frame {}: {} points composited", sequence, written);
                            let snapshot = CloudSnapshot::capture(sequence, processor.output());
                            published += 1;
                            if snapshot_tx.send(Some(Arc::new(snapshot))).is_err() {
                                debug!("Snapshot receivers dropped, shutting down");
                                break;
                            }
                        }
                        Err(e) => {
                            // Frame-level failures skip the frame but keep the stream alive
                            debug!("Frame {} skipped: {}", processor.frames_seen(), e);
                        }
                    }
                }
                Ok(None) => {
                    // Dropping the sender ends every subscription; the last snapshot stays readable
                    info!("Frame source ended");
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    error!("Frame source error ({}/{}): {}", error_count, MAX_SOURCE_ERRORS, e);

                    if error_count >= MAX_SOURCE_ERRORS || !e.is_retryable() {
                        error!("Giving up on frame source");
                        break;
                    }

                    // Exponential backoff: 100ms, 200ms, 400ms, ... capped at 3.2s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(6)));
                    warn!("Retrying frame source in {:?}", backoff);
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        info!(
            "Driver ended ({} frames seen, {} snapshots published)",
            processor.frames_seen(),
            published
        );
    }
}
