//! Subscriber-facing connection over a running driver

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::CloudConfig;
use crate::driver::{CloudSnapshot, Driver};
use crate::processor::PointCloudProcessor;
use crate::provider::FrameSource;
use crate::stream::ThrottleExt;
use crate::types::UpdateRate;


/// Running point cloud pipeline with any number of snapshot subscribers.
///
/// Dropping the connection cancels the driver task.
pub struct CloudConnection {
    /// Snapshot watch receiver
    snapshots: watch::Receiver<Option<Arc<CloudSnapshot>>>,

    /// Source frequency
    frame_rate: f64,

    /// Cancellation token for stopping the driver
    cancel: CancellationToken,
}

impl CloudConnection {
    /// Start processing `source` with an already configured processor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open<S: FrameSource>(source: S, processor: PointCloudProcessor) -> Self {
        let frame_rate = source.frame_rate();
        let channels = Driver::spawn(source, processor);
        info!("Point cloud connection opened ({}Hz)", frame_rate);

        Self { snapshots: channels.snapshots, frame_rate, cancel: channels.cancel }
    }

    /// Start processing `source` with a fresh processor built from `config`.
    pub fn with_config<S: FrameSource>(source: S, config: CloudConfig) -> Result<Self> {
        Ok(Self::open(source, PointCloudProcessor::new(config)?))
    }

    /// Wait up to `timeout` for the first snapshot.
    pub async fn wait_for_snapshot(&self, timeout: Duration) -> Option<Arc<CloudSnapshot>> {
        let mut snapshots = self.snapshots.clone();
        let waited = tokio::time::timeout(timeout, snapshots.wait_for(Option::is_some)).await;

        match waited {
            Ok(Ok(snapshot)) => snapshot.clone(),
            Ok(Err(_)) => {
                debug!("Driver ended before the first snapshot");
                self.latest()
            }
            Err(_) => {
                warn!("Timeout waiting for first point cloud snapshot");
                None
            }
        }
    }

    /// Subscribe to composited snapshots.
    ///
    /// The stream yields the current snapshot (if any) first, then every
    /// subsequent one, and ends when the source ends. With
    /// [`UpdateRate::Max`] bursts collapse to the newest snapshot.
    pub fn subscribe(&self, rate: UpdateRate) -> impl Stream<Item = Arc<CloudSnapshot>> + Send + 'static {
        let snapshots = WatchStream::new(self.snapshots.clone()).filter_map(|opt| async move { opt });

        match rate.throttle_interval(self.frame_rate) {
            None => snapshots.boxed(),
            Some(interval) => {
                debug!("Throttling subscription to {:?}", interval);
                snapshots.throttle(interval).boxed()
            }
        }
    }

    /// Most recent snapshot, if any frame has been processed.
    pub fn latest(&self) -> Option<Arc<CloudSnapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Frame rate reported by the source
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Stop the driver without dropping the connection.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for CloudConnection {
    fn drop(&mut self) {
        debug!("Dropping point cloud connection");
        self.cancel.cancel();
    }
}
