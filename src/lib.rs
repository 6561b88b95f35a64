//! Streaming point cloud decoding for browser-style renderers.
//!
//! pointstream turns `sensor_msgs/PointCloud2` frames, delivered as raw bytes
//! or as base64 text, into fixed-capacity position and color arrays ready
//! for upload to a GPU.
//!
//! # Features
//!
//! - **Streaming base64**: records are decoded straight out of the text
//!   payload, skipping unwanted records without materializing them
//! - **Subsampling**: keep every `point_ratio`-th record and every
//!   `message_ratio`-th frame
//! - **Persistence**: composite the last `decay_depth` frames, newest first
//! - **Async delivery**: a driver task publishes snapshots to any number of
//!   throttled subscribers
//!
//! # Quick Start
//!
//! ```rust
//! use pointstream::{CloudConfig, PointCloudProcessor};
//! use pointstream::types::{EncodedFrame, Endianness, FieldType, PointField};
//!
//! let fields = vec![
//!     PointField::new("x", 0, FieldType::Float32),
//!     PointField::new("y", 4, FieldType::Float32),
//!     PointField::new("z", 8, FieldType::Float32),
//! ];
//! // "AACAPwAAAEAAAEBA" is one record: x=1.0, y=2.0, z=3.0
//! let frame = EncodedFrame::text(12, fields, 1, 1, Endianness::Little, "AACAPwAAAEAAAEBA");
//!
//! let mut processor = PointCloudProcessor::new(CloudConfig::default())?;
//! processor.process(&frame)?;
//! assert_eq!(processor.output().valid_positions(), &[1.0, 2.0, 3.0]);
//! # Ok::<(), pointstream::PointCloudError>(())
//! ```
//!
//! ## Example (recording replay)
//!
//! ```rust,no_run
//! use pointstream::{CloudConfig, PointStream, UpdateRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> pointstream::Result<()> {
//!     let connection = PointStream::replay("scan.jsonl", 10.0, CloudConfig::default()).await?;
//!     let mut snapshots = connection.subscribe(UpdateRate::Max(5));
//!
//!     while let Some(snapshot) = snapshots.next().await {
//!         println!("{} points", snapshot.len());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoding pipeline
pub mod codec;
pub mod colormap;
pub mod compositor;
pub mod config;
pub mod decoder;
pub mod layout;
pub mod message;
pub mod processor;

// Stream-based delivery
pub mod connection;
pub mod driver;
pub mod provider;
pub mod providers;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

// Pipeline exports
pub use colormap::{Colormap, Grayscale, PackedRgb};
pub use compositor::{HistoryCompositor, OutputBuffer};
pub use config::CloudConfig;
pub use decoder::FrameDecoder;
pub use layout::FieldLayout;
pub use message::PointCloud2Message;
pub use processor::PointCloudProcessor;

// Main API exports
pub use connection::CloudConnection;
pub use driver::CloudSnapshot;
pub use provider::FrameSource;
pub use providers::{ChannelSource, FrameSender, ReplaySource};

/// Unified entry point for point cloud connections.
///
/// Both constructors spawn the driver task and must run inside a tokio
/// runtime.
///
/// ## Transport feed
/// ```rust,no_run
/// use pointstream::{CloudConfig, PointStream};
///
/// #[tokio::main]
/// async fn main() -> pointstream::Result<()> {
///     let (sender, connection) = PointStream::channel(16, 10.0, CloudConfig::default())?;
///     // Hand `sender` to the transport task...
///     # drop((sender, connection));
///     Ok(())
/// }
/// ```
pub struct PointStream;

impl PointStream {
    /// Connect to frames pushed by a transport.
    ///
    /// Returns the sender the transport feeds, with room for `buffer`
    /// pending frames, and the connection subscribers read from.
    pub fn channel(
        buffer: usize,
        frame_rate: f64,
        config: CloudConfig,
    ) -> Result<(FrameSender, CloudConnection)> {
        let (sender, source) = ChannelSource::new(buffer, frame_rate);
        Ok((sender, CloudConnection::with_config(source, config)?))
    }

    /// Replay a JSON-lines recording of `PointCloud2` messages.
    ///
    /// Waits briefly for the first frame so the connection is primed for
    /// subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the recording cannot be read or parsed, or if
    /// `config` is invalid.
    pub async fn replay<P: AsRef<std::path::Path>>(
        path: P,
        frame_rate: f64,
        config: CloudConfig,
    ) -> Result<CloudConnection> {
        let source = ReplaySource::from_json_lines(path, frame_rate)?;
        let connection = CloudConnection::with_config(source, config)?;
        connection.wait_for_snapshot(std::time::Duration::from_secs(5)).await;
        Ok(connection)
    }
}
