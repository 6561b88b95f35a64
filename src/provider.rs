//! Frame source trait for transports

use crate::Result;
use crate::types::EncodedFrame;

/// Trait for encoded frame sources
///
/// Sources abstract over the transport collaborator (a rosbridge socket, a
/// recording, a test fixture) and handle their own pacing internally.
#[async_trait::async_trait]
pub trait FrameSource: Send + 'static {
    /// Get the next encoded frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - New frame available
    /// - `Ok(None)` - Stream ended (normal termination)
    /// - `Err(e)` - Error occurred
    async fn next_frame(&mut self) -> Result<Option<EncodedFrame>>;

    /// Expected frame rate in Hz, used to normalize subscription rates
    fn frame_rate(&self) -> f64;
}
