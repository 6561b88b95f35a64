//! Channel source fed by a transport task

use tokio::sync::mpsc;
use tracing::debug;

use crate::Result;
use crate::provider::FrameSource;
use crate::types::EncodedFrame;

/// Frame source backed by a bounded mpsc channel.
///
/// The transport keeps the [`FrameSender`] and pushes frames as they arrive;
/// when the channel is full the transport waits, so queuing policy stays
/// on the transport side.
pub struct ChannelSource {
    receiver: mpsc::Receiver<EncodedFrame>,
    frame_rate: f64,
}

/// Sending half handed to the transport.
pub type FrameSender = mpsc::Sender<EncodedFrame>;

impl ChannelSource {
    /// Create a source with room for `buffer` pending frames.
    pub fn new(buffer: usize, frame_rate: f64) -> (FrameSender, Self) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (sender, Self { receiver, frame_rate })
    }
}

#[async_trait::async_trait]
impl FrameSource for ChannelSource {
    async fn next_frame(&mut self) -> Result<Option<EncodedFrame>> {
        let frame = self.receiver.recv().await;
        if frame.is_none() {
            debug!("All frame senders dropped");
        }
        Ok(frame)
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Endianness, Payload};

    #[tokio::test]
    async fn delivers_frames_then_ends() {
        let (sender, mut source) = ChannelSource::new(4, 10.0);
        let frame = EncodedFrame::binary(12, vec![], 1, 0, Endianness::Little, vec![]);
        sender.send(frame).await.unwrap();
        drop(sender);

        let received = source.next_frame().await.unwrap();
        assert!(matches!(received.map(|f| f.payload), Some(Payload::Binary(_))));
        assert!(source.next_frame().await.unwrap().is_none());
        assert_eq!(source.frame_rate(), 10.0);
    }
}
