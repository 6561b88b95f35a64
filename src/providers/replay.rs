//! Replay source for recorded point cloud frames

use std::collections::VecDeque;
use std::path::Path;

use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::message::PointCloud2Message;
use crate::provider::FrameSource;
use crate::types::EncodedFrame;
use crate::{PointCloudError, Result};

/// Replay source that plays back frames at a fixed rate
pub struct ReplaySource {
    /// Frames not yet delivered
    frames: VecDeque<EncodedFrame>,

    /// Playback speed multiplier (1.0 = normal, 2.0 = double speed)
    speed: f64,

    /// Frame pacing interval
    interval: Interval,

    /// Recorded frame rate
    frame_rate: f64,
}

impl ReplaySource {
    /// Play back in-memory frames at `frame_rate` Hz.
    pub fn new(frames: impl IntoIterator<Item = EncodedFrame>, frame_rate: f64) -> Self {
        let frames: VecDeque<_> = frames.into_iter().collect();
        let frame_rate = if frame_rate > 0.0 { frame_rate } else { 10.0 };
        debug!("Replay source with {} frames at {}Hz", frames.len(), frame_rate);

        Self { frames, speed: 1.0, interval: pacing(frame_rate), frame_rate }
    }

    /// Load a recording of rosbridge `PointCloud2` messages, one JSON object per line.
    pub fn from_json_lines<P: AsRef<Path>>(path: P, frame_rate: f64) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PointCloudError::file_error(path.to_path_buf(), e))?;

        let mut frames = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let message = PointCloud2Message::from_json(line).map_err(|e| PointCloudError::Parse {
                context: format!("{}:{}", path.display(), line_no + 1),
                details: e.to_string(),
            })?;
            frames.push(message.into_frame()?);
        }

        info!("Loaded {} frames from {}", frames.len(), path.display());
        Ok(Self::new(frames, frame_rate))
    }

    /// Set playback speed
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(0.1, 10.0);
        self.interval = pacing(self.frame_rate * self.speed);
        debug!("Playback speed set to {}x", self.speed);
    }

    /// Frames left to deliver
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

fn pacing(rate: f64) -> Interval {
    let mut interval = interval(Duration::from_secs_f64(1.0 / rate));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[async_trait::async_trait]
impl FrameSource for ReplaySource {
    async fn next_frame(&mut self) -> Result<Option<EncodedFrame>> {
        if self.frames.is_empty() {
            return Ok(None);
        }

        self.interval.tick().await;
        let frame = self.frames.pop_front();
        trace!("Replaying frame, {} left", self.frames.len());
        Ok(frame)
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LINE: &str = r#"{"height":1,"width":1,"point_step":12,"is_bigendian":false,"data":"AACAPwAAAEAAAEBA","fields":[{"name":"x","offset":0,"datatype":7},{"name":"y","offset":4,"datatype":7},{"name":"z","offset":8,"datatype":7}]}"#;

    #[tokio::test]
    async fn replays_recording_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{LINE}").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{LINE}").unwrap();

        let mut source = ReplaySource::from_json_lines(file.path(), 1000.0).unwrap();
        assert_eq!(source.remaining(), 2);

        assert!(source.next_frame().await.unwrap().is_some());
        assert!(source.next_frame().await.unwrap().is_some());
        assert!(source.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bad_line_reports_location() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{LINE}").unwrap();
        writeln!(file, "not json").unwrap();

        match ReplaySource::from_json_lines(file.path(), 10.0) {
            Err(PointCloudError::Parse { context, .. }) => assert!(context.ends_with(":2")),
            other => panic!("Expected parse error, got {:?}", other.map(|s| s.remaining())),
        }
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let result = ReplaySource::from_json_lines("/nonexistent/recording.jsonl", 10.0);
        assert!(matches!(result, Err(PointCloudError::File { .. })));
    }
}
