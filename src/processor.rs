//! Per-frame pipeline: layout resolution, decoding, history and compositing.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::colormap::{Colormap, default_colormap};
use crate::compositor::{HistoryCompositor, OutputBuffer};
use crate::config::CloudConfig;
use crate::decoder::FrameDecoder;
use crate::error::LayoutError;
use crate::layout::FieldLayout;
use crate::types::{EncodedFrame, RecordSchema};
use crate::{PointCloudError, Result};

/// Layout resolved for the most recent schema, including failed attempts so
/// repeated frames with the same broken schema are skipped cheaply.
#[derive(Debug)]
struct CachedLayout {
    schema: RecordSchema,
    layout: std::result::Result<FieldLayout, LayoutError>,
}

/// Turns a sequence of encoded frames into a composited output buffer.
///
/// Every call to [`process`](Self::process) runs to completion: decode,
/// push into the history, composite into the output buffer. The processor
/// is `&mut self` throughout, so one owner drives it.
///
/// ```rust
/// use pointstream::{CloudConfig, PointCloudProcessor};
/// use pointstream::types::{EncodedFrame, Endianness, FieldType, PointField};
///
/// let fields = vec![
///     PointField::new("x", 0, FieldType::Float32),
///     PointField::new("y", 4, FieldType::Float32),
///     PointField::new("z", 8, FieldType::Float32),
/// ];
/// let mut data = Vec::new();
/// for v in [1.0f32, 2.0, 3.0] {
///     data.extend_from_slice(&v.to_le_bytes());
/// }
///
/// let mut processor = PointCloudProcessor::new(CloudConfig::default()).unwrap();
/// let frame = EncodedFrame::binary(12, fields, 1, 1, Endianness::Little, data);
/// assert_eq!(processor.process(&frame).unwrap(), 1);
/// assert_eq!(processor.output().valid_positions(), &[1.0, 2.0, 3.0]);
/// ```
pub struct PointCloudProcessor {
    config: CloudConfig,
    colormap: Arc<dyn Colormap>,
    cached: Option<CachedLayout>,
    decoder: FrameDecoder,
    history: HistoryCompositor,
    output: OutputBuffer,
    frames_seen: u64,
}

impl std::fmt::Debug for PointCloudProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointCloudProcessor")
            .field("config", &self.config)
            .field("cached", &self.cached)
            .field("history_len", &self.history.len())
            .field("written", &self.output.written())
            .field("frames_seen", &self.frames_seen)
            .finish()
    }
}

impl PointCloudProcessor {
    /// Create a processor with the default packed-RGB colormap.
    pub fn new(config: CloudConfig) -> Result<Self> {
        Self::with_colormap(config, default_colormap())
    }

    /// Create a processor with an injected colormap.
    pub fn with_colormap(config: CloudConfig, colormap: Arc<dyn Colormap>) -> Result<Self> {
        config.validate()?;
        info!(
            "Point cloud processor: max_points={}, point_ratio={}, decay_depth={}, message_ratio={}",
            config.max_points, config.point_ratio, config.decay_depth, config.message_ratio
        );

        Ok(Self {
            history: HistoryCompositor::new(config.decay_depth),
            output: OutputBuffer::new(config.max_points, false),
            decoder: FrameDecoder::new(),
            cached: None,
            colormap,
            config,
            frames_seen: 0,
        })
    }

    /// Decode `frame`, add it to the history and recomposite.
    ///
    /// Returns the number of valid points in the output buffer. A frame whose
    /// schema lacks usable position fields is skipped with
    /// [`PointCloudError::Layout`]; the output keeps its previous contents.
    pub fn process(&mut self, frame: &EncodedFrame) -> Result<usize> {
        self.frames_seen += 1;
        if !self.samples(self.frames_seen) {
            trace!("Frame {} dropped by message ratio {}", self.frames_seen, self.config.message_ratio);
            return Ok(self.output.written());
        }

        self.resolve_layout(frame)?;
        let Some(Ok(layout)) = self.cached.as_ref().map(|cached| &cached.layout) else {
            return Err(PointCloudError::schema_validation("No record schema resolved"));
        };
        if layout.has_color() {
            self.output.enable_colors();
        }

        let decoded = self.decoder.decode(
            frame,
            layout,
            self.config.max_points,
            self.config.point_ratio,
            self.colormap.as_ref(),
        );
        debug!(
            "Frame {}: decoded {} of {} points",
            self.frames_seen,
            decoded.len(),
            frame.point_count()
        );

        self.history.push_frame(decoded);
        Ok(self.history.composite(&mut self.output))
    }

    /// Whether the frame with 1-based `sequence` passes the message ratio.
    pub fn samples(&self, sequence: u64) -> bool {
        sequence > 0 && (sequence - 1) % self.config.message_ratio as u64 == 0
    }

    fn resolve_layout(&mut self, frame: &EncodedFrame) -> Result<()> {
        let reuse = self.cached.as_ref().is_some_and(|cached| frame.matches_schema(&cached.schema));

        if !reuse {
            let schema = frame.schema()?;
            let layout = FieldLayout::setup(&schema, self.config.color_field.as_deref());
            match &layout {
                Ok(_) => debug!("Record schema changed ({} bytes), layout rebuilt", schema.record_size),
                Err(e) => warn!("Skipping point cloud frames: {}", e),
            }
            self.cached = Some(CachedLayout { schema, layout });
        }

        match self.cached.as_ref().map(|cached| &cached.layout) {
            Some(Ok(_)) => Ok(()),
            Some(Err(e)) => {
                trace!("Frame skipped, schema still invalid: {}", e);
                Err(PointCloudError::Layout(e.clone()))
            }
            None => Err(PointCloudError::schema_validation("No record schema resolved")),
        }
    }

    /// The composited output of the last processed frame.
    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// Layout currently in use, if the last schema was valid.
    pub fn layout(&self) -> Option<&FieldLayout> {
        self.cached.as_ref().and_then(|cached| cached.layout.as_ref().ok())
    }

    pub fn history(&self) -> &HistoryCompositor {
        &self.history
    }

    /// Frames handed to [`process`](Self::process) so far.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Change the subsampling ratio for subsequent frames.
    pub fn set_point_ratio(&mut self, point_ratio: usize) -> Result<()> {
        if point_ratio == 0 {
            return Err(PointCloudError::config("point_ratio must be at least 1"));
        }
        self.config.point_ratio = point_ratio;
        Ok(())
    }

    /// Change the history depth; older frames beyond it are dropped now.
    pub fn set_decay_depth(&mut self, decay_depth: usize) -> Result<()> {
        if decay_depth == 0 {
            return Err(PointCloudError::config("decay_depth must be at least 1"));
        }
        self.config.decay_depth = decay_depth;
        self.history.set_decay_depth(decay_depth);
        Ok(())
    }

    /// Replace the colormap used for subsequent frames.
    pub fn set_colormap(&mut self, colormap: Arc<dyn Colormap>) {
        self.colormap = colormap;
    }

    /// Select a different color field; the layout is rebuilt on the next frame.
    pub fn set_color_field(&mut self, color_field: Option<String>) {
        self.config.color_field = color_field;
        self.cached = None;
    }

    /// Drop all retained frames and invalidate the output.
    pub fn reset(&mut self) {
        self.history.clear();
        self.history.composite(&mut self.output);
        self.frames_seen = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Endianness, FieldType, FieldValue, PointField, Rgb};

    fn xyz_fields() -> Vec<PointField> {
        vec![
            PointField::new("x", 0, FieldType::Float32),
            PointField::new("y", 4, FieldType::Float32),
            PointField::new("z", 8, FieldType::Float32),
        ]
    }

    fn frame_of(xs: &[f32]) -> EncodedFrame {
        let mut data = Vec::new();
        for &x in xs {
            for v in [x, 0.0, 0.0] {
                data.extend_from_slice(&v.to_le_bytes());
            }
        }
        EncodedFrame::binary(12, xyz_fields(), 1, xs.len(), Endianness::Little, data)
    }

    fn xs(processor: &PointCloudProcessor) -> Vec<f32> {
        processor.output().valid_positions().chunks(3).map(|p| p[0]).collect()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = PointCloudProcessor::new(CloudConfig::default().with_point_ratio(0)).unwrap_err();
        assert!(matches!(err, PointCloudError::Config { .. }));
    }

    #[test]
    fn missing_position_field_skips_frame() {
        let mut processor = PointCloudProcessor::new(CloudConfig::default()).unwrap();
        processor.process(&frame_of(&[1.0])).unwrap();

        let mut broken = frame_of(&[9.0]);
        broken.fields.retain(|f| f.name != "z");
        for _ in 0..2 {
            let err = processor.process(&broken).unwrap_err();
            assert!(matches!(err, PointCloudError::Layout(LayoutError::MissingPositionField { field: "z" })));
        }
        assert_eq!(xs(&processor), vec![1.0]);
        assert!(processor.layout().is_none());

        processor.process(&frame_of(&[2.0])).unwrap();
        assert_eq!(xs(&processor), vec![2.0]);
    }

    #[test]
    fn history_composites_across_frames() {
        let config = CloudConfig::default().with_decay_depth(2).with_max_points(4);
        let mut processor = PointCloudProcessor::new(config).unwrap();

        processor.process(&frame_of(&[1.0, 1.1, 1.2])).unwrap();
        processor.process(&frame_of(&[2.0, 2.1])).unwrap();
        assert_eq!(xs(&processor), vec![2.0, 2.1, 1.0, 1.1]);

        processor.process(&frame_of(&[3.0])).unwrap();
        assert_eq!(xs(&processor), vec![3.0, 2.0, 2.1]);
    }

    #[test]
    fn message_ratio_skips_frames() {
        let config = CloudConfig::default().with_message_ratio(2);
        let mut processor = PointCloudProcessor::new(config).unwrap();

        assert_eq!(processor.process(&frame_of(&[1.0])).unwrap(), 1);
        assert_eq!(processor.process(&frame_of(&[2.0, 2.0])).unwrap(), 1);
        assert_eq!(processor.process(&frame_of(&[3.0])).unwrap(), 1);
        assert_eq!(xs(&processor), vec![3.0]);
        assert_eq!(processor.frames_seen(), 3);
    }

    #[test]
    fn color_field_enables_color_output() {
        let mut fields = xyz_fields();
        fields.push(PointField::new("intensity", 12, FieldType::UInt8));
        let mut data = Vec::new();
        for v in [1.0f32, 2.0, 3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[255, 0, 0, 0]);
        let frame = EncodedFrame::binary(16, fields, 1, 1, Endianness::Little, data);

        let config = CloudConfig::default().with_color_field("intensity");
        let colormap: Arc<dyn Colormap> =
            Arc::new(|v: FieldValue| Rgb::new(v.as_f64() as f32 / 255.0, 0.0, 0.0));
        let mut processor = PointCloudProcessor::with_colormap(config, colormap).unwrap();

        processor.process(&frame).unwrap();
        assert_eq!(processor.output().valid_colors(), Some(&[1.0, 0.0, 0.0][..]));
        assert_eq!(processor.layout().and_then(FieldLayout::color_field), Some("intensity"));
    }

    #[test]
    fn runtime_setters_apply() {
        let mut processor =
            PointCloudProcessor::new(CloudConfig::default().with_decay_depth(3)).unwrap();
        for x in [1.0, 2.0, 3.0] {
            processor.process(&frame_of(&[x])).unwrap();
        }
        processor.set_decay_depth(1).unwrap();
        assert_eq!(processor.history().len(), 1);

        processor.set_point_ratio(2).unwrap();
        processor.process(&frame_of(&[4.0, 5.0, 6.0])).unwrap();
        assert_eq!(xs(&processor), vec![4.0, 6.0]);

        assert!(processor.set_point_ratio(0).is_err());
        assert!(processor.set_decay_depth(0).is_err());

        processor.reset();
        assert_eq!(processor.output().written(), 0);
    }
}
