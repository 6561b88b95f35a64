//! Frame decoding: encoded payload + field layout into decoded points.
//!
//! Binary payloads are read in place and subsampled by striding over
//! `point_ratio` records at a time. Text payloads go through the streaming
//! base64 decoder, which already drops the skipped records, so the decoded
//! scratch buffer is read with a stride of one record.

use tracing::{trace, warn};

use crate::Result;
use crate::codec::decode_with_report;
use crate::colormap::Colormap;
use crate::layout::{ColorSource, FieldLayout};
use crate::types::{DecodedFrame, DecodedPoint, EncodedFrame, Endianness, FieldData, Payload, read_value};

/// Decodes frames, reusing one scratch buffer for base64 payloads.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    scratch: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scratch buffer size in bytes.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.len()
    }

    /// Decode at most `max_points` points, keeping one record in `point_ratio`.
    ///
    /// `layout` must have been resolved from this frame's schema. Payload
    /// problems never fail the call: the result simply holds fewer points.
    pub fn decode(
        &mut self,
        frame: &EncodedFrame,
        layout: &FieldLayout,
        max_points: usize,
        point_ratio: usize,
        colormap: &dyn Colormap,
    ) -> DecodedFrame {
        let record_size = layout.record_size();
        let point_ratio = point_ratio.max(1);
        let budget = max_points.saturating_mul(record_size);

        match &frame.payload {
            Payload::Binary(bytes) => {
                let data = &bytes[..budget.min(bytes.len())];
                let stride = point_ratio.saturating_mul(record_size);
                let claimed = frame.point_count().div_ceil(point_ratio).min(max_points);
                let available =
                    if data.len() >= record_size { (data.len() - record_size) / stride + 1 } else { 0 };
                let count = claimed.min(available);

                trace!(
                    "Binary frame: {} bytes, {} claimed points, reading {} at stride {}",
                    bytes.len(),
                    frame.point_count(),
                    count,
                    stride
                );
                read_points(data, count, stride, frame.endian, layout, colormap)
            }
            Payload::Text(text) => {
                // Never size scratch beyond what the text can actually decode to
                let decodable = text.len() / 4 * 3 + 3;
                let budget = budget.min(decodable / record_size * record_size);
                if self.scratch.len() < budget {
                    trace!("Growing decode scratch buffer {} -> {} bytes", self.scratch.len(), budget);
                    self.scratch.resize(budget, 0);
                }

                let report =
                    decode_with_report(text.as_bytes(), &mut self.scratch[..budget], record_size, point_ratio);
                if let Some(invalid) = report.invalid {
                    warn!(
                        "Illegal base64 character {:#04x} at position {}, frame truncated to {} points",
                        invalid.byte, invalid.position, report.records
                    );
                }

                read_points(&self.scratch[..budget], report.records, record_size, frame.endian, layout, colormap)
            }
        }
    }
}

fn read_points(
    data: &[u8],
    count: usize,
    stride: usize,
    endian: Endianness,
    layout: &FieldLayout,
    colormap: &dyn Colormap,
) -> DecodedFrame {
    let mut frame = DecodedFrame::with_capacity(count);

    match layout.color() {
        Some(source) => {
            for index in 0..count {
                match read_colored(data, index * stride, endian, layout, source, colormap) {
                    Ok(point) => frame.push(point),
                    Err(e) => {
                        warn!("Stopped reading frame at point {}: {}", index, e);
                        break;
                    }
                }
            }
        }
        None => {
            for index in 0..count {
                match read_position(data, index * stride, endian, layout) {
                    Ok(point) => frame.push(point),
                    Err(e) => {
                        warn!("Stopped reading frame at point {}: {}", index, e);
                        break;
                    }
                }
            }
        }
    }

    frame
}

#[inline]
fn read_position(data: &[u8], base: usize, endian: Endianness, layout: &FieldLayout) -> Result<DecodedPoint> {
    let [x, y, z] = layout.position_offsets();
    Ok(DecodedPoint {
        x: f32::from_bytes(data, base + x, endian)?,
        y: f32::from_bytes(data, base + y, endian)?,
        z: f32::from_bytes(data, base + z, endian)?,
        color: None,
    })
}

#[inline]
fn read_colored(
    data: &[u8],
    base: usize,
    endian: Endianness,
    layout: &FieldLayout,
    source: ColorSource,
    colormap: &dyn Colormap,
) -> Result<DecodedPoint> {
    let mut point = read_position(data, base, endian, layout)?;
    let raw = read_value(data, base + source.offset, source.datatype, endian)?;
    point.color = Some(colormap.map(raw));
    Ok(point)
}
