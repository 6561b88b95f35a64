//! Synthetic frame builders for unit tests and benchmarks
//!
//! Frames use the common lidar layout: `x`, `y`, `z` FLOAT32 at offsets
//! 0, 4, 8 followed by a FLOAT32 `rgb` at 12, for a 16 byte record.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::types::{EncodedFrame, Endianness, FieldType, PointField};

/// Record size of frames built by [`colored_record`].
pub const COLORED_RECORD_SIZE: usize = 16;

/// Position-only field list, 12 byte records.
pub fn xyz_fields() -> Vec<PointField> {
    vec![
        PointField::new("x", 0, FieldType::Float32),
        PointField::new("y", 4, FieldType::Float32),
        PointField::new("z", 8, FieldType::Float32),
    ]
}

/// Position plus packed `rgb` field list, 16 byte records.
pub fn xyzrgb_fields() -> Vec<PointField> {
    let mut fields = xyz_fields();
    fields.push(PointField::new("rgb", 12, FieldType::Float32));
    fields
}

/// Little-endian records of three floats each.
pub fn encode_xyz(points: &[[f32; 3]]) -> Vec<u8> {
    points.iter().flat_map(|p| p.iter().flat_map(|v| v.to_le_bytes())).collect()
}

/// One 16 byte little-endian record with `rgb` packed as float bits.
pub fn colored_record(position: [f32; 3], rgb: [u8; 3]) -> [u8; COLORED_RECORD_SIZE] {
    let mut record = [0u8; COLORED_RECORD_SIZE];
    for (i, v) in position.iter().enumerate() {
        record[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
    }
    let packed = u32::from_be_bytes([0, rgb[0], rgb[1], rgb[2]]);
    record[12..16].copy_from_slice(&packed.to_le_bytes());
    record
}

/// Binary frame with one row of position-only points.
pub fn xyz_frame(points: &[[f32; 3]]) -> EncodedFrame {
    EncodedFrame::binary(12, xyz_fields(), 1, points.len(), Endianness::Little, encode_xyz(points))
}

/// Base64 text frame carrying the same records as [`xyz_frame`].
pub fn xyz_text_frame(points: &[[f32; 3]]) -> EncodedFrame {
    let text = STANDARD.encode(encode_xyz(points));
    EncodedFrame::text(12, xyz_fields(), 1, points.len(), Endianness::Little, text)
}

/// Deterministic cloud of `count` points on a spiral, for benchmarks.
pub fn spiral(count: usize) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| {
            let t = i as f32 * 0.01;
            [t.cos() * t, t.sin() * t, t * 0.1]
        })
        .collect()
}

/// Colored frame of `count` spiral points, binary or base64.
pub fn colored_spiral_frame(count: usize, as_text: bool) -> EncodedFrame {
    let data: Vec<u8> = spiral(count)
        .into_iter()
        .enumerate()
        .flat_map(|(i, p)| colored_record(p, [(i % 256) as u8, 128, 255 - (i % 256) as u8]))
        .collect();

    if as_text {
        EncodedFrame::text(
            COLORED_RECORD_SIZE,
            xyzrgb_fields(),
            1,
            count,
            Endianness::Little,
            STANDARD.encode(data),
        )
    } else {
        EncodedFrame::binary(COLORED_RECORD_SIZE, xyzrgb_fields(), 1, count, Endianness::Little, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Payload;

    #[test]
    fn colored_record_packs_rgb_bits() {
        let record = colored_record([1.0, 2.0, 3.0], [0x11, 0x22, 0x33]);
        let bits = u32::from_le_bytes([record[12], record[13], record[14], record[15]]);
        assert_eq!(bits, 0x0011_2233);
    }

    #[test]
    fn text_frame_length_matches_base64_expansion() {
        let frame = xyz_text_frame(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert!(matches!(frame.payload, Payload::Text(ref t) if t.len() == 32));
        assert_eq!(frame.point_count(), 2);
    }
}
