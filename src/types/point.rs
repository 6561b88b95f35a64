//! Decoded point and frame types

use serde::{Deserialize, Serialize};

/// Normalized RGB color, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xff) as f32 / 255.0,
            g: ((packed >> 8) & 0xff) as f32 / 255.0,
            b: (packed & 0xff) as f32 / 255.0,
        }
    }
}

/// One decoded point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DecodedPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: Option<Rgb>,
}

impl DecodedPoint {
    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Points decoded from one frame, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFrame {
    points: Vec<DecodedPoint>,
    colored: bool,
}

impl DecodedFrame {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { points: Vec::with_capacity(capacity), colored: false }
    }

    pub fn push(&mut self, point: DecodedPoint) {
        self.colored |= point.color.is_some();
        self.points.push(point);
    }

    /// Whether any point carries a color.
    pub fn is_colored(&self) -> bool {
        self.colored
    }

    pub fn points(&self) -> &[DecodedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<DecodedPoint>> for DecodedFrame {
    fn from(points: Vec<DecodedPoint>) -> Self {
        let colored = points.iter().any(|point| point.color.is_some());
        Self { points, colored }
    }
}

impl FromIterator<DecodedPoint> for DecodedFrame {
    fn from_iter<I: IntoIterator<Item = DecodedPoint>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
