//! Colormaps turning a raw field value into a render color.
//!
//! A colormap is injected into the processor as a strategy object. Any
//! `Fn(FieldValue) -> Rgb` closure works; two common mappings ship here.

use std::sync::Arc;

use crate::types::{FieldValue, Rgb};

/// Maps the raw value of the color field to a normalized RGB triple.
///
/// Implementations must be pure: the same value always yields the same color.
pub trait Colormap: Send + Sync {
    fn map(&self, value: FieldValue) -> Rgb;
}

impl<F> Colormap for F
where
    F: Fn(FieldValue) -> Rgb + Send + Sync,
{
    fn map(&self, value: FieldValue) -> Rgb {
        self(value)
    }
}

/// Interprets the value as packed `0xRRGGBB`.
///
/// FLOAT32 fields are reinterpreted bit-for-bit, which is how PCL-style
/// `rgb` fields carry their color.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedRgb;

impl Colormap for PackedRgb {
    fn map(&self, value: FieldValue) -> Rgb {
        let packed = match value {
            FieldValue::Float32(_) | FieldValue::UInt32(_) | FieldValue::Int32(_) => value.raw_bits(),
            other => other.as_f64().max(0.0) as u32,
        };
        Rgb::from_packed(packed & 0x00FF_FFFF)
    }
}

/// Linear gray ramp over `[min, max]`, clamped at both ends.
#[derive(Debug, Clone, Copy)]
pub struct Grayscale {
    pub min: f64,
    pub max: f64,
}

impl Grayscale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Colormap for Grayscale {
    fn map(&self, value: FieldValue) -> Rgb {
        let span = self.max - self.min;
        let t = if span > 0.0 { (value.as_f64() - self.min) / span } else { 0.0 };
        let level = t.clamp(0.0, 1.0) as f32;
        Rgb::new(level, level, level)
    }
}

/// Shared handle to the default colormap.
pub fn default_colormap() -> Arc<dyn Colormap> {
    Arc::new(PackedRgb)
}
