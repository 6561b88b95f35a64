//! Bounded frame history and newest-first compositing.
//!
//! The compositor keeps the last `decay_depth` decoded frames. Each pass
//! copies them into a caller-owned [`OutputBuffer`], newest frame first, so
//! when the retained points exceed the buffer the freshest data always wins.

use std::collections::VecDeque;

use tracing::trace;

use crate::types::{DecodedFrame, Rgb};

/// Color written for points that carry none while coloring is active.
pub const UNCOLORED: Rgb = Rgb::new(1.0, 1.0, 1.0);

/// Fixed-capacity, render-ready position and color arrays.
///
/// Allocated once and rewritten in place by every compositing pass. Only the
/// first [`written`](Self::written) entries are valid; the rest are stale.
/// Colors are reported only while some retained frame is colored.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputBuffer {
    positions: Vec<f32>,
    colors: Option<Vec<f32>>,
    colors_active: bool,
    capacity: usize,
    written: usize,
}

impl OutputBuffer {
    /// Allocate room for `capacity` points, with or without colors.
    pub fn new(capacity: usize, with_colors: bool) -> Self {
        Self {
            positions: vec![0.0; capacity * 3],
            colors: with_colors.then(|| vec![0.0; capacity * 3]),
            colors_active: false,
            capacity,
            written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of valid points from the last pass.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flat `[x, y, z, x, y, z, ...]`, length `3 * capacity`.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat `[r, g, b, ...]`, length `3 * capacity`, when the last pass wrote colors.
    pub fn colors(&self) -> Option<&[f32]> {
        self.colors.as_deref().filter(|_| self.colors_active)
    }

    /// Positions of the valid points only.
    pub fn valid_positions(&self) -> &[f32] {
        &self.positions[..self.written * 3]
    }

    /// Colors of the valid points only.
    pub fn valid_colors(&self) -> Option<&[f32]> {
        self.colors().map(|colors| &colors[..self.written * 3])
    }

    /// Whether the last pass wrote colors.
    pub fn has_colors(&self) -> bool {
        self.colors().is_some()
    }

    /// Add color storage if it is missing. Existing storage is kept.
    pub fn enable_colors(&mut self) {
        if self.colors.is_none() {
            self.colors = Some(vec![0.0; self.capacity * 3]);
        }
    }
}

/// Bounded FIFO of decoded frames with a deterministic merge order.
#[derive(Debug, Clone)]
pub struct HistoryCompositor {
    frames: VecDeque<DecodedFrame>,
    decay_depth: usize,
}

impl HistoryCompositor {
    /// Retain up to `decay_depth` frames (at least one).
    pub fn new(decay_depth: usize) -> Self {
        let decay_depth = decay_depth.max(1);
        Self { frames: VecDeque::with_capacity(decay_depth + 1), decay_depth }
    }

    pub fn decay_depth(&self) -> usize {
        self.decay_depth
    }

    /// Change the retention depth, evicting the oldest frames if needed.
    pub fn set_decay_depth(&mut self, decay_depth: usize) {
        self.decay_depth = decay_depth.max(1);
        self.evict();
    }

    /// Append a frame, evicting from the front beyond `decay_depth`.
    pub fn push_frame(&mut self, frame: DecodedFrame) {
        self.frames.push_back(frame);
        self.evict();
    }

    fn evict(&mut self) {
        while self.frames.len() > self.decay_depth {
            if let Some(evicted) = self.frames.pop_front() {
                trace!("Evicted frame with {} points from history", evicted.len());
            }
        }
    }

    /// Retained frames, oldest first.
    pub fn frames(&self) -> impl DoubleEndedIterator<Item = &DecodedFrame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total points across retained frames.
    pub fn retained_points(&self) -> usize {
        self.frames.iter().map(DecodedFrame::len).sum()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Copy retained points into `output`, newest frame first.
    ///
    /// When any retained frame is colored and the buffer has color storage,
    /// every written point gets a color, [`UNCOLORED`] for points without
    /// one; otherwise the buffer reports no colors. Returns the number of
    /// points written, which is also stored in the buffer.
    pub fn composite(&self, output: &mut OutputBuffer) -> usize {
        let capacity = output.capacity;
        let colored = output.colors.is_some() && self.frames.iter().any(DecodedFrame::is_colored);
        let mut written = 0;

        'frames: for frame in self.frames.iter().rev() {
            for point in frame.points() {
                if written == capacity {
                    break 'frames;
                }

                let base = written * 3;
                output.positions[base] = point.x;
                output.positions[base + 1] = point.y;
                output.positions[base + 2] = point.z;

                if let Some(colors) = output.colors.as_mut().filter(|_| colored) {
                    let color = point.color.unwrap_or(UNCOLORED);
                    colors[base] = color.r;
                    colors[base + 1] = color.g;
                    colors[base + 2] = color.b;
                }

                written += 1;
            }
        }

        output.written = written;
        output.colors_active = colored;
        trace!("Composited {} points from {} frames", written, self.frames.len());
        written
    }
}
