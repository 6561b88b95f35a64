//! Processing configuration.
//!
//! ```rust
//! use pointstream::CloudConfig;
//!
//! let config = CloudConfig::from_yaml("max_points: 5000\npoint_ratio: 2\n").unwrap();
//! assert_eq!(config.max_points, 5000);
//! assert_eq!(config.decay_depth, 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::{PointCloudError, Result};

/// Default number of points retained in the output buffer.
pub const DEFAULT_MAX_POINTS: usize = 10_000;

/// Tunables for decoding and compositing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloudConfig {
    /// Capacity of the output buffer and per-frame decode cap
    pub max_points: usize,
    /// Keep one record out of every `point_ratio`
    pub point_ratio: usize,
    /// Process one frame out of every `message_ratio`
    pub message_ratio: usize,
    /// Number of most recent frames composited together
    pub decay_depth: usize,
    /// Field used for coloring; `rgb` is picked up when unset and present
    pub color_field: Option<String>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            point_ratio: 1,
            message_ratio: 1,
            decay_depth: 1,
            color_field: None,
        }
    }
}

impl CloudConfig {
    /// Parse and validate a YAML configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| PointCloudError::Parse {
            context: "Configuration YAML".to_string(),
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_points == 0 {
            return Err(PointCloudError::config("max_points must be at least 1"));
        }
        if self.point_ratio == 0 {
            return Err(PointCloudError::config("point_ratio must be at least 1"));
        }
        if self.message_ratio == 0 {
            return Err(PointCloudError::config("message_ratio must be at least 1"));
        }
        if self.decay_depth == 0 {
            return Err(PointCloudError::config("decay_depth must be at least 1"));
        }
        Ok(())
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn with_point_ratio(mut self, point_ratio: usize) -> Self {
        self.point_ratio = point_ratio;
        self
    }

    pub fn with_message_ratio(mut self, message_ratio: usize) -> Self {
        self.message_ratio = message_ratio;
        self
    }

    pub fn with_decay_depth(mut self, decay_depth: usize) -> Self {
        self.decay_depth = decay_depth;
        self
    }

    pub fn with_color_field(mut self, color_field: impl Into<String>) -> Self {
        self.color_field = Some(color_field.into());
        self
    }
}
