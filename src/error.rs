//! Error types for point cloud processing.
//!
//! Most irregularities in an incoming frame are not errors: oversized
//! payloads are clamped and corrupt base64 text is truncated to the records
//! decoded before the bad character. What remains here are the failures a
//! caller has to react to.
//!
//! ## Error Categories
//!
//! - **Layout Errors**: the record schema cannot be used to locate x/y/z
//! - **Schema Errors**: a field description is inconsistent with the record
//! - **Config Errors**: out-of-range or unparsable configuration
//! - **Source Errors**: a frame source failed to produce the next frame
//! - **File Errors**: a recording could not be read
//!
//! ## Recovery
//!
//! ```rust
//! use pointstream::PointCloudError;
//!
//! let error = PointCloudError::source_failed("transport closed");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for point cloud operations.
pub type Result<T, E = PointCloudError> = std::result::Result<T, E>;

/// Reasons a record schema cannot produce a [`FieldLayout`](crate::FieldLayout).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Position field '{field}' missing from record schema")]
    MissingPositionField { field: &'static str },

    #[error("Position field '{field}' must be FLOAT32, found {found}")]
    PositionFieldType { field: &'static str, found: String },

    #[error("Field '{field}' at offset {offset} ({size} bytes) exceeds record size {record_size}")]
    FieldOutOfBounds { field: String, offset: usize, size: usize, record_size: usize },

    #[error("Record size must be non-zero")]
    EmptyRecord,
}

/// Main error type for point cloud operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PointCloudError {
    #[error("Invalid field layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("Schema validation failed: {reason}")]
    SchemaValidation { reason: String },

    #[error("Unknown point field datatype code {code}")]
    UnknownDatatype { code: u8 },

    #[error("Read of {size} bytes at offset {offset:#x} is out of bounds")]
    OutOfBounds { offset: usize, size: usize },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Frame source failed: {reason}")]
    Source {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Recording file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PointCloudError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            PointCloudError::Source { .. } => true,
            PointCloudError::Layout(_) => false,
            PointCloudError::SchemaValidation { .. } => false,
            PointCloudError::UnknownDatatype { .. } => false,
            PointCloudError::OutOfBounds { .. } => false,
            PointCloudError::Config { .. } => false,
            PointCloudError::Parse { .. } => false,
            PointCloudError::File { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PointCloudError::Layout(_) => vec![
                "Check that the publisher advertises x, y and z fields",
                "Verify position fields are FLOAT32",
                "Wait for a frame with a corrected schema",
            ],
            PointCloudError::SchemaValidation { .. } => vec![
                "Check field offsets against the record size",
                "Verify field counts are non-zero",
            ],
            PointCloudError::UnknownDatatype { .. } => vec![
                "Use a sensor_msgs/PointField datatype code between 1 and 8",
            ],
            PointCloudError::OutOfBounds { .. } => vec![
                "Check the record size advertised by the publisher",
                "Verify the payload length matches rows * cols * record size",
            ],
            PointCloudError::Config { .. } => vec![
                "Use values of at least 1 for ratios and decay depth",
                "Check the configuration file syntax",
            ],
            PointCloudError::Parse { .. } => vec![
                "Check message format compatibility",
                "Verify the recording is JSON lines of PointCloud2 messages",
            ],
            PointCloudError::Source { .. } => vec![
                "Check the transport connection",
                "Retry after the source reconnects",
            ],
            PointCloudError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// Helper constructor for frame source failures.
    pub fn source_failed(reason: impl Into<String>) -> Self {
        PointCloudError::Source { reason: reason.into(), source: None }
    }

    /// Helper constructor for frame source failures with an underlying cause.
    pub fn source_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        PointCloudError::Source { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        PointCloudError::Config { reason: reason.into() }
    }

    /// Helper constructor for schema validation errors.
    pub fn schema_validation(reason: impl Into<String>) -> Self {
        PointCloudError::SchemaValidation { reason: reason.into() }
    }

    /// Helper constructor for recording file errors.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        PointCloudError::File { path, source }
    }
}

impl From<std::io::Error> for PointCloudError {
    fn from(err: std::io::Error) -> Self {
        PointCloudError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_json::Error> for PointCloudError {
    fn from(err: serde_json::Error) -> Self {
        PointCloudError::Parse { context: "PointCloud2 message".to_string(), details: err.to_string() }
    }
}
