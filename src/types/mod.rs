//! Core types for point cloud frames.
//!
//! ## Architecture
//!
//! The type system follows the `sensor_msgs/PointCloud2` message:
//! - [`EncodedFrame`] is one frame as delivered by a transport, binary or base64
//! - [`RecordSchema`] describes the named fields of one record with O(1) lookup
//! - [`FieldType`] maps the `PointField` datatype codes with size information
//! - [`FieldData`] reads primitive values at an offset with explicit byte order
//! - [`DecodedPoint`] / [`DecodedFrame`] hold the decoded result
//!
//! ## Usage Example
//!
//! ```rust
//! use pointstream::types::{Endianness, FieldData, FieldType, PointField, RecordSchema};
//!
//! let schema = RecordSchema::from_fields(
//!     vec![PointField::new("x", 0, FieldType::Float32)],
//!     4,
//! ).unwrap();
//!
//! let data = 1.5f32.to_be_bytes();
//! let x = schema.get_field("x").unwrap();
//! let value = f32::from_bytes(&data, x.offset, Endianness::Big).unwrap();
//! assert_eq!(value, 1.5);
//! ```

mod field_data;
mod field_type;
mod frame;
mod point;
mod schema;
mod update_rate;

// Re-export all public types
pub use field_data::{FieldData, read_value};
pub use field_type::{FieldType, FieldValue};
pub use frame::{EncodedFrame, Endianness, Payload};
pub use point::{DecodedFrame, DecodedPoint, Rgb};
pub use schema::{PointField, RecordSchema};
pub use update_rate::UpdateRate;
