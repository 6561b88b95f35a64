//! Encoded frame types delivered by a transport

use std::sync::Arc;

use super::{PointField, RecordSchema};

/// Byte order of every multi-byte field in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Map the `is_bigendian` flag carried by a frame.
    pub fn from_big_endian_flag(big_endian: bool) -> Self {
        if big_endian { Endianness::Big } else { Endianness::Little }
    }
}

/// Frame payload as it arrived from the transport.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Raw record bytes (binary transports such as CBOR)
    Binary(Arc<[u8]>),
    /// Base64 text (JSON transports)
    Text(Arc<str>),
}

impl Payload {
    /// Length of the payload as delivered (bytes or characters).
    pub fn len(&self) -> usize {
        match self {
            Payload::Binary(bytes) => bytes.len(),
            Payload::Text(text) => text.len(),
        }
    }

    /// Whether the payload carries nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One encoded point cloud frame.
///
/// This is the unit handed over by the transport collaborator. The field
/// list travels with every frame; the processor only rebuilds its layout
/// when it changes.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// Size of one record (one point) in bytes
    pub record_size: usize,
    /// Field descriptions within a record
    pub fields: Vec<PointField>,
    /// Row count (cloud height)
    pub rows: usize,
    /// Column count (cloud width)
    pub cols: usize,
    /// Byte order of the record fields
    pub endian: Endianness,
    /// Record data
    pub payload: Payload,
}

impl EncodedFrame {
    /// Create a frame carrying raw record bytes.
    pub fn binary(
        record_size: usize,
        fields: Vec<PointField>,
        rows: usize,
        cols: usize,
        endian: Endianness,
        data: Vec<u8>,
    ) -> Self {
        Self { record_size, fields, rows, cols, endian, payload: Payload::Binary(data.into()) }
    }

    /// Create a frame carrying base64 text.
    pub fn text(
        record_size: usize,
        fields: Vec<PointField>,
        rows: usize,
        cols: usize,
        endian: Endianness,
        data: impl Into<Arc<str>>,
    ) -> Self {
        Self { record_size, fields, rows, cols, endian, payload: Payload::Text(data.into()) }
    }

    /// Number of records the frame claims to carry.
    pub fn point_count(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Build the record schema described by this frame.
    pub fn schema(&self) -> crate::Result<RecordSchema> {
        RecordSchema::from_fields(self.fields.iter().cloned(), self.record_size)
    }

    /// Whether this frame's record layout matches `schema`.
    pub fn matches_schema(&self, schema: &RecordSchema) -> bool {
        self.record_size == schema.record_size
            && self.fields.len() == schema.fields.len()
            && self.fields.iter().all(|field| schema.get_field(&field.name) == Some(field))
    }
}
