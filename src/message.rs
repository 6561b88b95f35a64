//! `sensor_msgs/PointCloud2` message as delivered by rosbridge.
//!
//! JSON transports carry `data` as base64 text; CBOR or plain-array
//! transports carry the bytes themselves. Both convert into an
//! [`EncodedFrame`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::{EncodedFrame, Endianness, FieldType, Payload, PointField};

/// Message header; only the frame id matters to the decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub frame_id: String,
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// `sensor_msgs/PointField` with its numeric datatype code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointFieldMessage {
    pub name: String,
    pub offset: usize,
    pub datatype: u8,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

/// Record bytes as text or as an explicit byte array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageData {
    Base64(String),
    Bytes(Vec<u8>),
}

/// rosbridge rendering of `sensor_msgs/PointCloud2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud2Message {
    #[serde(default)]
    pub header: Header,
    pub height: usize,
    pub width: usize,
    pub fields: Vec<PointFieldMessage>,
    #[serde(default)]
    pub is_bigendian: bool,
    pub point_step: usize,
    #[serde(default)]
    pub row_step: usize,
    pub data: MessageData,
    #[serde(default)]
    pub is_dense: bool,
}

impl PointCloud2Message {
    /// Parse one JSON message.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert into a frame, mapping datatype codes.
    pub fn into_frame(self) -> Result<EncodedFrame> {
        let fields = self
            .fields
            .into_iter()
            .map(|field| {
                Ok(PointField {
                    datatype: FieldType::from_code(field.datatype)?,
                    name: field.name,
                    offset: field.offset,
                    count: field.count,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let payload = match self.data {
            MessageData::Base64(text) => Payload::Text(text.into()),
            MessageData::Bytes(bytes) => Payload::Binary(bytes.into()),
        };

        Ok(EncodedFrame {
            record_size: self.point_step,
            fields,
            rows: self.height,
            cols: self.width,
            endian: Endianness::from_big_endian_flag(self.is_bigendian),
            payload,
        })
    }
}

impl TryFrom<PointCloud2Message> for EncodedFrame {
    type Error = crate::PointCloudError;

    fn try_from(message: PointCloud2Message) -> Result<Self> {
        message.into_frame()
    }
}
