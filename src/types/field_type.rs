//! Point field datatype definitions

use serde::{Deserialize, Serialize};

/// Supported point field datatypes.
/// Codes match `sensor_msgs/PointField` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// 8-bit signed integer (INT8 = 1)
    Int8,
    /// 8-bit unsigned integer (UINT8 = 2)
    UInt8,
    /// 16-bit signed integer (INT16 = 3)
    Int16,
    /// 16-bit unsigned integer (UINT16 = 4)
    UInt16,
    /// 32-bit signed integer (INT32 = 5)
    Int32,
    /// 32-bit unsigned integer (UINT32 = 6)
    UInt32,
    /// 32-bit floating point (FLOAT32 = 7)
    Float32,
    /// 64-bit floating point (FLOAT64 = 8)
    Float64,
}

impl FieldType {
    /// Returns the size in bytes of this data type.
    pub const fn size(&self) -> usize {
        match self {
            FieldType::Int8 | FieldType::UInt8 => 1,
            FieldType::Int16 | FieldType::UInt16 => 2,
            FieldType::Int32 | FieldType::UInt32 | FieldType::Float32 => 4,
            FieldType::Float64 => 8,
        }
    }

    /// Map a `sensor_msgs/PointField` datatype code.
    pub fn from_code(code: u8) -> crate::Result<Self> {
        match code {
            1 => Ok(FieldType::Int8),
            2 => Ok(FieldType::UInt8),
            3 => Ok(FieldType::Int16),
            4 => Ok(FieldType::UInt16),
            5 => Ok(FieldType::Int32),
            6 => Ok(FieldType::UInt32),
            7 => Ok(FieldType::Float32),
            8 => Ok(FieldType::Float64),
            _ => Err(crate::PointCloudError::UnknownDatatype { code }),
        }
    }

    /// The `sensor_msgs/PointField` datatype code.
    pub const fn code(&self) -> u8 {
        match self {
            FieldType::Int8 => 1,
            FieldType::UInt8 => 2,
            FieldType::Int16 => 3,
            FieldType::UInt16 => 4,
            FieldType::Int32 => 5,
            FieldType::UInt32 => 6,
            FieldType::Float32 => 7,
            FieldType::Float64 => 8,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Int8 => "INT8",
            FieldType::UInt8 => "UINT8",
            FieldType::Int16 => "INT16",
            FieldType::UInt16 => "UINT16",
            FieldType::Int32 => "INT32",
            FieldType::UInt32 => "UINT32",
            FieldType::Float32 => "FLOAT32",
            FieldType::Float64 => "FLOAT64",
        };
        f.write_str(name)
    }
}

/// Raw value of a single field read out of a record.
///
/// This is what a [`Colormap`](crate::Colormap) receives, so it keeps the
/// source type: packed RGB publishers store color bits in a FLOAT32 field and
/// the colormap needs those bits, not the float's numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Float32(f32),
    Float64(f64),
}

impl FieldValue {
    /// Numeric value widened to f64.
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Int8(v) => v as f64,
            FieldValue::UInt8(v) => v as f64,
            FieldValue::Int16(v) => v as f64,
            FieldValue::UInt16(v) => v as f64,
            FieldValue::Int32(v) => v as f64,
            FieldValue::UInt32(v) => v as f64,
            FieldValue::Float32(v) => v as f64,
            FieldValue::Float64(v) => v,
        }
    }

    /// The low 32 bits of the stored representation.
    ///
    /// Floats contribute their IEEE-754 bit pattern, integers their
    /// two's-complement bits.
    pub fn raw_bits(&self) -> u32 {
        match *self {
            FieldValue::Int8(v) => v as u8 as u32,
            FieldValue::UInt8(v) => v as u32,
            FieldValue::Int16(v) => v as u16 as u32,
            FieldValue::UInt16(v) => v as u32,
            FieldValue::Int32(v) => v as u32,
            FieldValue::UInt32(v) => v,
            FieldValue::Float32(v) => v.to_bits(),
            FieldValue::Float64(v) => v.to_bits() as u32,
        }
    }

    /// The datatype this value was read as.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Int8(_) => FieldType::Int8,
            FieldValue::UInt8(_) => FieldType::UInt8,
            FieldValue::Int16(_) => FieldType::Int16,
            FieldValue::UInt16(_) => FieldType::UInt16,
            FieldValue::Int32(_) => FieldType::Int32,
            FieldValue::UInt32(_) => FieldType::UInt32,
            FieldValue::Float32(_) => FieldType::Float32,
            FieldValue::Float64(_) => FieldType::Float64,
        }
    }
}
