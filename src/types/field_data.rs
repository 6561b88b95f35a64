//! Field data parsing trait and implementations

use super::{Endianness, FieldType, FieldValue};

/// Trait for types that can be parsed from a record at a byte offset.
pub trait FieldData: Sized {
    /// Parse this type from `data` at `offset` using the given byte order.
    fn from_bytes(data: &[u8], offset: usize, endian: Endianness) -> crate::Result<Self>;
}

fn take<const N: usize>(data: &[u8], offset: usize) -> crate::Result<[u8; N]> {
    offset
        .checked_add(N)
        .and_then(|end| data.get(offset..end))
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(crate::PointCloudError::OutOfBounds { offset, size: N })
}

impl FieldData for u8 {
    fn from_bytes(data: &[u8], offset: usize, _endian: Endianness) -> crate::Result<Self> {
        let [byte] = take::<1>(data, offset)?;
        Ok(byte)
    }
}

impl FieldData for i8 {
    fn from_bytes(data: &[u8], offset: usize, _endian: Endianness) -> crate::Result<Self> {
        let [byte] = take::<1>(data, offset)?;
        Ok(byte as i8)
    }
}

impl FieldData for u16 {
    fn from_bytes(data: &[u8], offset: usize, endian: Endianness) -> crate::Result<Self> {
        let bytes = take::<2>(data, offset)?;
        Ok(match endian {
            Endianness::Little => u16::from_le_bytes(bytes),
            Endianness::Big => u16::from_be_bytes(bytes),
        })
    }
}

impl FieldData for i16 {
    fn from_bytes(data: &[u8], offset: usize, endian: Endianness) -> crate::Result<Self> {
        let bytes = take::<2>(data, offset)?;
        Ok(match endian {
            Endianness::Little => i16::from_le_bytes(bytes),
            Endianness::Big => i16::from_be_bytes(bytes),
        })
    }
}

impl FieldData for u32 {
    fn from_bytes(data: &[u8], offset: usize, endian: Endianness) -> crate::Result<Self> {
        let bytes = take::<4>(data, offset)?;
        Ok(match endian {
            Endianness::Little => u32::from_le_bytes(bytes),
            Endianness::Big => u32::from_be_bytes(bytes),
        })
    }
}

impl FieldData for i32 {
    fn from_bytes(data: &[u8], offset: usize, endian: Endianness) -> crate::Result<Self> {
        let bytes = take::<4>(data, offset)?;
        Ok(match endian {
            Endianness::Little => i32::from_le_bytes(bytes),
            Endianness::Big => i32::from_be_bytes(bytes),
        })
    }
}

impl FieldData for f32 {
    fn from_bytes(data: &[u8], offset: usize, endian: Endianness) -> crate::Result<Self> {
        let bytes = take::<4>(data, offset)?;
        Ok(match endian {
            Endianness::Little => f32::from_le_bytes(bytes),
            Endianness::Big => f32::from_be_bytes(bytes),
        })
    }
}

impl FieldData for f64 {
    fn from_bytes(data: &[u8], offset: usize, endian: Endianness) -> crate::Result<Self> {
        let bytes = take::<8>(data, offset)?;
        Ok(match endian {
            Endianness::Little => f64::from_le_bytes(bytes),
            Endianness::Big => f64::from_be_bytes(bytes),
        })
    }
}

/// Read a value of runtime-selected type.
pub fn read_value(
    data: &[u8],
    offset: usize,
    datatype: FieldType,
    endian: Endianness,
) -> crate::Result<FieldValue> {
    Ok(match datatype {
        FieldType::Int8 => FieldValue::Int8(i8::from_bytes(data, offset, endian)?),
        FieldType::UInt8 => FieldValue::UInt8(u8::from_bytes(data, offset, endian)?),
        FieldType::Int16 => FieldValue::Int16(i16::from_bytes(data, offset, endian)?),
        FieldType::UInt16 => FieldValue::UInt16(u16::from_bytes(data, offset, endian)?),
        FieldType::Int32 => FieldValue::Int32(i32::from_bytes(data, offset, endian)?),
        FieldType::UInt32 => FieldValue::UInt32(u32::from_bytes(data, offset, endian)?),
        FieldType::Float32 => FieldValue::Float32(f32::from_bytes(data, offset, endian)?),
        FieldType::Float64 => FieldValue::Float64(f64::from_bytes(data, offset, endian)?),
    })
}
