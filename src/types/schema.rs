//! Record schema types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::FieldType;

/// Schema describing the named fields inside one fixed-size record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Map of field names to their metadata (provides O(1) lookup)
    pub fields: HashMap<String, PointField>,
    /// Size of one record (one point) in bytes
    pub record_size: usize,
}

impl RecordSchema {
    /// Create a new RecordSchema with validation.
    pub fn new(fields: HashMap<String, PointField>, record_size: usize) -> crate::Result<Self> {
        let schema = Self { fields, record_size };
        schema.validate()?;
        Ok(schema)
    }

    /// Build a schema from a field list, as carried by a frame.
    pub fn from_fields<I>(fields: I, record_size: usize) -> crate::Result<Self>
    where
        I: IntoIterator<Item = PointField>,
    {
        let mut map = HashMap::new();
        for field in fields {
            if map.contains_key(&field.name) {
                return Err(crate::PointCloudError::schema_validation(format!(
                    "Field '{}' appears more than once",
                    field.name
                )));
            }
            map.insert(field.name.clone(), field);
        }
        Self::new(map, record_size)
    }

    /// Validate the schema for consistency.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, field) in &self.fields {
            if field.count == 0 {
                return Err(crate::PointCloudError::schema_validation(format!(
                    "Field '{}' has count of 0",
                    name
                )));
            }

            if field.name != *name {
                return Err(crate::PointCloudError::schema_validation(format!(
                    "Field map key '{}' doesn't match field name '{}'",
                    name, field.name
                )));
            }

            if field.end_offset().is_none_or(|end| end > self.record_size) {
                return Err(crate::PointCloudError::OutOfBounds {
                    offset: field.offset,
                    size: field.datatype.size().saturating_mul(field.count),
                });
            }
        }

        Ok(())
    }

    /// Get field info by name (O(1) lookup).
    pub fn get_field(&self, name: &str) -> Option<&PointField> {
        self.fields.get(name)
    }

    /// Check if a field exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get the number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Description of one named field inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointField {
    /// Field name as published (e.g. "x", "intensity", "rgb")
    pub name: String,
    /// Byte offset from the start of the record
    pub offset: usize,
    /// Element datatype
    pub datatype: FieldType,
    /// Number of elements (1 for scalar)
    pub count: usize,
}

impl PointField {
    /// Scalar field helper.
    pub fn new(name: impl Into<String>, offset: usize, datatype: FieldType) -> Self {
        Self { name: name.into(), offset, datatype, count: 1 }
    }

    /// One past the last byte this field occupies, `None` on overflow.
    pub fn end_offset(&self) -> Option<usize> {
        self.datatype.size().checked_mul(self.count).and_then(|size| self.offset.checked_add(size))
    }
}
