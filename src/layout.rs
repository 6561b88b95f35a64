//! Field layout resolved once per record schema.
//!
//! Looking fields up by name for every point is wasteful, so the schema is
//! resolved into fixed offsets when it first appears (or changes). Decoding
//! then reads straight from those offsets.
//!
//! ```rust
//! use pointstream::{FieldLayout, types::{FieldType, PointField, RecordSchema}};
//!
//! let schema = RecordSchema::from_fields(vec![
//!     PointField::new("x", 0, FieldType::Float32),
//!     PointField::new("y", 4, FieldType::Float32),
//!     PointField::new("z", 8, FieldType::Float32),
//!     PointField::new("intensity", 12, FieldType::Float32),
//! ], 16).unwrap();
//!
//! let layout = FieldLayout::setup(&schema, Some("intensity")).unwrap();
//! assert_eq!(layout.record_size(), 16);
//! assert!(layout.has_color());
//! ```

use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::types::{FieldType, PointField, RecordSchema};

/// Field picked up for coloring when none is configured.
pub const DEFAULT_COLOR_FIELD: &str = "rgb";

const POSITION_FIELDS: [&str; 3] = ["x", "y", "z"];

/// Offset and type of the field used for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSource {
    pub offset: usize,
    pub datatype: FieldType,
}

/// Immutable x/y/z (and optional color) offsets within one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    record_size: usize,
    position: [usize; 3],
    color: Option<ColorSource>,
    color_field: Option<String>,
}

impl FieldLayout {
    /// Resolve `schema` into fixed offsets.
    ///
    /// Position fields must exist, be FLOAT32 and fit inside the record.
    /// `color_field` selects the coloring source; when `None`, an `rgb` field
    /// is used if present. A requested color field that the schema lacks
    /// disables coloring rather than failing.
    pub fn setup(schema: &RecordSchema, color_field: Option<&str>) -> Result<Self, LayoutError> {
        if schema.record_size == 0 {
            return Err(LayoutError::EmptyRecord);
        }

        let mut position = [0usize; 3];
        for (slot, name) in position.iter_mut().zip(POSITION_FIELDS) {
            let field = schema
                .get_field(name)
                .ok_or(LayoutError::MissingPositionField { field: name })?;

            if field.datatype != FieldType::Float32 {
                return Err(LayoutError::PositionFieldType {
                    field: name,
                    found: field.datatype.to_string(),
                });
            }
            check_bounds(field, schema.record_size)?;
            *slot = field.offset;
        }

        let (color, color_field) = match color_field {
            Some(name) => match schema.get_field(name) {
                Some(field) => {
                    check_bounds(field, schema.record_size)?;
                    (Some(ColorSource { offset: field.offset, datatype: field.datatype }), Some(name))
                }
                None => {
                    warn!("Unavailable field '{}' in point cloud message, coloring disabled", name);
                    (None, None)
                }
            },
            None => match schema.get_field(DEFAULT_COLOR_FIELD) {
                Some(field) => {
                    check_bounds(field, schema.record_size)?;
                    (
                        Some(ColorSource { offset: field.offset, datatype: field.datatype }),
                        Some(DEFAULT_COLOR_FIELD),
                    )
                }
                None => (None, None),
            },
        };

        debug!(
            "Resolved field layout: record_size={}, xyz={:?}, color={:?}",
            schema.record_size, position, color_field
        );

        Ok(Self {
            record_size: schema.record_size,
            position,
            color,
            color_field: color_field.map(str::to_string),
        })
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Byte offsets of x, y and z.
    pub fn position_offsets(&self) -> [usize; 3] {
        self.position
    }

    pub fn color(&self) -> Option<ColorSource> {
        self.color
    }

    pub fn has_color(&self) -> bool {
        self.color.is_some()
    }

    /// Name of the field feeding the colormap, if any.
    pub fn color_field(&self) -> Option<&str> {
        self.color_field.as_deref()
    }
}

fn check_bounds(field: &PointField, record_size: usize) -> Result<(), LayoutError> {
    let size = field.datatype.size();
    if field.offset.checked_add(size).is_none_or(|end| end > record_size) {
        return Err(LayoutError::FieldOutOfBounds {
            field: field.name.clone(),
            offset: field.offset,
            size,
            record_size,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn xyz_schema(extra: Vec<PointField>, record_size: usize) -> RecordSchema {
        let mut fields = vec![
            PointField::new("x", 0, FieldType::Float32),
            PointField::new("y", 4, FieldType::Float32),
            PointField::new("z", 8, FieldType::Float32),
        ];
        fields.extend(extra);
        RecordSchema::from_fields(fields, record_size).unwrap()
    }

    #[test]
    fn resolves_position_offsets() {
        let layout = FieldLayout::setup(&xyz_schema(vec![], 16), None).unwrap();
        assert_eq!(layout.position_offsets(), [0, 4, 8]);
        assert!(!layout.has_color());
        assert_eq!(layout.color_field(), None);
    }

    #[test]
    fn missing_position_field_fails() {
        let schema = RecordSchema::from_fields(
            vec![PointField::new("x", 0, FieldType::Float32), PointField::new("y", 4, FieldType::Float32)],
            12,
        )
        .unwrap();
        assert_eq!(
            FieldLayout::setup(&schema, None),
            Err(LayoutError::MissingPositionField { field: "z" })
        );
    }

    #[test]
    fn non_float_position_fails() {
        let schema = RecordSchema::from_fields(
            vec![
                PointField::new("x", 0, FieldType::Float32),
                PointField::new("y", 4, FieldType::Int32),
                PointField::new("z", 8, FieldType::Float32),
            ],
            12,
        )
        .unwrap();
        assert!(matches!(
            FieldLayout::setup(&schema, None),
            Err(LayoutError::PositionFieldType { field: "y", .. })
        ));
    }

    #[test]
    fn out_of_bounds_position_fails() {
        // Bypass schema validation to exercise the layout's own check
        let mut fields = HashMap::new();
        for (name, offset) in [("x", 0), ("y", 4), ("z", 10)] {
            fields.insert(name.to_string(), PointField::new(name, offset, FieldType::Float32));
        }
        let schema = RecordSchema { fields, record_size: 12 };
        assert!(matches!(
            FieldLayout::setup(&schema, None),
            Err(LayoutError::FieldOutOfBounds { offset: 10, .. })
        ));
    }

    #[test]
    fn rgb_is_picked_up_by_default() {
        let schema = xyz_schema(vec![PointField::new("rgb", 12, FieldType::Float32)], 16);
        let layout = FieldLayout::setup(&schema, None).unwrap();
        assert_eq!(layout.color(), Some(ColorSource { offset: 12, datatype: FieldType::Float32 }));
        assert_eq!(layout.color_field(), Some("rgb"));
    }

    #[test]
    fn configured_color_field_wins() {
        let schema = xyz_schema(
            vec![
                PointField::new("rgb", 12, FieldType::Float32),
                PointField::new("intensity", 16, FieldType::UInt16),
            ],
            20,
        );
        let layout = FieldLayout::setup(&schema, Some("intensity")).unwrap();
        assert_eq!(layout.color(), Some(ColorSource { offset: 16, datatype: FieldType::UInt16 }));
    }

    #[test]
    fn unavailable_color_field_disables_coloring() {
        let layout = FieldLayout::setup(&xyz_schema(vec![], 12), Some("intensity")).unwrap();
        assert!(!layout.has_color());
    }

    #[test]
    fn overflowing_offset_fails() {
        let mut fields = HashMap::new();
        for (name, offset) in [("x", 0), ("y", 4), ("z", usize::MAX - 1)] {
            fields.insert(name.to_string(), PointField::new(name, offset, FieldType::Float32));
        }
        let schema = RecordSchema { fields, record_size: 12 };
        assert!(matches!(
            FieldLayout::setup(&schema, None),
            Err(LayoutError::FieldOutOfBounds { field, .. }) if field == "z"
        ));
    }

    #[test]
    fn empty_record_fails() {
        let schema = RecordSchema { fields: HashMap::new(), record_size: 0 };
        assert_eq!(FieldLayout::setup(&schema, None), Err(LayoutError::EmptyRecord));
    }
}
