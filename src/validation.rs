//! Discriminator-conditional required-field validation.
//!
//! A schema with a discriminator partitions its grouped fields into named groups. The value of
//! the discriminator selects exactly one active group; only that group's required fields are
//! checked. Fields in inactive groups may hold values but are never checked.

use crate::errors::MissingRequiredField;
use crate::record::{FieldValue, Record};
use tracing::trace;

/// The declared name of the group selected by the record's discriminator, or `None` when the
/// schema has no discriminator.
///
/// Panics when the discriminator holds a value that names no declared group, as that means the
/// schema's choices and its group list disagree.
pub fn active_group(record: &Record) -> Option<&str> {
    let schema = record.schema();
    let discriminator = schema.discriminator()?;
    let value = match record.get_by_index(discriminator.field()) {
        Some(FieldValue::String(value)) => value.as_str(),
        Some(FieldValue::Integer(_) | FieldValue::Real(_) | FieldValue::Boolean(_)) | None => {
            discriminator.default_group()
        }
    };

    match discriminator.group_named(value) {
        Some(group) => Some(group),
        None => panic!(
            "Unknown discriminator value '{value}' for {}; expected one of {:?}",
            schema.object_type(),
            discriminator.groups()
        ),
    }
}

/// Checks that every field required by the active group, and every unconditionally required
/// plain field, is explicitly set. Stops at the first missing field in schema order.
///
/// On success returns the active group.
pub fn validate(record: &Record) -> Result<Option<&str>, MissingRequiredField> {
    let group = active_group(record);
    let schema = record.schema();

    for (index, field) in schema.fields().iter().enumerate() {
        if field.is_grouped() {
            let Some(group) = group else {
                continue;
            };
            if field.is_required_in(group) && !record.is_set_by_index(index) {
                return Err(MissingRequiredField {
                    field: field.name().to_string(),
                    group: Some(group.to_string()),
                });
            }
        } else if field.is_required()
            && !schema.is_structural_field(index)
            && record.get_by_index(index).is_none()
        {
            return Err(MissingRequiredField {
                field: field.name().to_string(),
                group: None,
            });
        }
    }

    trace!(
        "{} passes validation for group {group:?}",
        record.brief_description()
    );
    Ok(group)
}

/// Whether a set field takes part in translation under the given active group: plain fields
/// always do, grouped fields only when they belong to the active group.
pub fn is_field_active(record: &Record, index: usize, group: Option<&str>) -> bool {
    match record.schema().field(index) {
        Some(field) if field.is_grouped() => group.is_some_and(|group| field.is_member_of(group)),
        Some(_) => true,
        None => false,
    }
}
