pub mod builtin;

use crate::errors::{FieldError, SchemaNotFound};
use crate::record::FieldValue;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::Serialize;
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString};

lazy_static! {
    static ref BUILTIN_REGISTRY: Arc<SchemaRegistry> = Arc::new(builtin::registry());
}

#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq, Serialize)]
pub enum FieldKind {
    String,
    Integer,
    Real,
    Boolean,
    Choice,
    ObjectReference,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChoiceKey {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupMembership {
    pub group: String,
    pub required: bool,
}

/// The static description of one field of an object type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<FieldValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    choices: Vec<ChoiceKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    units: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reference_types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    groups: Vec<GroupMembership>,
}

impl FieldSpec {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
            choices: vec![],
            units: None,
            reference_types: vec![],
            groups: vec![],
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn real(name: &str) -> Self {
        Self::new(name, FieldKind::Real)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// A choice field whose display names are the raw values.
    pub fn choice(name: &str, values: &[&str]) -> Self {
        let mut field = Self::new(name, FieldKind::Choice);
        field.choices = values
            .iter()
            .map(|value| ChoiceKey {
                value: value.to_string(),
                display_name: None,
            })
            .collect();
        field
    }

    /// A choice field with `(value, display name)` pairs.
    pub fn choice_with_display_names(name: &str, pairs: &[(&str, &str)]) -> Self {
        let mut field = Self::new(name, FieldKind::Choice);
        field.choices = pairs
            .iter()
            .map(|(value, display_name)| ChoiceKey {
                value: value.to_string(),
                display_name: Some(display_name.to_string()),
            })
            .collect();
        field
    }

    pub fn object_reference(name: &str, reference_types: &[&str]) -> Self {
        let mut field = Self::new(name, FieldKind::ObjectReference);
        field.reference_types = reference_types.iter().map(|t| t.to_string()).collect();
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Panics if the default does not fit the field, as schemas are fixed at definition time.
    pub fn with_default(mut self, default: impl Into<FieldValue>) -> Self {
        let default = self
            .coerce(default.into())
            .unwrap_or_else(|e| panic!("invalid default in schema: {e}"));
        self.default = Some(default);
        self
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    /// Makes this field a member of a discriminator group, required or optional within it.
    pub fn in_group(mut self, group: &str, required: bool) -> Self {
        self.groups.push(GroupMembership {
            group: group.to_string(),
            required,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&FieldValue> {
        self.default.as_ref()
    }

    pub fn choices(&self) -> &[ChoiceKey] {
        &self.choices
    }

    pub fn choice_values(&self) -> Vec<&str> {
        self.choices.iter().map(|c| c.value.as_str()).collect()
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn reference_types(&self) -> &[String] {
        &self.reference_types
    }

    pub fn groups(&self) -> &[GroupMembership] {
        &self.groups
    }

    pub fn is_grouped(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups
            .iter()
            .any(|membership| membership.group.eq_ignore_ascii_case(group))
    }

    pub fn is_required_in(&self, group: &str) -> bool {
        self.groups
            .iter()
            .any(|membership| membership.required && membership.group.eq_ignore_ascii_case(group))
    }

    pub fn references_type(&self, object_type: &str) -> bool {
        self.reference_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(object_type))
    }

    /// Looks a choice up by raw value (case-insensitively), falling back to an exact display
    /// name match, and returns the canonical raw value.
    pub fn canonical_choice(&self, text: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|choice| choice.value.eq_ignore_ascii_case(text))
            .or_else(|| {
                self.choices
                    .iter()
                    .find(|choice| choice.display_name.as_deref() == Some(text))
            })
            .map(|choice| choice.value.as_str())
    }

    /// Checks a value against this field's kind, applying the two numeric coercions
    /// (integer into real, whole-number real into integer) and choice canonicalisation.
    pub fn coerce(&self, value: FieldValue) -> Result<FieldValue, FieldError> {
        let mismatch = |value: &FieldValue| FieldError::TypeMismatch {
            field: self.name.clone(),
            expected: self.kind,
            value: value.to_string(),
        };

        match self.kind {
            FieldKind::String | FieldKind::ObjectReference => match &value {
                FieldValue::String(text) if is_writable_text(text) => Ok(value),
                _ => Err(mismatch(&value)),
            },
            FieldKind::Choice => match &value {
                FieldValue::String(text) => self
                    .canonical_choice(text)
                    .map(|canonical| FieldValue::String(canonical.to_string()))
                    .ok_or_else(|| mismatch(&value)),
                _ => Err(mismatch(&value)),
            },
            FieldKind::Integer => match value {
                FieldValue::Integer(_) => Ok(value),
                FieldValue::Real(real) if is_whole_i32(real) => Ok(FieldValue::Integer(real as i32)),
                other => Err(mismatch(&other)),
            },
            FieldKind::Real => match value {
                FieldValue::Real(_) => Ok(value),
                FieldValue::Integer(int) => Ok(FieldValue::Real(int as f64)),
                other => Err(mismatch(&other)),
            },
            FieldKind::Boolean => match value {
                FieldValue::Boolean(_) => Ok(value),
                other => Err(mismatch(&other)),
            },
        }
    }

    /// Parses literal record text for this field. Empty text is never passed here; the caller
    /// treats it as an absent field.
    pub fn parse_text(&self, text: &str) -> Result<FieldValue, FieldError> {
        let text = text.trim();
        let mismatch = || FieldError::TypeMismatch {
            field: self.name.clone(),
            expected: self.kind,
            value: text.to_string(),
        };

        match self.kind {
            FieldKind::String | FieldKind::ObjectReference if is_writable_text(text) => {
                Ok(FieldValue::String(text.into()))
            }
            FieldKind::String | FieldKind::ObjectReference => Err(mismatch()),
            FieldKind::Choice => self
                .canonical_choice(text)
                .map(|canonical| FieldValue::String(canonical.to_string()))
                .ok_or_else(mismatch),
            FieldKind::Integer => match text.parse::<i32>() {
                Ok(int) => Ok(FieldValue::Integer(int)),
                Err(_) => parse_finite(text)
                    .filter(|real| is_whole_i32(*real))
                    .map(|real| FieldValue::Integer(real as i32))
                    .ok_or_else(mismatch),
            },
            FieldKind::Real => parse_finite(text)
                .map(FieldValue::Real)
                .ok_or_else(mismatch),
            FieldKind::Boolean => {
                if text.eq_ignore_ascii_case("true") {
                    Ok(FieldValue::Boolean(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(FieldValue::Boolean(false))
                } else {
                    Err(mismatch())
                }
            }
        }
    }
}

/// Whether text survives being written as a field of a text record and read back unchanged:
/// no separators, comment markers or line breaks, and no surrounding whitespace.
pub fn is_writable_text(text: &str) -> bool {
    text.trim() == text && !text.contains([',', ';', '!', '\n', '\r'])
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|real| real.is_finite())
}

pub(crate) fn is_whole_i32(real: f64) -> bool {
    real.fract() == 0. && real >= i32::MIN as f64 && real <= i32::MAX as f64
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OwnerSpec {
    field: usize,
    /// Whether an owner can have at most one child of this type.
    unique: bool,
}

impl OwnerSpec {
    pub fn field(&self) -> usize {
        self.field
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Discriminator {
    field: usize,
    groups: Vec<String>,
    default_group: String,
}

impl Discriminator {
    pub fn field(&self) -> usize {
        self.field
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn default_group(&self) -> &str {
        &self.default_group
    }

    /// Case-insensitive lookup returning the declared spelling of the group.
    pub fn group_named(&self, value: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|group| group.eq_ignore_ascii_case(value))
            .map(String::as_str)
    }
}

/// The ordered field layout of one object type, together with its name, owner and
/// discriminator conventions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectSchema {
    object_type: String,
    fields: Vec<FieldSpec>,
    #[serde(skip)]
    field_index: IndexMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_field: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<OwnerSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discriminator: Option<Discriminator>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    initial_values: Vec<(usize, FieldValue)>,
}

impl ObjectSchema {
    pub fn builder(object_type: &str) -> ObjectSchemaBuilder {
        ObjectSchemaBuilder {
            object_type: object_type.to_string(),
            fields: vec![],
            name_field: None,
            owner: None,
            discriminator: None,
            initial_values: vec![],
        }
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    /// Field names are matched case-insensitively.
    pub fn field_index(&self, name: &str) -> Result<usize, FieldError> {
        self.field_index
            .get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| FieldError::UnknownField {
                object_type: self.object_type.clone(),
                field: name.to_string(),
            })
    }

    pub fn name_field(&self) -> Option<usize> {
        self.name_field
    }

    pub fn owner(&self) -> Option<&OwnerSpec> {
        self.owner.as_ref()
    }

    pub fn owner_field(&self) -> Option<&FieldSpec> {
        self.owner.as_ref().map(|owner| &self.fields[owner.field])
    }

    pub fn discriminator(&self) -> Option<&Discriminator> {
        self.discriminator.as_ref()
    }

    pub fn discriminator_field(&self) -> Option<&FieldSpec> {
        self.discriminator
            .as_ref()
            .map(|discriminator| &self.fields[discriminator.field])
    }

    pub fn initial_values(&self) -> &[(usize, FieldValue)] {
        &self.initial_values
    }

    /// Whether the field at `index` is the name, owner or discriminator field.
    pub fn is_structural_field(&self, index: usize) -> bool {
        Some(index) == self.name_field
            || Some(index) == self.owner.as_ref().map(OwnerSpec::field)
            || Some(index) == self.discriminator.as_ref().map(Discriminator::field)
    }
}

pub struct ObjectSchemaBuilder {
    object_type: String,
    fields: Vec<FieldSpec>,
    name_field: Option<String>,
    owner: Option<(String, bool)>,
    discriminator: Option<(String, Vec<String>)>,
    initial_values: Vec<(String, FieldValue)>,
}

impl ObjectSchemaBuilder {
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name_field(mut self, name: &str) -> Self {
        self.name_field = Some(name.to_string());
        self
    }

    pub fn owner(mut self, field: &str, unique: bool) -> Self {
        self.owner = Some((field.to_string(), unique));
        self
    }

    /// Declares the discriminator field and the names of the groups it selects between. The
    /// initial group is the field's default, or the first declared group.
    pub fn discriminator(mut self, field: &str, groups: &[&str]) -> Self {
        self.discriminator = Some((
            field.to_string(),
            groups.iter().map(|group| group.to_string()).collect(),
        ));
        self
    }

    /// A value every newly instantiated entity of this type starts with.
    pub fn initial_value(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.initial_values.push((field.to_string(), value.into()));
        self
    }

    /// Schemas are static definitions, so any inconsistency here is a programming error and
    /// panics.
    pub fn build(self) -> ObjectSchema {
        let mut field_index = IndexMap::new();
        for (index, field) in self.fields.iter().enumerate() {
            let previous = field_index.insert(field.name.to_ascii_lowercase(), index);
            assert!(
                previous.is_none(),
                "{} declares field '{}' more than once",
                self.object_type,
                field.name
            );
        }
        let lookup = |name: &str| -> usize {
            *field_index.get(&name.to_ascii_lowercase()).unwrap_or_else(|| {
                panic!("{} has no field named '{name}'", self.object_type)
            })
        };

        let name_field = self.name_field.as_deref().map(lookup);
        let owner = self.owner.as_ref().map(|(field, unique)| {
            let field = lookup(field);
            assert_eq!(
                self.fields[field].kind,
                FieldKind::ObjectReference,
                "owner field of {} must be an object reference",
                self.object_type
            );
            OwnerSpec {
                field,
                unique: *unique,
            }
        });
        let discriminator = self.discriminator.as_ref().map(|(field, groups)| {
            let field = lookup(field);
            let default_group = match &self.fields[field].default {
                Some(FieldValue::String(default)) => default.clone(),
                _ => groups
                    .first()
                    .cloned()
                    .unwrap_or_else(|| panic!("{} declares no groups", self.object_type)),
            };
            Discriminator {
                field,
                groups: groups.clone(),
                default_group,
            }
        });
        let initial_values = self
            .initial_values
            .into_iter()
            .map(|(name, value)| {
                let index = lookup(&name);
                let value = self.fields[index]
                    .coerce(value)
                    .unwrap_or_else(|e| panic!("invalid initial value in schema: {e}"));
                (index, value)
            })
            .collect();

        ObjectSchema {
            object_type: self.object_type,
            fields: self.fields,
            field_index,
            name_field,
            owner,
            discriminator,
            initial_values,
        }
    }
}

/// The set of object schemas known to a model or translator, keyed case-insensitively by
/// object type.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Arc<ObjectSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// The registry of schemas shipped with this crate.
    pub fn builtin() -> Arc<SchemaRegistry> {
        BUILTIN_REGISTRY.clone()
    }

    pub fn register(&mut self, schema: ObjectSchema) -> Arc<ObjectSchema> {
        let key = schema.object_type.to_ascii_lowercase();
        assert!(
            !self.schemas.contains_key(&key),
            "schema for {} registered twice",
            schema.object_type
        );
        let schema = Arc::new(schema);
        self.schemas.insert(key, schema.clone());
        schema
    }

    pub fn with(mut self, schema: ObjectSchema) -> Self {
        self.register(schema);
        self
    }

    pub fn schema_for(&self, object_type: &str) -> Result<Arc<ObjectSchema>, SchemaNotFound> {
        self.schemas
            .get(&object_type.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| SchemaNotFound(object_type.to_string()))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Arc<ObjectSchema>> {
        self.schemas.values()
    }

    /// Whether objects of the two types must have distinct names: they are the same type, or some
    /// object reference field accepts both, so a bare name could not tell them apart.
    pub fn share_names(&self, object_type: &str, other_type: &str) -> bool {
        object_type.eq_ignore_ascii_case(other_type)
            || self.schemas().any(|schema| {
                schema.fields().iter().any(|field| {
                    field.kind() == FieldKind::ObjectReference
                        && field.references_type(object_type)
                        && field.references_type(other_type)
                })
            })
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.schemas.values().collect::<Vec<_>>())
    }
}
