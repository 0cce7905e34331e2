use crate::errors::FieldError;
use crate::schema::{FieldSpec, ObjectSchema};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A single typed field value. Which variant a field may hold is decided by its `FieldKind`:
/// String, Choice and ObjectReference fields all hold `String`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i32),
    Real(f64),
    Boolean(bool),
}

impl FieldValue {
    /// Locale-independent literal text, as written to a text record.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::String(string) => string.clone(),
            FieldValue::Integer(int) => int.to_string(),
            FieldValue::Real(real) => real.to_string(),
            FieldValue::Boolean(boolean) => boolean.to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(string) => Some(string),
            FieldValue::Integer(_) | FieldValue::Real(_) | FieldValue::Boolean(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Real(real) => Some(*real),
            FieldValue::String(_) | FieldValue::Integer(_) | FieldValue::Boolean(_) => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            FieldValue::Integer(int) => Some(*int),
            FieldValue::String(_) | FieldValue::Real(_) | FieldValue::Boolean(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(boolean) => Some(*boolean),
            FieldValue::String(_) | FieldValue::Integer(_) | FieldValue::Real(_) => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Real(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// An ordered bag of optional values, index-aligned with the fields of its schema. A slot is
/// either unset or holds a value of the field's kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    schema: Arc<ObjectSchema>,
    values: Vec<Option<FieldValue>>,
}

impl Record {
    /// A record with every slot unset.
    pub fn new(schema: Arc<ObjectSchema>) -> Self {
        let values = vec![None; schema.fields().len()];
        Self { schema, values }
    }

    /// A record carrying the schema's constructor-provided initial values.
    pub fn instantiate(schema: Arc<ObjectSchema>) -> Self {
        let mut record = Self::new(schema);
        for (index, value) in record.schema.initial_values() {
            record.values[*index] = Some(value.clone());
        }
        record
    }

    pub fn schema(&self) -> &Arc<ObjectSchema> {
        &self.schema
    }

    pub fn object_type(&self) -> &str {
        self.schema.object_type()
    }

    pub fn name(&self) -> Option<&str> {
        self.schema
            .name_field()
            .and_then(|index| self.values[index].as_ref())
            .and_then(FieldValue::as_str)
    }

    /// The name of the owning object, as held in the owner reference field.
    pub fn owner_name(&self) -> Option<&str> {
        self.schema
            .owner()
            .and_then(|owner| self.values[owner.field()].as_ref())
            .and_then(FieldValue::as_str)
    }

    /// A short human-readable identification, used in diagnostics.
    pub fn brief_description(&self) -> String {
        match self.name() {
            Some(name) => format!("Object of type '{}' and named '{name}'", self.object_type()),
            None => format!("Unnamed object of type '{}'", self.object_type()),
        }
    }

    /// The assigned value, falling back to the field default.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.schema
            .field_index(field)
            .ok()
            .and_then(|index| self.get_by_index(index))
    }

    pub fn get_by_index(&self, index: usize) -> Option<&FieldValue> {
        self.values
            .get(index)?
            .as_ref()
            .or_else(|| self.schema.field(index)?.default_value())
    }

    /// Whether the field was explicitly assigned; defaults do not count.
    pub fn is_set(&self, field: &str) -> bool {
        self.schema
            .field_index(field)
            .map(|index| self.is_set_by_index(index))
            .unwrap_or(false)
    }

    pub fn is_set_by_index(&self, index: usize) -> bool {
        matches!(self.values.get(index), Some(Some(_)))
    }

    pub fn get_string(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    pub fn get_double(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    pub fn get_int(&self, field: &str) -> Option<i32> {
        self.get(field).and_then(FieldValue::as_i32)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(FieldValue::as_bool)
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), FieldError> {
        let index = self.schema.field_index(field)?;
        self.set_by_index(index, value.into())
    }

    pub fn set_by_index(&mut self, index: usize, value: FieldValue) -> Result<(), FieldError> {
        let value = self.field_spec(index)?.coerce(value)?;
        self.values[index] = Some(value);
        Ok(())
    }

    pub fn reset(&mut self, field: &str) -> Result<(), FieldError> {
        let index = self.schema.field_index(field)?;
        self.values[index] = None;
        Ok(())
    }

    /// Assigns a field from literal record text. Empty text resets the field; text that cannot be
    /// read as the field's kind leaves the field unset and reports a `TypeMismatch`.
    pub fn set_text_by_index(&mut self, index: usize, text: &str) -> Result<(), FieldError> {
        let field = self.field_spec(index)?;
        if text.trim().is_empty() {
            self.values[index] = None;
            return Ok(());
        }
        match field.parse_text(text) {
            Ok(value) => {
                self.values[index] = Some(value);
                Ok(())
            }
            Err(e) => {
                self.values[index] = None;
                Err(e)
            }
        }
    }

    pub fn set_text(&mut self, field: &str, text: &str) -> Result<(), FieldError> {
        let index = self.schema.field_index(field)?;
        self.set_text_by_index(index, text)
    }

    /// The literal text of an explicitly assigned field.
    pub fn text(&self, field: &str) -> Option<String> {
        let index = self.schema.field_index(field).ok()?;
        self.values[index].as_ref().map(FieldValue::to_text)
    }

    /// Explicitly assigned fields in schema order.
    pub fn set_fields(&self) -> impl Iterator<Item = (usize, &FieldSpec, &FieldValue)> {
        self.schema
            .fields()
            .iter()
            .zip(self.values.iter())
            .enumerate()
            .filter_map(|(index, (field, value))| value.as_ref().map(|value| (index, field, value)))
    }

    /// The explicitly assigned slots, unset slots as `None`.
    pub fn values(&self) -> &[Option<FieldValue>] {
        &self.values
    }

    /// Stores a value already known to fit the field, e.g. one copied from a record of the same
    /// schema.
    pub(crate) fn put(&mut self, index: usize, value: FieldValue) {
        debug_assert!(self.schema.fields()[index].coerce(value.clone()).is_ok());
        self.values[index] = Some(value);
    }

    fn field_spec(&self, index: usize) -> Result<&FieldSpec, FieldError> {
        self.schema
            .field(index)
            .ok_or_else(|| FieldError::UnknownField {
                object_type: self.object_type().to_string(),
                field: format!("#{index}"),
            })
    }
}
