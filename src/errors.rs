use crate::model::ModelError;
use crate::schema::FieldKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdfKitError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Uncaught error during translation: {0}")]
    PanicInTranslation(String),
    #[error("Error writing translated output: {0}")]
    ErrorInOutput(OutputError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

/// An object type was requested from a schema registry that does not know about it.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("No schema is registered for object type '{0}'")]
pub struct SchemaNotFound(pub String);

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("Object type '{object_type}' has no field named '{field}'")]
    UnknownField { object_type: String, field: String },
    #[error("Value '{value}' does not fit field '{field}' of kind {expected}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        value: String,
    },
    #[error("Field '{0}' is maintained by the model and cannot be set directly")]
    NotSettable(String),
}

/// A field that the active discriminator group (or the schema itself) marks as required has no
/// explicitly assigned value.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("is missing required field '{field}'{}", group.as_ref().map(|group| format!(" for '{group}'")).unwrap_or_default())]
pub struct MissingRequiredField {
    pub field: String,
    pub group: Option<String>,
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("{object} {source}")]
    MissingRequiredField {
        object: String,
        source: MissingRequiredField,
    },
    #[error("For {object}, {reason}")]
    InvalidOwnerReference { object: String, reason: String },
    #[error(transparent)]
    SchemaNotFound(#[from] SchemaNotFound),
    #[error(transparent)]
    Model(#[from] ModelError),
}
