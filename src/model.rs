use crate::errors::{FieldError, SchemaNotFound};
use crate::record::{FieldValue, Record};
use crate::schema::{ObjectSchema, SchemaRegistry};
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Stable identity of an object within a model.
pub type Handle = Uuid;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    SchemaNotFound(#[from] SchemaNotFound),
    #[error("Objects of type '{0}' must be created with an owner")]
    OwnerRequired(String),
    #[error("Objects of type '{0}' cannot have an owner")]
    NotOwnable(String),
    #[error("Cannot attach object of type '{object_type}' to its owner: {reason}")]
    InvalidOwnerReference { object_type: String, reason: String },
    #[error("'{owner}' already has an object of type '{object_type}'")]
    DuplicateChild { owner: String, object_type: String },
    #[error("Objects of type '{0}' have no name")]
    Unnamed(String),
    #[error("No object with handle {0} in the model")]
    ObjectNotFound(Handle),
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// One entity of the in-memory model: its field data plus the handle of its owner, if any. The
/// owner field of the data record is never set here; the owner's name is only written into a
/// record on translation.
#[derive(Clone, Debug)]
pub struct ModelObject {
    handle: Handle,
    data: Record,
    owner: Option<Handle>,
}

impl ModelObject {
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn object_type(&self) -> &str {
        self.data.object_type()
    }

    pub fn schema(&self) -> &Arc<ObjectSchema> {
        self.data.schema()
    }

    pub fn name(&self) -> Option<&str> {
        self.data.name()
    }

    pub fn owner(&self) -> Option<Handle> {
        self.owner
    }

    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.data.get(field)
    }

    pub fn get_string(&self, field: &str) -> Option<&str> {
        self.data.get_string(field)
    }

    pub fn get_double(&self, field: &str) -> Option<f64> {
        self.data.get_double(field)
    }

    pub fn get_int(&self, field: &str) -> Option<i32> {
        self.data.get_int(field)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.data.get_bool(field)
    }

    pub fn is_set(&self, field: &str) -> bool {
        self.data.is_set(field)
    }

    /// Sets a data field. The name and owner fields are maintained by the model; use
    /// [`Model::set_name`] and [`Model::set_owner`] for those.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), FieldError> {
        let index = self.settable_index(field)?;
        self.data.set_by_index(index, value.into())
    }

    pub fn reset(&mut self, field: &str) -> Result<(), FieldError> {
        self.settable_index(field)?;
        self.data.reset(field)
    }

    fn settable_index(&self, field: &str) -> Result<usize, FieldError> {
        let schema = self.data.schema();
        let index = schema.field_index(field)?;
        let owner_field = schema.owner().map(|owner| owner.field());
        if Some(index) == schema.name_field() || Some(index) == owner_field {
            return Err(FieldError::NotSettable(schema.fields()[index].name().to_string()));
        }
        Ok(index)
    }

    /// Sets any field, including the ones maintained by the model.
    pub(crate) fn set_by_index(
        &mut self,
        index: usize,
        value: FieldValue,
    ) -> Result<(), FieldError> {
        self.data.set_by_index(index, value)
    }
}

/// An in-memory collection of model objects keyed by handle, in insertion order. Owner links are
/// handles into the same model.
#[derive(Debug)]
pub struct Model {
    registry: Arc<SchemaRegistry>,
    objects: IndexMap<Handle, ModelObject>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// An empty model over the built-in schemas.
    pub fn new() -> Self {
        Self::with_registry(SchemaRegistry::builtin())
    }

    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            objects: Default::default(),
        }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Adds a new object of a type that has no owner, starting from the type's initial values and
    /// a generated unique name.
    pub fn add_object(&mut self, object_type: &str) -> Result<Handle, ModelError> {
        let schema = self.registry.schema_for(object_type)?;
        if schema.owner().is_some() {
            return Err(ModelError::OwnerRequired(schema.object_type().to_string()));
        }

        Ok(self.insert(schema, None))
    }

    /// Adds a new object owned by `owner`. Fails when the owner does not exist, is of a type the
    /// owner field does not accept, or already has a child of this type where only one is allowed.
    pub fn add_owned_object(
        &mut self,
        object_type: &str,
        owner: Handle,
    ) -> Result<Handle, ModelError> {
        let schema = self.registry.schema_for(object_type)?;
        self.check_owner(&schema, owner)?;

        Ok(self.insert(schema, Some(owner)))
    }

    fn insert(&mut self, schema: Arc<ObjectSchema>, owner: Option<Handle>) -> Handle {
        let handle = Uuid::new_v4();
        let mut data = Record::instantiate(schema.clone());
        if let Some(name_field) = schema.name_field() {
            let name = self.unique_name(schema.object_type(), None, None);
            data.put(name_field, FieldValue::String(name));
        }
        debug!("Adding {} to model", data.brief_description());
        self.objects.insert(
            handle,
            ModelObject {
                handle,
                data,
                owner,
            },
        );
        handle
    }

    fn check_owner(&self, schema: &ObjectSchema, owner: Handle) -> Result<(), ModelError> {
        let object_type = schema.object_type();
        let owner_field = schema
            .owner_field()
            .ok_or_else(|| ModelError::NotOwnable(object_type.to_string()))?;
        let invalid = |reason: String| ModelError::InvalidOwnerReference {
            object_type: object_type.to_string(),
            reason,
        };

        let owner_object = self
            .get_object(owner)
            .ok_or_else(|| invalid(format!("no object with handle {owner}")))?;
        if !owner_field.references_type(owner_object.object_type()) {
            return Err(invalid(format!(
                "owner has type '{}', expected one of {:?}",
                owner_object.object_type(),
                owner_field.reference_types()
            )));
        }
        let is_unique = schema.owner().is_some_and(|owner| owner.is_unique());
        if is_unique && self.child_of_type(owner, object_type).is_some() {
            return Err(ModelError::DuplicateChild {
                owner: owner_object
                    .name()
                    .unwrap_or(owner_object.object_type())
                    .to_string(),
                object_type: object_type.to_string(),
            });
        }

        Ok(())
    }

    pub fn get_object(&self, handle: Handle) -> Option<&ModelObject> {
        self.objects.get(&handle)
    }

    pub fn get_object_mut(&mut self, handle: Handle) -> Option<&mut ModelObject> {
        self.objects.get_mut(&handle)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ModelObject> {
        self.objects.values()
    }

    pub fn objects_by_type(&self, object_type: &str) -> Vec<&ModelObject> {
        self.objects()
            .filter(|object| object.object_type().eq_ignore_ascii_case(object_type))
            .collect()
    }

    pub fn find_by_name(&self, object_type: &str, name: &str) -> Option<&ModelObject> {
        self.objects()
            .filter(|object| object.object_type().eq_ignore_ascii_case(object_type))
            .find(|object| object.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    pub fn children(&self, owner: Handle) -> Vec<&ModelObject> {
        self.objects()
            .filter(|object| object.owner == Some(owner))
            .collect()
    }

    pub fn child_of_type(&self, owner: Handle, object_type: &str) -> Option<&ModelObject> {
        self.objects().find(|object| {
            object.owner == Some(owner) && object.object_type().eq_ignore_ascii_case(object_type)
        })
    }

    pub fn owner_of(&self, handle: Handle) -> Option<&ModelObject> {
        self.get_object(handle)?
            .owner
            .and_then(|owner| self.get_object(owner))
    }

    /// Removes an object together with everything it owns, returning the removed handles.
    pub fn remove_object(&mut self, handle: Handle) -> Vec<Handle> {
        if !self.objects.contains_key(&handle) {
            return vec![];
        }
        let mut removed = vec![];
        let children = self
            .children(handle)
            .iter()
            .map(|child| child.handle)
            .collect::<Vec<_>>();
        for child in children {
            removed.extend(self.remove_object(child));
        }
        self.objects.shift_remove(&handle);
        removed.push(handle);
        removed
    }

    /// Renames an object. Names are unique among objects of every type a reference could confuse
    /// with this one; a clashing name gets a numeric suffix. Returns the name actually applied.
    ///
    /// Fails with a `TypeMismatch` when the name cannot be written to a text record.
    pub fn set_name(&mut self, handle: Handle, name: &str) -> Result<String, ModelError> {
        let object = self
            .get_object(handle)
            .ok_or(ModelError::ObjectNotFound(handle))?;
        let schema = object.schema().clone();
        let name_field = schema
            .name_field()
            .ok_or_else(|| ModelError::Unnamed(schema.object_type().to_string()))?;
        schema.fields()[name_field].coerce(FieldValue::String(name.to_string()))?;
        let name = self.unique_name(schema.object_type(), Some(name), Some(handle));
        if let Some(object) = self.objects.get_mut(&handle) {
            object.data.put(name_field, FieldValue::String(name.clone()));
        }
        Ok(name)
    }

    /// Moves an object to a different owner, subject to the same checks as
    /// [`Model::add_owned_object`].
    pub fn set_owner(&mut self, handle: Handle, owner: Handle) -> Result<(), ModelError> {
        let schema = self
            .get_object(handle)
            .ok_or(ModelError::ObjectNotFound(handle))?
            .schema()
            .clone();
        if self.get_object(handle).and_then(|object| object.owner) == Some(owner) {
            return Ok(());
        }
        self.check_owner(&schema, owner)?;
        if let Some(object) = self.objects.get_mut(&handle) {
            object.owner = Some(owner);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Without a requested name, names are generated as "<type> N".
    fn unique_name(
        &self,
        object_type: &str,
        requested: Option<&str>,
        except: Option<Handle>,
    ) -> String {
        let taken = |candidate: &str| {
            self.objects().any(|object| {
                Some(object.handle) != except
                    && self.registry.share_names(object.object_type(), object_type)
                    && object
                        .name()
                        .is_some_and(|name| name.eq_ignore_ascii_case(candidate))
            })
        };

        if let Some(requested) = requested {
            if !taken(requested) {
                return requested.to_string();
            }
        }
        let base = requested.unwrap_or(object_type);
        (1..)
            .map(|n| format!("{base} {n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}
