use crate::errors::{MissingRequiredField, TranslationError};
use crate::model::{Handle, Model};
use crate::schema::SchemaRegistry;
use crate::translator::{Diagnostics, LogMessage, Severity};
use crate::workspace::Workspace;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use std::sync::Arc;
use tracing::debug;

/// Translates records back into model objects.
///
/// Present fields are copied onto the object; absent fields keep the object's initial values. No
/// required-field validation happens in this direction.
#[derive(Debug)]
pub struct ReverseTranslator {
    registry: Arc<SchemaRegistry>,
    model: Model,
    map: IndexMap<usize, Option<Handle>>,
    in_progress: IndexSet<usize>,
    diagnostics: Diagnostics,
}

impl Default for ReverseTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverseTranslator {
    pub fn new() -> Self {
        Self::with_registry(SchemaRegistry::builtin())
    }

    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            model: Model::with_registry(registry.clone()),
            registry,
            map: Default::default(),
            in_progress: Default::default(),
            diagnostics: Default::default(),
        }
    }

    /// Translates every record of the workspace into a new model, starting a fresh session.
    pub fn translate_workspace(&mut self, workspace: &Workspace) -> Model {
        self.model = Model::with_registry(self.registry.clone());
        self.map.clear();
        self.in_progress.clear();
        self.diagnostics.clear();

        for index in 0..workspace.len() {
            self.translate_and_map_record(workspace, index);
        }

        std::mem::replace(&mut self.model, Model::with_registry(self.registry.clone()))
    }

    /// Translates the record at `index` unless this session already tried to, returning the
    /// handle of the resulting object.
    pub fn translate_and_map_record(
        &mut self,
        workspace: &Workspace,
        index: usize,
    ) -> Option<Handle> {
        if let Some(handle) = self.map.get(&index) {
            return *handle;
        }
        if !self.in_progress.insert(index) {
            let object = workspace
                .get(index)
                .map(|record| record.brief_description())
                .unwrap_or_else(|| format!("Record {index}"));
            self.fail(TranslationError::InvalidOwnerReference {
                object,
                reason: "its owner references form a cycle".into(),
            });
            return None;
        }

        let handle = self.translate_record(workspace, index);
        self.in_progress.shift_remove(&index);
        self.map.insert(index, handle);
        handle
    }

    /// Translates one record into a model object. The owner is resolved first, translating its
    /// record on demand. An owner that may hold only one object of this type has its existing
    /// object reused.
    pub fn translate_record(&mut self, workspace: &Workspace, index: usize) -> Option<Handle> {
        let record = workspace.get(index)?;
        let object = record.brief_description();
        let schema = match self.registry.schema_for(record.object_type()) {
            Ok(schema) => schema,
            Err(e) => {
                self.diagnostics
                    .push(Severity::Warn, format!("{e}; {object} will not be translated"));
                return None;
            }
        };

        let owner = match schema.owner() {
            Some(owner_spec) => {
                let owner_field = schema.fields()[owner_spec.field()].name();
                let Some(owner_name) = record.owner_name() else {
                    self.fail(TranslationError::InvalidOwnerReference {
                        object,
                        reason: format!("the owner reference '{owner_field}' is absent"),
                    });
                    return None;
                };
                let target = match workspace.targets(index, owner_field).as_slice() {
                    [target] => *target,
                    [] => {
                        let reason = match workspace
                            .find_by_name(owner_name)
                            .and_then(|found| workspace.get(found))
                        {
                            Some(found) => format!(
                                "'{owner_name}' is of type '{}', which cannot own it",
                                found.object_type()
                            ),
                            None => format!("'{owner_name}' cannot be found"),
                        };
                        self.fail(TranslationError::InvalidOwnerReference { object, reason });
                        return None;
                    }
                    targets => {
                        let types = targets
                            .iter()
                            .filter_map(|target| workspace.get(*target))
                            .map(|found| format!("'{}'", found.object_type()))
                            .join(", ");
                        self.fail(TranslationError::InvalidOwnerReference {
                            object,
                            reason: format!("'{owner_name}' names more than one object ({types})"),
                        });
                        return None;
                    }
                };
                let Some(owner) = self.translate_and_map_record(workspace, target) else {
                    self.fail(TranslationError::InvalidOwnerReference {
                        object,
                        reason: format!("its owner '{owner_name}' could not be translated"),
                    });
                    return None;
                };
                Some(owner)
            }
            None => None,
        };

        if let Some(discriminator) = schema.discriminator() {
            if !record.is_set_by_index(discriminator.field()) {
                self.fail(TranslationError::MissingRequiredField {
                    object,
                    source: MissingRequiredField {
                        field: schema.fields()[discriminator.field()].name().to_string(),
                        group: None,
                    },
                });
                return None;
            }
        }

        let existing = owner
            .filter(|_| schema.owner().is_some_and(|owner| owner.is_unique()))
            .and_then(|owner| self.model.child_of_type(owner, schema.object_type()))
            .map(|child| child.handle());
        let created = match (existing, owner) {
            (Some(existing), _) => Ok(existing),
            (None, Some(owner)) => self.model.add_owned_object(schema.object_type(), owner),
            (None, None) => self.model.add_object(schema.object_type()),
        };
        let handle = match created {
            Ok(handle) => handle,
            Err(e) => {
                self.fail(TranslationError::Model(e));
                return None;
            }
        };

        if let Some(name) = record.name() {
            if let Err(e) = self.model.set_name(handle, name) {
                self.diagnostics.push(Severity::Warn, format!("{object}: {e}"));
            }
        }
        let owner_field = schema.owner().map(|owner| owner.field());
        for (field_index, field, value) in record.set_fields() {
            if Some(field_index) == schema.name_field() || Some(field_index) == owner_field {
                continue;
            }
            let Some(target) = self.model.get_object_mut(handle) else {
                break;
            };
            if let Err(e) = target.set_by_index(field_index, value.clone()) {
                self.diagnostics.push(
                    Severity::Warn,
                    format!("{object}: field '{}' not copied: {e}", field.name()),
                );
            }
        }

        debug!("Reverse translated {object}");
        Some(handle)
    }

    /// The model being built by the current session.
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn errors(&self) -> Vec<&LogMessage> {
        self.diagnostics.errors()
    }

    pub fn warnings(&self) -> Vec<&LogMessage> {
        self.diagnostics.warnings()
    }

    fn fail(&mut self, error: TranslationError) {
        self.diagnostics
            .push(Severity::Error, format!("{error}; no object was created"));
    }
}
