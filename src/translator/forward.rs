use crate::errors::TranslationError;
use crate::model::{Handle, Model};
use crate::record::{FieldValue, Record};
use crate::translator::{Diagnostics, LogMessage, Severity};
use crate::validation::{is_field_active, validate};
use crate::workspace::Workspace;
use indexmap::IndexMap;
use tracing::debug;

/// Translates model objects into records.
///
/// One translator instance is one session: it owns the emitted records in discovery order, the
/// handle to record index, and the diagnostics raised along the way.
#[derive(Debug, Default)]
pub struct ForwardTranslator {
    records: Vec<Record>,
    map: IndexMap<Handle, Option<usize>>,
    diagnostics: Diagnostics,
}

impl ForwardTranslator {
    pub fn new() -> Self {
        Default::default()
    }

    /// Translates every object of the model, owners before the objects they own, starting a
    /// fresh session.
    pub fn translate_model(&mut self, model: &Model) -> Workspace {
        self.records.clear();
        self.map.clear();
        self.diagnostics.clear();

        for object in model.objects() {
            self.translate_and_map(model, object.handle());
        }

        Workspace::from_records(self.records.clone())
    }

    /// Translates an object unless this session already tried to, returning the index of its
    /// record. An object that failed once stays failed for the rest of the session.
    pub fn translate_and_map(&mut self, model: &Model, handle: Handle) -> Option<usize> {
        if let Some(index) = self.map.get(&handle) {
            return *index;
        }
        self.translate_object(model, handle)
    }

    /// Translates a single object and appends its record to the session output. Calling this
    /// again for the same object appends a second record and remaps the handle to it.
    ///
    /// When the object fails validation, nothing is emitted and an error diagnostic is raised.
    /// When its owner produces no record, nothing is emitted either and a warning names the owner.
    ///
    /// Panics when the handle, or the owner of an owned object, does not resolve in the model.
    pub fn translate_object(&mut self, model: &Model, handle: Handle) -> Option<usize> {
        let object = model
            .get_object(handle)
            .unwrap_or_else(|| panic!("No object with handle {handle} in the model"));
        let data = object.data();
        let schema = object.schema();
        let mut record = Record::new(schema.clone());

        if let Some(name_field) = schema.name_field() {
            if let Some(name) = data.values()[name_field].clone() {
                record.put(name_field, name);
            }
        }

        if let Some(owner_spec) = schema.owner() {
            let owner = model.owner_of(handle).unwrap_or_else(|| {
                panic!("{} has no owner in the model", data.brief_description())
            });
            if self.translate_and_map(model, owner.handle()).is_none() {
                self.diagnostics.push(
                    Severity::Warn,
                    format!(
                        "{} will not be translated because its owner '{}' could not be translated",
                        data.brief_description(),
                        owner.name().unwrap_or_default()
                    ),
                );
                self.map.insert(handle, None);
                return None;
            }
            if let Some(owner_name) = owner.name() {
                record.put(owner_spec.field(), FieldValue::String(owner_name.to_string()));
            }
        }

        let group = match validate(data) {
            Ok(group) => group,
            Err(source) => {
                let error = TranslationError::MissingRequiredField {
                    object: data.brief_description(),
                    source,
                };
                self.diagnostics
                    .push(Severity::Error, format!("{error} and will not be translated"));
                self.map.insert(handle, None);
                return None;
            }
        };

        if let (Some(discriminator), Some(group)) = (schema.discriminator(), group) {
            let value = data
                .get_by_index(discriminator.field())
                .cloned()
                .unwrap_or_else(|| FieldValue::String(group.to_string()));
            record.put(discriminator.field(), value);
        }

        for (index, _, value) in data.set_fields() {
            if schema.is_structural_field(index) || !is_field_active(data, index, group) {
                continue;
            }
            record.put(index, value.clone());
        }

        debug!("Translated {}", record.brief_description());
        self.records.push(record);
        let index = self.records.len() - 1;
        self.map.insert(handle, Some(index));
        Some(index)
    }

    /// The records emitted so far in this session.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The most recent record emitted for an object.
    pub fn record_for(&self, handle: Handle) -> Option<&Record> {
        self.map
            .get(&handle)
            .copied()
            .flatten()
            .map(|index| &self.records[index])
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin::{WATER_HEATER_MIXED, WATER_HEATER_SIZING};
    use pretty_assertions::assert_eq;
    use rstest::*;

    struct Fixture {
        model: Model,
        heater: Handle,
        sizing: Handle,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let mut model = Model::new();
        let heater = model.add_object(WATER_HEATER_MIXED).unwrap();
        model.set_name(heater, "Main Tank").unwrap();
        let sizing = model.add_owned_object(WATER_HEATER_SIZING, heater).unwrap();
        Fixture {
            model,
            heater,
            sizing,
        }
    }

    #[rstest]
    fn should_translate_owner_before_owned_object(fixture: Fixture) {
        let mut translator = ForwardTranslator::new();
        let index = translator.translate_object(&fixture.model, fixture.sizing);

        assert_eq!(index, Some(1));
        assert_eq!(translator.records().len(), 2);
        assert_eq!(translator.records()[0].object_type(), WATER_HEATER_MIXED);
        let sizing = translator.record_for(fixture.sizing).unwrap();
        assert_eq!(sizing.owner_name(), Some("Main Tank"));
        assert!(translator.record_for(fixture.heater).is_some());
    }

    #[rstest]
    fn should_always_write_the_discriminator(mut fixture: Fixture) {
        fixture
            .model
            .get_object_mut(fixture.sizing)
            .unwrap()
            .reset("DesignMode")
            .unwrap();
        let mut translator = ForwardTranslator::new();
        translator.translate_model(&fixture.model);

        let sizing = translator.record_for(fixture.sizing).unwrap();
        assert_eq!(sizing.text("DesignMode"), Some("PeakDraw".to_string()));
    }

    #[rstest]
    fn should_not_materialise_defaults(fixture: Fixture) {
        let mut translator = ForwardTranslator::new();
        let workspace = translator.translate_model(&fixture.model);

        let heaters = workspace.objects_by_type(WATER_HEATER_MIXED);
        let heater = heaters[0];
        assert!(!heater.is_set("DeadbandTemperatureDifference"));
        assert!(heater.is_set("TankVolume"));
    }

    #[rstest]
    fn should_skip_invalid_object_and_report_it(mut fixture: Fixture) {
        fixture
            .model
            .get_object_mut(fixture.sizing)
            .unwrap()
            .reset("TimeforTankRecovery")
            .unwrap();
        let mut translator = ForwardTranslator::new();
        let workspace = translator.translate_model(&fixture.model);

        assert_eq!(workspace.len(), 1);
        assert!(translator.record_for(fixture.sizing).is_none());
        assert_eq!(translator.errors().len(), 1);
        assert_eq!(
            translator.errors()[0].message,
            "Object of type 'WaterHeater:Sizing' and named 'WaterHeater:Sizing 1' is missing \
             required field 'TimeforTankRecovery' for 'PeakDraw' and will not be translated"
        );
    }

    #[rstest]
    fn should_abandon_owned_object_when_owner_fails(fixture: Fixture) {
        let mut model = fixture.model;
        model
            .get_object_mut(fixture.heater)
            .unwrap()
            .reset("HeaterFuelType")
            .unwrap();
        let mut translator = ForwardTranslator::new();
        let workspace = translator.translate_model(&model);

        assert_eq!(workspace.len(), 0);
        assert_eq!(translator.errors().len(), 1);
        assert!(translator.errors()[0].message.contains("'Main Tank'"));
        assert_eq!(translator.warnings().len(), 1);
        assert_eq!(
            translator.warnings()[0].message,
            "Object of type 'WaterHeater:Sizing' and named 'WaterHeater:Sizing 1' will not be \
             translated because its owner 'Main Tank' could not be translated"
        );
        assert!(translator.record_for(fixture.sizing).is_none());
    }

    #[rstest]
    fn should_not_retry_failed_objects_within_a_session(mut fixture: Fixture) {
        fixture
            .model
            .get_object_mut(fixture.heater)
            .unwrap()
            .reset("HeaterFuelType")
            .unwrap();
        let mut translator = ForwardTranslator::new();
        assert_eq!(translator.translate_and_map(&fixture.model, fixture.heater), None);
        assert_eq!(translator.translate_and_map(&fixture.model, fixture.heater), None);
        assert_eq!(translator.translate_and_map(&fixture.model, fixture.sizing), None);

        assert_eq!(translator.errors().len(), 1);
        assert_eq!(translator.records().len(), 0);
    }

    #[rstest]
    fn should_emit_each_object_once_per_model_translation(fixture: Fixture) {
        let mut translator = ForwardTranslator::new();
        let workspace = translator.translate_model(&fixture.model);
        assert_eq!(workspace.len(), 2);

        let workspace = translator.translate_model(&fixture.model);
        assert_eq!(workspace.len(), 2);
    }

    #[rstest]
    fn should_append_again_on_repeated_direct_translation(fixture: Fixture) {
        let mut translator = ForwardTranslator::new();
        translator.translate_object(&fixture.model, fixture.heater);
        translator.translate_object(&fixture.model, fixture.heater);
        assert_eq!(translator.records().len(), 2);

        assert_eq!(translator.translate_and_map(&fixture.model, fixture.heater), Some(1));
        assert_eq!(translator.records().len(), 2);
    }

    #[rstest]
    #[should_panic(expected = "No object with handle")]
    fn should_panic_on_unknown_handle(fixture: Fixture) {
        ForwardTranslator::new().translate_object(&fixture.model, uuid::Uuid::new_v4());
    }
}
