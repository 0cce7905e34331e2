use idfkit::errors::FieldError;
use idfkit::model::ModelError;
use idfkit::schema::builtin::{
    SCHEDULE_TYPE_LIMITS, WATER_HEATER_MIXED, WATER_HEATER_SIZING, WATER_HEATER_STRATIFIED,
};
use idfkit::{
    FieldValue, ForwardTranslator, Handle, Model, Record, ReverseTranslator, SchemaRegistry,
    Workspace,
};
use pretty_assertions::assert_eq;
use rstest::*;

const PEAK_DRAW_FIELDS: &[&str] = &[
    "TimeStorageCanMeetPeakDraw",
    "TimeforTankRecovery",
    "NominalTankVolumeforAutosizingPlantConnections",
];

const OTHER_GROUP_FIELDS: &[&str] = &[
    "NumberofBedrooms",
    "NumberofBathrooms",
    "StorageCapacityperPerson",
    "RecoveryCapacityperPerson",
    "StorageCapacityperFloorArea",
    "RecoveryCapacityperFloorArea",
    "NumberofUnits",
    "StorageCapacityperUnit",
    "RecoveryCapacityPerUnit",
    "StorageCapacityperCollectorArea",
];

struct SizedTank {
    model: Model,
    tank: Handle,
    sizing: Handle,
}

/// A mixed tank sized by peak draw, with every field of every sizing group populated, and an
/// unrelated schedule type as a sibling.
#[fixture]
fn sized() -> SizedTank {
    let mut model = Model::new();
    let limits = model.add_object(SCHEDULE_TYPE_LIMITS).unwrap();
    model.set_name(limits, "Any Number").unwrap();
    let tank = model.add_object(WATER_HEATER_MIXED).unwrap();
    model.set_name(tank, "Main Tank").unwrap();
    let sizing = model.add_owned_object(WATER_HEATER_SIZING, tank).unwrap();

    let object = model.get_object_mut(sizing).unwrap();
    object.set("DesignMode", "PeakDraw").unwrap();
    object.set("TimeStorageCanMeetPeakDraw", 0.538503).unwrap();
    object.set("TimeforTankRecovery", 0.0).unwrap();
    object.set("NominalTankVolumeforAutosizingPlantConnections", 1.0).unwrap();
    object.set("NumberofBedrooms", 3).unwrap();
    object.set("NumberofBathrooms", 2).unwrap();
    object.set("StorageCapacityperPerson", 0.0378).unwrap();
    object.set("RecoveryCapacityperPerson", 0.0076).unwrap();
    object.set("StorageCapacityperFloorArea", 0.0005).unwrap();
    object.set("RecoveryCapacityperFloorArea", 0.0001).unwrap();
    object.set("NumberofUnits", 4.0).unwrap();
    object.set("StorageCapacityperUnit", 0.1).unwrap();
    object.set("RecoveryCapacityPerUnit", 0.02).unwrap();
    object.set("StorageCapacityperCollectorArea", 0.075).unwrap();
    object.set("HeightAspectRatio", 3.0).unwrap();

    SizedTank {
        model,
        tank,
        sizing,
    }
}

fn set_design_mode(sized: &mut SizedTank, mode: &str) {
    sized
        .model
        .get_object_mut(sized.sizing)
        .unwrap()
        .set("DesignMode", mode)
        .unwrap();
}

fn reparse(workspace: &Workspace) -> Workspace {
    Workspace::parse(&workspace.to_idf_string(), &SchemaRegistry::builtin()).unwrap()
}

#[rstest]
fn should_emit_only_the_peak_draw_group_for_peak_draw_sizing(sized: SizedTank) {
    let mut translator = ForwardTranslator::new();
    let workspace = translator.translate_model(&sized.model);

    assert!(translator.errors().is_empty());
    let sizings = workspace.objects_by_type(WATER_HEATER_SIZING);
    assert_eq!(sizings.len(), 1);
    let record = sizings[0];

    assert_eq!(record.owner_name(), Some("Main Tank"));
    assert_eq!(record.get_double("TimeStorageCanMeetPeakDraw"), Some(0.538503));
    assert_eq!(record.get_double("TimeforTankRecovery"), Some(0.0));
    assert_eq!(
        record.get_double("NominalTankVolumeforAutosizingPlantConnections"),
        Some(1.0)
    );
    for field in OTHER_GROUP_FIELDS {
        assert!(!record.is_set(field), "{field} should not be emitted");
    }
    assert_eq!(record.get_double("HeightAspectRatio"), Some(3.0));
}

#[rstest]
#[case("PeakDraw")]
#[case("ResidentialHUD-FHAMinimum")]
#[case("PerPerson")]
#[case("PerFloorArea")]
#[case("PerUnit")]
#[case("PerSolarCollectorArea")]
fn should_reproduce_every_emitted_field_after_a_round_trip(
    mut sized: SizedTank,
    #[case] mode: &str,
) {
    set_design_mode(&mut sized, mode);

    let mut forward = ForwardTranslator::new();
    let workspace = reparse(&forward.translate_model(&sized.model));
    let mut reverse = ReverseTranslator::new();
    let model = reverse.translate_workspace(&workspace);

    assert!(forward.errors().is_empty());
    assert!(reverse.errors().is_empty());
    assert_eq!(model.len(), sized.model.len());

    let original = sized.model.get_object(sized.sizing).unwrap();
    let tank = model.find_by_name(WATER_HEATER_MIXED, "Main Tank").unwrap();
    let round_tripped = model.child_of_type(tank.handle(), WATER_HEATER_SIZING).unwrap();
    let emitted = forward.record_for(sized.sizing).unwrap();
    for (_, field, value) in emitted.set_fields() {
        if field.name() == "Name" || field.name() == "WaterHeaterName" {
            continue;
        }
        assert_eq!(original.get(field.name()), Some(value));
        assert_eq!(
            round_tripped.get(field.name()),
            Some(value),
            "{} differs after round trip",
            field.name()
        );
    }
    assert_eq!(round_tripped.get_string("DesignMode"), Some(mode));
}

#[rstest]
#[case("PeakDraw", "TimeStorageCanMeetPeakDraw")]
#[case("PeakDraw", "TimeforTankRecovery")]
#[case("ResidentialHUD-FHAMinimum", "NumberofBedrooms")]
#[case("ResidentialHUD-FHAMinimum", "NumberofBathrooms")]
#[case("PerPerson", "StorageCapacityperPerson")]
#[case("PerPerson", "RecoveryCapacityperPerson")]
#[case("PerFloorArea", "StorageCapacityperFloorArea")]
#[case("PerFloorArea", "RecoveryCapacityperFloorArea")]
#[case("PerUnit", "StorageCapacityperUnit")]
#[case("PerUnit", "RecoveryCapacityPerUnit")]
#[case("PerSolarCollectorArea", "StorageCapacityperCollectorArea")]
fn should_fail_only_the_object_missing_a_required_group_field(
    mut sized: SizedTank,
    #[case] mode: &str,
    #[case] field: &str,
) {
    set_design_mode(&mut sized, mode);
    sized
        .model
        .get_object_mut(sized.sizing)
        .unwrap()
        .reset(field)
        .unwrap();

    let mut translator = ForwardTranslator::new();
    let workspace = translator.translate_model(&sized.model);

    assert_eq!(translator.errors().len(), 1);
    assert!(translator.errors()[0]
        .message
        .contains(&format!("is missing required field '{field}' for '{mode}'")));
    assert!(workspace.objects_by_type(WATER_HEATER_SIZING).is_empty());
    assert!(translator.record_for(sized.sizing).is_none());
    assert!(translator.record_for(sized.tank).is_some());
    assert_eq!(workspace.objects_by_type(SCHEDULE_TYPE_LIMITS).len(), 1);
}

#[rstest]
#[case("PerPerson")]
#[case("PerUnit")]
fn should_ignore_inactive_groups(mut sized: SizedTank, #[case] mode: &str) {
    set_design_mode(&mut sized, mode);
    for field in PEAK_DRAW_FIELDS {
        sized
            .model
            .get_object_mut(sized.sizing)
            .unwrap()
            .reset(field)
            .unwrap();
    }

    let mut translator = ForwardTranslator::new();
    let workspace = reparse(&translator.translate_model(&sized.model));

    assert!(translator.errors().is_empty());
    let record = workspace.objects_by_type(WATER_HEATER_SIZING)[0];
    for field in PEAK_DRAW_FIELDS {
        assert_eq!(record.get_double(field), None);
    }
    assert_eq!(record.get_int("NumberofBedrooms"), None);
}

#[rstest]
#[case("PeakDraw")]
#[case("PerFloorArea")]
#[case("PerSolarCollectorArea")]
fn should_pass_through_ungrouped_fields_whatever_the_mode(
    mut sized: SizedTank,
    #[case] mode: &str,
) {
    set_design_mode(&mut sized, mode);
    let mut translator = ForwardTranslator::new();
    translator.translate_model(&sized.model);
    assert_eq!(
        translator
            .record_for(sized.sizing)
            .unwrap()
            .get("HeightAspectRatio"),
        Some(&FieldValue::Real(3.0))
    );

    sized
        .model
        .get_object_mut(sized.sizing)
        .unwrap()
        .reset("HeightAspectRatio")
        .unwrap();
    translator.translate_model(&sized.model);
    assert!(translator.errors().is_empty());
    assert!(!translator
        .record_for(sized.sizing)
        .unwrap()
        .is_set("HeightAspectRatio"));
}

#[rstest]
fn should_read_discriminator_by_display_name() {
    let workspace = Workspace::parse(
        "DesignSpecification:OutdoorAir, Lobby, Flow per Floor Area, , 0.0003;",
        &SchemaRegistry::builtin(),
    )
    .unwrap();
    let mut reverse = ReverseTranslator::new();
    let model = reverse.translate_workspace(&workspace);
    let mut forward = ForwardTranslator::new();
    let workspace = forward.translate_model(&model);

    let record = &workspace.records()[0];
    assert_eq!(record.get_string("OutdoorAirMethod"), Some("Flow/Area"));
    assert_eq!(record.get_double("OutdoorAirFlowperZoneFloorArea"), Some(0.0003));
    assert!(!record.is_set("OutdoorAirFlowperPerson"));
}

#[rstest]
fn should_keep_the_owner_of_a_sizing_when_tanks_of_two_types_want_one_name() {
    let mut model = Model::new();
    let mixed = model.add_object(WATER_HEATER_MIXED).unwrap();
    model.set_name(mixed, "Tank").unwrap();
    let stratified = model.add_object(WATER_HEATER_STRATIFIED).unwrap();
    assert_eq!(model.set_name(stratified, "Tank").unwrap(), "Tank 1");
    let sizing = model.add_owned_object(WATER_HEATER_SIZING, stratified).unwrap();
    let object = model.get_object_mut(sizing).unwrap();
    object.set("TimeStorageCanMeetPeakDraw", 0.5).unwrap();
    object.set("TimeforTankRecovery", 1.0).unwrap();

    let mut forward = ForwardTranslator::new();
    let workspace = reparse(&forward.translate_model(&model));
    let mut reverse = ReverseTranslator::new();
    let round_tripped = reverse.translate_workspace(&workspace);

    assert!(forward.errors().is_empty());
    assert!(reverse.errors().is_empty());
    let tank = round_tripped
        .find_by_name(WATER_HEATER_STRATIFIED, "Tank 1")
        .unwrap();
    assert!(round_tripped
        .child_of_type(tank.handle(), WATER_HEATER_SIZING)
        .is_some());
    let mixed = round_tripped.find_by_name(WATER_HEATER_MIXED, "Tank").unwrap();
    assert!(round_tripped
        .child_of_type(mixed.handle(), WATER_HEATER_SIZING)
        .is_none());
}

#[rstest]
fn should_refuse_an_owner_name_shared_by_tanks_of_two_types() {
    let workspace = Workspace::parse(
        "WaterHeater:Mixed, Tank;
         WaterHeater:Stratified, Tank;
         WaterHeater:Sizing, Sizing, Tank, PeakDraw, 0.5, 1.0;",
        &SchemaRegistry::builtin(),
    )
    .unwrap();
    let mut reverse = ReverseTranslator::new();
    let model = reverse.translate_workspace(&workspace);

    assert_eq!(model.objects_by_type(WATER_HEATER_SIZING).len(), 0);
    assert_eq!(reverse.errors().len(), 1);
    assert!(reverse.errors()[0]
        .message
        .contains("'Tank' names more than one object"));
}

#[rstest]
fn should_drop_the_sizing_of_a_tank_that_fails_validation(sized: SizedTank) {
    let mut model = sized.model;
    model
        .get_object_mut(sized.tank)
        .unwrap()
        .reset("HeaterFuelType")
        .unwrap();

    let mut translator = ForwardTranslator::new();
    let workspace = translator.translate_model(&model);

    assert_eq!(translator.errors().len(), 1);
    assert!(translator.errors()[0]
        .message
        .contains("is missing required field 'HeaterFuelType'"));
    assert_eq!(translator.warnings().len(), 1);
    assert!(translator.warnings()[0]
        .message
        .contains("because its owner 'Main Tank' could not be translated"));
    assert!(workspace.objects_by_type(WATER_HEATER_MIXED).is_empty());
    assert!(workspace.objects_by_type(WATER_HEATER_SIZING).is_empty());
    assert!(translator.record_for(sized.sizing).is_none());
    assert_eq!(workspace.objects_by_type(SCHEDULE_TYPE_LIMITS).len(), 1);
}

#[rstest]
#[case("Main Tank, North")]
#[case("Main Tank; North")]
#[case("Main Tank ! North")]
#[case(" Main Tank")]
fn should_keep_names_that_text_records_could_not_hold_out_of_the_model(
    mut sized: SizedTank,
    #[case] name: &str,
) {
    assert!(matches!(
        sized.model.set_name(sized.tank, name),
        Err(ModelError::Field(FieldError::TypeMismatch { .. }))
    ));
    let mut record = Record::new(
        SchemaRegistry::builtin()
            .schema_for(WATER_HEATER_MIXED)
            .unwrap(),
    );
    assert!(matches!(
        record.set("Name", name),
        Err(FieldError::TypeMismatch { .. })
    ));

    let mut translator = ForwardTranslator::new();
    let workspace = reparse(&translator.translate_model(&sized.model));
    assert_eq!(
        workspace.objects_by_type(WATER_HEATER_MIXED)[0].name(),
        Some("Main Tank")
    );
    assert_eq!(
        workspace.objects_by_type(WATER_HEATER_SIZING)[0].owner_name(),
        Some("Main Tank")
    );
}
