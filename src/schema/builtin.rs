//! Declarative schemas for the object types shipped with the crate. Each type is a field table
//! only; translation behaviour comes entirely from the generic engine.

use super::{FieldSpec, ObjectSchema, SchemaRegistry};

pub const WATER_HEATER_MIXED: &str = "WaterHeater:Mixed";
pub const WATER_HEATER_STRATIFIED: &str = "WaterHeater:Stratified";
pub const WATER_HEATER_SIZING: &str = "WaterHeater:Sizing";
pub const DESIGN_SPECIFICATION_OUTDOOR_AIR: &str = "DesignSpecification:OutdoorAir";
pub const SCHEDULE_TYPE_LIMITS: &str = "ScheduleTypeLimits";

const WATER_HEATERS: &[&str] = &[WATER_HEATER_MIXED, WATER_HEATER_STRATIFIED];

const FUEL_TYPES: &[&str] = &[
    "Electricity",
    "NaturalGas",
    "Propane",
    "FuelOilNo1",
    "FuelOilNo2",
    "Diesel",
    "Gasoline",
    "Coal",
    "OtherFuel1",
    "OtherFuel2",
    "Steam",
    "DistrictHeating",
];

pub(crate) fn registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with(water_heater_mixed())
        .with(water_heater_stratified())
        .with(water_heater_sizing())
        .with(design_specification_outdoor_air())
        .with(schedule_type_limits())
}

pub fn water_heater_mixed() -> ObjectSchema {
    ObjectSchema::builder(WATER_HEATER_MIXED)
        .field(FieldSpec::string("Name").required())
        .field(
            FieldSpec::real("TankVolume")
                .with_units("m3")
                .with_default(0.3785),
        )
        .field(
            FieldSpec::real("SetpointTemperature")
                .with_units("C")
                .with_default(60.),
        )
        .field(
            FieldSpec::real("DeadbandTemperatureDifference")
                .with_units("deltaC")
                .with_default(0.),
        )
        .field(FieldSpec::real("MaximumTemperatureLimit").with_units("C"))
        .field(
            FieldSpec::choice("HeaterControlType", &["Cycle", "Modulate"]).with_default("Cycle"),
        )
        .field(FieldSpec::real("HeaterMaximumCapacity").with_units("W"))
        .field(FieldSpec::choice("HeaterFuelType", FUEL_TYPES).required())
        .field(
            FieldSpec::real("HeaterThermalEfficiency")
                .with_units("dimensionless")
                .with_default(0.8),
        )
        .name_field("Name")
        .initial_value("TankVolume", 0.3785)
        .initial_value("SetpointTemperature", 60.)
        .initial_value("HeaterMaximumCapacity", 845000.)
        .initial_value("HeaterFuelType", "NaturalGas")
        .build()
}

pub fn water_heater_stratified() -> ObjectSchema {
    ObjectSchema::builder(WATER_HEATER_STRATIFIED)
        .field(FieldSpec::string("Name").required())
        .field(FieldSpec::string("EndUseSubcategory").with_default("General"))
        .field(FieldSpec::real("TankVolume").with_units("m3").required())
        .field(FieldSpec::real("TankHeight").with_units("m").required())
        .field(
            FieldSpec::choice(
                "TankShape",
                &["VerticalCylinder", "HorizontalCylinder", "Other"],
            )
            .with_default("VerticalCylinder"),
        )
        .field(FieldSpec::real("TankPerimeter").with_units("m"))
        .field(FieldSpec::choice("HeaterFuelType", FUEL_TYPES).required())
        .field(FieldSpec::integer("NumberofNodes").with_default(6))
        .name_field("Name")
        .initial_value("TankVolume", 0.1893)
        .initial_value("TankHeight", 1.4)
        .initial_value("HeaterFuelType", "Electricity")
        .build()
}

pub fn water_heater_sizing() -> ObjectSchema {
    ObjectSchema::builder(WATER_HEATER_SIZING)
        .field(FieldSpec::string("Name"))
        .field(FieldSpec::object_reference("WaterHeaterName", WATER_HEATERS).required())
        .field(
            FieldSpec::choice(
                "DesignMode",
                &[
                    "PeakDraw",
                    "ResidentialHUD-FHAMinimum",
                    "PerPerson",
                    "PerFloorArea",
                    "PerUnit",
                    "PerSolarCollectorArea",
                ],
            )
            .with_default("PeakDraw"),
        )
        .field(
            FieldSpec::real("TimeStorageCanMeetPeakDraw")
                .with_units("hr")
                .in_group("PeakDraw", true),
        )
        .field(
            FieldSpec::real("TimeforTankRecovery")
                .with_units("hr")
                .in_group("PeakDraw", true),
        )
        .field(
            FieldSpec::real("NominalTankVolumeforAutosizingPlantConnections")
                .with_units("m3")
                .in_group("PeakDraw", false),
        )
        .field(FieldSpec::integer("NumberofBedrooms").in_group("ResidentialHUD-FHAMinimum", true))
        .field(FieldSpec::integer("NumberofBathrooms").in_group("ResidentialHUD-FHAMinimum", true))
        .field(
            FieldSpec::real("StorageCapacityperPerson")
                .with_units("m3/person")
                .in_group("PerPerson", true),
        )
        .field(
            FieldSpec::real("RecoveryCapacityperPerson")
                .with_units("m3/hr-person")
                .in_group("PerPerson", true),
        )
        .field(
            FieldSpec::real("StorageCapacityperFloorArea")
                .with_units("m3/m2")
                .in_group("PerFloorArea", true),
        )
        .field(
            FieldSpec::real("RecoveryCapacityperFloorArea")
                .with_units("m3/hr-m2")
                .in_group("PerFloorArea", true),
        )
        .field(FieldSpec::real("NumberofUnits").in_group("PerUnit", false))
        .field(
            FieldSpec::real("StorageCapacityperUnit")
                .with_units("m3")
                .in_group("PerUnit", true),
        )
        .field(
            FieldSpec::real("RecoveryCapacityPerUnit")
                .with_units("m3/hr")
                .in_group("PerUnit", true),
        )
        .field(
            FieldSpec::real("StorageCapacityperCollectorArea")
                .with_units("m3/m2")
                .in_group("PerSolarCollectorArea", true),
        )
        .field(FieldSpec::real("HeightAspectRatio"))
        .name_field("Name")
        .owner("WaterHeaterName", true)
        .discriminator(
            "DesignMode",
            &[
                "PeakDraw",
                "ResidentialHUD-FHAMinimum",
                "PerPerson",
                "PerFloorArea",
                "PerUnit",
                "PerSolarCollectorArea",
            ],
        )
        .initial_value("DesignMode", "PeakDraw")
        .initial_value("TimeStorageCanMeetPeakDraw", 0.538503)
        .initial_value("TimeforTankRecovery", 0.)
        .initial_value("NominalTankVolumeforAutosizingPlantConnections", 1.)
        .build()
}

pub fn design_specification_outdoor_air() -> ObjectSchema {
    ObjectSchema::builder(DESIGN_SPECIFICATION_OUTDOOR_AIR)
        .field(FieldSpec::string("Name").required())
        .field(
            FieldSpec::choice_with_display_names(
                "OutdoorAirMethod",
                &[
                    ("Flow/Person", "Flow per Person"),
                    ("Flow/Area", "Flow per Floor Area"),
                    ("Flow/Zone", "Flow per Zone"),
                    ("AirChanges/Hour", "Air Changes per Hour"),
                    ("Sum", "Sum"),
                    ("Maximum", "Maximum"),
                ],
            )
            .with_default("Flow/Person"),
        )
        .field(
            FieldSpec::real("OutdoorAirFlowperPerson")
                .with_units("m3/s-person")
                .with_default(0.00944)
                .in_group("Flow/Person", true)
                .in_group("Sum", false)
                .in_group("Maximum", false),
        )
        .field(
            FieldSpec::real("OutdoorAirFlowperZoneFloorArea")
                .with_units("m3/s-m2")
                .with_default(0.)
                .in_group("Flow/Area", true)
                .in_group("Sum", false)
                .in_group("Maximum", false),
        )
        .field(
            FieldSpec::real("OutdoorAirFlowperZone")
                .with_units("m3/s")
                .with_default(0.)
                .in_group("Flow/Zone", true)
                .in_group("Sum", false)
                .in_group("Maximum", false),
        )
        .field(
            FieldSpec::real("OutdoorAirFlowAirChangesperHour")
                .with_units("1/hr")
                .with_default(0.)
                .in_group("AirChanges/Hour", true)
                .in_group("Sum", false)
                .in_group("Maximum", false),
        )
        .field(FieldSpec::string("OutdoorAirScheduleName"))
        .name_field("Name")
        .discriminator(
            "OutdoorAirMethod",
            &[
                "Flow/Person",
                "Flow/Area",
                "Flow/Zone",
                "AirChanges/Hour",
                "Sum",
                "Maximum",
            ],
        )
        .initial_value("OutdoorAirMethod", "Flow/Person")
        .initial_value("OutdoorAirFlowperPerson", 0.0)
        .build()
}

pub fn schedule_type_limits() -> ObjectSchema {
    ObjectSchema::builder(SCHEDULE_TYPE_LIMITS)
        .field(FieldSpec::string("Name").required())
        .field(FieldSpec::real("LowerLimitValue"))
        .field(FieldSpec::real("UpperLimitValue"))
        .field(FieldSpec::choice("NumericType", &["Continuous", "Discrete"]))
        .field(
            FieldSpec::choice(
                "UnitType",
                &[
                    "Dimensionless",
                    "Temperature",
                    "DeltaTemperature",
                    "PrecipitationRate",
                    "Angle",
                    "ConvectionCoefficient",
                    "ActivityLevel",
                    "Velocity",
                    "Capacity",
                    "Power",
                    "Availability",
                    "Percent",
                    "Control",
                    "Mode",
                ],
            )
            .with_default("Dimensionless"),
        )
        .name_field("Name")
        .build()
}
