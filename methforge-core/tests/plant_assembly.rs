use methforge_core::{
    config::{DesignPins, PlantConfig},
    error::MethforgeError,
    model::{Domain, Sense},
    plant::PlantModelBuilder,
    selection::FurnacePolicy,
};
use methforge_schemas::{
    sorbent::Sorbent,
    tables::PropertyTables,
    technology::{AdsorptionTechnology, ElectrolyzerType},
};

#[test]
fn base_case_assembles_without_a_solver() {
    let plant = PlantModelBuilder::new().build().unwrap();
    let model = &plant.model;

    for name in [
        "x[7,CH4]",
        "dfm.reactor_count",
        "dfm.capture_rate.def",
        "fan.f3.flow_per_fan",
        "electrolyzer.SOEL.capex",
        "steam.boiler_area",
        "air_cooler.face_velocity",
        "separator.shell_weight",
        "economics.tac",
    ] {
        assert!(
            model.variable_id(name).is_some() || model.constraint(name).is_some(),
            "missing {name}"
        );
    }
    assert!(model.variable_id("tvsa.sorbent_mass").is_none());
    assert!(model.variable_id("furnace.capex").is_none());
    assert!(model.variable_id("y.furnace").is_none());
    assert_eq!(model.constraint("dfm.reactor_count.pin").map(|c| c.sense), Some(Sense::Eq));
    assert_eq!(model.constraint("zero[3,CO2]").map(|c| c.sense), Some(Sense::Eq));
    assert_eq!(model.constraint("air_split.gate[11,N2]").map(|c| c.sense), Some(Sense::Eq));
    assert!(model.constraint("air_split.gate[15,N2]").is_none());

    let binaries = model.variables().iter().filter(|v| v.domain == Domain::Binary).count();
    // Four head bands plus five cooler zones.
    assert_eq!(binaries, 9);
    assert!(plant.costs.entries().iter().any(|e| e.unit == "dfm"));
}

#[test]
fn open_superstructure_assembles() {
    let config = PlantConfig {
        pins: DesignPins::open(),
        ..PlantConfig::default()
    };
    let plant = PlantModelBuilder::new().with_config(config).build().unwrap();
    let model = &plant.model;
    assert!(model.variable_id("y.adsorption[TVSA]").is_some());
    assert!(model.variable_id("y.furnace").is_some());
    assert!(model.variable_id("tvsa.q_des[Lewatit-VPOC-106]").is_some());
    assert!(model.constraint("select.electrolyzer").is_some());
    assert!(model.constraint("steam.duty[HP].gate").is_some());
    assert_eq!(model.constraint("air_split.gate[15,N2]").map(|c| c.sense), Some(Sense::Le));
    let families = plant.selections.open_families().len();
    assert_eq!(families, 7);
}

#[test]
fn pinned_and_excluded_option_is_a_conflict() {
    let mut config = PlantConfig::default();
    config.pins.electrolyzer = Some(ElectrolyzerType::Ael);
    config.pins.exclusions.electrolyzer = vec![ElectrolyzerType::Ael];
    let err = PlantModelBuilder::new().with_config(config).build().unwrap_err();
    assert!(matches!(err, MethforgeError::SelectionConflict { family: "electrolyzer", .. }));
}

#[test]
fn tvsa_route_needs_every_sorbent_record() {
    let mut config = PlantConfig::default();
    config.pins.adsorption = Some(AdsorptionTechnology::Tvsa);
    config.pins.furnace = FurnacePolicy::On;
    let mut tables = PropertyTables::default();
    tables.sorbents.sorbents.remove(&Sorbent::ApdesNfc);
    let err = PlantModelBuilder::new()
        .with_config(config.clone())
        .with_properties(tables)
        .build()
        .unwrap_err();
    assert!(matches!(err, MethforgeError::MissingProperty { kind: "sorbent", .. }));

    let plant = PlantModelBuilder::new().with_config(config).build().unwrap();
    assert!(plant.model.variable_id("dfm.mass").is_none());
    assert!(plant.model.variable_id("furnace.capex").is_some());
}

#[test]
fn pin_outside_bounds_is_rejected() {
    let mut config = PlantConfig::default();
    config.pins.reactor_diameter = Some(6.0);
    let err = PlantModelBuilder::new().with_config(config).build().unwrap_err();
    assert!(matches!(err, MethforgeError::InvalidBounds { .. }));
}
