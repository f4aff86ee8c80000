use methforge_core::{
    network::StreamId,
    plant::{PlantModel, PlantModelBuilder},
    solve::{PlantSolution, SolveStatus},
};
use methforge_schemas::{component::ComponentId, fan::HeadBand, technology::AirCoolerZone};

fn synthetic_point(plant: &PlantModel) -> Vec<f64> {
    let mut values = vec![0.0; plant.model.num_variables()];
    for c in ComponentId::ALL {
        let feed = plant.config.feed[c];
        values[plant.network.var(StreamId::AIR_FEED, c).index()] = feed;
        values[plant.network.var(StreamId::FAN3_INLET, c).index()] = feed;
    }
    for (_, binaries) in plant.selections.open_families() {
        values[binaries[0].index()] = 1.0;
    }
    values
}

#[test]
fn consistent_point_passes_every_check() {
    let plant = PlantModelBuilder::new().build().unwrap();
    let solution = PlantSolution::from_values(&plant, SolveStatus::Optimal, synthetic_point(&plant)).unwrap();
    assert!(solution.check_invariants(1e-9).is_empty());
    assert_eq!(solution.selected::<HeadBand>(), Some(HeadBand::First));
    assert_eq!(solution.selected::<AirCoolerZone>(), Some(AirCoolerZone::Z1));
    assert_eq!(solution.flows().dim(), (StreamId::COUNT, ComponentId::COUNT));
    assert_eq!(solution.flow(StreamId::FAN3_INLET, ComponentId::N2), 51226.0);
}

#[test]
fn negative_flow_is_flagged() {
    let plant = PlantModelBuilder::new().build().unwrap();
    let mut values = synthetic_point(&plant);
    values[plant.network.var(StreamId::PRODUCT, ComponentId::H2).index()] = -1.0;
    let solution = PlantSolution::from_values(&plant, SolveStatus::Optimal, values).unwrap();
    let names: Vec<String> = solution.check_invariants(1e-9).into_iter().map(|v| v.name).collect();
    assert_eq!(names, vec!["x[7,H2] >= 0".to_string()]);
}

#[test]
fn two_selected_options_break_exactly_one() {
    let plant = PlantModelBuilder::new().build().unwrap();
    let mut values = synthetic_point(&plant);
    let (_, zones) = plant
        .selections
        .open_families()
        .into_iter()
        .find(|(family, _)| *family == "air_cooler_zone")
        .unwrap();
    values[zones[1].index()] = 1.0;
    let solution = PlantSolution::from_values(&plant, SolveStatus::Optimal, values).unwrap();
    let violations = solution.check_invariants(1e-9);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].name, "select.air_cooler_zone");
}

#[test]
fn splitter_imbalance_is_flagged() {
    let plant = PlantModelBuilder::new().build().unwrap();
    let mut values = synthetic_point(&plant);
    values[plant.network.var(StreamId::FAN3_INLET, ComponentId::Co2).index()] = 20.0;
    let solution = PlantSolution::from_values(&plant, SolveStatus::Optimal, values).unwrap();
    let violations = solution.check_invariants(1e-9);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].name, "air_split.balance[CO2]");
    assert!((violations[0].amount - 6.0).abs() < 1e-12);
}

#[test]
fn wrong_length_is_rejected() {
    let plant = PlantModelBuilder::new().build().unwrap();
    assert!(PlantSolution::from_values(&plant, SolveStatus::Optimal, vec![0.0; 4]).is_err());
}
