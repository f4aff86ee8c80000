use approx::assert_relative_eq;
use methforge_core::{
    costing::{power_law_cost, record, CostIndex},
    economics::annualized_capital,
    physics::{DualIsotherm, ReactionModel},
};
use methforge_schemas::{
    component::{ComponentId, ComponentVector},
    equipment::{EquipmentClass, EquipmentCostTable},
    parameters::{Ambient, Economics},
    sorbent::{Sorbent, SorbentTable},
};

#[test]
fn full_methanation_conserves_carbon() {
    let inlet = ComponentVector::from_fn(|c| match c {
        ComponentId::Co2 => 26.0,
        ComponentId::H2 => 110.0,
        ComponentId::H2o => 3.0,
        _ => 0.0,
    });
    let outlet = ReactionModel::methanation(1.0).apply(&inlet);
    let carbon = |v: &ComponentVector| v[ComponentId::Co2] + v[ComponentId::Ch4];
    assert_relative_eq!(carbon(&outlet), carbon(&inlet), max_relative = 1e-12);
    assert_relative_eq!(outlet[ComponentId::Co2], 0.0);
    assert_relative_eq!(outlet[ComponentId::H2], 110.0 - 4.0 * 26.0);
    assert_relative_eq!(outlet[ComponentId::H2o], 3.0 + 2.0 * 26.0);
}

#[test]
fn electrolysis_conserves_hydrogen_atoms() {
    let inlet = ComponentVector::from_fn(|c| if c == ComponentId::H2o { 60.0 } else { 0.0 });
    let outlet = ReactionModel::electrolysis(0.9).apply(&inlet);
    assert_relative_eq!(outlet[ComponentId::H2] + outlet[ComponentId::H2o], 60.0, max_relative = 1e-12);
    assert_relative_eq!(outlet[ComponentId::O2], 0.5 * 54.0, max_relative = 1e-12);
}

#[test]
fn loading_rises_with_co2_pressure_for_every_sorbent() {
    let table = SorbentTable::reference();
    let ambient = Ambient::default();
    let pressures = [1e-6, 1e-5, 4e-5, 1e-4, 1e-3];
    for sorbent in Sorbent::ALL {
        let isotherm = DualIsotherm::new(&table.get(sorbent).unwrap().isotherm, ambient.gas_constant);
        let loadings: Vec<f64> = pressures
            .iter()
            .map(|&p| isotherm.capacity(ambient.temperature, p).unwrap())
            .collect();
        assert!(
            loadings.windows(2).all(|w| w[1] > w[0]),
            "{} is not monotone in pressure: {loadings:?}",
            sorbent.label()
        );
    }
}

#[test]
fn capital_charge_reference_value() {
    assert_relative_eq!(annualized_capital(0.08, 20.0), 0.10185220882315059, epsilon = 1e-9);
}

#[test]
fn reactor_cost_at_minimum_size() {
    let economics = Economics::default();
    let reactor = *record(&EquipmentCostTable::reference(), EquipmentClass::Reactor).unwrap();
    let ratio = CostIndex::from_2007(&economics).ratio();
    assert_relative_eq!(ratio, economics.cepci_2023 / economics.cepci_2007);
    let expected = (53000.0 + 28000.0 * 0.5_f64.powf(0.8)) * ratio * 16.0;
    assert_relative_eq!(power_law_cost(&reactor, 0.5, 16.0, ratio), expected, max_relative = 1e-12);
}
