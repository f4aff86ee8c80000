//! Toth equilibrium isotherms, first-order uptake kinetics, monolith pressure
//! drop and polytropic compression power.
//!
//! Every relation comes in a numeric form (used by tests and reports) and an
//! expression form (used by the unit blocks when the inputs are decision variables).

use crate::error::MethforgeError;
use crate::model::Expr;
use methforge_schemas::parameters::{Ambient, Tvsa};
use methforge_schemas::sorbent::{SorbentIsotherm, TothParameters};

/// Toth loading in mol/kg at temperature `t` (K) and CO2 partial pressure `p` (MPa).
///
/// # Errors
///
/// Returns `MethforgeError::NumericalDomain` for a non-positive temperature, a
/// negative pressure, or parameters that drive the heterogeneity exponent to zero.
pub fn toth(params: &TothParameters, gas_constant: f64, t: f64, p: f64) -> Result<f64, MethforgeError> {
    if params.is_inert() {
        return Ok(0.0);
    }
    if t <= 0.0 || p < 0.0 {
        return Err(MethforgeError::NumericalDomain(format!(
            "Toth isotherm evaluated at T = {t} K, p = {p} MPa"
        )));
    }
    let shift = 1.0 - params.reference_temperature / t;
    let qs = params.saturation_capacity * (params.saturation_slope * shift).exp();
    let b = params.affinity
        * (params.heat_of_adsorption / (gas_constant * params.reference_temperature) * -shift).exp();
    let exponent = params.heterogeneity + params.heterogeneity_slope * shift;
    if exponent.abs() < f64::EPSILON {
        return Err(MethforgeError::NumericalDomain(format!(
            "Toth heterogeneity vanishes at T = {t} K"
        )));
    }
    Ok(qs * b * p / (1.0 + (b * p).powf(exponent)).powf(1.0 / exponent))
}

/// Expression form of [`toth`] for a variable temperature and pressure.
pub fn toth_expr(params: &TothParameters, gas_constant: f64, t: Expr, p: Expr) -> Expr {
    if params.is_inert() {
        return Expr::zero();
    }
    let shift = 1.0 - params.reference_temperature / t;
    let qs = params.saturation_capacity * (params.saturation_slope * shift.clone()).exp();
    let b = params.affinity
        * (-(params.heat_of_adsorption / (gas_constant * params.reference_temperature)) * shift.clone()).exp();
    let exponent = params.heterogeneity + params.heterogeneity_slope * shift;
    let bp = b * p;
    qs * bp.clone() / (1.0 + bp.powf(exponent.clone())).powf(1.0 / exponent)
}

/// Chemisorption plus physisorption.
#[derive(Debug, Clone, Copy)]
pub struct DualIsotherm<'a> {
    pub isotherm: &'a SorbentIsotherm,
    pub gas_constant: f64,
}

impl<'a> DualIsotherm<'a> {
    pub fn new(isotherm: &'a SorbentIsotherm, gas_constant: f64) -> Self {
        Self { isotherm, gas_constant }
    }

    /// Equilibrium loading in kmol/kg.
    ///
    /// # Errors
    ///
    /// Propagates `MethforgeError::NumericalDomain` from either contribution.
    pub fn capacity(&self, t: f64, p: f64) -> Result<f64, MethforgeError> {
        let chemical = toth(&self.isotherm.chemical, self.gas_constant, t, p)?;
        let physical = toth(&self.isotherm.physical, self.gas_constant, t, p)?;
        Ok((chemical + physical) / 1000.0)
    }

    /// Equilibrium loading in kmol/kg.
    pub fn capacity_expr(&self, t: Expr, p: Expr) -> Expr {
        let chemical = toth_expr(&self.isotherm.chemical, self.gas_constant, t.clone(), p.clone());
        let physical = toth_expr(&self.isotherm.physical, self.gas_constant, t, p);
        (chemical + physical) / 1000.0
    }

    /// Loading at ambient air conditions, kmol/kg.
    ///
    /// # Errors
    ///
    /// Propagates `MethforgeError::NumericalDomain`.
    pub fn adsorption_capacity(&self, ambient: &Ambient) -> Result<f64, MethforgeError> {
        self.capacity(ambient.temperature, ambient.co2_partial_pressure)
    }

    /// Loading left on the bed after regeneration at `desorption_temperature` (°C)
    /// under `vacuum_pressure` (MPa), kmol/kg.
    ///
    /// # Errors
    ///
    /// Propagates `MethforgeError::NumericalDomain`.
    pub fn desorption_capacity(
        &self,
        ambient: &Ambient,
        desorption_temperature: f64,
        vacuum_pressure: f64,
    ) -> Result<f64, MethforgeError> {
        self.capacity(
            desorption_temperature + 273.0,
            vacuum_pressure * ambient.co2_pressure_factor,
        )
    }
}

/// `q_eq·(1 − e^{−k·t})`
pub fn uptake(equilibrium: f64, rate: f64, time: f64) -> f64 {
    equilibrium * (1.0 - (-rate * time).exp())
}

pub fn uptake_expr(equilibrium: impl Into<Expr>, rate: f64, time: impl Into<Expr>) -> Expr {
    let equilibrium = equilibrium.into();
    equilibrium.clone() - equilibrium * (-rate * time.into()).exp()
}

/// kmol/h captured by `mass` kg loaded to `loading` kmol/kg over `time` s.
pub fn capture_rate(loading: f64, mass: f64, time: f64) -> f64 {
    loading * mass / (time / 3600.0)
}

/// Laminar flow through monolith channels (Hagen–Poiseuille).
#[derive(Debug, Clone, Copy)]
pub struct MonolithBed {
    /// m
    pub channel_radius: f64,
    /// Pa·s
    pub viscosity: f64,
}

impl MonolithBed {
    /// Pa, for bed length in m and superficial velocity in m/s.
    pub fn pressure_drop(&self, length: f64, velocity: f64) -> f64 {
        8.0 * length * self.viscosity * velocity / self.channel_radius.powi(2)
    }

    pub fn pressure_drop_expr(&self, length: impl Into<Expr>, velocity: impl Into<Expr>) -> Expr {
        (8.0 * self.viscosity / self.channel_radius.powi(2)) * length.into() * velocity.into()
    }
}

/// Polytropic CO2 machine: a vacuum pump or compressor.
#[derive(Debug, Clone, Copy)]
pub struct PolytropicMachine {
    pub efficiency: f64,
    pub compressibility: f64,
    pub gas_constant: f64,
    pub exponent: f64,
}

impl PolytropicMachine {
    pub fn co2(tvsa: &Tvsa, ambient: &Ambient) -> Self {
        Self {
            efficiency: tvsa.polytropic_efficiency,
            compressibility: ambient.compressibility,
            gas_constant: ambient.gas_constant,
            exponent: tvsa.polytropic_exponent(),
        }
    }

    fn head_factor(&self) -> f64 {
        let n = self.exponent;
        self.compressibility * self.gas_constant * n / (n - 1.0) / self.efficiency
    }

    /// kW per machine at suction temperature `t` (K) and pressure ratio `ratio`,
    /// for `molar_flow` kmol/h shared by `count` machines.
    pub fn power(&self, t: f64, ratio: f64, molar_flow: f64, count: f64) -> f64 {
        let n = self.exponent;
        self.head_factor() * t * (ratio.powf((n - 1.0) / n) - 1.0) * molar_flow / (3600.0 * count)
    }

    pub fn power_expr(&self, t: impl Into<Expr>, ratio: impl Into<Expr>, molar_flow: impl Into<Expr>, count: impl Into<Expr>) -> Expr {
        let n = self.exponent;
        let lift = ratio.into().powf((n - 1.0) / n) - 1.0;
        self.head_factor() * t.into() * lift * molar_flow.into() / (3600.0 * count.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VarId;
    use approx::assert_relative_eq;
    use methforge_schemas::sorbent::{Sorbent, SorbentTable};

    #[test]
    fn regeneration_leaves_less_than_ambient_loading() {
        let ambient = Ambient::default();
        let table = SorbentTable::reference();
        for sorbent in Sorbent::ALL {
            let record = table.get(sorbent).unwrap();
            let iso = DualIsotherm::new(&record.isotherm, ambient.gas_constant);
            let q_ads = iso.adsorption_capacity(&ambient).unwrap();
            for (t_des, p_vac) in [(80.0, 0.09), (100.0, 0.05), (120.0, 0.005), (120.0, 0.09)] {
                let q_des = iso.desorption_capacity(&ambient, t_des, p_vac).unwrap();
                assert!(q_des < q_ads, "{}: {q_des} >= {q_ads} at {t_des} C", sorbent.label());
            }
        }
    }

    #[test]
    fn loading_rises_with_partial_pressure() {
        let ambient = Ambient::default();
        let table = SorbentTable::reference();
        for sorbent in Sorbent::ALL {
            let iso = DualIsotherm::new(&table.get(sorbent).unwrap().isotherm, ambient.gas_constant);
            let low = iso.capacity(293.0, 2e-5).unwrap();
            let high = iso.capacity(293.0, 4e-5).unwrap();
            assert!(low < high, "{}", sorbent.label());
        }
    }

    #[test]
    fn expression_isotherm_matches_numeric() {
        let table = SorbentTable::reference();
        let iso = DualIsotherm::new(&table.get(Sorbent::Mil101CrPei800).unwrap().isotherm, 8.314);
        let (t, p) = (VarId::new(0), VarId::new(1));
        let e = iso.capacity_expr(Expr::Var(t) + 273.0, p * 4e-4);
        let expected = iso.capacity(393.0, 0.09 * 4e-4).unwrap();
        assert_relative_eq!(e.eval(&[120.0, 0.09]), expected, max_relative = 1e-10);
    }

    #[test]
    fn inert_contribution_is_zero() {
        let table = SorbentTable::reference();
        let apdes = table.get(Sorbent::ApdesNfc).unwrap();
        assert_eq!(toth(&apdes.isotherm.physical, 8.314, 293.0, 4e-5).unwrap(), 0.0);
        assert!(matches!(
            toth(&apdes.isotherm.chemical, 8.314, 0.0, 4e-5),
            Err(MethforgeError::NumericalDomain(_))
        ));
    }

    #[test]
    fn uptake_approaches_equilibrium() {
        assert_relative_eq!(uptake(1.0, 0.01, 0.0), 0.0);
        assert!(uptake(1.0, 0.01, 1000.0) > 0.9999);
        let e = uptake_expr(2.0, 0.001, VarId::new(0));
        assert_relative_eq!(e.eval(&[1000.0]), uptake(2.0, 0.001, 1000.0), max_relative = 1e-12);
        assert_relative_eq!(capture_rate(1e-3, 3600.0, 1800.0), 7.2, max_relative = 1e-12);
    }

    #[test]
    fn hagen_poiseuille_drop() {
        let bed = MonolithBed {
            channel_radius: 0.00105,
            viscosity: 1.85e-5,
        };
        let dp = bed.pressure_drop(2.0, 1.0);
        assert_relative_eq!(dp, 8.0 * 2.0 * 1.85e-5 / 0.00105_f64.powi(2), max_relative = 1e-12);
        let e = bed.pressure_drop_expr(VarId::new(0), VarId::new(1));
        assert_relative_eq!(e.eval(&[2.0, 1.0]), dp, max_relative = 1e-12);
    }

    #[test]
    fn compression_power_scales_with_flow() {
        let machine = PolytropicMachine::co2(&Tvsa::default(), &Ambient::default());
        let one = machine.power(293.0, 10.0, 26.0, 1.0);
        assert!(one > 0.0);
        assert_relative_eq!(machine.power(293.0, 10.0, 26.0, 2.0), one / 2.0, max_relative = 1e-12);
        assert_relative_eq!(machine.power(293.0, 1.0, 26.0, 1.0), 0.0);
    }
}
