//! Saturated-steam data, steam pricing and log-mean temperature differences.

pub mod steam_table;

pub use steam_table::{SteamProperties, SteamTable, TabulatedSteamTable};

use crate::error::MethforgeError;
use crate::model::Expr;
use methforge_schemas::parameters::{Economics, SteamSystem};
use methforge_schemas::technology::SteamLevel;
use serde::Serialize;

/// Value of exported steam in $/kmol per pressure level.
///
/// High-pressure steam is priced at the fuel it displaces in a boiler; each
/// lower level gives up the turbine work a letdown to it would have produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteamPrices {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl SteamPrices {
    /// # Errors
    ///
    /// Returns `MethforgeError::SteamTable` if a level's saturation temperature is
    /// outside the table.
    pub fn from_table(table: &dyn SteamTable, steam: &SteamSystem, economics: &Economics) -> Result<Self, MethforgeError> {
        let lp = table.properties(steam.saturation_temperature(SteamLevel::Low))?;
        let mp = table.properties(steam.saturation_temperature(SteamLevel::Medium))?;
        let hp = table.properties(steam.saturation_temperature(SteamLevel::High))?;
        let work = economics.turbine_efficiency * economics.electricity_price_per_kj();

        let high = economics.fuel_price * hp.latent_heat / economics.boiler_efficiency + economics.boiler_feed_water_price;
        let medium = high - (hp.vapor_enthalpy - mp.vapor_enthalpy) * work;
        let low = medium - (mp.vapor_enthalpy - lp.vapor_enthalpy) * work;
        log::info!("Steam prices ($/kmol): LP {low:.4}, MP {medium:.4}, HP {high:.4}");
        Ok(Self { low, medium, high })
    }

    pub fn price(&self, level: SteamLevel) -> f64 {
        match level {
            SteamLevel::Low => self.low,
            SteamLevel::Medium => self.medium,
            SteamLevel::High => self.high,
        }
    }
}

/// `(dt1 − dt2)/ln(dt1/dt2)`
pub fn lmtd(dt1: f64, dt2: f64) -> f64 {
    if (dt1 - dt2).abs() < 1e-12 {
        return dt1;
    }
    (dt1 - dt2) / (dt1 / dt2).ln()
}

/// `(dt1 − dt2)/(ln dt1 − ln dt2 + ε)`
pub fn lmtd_expr(dt1: Expr, dt2: Expr, epsilon: f64) -> Expr {
    (dt1.clone() - dt2.clone()) / (dt1.ln() - dt2.ln() + epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VarId;
    use approx::assert_relative_eq;

    #[test]
    fn steam_prices_decrease_with_pressure_level() {
        let table = TabulatedSteamTable::reference().unwrap();
        let prices = SteamPrices::from_table(&table, &SteamSystem::default(), &Economics::default()).unwrap();
        let economics = Economics::default();
        let hp_latent = 1715.3 * 18.01528;
        assert_relative_eq!(prices.high, economics.fuel_price * hp_latent / 0.8, max_relative = 1e-12);
        assert!(prices.low < prices.medium && prices.medium < prices.high);
        assert_eq!(prices.price(SteamLevel::Medium), prices.medium);
    }

    #[test]
    fn log_mean_matches_closed_form() {
        assert_relative_eq!(lmtd(200.0, 50.0), 150.0 / 4.0_f64.ln(), max_relative = 1e-12);
        assert_relative_eq!(lmtd(30.0, 30.0), 30.0);
        let (a, b) = (VarId::new(0), VarId::new(1));
        let e = lmtd_expr(Expr::Var(a), Expr::Var(b), 1e-9);
        assert_relative_eq!(e.eval(&[200.0, 50.0]), lmtd(200.0, 50.0), max_relative = 1e-6);
    }
}
