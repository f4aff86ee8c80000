use crate::error::MethforgeError;
use ndarray::Array1;
use ninterp::prelude::{Interp1DOwned, Interpolator};
use serde::Deserialize;
use std::path::Path;

/// kg per kmol of water.
const WATER_MOLAR_MASS: f64 = 18.01528;

/// Saturated-steam properties in kJ/kmol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteamProperties {
    pub latent_heat: f64,
    pub vapor_enthalpy: f64,
}

/// Source of saturated-steam data.
pub trait SteamTable {
    /// Properties at saturation temperature `t_sat` (°C).
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::SteamTable` outside the table's coverage.
    fn properties(&self, t_sat: f64) -> Result<SteamProperties, MethforgeError>;
}

/// One row of a steam-table CSV: `T_sat,h_fg,h_g` with enthalpies in kJ/kg.
#[derive(Debug, Clone, Copy, Deserialize)]
struct SteamRow {
    #[serde(rename = "T_sat")]
    t_sat: f64,
    h_fg: f64,
    h_g: f64,
}

/// Tabulated saturated steam: exact rows are returned as stored, temperatures
/// between rows are interpolated linearly, anything outside the range is an error.
pub struct TabulatedSteamTable {
    rows: Vec<SteamRow>,
    latent: Interp1DOwned<f64, ninterp::strategy::Linear>,
    vapor: Interp1DOwned<f64, ninterp::strategy::Linear>,
}

impl TabulatedSteamTable {
    /// Builds a table from `(T_sat °C, h_fg kJ/kg, h_g kJ/kg)` rows sorted by temperature.
    ///
    /// # Errors
    ///
    /// Returns `MethforgeError::SteamTable` if the rows are unsorted or too few to interpolate.
    pub fn from_rows(rows: &[(f64, f64, f64)]) -> Result<Self, MethforgeError> {
        let rows: Vec<SteamRow> = rows
            .iter()
            .map(|&(t_sat, h_fg, h_g)| SteamRow { t_sat, h_fg, h_g })
            .collect();
        Self::build(rows)
    }

    fn build(rows: Vec<SteamRow>) -> Result<Self, MethforgeError> {
        let x: Array1<f64> = rows.iter().map(|r| r.t_sat).collect();
        let h_fg: Array1<f64> = rows.iter().map(|r| r.h_fg * WATER_MOLAR_MASS).collect();
        let h_g: Array1<f64> = rows.iter().map(|r| r.h_g * WATER_MOLAR_MASS).collect();
        let interp = |f_x: Array1<f64>| {
            Interp1DOwned::new(
                x.clone(),
                f_x,
                ninterp::strategy::Linear,
                ninterp::interpolator::Extrapolate::Error,
            )
            .map_err(|e| MethforgeError::SteamTable(e.to_string()))
        };
        let latent = interp(h_fg)?;
        let vapor = interp(h_g)?;
        log::debug!(
            "Steam table ready: {} rows from {} to {} C",
            rows.len(),
            rows.first().map_or(f64::NAN, |r| r.t_sat),
            rows.last().map_or(f64::NAN, |r| r.t_sat)
        );
        Ok(Self { rows, latent, vapor })
    }

    /// Saturated water and steam, 100–300 °C (IAPWS-IF97).
    pub fn reference() -> Result<Self, MethforgeError> {
        Self::from_rows(&[
            (100.0, 2256.4, 2675.6),
            (120.0, 2202.1, 2705.9),
            (140.0, 2144.3, 2733.5),
            (150.0, 2113.8, 2745.9),
            (160.0, 2082.0, 2757.4),
            (180.0, 2014.2, 2777.2),
            (200.0, 1939.8, 2792.0),
            (220.0, 1857.4, 2801.0),
            (240.0, 1765.5, 2803.0),
            (250.0, 1715.3, 2801.0),
            (260.0, 1661.8, 2796.6),
            (280.0, 1543.2, 2779.9),
            (300.0, 1404.8, 2749.6),
        ])
    }

    /// Reads a `T_sat,h_fg,h_g` CSV file.
    ///
    /// # Errors
    ///
    /// Returns a `MethforgeError` if the file cannot be read or parsed, or the
    /// rows do not form a valid table.
    pub fn from_csv(path: &Path) -> Result<Self, MethforgeError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| MethforgeError::CsvError(path.display().to_string(), e))?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: SteamRow = record.map_err(|e| MethforgeError::CsvError(path.display().to_string(), e))?;
            rows.push(row);
        }
        log::info!("Loaded {} steam-table rows from {}", rows.len(), path.display());
        Self::build(rows)
    }
}

impl SteamTable for TabulatedSteamTable {
    fn properties(&self, t_sat: f64) -> Result<SteamProperties, MethforgeError> {
        if let Some(row) = self.rows.iter().find(|r| r.t_sat == t_sat) {
            return Ok(SteamProperties {
                latent_heat: row.h_fg * WATER_MOLAR_MASS,
                vapor_enthalpy: row.h_g * WATER_MOLAR_MASS,
            });
        }
        let lookup = |interp: &Interp1DOwned<f64, ninterp::strategy::Linear>| {
            interp
                .interpolate(&[t_sat])
                .map_err(|e| MethforgeError::SteamTable(format!("T_sat = {t_sat} C: {e}")))
        };
        Ok(SteamProperties {
            latent_heat: lookup(&self.latent)?,
            vapor_enthalpy: lookup(&self.vapor)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn exact_rows_are_returned_as_stored() {
        let table = TabulatedSteamTable::reference().unwrap();
        let lp = table.properties(150.0).unwrap();
        assert_relative_eq!(lp.latent_heat, 2113.8 * WATER_MOLAR_MASS, max_relative = 1e-12);
        assert_relative_eq!(lp.vapor_enthalpy, 2745.9 * WATER_MOLAR_MASS, max_relative = 1e-12);
    }

    #[test]
    fn between_rows_is_linear() {
        let table = TabulatedSteamTable::reference().unwrap();
        let mid = table.properties(170.0).unwrap();
        assert_relative_eq!(mid.latent_heat, (2082.0 + 2014.2) / 2.0 * WATER_MOLAR_MASS, max_relative = 1e-9);
    }

    #[test]
    fn outside_range_is_an_error() {
        let table = TabulatedSteamTable::reference().unwrap();
        assert!(matches!(table.properties(350.0), Err(MethforgeError::SteamTable(_))));
        assert!(matches!(table.properties(90.0), Err(MethforgeError::SteamTable(_))));
    }

    #[test]
    fn loads_from_csv() {
        let path = std::env::temp_dir().join("methforge_steam_table_test.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "T_sat,h_fg,h_g").unwrap();
        writeln!(file, "100,2256.4,2675.6").unwrap();
        writeln!(file, "200,1939.8,2792.0").unwrap();
        drop(file);
        let table = TabulatedSteamTable::from_csv(&path).unwrap();
        let p = table.properties(150.0).unwrap();
        assert_relative_eq!(p.latent_heat, (2256.4 + 1939.8) / 2.0 * WATER_MOLAR_MASS, max_relative = 1e-9);
        std::fs::remove_file(&path).ok();
    }
}
