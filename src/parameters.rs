//! Standard coefficient tables
//!
//! Normative coefficients for the two reduced-order network topologies.
//! Values are kept in explicit, immutable lookup structures so each matrix
//! entry of the assembled network can be traced back to the standard text.

use serde::{Deserialize, Serialize};

/// Density of indoor air (kg/m^3).
pub const AIR_DENSITY: f64 = 1.2;

/// Specific heat capacity of indoor air (J/(kg K)).
pub const AIR_SPECIFIC_HEAT: f64 = 1005.0;

/// Thermal mass class of the construction.
///
/// Classes follow ISO 13790 Table 12. The class selects the areal internal
/// heat capacity and the effective mass area factor used when no detailed
/// per-element capacitance is supplied.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassClass {
    VeryLight,
    Light,
    Medium,
    Heavy,
    VeryHeavy,
}

/// Coefficients attached to a [`MassClass`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassClassCoefficients {
    /// Areal internal heat capacity per unit floor area (J/(m^2 K)).
    pub capacitance_j_per_m2k: f64,
    /// Effective mass area as a multiple of the floor area (dimensionless).
    pub mass_area_factor: f64,
}

impl MassClass {
    /// Look up the ISO 13790 Table 12 coefficients for this class.
    pub fn coefficients(&self) -> MassClassCoefficients {
        match self {
            MassClass::VeryLight => MassClassCoefficients {
                capacitance_j_per_m2k: 80_000.0,
                mass_area_factor: 2.5,
            },
            MassClass::Light => MassClassCoefficients {
                capacitance_j_per_m2k: 110_000.0,
                mass_area_factor: 2.5,
            },
            MassClass::Medium => MassClassCoefficients {
                capacitance_j_per_m2k: 165_000.0,
                mass_area_factor: 2.5,
            },
            MassClass::Heavy => MassClassCoefficients {
                capacitance_j_per_m2k: 260_000.0,
                mass_area_factor: 3.0,
            },
            MassClass::VeryHeavy => MassClassCoefficients {
                capacitance_j_per_m2k: 370_000.0,
                mass_area_factor: 3.5,
            },
        }
    }
}

/// Coefficients of the ISO 13790 hourly method (5R1C, collapsed here to a
/// single effective node).
///
/// # Default Values
///
/// Defaults match the values prescribed by the standard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Iso13790Coefficients {
    /// Heat transfer coefficient between air and surface node (W/(m^2 K)).
    /// Default: 3.45
    pub h_is: f64,

    /// Heat transfer coefficient between mass and surface node (W/(m^2 K)).
    /// Default: 9.1
    pub h_ms: f64,

    /// Ratio of total internal surface area to floor area (dimensionless).
    /// Default: 4.5
    pub lambda_at: f64,

    /// Convective fraction of internal gains delivered to the air node
    /// (dimensionless). Default: 0.5
    pub convective_fraction: f64,
}

impl Default for Iso13790Coefficients {
    fn default() -> Self {
        Self {
            h_is: 3.45,
            h_ms: 9.1,
            lambda_at: 4.5,
            convective_fraction: 0.5,
        }
    }
}

impl Iso13790Coefficients {
    /// Weighting factor applied to radiative gains on the collapsed node.
    ///
    /// In the full 5R1C network a share `Htr_w / (h_ms * Atot)` of the
    /// radiative and solar gains is lost back through the glazing; the
    /// remainder reaches the mass/surface nodes. Collapsing the network keeps
    /// that loss factor.
    pub fn radiative_weight(&self, h_tr_w: f64, a_tot: f64) -> f64 {
        1.0 - h_tr_w / (self.h_ms * a_tot)
    }
}

/// Coefficients of the VDI 6007 two-node topology.
///
/// # Default Values
///
/// Surface coefficients follow the standard's combined internal/external
/// film coefficients; the long-wave sky offset is the annual average
/// air-sky temperature difference of the Berdahl sky model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Vdi6007Coefficients {
    /// Combined internal surface heat transfer coefficient (W/(m^2 K)),
    /// coupling the thermal mass to the zone air. Default: 7.7 (= 1/0.13)
    pub h_surface_int: f64,

    /// External surface resistance (m^2 K/W). Default: 0.04
    pub r_se: f64,

    /// External long-wave radiative coefficient (W/(m^2 K)). Default: 5.0
    pub h_r_external: f64,

    /// Fraction of transmitted solar gain released convectively to the air
    /// node; the remainder is absorbed by internal surfaces (mass node).
    /// Default: 0.1
    pub solar_to_air_fraction: f64,

    /// Annual average difference between outdoor air and apparent sky
    /// temperature (K). Default: 11.0
    pub delta_t_air_sky: f64,
}

impl Default for Vdi6007Coefficients {
    fn default() -> Self {
        Self {
            h_surface_int: 7.7,
            r_se: 0.04,
            h_r_external: 5.0,
            solar_to_air_fraction: 0.1,
            delta_t_air_sky: 11.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_class_table() {
        let medium = MassClass::Medium.coefficients();
        assert_eq!(medium.capacitance_j_per_m2k, 165_000.0);
        assert_eq!(medium.mass_area_factor, 2.5);

        // Capacitance must be monotonically increasing with heaviness
        let caps: Vec<f64> = [
            MassClass::VeryLight,
            MassClass::Light,
            MassClass::Medium,
            MassClass::Heavy,
            MassClass::VeryHeavy,
        ]
        .iter()
        .map(|c| c.coefficients().capacitance_j_per_m2k)
        .collect();
        assert!(caps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_iso_defaults() {
        let coeffs = Iso13790Coefficients::default();
        assert!((coeffs.h_is - 3.45).abs() < 1e-12);
        assert!((coeffs.h_ms - 9.1).abs() < 1e-12);
        assert!((coeffs.lambda_at - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_radiative_weight_no_windows() {
        let coeffs = Iso13790Coefficients::default();
        // Without glazing nothing is lost back outside
        assert!((coeffs.radiative_weight(0.0, 100.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_deserialization() {
        // #[serde(default)] allows overriding a single coefficient
        let json = r#"{"h_ms": 9.5}"#;
        let coeffs: Iso13790Coefficients = serde_json::from_str(json).unwrap();
        assert!((coeffs.h_ms - 9.5).abs() < 1e-12);
        assert!((coeffs.h_is - 3.45).abs() < 1e-12);
    }

    #[test]
    fn test_vdi_serialization_roundtrip() {
        let coeffs = Vdi6007Coefficients::default();
        let json = serde_json::to_string(&coeffs).unwrap();
        let parsed: Vdi6007Coefficients = serde_json::from_str(&json).unwrap();
        assert!((coeffs.h_surface_int - parsed.h_surface_int).abs() < 1e-12);
        assert!((coeffs.delta_t_air_sky - parsed.delta_t_air_sky).abs() < 1e-12);
    }
}
