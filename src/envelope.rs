//! Envelope aggregation
//!
//! Reduces a list of envelope elements (opaque walls, windows, roof, ground
//! floor) into the lumped conductances, capacitances and area-weighted solar
//! coefficients consumed by the network assembler.
//!
//! The aggregation formulas follow the zone parameter derivation of
//! ISO 13790 / VDI 6007: transmission as sum of U*A, per-orientation solar
//! apertures as sum of A*g*F_sh for glazing, internal capacitance either from
//! a mass-class lookup or supplied explicitly.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::{ZoneError, ZoneResult};
use crate::parameters::{
    Iso13790Coefficients, MassClass, Vdi6007Coefficients, AIR_DENSITY, AIR_SPECIFIC_HEAT,
};

/// Kind of envelope element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    OpaqueWall,
    Window,
    Roof,
    GroundFloor,
}

/// Compass orientation of a vertical element, or `Horizontal` for roofs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    North,
    East,
    South,
    West,
    Horizontal,
}

/// Solar transmission properties of a glazed element.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarProperties {
    /// Solar heat gain coefficient of the glazing (dimensionless).
    pub shgc: f64,
    /// Frame fraction of the element area (dimensionless, 0 = frameless).
    pub frame_factor: f64,
    /// External shading reduction factor (dimensionless, 1 = unshaded).
    pub shading_factor: f64,
}

impl SolarProperties {
    pub fn new(shgc: f64) -> Self {
        Self {
            shgc,
            frame_factor: 0.0,
            shading_factor: 1.0,
        }
    }
}

/// A single envelope element. Immutable input to [`aggregate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeElement {
    pub kind: ElementKind,
    pub area_m2: f64,
    /// Thermal transmittance (W/(m^2 K)).
    pub u_value: f64,
    pub orientation: Option<Orientation>,
    /// Glazing properties; required for windows.
    pub solar: Option<SolarProperties>,
    /// Short-wave absorptance of the external finish (opaque elements).
    pub absorptance: f64,
}

impl EnvelopeElement {
    /// Opaque element (wall, roof or ground floor) with default absorptance.
    pub fn opaque(kind: ElementKind, area_m2: f64, u_value: f64) -> Self {
        Self {
            kind,
            area_m2,
            u_value,
            orientation: None,
            solar: None,
            absorptance: 0.6,
        }
    }

    /// Glazed element.
    pub fn window(
        area_m2: f64,
        u_value: f64,
        orientation: Orientation,
        solar: SolarProperties,
    ) -> Self {
        Self {
            kind: ElementKind::Window,
            area_m2,
            u_value,
            orientation: Some(orientation),
            solar: Some(solar),
            absorptance: 0.0,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_absorptance(mut self, absorptance: f64) -> Self {
        self.absorptance = absorptance;
        self
    }

    fn sky_view_factor(&self) -> f64 {
        // (1 + cos(tilt)) / 2: vertical walls see half the sky, roofs all of it
        match self.kind {
            ElementKind::Roof => 1.0,
            _ => 0.5,
        }
    }
}

/// Internal thermal capacitance specification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MassSpec {
    /// Derive capacitance and effective mass area from the mass-class table
    /// and the zone floor area.
    Class(MassClass),
    /// Detailed capacitance supplied directly.
    Explicit { c_m_j_per_k: f64, a_m_m2: f64 },
}

/// Zone geometry metadata.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneGeometry {
    pub floor_area_m2: f64,
    /// Net air volume; defaulted to floor area times a 3 m ceiling when absent.
    pub volume_m3: Option<f64>,
}

/// Aggregated lumped parameters of a zone.
///
/// Derived once per building and immutable for the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneParameters {
    /// Transmission conductance of opaque elements, sum of U*A (W/K).
    pub h_tr_op: f64,
    /// Transmission conductance of glazed elements, sum of U*A (W/K).
    pub h_tr_w: f64,
    /// Ventilation conductance (W/K).
    pub h_ve: f64,
    /// Internal thermal capacitance of the mass node (J/K).
    pub c_m: f64,
    /// Thermal capacitance of the zone air (J/K).
    pub c_a: f64,
    /// Effective mass area (m^2).
    pub a_m: f64,
    /// Total internal surface area (m^2).
    pub a_tot: f64,
    pub floor_area_m2: f64,
    /// Effective solar aperture per orientation, sum of A*g*F_sh*(1-F_f) (m^2).
    pub solar_aperture: BTreeMap<Orientation, f64>,
    /// Effective opaque absorption area per orientation,
    /// sum of U*A*R_se*alpha (m^2).
    pub opaque_absorption: BTreeMap<Orientation, f64>,
    /// Constant long-wave loss towards the sky vault (W).
    pub lw_sky_loss_w: f64,
}

impl ZoneParameters {
    /// Total transmission conductance (W/K).
    pub fn h_tr(&self) -> f64 {
        self.h_tr_op + self.h_tr_w
    }
}

/// Ventilation conductance from air change rate and zone volume (W/K).
pub fn ventilation_conductance(ach: f64, volume_m3: f64) -> f64 {
    ach / 3600.0 * volume_m3 * AIR_DENSITY * AIR_SPECIFIC_HEAT
}

/// Aggregate envelope elements into [`ZoneParameters`] using the standard
/// default coefficients.
pub fn aggregate(
    elements: &[EnvelopeElement],
    mass: &MassSpec,
    geometry: ZoneGeometry,
    ventilation_ach: f64,
) -> ZoneResult<ZoneParameters> {
    aggregate_with(
        elements,
        mass,
        geometry,
        ventilation_ach,
        &Iso13790Coefficients::default(),
        &Vdi6007Coefficients::default(),
    )
}

/// Aggregate envelope elements with explicit coefficient tables.
pub fn aggregate_with(
    elements: &[EnvelopeElement],
    mass: &MassSpec,
    geometry: ZoneGeometry,
    ventilation_ach: f64,
    iso: &Iso13790Coefficients,
    vdi: &Vdi6007Coefficients,
) -> ZoneResult<ZoneParameters> {
    if geometry.floor_area_m2 <= 0.0 {
        return Err(ZoneError::InvalidEnvelope(format!(
            "floor area must be positive, got {}",
            geometry.floor_area_m2
        )));
    }
    if ventilation_ach < 0.0 {
        return Err(ZoneError::InvalidEnvelope(format!(
            "air change rate must be non-negative, got {ventilation_ach}"
        )));
    }

    let volume = match geometry.volume_m3 {
        Some(v) if v > 0.0 => v,
        Some(v) => {
            return Err(ZoneError::InvalidEnvelope(format!(
                "zone volume must be positive, got {v}"
            )))
        }
        None => {
            let v = geometry.floor_area_m2 * 3.0;
            warn!("zone volume not set, defaulting to {v} m3 (3 m ceiling)");
            v
        }
    };

    let mut h_tr_op = 0.0;
    let mut h_tr_w = 0.0;
    let mut total_area = 0.0;
    let mut solar_aperture: BTreeMap<Orientation, f64> = BTreeMap::new();
    let mut opaque_absorption: BTreeMap<Orientation, f64> = BTreeMap::new();
    let mut lw_sky_loss_w = 0.0;

    for element in elements {
        if element.area_m2 < 0.0 {
            return Err(ZoneError::InvalidEnvelope(format!(
                "negative element area: {}",
                element.area_m2
            )));
        }
        if element.area_m2 == 0.0 {
            // Contributes zero conductance, never negative
            warn!("zero-area {:?} element skipped", element.kind);
            continue;
        }
        if element.u_value <= 0.0 {
            return Err(ZoneError::InvalidEnvelope(format!(
                "non-positive U-value: {}",
                element.u_value
            )));
        }
        total_area += element.area_m2;
        let ua = element.u_value * element.area_m2;

        match element.kind {
            ElementKind::Window => {
                let orientation = element.orientation.ok_or_else(|| {
                    ZoneError::InvalidEnvelope("glazed element without orientation".to_string())
                })?;
                let solar = element.solar.ok_or_else(|| {
                    ZoneError::InvalidEnvelope(
                        "glazed element without solar properties".to_string(),
                    )
                })?;
                h_tr_w += ua;
                let aperture = element.area_m2
                    * solar.shgc
                    * solar.shading_factor
                    * (1.0 - solar.frame_factor);
                *solar_aperture.entry(orientation).or_insert(0.0) += aperture;
            }
            ElementKind::OpaqueWall | ElementKind::Roof => {
                h_tr_op += ua;
                lw_sky_loss_w += ua
                    * vdi.r_se
                    * vdi.h_r_external
                    * element.sky_view_factor()
                    * vdi.delta_t_air_sky;
                match element.orientation {
                    Some(orientation) => {
                        *opaque_absorption.entry(orientation).or_insert(0.0) +=
                            ua * vdi.r_se * element.absorptance;
                    }
                    None => warn!(
                        "{:?} element without orientation: no solar absorption accounted",
                        element.kind
                    ),
                }
            }
            ElementKind::GroundFloor => {
                // Transmission only; no solar exposure
                h_tr_op += ua;
            }
        }
    }

    if total_area <= 0.0 {
        return Err(ZoneError::InvalidEnvelope(
            "total envelope area must be positive".to_string(),
        ));
    }
    if h_tr_op + h_tr_w <= 0.0 {
        return Err(ZoneError::InvalidEnvelope(
            "total transmission conductance must be positive".to_string(),
        ));
    }

    let (c_m, a_m) = match mass {
        MassSpec::Class(class) => {
            let coeffs = class.coefficients();
            (
                coeffs.capacitance_j_per_m2k * geometry.floor_area_m2,
                coeffs.mass_area_factor * geometry.floor_area_m2,
            )
        }
        MassSpec::Explicit { c_m_j_per_k, a_m_m2 } => (*c_m_j_per_k, *a_m_m2),
    };
    if c_m <= 0.0 || a_m <= 0.0 {
        return Err(ZoneError::InvalidEnvelope(format!(
            "internal capacitance and mass area must be positive, got C_m = {c_m}, A_m = {a_m}"
        )));
    }

    let c_a = volume * AIR_DENSITY * AIR_SPECIFIC_HEAT;
    let h_ve = ventilation_conductance(ventilation_ach, volume);

    Ok(ZoneParameters {
        h_tr_op,
        h_tr_w,
        h_ve,
        c_m,
        c_a,
        a_m,
        a_tot: iso.lambda_at * geometry.floor_area_m2,
        floor_area_m2: geometry.floor_area_m2,
        solar_aperture,
        opaque_absorption,
        lw_sky_loss_w,
    })
}
