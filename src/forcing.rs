//! Forcing adaptation
//!
//! Maps raw weather and load series onto the model's input vector sequence:
//! one [`ForcingVector`] per simulated step, aligned to a common grid and
//! with solar irradiance resolved per orientation into transmitted and
//! absorbed gains using the apertures aggregated from the envelope.
//!
//! The sequence is generated lazily and can be iterated any number of times;
//! nothing is materialized per step beyond the vector handed out.

use std::collections::BTreeMap;

use log::warn;
use nalgebra::DVector;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::envelope::{Orientation, ZoneParameters};
use crate::errors::{ZoneError, ZoneResult};
use crate::network::{
    N_INPUTS, U_HVAC, U_INT_CONV, U_INT_RAD, U_OUTDOOR, U_SOLAR_ABS, U_SOLAR_TRANS, U_VENT,
};

/// A named per-step value series with optional validity limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    name: String,
    values: Array1<f64>,
}

impl Schedule {
    /// Constant schedule over `n_steps` steps.
    pub fn constant(name: &str, n_steps: usize, value: f64) -> Self {
        Self {
            name: name.to_string(),
            values: Array1::from_elem(n_steps, value),
        }
    }

    /// Schedule from explicit values, validated against optional limits.
    pub fn from_values(
        name: &str,
        values: Array1<f64>,
        lower_limit: Option<f64>,
        upper_limit: Option<f64>,
    ) -> ZoneResult<Self> {
        let lower = lower_limit.unwrap_or(f64::NEG_INFINITY);
        let upper = upper_limit.unwrap_or(f64::INFINITY);
        for &value in values.iter() {
            if !value.is_finite() || value < lower || value > upper {
                return Err(ZoneError::ScheduleOutsideLimits {
                    name: name.to_string(),
                    value,
                    lower,
                    upper,
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, step: usize) -> f64 {
        self.values[step]
    }
}

/// Plane-of-array irradiance for one orientation (W/m^2).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneIrradiance {
    pub direct: Array1<f64>,
    pub diffuse: Array1<f64>,
}

impl PlaneIrradiance {
    pub fn total(&self, step: usize) -> f64 {
        self.direct[step] + self.diffuse[step]
    }
}

/// Weather time series on the simulation grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherSeries {
    /// Outdoor dry-bulb temperature (degrees C).
    pub outdoor_temp: Array1<f64>,
    /// Orientation-resolved irradiance.
    pub irradiance: BTreeMap<Orientation, PlaneIrradiance>,
}

impl WeatherSeries {
    pub fn len(&self) -> usize {
        self.outdoor_temp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outdoor_temp.is_empty()
    }

    fn validate(&self) -> ZoneResult<()> {
        let n = self.len();
        for (orientation, plane) in &self.irradiance {
            for (label, series) in [("direct", &plane.direct), ("diffuse", &plane.diffuse)] {
                if series.len() != n {
                    return Err(ZoneError::MisalignedSeries {
                        name: format!("irradiance {orientation:?} ({label})"),
                        expected: n,
                        actual: series.len(),
                    });
                }
            }
        }
        if self
            .outdoor_temp
            .iter()
            .any(|&t| !(-50.0..=60.0).contains(&t))
        {
            warn!("outdoor temperature outside [-50, 60] C range");
        }
        Ok(())
    }
}

/// Internal gains split into convective and radiative parts (W).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InternalGains {
    pub convective: Array1<f64>,
    pub radiative: Array1<f64>,
}

impl InternalGains {
    /// Constant gains over the horizon.
    pub fn constant(n_steps: usize, convective: f64, radiative: f64) -> Self {
        Self {
            convective: Array1::from_elem(n_steps, convective),
            radiative: Array1::from_elem(n_steps, radiative),
        }
    }

    /// No internal gains.
    pub fn none(n_steps: usize) -> Self {
        Self::constant(n_steps, 0.0, 0.0)
    }
}

/// Model inputs for a single step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ForcingVector {
    pub outdoor_temp: f64,
    pub solar_transmitted: f64,
    pub solar_absorbed: f64,
    pub internal_convective: f64,
    pub internal_radiative: f64,
    pub vent_temp: f64,
}

impl ForcingVector {
    /// Full input vector with the HVAC power channel filled in.
    pub fn to_input(&self, hvac_power: f64) -> DVector<f64> {
        let mut u = DVector::zeros(N_INPUTS);
        u[U_OUTDOOR] = self.outdoor_temp;
        u[U_SOLAR_TRANS] = self.solar_transmitted;
        u[U_SOLAR_ABS] = self.solar_absorbed;
        u[U_INT_CONV] = self.internal_convective;
        u[U_INT_RAD] = self.internal_radiative;
        u[U_VENT] = self.vent_temp;
        u[U_HVAC] = hvac_power;
        u
    }
}

/// Lazy, restartable sequence of per-step forcing vectors.
#[derive(Clone, Debug)]
pub struct ForcingSeries {
    weather: WeatherSeries,
    gains: InternalGains,
    vent_temp: Option<Schedule>,
    solar_aperture: BTreeMap<Orientation, f64>,
    opaque_absorption: BTreeMap<Orientation, f64>,
    lw_sky_loss_w: f64,
    n_steps: usize,
}

impl ForcingSeries {
    /// Validate alignment and bind the envelope's solar coefficients to the
    /// weather and load series.
    ///
    /// `vent_temp` defaults to the outdoor temperature (untempered supply)
    /// when absent.
    ///
    /// The ventilation conductance itself is part of the aggregated zone
    /// parameters and stays constant over the run; only the supply
    /// temperature is schedulable here. A time-varying air change rate
    /// changes the state matrix and therefore needs a separate model and
    /// discretization per rate.
    pub fn build(
        params: &ZoneParameters,
        weather: WeatherSeries,
        gains: InternalGains,
        vent_temp: Option<Schedule>,
    ) -> ZoneResult<Self> {
        weather.validate()?;
        let n_steps = weather.len();
        for (name, len) in [
            ("internal gains (convective)", gains.convective.len()),
            ("internal gains (radiative)", gains.radiative.len()),
        ] {
            if len != n_steps {
                return Err(ZoneError::MisalignedSeries {
                    name: name.to_string(),
                    expected: n_steps,
                    actual: len,
                });
            }
        }
        if let Some(schedule) = &vent_temp {
            if schedule.len() != n_steps {
                return Err(ZoneError::MisalignedSeries {
                    name: schedule.name().to_string(),
                    expected: n_steps,
                    actual: schedule.len(),
                });
            }
        }
        // Every orientation with solar exposure needs irradiance data
        for orientation in params
            .solar_aperture
            .keys()
            .chain(params.opaque_absorption.keys())
        {
            if !weather.irradiance.contains_key(orientation) {
                return Err(ZoneError::MisalignedSeries {
                    name: format!("irradiance {orientation:?}"),
                    expected: n_steps,
                    actual: 0,
                });
            }
        }
        Ok(Self {
            weather,
            gains,
            vent_temp,
            solar_aperture: params.solar_aperture.clone(),
            opaque_absorption: params.opaque_absorption.clone(),
            lw_sky_loss_w: params.lw_sky_loss_w,
            n_steps,
        })
    }

    pub fn len(&self) -> usize {
        self.n_steps
    }

    pub fn is_empty(&self) -> bool {
        self.n_steps == 0
    }

    /// Forcing vector for one step, computed on demand.
    pub fn at(&self, step: usize) -> ForcingVector {
        let mut transmitted = 0.0;
        for (orientation, aperture) in &self.solar_aperture {
            transmitted += aperture * self.weather.irradiance[orientation].total(step);
        }
        let mut absorbed = -self.lw_sky_loss_w;
        for (orientation, absorption) in &self.opaque_absorption {
            absorbed += absorption * self.weather.irradiance[orientation].total(step);
        }
        let outdoor = self.weather.outdoor_temp[step];
        ForcingVector {
            outdoor_temp: outdoor,
            solar_transmitted: transmitted,
            solar_absorbed: absorbed,
            internal_convective: self.gains.convective[step],
            internal_radiative: self.gains.radiative[step],
            vent_temp: self
                .vent_temp
                .as_ref()
                .map_or(outdoor, |schedule| schedule.value(step)),
        }
    }

    /// Iterate the sequence from the start. Calling again restarts it.
    pub fn iter(&self) -> impl Iterator<Item = ForcingVector> + '_ {
        (0..self.n_steps).map(|step| self.at(step))
    }
}
