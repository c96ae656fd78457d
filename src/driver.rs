//! Simulation driver
//!
//! Runs the discrete zone model over the forcing horizon, resolving HVAC
//! demand each step, and collects the trajectory into a result table. The
//! loop is strictly sequential; each record depends on the previous state.

use log::{debug, info};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::{ZoneError, ZoneResult};
use crate::forcing::ForcingSeries;
use crate::hvac::{resolve_step, ComfortBand, HvacMode};
use crate::integrator::DiscreteSystem;
use crate::network::StateSpaceModel;

/// One row of the simulation output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Time at the end of the step (s from the start of the run).
    pub time_s: f64,
    /// Node temperatures at the end of the step (degrees C).
    pub temperatures: Vec<f64>,
    pub heating_power_w: f64,
    pub cooling_power_w: f64,
    pub mode: HvacMode,
}

/// Completed trajectory of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub records: Vec<StepRecord>,
    /// Timestep the run used (s).
    pub dt: f64,
    /// Index of the air node within each record's temperature vector.
    pub air_node: usize,
}

impl SimulationResult {
    /// Air temperature trajectory (degrees C).
    pub fn air_temperatures(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.temperatures[self.air_node])
            .collect()
    }

    /// Total delivered heating energy (J).
    pub fn heating_energy_j(&self) -> f64 {
        self.records.iter().map(|r| r.heating_power_w * self.dt).sum()
    }

    /// Total extracted cooling energy (J).
    pub fn cooling_energy_j(&self) -> f64 {
        self.records.iter().map(|r| r.cooling_power_w * self.dt).sum()
    }
}

/// A run that stopped before the end of the horizon.
///
/// The trajectory up to the failing step is preserved for inspection.
#[derive(Error, Debug)]
#[error("simulation aborted at step {step}: {source}")]
pub struct SimulationAborted {
    pub step: usize,
    pub partial: SimulationResult,
    pub source: ZoneError,
}

/// Run the simulation over the full forcing horizon.
///
/// When `initial` is absent, the run starts from the steady state of the
/// first forcing sample with the plant off, which avoids a spin-up
/// transient polluting the opening hours of the trajectory.
pub fn run(
    model: &StateSpaceModel,
    system: &DiscreteSystem,
    initial: Option<DVector<f64>>,
    forcing: &ForcingSeries,
    band: &ComfortBand,
) -> Result<SimulationResult, Box<SimulationAborted>> {
    let n_steps = forcing.len();
    let abort = |step, partial, source| {
        Box::new(SimulationAborted {
            step,
            partial,
            source,
        })
    };
    let empty = SimulationResult {
        records: Vec::new(),
        dt: system.dt,
        air_node: system.air_node,
    };

    if let Err(e) = validate_band(band, n_steps) {
        return Err(abort(0, empty, e));
    }
    if n_steps == 0 {
        debug!("empty forcing horizon, nothing to simulate");
        return Ok(empty);
    }

    let mut state = match initial {
        Some(x) => {
            if x.len() != model.n_states() {
                return Err(abort(
                    0,
                    empty,
                    ZoneError::MisalignedSeries {
                        name: "initial state".to_string(),
                        expected: model.n_states(),
                        actual: x.len(),
                    },
                ));
            }
            x
        }
        None => match model.steady_state(&forcing.at(0).to_input(0.0)) {
            Ok(x) => {
                debug!("steady-state initialization: {:?}", x.as_slice());
                x
            }
            Err(e) => return Err(abort(0, empty, e)),
        },
    };

    let mut records = Vec::with_capacity(n_steps);
    for (step, forcing_vector) in forcing.iter().enumerate() {
        let solution = match resolve_step(system, &state, &forcing_vector, band, step) {
            Ok(s) => s,
            Err(e) => {
                return Err(abort(
                    step,
                    SimulationResult {
                        records,
                        dt: system.dt,
                        air_node: system.air_node,
                    },
                    e,
                ))
            }
        };
        state = solution.state;
        records.push(StepRecord {
            time_s: (step as f64 + 1.0) * system.dt,
            temperatures: state.iter().copied().collect(),
            heating_power_w: solution.heating_w,
            cooling_power_w: solution.cooling_w,
            mode: solution.mode,
        });
    }

    let result = SimulationResult {
        records,
        dt: system.dt,
        air_node: system.air_node,
    };
    info!(
        "run complete: {} steps, {:.1} kWh heating, {:.1} kWh cooling",
        n_steps,
        result.heating_energy_j() / 3.6e6,
        result.cooling_energy_j() / 3.6e6
    );
    Ok(result)
}

fn validate_band(band: &ComfortBand, n_steps: usize) -> ZoneResult<()> {
    for schedule in [&band.heating_setpoint, &band.cooling_setpoint]
        .into_iter()
        .flatten()
    {
        if schedule.len() != n_steps {
            return Err(ZoneError::MisalignedSeries {
                name: schedule.name().to_string(),
                expected: n_steps,
                actual: schedule.len(),
            });
        }
    }
    Ok(())
}
