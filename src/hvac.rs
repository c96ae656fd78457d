//! HVAC demand resolution
//!
//! Ideal-load control on the air node: each step is first advanced free
//! floating, and only if the resulting air temperature leaves the comfort
//! band is the heating or cooling power computed that lands it exactly on
//! the violated setpoint. Because the discrete update is linear in the HVAC
//! input, that power has a closed form; no iteration is involved.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::errors::{ZoneError, ZoneResult};
use crate::forcing::{ForcingVector, Schedule};
use crate::integrator::DiscreteSystem;
use crate::network::U_HVAC;

/// Plant sensitivities below this are treated as a broken control loop.
const MIN_SENSITIVITY: f64 = 1e-12;

/// What the plant did during a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HvacMode {
    FreeFloat,
    Heating,
    Cooling,
}

/// Comfort band and plant capacity limits.
///
/// Setpoints are per-step schedules; either side may be absent, in which
/// case the zone floats freely in that direction. Capacity limits clamp the
/// ideal power, letting the air temperature drift outside the band.
#[derive(Clone, Debug, Default)]
pub struct ComfortBand {
    pub heating_setpoint: Option<Schedule>,
    pub cooling_setpoint: Option<Schedule>,
    /// Maximum heating power (W); unlimited when absent.
    pub max_heating_power: Option<f64>,
    /// Maximum cooling power (W, positive); unlimited when absent.
    pub max_cooling_power: Option<f64>,
}

impl ComfortBand {
    /// No conditioning at all.
    pub fn free_floating() -> Self {
        Self::default()
    }
}

/// Resolved state and plant output for one step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepSolution {
    pub state: DVector<f64>,
    /// Heating power delivered (W, >= 0).
    pub heating_w: f64,
    /// Cooling power extracted (W, >= 0).
    pub cooling_w: f64,
    pub mode: HvacMode,
}

/// Advance one step under ideal-load control.
///
/// The trial advance assumes zero HVAC power. If the trial air temperature
/// violates a setpoint, the correcting power is
/// `P = (setpoint - trial) / Bd[air, hvac]` and the accepted state is the
/// trial state shifted by the HVAC column times `P`, which is exactly the
/// step that would have been taken with `P` applied throughout.
///
/// `step` indexes the setpoint schedules, so it must lie within their
/// length. The driver validates this before the run; direct callers are
/// responsible for it themselves.
pub fn resolve_step(
    system: &DiscreteSystem,
    state: &DVector<f64>,
    forcing: &ForcingVector,
    band: &ComfortBand,
    step: usize,
) -> ZoneResult<StepSolution> {
    let trial = system.step(state, &forcing.to_input(0.0));
    let air = system.air_node;
    let trial_air = trial[air];

    let heating_target = band
        .heating_setpoint
        .as_ref()
        .map(|s| s.value(step))
        .filter(|&lo| trial_air < lo);
    let cooling_target = band
        .cooling_setpoint
        .as_ref()
        .map(|s| s.value(step))
        .filter(|&hi| trial_air > hi);

    let (target, mode) = match (heating_target, cooling_target) {
        (Some(lo), _) => (lo, HvacMode::Heating),
        (None, Some(hi)) => (hi, HvacMode::Cooling),
        (None, None) => {
            return Ok(StepSolution {
                state: trial,
                heating_w: 0.0,
                cooling_w: 0.0,
                mode: HvacMode::FreeFloat,
            })
        }
    };

    let sensitivity = system.bd[(air, U_HVAC)];
    if sensitivity.abs() < MIN_SENSITIVITY {
        return Err(ZoneError::NonConvergentControl {
            step,
            reason: format!(
                "air node does not respond to plant power (sensitivity {sensitivity:.3e})"
            ),
        });
    }
    let mut power = (target - trial_air) / sensitivity;
    if !power.is_finite() {
        return Err(ZoneError::NonConvergentControl {
            step,
            reason: format!("non-finite plant power towards setpoint {target}"),
        });
    }

    // Capacity clamping; the band is then allowed to be violated
    match mode {
        HvacMode::Heating => {
            if let Some(max) = band.max_heating_power {
                power = power.min(max);
            }
        }
        HvacMode::Cooling => {
            if let Some(max) = band.max_cooling_power {
                power = power.max(-max);
            }
        }
        HvacMode::FreeFloat => unreachable!(),
    }

    let accepted = &trial + system.bd.column(U_HVAC) * power;
    Ok(StepSolution {
        state: accepted,
        heating_w: power.max(0.0),
        cooling_w: (-power).max(0.0),
        mode,
    })
}
