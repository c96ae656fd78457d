//! Network assembly
//!
//! Builds the continuous-time state-space system `dx/dt = A x + B u` from
//! aggregated zone parameters, for either the VDI 6007 two-node topology
//! (mass node + air node) or the ISO 13790 5R1C topology collapsed to a
//! single effective node.
//!
//! Every matrix entry is a conductance/capacitance ratio; nothing is
//! hard-coded dimensionlessly. The assembled matrix is checked to be
//! dissipative (all eigenvalues with negative real part) at construction
//! time.

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::envelope::ZoneParameters;
use crate::errors::{ZoneError, ZoneResult};
use crate::parameters::{Iso13790Coefficients, Vdi6007Coefficients};

/// Input vector layout shared by both topologies.
///
/// Units: temperatures in degrees C, gains and power in W.
pub const U_OUTDOOR: usize = 0;
/// Solar gain transmitted through glazing (W).
pub const U_SOLAR_TRANS: usize = 1;
/// Solar gain absorbed on opaque surfaces, net of long-wave sky losses (W).
pub const U_SOLAR_ABS: usize = 2;
/// Convective internal gains (W).
pub const U_INT_CONV: usize = 3;
/// Radiative internal gains (W).
pub const U_INT_RAD: usize = 4;
/// Ventilation supply air temperature (degrees C).
pub const U_VENT: usize = 5;
/// HVAC power injected on the air node (W, positive = heating).
pub const U_HVAC: usize = 6;
/// Number of input channels.
pub const N_INPUTS: usize = 7;

/// Reduced-order network topology.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Two-node model: [mass temperature, air temperature].
    Vdi6007,
    /// Single effective node (5R1C collapsed).
    Iso13790,
}

/// Continuous-time state-space model of the zone.
///
/// Immutable for the run once assembled.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSpaceModel {
    /// State matrix, n x n (1/s).
    pub a: DMatrix<f64>,
    /// Input matrix, n x [`N_INPUTS`].
    pub b: DMatrix<f64>,
    /// Row index of the air node in the state vector.
    pub air_node: usize,
    pub topology: Topology,
}

impl StateSpaceModel {
    /// Number of state nodes.
    pub fn n_states(&self) -> usize {
        self.a.nrows()
    }

    /// Steady-state node temperatures under a constant input, from
    /// `A x = -B u`.
    pub fn steady_state(&self, input: &DVector<f64>) -> ZoneResult<DVector<f64>> {
        let a_inv = self.a.clone().try_inverse().ok_or_else(|| {
            ZoneError::IllConditionedNetwork("singular state matrix".to_string())
        })?;
        Ok(-(a_inv * (&self.b * input)))
    }
}

/// Assemble the state-space model with the standard default coefficients.
pub fn assemble(params: &ZoneParameters, topology: Topology) -> ZoneResult<StateSpaceModel> {
    match topology {
        Topology::Iso13790 => assemble_iso13790(params, &Iso13790Coefficients::default()),
        Topology::Vdi6007 => assemble_vdi6007(params, &Vdi6007Coefficients::default()),
    }
}

/// Assemble the collapsed single-node ISO 13790 model.
///
/// State: effective internal temperature. The transmission, ventilation and
/// glazing conductances all discharge the single capacitance; radiative and
/// solar gains are weighted by the 5R1C glazing loss factor, convective
/// internal gains and HVAC power act on the node directly.
pub fn assemble_iso13790(
    params: &ZoneParameters,
    coeffs: &Iso13790Coefficients,
) -> ZoneResult<StateSpaceModel> {
    check_positive(params, false)?;
    let c = params.c_m;
    let h_tr = params.h_tr();
    let w = coeffs.radiative_weight(params.h_tr_w, params.a_tot);
    if w <= 0.0 {
        return Err(ZoneError::IllConditionedNetwork(format!(
            "radiative gain weight must be positive, got {w}: glazing conductance \
             {} W/K is too large for the internal surface area {} m2",
            params.h_tr_w, params.a_tot
        )));
    }

    let a = DMatrix::from_element(1, 1, -(h_tr + params.h_ve) / c);
    let mut b = DMatrix::zeros(1, N_INPUTS);
    b[(0, U_OUTDOOR)] = h_tr / c;
    b[(0, U_SOLAR_TRANS)] = w / c;
    b[(0, U_SOLAR_ABS)] = w / c;
    b[(0, U_INT_CONV)] = 1.0 / c;
    b[(0, U_INT_RAD)] = w / c;
    b[(0, U_VENT)] = params.h_ve / c;
    b[(0, U_HVAC)] = 1.0 / c;

    finish(a, b, 0, Topology::Iso13790)
}

/// Assemble the two-node VDI 6007 model.
///
/// State: `[mass temperature, air temperature]`. The mass node couples to
/// the air node through the internal surface coefficient times the effective
/// mass area, and to outdoors through the opaque envelope. Windows and
/// ventilation act directly on the air node. Absorbed opaque solar and
/// radiative internal gains charge the mass node; transmitted solar is split
/// between the nodes by the standard's fixed ratio.
pub fn assemble_vdi6007(
    params: &ZoneParameters,
    coeffs: &Vdi6007Coefficients,
) -> ZoneResult<StateSpaceModel> {
    check_positive(params, true)?;
    let c_m = params.c_m;
    let c_a = params.c_a;
    let h_ma = coeffs.h_surface_int * params.a_m;
    let f_sa = coeffs.solar_to_air_fraction;

    let a = DMatrix::from_row_slice(
        2,
        2,
        &[
            -(params.h_tr_op + h_ma) / c_m,
            h_ma / c_m,
            h_ma / c_a,
            -(h_ma + params.h_tr_w + params.h_ve) / c_a,
        ],
    );
    let mut b = DMatrix::zeros(2, N_INPUTS);
    b[(0, U_OUTDOOR)] = params.h_tr_op / c_m;
    b[(1, U_OUTDOOR)] = params.h_tr_w / c_a;
    b[(0, U_SOLAR_TRANS)] = (1.0 - f_sa) / c_m;
    b[(1, U_SOLAR_TRANS)] = f_sa / c_a;
    b[(0, U_SOLAR_ABS)] = 1.0 / c_m;
    b[(0, U_INT_RAD)] = 1.0 / c_m;
    b[(1, U_INT_CONV)] = 1.0 / c_a;
    b[(1, U_VENT)] = params.h_ve / c_a;
    b[(1, U_HVAC)] = 1.0 / c_a;

    finish(a, b, 1, Topology::Vdi6007)
}

fn check_positive(params: &ZoneParameters, needs_air: bool) -> ZoneResult<()> {
    if params.c_m <= 0.0 {
        return Err(ZoneError::IllConditionedNetwork(format!(
            "internal capacitance must be positive, got {}",
            params.c_m
        )));
    }
    if needs_air && params.c_a <= 0.0 {
        return Err(ZoneError::IllConditionedNetwork(format!(
            "air capacitance must be positive, got {}",
            params.c_a
        )));
    }
    if params.h_tr() <= 0.0 {
        return Err(ZoneError::IllConditionedNetwork(format!(
            "transmission conductance must be positive, got {}",
            params.h_tr()
        )));
    }
    if params.h_ve < 0.0 {
        return Err(ZoneError::IllConditionedNetwork(format!(
            "ventilation conductance must be non-negative, got {}",
            params.h_ve
        )));
    }
    Ok(())
}

fn finish(
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    air_node: usize,
    topology: Topology,
) -> ZoneResult<StateSpaceModel> {
    for eigenvalue in a.complex_eigenvalues().iter() {
        if eigenvalue.re >= 0.0 {
            return Err(ZoneError::IllConditionedNetwork(format!(
                "non-dissipative network: eigenvalue {} has non-negative real part",
                eigenvalue
            )));
        }
    }
    debug!(
        "assembled {:?} network: {} state(s), eigenvalues {:?}",
        topology,
        a.nrows(),
        a.complex_eigenvalues().as_slice()
    );
    Ok(StateSpaceModel {
        a,
        b,
        air_node,
        topology,
    })
}
