//! Time integration
//!
//! Exact discretization of the linear time-invariant zone network over a
//! fixed timestep. The thermal time constants of a zone (hours to days) are
//! comparable to or longer than the usual one-hour step, so a forward Euler
//! update is not acceptable; instead the state transition matrix is the
//! matrix exponential `Ad = exp(A dt)` with the matched input matrix
//! `Bd = A^-1 (Ad - I) B`, which reproduces the continuous solution exactly
//! for inputs held constant over the step.
//!
//! The discrete matrices are computed once per run; changing the timestep
//! requires constructing a new [`DiscreteSystem`].

use nalgebra::{DMatrix, DVector};

use crate::errors::{ZoneError, ZoneResult};
use crate::network::StateSpaceModel;

/// Discrete-time update `x(t+dt) = Ad x(t) + Bd u(t)`.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteSystem {
    /// Discrete state transition matrix.
    pub ad: DMatrix<f64>,
    /// Discrete input matrix.
    pub bd: DMatrix<f64>,
    /// Timestep the matrices were derived for (s).
    pub dt: f64,
    /// Row index of the air node, copied from the continuous model.
    pub air_node: usize,
}

impl DiscreteSystem {
    /// Derive the discrete update from a continuous model and a fixed
    /// timestep.
    pub fn new(model: &StateSpaceModel, dt: f64) -> ZoneResult<Self> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(ZoneError::Error(format!(
                "timestep must be positive and finite, got {dt}"
            )));
        }
        let n = model.n_states();
        let ad = (model.a.clone() * dt).exp();
        // The dissipativity check at assembly guarantees A is invertible
        let a_inv = model.a.clone().try_inverse().ok_or_else(|| {
            ZoneError::IllConditionedNetwork("singular state matrix".to_string())
        })?;
        let bd = &a_inv * (&ad - DMatrix::<f64>::identity(n, n)) * &model.b;
        Ok(Self {
            ad,
            bd,
            dt,
            air_node: model.air_node,
        })
    }

    /// Advance the state by one step. Pure function of state and input.
    pub fn step(&self, state: &DVector<f64>, input: &DVector<f64>) -> DVector<f64> {
        &self.ad * state + &self.bd * input
    }
}
