//! Run configuration
//!
//! TOML-deserializable settings for a simulation run. Everything has a
//! sensible default so a config file only needs to name what it changes.

use serde::{Deserialize, Serialize};

use crate::errors::{ZoneError, ZoneResult};
use crate::network::Topology;

/// Settings for a single simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Timestep (s). Default: 3600 (hourly)
    pub timestep_s: f64,

    /// Number of steps to simulate. Default: 8760 (one year, hourly)
    pub horizon_steps: usize,

    /// Network topology. Default: VDI 6007 two-node
    pub topology: Topology,

    /// Uniform initial node temperature (degrees C). When absent the run
    /// starts from the steady state of the first forcing sample.
    pub initial_temperature_c: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep_s: 3600.0,
            horizon_steps: 8760,
            topology: Topology::Vdi6007,
            initial_temperature_c: None,
        }
    }
}

impl SimulationConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> ZoneResult<Self> {
        toml::from_str(content)
            .map_err(|e| ZoneError::Error(format!("invalid configuration: {e}")))
    }
}
