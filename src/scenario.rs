//! Scenario files.
//!
//! A scenario is the JSON form of a multi-disease run:
//!
//! ```json
//! {
//!     "shared": { "population_size": 10000, "duration_days": 365 },
//!     "diseases": {
//!         "chlamydia": {
//!             "transmission_probability": 0.05,
//!             "intervention_efficacy": 0.85,
//!             "external_reinfection_rate": 0.5
//!         }
//!     }
//! }
//! ```
//!
//! Shared fields that are omitted take their baseline values. A scenario without diseases runs the
//! [`default_catalog`].
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::disease::{
    default_catalog, simulate_many, simulate_many_parallel, DiseaseId, DiseaseOverrides,
    SharedParameters,
};
use crate::error::SimulationError;
use crate::simulator::CompartmentSeries;

pub type ScenarioResults = BTreeMap<DiseaseId, CompartmentSeries>;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub shared: SharedParameters,
    pub diseases: BTreeMap<DiseaseId, DiseaseOverrides>,
}

impl Scenario {
    /// The baseline scenario: default shared parameters and the [`default_catalog`].
    #[must_use]
    pub fn baseline() -> Self {
        Scenario {
            shared: SharedParameters::default(),
            diseases: default_catalog(),
        }
    }

    /// # Errors
    ///
    /// Returns `SimulationError::JsonError` if `json` is malformed or has unknown fields.
    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        let mut scenario: Scenario = serde_json::from_str(json)?;
        if scenario.diseases.is_empty() {
            debug!("scenario lists no diseases, using the default catalog");
            scenario.diseases = default_catalog();
        }
        Ok(scenario)
    }

    /// # Errors
    ///
    /// Returns `SimulationError::IoError` if the file cannot be read, or
    /// `SimulationError::JsonError` if it cannot be parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, SimulationError> {
        debug!("loading scenario from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Scenario::from_json_str(&contents)
    }

    /// # Errors
    ///
    /// Returns the first invalid parameter, scoped by disease id.
    pub fn run(&self) -> Result<ScenarioResults, SimulationError> {
        simulate_many(&self.shared, &self.diseases)
    }

    /// # Errors
    ///
    /// Returns the first invalid parameter, scoped by disease id.
    pub fn run_parallel(&self) -> Result<ScenarioResults, SimulationError> {
        simulate_many_parallel(&self.shared, &self.diseases)
    }
}
