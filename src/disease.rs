//! Multi-disease runs.
//!
//! Each disease is simulated independently from the same [`SharedParameters`] combined with its
//! own [`DiseaseOverrides`]. There is no co-infection coupling, so the order in which diseases are
//! run does not matter and [`simulate_many_parallel`] returns exactly what [`simulate_many`] does.
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::thread;

use derive_builder::Builder;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::parameters::{
    SimulationParameters, DEFAULT_CONTACT_RATE, DEFAULT_DURATION_DAYS,
    DEFAULT_EXTERNAL_REINFECTION_RATE, DEFAULT_INITIAL_INFECTED, DEFAULT_INTERVENTION_ADHERENCE,
    DEFAULT_INTERVENTION_COVERAGE, DEFAULT_POPULATION_SIZE, DEFAULT_RECOVERY_RATE,
};
use crate::simulator::{simulate, CompartmentSeries};

/// Identifies a disease in a multi-disease run, e.g. `"chlamydia"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiseaseId(String);

impl DiseaseId {
    pub fn new(id: impl Into<String>) -> Self {
        DiseaseId(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DiseaseId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DiseaseId {
    fn from(id: &str) -> Self {
        DiseaseId::new(id)
    }
}

/// Parameters common to every disease in a run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[builder(build_fn(error = "SimulationError"))]
#[serde(default, deny_unknown_fields)]
pub struct SharedParameters {
    #[builder(default = "DEFAULT_POPULATION_SIZE")]
    pub population_size: u64,

    #[builder(default = "DEFAULT_INITIAL_INFECTED")]
    pub initial_infected: u64,

    #[builder(default = "DEFAULT_CONTACT_RATE")]
    pub contact_rate: f64,

    #[builder(default = "DEFAULT_RECOVERY_RATE")]
    pub recovery_rate: f64,

    #[builder(default = "DEFAULT_INTERVENTION_COVERAGE")]
    pub intervention_coverage: f64,

    #[builder(default = "DEFAULT_INTERVENTION_ADHERENCE")]
    pub intervention_adherence: f64,

    #[builder(default = "DEFAULT_DURATION_DAYS")]
    pub duration_days: usize,
}

impl Default for SharedParameters {
    fn default() -> Self {
        SharedParameters {
            population_size: DEFAULT_POPULATION_SIZE,
            initial_infected: DEFAULT_INITIAL_INFECTED,
            contact_rate: DEFAULT_CONTACT_RATE,
            recovery_rate: DEFAULT_RECOVERY_RATE,
            intervention_coverage: DEFAULT_INTERVENTION_COVERAGE,
            intervention_adherence: DEFAULT_INTERVENTION_ADHERENCE,
            duration_days: DEFAULT_DURATION_DAYS,
        }
    }
}

/// The disease-specific part of a parameter set.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DiseaseOverrides {
    pub transmission_probability: f64,
    pub intervention_efficacy: f64,
    #[serde(default)]
    pub external_reinfection_rate: f64,
}

impl DiseaseOverrides {
    #[must_use]
    pub fn new(transmission_probability: f64, intervention_efficacy: f64) -> Self {
        DiseaseOverrides {
            transmission_probability,
            intervention_efficacy,
            external_reinfection_rate: DEFAULT_EXTERNAL_REINFECTION_RATE,
        }
    }

    #[must_use]
    pub fn with_external_reinfection_rate(mut self, rate: f64) -> Self {
        self.external_reinfection_rate = rate;
        self
    }
}

impl SharedParameters {
    /// Combines the shared parameters with one disease's overrides.
    #[must_use]
    pub fn with_overrides(&self, overrides: &DiseaseOverrides) -> SimulationParameters {
        SimulationParameters {
            population_size: self.population_size,
            initial_infected: self.initial_infected,
            contact_rate: self.contact_rate,
            transmission_probability: overrides.transmission_probability,
            recovery_rate: self.recovery_rate,
            intervention_efficacy: overrides.intervention_efficacy,
            intervention_coverage: self.intervention_coverage,
            intervention_adherence: self.intervention_adherence,
            external_reinfection_rate: overrides.external_reinfection_rate,
            duration_days: self.duration_days,
        }
    }
}

/// The three infections of the baseline DoxyPEP scenario.
#[must_use]
pub fn default_catalog() -> BTreeMap<DiseaseId, DiseaseOverrides> {
    BTreeMap::from([
        (
            DiseaseId::from("chlamydia"),
            DiseaseOverrides::new(0.05, 0.85).with_external_reinfection_rate(0.5),
        ),
        (
            DiseaseId::from("syphilis"),
            DiseaseOverrides::new(0.04, 0.80).with_external_reinfection_rate(0.2),
        ),
        (
            DiseaseId::from("gonorrhea"),
            DiseaseOverrides::new(0.06, 0.50).with_external_reinfection_rate(0.4),
        ),
    ])
}

/// Merges and validates every disease's parameters up front, so a bad disease aborts the run
/// before anything is simulated.
fn resolve(
    shared: &SharedParameters,
    per_disease: &BTreeMap<DiseaseId, DiseaseOverrides>,
) -> Result<Vec<(DiseaseId, SimulationParameters)>, SimulationError> {
    per_disease
        .iter()
        .map(|(id, overrides)| {
            let params = shared.with_overrides(overrides);
            params.validate().map_err(|e| e.scoped(id.as_str()))?;
            Ok((id.clone(), params))
        })
        .collect()
}

/// Simulates each disease in turn.
///
/// # Errors
///
/// Returns the first `InvalidParameter` error, with its field prefixed by the disease id.
pub fn simulate_many(
    shared: &SharedParameters,
    per_disease: &BTreeMap<DiseaseId, DiseaseOverrides>,
) -> Result<BTreeMap<DiseaseId, CompartmentSeries>, SimulationError> {
    let mut results = BTreeMap::new();
    for (id, params) in resolve(shared, per_disease)? {
        let series = simulate(&params)?;
        info!("{id}: {:?}", series.summary());
        results.insert(id, series);
    }
    Ok(results)
}

/// Like [`simulate_many`], but runs each disease on its own scoped thread.
///
/// # Errors
///
/// Returns the first `InvalidParameter` error, with its field prefixed by the disease id.
pub fn simulate_many_parallel(
    shared: &SharedParameters,
    per_disease: &BTreeMap<DiseaseId, DiseaseOverrides>,
) -> Result<BTreeMap<DiseaseId, CompartmentSeries>, SimulationError> {
    let resolved = resolve(shared, per_disease)?;

    let outcomes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = resolved
            .iter()
            .map(|(id, params)| (id, scope.spawn(move || simulate(params))))
            .collect();
        handles
            .into_iter()
            .map(|(id, handle)| match handle.join() {
                Ok(outcome) => (id.clone(), outcome),
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut results = BTreeMap::new();
    for (id, outcome) in outcomes {
        let series = outcome?;
        info!("{id}: {:?}", series.summary());
        results.insert(id, series);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SeriesSummary;

    #[test]
    fn default_catalog_summaries() {
        let results = simulate_many(&SharedParameters::default(), &default_catalog()).unwrap();
        let keys: Vec<&str> = results.keys().map(DiseaseId::as_str).collect();
        assert_eq!(keys, ["chlamydia", "gonorrhea", "syphilis"]);

        let expected = [("chlamydia", 9), ("gonorrhea", 8), ("syphilis", 3)];
        for (id, final_infected) in expected {
            assert_eq!(
                results[&DiseaseId::from(id)].summary(),
                SeriesSummary {
                    initial_infected: 500,
                    final_infected,
                }
            );
        }
    }

    #[test]
    fn matches_single_disease_runs() {
        let shared = SharedParameters::default();
        let catalog = default_catalog();
        let results = simulate_many(&shared, &catalog).unwrap();
        for (id, overrides) in &catalog {
            let single = simulate(&shared.with_overrides(overrides)).unwrap();
            assert_eq!(results[id], single);
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let shared = SharedParametersBuilder::default()
            .duration_days(1_000)
            .build()
            .unwrap();
        let catalog = default_catalog();
        assert_eq!(
            simulate_many(&shared, &catalog).unwrap(),
            simulate_many_parallel(&shared, &catalog).unwrap()
        );
    }

    #[test]
    fn invalid_disease_is_scoped() {
        let mut catalog = default_catalog();
        catalog.insert(DiseaseId::from("syphilis"), DiseaseOverrides::new(1.2, 0.8));
        for run in [simulate_many, simulate_many_parallel] {
            let error = run(&SharedParameters::default(), &catalog).unwrap_err();
            assert_eq!(error.field(), Some("syphilis.transmission_probability"));
        }
    }

    #[test]
    fn invalid_shared_parameter_names_first_disease() {
        let shared = SharedParameters {
            duration_days: 1,
            ..SharedParameters::default()
        };
        let error = simulate_many(&shared, &default_catalog()).unwrap_err();
        assert_eq!(error.field(), Some("chlamydia.duration_days"));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let results = simulate_many(&SharedParameters::default(), &BTreeMap::new()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn with_overrides_copies_every_field() {
        let shared = SharedParametersBuilder::default()
            .population_size(2_000)
            .initial_infected(20)
            .contact_rate(0.7)
            .recovery_rate(0.1)
            .intervention_coverage(0.25)
            .intervention_adherence(0.9)
            .duration_days(30)
            .build()
            .unwrap();
        let overrides = DiseaseOverrides::new(0.02, 0.6).with_external_reinfection_rate(0.3);
        assert_eq!(
            shared.with_overrides(&overrides),
            SimulationParameters {
                population_size: 2_000,
                initial_infected: 20,
                contact_rate: 0.7,
                transmission_probability: 0.02,
                recovery_rate: 0.1,
                intervention_efficacy: 0.6,
                intervention_coverage: 0.25,
                intervention_adherence: 0.9,
                external_reinfection_rate: 0.3,
                duration_days: 30,
            }
        );
    }

    #[test]
    fn overrides_external_rate_defaults_to_zero() {
        let overrides: DiseaseOverrides = serde_json::from_str(
            r#"{"transmission_probability": 0.05, "intervention_efficacy": 0.85}"#,
        )
        .unwrap();
        assert_eq!(overrides.external_reinfection_rate, 0.0);
    }
}
