//! Parameters of a single-disease simulation run.
//!
//! A [`SimulationParameters`] value is a complete, self-contained description of one run. It can
//! be built in code with [`SimulationParametersBuilder`], deserialized from JSON, or produced by
//! merging [`SharedParameters`](crate::disease::SharedParameters) with per-disease overrides.
//! Every field the builder leaves unset takes the value of the baseline chlamydia scenario.
use derive_builder::{Builder, UninitializedFieldError};
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

pub const DEFAULT_POPULATION_SIZE: u64 = 10_000;
pub const DEFAULT_INITIAL_INFECTED: u64 = 500;
pub const DEFAULT_CONTACT_RATE: f64 = 0.5;
pub const DEFAULT_TRANSMISSION_PROBABILITY: f64 = 0.05;
/// One over the mean duration of infection (14 days).
pub const DEFAULT_RECOVERY_RATE: f64 = 1.0 / 14.0;
pub const DEFAULT_INTERVENTION_EFFICACY: f64 = 0.85;
pub const DEFAULT_INTERVENTION_COVERAGE: f64 = 0.5;
pub const DEFAULT_INTERVENTION_ADHERENCE: f64 = 0.8;
pub const DEFAULT_EXTERNAL_REINFECTION_RATE: f64 = 0.0;
pub const DEFAULT_DURATION_DAYS: usize = 365;

/// The smallest run that contains at least one transition.
pub const MIN_DURATION_DAYS: usize = 2;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[builder(build_fn(error = "SimulationError"))]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParameters {
    /// Size of the closed population.
    #[builder(default = "DEFAULT_POPULATION_SIZE")]
    pub population_size: u64,

    #[builder(default = "DEFAULT_INITIAL_INFECTED")]
    pub initial_infected: u64,

    /// Contacts per person per day.
    #[builder(default = "DEFAULT_CONTACT_RATE")]
    pub contact_rate: f64,

    /// Per-contact probability of transmission.
    #[builder(default = "DEFAULT_TRANSMISSION_PROBABILITY")]
    pub transmission_probability: f64,

    /// Fraction of the infected compartment recovering per day.
    #[builder(default = "DEFAULT_RECOVERY_RATE")]
    pub recovery_rate: f64,

    #[builder(default = "DEFAULT_INTERVENTION_EFFICACY")]
    pub intervention_efficacy: f64,

    #[builder(default = "DEFAULT_INTERVENTION_COVERAGE")]
    pub intervention_coverage: f64,

    #[builder(default = "DEFAULT_INTERVENTION_ADHERENCE")]
    pub intervention_adherence: f64,

    /// Constant number of new infections per day coming from outside the population.
    #[builder(default = "DEFAULT_EXTERNAL_REINFECTION_RATE")]
    pub external_reinfection_rate: f64,

    #[builder(default = "DEFAULT_DURATION_DAYS")]
    pub duration_days: usize,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            population_size: DEFAULT_POPULATION_SIZE,
            initial_infected: DEFAULT_INITIAL_INFECTED,
            contact_rate: DEFAULT_CONTACT_RATE,
            transmission_probability: DEFAULT_TRANSMISSION_PROBABILITY,
            recovery_rate: DEFAULT_RECOVERY_RATE,
            intervention_efficacy: DEFAULT_INTERVENTION_EFFICACY,
            intervention_coverage: DEFAULT_INTERVENTION_COVERAGE,
            intervention_adherence: DEFAULT_INTERVENTION_ADHERENCE,
            external_reinfection_rate: DEFAULT_EXTERNAL_REINFECTION_RATE,
            duration_days: DEFAULT_DURATION_DAYS,
        }
    }
}

impl From<UninitializedFieldError> for SimulationError {
    fn from(error: UninitializedFieldError) -> Self {
        SimulationError::invalid_parameter(error.field_name(), "must be set")
    }
}

impl SimulationParameters {
    /// Checks every field against its admissible range, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.population_size == 0 {
            return Err(SimulationError::invalid_parameter(
                "population_size",
                "must be positive",
            ));
        }
        if self.initial_infected > self.population_size {
            return Err(SimulationError::invalid_parameter(
                "initial_infected",
                format!(
                    "{} exceeds population_size {}",
                    self.initial_infected, self.population_size
                ),
            ));
        }
        check_non_negative("contact_rate", self.contact_rate)?;
        check_fraction("transmission_probability", self.transmission_probability)?;
        check_positive("recovery_rate", self.recovery_rate)?;
        check_fraction("intervention_efficacy", self.intervention_efficacy)?;
        check_fraction("intervention_coverage", self.intervention_coverage)?;
        check_fraction("intervention_adherence", self.intervention_adherence)?;
        check_non_negative("external_reinfection_rate", self.external_reinfection_rate)?;
        if self.duration_days < MIN_DURATION_DAYS {
            return Err(SimulationError::invalid_parameter(
                "duration_days",
                format!(
                    "must be at least {MIN_DURATION_DAYS}, got {}",
                    self.duration_days
                ),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn initial_susceptible(&self) -> u64 {
        self.population_size.saturating_sub(self.initial_infected)
    }

    /// Fraction of per-contact risk removed by the intervention.
    #[must_use]
    pub fn intervention_protection(&self) -> f64 {
        self.intervention_efficacy * self.intervention_coverage * self.intervention_adherence
    }
}

fn check_finite(field: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(
            field,
            format!("must be finite, got {value}"),
        ))
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), SimulationError> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(SimulationError::invalid_parameter(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

fn check_positive(field: &str, value: f64) -> Result<(), SimulationError> {
    check_finite(field, value)?;
    if value <= 0.0 {
        return Err(SimulationError::invalid_parameter(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

fn check_fraction(field: &str, value: f64) -> Result<(), SimulationError> {
    check_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::invalid_parameter(
            field,
            format!("must be in [0, 1], got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(params: &SimulationParameters) -> String {
        params
            .validate()
            .unwrap_err()
            .field()
            .expect("expected an InvalidParameter error")
            .to_string()
    }

    #[test]
    fn defaults_are_valid() {
        let params = SimulationParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(SimulationParametersBuilder::default().build().unwrap(), params);
    }

    #[test]
    fn builder_overrides_single_field() {
        let params = SimulationParametersBuilder::default()
            .transmission_probability(0.04)
            .build()
            .unwrap();
        assert_eq!(params.transmission_probability, 0.04);
        assert_eq!(params.population_size, DEFAULT_POPULATION_SIZE);
    }

    #[test]
    fn initial_infected_above_population() {
        let params = SimulationParameters {
            population_size: 100,
            initial_infected: 101,
            ..SimulationParameters::default()
        };
        assert_eq!(field_of(&params), "initial_infected");
    }

    #[test]
    fn initial_infected_equal_to_population_is_valid() {
        let params = SimulationParameters {
            population_size: 100,
            initial_infected: 100,
            ..SimulationParameters::default()
        };
        assert!(params.validate().is_ok());
        assert_eq!(params.initial_susceptible(), 0);
    }

    #[test]
    fn zero_population() {
        let params = SimulationParameters {
            population_size: 0,
            initial_infected: 0,
            ..SimulationParameters::default()
        };
        assert_eq!(field_of(&params), "population_size");
    }

    #[test]
    fn fractions_out_of_range() {
        let base = SimulationParameters::default();
        let cases = [
            (
                SimulationParameters {
                    transmission_probability: 1.5,
                    ..base.clone()
                },
                "transmission_probability",
            ),
            (
                SimulationParameters {
                    intervention_efficacy: -0.1,
                    ..base.clone()
                },
                "intervention_efficacy",
            ),
            (
                SimulationParameters {
                    intervention_coverage: 1.01,
                    ..base.clone()
                },
                "intervention_coverage",
            ),
            (
                SimulationParameters {
                    intervention_adherence: f64::NAN,
                    ..base.clone()
                },
                "intervention_adherence",
            ),
        ];
        for (params, field) in cases {
            assert_eq!(field_of(&params), field);
        }
    }

    #[test]
    fn rates_out_of_range() {
        let base = SimulationParameters::default();
        let params = SimulationParameters {
            contact_rate: -1.0,
            ..base.clone()
        };
        assert_eq!(field_of(&params), "contact_rate");

        let params = SimulationParameters {
            recovery_rate: 0.0,
            ..base.clone()
        };
        assert_eq!(field_of(&params), "recovery_rate");

        let params = SimulationParameters {
            external_reinfection_rate: f64::INFINITY,
            ..base
        };
        assert_eq!(field_of(&params), "external_reinfection_rate");
    }

    #[test]
    fn duration_too_short() {
        let params = SimulationParameters {
            duration_days: 1,
            ..SimulationParameters::default()
        };
        assert_eq!(field_of(&params), "duration_days");

        let params = SimulationParameters {
            duration_days: MIN_DURATION_DAYS,
            ..SimulationParameters::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn first_offending_field_is_reported() {
        let params = SimulationParameters {
            contact_rate: -1.0,
            duration_days: 0,
            ..SimulationParameters::default()
        };
        assert_eq!(field_of(&params), "contact_rate");
    }

    #[test]
    fn deserialize_fills_missing_fields_with_defaults() {
        let params: SimulationParameters =
            serde_json::from_str(r#"{"population_size": 200, "initial_infected": 5}"#).unwrap();
        assert_eq!(params.population_size, 200);
        assert_eq!(params.initial_infected, 5);
        assert_eq!(params.recovery_rate, DEFAULT_RECOVERY_RATE);
    }

    #[test]
    fn deserialize_rejects_unknown_fields() {
        let result: Result<SimulationParameters, _> =
            serde_json::from_str(r#"{"beta": 0.3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn intervention_protection_is_product() {
        let params = SimulationParameters::default();
        assert!((params.intervention_protection() - 0.34).abs() < 1e-12);
    }
}
