//! The day-stepped susceptible/infected recurrence.
//!
//! [`simulate`] advances two compartments one day at a time with an explicit (forward Euler)
//! update:
//!
//! ```text
//! new_infections = beta * S[i-1] * I[i-1] + external_reinfection_rate
//! recoveries     = recovery_rate * I[i-1]
//! S[i]           = max(0, S[i-1] - new_infections + recoveries)
//! I[i]           = max(0, I[i-1] + new_infections - recoveries)
//! ```
//!
//! where `beta` is the [`effective_transmission_rate`]. The total `S + I` is unchanged by a step
//! unless one of the compartments is floored at zero. Flooring is part of the model and is not
//! compensated for, so runs that clamp do not conserve population. Steps that overflow are
//! saturated at `f64::MAX` (a NaN step becomes zero), so every value in a series is finite.
use log::{debug, trace};
use serde::Serialize;

use crate::error::SimulationError;
use crate::numeric::clamp_nonnegative;
use crate::parameters::SimulationParameters;

/// Mass-action transmission rate per susceptible-infected pair per day, scaled down by the
/// fraction of contacts protected by the intervention.
#[must_use]
pub fn effective_transmission_rate(params: &SimulationParameters) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let population = params.population_size as f64;
    let beta = params.contact_rate * params.transmission_probability / population;
    beta * (1.0 - params.intervention_protection())
}

/// Compartment sizes indexed by day.
#[derive(Clone, Debug, PartialEq)]
pub struct CompartmentSeries {
    susceptible: Vec<f64>,
    infected: Vec<f64>,
}

/// One row of a [`CompartmentSeries`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DayState {
    pub day: usize,
    pub susceptible: f64,
    pub infected: f64,
}

/// Infected counts at the start and end of a run, truncated to whole people.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SeriesSummary {
    pub initial_infected: u64,
    pub final_infected: u64,
}

impl CompartmentSeries {
    #[must_use]
    pub fn susceptible(&self) -> &[f64] {
        &self.susceptible
    }

    #[must_use]
    pub fn infected(&self) -> &[f64] {
        &self.infected
    }

    /// Number of simulated days, including day 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infected.is_empty()
    }

    #[must_use]
    pub fn final_infected(&self) -> Option<f64> {
        self.infected.last().copied()
    }

    pub fn days(&self) -> impl Iterator<Item = DayState> + '_ {
        self.susceptible
            .iter()
            .zip(&self.infected)
            .enumerate()
            .map(|(day, (&susceptible, &infected))| DayState {
                day,
                susceptible,
                infected,
            })
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn summary(&self) -> SeriesSummary {
        let first = self.infected.first().copied().unwrap_or(0.0);
        let last = self.final_infected().unwrap_or(0.0);
        SeriesSummary {
            initial_infected: first as u64,
            final_infected: last as u64,
        }
    }
}

/// Runs the recurrence for `params.duration_days` days.
///
/// # Errors
///
/// Returns `SimulationError::InvalidParameter` if `params` fails validation. Nothing is
/// allocated in that case.
pub fn simulate(params: &SimulationParameters) -> Result<CompartmentSeries, SimulationError> {
    params.validate()?;

    let beta = effective_transmission_rate(params);
    debug!(
        "simulating {} days: N={}, I0={}, beta={beta:e}, gamma={}, external={}",
        params.duration_days,
        params.population_size,
        params.initial_infected,
        params.recovery_rate,
        params.external_reinfection_rate
    );

    #[allow(clippy::cast_precision_loss)]
    let mut s = params.initial_susceptible() as f64;
    #[allow(clippy::cast_precision_loss)]
    let mut i = params.initial_infected as f64;

    let days = params.duration_days;
    let mut susceptible = Vec::with_capacity(days);
    let mut infected = Vec::with_capacity(days);
    susceptible.push(s);
    infected.push(i);

    for day in 1..days {
        let new_infections = beta * s * i + params.external_reinfection_rate;
        let recoveries = params.recovery_rate * i;

        let next_s = s - new_infections + recoveries;
        let next_i = i + new_infections - recoveries;
        s = clamp_nonnegative(next_s);
        i = clamp_nonnegative(next_i);
        // NaN never compares equal, so overflowed steps are reported too.
        if s != next_s || i != next_i {
            trace!("day {day}: clamping S={next_s} I={next_i}");
        }

        susceptible.push(s);
        infected.push(i);
    }

    Ok(CompartmentSeries {
        susceptible,
        infected,
    })
}
