//! A deterministic model of sexually transmitted infections under DoxyPEP
//!
//! doxysim advances a closed population's susceptible and infected compartments one day at a
//! time. Transmission is mass-action, scaled down by doxycycline post-exposure prophylaxis
//! (DoxyPEP) as an independent multiplicative risk reduction:
//!
//! ```text
//! beta = contact_rate * transmission_probability / N * (1 - efficacy * coverage * adherence)
//! ```
//!
//! Infected people recover at a constant daily rate, and an optional constant number of
//! infections per day arrives from outside the population. There is no randomness: the same
//! parameters always produce the same series.
//!
//! The crate is organized around a few pieces:
//! * [`simulator`] holds the recurrence itself and its output, [`CompartmentSeries`].
//! * [`parameters`] defines and validates the inputs of a single run.
//! * [`disease`] runs several diseases that share population-level parameters.
//! * [`scenario`] loads multi-disease runs from JSON files.
//! * [`report`] writes results to CSV.
//! * [`runner`] is the command line front end used by the `doxysim` binary.
//!
//! ```rust
//! use doxysim::prelude::*;
//!
//! let params = SimulationParametersBuilder::default()
//!     .external_reinfection_rate(0.5)
//!     .build()
//!     .unwrap();
//! let series = simulate(&params).unwrap();
//! assert_eq!(series.infected()[0], 500.0);
//! ```
pub mod disease;
pub mod error;
pub mod log;
mod macros;
pub mod numeric;
pub mod parameters;
pub mod prelude;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod simulator;

pub use disease::{simulate_many, DiseaseId, DiseaseOverrides, SharedParameters};
pub use error::SimulationError;
pub use parameters::SimulationParameters;
pub use simulator::{simulate, CompartmentSeries};
