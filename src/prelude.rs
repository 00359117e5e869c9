pub use crate::disease::{
    default_catalog, simulate_many, simulate_many_parallel, DiseaseId, DiseaseOverrides,
    SharedParameters, SharedParametersBuilder,
};
pub use crate::error::SimulationError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::parameters::{SimulationParameters, SimulationParametersBuilder};
pub use crate::scenario::{Scenario, ScenarioResults};
pub use crate::simulator::{
    effective_transmission_rate, simulate, CompartmentSeries, DayState, SeriesSummary,
};
