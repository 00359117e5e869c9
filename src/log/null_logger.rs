//! Stand-in used when the `logging` feature is disabled: no output, same public API.

use crate::error::SimulationError;
use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Only updates the `log` crate's max level; nothing is installed.
    pub(in crate::log) fn set_config(&mut self) -> Result<(), SimulationError> {
        log::set_max_level(self.global_log_level);
        Ok(())
    }
}
