//! Logging for doxysim. This is separate from _reports_: logs describe what the library is doing
//! (parameters resolved, diseases finished, clamping applied), reports hold model output.
//!
//! The five logging macros `error!`, `warn!`, `info!`, `debug!` and `trace!` are re-exported
//! from the `log` crate:
//!
//! ```rust
//! use doxysim::log::info;
//!
//! pub fn announce() {
//!     info!("Starting the syphilis run.");
//! }
//! ```
//!
//! Logging is _disabled_ by default. The `doxysim` binary enables it with `--log-level <level>`
//! or `-v`. From code, `set_log_level(level)` enables only log messages with priority at least
//! `level`, and `LevelFilter::Off` turns logging off again.
//!
//! Per-module filters are set with `set_module_filter()` / `set_module_filters()` and removed with
//! `remove_module_filter()`. Module paths are `::`-separated, e.g. `doxysim::simulator`:
//!
//! ```rust
//! use doxysim::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! set_log_level(LevelFilter::Info).unwrap();
//! // Report every clamping event.
//! set_module_filter("doxysim::simulator", LevelFilter::Trace).unwrap();
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::SimulationError;
#[cfg(feature = "logging")]
use log4rs::Handle;
use std::sync::LazyLock;
use std::sync::{Mutex, MutexGuard};

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A level filter applied to the messages of one module path (e.g. `"doxysim::disease"`).
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    /// The module path this configuration applies to
    #[cfg_attr(not(feature = "logging"), allow(dead_code))]
    module: String,
    /// The maximum log level for this module path
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Keeps track of the filter levels of modules and holds a handle to the global logger.
///
/// Loggers are installed globally, so only one instance of this struct exists. The public API
/// consists of free functions which lock the singleton and call the matching method.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// Level for modules without an explicit filter. `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,

    #[cfg(feature = "logging")]
    /// Handle to the `log4rs` logger.
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: HashMap::new(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    pub(in crate::log) fn set_log_level(
        &mut self,
        level: LevelFilter,
    ) -> Result<(), SimulationError> {
        self.global_log_level = level;
        self.set_config()
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                let module_config = entry.get_mut();
                if module_config.level == level {
                    return false;
                }
                module_config.level = level;
            }
            Entry::Vacant(entry) => {
                entry.insert((module, level).into());
            }
        }
        true
    }

    pub(in crate::log) fn set_module_filter(
        &mut self,
        module: &str,
        level: LevelFilter,
    ) -> Result<(), SimulationError> {
        check_module_path(module)?;
        if self.insert_module_filter(module, level) {
            self.set_config()?;
        }
        Ok(())
    }

    /// Either every filter is installed or, if any module path is malformed, none are.
    pub(in crate::log) fn set_module_filters<S: ToString>(
        &mut self,
        module_filters: &[(&S, LevelFilter)],
    ) -> Result<(), SimulationError> {
        let modules: Vec<(String, LevelFilter)> = module_filters
            .iter()
            .map(|(module, level)| (module.to_string(), *level))
            .collect();
        for (module, _) in &modules {
            check_module_path(module)?;
        }
        let mut mutated: bool = false;
        for (module, level) in &modules {
            mutated |= self.insert_module_filter(module, *level);
        }
        if mutated {
            self.set_config()?;
        }
        Ok(())
    }

    pub(in crate::log) fn remove_module_filter(
        &mut self,
        module: &str,
    ) -> Result<(), SimulationError> {
        if self.module_configurations.remove(module).is_some() {
            self.set_config()?;
        }
        Ok(())
    }
}

/// Rejects module paths the logger backend cannot key on: empty paths, empty segments and lone
/// or tripled colons. Only `::` may separate segments.
fn check_module_path(module: &str) -> Result<(), SimulationError> {
    if module.split("::").all(|part| !part.is_empty() && !part.contains(':')) {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(
            "log_level",
            format!("malformed module path `{module}`"),
        ))
    }
}

// The public API

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
///
/// # Errors
/// Returns `InvalidParameter("log_level")` if the logger backend rejects the configuration
pub fn set_log_level(level: LevelFilter) -> Result<(), SimulationError> {
    get_log_configuration().set_log_level(level)
}

/// Sets a level filter for the given module path.
///
/// # Errors
/// Returns `InvalidParameter("log_level")` if `module_path` is malformed
pub fn set_module_filter(
    module_path: &str,
    level_filter: LevelFilter,
) -> Result<(), SimulationError> {
    get_log_configuration().set_module_filter(module_path, level_filter)
}

/// Removes a module-specific level filter for the given module path. The global level filter will
/// apply to the module.
///
/// # Errors
/// Returns `InvalidParameter("log_level")` if the logger backend rejects the configuration
pub fn remove_module_filter(module_path: &str) -> Result<(), SimulationError> {
    get_log_configuration().remove_module_filter(module_path)
}

/// Sets the level filters for a set of modules. Use this instead of `set_module_filter()` to set
/// filters in bulk.
///
/// # Errors
/// Returns `InvalidParameter("log_level")` if any module path is malformed
pub fn set_module_filters<S: ToString>(
    module_filters: &[(&S, LevelFilter)],
) -> Result<(), SimulationError> {
    get_log_configuration().set_module_filters(module_filters)
}

/// A parsed `--log-level` argument.
#[derive(Debug, Default, PartialEq)]
pub struct LogLevelSpec {
    /// Set by a bare level, e.g. `info`.
    pub global: Option<LevelFilter>,
    /// Set by `module=level` entries, in the order given.
    pub modules: Vec<(String, LevelFilter)>,
}

impl FromStr for LogLevelSpec {
    type Err = SimulationError;

    /// Parses a comma separated list of `level` and `module=level` entries, e.g.
    /// `info,doxysim::simulator=trace`. Levels are case insensitive.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut parsed = LogLevelSpec::default();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((module, level)) => {
                    let module = module.trim();
                    check_module_path(module)?;
                    parsed.modules.push((module.to_string(), parse_level(level)?));
                }
                None => parsed.global = Some(parse_level(entry)?),
            }
        }
        Ok(parsed)
    }
}

impl LogLevelSpec {
    /// Installs the parsed filters. Module filters are announced on stdout.
    ///
    /// # Errors
    /// Returns `InvalidParameter("log_level")` if a filter cannot be installed
    pub fn apply(&self) -> Result<(), SimulationError> {
        if let Some(level) = self.global {
            set_log_level(level)?;
        }
        for (module, level) in &self.modules {
            set_module_filter(module, *level)?;
            println!("Logging enabled for {module} at level {level}");
        }
        Ok(())
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, SimulationError> {
    LevelFilter::from_str(level.trim()).map_err(|_| {
        SimulationError::invalid_parameter("log_level", format!("unknown level `{level}`"))
    })
}

/// Fetches a mutable reference to the global `LogConfiguration`.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::{
        get_log_configuration, remove_module_filter, set_log_level, set_module_filter,
        set_module_filters, LogLevelSpec,
    };
    use log::{error, trace, LevelFilter};
    use std::sync::{LazyLock, Mutex};

    // Force logging tests to run serially for consistent behavior.
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

    #[test]
    fn test_set_log_level() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Trace).unwrap();
        set_log_level(LevelFilter::Error).unwrap();
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Error);
            error!("test_set_log_level: global set to error");
            trace!("test_set_log_level: NOT EMITTED");
        }
        set_log_level(LevelFilter::Trace).unwrap();
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Trace);
            assert_eq!(log::max_level(), LevelFilter::Trace);
        }
        set_log_level(LevelFilter::Off).unwrap();
    }

    #[test]
    fn test_set_remove_module_filters() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        {
            let mut config = get_log_configuration();
            config.module_configurations.clear();
        }

        let filters: [(&&str, LevelFilter); 2] = [
            (&"doxysim::simulator", LevelFilter::Trace),
            (&"doxysim::disease", LevelFilter::Info),
        ];
        set_module_filters(&filters).unwrap();
        {
            let config = get_log_configuration();
            assert_eq!(config.module_configurations.len(), 2);
            for (module_path, level) in &filters {
                assert_eq!(
                    config.module_configurations.get(**module_path),
                    Some(&((**module_path, *level).into()))
                );
            }
        }

        remove_module_filter("doxysim::simulator").unwrap();
        {
            let config = get_log_configuration();
            assert_eq!(config.module_configurations.len(), 1);
            assert_eq!(
                config.module_configurations.get("doxysim::disease"),
                Some(&("doxysim::disease", LevelFilter::Info).into())
            );
        }
        remove_module_filter("doxysim::disease").unwrap();
        set_log_level(LevelFilter::Off).unwrap();
    }

    #[test]
    fn parse_bare_level() {
        let spec: LogLevelSpec = "Debug".parse().unwrap();
        assert_eq!(spec.global, Some(LevelFilter::Debug));
        assert!(spec.modules.is_empty());
    }

    #[test]
    fn parse_module_levels() {
        let spec: LogLevelSpec = "warn, doxysim::simulator=trace,doxysim::disease=INFO"
            .parse()
            .unwrap();
        assert_eq!(spec.global, Some(LevelFilter::Warn));
        assert_eq!(
            spec.modules,
            [
                ("doxysim::simulator".to_string(), LevelFilter::Trace),
                ("doxysim::disease".to_string(), LevelFilter::Info),
            ]
        );
    }

    #[test]
    fn malformed_module_paths_are_rejected() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        get_log_configuration().module_configurations.clear();
        for module in ["", "a:b", "doxysim:::simulator", "doxysim::", "::doxysim"] {
            let error = set_module_filter(module, LevelFilter::Info).unwrap_err();
            assert_eq!(error.field(), Some("log_level"));
        }
        let filters: [(&&str, LevelFilter); 2] = [
            (&"doxysim::disease", LevelFilter::Info),
            (&"a:b", LevelFilter::Info),
        ];
        assert!(set_module_filters(&filters).is_err());
        // Nothing was installed, and the configuration is still usable.
        assert!(get_log_configuration().module_configurations.is_empty());
        set_log_level(LevelFilter::Off).unwrap();
    }

    #[test]
    fn parse_malformed_module() {
        for spec in ["=info", "a:b=info", "info,doxysim:::simulator=trace"] {
            let error = spec.parse::<LogLevelSpec>().unwrap_err();
            assert_eq!(error.field(), Some("log_level"));
        }
    }

    #[test]
    fn parse_unknown_level() {
        let error = "doxysim=loud".parse::<LogLevelSpec>().unwrap_err();
        assert_eq!(error.field(), Some("log_level"));
    }
}
