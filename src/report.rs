//! CSV reports of scenario results.
//!
//! Two reports are available: the full time series in long format, one row per disease and day,
//! and a per-disease summary of infected counts at the start and end of the run.
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use log::info;
use serde::Serialize;

use crate::error::SimulationError;
use crate::scenario::ScenarioResults;

pub const SERIES_REPORT_NAME: &str = "series.csv";
pub const SUMMARY_REPORT_NAME: &str = "summary.csv";

#[derive(Serialize)]
struct SeriesRow<'a> {
    disease: &'a str,
    day: usize,
    susceptible: f64,
    infected: f64,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    disease: &'a str,
    initial_infected: u64,
    final_infected: u64,
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist.
fn create_report_file(path: &Path) -> Result<File, SimulationError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        }
        _ => Err(SimulationError::ScenarioError(format!(
            "report output files must be CSVs: {}",
            path.display()
        ))),
    }
}

/// Writes `disease,day,susceptible,infected` rows for every disease in `results`.
///
/// # Errors
///
/// Returns an error if `path` is not a `.csv` path or the file cannot be written.
pub fn write_series_report(path: &Path, results: &ScenarioResults) -> Result<(), SimulationError> {
    let mut writer = Writer::from_writer(create_report_file(path)?);
    for (id, series) in results {
        for day in series.days() {
            writer.serialize(SeriesRow {
                disease: id.as_str(),
                day: day.day,
                susceptible: day.susceptible,
                infected: day.infected,
            })?;
        }
    }
    writer.flush()?;
    info!("wrote series report to {}", path.display());
    Ok(())
}

/// Writes `disease,initial_infected,final_infected` rows for every disease in `results`.
///
/// # Errors
///
/// Returns an error if `path` is not a `.csv` path or the file cannot be written.
pub fn write_summary_report(
    path: &Path,
    results: &ScenarioResults,
) -> Result<(), SimulationError> {
    let mut writer = Writer::from_writer(create_report_file(path)?);
    for (id, series) in results {
        let summary = series.summary();
        writer.serialize(SummaryRow {
            disease: id.as_str(),
            initial_infected: summary.initial_infected,
            final_infected: summary.final_infected,
        })?;
    }
    writer.flush()?;
    info!("wrote summary report to {}", path.display());
    Ok(())
}

/// Writes both reports into `dir` under their default names.
///
/// # Errors
///
/// Returns an error if either report cannot be written.
pub fn write_reports(dir: &Path, results: &ScenarioResults) -> Result<(), SimulationError> {
    write_series_report(&dir.join(SERIES_REPORT_NAME), results)?;
    write_summary_report(&dir.join(SUMMARY_REPORT_NAME), results)
}

/// Formats the summary as a fixed-width table, one line per disease.
#[must_use]
pub fn summary_table(results: &ScenarioResults) -> String {
    let width = results
        .keys()
        .map(|id| id.as_str().len())
        .chain(std::iter::once("disease".len()))
        .max()
        .unwrap_or(0);
    let mut table = format!("{:<width$}  {:>8}  {:>8}\n", "disease", "initial", "final");
    for (id, series) in results {
        let summary = series.summary();
        table.push_str(&format!(
            "{:<width$}  {:>8}  {:>8}\n",
            id.as_str(),
            summary.initial_infected,
            summary.final_infected
        ));
    }
    table
}
