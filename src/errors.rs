// Error types for relay-advisor

use snafu::Snafu;
use std::io;

use crate::dataset::SettingId;

#[derive(Debug, Snafu)]
pub enum AdvisorError {
    // Errors while loading the simulation and parameter databases
    #[snafu(display("Unable to read dataset {path}"))]
    DatasetOpen { path: String, source: csv::Error },
    #[snafu(display("Malformed {table} table at row {row}: {reason}"))]
    MalformedDataset {
        table: String,
        row: usize,
        reason: String,
    },
    #[snafu(display(
        "Simulation tables are not aligned: {features} feature rows but {metrics} metric rows"
    ))]
    DatasetMisaligned { features: usize, metrics: usize },

    // Errors raised inside the recommendation pipeline
    #[snafu(display("Missing BAC/FNR/FPR metrics for setting {setting_id} in scenario row {row}"))]
    MissingMetric { setting_id: SettingId, row: usize },

    // User input validation errors
    #[snafu(display("Inconsistent scenario description: {issues}"))]
    InconsistentQuery { issues: String },
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Batch mode and output errors
    #[snafu(display("Error loading query file"))]
    QueryLoaderError { source: io::Error },
    #[snafu(display("Error writing recommendations file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing recommendation"))]
    OutputSerializeError { source: serde_json::Error },
}
