use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info, warn};
use serde::Deserialize;

use super::{FeatureCodes, MetricsRecord, ScenarioRecord, SettingId, SettingMetrics, SettingParameters};
use crate::errors::AdvisorError;
use crate::scenario::CategoryCode;

const PARAMETERS_TABLE: &str = "parameter";
const FEATURES_TABLE: &str = "feature";
const METRICS_TABLE: &str = "metrics";

/// Name column of the metrics table.
const SCENARIO_NAME_COLUMN: &str = "NomeCenario";
/// Marker some exports put in front of setting ids (e.g. "#38").
const SETTING_ID_MARKER: char = '#';
/// Positional columns of the feature table: name, capacity, voltage, inertia, then six codes.
const FEATURE_COLUMN_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
struct ParameterRow {
    #[serde(rename = "Ajustes")]
    raw_id: String,
    #[serde(rename = "DF_th", default)]
    rocof_threshold: Option<String>,
    #[serde(rename = "TD", default)]
    time_delay: Option<String>,
    #[serde(rename = "Vblock", default)]
    blocking_voltage: Option<String>,
    #[serde(rename = "tdropout", default)]
    dropout: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    Bac,
    Fnr,
    Fpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricsColumn {
    ScenarioName,
    Metric(MetricKind, SettingId),
    Ignored,
}

/// Load the parameter table, keyed by setting id.
///
/// Rows whose id does not parse to a positive integer (after dropping the `#`
/// marker) are skipped. When an id appears twice the first row wins.
pub fn load_parameter_table(
    path: &Path,
) -> Result<BTreeMap<SettingId, SettingParameters>, AdvisorError> {
    let mut reader = open(path)?;
    let mut parameters = BTreeMap::new();

    for (row, result) in reader.deserialize::<ParameterRow>().enumerate() {
        let raw = result.map_err(|e| AdvisorError::DatasetOpen {
            path: path.display().to_string(),
            source: e,
        })?;

        let Some(setting_id) = parse_setting_id(&raw.raw_id) else {
            warn!(
                "Skipping parameter row {} with unparsable setting id {:?}",
                row + 1,
                raw.raw_id
            );
            continue;
        };

        let rocof_threshold_hz_s = required_number(PARAMETERS_TABLE, row, "DF_th", &raw.rocof_threshold)?;
        let time_delay_s = required_number(PARAMETERS_TABLE, row, "TD", &raw.time_delay)?;
        let blocking_voltage_pu = optional_number(PARAMETERS_TABLE, row, "Vblock", &raw.blocking_voltage)?;
        let dropout_time_s = optional_number(PARAMETERS_TABLE, row, "tdropout", &raw.dropout)?;

        if parameters.contains_key(&setting_id) {
            warn!("Duplicate parameters for setting {}, keeping the first row", setting_id);
            continue;
        }
        parameters.insert(
            setting_id,
            SettingParameters {
                setting_id,
                rocof_threshold_hz_s,
                time_delay_s,
                blocking_voltage_pu,
                dropout_time_s,
            },
        );
    }

    info!("Loaded {:?}, found {} settings", path, parameters.len());
    Ok(parameters)
}

/// Load the simulation feature and metrics tables. Row `i` of one table
/// describes the same scenario as row `i` of the other.
pub fn load_simulation_tables(
    features_path: &Path,
    metrics_path: &Path,
) -> Result<(Vec<ScenarioRecord>, Vec<MetricsRecord>), AdvisorError> {
    let scenarios = load_feature_table(features_path)?;
    let metrics = load_metrics_table(metrics_path)?;

    if scenarios.len() != metrics.len() {
        return Err(AdvisorError::DatasetMisaligned {
            features: scenarios.len(),
            metrics: metrics.len(),
        });
    }

    info!(
        "Loaded {:?} and {:?}, found {} simulated scenarios",
        features_path,
        metrics_path,
        scenarios.len()
    );
    Ok((scenarios, metrics))
}

fn load_feature_table(path: &Path) -> Result<Vec<ScenarioRecord>, AdvisorError> {
    let mut reader = open(path)?;
    let mut scenarios = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = read_record(path, result)?;
        if record.len() < FEATURE_COLUMN_COUNT {
            return Err(AdvisorError::MalformedDataset {
                table: FEATURES_TABLE.to_string(),
                row: row + 1,
                reason: format!(
                    "expected {} columns, found {}",
                    FEATURE_COLUMN_COUNT,
                    record.len()
                ),
            });
        }

        let features = FeatureCodes {
            generator_type: parse_code(row, "generator type", &record[4])?,
            voltage_blocking: parse_code(row, "voltage blocking", &record[5])?,
            supportability: parse_code(row, "supportability", &record[6])?,
            technique: parse_code(row, "active technique", &record[7])?,
            curve: parse_code(row, "regulation curve", &record[8])?,
            scenario: parse_code(row, "generation scenario", &record[9])?,
        };

        scenarios.push(ScenarioRecord::from_raw(
            row,
            record[0].trim(),
            cell_number(FEATURES_TABLE, row, "capacity", &record[1])?,
            cell_number(FEATURES_TABLE, row, "voltage", &record[2])?,
            cell_number(FEATURES_TABLE, row, "inertia", &record[3])?,
            features,
        ));
    }

    Ok(scenarios)
}

fn load_metrics_table(path: &Path) -> Result<Vec<MetricsRecord>, AdvisorError> {
    let mut reader = open(path)?;
    let columns: Vec<MetricsColumn> = reader
        .headers()
        .map_err(|e| AdvisorError::DatasetOpen {
            path: path.display().to_string(),
            source: e,
        })?
        .iter()
        .map(classify_metrics_header)
        .collect();

    if !columns.contains(&MetricsColumn::ScenarioName) {
        return Err(AdvisorError::MalformedDataset {
            table: METRICS_TABLE.to_string(),
            row: 0,
            reason: format!("missing {} column", SCENARIO_NAME_COLUMN),
        });
    }
    debug!(
        "Metrics table {:?} has {} metric columns",
        path,
        columns
            .iter()
            .filter(|c| matches!(c, MetricsColumn::Metric(..)))
            .count()
    );

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = read_record(path, result)?;
        let mut scenario_name = String::new();
        let mut partial: HashMap<SettingId, [Option<f64>; 3]> = HashMap::new();

        for (column, value) in columns.iter().zip(record.iter()) {
            match column {
                MetricsColumn::ScenarioName => scenario_name = value.trim().to_string(),
                MetricsColumn::Metric(kind, setting_id) => {
                    let value = cell_number(METRICS_TABLE, row, "metric", value)?;
                    let slot = match kind {
                        MetricKind::Bac => 0,
                        MetricKind::Fnr => 1,
                        MetricKind::Fpr => 2,
                    };
                    partial.entry(*setting_id).or_default()[slot] = Some(value);
                }
                MetricsColumn::Ignored => {}
            }
        }

        let settings = partial
            .into_iter()
            .filter_map(|(setting_id, triple)| match triple {
                [Some(bac), Some(fnr), Some(fpr)] => {
                    Some((setting_id, SettingMetrics { bac, fnr, fpr }))
                }
                _ => None,
            })
            .collect();

        records.push(MetricsRecord {
            scenario_name,
            settings,
        });
    }

    Ok(records)
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, AdvisorError> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AdvisorError::DatasetOpen {
            path: path.display().to_string(),
            source: e,
        })
}

fn read_record(
    path: &Path,
    result: Result<StringRecord, csv::Error>,
) -> Result<StringRecord, AdvisorError> {
    result.map_err(|e| AdvisorError::DatasetOpen {
        path: path.display().to_string(),
        source: e,
    })
}

fn classify_metrics_header(header: &str) -> MetricsColumn {
    let header = header.trim();
    if header == SCENARIO_NAME_COLUMN {
        return MetricsColumn::ScenarioName;
    }
    for (prefix, kind) in [
        ("BAC_Ajuste_", MetricKind::Bac),
        ("FNR_Ajuste_", MetricKind::Fnr),
        ("FPR_Ajuste_", MetricKind::Fpr),
    ] {
        if let Some(Ok(setting_id)) = header.strip_prefix(prefix).map(str::parse::<SettingId>) {
            return MetricsColumn::Metric(kind, setting_id);
        }
    }
    MetricsColumn::Ignored
}

/// Strip the id marker and parse the remaining text as a positive integer.
/// Integral floats ("38.0") are accepted, as spreadsheet exports produce them.
pub(crate) fn parse_setting_id(raw: &str) -> Option<SettingId> {
    let cleaned = raw.replace(SETTING_ID_MARKER, "");
    let cleaned = cleaned.trim();
    if let Ok(id) = cleaned.parse::<SettingId>() {
        return (id > 0).then_some(id);
    }
    let value = cleaned.parse::<f64>().ok()?;
    if value.fract() == 0.0 && value >= 1.0 && value <= SettingId::MAX as f64 {
        Some(value as SettingId)
    } else {
        None
    }
}

/// Numeric cell of a simulation table; an empty cell is a missing value (NaN).
fn cell_number(table: &str, row: usize, field: &str, raw: &str) -> Result<f64, AdvisorError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|_| AdvisorError::MalformedDataset {
            table: table.to_string(),
            row: row + 1,
            reason: format!("{} value {:?} is not a number", field, raw),
        })
}

fn optional_number(
    table: &str,
    row: usize,
    field: &str,
    raw: &Option<String>,
) -> Result<Option<f64>, AdvisorError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => cell_number(table, row, field, value).map(Some),
    }
}

fn required_number(
    table: &str,
    row: usize,
    field: &str,
    raw: &Option<String>,
) -> Result<f64, AdvisorError> {
    optional_number(table, row, field, raw)?.ok_or_else(|| AdvisorError::MalformedDataset {
        table: table.to_string(),
        row: row + 1,
        reason: format!("missing {} value", field),
    })
}

fn parse_code(row: usize, field: &str, raw: &str) -> Result<CategoryCode, AdvisorError> {
    let value = cell_number(FEATURES_TABLE, row, field, raw)?;
    if value.is_finite() && value.fract() == 0.0 {
        Ok(value as CategoryCode)
    } else {
        Err(AdvisorError::MalformedDataset {
            table: FEATURES_TABLE.to_string(),
            row: row + 1,
            reason: format!("{} code {:?} is not an integer", field, raw.trim()),
        })
    }
}
