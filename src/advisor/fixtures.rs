// Shared builders for advisor tests

use std::collections::{BTreeMap, HashMap};

use crate::dataset::{
    Datasets, FeatureCodes, MetricsRecord, ScenarioRecord, SettingId, SettingMetrics,
    SettingParameters,
};
use crate::scenario::UserQuery;

pub(crate) fn codes_for(query: &UserQuery) -> FeatureCodes {
    FeatureCodes {
        generator_type: query.generator_type.code(),
        voltage_blocking: query.voltage_blocking.code(),
        supportability: query.supportability.code(),
        technique: query.technique.code(),
        curve: query.curve.code(),
        scenario: query.scenario.code(),
    }
}

/// Scenario record from kW/kV values, stored the way the feature table stores them.
pub(crate) fn record(
    index: usize,
    capacity_kw: f64,
    voltage_kv: f64,
    inertia_s: f64,
    features: FeatureCodes,
) -> ScenarioRecord {
    ScenarioRecord::from_raw(
        index,
        format!("S{}", index),
        capacity_kw * 1000.0,
        voltage_kv * 1000.0,
        inertia_s,
        features,
    )
}

pub(crate) fn metrics_row(name: &str, values: &[(SettingId, f64, f64, f64)]) -> MetricsRecord {
    MetricsRecord {
        scenario_name: name.to_string(),
        settings: values
            .iter()
            .map(|(id, bac, fnr, fpr)| {
                (
                    *id,
                    SettingMetrics {
                        bac: *bac,
                        fnr: *fnr,
                        fpr: *fpr,
                    },
                )
            })
            .collect::<HashMap<_, _>>(),
    }
}

/// Metrics row giving every setting in `ids` the same values.
pub(crate) fn uniform_metrics(
    name: &str,
    ids: &[SettingId],
    bac: f64,
    fnr: f64,
    fpr: f64,
) -> MetricsRecord {
    let values: Vec<_> = ids.iter().map(|id| (*id, bac, fnr, fpr)).collect();
    metrics_row(name, &values)
}

pub(crate) fn parameters(ids: &[SettingId]) -> BTreeMap<SettingId, SettingParameters> {
    ids.iter()
        .map(|id| {
            (
                *id,
                SettingParameters {
                    setting_id: *id,
                    rocof_threshold_hz_s: 0.5 + *id as f64 / 100.0,
                    time_delay_s: 0.2,
                    blocking_voltage_pu: None,
                    dropout_time_s: None,
                },
            )
        })
        .collect()
}

pub(crate) fn datasets(
    scenarios: Vec<ScenarioRecord>,
    metrics: Vec<MetricsRecord>,
    parameter_ids: &[SettingId],
) -> Datasets {
    Datasets::new(scenarios, metrics, parameters(parameter_ids)).unwrap()
}
