use std::collections::BTreeSet;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use super::metrics::CandidateRow;
use crate::dataset::{SettingId, SettingMetrics};
use crate::scenario::{BaseProfile, UserQuery};

/// Soft performance thresholds, all strict and in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceThresholds {
    /// BAC must be strictly above this value
    pub min_bac: f64,
    /// FNR must be strictly below this value
    pub max_fnr: f64,
    /// FPR must be strictly below this value
    pub max_fpr: f64,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            min_bac: 90.0,
            max_fnr: 10.0,
            max_fpr: 10.0,
        }
    }
}

impl PerformanceThresholds {
    /// NaN metrics never pass.
    pub fn passes(&self, metrics: &SettingMetrics) -> bool {
        metrics.bac > self.min_bac && metrics.fnr < self.max_fnr && metrics.fpr < self.max_fpr
    }
}

/// Settings allowed by both hard expert rules: the voltage-blocking set chosen
/// by the user's blocking option intersected with the supportability set.
pub fn eligible_ids(profile: &BaseProfile, query: &UserQuery) -> BTreeSet<SettingId> {
    let by_blocking = profile.voltage_blocking_set(query.voltage_blocking);
    let by_supportability = profile.supportability_set(query.supportability);
    let eligible: BTreeSet<SettingId> = by_blocking
        .intersection(&by_supportability)
        .copied()
        .collect();
    debug!(
        "Eligible settings for blocking {} and {}: [{}]",
        query.voltage_blocking,
        query.supportability,
        eligible.iter().join(", ")
    );
    eligible
}

pub fn apply_hard_rules(rows: Vec<CandidateRow>, eligible: &BTreeSet<SettingId>) -> Vec<CandidateRow> {
    rows.into_iter()
        .filter(|row| eligible.contains(&row.setting_id))
        .collect()
}

pub fn apply_soft_rules(
    rows: Vec<CandidateRow>,
    thresholds: &PerformanceThresholds,
) -> Vec<CandidateRow> {
    rows.into_iter()
        .filter(|row| thresholds.passes(&row.metrics))
        .collect()
}
