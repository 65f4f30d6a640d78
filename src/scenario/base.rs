use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Supportability, VoltageBlocking};
use crate::dataset::SettingId;

/// System voltage (kV) from which the high-voltage base is used.
pub const HIGH_VOLTAGE_THRESHOLD_KV: f64 = 69.0;

/// Dataset partition selected from the system voltage of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemBase {
    /// AT base, system voltage >= 69 kV
    HighVoltage,
    /// MT base
    MediumVoltage,
}

impl SystemBase {
    pub fn select(voltage_kv: f64) -> Self {
        if voltage_kv >= HIGH_VOLTAGE_THRESHOLD_KV {
            SystemBase::HighVoltage
        } else {
            SystemBase::MediumVoltage
        }
    }
}

impl std::fmt::Display for SystemBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemBase::HighVoltage => write!(f, "High Voltage (AT)"),
            SystemBase::MediumVoltage => write!(f, "Medium Voltage (MT)"),
        }
    }
}

/// File names of the three data sources of a base, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFiles {
    pub parameters: String,
    pub features: String,
    pub metrics: String,
}

/// Hard expert-rule eligibility sets of a base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilitySets {
    pub voltage_blocking_enabled: BTreeSet<SettingId>,
    pub voltage_blocking_disabled: BTreeSet<SettingId>,
    pub category_i: BTreeSet<SettingId>,
    pub category_ii: BTreeSet<SettingId>,
    pub category_iii: BTreeSet<SettingId>,
}

/// Static configuration of one base: the setting universe, display labels,
/// eligibility sets and data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseProfile {
    pub base: SystemBase,
    /// Candidate setting ids, in the order they are reported
    pub candidate_ids: Vec<SettingId>,
    pub labels: BTreeMap<SettingId, String>,
    pub eligibility: EligibilitySets,
    pub files: DatasetFiles,
}

impl BaseProfile {
    pub fn label(&self, setting_id: SettingId) -> String {
        self.labels
            .get(&setting_id)
            .cloned()
            .unwrap_or_else(|| format!("ID {}", setting_id))
    }

    pub fn universe(&self) -> BTreeSet<SettingId> {
        self.candidate_ids.iter().copied().collect()
    }

    pub fn voltage_blocking_set(&self, voltage_blocking: VoltageBlocking) -> BTreeSet<SettingId> {
        match voltage_blocking {
            VoltageBlocking::Enabled => self.eligibility.voltage_blocking_enabled.clone(),
            VoltageBlocking::Disabled => self.eligibility.voltage_blocking_disabled.clone(),
        }
    }

    /// "No requirement" leaves the whole universe of the base eligible.
    pub fn supportability_set(&self, supportability: Supportability) -> BTreeSet<SettingId> {
        match supportability {
            Supportability::CategoryI => self.eligibility.category_i.clone(),
            Supportability::CategoryII => self.eligibility.category_ii.clone(),
            Supportability::CategoryIII => self.eligibility.category_iii.clone(),
            Supportability::NoRequirement => self.universe(),
        }
    }
}

/// Lookup of the per-base static configuration. Built once at startup, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseCatalog {
    pub high_voltage: BaseProfile,
    pub medium_voltage: BaseProfile,
}

impl BaseCatalog {
    pub fn profile(&self, base: SystemBase) -> &BaseProfile {
        match base {
            SystemBase::HighVoltage => &self.high_voltage,
            SystemBase::MediumVoltage => &self.medium_voltage,
        }
    }

    /// Catalog matching the AT/MT simulation campaigns.
    pub fn builtin() -> Self {
        Self {
            high_voltage: BaseProfile {
                base: SystemBase::HighVoltage,
                candidate_ids: vec![1, 4, 27, 38, 40, 46, 60, 66, 75, 85],
                labels: labels(&[
                    (1, "A_F1"),
                    (38, "AVB_F1"),
                    (4, "A_F2"),
                    (40, "AVB_F2"),
                    (27, "A_F3"),
                    (66, "AVB_F3"),
                    (60, "A_F4"),
                    (46, "AVB_F4"),
                    (75, "A_F5"),
                    (85, "AVB_F5"),
                ]),
                eligibility: EligibilitySets {
                    voltage_blocking_enabled: ids(&[38, 40, 66, 46, 85]),
                    voltage_blocking_disabled: ids(&[1, 4, 27, 60, 75]),
                    category_i: ids(&[4, 27, 60, 75, 40, 46, 66, 85]),
                    category_ii: ids(&[27, 60, 75, 46, 66, 85]),
                    category_iii: ids(&[60, 75, 46, 85]),
                },
                files: DatasetFiles {
                    parameters: "results_AT_DT.csv".to_string(),
                    features: "X_dados_AT.csv".to_string(),
                    metrics: "Metricas_Y_AT.csv".to_string(),
                },
            },
            medium_voltage: BaseProfile {
                base: SystemBase::MediumVoltage,
                candidate_ids: vec![1, 17, 25, 31, 37, 40, 45, 46],
                labels: labels(&[
                    (1, "M_F1"),
                    (37, "MVB_F1"),
                    (25, "M_F2"),
                    (40, "MVB_F2"),
                    (31, "M_F3"),
                    (45, "MVB_F3"),
                    (17, "M_F4"),
                    (46, "MVB_F4"),
                ]),
                eligibility: EligibilitySets {
                    voltage_blocking_enabled: ids(&[37, 40, 45, 46]),
                    voltage_blocking_disabled: ids(&[1, 25, 31, 17]),
                    category_i: ids(&[25, 31, 17, 40, 45, 46]),
                    category_ii: ids(&[31, 17, 45, 46]),
                    category_iii: ids(&[17, 46]),
                },
                files: DatasetFiles {
                    parameters: "results_MT_DT.csv".to_string(),
                    features: "X_dados_MT.csv".to_string(),
                    metrics: "Metricas_Y_MT.csv".to_string(),
                },
            },
        }
    }
}

impl Default for BaseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn ids(values: &[SettingId]) -> BTreeSet<SettingId> {
    values.iter().copied().collect()
}

fn labels(values: &[(SettingId, &str)]) -> BTreeMap<SettingId, String> {
    values
        .iter()
        .map(|(id, label)| (*id, label.to_string()))
        .collect()
}
