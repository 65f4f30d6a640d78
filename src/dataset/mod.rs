use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uom::si::electric_potential::{kilovolt, volt};
use uom::si::f64::{ElectricPotential, Power};
use uom::si::power::{kilowatt, watt};

use crate::errors::AdvisorError;
use crate::scenario::{BaseProfile, CategoryCode};

pub mod loader;
pub mod storage;

pub use loader::{load_parameter_table, load_simulation_tables};
pub use storage::CsvDatasetProvider;

/// Identifier of a relay setting (the "Ajustes" number in the parameter table).
pub type SettingId = u32;

/// The six categorical feature codes of a simulated scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureCodes {
    pub generator_type: CategoryCode,
    pub voltage_blocking: CategoryCode,
    pub supportability: CategoryCode,
    pub technique: CategoryCode,
    pub curve: CategoryCode,
    pub scenario: CategoryCode,
}

/// One row of the simulation feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRecord {
    /// Row position, shared with the metrics table
    pub index: usize,
    pub name: String,
    pub capacity: Power,
    pub voltage: ElectricPotential,
    /// Inertia constant in seconds
    pub inertia_s: f64,
    pub features: FeatureCodes,
}

impl ScenarioRecord {
    /// Build a record from the raw units stored in the feature table (W and V).
    pub fn from_raw(
        index: usize,
        name: impl Into<String>,
        capacity_w: f64,
        voltage_v: f64,
        inertia_s: f64,
        features: FeatureCodes,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            capacity: Power::new::<watt>(capacity_w),
            voltage: ElectricPotential::new::<volt>(voltage_v),
            inertia_s,
            features,
        }
    }

    pub fn capacity_kw(&self) -> f64 {
        self.capacity.get::<kilowatt>()
    }

    pub fn voltage_kv(&self) -> f64 {
        self.voltage.get::<kilovolt>()
    }
}

/// Detection performance of one setting in one scenario, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettingMetrics {
    /// Balanced accuracy
    pub bac: f64,
    /// False-negative rate
    pub fnr: f64,
    /// False-positive rate
    pub fpr: f64,
}

/// One row of the simulation metrics table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRecord {
    pub scenario_name: String,
    pub settings: HashMap<SettingId, SettingMetrics>,
}

impl MetricsRecord {
    pub fn metrics(&self, setting_id: SettingId) -> Option<&SettingMetrics> {
        self.settings.get(&setting_id)
    }
}

/// Engineering parameters of a relay setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingParameters {
    pub setting_id: SettingId,
    /// ROCOF pickup threshold (Hz/s)
    pub rocof_threshold_hz_s: f64,
    /// Trip time delay (s)
    pub time_delay_s: f64,
    /// Undervoltage blocking threshold (p.u.)
    pub blocking_voltage_pu: Option<f64>,
    /// Blocking dropout time (s)
    pub dropout_time_s: Option<f64>,
}

impl SettingParameters {
    /// Settings with a positive dropout time use the voltage blocking function.
    pub fn uses_voltage_blocking(&self) -> bool {
        self.dropout_time_s.is_some_and(|dropout| dropout > 0.0)
    }
}

/// Read-only snapshot of the simulation and parameter databases of one base.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    scenarios: Vec<ScenarioRecord>,
    metrics: Vec<MetricsRecord>,
    parameters: BTreeMap<SettingId, SettingParameters>,
}

impl Datasets {
    /// Bundle the three tables, checking that scenario and metric rows line up 1:1.
    pub fn new(
        scenarios: Vec<ScenarioRecord>,
        metrics: Vec<MetricsRecord>,
        parameters: BTreeMap<SettingId, SettingParameters>,
    ) -> Result<Self, AdvisorError> {
        if scenarios.len() != metrics.len() {
            return Err(AdvisorError::DatasetMisaligned {
                features: scenarios.len(),
                metrics: metrics.len(),
            });
        }
        Ok(Self {
            scenarios,
            metrics,
            parameters,
        })
    }

    pub fn scenarios(&self) -> &[ScenarioRecord] {
        &self.scenarios
    }

    pub fn metrics_row(&self, index: usize) -> Option<&MetricsRecord> {
        self.metrics.get(index)
    }

    pub fn parameters(&self, setting_id: SettingId) -> Option<&SettingParameters> {
        self.parameters.get(&setting_id)
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }
}

/// Source of dataset snapshots for a base.
///
/// Implementations may cache, but a returned snapshot must never change afterwards.
pub trait DatasetProvider {
    fn snapshot(&mut self, profile: &BaseProfile) -> Result<Arc<Datasets>, AdvisorError>;
}
