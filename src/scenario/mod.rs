use serde::{Deserialize, Serialize};

use crate::errors::AdvisorError;

pub mod base;
pub mod describe;

pub use base::{BaseCatalog, BaseProfile, DatasetFiles, EligibilitySets, SystemBase};
pub use describe::{InertiaNote, ScenarioDescription};

/// Integer code stored in the simulation feature table for a categorical feature.
pub type CategoryCode = i64;

/// Inertia value that stands in for "unknown" when a query is matched against the
/// simulation database. It takes part in the distance arithmetic like any other value.
pub const UNKNOWN_INERTIA_S: f64 = 100.0;

/// Type of the distributed generator being interconnected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum GeneratorType {
    /// Rotating synchronous machine
    Synchronous,
    /// Inverter-based resource (PV, battery, wind converters)
    InverterBased,
}

impl GeneratorType {
    pub const fn code(&self) -> CategoryCode {
        match self {
            GeneratorType::Synchronous => 0,
            GeneratorType::InverterBased => 1,
        }
    }

    pub fn from_code(code: CategoryCode) -> Option<Self> {
        match code {
            0 => Some(GeneratorType::Synchronous),
            1 => Some(GeneratorType::InverterBased),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeneratorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorType::Synchronous => write!(f, "Synchronous Generator"),
            GeneratorType::InverterBased => write!(f, "Inverter-Based Generator"),
        }
    }
}

/// Whether the relay's undervoltage blocking function is enabled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum VoltageBlocking {
    Disabled,
    Enabled,
}

impl VoltageBlocking {
    pub const fn code(&self) -> CategoryCode {
        match self {
            VoltageBlocking::Disabled => 0,
            VoltageBlocking::Enabled => 1,
        }
    }

    pub fn from_code(code: CategoryCode) -> Option<Self> {
        match code {
            0 => Some(VoltageBlocking::Disabled),
            1 => Some(VoltageBlocking::Enabled),
            _ => None,
        }
    }
}

impl std::fmt::Display for VoltageBlocking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoltageBlocking::Disabled => write!(f, "Disabled"),
            VoltageBlocking::Enabled => write!(f, "Enabled"),
        }
    }
}

/// Ride-through (supportability) requirement imposed on the generator.
///
/// Categories I to III are increasingly demanding; `NoRequirement` leaves every
/// setting of the active base eligible.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Supportability {
    CategoryI,
    CategoryII,
    CategoryIII,
    NoRequirement,
}

impl Supportability {
    pub const fn code(&self) -> CategoryCode {
        match self {
            Supportability::CategoryI => 1,
            Supportability::CategoryII => 2,
            Supportability::CategoryIII => 3,
            Supportability::NoRequirement => 4,
        }
    }

    pub fn from_code(code: CategoryCode) -> Option<Self> {
        match code {
            1 => Some(Supportability::CategoryI),
            2 => Some(Supportability::CategoryII),
            3 => Some(Supportability::CategoryIII),
            4 => Some(Supportability::NoRequirement),
            _ => None,
        }
    }
}

impl std::fmt::Display for Supportability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Supportability::CategoryI => write!(f, "Category I"),
            Supportability::CategoryII => write!(f, "Category II"),
            Supportability::CategoryIII => write!(f, "Category III"),
            Supportability::NoRequirement => write!(f, "No Requirements"),
        }
    }
}

/// Active anti-islanding technique running in the generator controls.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum ActiveTechnique {
    /// Frequency-shift positive feedback
    Gefs,
    /// Voltage-shift positive feedback
    Gevs,
    Disabled,
    Unknown,
}

impl ActiveTechnique {
    pub const fn code(&self) -> CategoryCode {
        match self {
            ActiveTechnique::Gefs => 1,
            ActiveTechnique::Gevs => 2,
            ActiveTechnique::Disabled => 3,
            ActiveTechnique::Unknown => 4,
        }
    }

    pub fn from_code(code: CategoryCode) -> Option<Self> {
        match code {
            1 => Some(ActiveTechnique::Gefs),
            2 => Some(ActiveTechnique::Gevs),
            3 => Some(ActiveTechnique::Disabled),
            4 => Some(ActiveTechnique::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActiveTechnique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveTechnique::Gefs => write!(f, "GEFS"),
            ActiveTechnique::Gevs => write!(f, "GEVS"),
            ActiveTechnique::Disabled => write!(f, "Disabled"),
            ActiveTechnique::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Grid-support regulation curve configured on the generator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum RegulationCurve {
    Disabled,
    HertzWatt,
    VoltVar,
    VoltWatt,
    Unknown,
}

impl RegulationCurve {
    pub const fn code(&self) -> CategoryCode {
        match self {
            RegulationCurve::Disabled => 1,
            RegulationCurve::HertzWatt => 2,
            RegulationCurve::VoltVar => 3,
            RegulationCurve::VoltWatt => 4,
            RegulationCurve::Unknown => 5,
        }
    }

    pub fn from_code(code: CategoryCode) -> Option<Self> {
        match code {
            1 => Some(RegulationCurve::Disabled),
            2 => Some(RegulationCurve::HertzWatt),
            3 => Some(RegulationCurve::VoltVar),
            4 => Some(RegulationCurve::VoltWatt),
            5 => Some(RegulationCurve::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for RegulationCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegulationCurve::Disabled => write!(f, "Disabled"),
            RegulationCurve::HertzWatt => write!(f, "Hertz-Watt"),
            RegulationCurve::VoltVar => write!(f, "Volt-Var"),
            RegulationCurve::VoltWatt => write!(f, "Volt-Watt"),
            RegulationCurve::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Generation mix of the feeder the generator connects to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum GenerationScenario {
    SynchronousOnly,
    InverterOnly,
    /// Hybrid feeder, synchronous generation dominant
    HybridSynchronousLed,
    /// Hybrid feeder, inverter-based generation dominant
    HybridInverterLed,
    Unknown,
}

impl GenerationScenario {
    pub const fn code(&self) -> CategoryCode {
        match self {
            GenerationScenario::SynchronousOnly => 1,
            GenerationScenario::InverterOnly => 2,
            GenerationScenario::HybridSynchronousLed => 3,
            GenerationScenario::HybridInverterLed => 4,
            GenerationScenario::Unknown => 5,
        }
    }

    pub fn from_code(code: CategoryCode) -> Option<Self> {
        match code {
            1 => Some(GenerationScenario::SynchronousOnly),
            2 => Some(GenerationScenario::InverterOnly),
            3 => Some(GenerationScenario::HybridSynchronousLed),
            4 => Some(GenerationScenario::HybridInverterLed),
            5 => Some(GenerationScenario::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for GenerationScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationScenario::SynchronousOnly => write!(f, "Synchronous Generator Only"),
            GenerationScenario::InverterOnly => write!(f, "Inverter-Based Generators Only"),
            GenerationScenario::HybridSynchronousLed => {
                write!(f, "Hybrid (larger synchronous contribution)")
            }
            GenerationScenario::HybridInverterLed => {
                write!(f, "Hybrid (larger inverter-based contribution)")
            }
            GenerationScenario::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Inertia constant of the generator as supplied by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Inertia {
    Known(f64),
    Unknown,
}

impl Inertia {
    /// Value used when measuring distance to simulated scenarios.
    pub fn seconds(&self) -> f64 {
        match self {
            Inertia::Known(h) => *h,
            Inertia::Unknown => UNKNOWN_INERTIA_S,
        }
    }
}

/// One recommendation request.
///
/// Built fresh from user input for a single request and discarded once the
/// outcome has been rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQuery {
    pub generator_type: GeneratorType,
    pub voltage_blocking: VoltageBlocking,
    pub supportability: Supportability,
    pub technique: ActiveTechnique,
    pub curve: RegulationCurve,
    pub scenario: GenerationScenario,
    /// Generator capacity in kW
    pub capacity_kw: f64,
    /// System voltage in kV
    pub voltage_kv: f64,
    pub inertia: Inertia,
}

impl UserQuery {
    /// Inverter-based generators have no rotating mass: their inertia is always `Known(0.0)`.
    pub fn normalized(mut self) -> Self {
        if self.generator_type == GeneratorType::InverterBased {
            self.inertia = Inertia::Known(0.0);
        }
        self
    }

    /// Check the numeric fields and the cross-field consistency rules.
    ///
    /// A query that fails here must not reach the recommendation pipeline.
    pub fn validate(&self) -> Result<(), AdvisorError> {
        Self::check_non_negative("capacity_kw", self.capacity_kw)?;
        Self::check_non_negative("voltage_kv", self.voltage_kv)?;
        if let Inertia::Known(h) = self.inertia {
            Self::check_non_negative("inertia", h)?;
        }

        let issues = self.consistency_issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(AdvisorError::InconsistentQuery {
                issues: issues.join("; "),
            })
        }
    }

    /// List every combination of inputs the simulation campaign never covered.
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        match self.scenario {
            GenerationScenario::SynchronousOnly => {
                if self.generator_type != GeneratorType::Synchronous {
                    issues.push(format!(
                        "scenario '{}' requires generator type '{}', got '{}'",
                        self.scenario,
                        GeneratorType::Synchronous,
                        self.generator_type
                    ));
                }
                if self.technique != ActiveTechnique::Disabled {
                    issues.push(format!(
                        "scenario '{}' was not simulated with active techniques, set the technique to '{}'",
                        self.scenario,
                        ActiveTechnique::Disabled
                    ));
                }
            }
            GenerationScenario::InverterOnly => {
                if self.generator_type != GeneratorType::InverterBased {
                    issues.push(format!(
                        "scenario '{}' requires generator type '{}', got '{}'",
                        self.scenario,
                        GeneratorType::InverterBased,
                        self.generator_type
                    ));
                }
            }
            _ => {}
        }
        issues
    }

    fn check_non_negative(field: &str, value: f64) -> Result<(), AdvisorError> {
        if !value.is_finite() || value < 0.0 {
            return Err(AdvisorError::InvalidUserInput {
                field: field.to_string(),
                reason: format!("expected a finite, non-negative number, got {}", value),
            });
        }
        Ok(())
    }
}
