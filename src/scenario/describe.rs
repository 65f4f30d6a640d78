use std::fmt;

use super::{
    ActiveTechnique, GenerationScenario, GeneratorType, Inertia, RegulationCurve, Supportability,
    UserQuery, VoltageBlocking,
};
use crate::dataset::ScenarioRecord;

const NOT_AVAILABLE: &str = "N/A";

/// How the inertia of a matched scenario is reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InertiaNote {
    /// Shown for synchronous machines when the user supplied a value
    Seconds(f64),
    /// The user did not know the inertia and the sentinel was matched instead
    Unknown,
    /// Not reported (inverter-based generators)
    Hidden,
}

/// Human-readable summary of the simulated scenario a recommendation is based on.
///
/// Codes outside the known ranges are kept as `None` and render as `N/A`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDescription {
    pub name: String,
    pub generator_type: Option<GeneratorType>,
    pub capacity_kw: f64,
    pub voltage_kv: f64,
    pub inertia: InertiaNote,
    pub voltage_blocking: Option<VoltageBlocking>,
    pub supportability: Option<Supportability>,
    pub technique: Option<ActiveTechnique>,
    pub scenario: Option<GenerationScenario>,
    pub curve: Option<RegulationCurve>,
}

impl ScenarioDescription {
    pub fn new(record: &ScenarioRecord, query: &UserQuery) -> Self {
        let codes = &record.features;
        let generator_type = GeneratorType::from_code(codes.generator_type);
        let inertia = match (generator_type, query.inertia) {
            (Some(GeneratorType::Synchronous), Inertia::Known(_)) => {
                InertiaNote::Seconds(record.inertia_s)
            }
            (Some(GeneratorType::Synchronous), Inertia::Unknown) => InertiaNote::Unknown,
            _ => InertiaNote::Hidden,
        };

        Self {
            name: record.name.clone(),
            generator_type,
            capacity_kw: record.capacity_kw(),
            voltage_kv: record.voltage_kv(),
            inertia,
            voltage_blocking: VoltageBlocking::from_code(codes.voltage_blocking),
            supportability: Supportability::from_code(codes.supportability),
            technique: ActiveTechnique::from_code(codes.technique),
            scenario: GenerationScenario::from_code(codes.scenario),
            curve: RegulationCurve::from_code(codes.curve),
        }
    }
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

impl fmt::Display for ScenarioDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with a capacity of {:.0} kW at {:.1} kV",
            or_na(self.generator_type),
            self.capacity_kw,
            self.voltage_kv
        )?;
        match self.inertia {
            InertiaNote::Seconds(h) => write!(f, " and an inertia constant of {:.2} s", h)?,
            InertiaNote::Unknown => write!(f, " and an unknown inertia constant")?,
            InertiaNote::Hidden => {}
        }
        writeln!(f, ".")?;
        writeln!(
            f,
            "Voltage blocking is {} and the supportability requirement is '{}'.",
            or_na(self.voltage_blocking).to_lowercase(),
            or_na(self.supportability)
        )?;
        write!(
            f,
            "Active technique '{}' in a '{}' generation scenario with regulation curve '{}'.",
            or_na(self.technique),
            or_na(self.scenario).to_lowercase(),
            or_na(self.curve).to_lowercase()
        )
    }
}
