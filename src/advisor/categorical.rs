use log::debug;

use crate::dataset::ScenarioRecord;
use crate::scenario::{ActiveTechnique, CategoryCode, GenerationScenario, RegulationCurve, UserQuery};

/// Categorical feature columns of the simulation feature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    GeneratorType,
    VoltageBlocking,
    Supportability,
    Technique,
    Curve,
    Scenario,
}

impl FeatureColumn {
    /// Order in which the columns narrow the candidate set.
    pub const FILTER_ORDER: [FeatureColumn; 6] = [
        FeatureColumn::GeneratorType,
        FeatureColumn::VoltageBlocking,
        FeatureColumn::Supportability,
        FeatureColumn::Technique,
        FeatureColumn::Curve,
        FeatureColumn::Scenario,
    ];

    pub fn record_code(&self, record: &ScenarioRecord) -> CategoryCode {
        let features = &record.features;
        match self {
            FeatureColumn::GeneratorType => features.generator_type,
            FeatureColumn::VoltageBlocking => features.voltage_blocking,
            FeatureColumn::Supportability => features.supportability,
            FeatureColumn::Technique => features.technique,
            FeatureColumn::Curve => features.curve,
            FeatureColumn::Scenario => features.scenario,
        }
    }

    pub fn query_code(&self, query: &UserQuery) -> CategoryCode {
        match self {
            FeatureColumn::GeneratorType => query.generator_type.code(),
            FeatureColumn::VoltageBlocking => query.voltage_blocking.code(),
            FeatureColumn::Supportability => query.supportability.code(),
            FeatureColumn::Technique => query.technique.code(),
            FeatureColumn::Curve => query.curve.code(),
            FeatureColumn::Scenario => query.scenario.code(),
        }
    }
}

impl std::fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureColumn::GeneratorType => write!(f, "Generator Type"),
            FeatureColumn::VoltageBlocking => write!(f, "Voltage Blocking"),
            FeatureColumn::Supportability => write!(f, "Supportability"),
            FeatureColumn::Technique => write!(f, "Active Technique"),
            FeatureColumn::Curve => write!(f, "Regulation Curve"),
            FeatureColumn::Scenario => write!(f, "Generation Scenario"),
        }
    }
}

/// Code tried for a column when no scenario matches the user's exact code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackRule {
    pub column: FeatureColumn,
    pub code: CategoryCode,
}

/// Every column that can stand in "unknown" for a missing exact match.
pub const DEFAULT_FALLBACKS: [FallbackRule; 3] = [
    FallbackRule {
        column: FeatureColumn::Technique,
        code: ActiveTechnique::Unknown.code(),
    },
    FallbackRule {
        column: FeatureColumn::Curve,
        code: RegulationCurve::Unknown.code(),
    },
    FallbackRule {
        column: FeatureColumn::Scenario,
        code: GenerationScenario::Unknown.code(),
    },
];

/// How a column affected the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMatch {
    /// Rows with the user's code were found
    Exact,
    /// No exact match; rows with the fallback code were kept
    Fallback(CategoryCode),
    /// Neither the exact nor a fallback code matched; the set was left as is
    Unnarrowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStep {
    pub column: FeatureColumn,
    pub outcome: ColumnMatch,
    /// Rows left after this column
    pub remaining: usize,
}

/// Scenarios surviving the categorical filter, with a per-column trace.
#[derive(Debug, Clone)]
pub struct CategoricalMatch<'a> {
    pub rows: Vec<&'a ScenarioRecord>,
    pub steps: Vec<FilterStep>,
}

/// Progressive categorical filter with per-column fallback codes.
#[derive(Debug, Clone)]
pub struct CategoricalFilter {
    fallbacks: Vec<FallbackRule>,
}

impl CategoricalFilter {
    pub fn new(fallbacks: Vec<FallbackRule>) -> Self {
        Self { fallbacks }
    }

    pub fn fallback_for(&self, column: FeatureColumn) -> Option<CategoryCode> {
        self.fallbacks
            .iter()
            .find(|rule| rule.column == column)
            .map(|rule| rule.code)
    }

    /// Narrow `scenarios` column by column.
    ///
    /// A column never empties the working set: when neither the user's code nor
    /// the column's fallback code matches, the column is skipped.
    pub fn apply<'a>(
        &self,
        scenarios: &'a [ScenarioRecord],
        query: &UserQuery,
    ) -> CategoricalMatch<'a> {
        let mut working: Vec<&'a ScenarioRecord> = scenarios.iter().collect();
        let mut steps = Vec::with_capacity(FeatureColumn::FILTER_ORDER.len());

        for column in FeatureColumn::FILTER_ORDER {
            let wanted = column.query_code(query);
            let exact = Self::matching(&working, column, wanted);

            let outcome = if !exact.is_empty() {
                working = exact;
                ColumnMatch::Exact
            } else if let Some(fallback) = self.fallback_for(column) {
                let substitutes = Self::matching(&working, column, fallback);
                if substitutes.is_empty() {
                    ColumnMatch::Unnarrowed
                } else {
                    debug!(
                        "No scenario with {} = {}, using fallback code {}",
                        column, wanted, fallback
                    );
                    working = substitutes;
                    ColumnMatch::Fallback(fallback)
                }
            } else {
                ColumnMatch::Unnarrowed
            };

            if outcome == ColumnMatch::Unnarrowed {
                debug!("{} = {} does not narrow the candidate scenarios", column, wanted);
            }
            steps.push(FilterStep {
                column,
                outcome,
                remaining: working.len(),
            });
        }

        CategoricalMatch {
            rows: working,
            steps,
        }
    }

    fn matching<'a>(
        rows: &[&'a ScenarioRecord],
        column: FeatureColumn,
        code: CategoryCode,
    ) -> Vec<&'a ScenarioRecord> {
        rows.iter()
            .copied()
            .filter(|record| column.record_code(record) == code)
            .collect()
    }
}

impl Default for CategoricalFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACKS.to_vec())
    }
}
