use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::dataset::{Datasets, ScenarioRecord};
use crate::errors::AdvisorError;
use crate::scenario::{BaseProfile, SystemBase, UserQuery};

pub mod categorical;
pub mod eligibility;
pub mod metrics;
pub mod selector;
pub mod suggestions;
pub mod tie_break;

#[cfg(test)]
pub(crate) mod fixtures;

pub use categorical::{CategoricalFilter, ColumnMatch, FallbackRule, FeatureColumn};
pub use eligibility::PerformanceThresholds;
pub use metrics::CandidateRow;
pub use suggestions::{Suggestion, SuggestionLevel};
pub use tie_break::{Proximity, TieBreakStage, TieBreaker};

/// The simulated scenario(s) a recommendation is based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedScenario {
    /// Row indices in the simulation tables
    pub indices: Vec<usize>,
    pub names: Vec<String>,
    /// Whether metrics were averaged over several equally close scenarios
    pub averaged: bool,
}

impl MatchedScenario {
    fn from_records(records: &[&ScenarioRecord], datasets: &Datasets) -> Self {
        let names = records
            .iter()
            .map(|record| {
                datasets
                    .metrics_row(record.index)
                    .map(|row| row.scenario_name.clone())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| record.name.clone())
            })
            .collect();
        Self {
            indices: records.iter().map(|record| record.index).collect(),
            names,
            averaged: records.len() > 1,
        }
    }

    pub fn scenario_name(&self) -> String {
        self.names.join(", ")
    }
}

/// Result of one recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Recommendation {
    /// No simulated scenario is compatible with the query
    NoScenario,
    SingleWinner {
        winner: CandidateRow,
        /// Remaining qualifying settings, best BAC first
        alternatives: Vec<CandidateRow>,
        scenario: MatchedScenario,
        base: SystemBase,
    },
    /// Scenarios matched but no setting passed the rule and performance filters
    NoEligibleSetting {
        suggestions: Vec<Suggestion>,
        scenario: MatchedScenario,
        base: SystemBase,
    },
}

impl Recommendation {
    pub fn winner(&self) -> Option<&CandidateRow> {
        match self {
            Recommendation::SingleWinner { winner, .. } => Some(winner),
            _ => None,
        }
    }

    pub fn scenario(&self) -> Option<&MatchedScenario> {
        match self {
            Recommendation::NoScenario => None,
            Recommendation::SingleWinner { scenario, .. }
            | Recommendation::NoEligibleSetting { scenario, .. } => Some(scenario),
        }
    }
}

/// Scenario-matching and rule-based recommendation pipeline.
///
/// The engine is stateless across requests: each call works on the snapshot it
/// is handed and derives new views instead of mutating it.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    categorical: CategoricalFilter,
    tie_breaker: TieBreaker,
    thresholds: PerformanceThresholds,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: PerformanceThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    pub fn thresholds(&self) -> &PerformanceThresholds {
        &self.thresholds
    }

    /// Run filter, tie-break, aggregation, eligibility and selection for one query.
    ///
    /// `profile` must be the profile of the base `datasets` was loaded for.
    pub fn recommend(
        &self,
        query: &UserQuery,
        profile: &BaseProfile,
        datasets: &Datasets,
    ) -> Result<Recommendation, AdvisorError> {
        let candidates = self.categorical.apply(datasets.scenarios(), query);
        if candidates.rows.is_empty() {
            info!("No compatible scenario found");
            return Ok(Recommendation::NoScenario);
        }
        debug!(
            "{} scenario(s) left after categorical filtering",
            candidates.rows.len()
        );

        let nearest = self.tie_breaker.apply(candidates.rows, query);
        if nearest.is_empty() {
            info!("No compatible scenario left after numeric tie-break");
            return Ok(Recommendation::NoScenario);
        }
        let scenario = MatchedScenario::from_records(&nearest, datasets);
        info!(
            "Matched scenario {} ({} row(s))",
            scenario.scenario_name(),
            scenario.indices.len()
        );

        let table = metrics::resolve_candidate_table(&nearest, datasets, profile)?;
        let eligible = eligibility::eligible_ids(profile, query);
        let table = eligibility::apply_hard_rules(table, &eligible);
        let table = eligibility::apply_soft_rules(table, &self.thresholds);

        match selector::select(table) {
            Some(selection) => {
                info!(
                    "Recommending {} with BAC {:.2}% ({} alternative(s))",
                    selection.winner.label,
                    selection.winner.metrics.bac,
                    selection.alternatives.len()
                );
                Ok(Recommendation::SingleWinner {
                    winner: selection.winner,
                    alternatives: selection.alternatives,
                    scenario,
                    base: profile.base,
                })
            }
            None => {
                info!("No setting met the rule and performance criteria");
                Ok(Recommendation::NoEligibleSetting {
                    suggestions: suggestions::suggestions_for(query),
                    scenario,
                    base: profile.base,
                })
            }
        }
    }
}
