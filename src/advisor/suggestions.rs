use serde::{Deserialize, Serialize};

use crate::scenario::{ActiveTechnique, GeneratorType, UserQuery, VoltageBlocking};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionLevel {
    Tip,
    Warning,
}

impl std::fmt::Display for SuggestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionLevel::Tip => write!(f, "Tip"),
            SuggestionLevel::Warning => write!(f, "Warning"),
        }
    }
}

/// Guidance shown when no setting survives the rule and performance filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub level: SuggestionLevel,
    pub message: String,
}

/// A suggestion applies when every condition it sets matches the query.
struct SuggestionRule {
    generator_type: Option<GeneratorType>,
    voltage_blocking: Option<VoltageBlocking>,
    technique: Option<ActiveTechnique>,
    level: SuggestionLevel,
    message: &'static str,
}

impl SuggestionRule {
    fn applies(&self, query: &UserQuery) -> bool {
        self.generator_type.is_none_or(|g| g == query.generator_type)
            && self.voltage_blocking.is_none_or(|v| v == query.voltage_blocking)
            && self.technique.is_none_or(|t| t == query.technique)
    }
}

const SUGGESTION_RULES: &[SuggestionRule] = &[
    SuggestionRule {
        generator_type: Some(GeneratorType::Synchronous),
        voltage_blocking: None,
        technique: None,
        level: SuggestionLevel::Tip,
        message: "Try lowering the supportability requirement (e.g. from Category III to II). \
                  Synchronous generators can struggle to meet the performance thresholds \
                  under the more demanding ride-through categories.",
    },
    SuggestionRule {
        generator_type: Some(GeneratorType::InverterBased),
        voltage_blocking: Some(VoltageBlocking::Enabled),
        technique: None,
        level: SuggestionLevel::Tip,
        message: "Try disabling voltage blocking. Settings for inverter-based generators \
                  frequently perform better without it.",
    },
    // Only raised alongside the inverter tip; synchronous machines get the supportability tip alone
    SuggestionRule {
        generator_type: Some(GeneratorType::InverterBased),
        voltage_blocking: Some(VoltageBlocking::Enabled),
        technique: Some(ActiveTechnique::Gevs),
        level: SuggestionLevel::Warning,
        message: "The GEVS technique combined with voltage blocking is particularly \
                  restrictive and may have no valid settings. Disabling voltage blocking \
                  is the main recommendation.",
    },
];

/// Every applicable suggestion, in table order.
pub fn suggestions_for(query: &UserQuery) -> Vec<Suggestion> {
    SUGGESTION_RULES
        .iter()
        .filter(|rule| rule.applies(query))
        .map(|rule| Suggestion {
            level: rule.level,
            message: rule.message.to_string(),
        })
        .collect()
}
