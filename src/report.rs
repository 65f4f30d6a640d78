// Plain-text rendering of an advice for the terminal

use std::fmt::Write;

use crate::advisor::{CandidateRow, MatchedScenario, Recommendation};
use crate::dataset::SettingParameters;
use crate::service::Advice;

pub fn render(advice: &Advice) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_advice(&mut out, advice);
    out
}

fn write_advice(out: &mut String, advice: &Advice) -> std::fmt::Result {
    writeln!(out, "Base: {}", advice.base)?;

    match &advice.recommendation {
        Recommendation::NoScenario => {
            writeln!(
                out,
                "No compatible scenario was found for this combination of inputs."
            )?;
            writeln!(
                out,
                "Try changing some of the parameters, e.g. the generation scenario or the active technique."
            )?;
        }
        Recommendation::SingleWinner {
            winner,
            alternatives,
            scenario,
            ..
        } => {
            write_scenario(out, scenario, advice.scenario_description.as_deref())?;
            writeln!(out)?;
            writeln!(out, "Recommended setting: {}", winner.label)?;
            write_metrics(out, winner)?;
            match &winner.parameters {
                Some(parameters) => write_parameters(out, parameters)?,
                None => writeln!(out, "  Parameters: not found in the parameter table")?,
            }
            if !alternatives.is_empty() {
                writeln!(out)?;
                writeln!(out, "Other settings meeting the criteria:")?;
                for alternative in alternatives {
                    write!(
                        out,
                        "  {:<8} BAC {:>6.2}%  FNR {:>6.2}%  FPR {:>6.2}%",
                        alternative.label,
                        alternative.metrics.bac,
                        alternative.metrics.fnr,
                        alternative.metrics.fpr
                    )?;
                    if let Some(parameters) = &alternative.parameters {
                        write!(
                            out,
                            "  ROCOF {:.4} Hz/s  TD {:.4} s",
                            parameters.rocof_threshold_hz_s, parameters.time_delay_s
                        )?;
                    }
                    writeln!(out)?;
                }
            }
        }
        Recommendation::NoEligibleSetting {
            suggestions,
            scenario,
            ..
        } => {
            write_scenario(out, scenario, advice.scenario_description.as_deref())?;
            writeln!(out)?;
            writeln!(
                out,
                "No setting meets both the expert rules and the performance criteria \
                 (BAC, FNR and FPR) for this scenario."
            )?;
            for suggestion in suggestions {
                writeln!(out, "{}: {}", suggestion.level, suggestion.message)?;
            }
        }
    }
    Ok(())
}

fn write_scenario(
    out: &mut String,
    scenario: &MatchedScenario,
    description: Option<&str>,
) -> std::fmt::Result {
    if scenario.averaged {
        writeln!(
            out,
            "Closest simulated scenarios (metrics averaged): {}",
            scenario.scenario_name()
        )?;
    } else {
        writeln!(out, "Closest simulated scenario: {}", scenario.scenario_name())?;
    }
    if let Some(description) = description {
        writeln!(out, "{}", description)?;
    }
    Ok(())
}

fn write_metrics(out: &mut String, row: &CandidateRow) -> std::fmt::Result {
    writeln!(out, "  BAC: {:.2}%", row.metrics.bac)?;
    writeln!(out, "  FNR: {:.2}%", row.metrics.fnr)?;
    writeln!(out, "  FPR: {:.2}%", row.metrics.fpr)
}

fn write_parameters(out: &mut String, parameters: &SettingParameters) -> std::fmt::Result {
    writeln!(
        out,
        "  ROCOF threshold: {:.4} Hz/s",
        parameters.rocof_threshold_hz_s
    )?;
    writeln!(out, "  Time delay: {:.4} s", parameters.time_delay_s)?;
    if parameters.uses_voltage_blocking() {
        if let Some(vblock) = parameters.blocking_voltage_pu {
            writeln!(out, "  Blocking voltage: {:.2} p.u.", vblock)?;
        }
        if let Some(dropout) = parameters.dropout_time_s {
            writeln!(out, "  Dropout time: {:.3} s", dropout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{Suggestion, SuggestionLevel};
    use crate::dataset::SettingMetrics;
    use crate::scenario::SystemBase;
    use crate::scenario::tests::inverter_query;

    fn row(setting_id: u32, label: &str, bac: f64, parameters: Option<SettingParameters>) -> CandidateRow {
        CandidateRow {
            setting_id,
            label: label.to_string(),
            metrics: SettingMetrics {
                bac,
                fnr: 2.5,
                fpr: 1.25,
            },
            parameters,
        }
    }

    fn scenario() -> MatchedScenario {
        MatchedScenario {
            indices: vec![4],
            names: vec!["AT_GBI_500kW".to_string()],
            averaged: false,
        }
    }

    fn advice(recommendation: Recommendation) -> Advice {
        Advice {
            query: inverter_query(),
            base: SystemBase::HighVoltage,
            recommendation,
            scenario_description: Some("Inverter-Based Generator".to_string()),
        }
    }

    #[test]
    fn test_winner_with_blocking_parameters() {
        let parameters = SettingParameters {
            setting_id: 38,
            rocof_threshold_hz_s: 0.5,
            time_delay_s: 0.25,
            blocking_voltage_pu: Some(0.8),
            dropout_time_s: Some(0.05),
        };
        let text = render(&advice(Recommendation::SingleWinner {
            winner: row(38, "AVB_F1", 97.123, Some(parameters)),
            alternatives: vec![row(40, "AVB_F2", 93.0, None)],
            scenario: scenario(),
            base: SystemBase::HighVoltage,
        }));

        assert!(text.contains("Closest simulated scenario: AT_GBI_500kW"));
        assert!(text.contains("Recommended setting: AVB_F1"));
        assert!(text.contains("BAC: 97.12%"));
        assert!(text.contains("ROCOF threshold: 0.5000 Hz/s"));
        assert!(text.contains("Time delay: 0.2500 s"));
        assert!(text.contains("Blocking voltage: 0.80 p.u."));
        assert!(text.contains("Dropout time: 0.050 s"));
        assert!(text.contains("AVB_F2"));
    }

    #[test]
    fn test_alternatives_list_their_parameters() {
        let alternative_parameters = SettingParameters {
            setting_id: 2,
            rocof_threshold_hz_s: 0.75,
            time_delay_s: 0.1,
            blocking_voltage_pu: None,
            dropout_time_s: None,
        };
        let text = render(&advice(Recommendation::SingleWinner {
            winner: row(1, "A_F1", 97.0, None),
            alternatives: vec![
                row(2, "A_F2", 96.0, Some(alternative_parameters)),
                row(3, "A_F3", 95.0, None),
            ],
            scenario: scenario(),
            base: SystemBase::HighVoltage,
        }));

        let listed: Vec<&str> = text
            .lines()
            .filter(|line| {
                let line = line.trim_start();
                line.starts_with("A_F2") || line.starts_with("A_F3")
            })
            .collect();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].ends_with("ROCOF 0.7500 Hz/s  TD 0.1000 s"));
        assert!(!listed[1].contains("ROCOF"));
    }

    #[test]
    fn test_blocking_voltage_hidden_without_dropout() {
        let parameters = SettingParameters {
            setting_id: 1,
            rocof_threshold_hz_s: 0.5,
            time_delay_s: 0.25,
            blocking_voltage_pu: Some(0.8),
            dropout_time_s: Some(0.0),
        };
        let text = render(&advice(Recommendation::SingleWinner {
            winner: row(1, "A_F1", 95.0, Some(parameters)),
            alternatives: Vec::new(),
            scenario: scenario(),
            base: SystemBase::HighVoltage,
        }));

        assert!(!text.contains("Blocking voltage"));
        assert!(!text.contains("Other settings"));
    }

    #[test]
    fn test_no_eligible_setting_lists_suggestions() {
        let text = render(&advice(Recommendation::NoEligibleSetting {
            suggestions: vec![Suggestion {
                level: SuggestionLevel::Warning,
                message: "GEVS is restrictive".to_string(),
            }],
            scenario: MatchedScenario {
                indices: vec![1, 2],
                names: vec!["A".to_string(), "B".to_string()],
                averaged: true,
            },
            base: SystemBase::HighVoltage,
        }));

        assert!(text.contains("metrics averaged): A, B"));
        assert!(text.contains("Warning: GEVS is restrictive"));
    }

    #[test]
    fn test_no_scenario() {
        let text = render(&advice(Recommendation::NoScenario));
        assert!(text.contains("No compatible scenario"));
    }
}
