use serde::{Deserialize, Serialize};

use crate::dataset::{Datasets, ScenarioRecord, SettingId, SettingMetrics, SettingParameters};
use crate::errors::AdvisorError;
use crate::scenario::BaseProfile;

/// One setting's performance in the matched scenario(s), joined with its
/// engineering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub setting_id: SettingId,
    pub label: String,
    pub metrics: SettingMetrics,
    /// `None` when the parameter table has no row for this setting
    pub parameters: Option<SettingParameters>,
}

/// Build the candidate table from the tie-broken scenarios.
///
/// A single scenario is read directly; several equally close scenarios are
/// averaged setting by setting.
pub fn resolve_candidate_table(
    matched: &[&ScenarioRecord],
    datasets: &Datasets,
    profile: &BaseProfile,
) -> Result<Vec<CandidateRow>, AdvisorError> {
    match matched {
        [single] => direct_metrics(single.index, datasets, profile),
        _ => {
            let indices: Vec<usize> = matched.iter().map(|record| record.index).collect();
            averaged_metrics(&indices, datasets, profile)
        }
    }
}

/// Raw metrics of one scenario row.
pub fn direct_metrics(
    index: usize,
    datasets: &Datasets,
    profile: &BaseProfile,
) -> Result<Vec<CandidateRow>, AdvisorError> {
    profile
        .candidate_ids
        .iter()
        .map(|setting_id| {
            let metrics = lookup(datasets, index, *setting_id)?;
            Ok(candidate_row(*setting_id, *metrics, datasets, profile))
        })
        .collect()
}

/// Mean of each metric across the given scenario rows. Missing values (NaN)
/// are skipped; a metric missing everywhere stays NaN.
pub fn averaged_metrics(
    indices: &[usize],
    datasets: &Datasets,
    profile: &BaseProfile,
) -> Result<Vec<CandidateRow>, AdvisorError> {
    let mut rows = Vec::with_capacity(profile.candidate_ids.len());
    for setting_id in &profile.candidate_ids {
        let samples = indices
            .iter()
            .map(|index| lookup(datasets, *index, *setting_id).copied())
            .collect::<Result<Vec<SettingMetrics>, AdvisorError>>()?;

        let metrics = SettingMetrics {
            bac: mean(samples.iter().map(|m| m.bac)),
            fnr: mean(samples.iter().map(|m| m.fnr)),
            fpr: mean(samples.iter().map(|m| m.fpr)),
        };
        rows.push(candidate_row(*setting_id, metrics, datasets, profile));
    }
    Ok(rows)
}

fn lookup(
    datasets: &Datasets,
    index: usize,
    setting_id: SettingId,
) -> Result<&SettingMetrics, AdvisorError> {
    datasets
        .metrics_row(index)
        .and_then(|row| row.metrics(setting_id))
        .ok_or(AdvisorError::MissingMetric {
            setting_id,
            row: index,
        })
}

fn candidate_row(
    setting_id: SettingId,
    metrics: SettingMetrics,
    datasets: &Datasets,
    profile: &BaseProfile,
) -> CandidateRow {
    CandidateRow {
        setting_id,
        label: profile.label(setting_id),
        metrics,
        parameters: datasets.parameters(setting_id).cloned(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::fixtures::{codes_for, datasets, metrics_row, record, uniform_metrics};
    use crate::scenario::tests::inverter_query;
    use crate::scenario::{BaseCatalog, SystemBase};

    const HV_IDS: [SettingId; 10] = [1, 4, 27, 38, 40, 46, 60, 66, 75, 85];

    fn two_scenarios() -> Datasets {
        let codes = codes_for(&inverter_query());
        datasets(
            vec![
                record(0, 500.0, 138.0, 0.0, codes),
                record(1, 500.0, 138.0, 0.0, codes),
            ],
            vec![
                uniform_metrics("S0", &HV_IDS, 92.0, 4.0, 2.0),
                uniform_metrics("S1", &HV_IDS, 96.0, 8.0, 6.0),
            ],
            &[1, 4, 27],
        )
    }

    #[test]
    fn test_direct_read_keeps_candidate_order_and_labels() {
        let catalog = BaseCatalog::builtin();
        let profile = catalog.profile(SystemBase::HighVoltage);
        let data = two_scenarios();

        let rows = direct_metrics(1, &data, profile).unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.setting_id).collect();
        assert_eq!(ids, HV_IDS.to_vec());
        assert_eq!(rows[3].label, "AVB_F1");
        assert_eq!(rows[0].metrics.bac, 96.0);
    }

    #[test]
    fn test_parameters_left_joined() {
        let catalog = BaseCatalog::builtin();
        let profile = catalog.profile(SystemBase::HighVoltage);
        let rows = direct_metrics(0, &two_scenarios(), profile).unwrap();

        assert!(rows[0].parameters.is_some());
        // Setting 38 has metrics but no parameter row
        assert_eq!(rows[3].setting_id, 38);
        assert!(rows[3].parameters.is_none());
    }

    #[test]
    fn test_averaging_across_tied_scenarios() {
        let catalog = BaseCatalog::builtin();
        let profile = catalog.profile(SystemBase::HighVoltage);
        let rows = averaged_metrics(&[0, 1], &two_scenarios(), profile).unwrap();

        for row in rows {
            assert_eq!(row.metrics.bac, 94.0);
            assert_eq!(row.metrics.fnr, 6.0);
            assert_eq!(row.metrics.fpr, 4.0);
        }
    }

    #[test]
    fn test_resolve_dispatches_on_match_count() {
        let catalog = BaseCatalog::builtin();
        let profile = catalog.profile(SystemBase::HighVoltage);
        let data = two_scenarios();
        let scenarios = data.scenarios();

        let single = resolve_candidate_table(&[&scenarios[0]], &data, profile).unwrap();
        assert_eq!(single[0].metrics.bac, 92.0);

        let both = resolve_candidate_table(&[&scenarios[0], &scenarios[1]], &data, profile).unwrap();
        assert_eq!(both[0].metrics.bac, 94.0);
    }

    #[test]
    fn test_missing_values_skipped_in_mean() {
        let catalog = BaseCatalog::builtin();
        let profile = catalog.profile(SystemBase::MediumVoltage);
        let codes = codes_for(&inverter_query());
        let ids = [1, 17, 25, 31, 37, 40, 45, 46];
        let mut first = uniform_metrics("S0", &ids, f64::NAN, 1.0, 1.0);
        first.settings.get_mut(&17).unwrap().fnr = f64::NAN;
        let second = uniform_metrics("S1", &ids, 91.0, 3.0, 1.0);
        let data = datasets(
            vec![record(0, 1.0, 1.0, 0.0, codes), record(1, 1.0, 1.0, 0.0, codes)],
            vec![first, second],
            &[],
        );

        let rows = averaged_metrics(&[0, 1], &data, profile).unwrap();
        assert_eq!(rows[0].metrics.bac, 91.0);
        assert_eq!(rows[0].metrics.fnr, 2.0);
        assert_eq!(rows[1].metrics.fnr, 3.0);
    }

    #[test]
    fn test_missing_metric_is_an_internal_error() {
        let catalog = BaseCatalog::builtin();
        let profile = catalog.profile(SystemBase::HighVoltage);
        let codes = codes_for(&inverter_query());
        let data = datasets(
            vec![record(0, 1.0, 1.0, 0.0, codes)],
            vec![metrics_row("S0", &[(1, 95.0, 1.0, 1.0)])],
            &[],
        );

        match direct_metrics(0, &data, profile) {
            Err(AdvisorError::MissingMetric { setting_id, row }) => {
                assert_eq!(setting_id, 4);
                assert_eq!(row, 0);
            }
            other => panic!("Expected MissingMetric, got {:?}", other),
        }
    }
}
