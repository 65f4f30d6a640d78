use log::debug;

use crate::dataset::ScenarioRecord;
use crate::scenario::UserQuery;

/// Distance below which the nearest inertia counts as an exact match.
pub const EXACT_MATCH_TOLERANCE: f64 = 1e-9;

/// How a stage measures closeness to the user's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    /// Smallest absolute difference
    Nearest,
    /// Exact matches first, then the smallest value above the target, and only
    /// when nothing lies above, the nearest value below it
    NearestAtOrAbove,
}

/// One numeric reduction: keep the rows closest to the user's value.
#[derive(Debug, Clone, Copy)]
pub struct TieBreakStage {
    pub name: &'static str,
    pub key: fn(&ScenarioRecord) -> f64,
    pub target: fn(&UserQuery) -> f64,
    pub proximity: Proximity,
}

impl TieBreakStage {
    pub fn reduce<'a>(
        &self,
        rows: &[&'a ScenarioRecord],
        query: &UserQuery,
    ) -> Vec<&'a ScenarioRecord> {
        let target = (self.target)(query);
        let absolute: Vec<f64> = rows
            .iter()
            .map(|record| ((self.key)(record) - target).abs())
            .collect();
        let Some(min_absolute) = minimum(absolute.iter().copied()) else {
            return Vec::new();
        };

        match self.proximity {
            Proximity::Nearest => keep(rows, &absolute, |d| d == min_absolute),
            Proximity::NearestAtOrAbove => {
                if min_absolute.abs() <= EXACT_MATCH_TOLERANCE {
                    return keep(rows, &absolute, |d| d == 0.0);
                }

                let signed: Vec<f64> = rows
                    .iter()
                    .map(|record| (self.key)(record) - target)
                    .collect();
                match minimum(signed.iter().copied().filter(|d| *d > 0.0)) {
                    Some(min_above) => keep(rows, &signed, |d| d == min_above),
                    None => keep(rows, &absolute, |d| d == min_absolute),
                }
            }
        }
    }
}

/// Smallest non-NaN value, if any.
fn minimum(values: impl Iterator<Item = f64>) -> Option<f64> {
    values
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))))
}

fn keep<'a>(
    rows: &[&'a ScenarioRecord],
    distances: &[f64],
    predicate: impl Fn(f64) -> bool,
) -> Vec<&'a ScenarioRecord> {
    rows.iter()
        .zip(distances)
        .filter(|(_, distance)| predicate(**distance))
        .map(|(record, _)| *record)
        .collect()
}

/// Capacity (kW), voltage (kV), then inertia (s) with the at-or-above preference.
pub const STANDARD_STAGES: [TieBreakStage; 3] = [
    TieBreakStage {
        name: "capacity",
        key: ScenarioRecord::capacity_kw,
        target: |query| query.capacity_kw,
        proximity: Proximity::Nearest,
    },
    TieBreakStage {
        name: "voltage",
        key: ScenarioRecord::voltage_kv,
        target: |query| query.voltage_kv,
        proximity: Proximity::Nearest,
    },
    TieBreakStage {
        name: "inertia",
        key: |record| record.inertia_s,
        target: |query| query.inertia.seconds(),
        proximity: Proximity::NearestAtOrAbove,
    },
];

/// Sequential nearest-neighbour reduction over numeric scenario features.
///
/// Stages run in order and stop as soon as a single row is left; a later stage
/// never sees a set that an earlier stage already resolved.
#[derive(Debug, Clone)]
pub struct TieBreaker {
    stages: Vec<TieBreakStage>,
}

impl TieBreaker {
    pub fn new(stages: Vec<TieBreakStage>) -> Self {
        Self { stages }
    }

    pub fn apply<'a>(
        &self,
        candidates: Vec<&'a ScenarioRecord>,
        query: &UserQuery,
    ) -> Vec<&'a ScenarioRecord> {
        let mut rows = candidates;
        for stage in &self.stages {
            if rows.len() <= 1 {
                break;
            }
            rows = stage.reduce(&rows, query);
            debug!("{} tie-break left {} scenario(s)", stage.name, rows.len());
        }
        rows
    }
}

impl Default for TieBreaker {
    fn default() -> Self {
        Self::new(STANDARD_STAGES.to_vec())
    }
}
