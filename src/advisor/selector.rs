use itertools::Itertools;

use super::metrics::CandidateRow;

/// Winner and ordered alternatives of a non-empty final table.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub winner: CandidateRow,
    pub alternatives: Vec<CandidateRow>,
}

/// Rank rows by BAC, highest first. Equal BAC keeps the incoming order.
pub fn rank(rows: Vec<CandidateRow>) -> Vec<CandidateRow> {
    rows.into_iter()
        .sorted_by(|a, b| b.metrics.bac.total_cmp(&a.metrics.bac))
        .collect()
}

/// `None` when no setting qualified.
pub fn select(rows: Vec<CandidateRow>) -> Option<Selection> {
    let mut ranked = rank(rows).into_iter();
    let winner = ranked.next()?;
    Some(Selection {
        winner,
        alternatives: ranked.collect(),
    })
}
