use log::{info, warn};

use crate::csv_io::LoadedRows;
use crate::error::Rejection;
use crate::models::{ScoredRecord, TeamSummary};
use crate::normalize;
use crate::scoring;

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub scored: Vec<ScoredRecord>,
    pub summaries: Vec<TeamSummary>,
    pub rejections: Vec<Rejection>,
    /// Input column names in first-seen order.
    pub columns: Vec<String>,
}

impl BatchOutcome {
    pub fn input_rows(&self) -> usize {
        self.scored.len() + self.rejections.len()
    }
}

pub fn process(loaded: LoadedRows) -> BatchOutcome {
    let LoadedRows {
        rows,
        unreadable,
        columns,
    } = loaded;
    let (accepted, rejected) = normalize::normalize_batch(&rows);

    let mut rejections = unreadable;
    rejections.extend(rejected);
    for rejection in rejections.iter() {
        warn!("rejected row {}: {}", rejection.source, rejection.reason);
    }

    let scored: Vec<ScoredRecord> = accepted
        .into_iter()
        .map(|(row, record)| scoring::score_record(record).with_source_cells(row.fields.clone()))
        .collect();
    for repeat in scoring::repeated_matches(&scored) {
        warn!(
            "team {} has {} observations for match {}; each counts as a match played",
            repeat.team_number, repeat.count, repeat.match_number
        );
    }

    let summaries = scoring::aggregate(&scored);
    info!(
        "scored {} records for {} teams ({} rejected)",
        scored.len(),
        summaries.len(),
        rejections.len()
    );

    BatchOutcome {
        scored,
        summaries,
        rejections,
        columns,
    }
}
