use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an input row came from, rendered as `file:line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSource {
    pub file: String,
    pub line: u64,
}

impl fmt::Display for RowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One raw CSV row: column name to cell text.
#[derive(Debug, Clone)]
pub struct SourceRow {
    pub source: RowSource,
    pub fields: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllianceColor {
    Red,
    Blue,
}

impl AllianceColor {
    const LABELS: [(&'static str, AllianceColor); 2] =
        [("Red", AllianceColor::Red), ("Blue", AllianceColor::Blue)];

    pub fn from_label(label: &str) -> Option<Self> {
        lookup(&Self::LABELS, label)
    }

    pub fn label(self) -> &'static str {
        match self {
            AllianceColor::Red => "Red",
            AllianceColor::Blue => "Blue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreMatch {
    Preloaded,
    NotPreloaded,
    NoShow,
}

impl PreMatch {
    const LABELS: [(&'static str, PreMatch); 3] = [
        ("Preloaded", PreMatch::Preloaded),
        ("Not Preloaded", PreMatch::NotPreloaded),
        ("No Show", PreMatch::NoShow),
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        lookup(&Self::LABELS, label)
    }

    pub fn label(self) -> &'static str {
        match self {
            PreMatch::Preloaded => "Preloaded",
            PreMatch::NotPreloaded => "Not Preloaded",
            PreMatch::NoShow => "No Show",
        }
    }
}

/// Terminal robot state at match end. Variant order is the index into
/// the end-game points table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndGame {
    None = 0,
    Partially = 1,
    Fully = 2,
    DoubleParkBeneficiary = 3,
    DoubleParkDealer = 4,
}

impl EndGame {
    pub const ALL: [EndGame; 5] = [
        EndGame::None,
        EndGame::Partially,
        EndGame::Fully,
        EndGame::DoubleParkBeneficiary,
        EndGame::DoubleParkDealer,
    ];

    // The compact spellings are accepted from older front-end exports.
    const LABELS: [(&'static str, EndGame); 7] = [
        ("None", EndGame::None),
        ("Partially", EndGame::Partially),
        ("Fully", EndGame::Fully),
        ("Double Park Beneficiary", EndGame::DoubleParkBeneficiary),
        ("Double Park Dealer", EndGame::DoubleParkDealer),
        ("DoubleParkBeneficiary", EndGame::DoubleParkBeneficiary),
        ("DoubleParkDealer", EndGame::DoubleParkDealer),
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        lookup(&Self::LABELS, label)
    }

    pub fn label(self) -> &'static str {
        match self {
            EndGame::None => "None",
            EndGame::Partially => "Partially",
            EndGame::Fully => "Fully",
            EndGame::DoubleParkBeneficiary => "Double Park Beneficiary",
            EndGame::DoubleParkDealer => "Double Park Dealer",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

fn lookup<T: Copy>(labels: &[(&'static str, T)], label: &str) -> Option<T> {
    labels
        .iter()
        .find(|(candidate, _)| *candidate == label)
        .map(|(_, value)| *value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoutingRecord {
    pub match_number: u32,
    pub team_number: u32,
    pub alliance_color: AllianceColor,
    pub starting_position: String,
    pub pre_match: PreMatch,
    pub auto_near: u32,
    pub auto_far: u32,
    pub auto_off: u32,
    pub tele_near: u32,
    pub tele_far: u32,
    pub tele_off: u32,
    pub defense: bool,
    pub end_game: EndGame,
    pub remarks: String,
    pub submitter: String,
    pub auto_cycles: Option<u32>,
    pub tele_cycles: Option<u32>,
    pub total_cycles: Option<u32>,
}

/// A record with its derived scores. Only `scoring::score_record` builds one.
/// The source cells ride along so the scored table can echo the input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredRecord {
    record: ScoutingRecord,
    piece_score: u64,
    end_game_score: u64,
    total_score: u64,
    source_cells: HashMap<String, String>,
}

impl ScoredRecord {
    pub(crate) fn new(record: ScoutingRecord, piece_score: u64, end_game_score: u64) -> Self {
        Self {
            record,
            piece_score,
            end_game_score,
            total_score: piece_score + end_game_score,
            source_cells: HashMap::new(),
        }
    }

    pub(crate) fn with_source_cells(mut self, cells: HashMap<String, String>) -> Self {
        self.source_cells = cells;
        self
    }

    pub fn record(&self) -> &ScoutingRecord {
        &self.record
    }

    pub fn piece_score(&self) -> u64 {
        self.piece_score
    }

    pub fn end_game_score(&self) -> u64 {
        self.end_game_score
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn source_cells(&self) -> &HashMap<String, String> {
        &self.source_cells
    }
}

/// Per-team rollup. Field names double as the summary CSV headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_number: u32,
    pub matches_played: u32,
    pub auto_near_sum: u64,
    pub auto_far_sum: u64,
    pub tele_near_sum: u64,
    pub tele_far_sum: u64,
    pub end_score_sum: u64,
    pub total_score_sum: u64,
    pub auto_near_avg: f64,
    pub auto_far_avg: f64,
    pub tele_near_avg: f64,
    pub tele_far_avg: f64,
    pub end_score_avg: f64,
    pub total_score_avg: f64,
    pub auto_off_sum: u64,
    pub tele_off_sum: u64,
    pub auto_hit_rate: Option<f64>,
    pub tele_hit_rate: Option<f64>,
    pub auto_cycles_avg: Option<f64>,
    pub tele_cycles_avg: Option<f64>,
    pub total_cycles_avg: Option<f64>,
}

impl TeamSummary {
    pub const HEADERS: [&'static str; 21] = [
        "team_number",
        "matches_played",
        "auto_near_sum",
        "auto_far_sum",
        "tele_near_sum",
        "tele_far_sum",
        "end_score_sum",
        "total_score_sum",
        "auto_near_avg",
        "auto_far_avg",
        "tele_near_avg",
        "tele_far_avg",
        "end_score_avg",
        "total_score_avg",
        "auto_off_sum",
        "tele_off_sum",
        "auto_hit_rate",
        "tele_hit_rate",
        "auto_cycles_avg",
        "tele_cycles_avg",
        "total_cycles_avg",
    ];
}

#[derive(Debug, Clone)]
pub struct RepeatedMatch {
    pub team_number: u32,
    pub match_number: u32,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct RankedTeam {
    pub rank: usize,
    pub summary: TeamSummary,
}
