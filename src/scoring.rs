use std::collections::HashMap;

use crate::models::{EndGame, RepeatedMatch, ScoredRecord, ScoutingRecord, TeamSummary};

pub const POINTS_PER_PIECE: u32 = 3;

/// Points per end-game state, indexed by `EndGame::index`.
pub const END_GAME_POINTS: [u32; 5] = [0, 5, 10, 10, 20];

pub fn end_game_points(end_game: EndGame) -> u32 {
    END_GAME_POINTS[end_game.index()]
}

/// Off-target counters are diagnostics and never score. Sums are taken in
/// u64 so no combination of u32 counters can overflow.
pub fn score_record(record: ScoutingRecord) -> ScoredRecord {
    let pieces: u64 = [
        record.auto_near,
        record.auto_far,
        record.tele_near,
        record.tele_far,
    ]
    .into_iter()
    .map(u64::from)
    .sum();
    let end_game_score = u64::from(end_game_points(record.end_game));
    ScoredRecord::new(record, pieces * u64::from(POINTS_PER_PIECE), end_game_score)
}

/// Running total of an optional per-match count.
#[derive(Debug, Default)]
struct OptionalTally {
    sum: u64,
    reported: u32,
}

impl OptionalTally {
    fn add(&mut self, value: Option<u32>) {
        if let Some(value) = value {
            self.sum += u64::from(value);
            self.reported += 1;
        }
    }

    // Averaged over the matches that reported a value.
    fn average(&self) -> Option<f64> {
        if self.reported == 0 {
            None
        } else {
            Some(self.sum as f64 / self.reported as f64)
        }
    }
}

#[derive(Debug, Default)]
struct TeamTally {
    matches: u32,
    auto_near: u64,
    auto_far: u64,
    auto_off: u64,
    tele_near: u64,
    tele_far: u64,
    tele_off: u64,
    end_score: u64,
    total_score: u64,
    auto_cycles: OptionalTally,
    tele_cycles: OptionalTally,
    total_cycles: OptionalTally,
}

impl TeamTally {
    fn add(&mut self, scored: &ScoredRecord) {
        let record = scored.record();
        self.matches += 1;
        self.auto_near += u64::from(record.auto_near);
        self.auto_far += u64::from(record.auto_far);
        self.auto_off += u64::from(record.auto_off);
        self.tele_near += u64::from(record.tele_near);
        self.tele_far += u64::from(record.tele_far);
        self.tele_off += u64::from(record.tele_off);
        self.end_score += scored.end_game_score();
        self.total_score += scored.total_score();
        self.auto_cycles.add(record.auto_cycles);
        self.tele_cycles.add(record.tele_cycles);
        self.total_cycles.add(record.total_cycles);
    }

    fn finish(self, team_number: u32) -> TeamSummary {
        let matches = self.matches as f64;
        let avg = |sum: u64| sum as f64 / matches;

        TeamSummary {
            team_number,
            matches_played: self.matches,
            auto_near_sum: self.auto_near,
            auto_far_sum: self.auto_far,
            tele_near_sum: self.tele_near,
            tele_far_sum: self.tele_far,
            end_score_sum: self.end_score,
            total_score_sum: self.total_score,
            auto_near_avg: avg(self.auto_near),
            auto_far_avg: avg(self.auto_far),
            tele_near_avg: avg(self.tele_near),
            tele_far_avg: avg(self.tele_far),
            end_score_avg: avg(self.end_score),
            total_score_avg: avg(self.total_score),
            auto_off_sum: self.auto_off,
            tele_off_sum: self.tele_off,
            auto_hit_rate: hit_rate(self.auto_near + self.auto_far, self.auto_off),
            tele_hit_rate: hit_rate(self.tele_near + self.tele_far, self.tele_off),
            auto_cycles_avg: self.auto_cycles.average(),
            tele_cycles_avg: self.tele_cycles.average(),
            total_cycles_avg: self.total_cycles.average(),
        }
    }
}

pub fn hit_rate(scored: u64, missed: u64) -> Option<f64> {
    let attempts = scored + missed;
    if attempts == 0 {
        None
    } else {
        Some(scored as f64 / attempts as f64)
    }
}

/// One summary per team, ascending by team number. Every observation counts
/// as a match played, repeated match numbers included.
pub fn aggregate(records: &[ScoredRecord]) -> Vec<TeamSummary> {
    let mut tallies: HashMap<u32, TeamTally> = HashMap::new();

    for scored in records {
        tallies
            .entry(scored.record().team_number)
            .or_default()
            .add(scored);
    }

    let mut summaries: Vec<TeamSummary> = tallies
        .into_iter()
        .map(|(team_number, tally)| tally.finish(team_number))
        .collect();
    summaries.sort_by_key(|summary| summary.team_number);
    summaries
}

pub fn repeated_matches(records: &[ScoredRecord]) -> Vec<RepeatedMatch> {
    let mut counts: HashMap<(u32, u32), usize> = HashMap::new();
    for scored in records {
        let record = scored.record();
        *counts
            .entry((record.team_number, record.match_number))
            .or_insert(0) += 1;
    }

    let mut repeated: Vec<RepeatedMatch> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((team_number, match_number), count)| RepeatedMatch {
            team_number,
            match_number,
            count,
        })
        .collect();
    repeated.sort_by_key(|entry| (entry.team_number, entry.match_number));
    repeated
}
