use std::cmp::Ordering;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{EndGame, RankedTeam, ScoredRecord, TeamSummary};
use crate::pipeline::BatchOutcome;
use crate::scoring;

/// Ranks teams by average total score, best first. Ties go to the lower team number.
pub fn rank_teams(summaries: &[TeamSummary]) -> Vec<RankedTeam> {
    let mut ordered = summaries.to_vec();
    ordered.sort_by(|a, b| {
        b.total_score_avg
            .partial_cmp(&a.total_score_avg)
            .unwrap_or(Ordering::Equal)
            .then(a.team_number.cmp(&b.team_number))
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, summary)| RankedTeam {
            rank: index + 1,
            summary,
        })
        .collect()
}

pub fn end_game_mix(records: &[ScoredRecord]) -> Vec<(EndGame, usize)> {
    let mut counts = [0usize; 5];
    for scored in records {
        counts[scored.record().end_game.index()] += 1;
    }

    let mut mix: Vec<(EndGame, usize)> = EndGame::ALL
        .into_iter()
        .map(|end_game| (end_game, counts[end_game.index()]))
        .filter(|(_, count)| *count > 0)
        .collect();
    mix.sort_by(|a, b| b.1.cmp(&a.1));
    mix
}

pub fn format_hit_rate(rate: Option<f64>) -> String {
    match rate {
        Some(value) => format!("{:.1}%", value * 100.0),
        None => "n/a".to_string(),
    }
}

pub fn build_report(
    input_label: &str,
    generated_at: DateTime<Utc>,
    outcome: &BatchOutcome,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Scouting Event Report");
    let _ = writeln!(
        output,
        "Generated {} from {}",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        input_label
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Input rows: {}", outcome.input_rows());
    let _ = writeln!(output, "- Accepted records: {}", outcome.scored.len());
    let _ = writeln!(output, "- Rejected rows: {}", outcome.rejections.len());
    let _ = writeln!(output, "- Teams scouted: {}", outcome.summaries.len());

    let _ = writeln!(output);
    let _ = writeln!(output, "## End Game Mix");
    let mix = end_game_mix(&outcome.scored);
    if mix.is_empty() {
        let _ = writeln!(output, "No accepted records.");
    } else {
        for (end_game, count) in mix {
            let _ = writeln!(
                output,
                "- {}: {} ({} pts each)",
                end_game.label(),
                count,
                scoring::end_game_points(end_game)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Team Ranking");
    let ranked = rank_teams(&outcome.summaries);
    if ranked.is_empty() {
        let _ = writeln!(output, "No teams to rank.");
    } else {
        let _ = writeln!(
            output,
            "| Rank | Team | Played | Total AVG | End AVG | Auto Hit Rate | Tele Hit Rate |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|---|");
        for entry in ranked.iter() {
            let summary = &entry.summary;
            let _ = writeln!(
                output,
                "| {} | {} | {} | {:.2} | {:.2} | {} | {} |",
                entry.rank,
                summary.team_number,
                summary.matches_played,
                summary.total_score_avg,
                summary.end_score_avg,
                format_hit_rate(summary.auto_hit_rate),
                format_hit_rate(summary.tele_hit_rate)
            );
        }
    }

    let repeated = scoring::repeated_matches(&outcome.scored);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Repeated Match Entries");
    if repeated.is_empty() {
        let _ = writeln!(output, "Every team has at most one record per match.");
    } else {
        for entry in repeated.iter() {
            let _ = writeln!(
                output,
                "- Team {} match {}: {} records, each counted as a match played",
                entry.team_number, entry.match_number, entry.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Rejected Rows");
    if outcome.rejections.is_empty() {
        let _ = writeln!(output, "No rows were rejected.");
    } else {
        for rejection in outcome.rejections.iter() {
            let _ = writeln!(output, "- {}: {}", rejection.source, rejection.reason);
        }
    }

    output
}
