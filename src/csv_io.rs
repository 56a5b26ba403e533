use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, warn};

use crate::error::{RejectReason, Rejection, RejectionEntry};
use crate::models::{RowSource, ScoredRecord, SourceRow, TeamSummary};
use crate::normalize::{self, COLUMNS};
use crate::pipeline::BatchOutcome;

pub const SCORED_FILE: &str = "all_records_with_scores.csv";
pub const SUMMARY_FILE: &str = "team_score_summary.csv";
pub const REJECTIONS_FILE: &str = "rejections.json";

const SCORE_HEADERS: [&str; 3] = ["piece_score", "end_game_score", "total_score"];

/// Every row read from an input set, plus rows the CSV parser could not decode.
#[derive(Debug, Default)]
pub struct LoadedRows {
    pub rows: Vec<SourceRow>,
    pub unreadable: Vec<Rejection>,
    /// Header names across all sources, in first-seen order.
    pub columns: Vec<String>,
}

pub struct OutputPaths {
    pub scored: PathBuf,
    pub summary: PathBuf,
    pub rejections: PathBuf,
}

pub fn discover_csv_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("reading input directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

pub fn load_dir(dir: &Path) -> anyhow::Result<LoadedRows> {
    let files = discover_csv_files(dir)?;
    if files.is_empty() {
        warn!("no CSV files found in {}", dir.display());
    }

    let mut loaded = LoadedRows::default();
    for path in files {
        let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let before = loaded.rows.len() + loaded.unreadable.len();
        read_rows(file, &label, &mut loaded)
            .with_context(|| format!("reading {}", path.display()))?;
        debug!(
            "read {} rows from {}",
            loaded.rows.len() + loaded.unreadable.len() - before,
            path.display()
        );
    }

    Ok(loaded)
}

/// Appends the rows of one CSV source. Short rows are kept so the normalizer
/// can name the missing field; undecodable rows become rejections. A source
/// whose header row cannot be decoded is skipped as a single rejection.
pub fn read_rows<R: io::Read>(
    reader: R,
    label: &str,
    loaded: &mut LoadedRows,
) -> anyhow::Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) if !matches!(err.kind(), csv::ErrorKind::Io(_)) => {
            warn!("skipping {label}: unreadable header row ({err})");
            loaded.unreadable.push(Rejection {
                source: RowSource {
                    file: label.to_string(),
                    line: 1,
                },
                reason: RejectReason::Unreadable(format!("header row: {err}")),
            });
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    for header in headers.iter() {
        if !loaded.columns.iter().any(|seen| seen == header) {
            loaded.columns.push(header.to_string());
        }
    }

    for result in reader.records() {
        match result {
            Ok(record) => {
                let fields = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(header, value)| (header.to_string(), value.to_string()))
                    .collect();
                loaded.rows.push(SourceRow {
                    source: row_source(label, record.position()),
                    fields,
                });
            }
            Err(err) => {
                if matches!(err.kind(), csv::ErrorKind::Io(_)) {
                    return Err(err.into());
                }
                loaded.unreadable.push(Rejection {
                    source: row_source(label, err.position()),
                    reason: RejectReason::Unreadable(err.to_string()),
                });
            }
        }
    }

    Ok(())
}

fn row_source(label: &str, position: Option<&csv::Position>) -> RowSource {
    RowSource {
        file: label.to_string(),
        line: position.map(|pos| pos.line()).unwrap_or(0),
    }
}

pub fn write_outputs(dir: &Path, outcome: &BatchOutcome) -> anyhow::Result<OutputPaths> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let paths = OutputPaths {
        scored: dir.join(SCORED_FILE),
        summary: dir.join(SUMMARY_FILE),
        rejections: dir.join(REJECTIONS_FILE),
    };
    write_scored_records(&paths.scored, &outcome.scored, &outcome.columns)?;
    write_summaries(&paths.summary, &outcome.summaries)?;
    write_rejections(&paths.rejections, &outcome.rejections)?;
    Ok(paths)
}

/// Writes the scored table: the known columns, then any other input columns
/// in first-seen order, then the three scores.
pub fn write_scored_records(
    path: &Path,
    records: &[ScoredRecord],
    columns: &[String],
) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let extra: Vec<&str> = columns
        .iter()
        .map(String::as_str)
        .filter(|name| !normalize::is_known_column(name))
        .collect();
    let headers = COLUMNS
        .iter()
        .map(|column| column.header)
        .chain(extra.iter().copied())
        .chain(SCORE_HEADERS);
    writer.write_record(headers)?;
    for scored in records {
        writer.write_record(scored_cells(scored, &extra))?;
    }

    writer.flush()?;
    Ok(())
}

// Numbers are written normalized; labels and text echo the source cell.
fn scored_cells(scored: &ScoredRecord, extra: &[&str]) -> Vec<String> {
    let record = scored.record();
    let source = scored.source_cells();
    let optional = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();

    // Order follows `COLUMNS`.
    let normalized = [
        record.match_number.to_string(),
        record.team_number.to_string(),
        record.alliance_color.label().to_string(),
        record.starting_position.clone(),
        record.pre_match.label().to_string(),
        record.auto_near.to_string(),
        record.auto_far.to_string(),
        record.auto_off.to_string(),
        record.tele_near.to_string(),
        record.tele_far.to_string(),
        record.tele_off.to_string(),
        (if record.defense { "Yes" } else { "No" }).to_string(),
        record.end_game.label().to_string(),
        record.remarks.clone(),
        record.submitter.clone(),
        optional(record.auto_cycles),
        optional(record.tele_cycles),
        optional(record.total_cycles),
    ];

    let mut cells: Vec<String> = COLUMNS
        .iter()
        .zip(normalized)
        .map(|(column, value)| match normalize::cell(source, column) {
            Some(text) if !column.numeric => text.to_string(),
            _ => value,
        })
        .collect();
    cells.extend(
        extra
            .iter()
            .map(|name| source.get(*name).cloned().unwrap_or_default()),
    );
    cells.extend([
        scored.piece_score().to_string(),
        scored.end_game_score().to_string(),
        scored.total_score().to_string(),
    ]);
    cells
}

pub fn write_summaries(path: &Path, summaries: &[TeamSummary]) -> anyhow::Result<()> {
    // Headers are written by hand so an empty table still has them.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(TeamSummary::HEADERS)?;
    for summary in summaries {
        writer.serialize(summary)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn read_summaries(path: &Path) -> anyhow::Result<Vec<TeamSummary>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;

    let mut summaries = Vec::new();
    for result in reader.deserialize::<TeamSummary>() {
        summaries.push(result.with_context(|| format!("parsing {}", path.display()))?);
    }
    Ok(summaries)
}

pub fn write_rejections(path: &Path, rejections: &[Rejection]) -> anyhow::Result<()> {
    let entries: Vec<RejectionEntry> = rejections.iter().map(RejectionEntry::from).collect();
    let json = serde_json::to_string_pretty(&entries)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
