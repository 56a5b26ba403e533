use std::collections::HashMap;

use crate::error::{RejectReason, Rejection};
use crate::models::{AllianceColor, EndGame, PreMatch, ScoutingRecord, SourceRow};

/// Largest tally a single period counter may hold. Anything above it is a
/// data-entry slip, not a robot.
pub const MAX_COUNTER: u32 = 999;

/// A scouting column as exported by the collection front-end.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub field: &'static str,
    pub header: &'static str,
    pub numeric: bool,
}

impl Column {
    const fn text(field: &'static str, header: &'static str) -> Self {
        Self { field, header, numeric: false }
    }

    const fn number(field: &'static str, header: &'static str) -> Self {
        Self { field, header, numeric: true }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.header == name || self.field == name
    }
}

pub const MATCH_NUMBER: Column = Column::number("match_number", "Match Number");
pub const TEAM_NUMBER: Column = Column::number("team_number", "Team Number");
pub const ALLIANCE_COLOR: Column = Column::text("alliance_color", "Alliance Color");
pub const STARTING_POSITION: Column = Column::text("starting_position", "Starting Position");
pub const PRE_MATCH: Column = Column::text("pre_match", "Pre-Match");
pub const AUTO_NEAR: Column = Column::number("auto_near", "Auto Scored At Near");
pub const AUTO_FAR: Column = Column::number("auto_far", "Auto Scored At Far");
pub const AUTO_OFF: Column = Column::number("auto_off", "Auto Off Target");
pub const TELE_NEAR: Column = Column::number("tele_near", "Tele-Op Scored At Near");
pub const TELE_FAR: Column = Column::number("tele_far", "Tele-Op Scored At Far");
pub const TELE_OFF: Column = Column::number("tele_off", "Tele-Op Off Target");
pub const DEFENSE: Column = Column::text("defense", "Defense");
pub const END_GAME: Column = Column::text("end_game", "End Game");
pub const REMARKS: Column = Column::text("remarks", "Remarks");
pub const SUBMITTER: Column = Column::text("submitter", "Submitter");
pub const AUTO_CYCLES: Column = Column::number("auto_cycles", "Auto Cycles");
pub const TELE_CYCLES: Column = Column::number("tele_cycles", "Tele-Op Cycles");
pub const TOTAL_CYCLES: Column = Column::number("total_cycles", "Total Cycles");

/// Front-end column order, reused for the scored records table.
pub const COLUMNS: [Column; 18] = [
    MATCH_NUMBER,
    TEAM_NUMBER,
    ALLIANCE_COLOR,
    STARTING_POSITION,
    PRE_MATCH,
    AUTO_NEAR,
    AUTO_FAR,
    AUTO_OFF,
    TELE_NEAR,
    TELE_FAR,
    TELE_OFF,
    DEFENSE,
    END_GAME,
    REMARKS,
    SUBMITTER,
    AUTO_CYCLES,
    TELE_CYCLES,
    TOTAL_CYCLES,
];

const REQUIRED: [Column; 8] = [
    MATCH_NUMBER,
    TEAM_NUMBER,
    ALLIANCE_COLOR,
    STARTING_POSITION,
    PRE_MATCH,
    END_GAME,
    REMARKS,
    SUBMITTER,
];

pub fn is_known_column(name: &str) -> bool {
    COLUMNS.iter().any(|column| column.matches(name))
}

pub fn normalize_row(fields: &HashMap<String, String>) -> Result<ScoutingRecord, RejectReason> {
    for column in REQUIRED.iter() {
        if cell(fields, column).is_none() {
            return Err(RejectReason::MissingField(column.field.to_string()));
        }
    }

    Ok(ScoutingRecord {
        match_number: positive(fields, &MATCH_NUMBER)?,
        team_number: positive(fields, &TEAM_NUMBER)?,
        alliance_color: labelled(fields, &ALLIANCE_COLOR, AllianceColor::from_label)?,
        starting_position: required(fields, &STARTING_POSITION)?.to_string(),
        pre_match: labelled(fields, &PRE_MATCH, PreMatch::from_label)?,
        auto_near: counter(fields, &AUTO_NEAR)?,
        auto_far: counter(fields, &AUTO_FAR)?,
        auto_off: counter(fields, &AUTO_OFF)?,
        tele_near: counter(fields, &TELE_NEAR)?,
        tele_far: counter(fields, &TELE_FAR)?,
        tele_off: counter(fields, &TELE_OFF)?,
        defense: toggle(fields, &DEFENSE)?,
        end_game: labelled(fields, &END_GAME, EndGame::from_label)?,
        remarks: required(fields, &REMARKS)?.to_string(),
        submitter: required(fields, &SUBMITTER)?.to_string(),
        auto_cycles: optional_counter(fields, &AUTO_CYCLES)?,
        tele_cycles: optional_counter(fields, &TELE_CYCLES)?,
        total_cycles: optional_counter(fields, &TOTAL_CYCLES)?,
    })
}

/// Splits a batch into accepted records (paired with their source row) and
/// rejections, both in input order.
pub fn normalize_batch(
    rows: &[SourceRow],
) -> (Vec<(&SourceRow, ScoutingRecord)>, Vec<Rejection>) {
    let mut accepted = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();

    for row in rows {
        match normalize_row(&row.fields) {
            Ok(record) => accepted.push((row, record)),
            Err(reason) => rejected.push(Rejection {
                source: row.source.clone(),
                reason,
            }),
        }
    }

    (accepted, rejected)
}

/// Trimmed, non-empty cell text under the column's header or field name.
pub fn cell<'a>(fields: &'a HashMap<String, String>, column: &Column) -> Option<&'a str> {
    fields
        .get(column.header)
        .or_else(|| fields.get(column.field))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required<'a>(
    fields: &'a HashMap<String, String>,
    column: &Column,
) -> Result<&'a str, RejectReason> {
    cell(fields, column).ok_or_else(|| RejectReason::MissingField(column.field.to_string()))
}

fn positive(fields: &HashMap<String, String>, column: &Column) -> Result<u32, RejectReason> {
    match required(fields, column)?.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(RejectReason::InvalidValue(column.field.to_string())),
    }
}

// Blank counters are untouched tallies on the front-end.
fn counter(fields: &HashMap<String, String>, column: &Column) -> Result<u32, RejectReason> {
    Ok(optional_counter(fields, column)?.unwrap_or(0))
}

fn optional_counter(
    fields: &HashMap<String, String>,
    column: &Column,
) -> Result<Option<u32>, RejectReason> {
    let Some(value) = cell(fields, column) else {
        return Ok(None);
    };
    match value.parse::<u32>() {
        Ok(count) if count <= MAX_COUNTER => Ok(Some(count)),
        _ => Err(RejectReason::InvalidValue(column.field.to_string())),
    }
}

fn toggle(fields: &HashMap<String, String>, column: &Column) -> Result<bool, RejectReason> {
    let Some(value) = cell(fields, column) else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(RejectReason::InvalidValue(column.field.to_string())),
    }
}

fn labelled<T>(
    fields: &HashMap<String, String>,
    column: &Column,
    parse: fn(&str) -> Option<T>,
) -> Result<T, RejectReason> {
    let value = required(fields, column)?;
    parse(value)
        .ok_or_else(|| RejectReason::InvalidEnum(column.field.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowSource;

    fn sample_fields() -> HashMap<String, String> {
        [
            ("Match Number", "4"),
            ("Team Number", "118"),
            ("Alliance Color", "Red"),
            ("Starting Position", "Near wall"),
            ("Pre-Match", "Preloaded"),
            ("Auto Scored At Near", "2"),
            ("Auto Scored At Far", "1"),
            ("Auto Off Target", "1"),
            ("Tele-Op Scored At Near", "5"),
            ("Tele-Op Scored At Far", "0"),
            ("Tele-Op Off Target", "3"),
            ("Defense", "No"),
            ("End Game", "Fully"),
            ("Remarks", "Fast intake"),
            ("Submitter", "Jordan"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
    }

    fn with(key: &str, value: &str) -> HashMap<String, String> {
        let mut fields = sample_fields();
        fields.insert(key.to_string(), value.to_string());
        fields
    }

    #[test]
    fn parses_complete_row() {
        let record = normalize_row(&sample_fields()).expect("row should be accepted");
        assert_eq!(record.match_number, 4);
        assert_eq!(record.team_number, 118);
        assert_eq!(record.alliance_color, AllianceColor::Red);
        assert_eq!(record.pre_match, PreMatch::Preloaded);
        assert_eq!(record.auto_near, 2);
        assert_eq!(record.tele_off, 3);
        assert!(!record.defense);
        assert_eq!(record.end_game, EndGame::Fully);
        assert_eq!(record.submitter, "Jordan");
    }

    #[test]
    fn accepts_snake_case_columns() {
        let fields: HashMap<String, String> = sample_fields()
            .into_iter()
            .map(|(header, value)| {
                let column = COLUMNS
                    .iter()
                    .find(|column| column.header == header)
                    .expect("known header");
                (column.field.to_string(), value)
            })
            .collect();
        let record = normalize_row(&fields).expect("row should be accepted");
        assert_eq!(record.team_number, 118);
    }

    #[test]
    fn blank_required_field_is_missing() {
        let reason = normalize_row(&with("Submitter", "  ")).unwrap_err();
        assert_eq!(reason, RejectReason::MissingField("submitter".to_string()));

        let mut fields = sample_fields();
        fields.remove("Remarks");
        let reason = normalize_row(&fields).unwrap_err();
        assert_eq!(reason, RejectReason::MissingField("remarks".to_string()));
    }

    #[test]
    fn non_numeric_team_is_invalid_value() {
        let reason = normalize_row(&with("Team Number", "abc")).unwrap_err();
        assert_eq!(reason, RejectReason::InvalidValue("team_number".to_string()));
    }

    #[test]
    fn zero_match_number_is_invalid_value() {
        let reason = normalize_row(&with("Match Number", "0")).unwrap_err();
        assert_eq!(reason, RejectReason::InvalidValue("match_number".to_string()));
    }

    #[test]
    fn negative_counter_is_invalid_value() {
        let reason = normalize_row(&with("Tele-Op Scored At Far", "-1")).unwrap_err();
        assert_eq!(reason, RejectReason::InvalidValue("tele_far".to_string()));
    }

    #[test]
    fn blank_counter_counts_as_zero() {
        let mut fields = with("Auto Off Target", "");
        fields.remove("Tele-Op Off Target");
        let record = normalize_row(&fields).expect("row should be accepted");
        assert_eq!(record.auto_off, 0);
        assert_eq!(record.tele_off, 0);
    }

    #[test]
    fn unknown_labels_are_invalid_enum() {
        let reason = normalize_row(&with("Alliance Color", "Green")).unwrap_err();
        assert_eq!(
            reason,
            RejectReason::InvalidEnum("alliance_color".to_string(), "Green".to_string())
        );

        let reason = normalize_row(&with("End Game", "Partially; Fully")).unwrap_err();
        assert_eq!(
            reason,
            RejectReason::InvalidEnum("end_game".to_string(), "Partially; Fully".to_string())
        );

        let reason = normalize_row(&with("Pre-Match", "preloaded")).unwrap_err();
        assert_eq!(
            reason,
            RejectReason::InvalidEnum("pre_match".to_string(), "preloaded".to_string())
        );
    }

    #[test]
    fn defense_toggle_spellings() {
        assert!(normalize_row(&with("Defense", "TRUE")).unwrap().defense);
        assert!(normalize_row(&with("Defense", "1")).unwrap().defense);
        assert!(!normalize_row(&with("Defense", "")).unwrap().defense);
        let reason = normalize_row(&with("Defense", "sometimes")).unwrap_err();
        assert_eq!(reason, RejectReason::InvalidValue("defense".to_string()));
    }

    #[test]
    fn batch_keeps_good_rows_around_bad_ones() {
        let source = |line| RowSource {
            file: "day1.csv".to_string(),
            line,
        };
        let rows = vec![
            SourceRow { source: source(2), fields: sample_fields() },
            SourceRow { source: source(3), fields: with("Team Number", "abc") },
            SourceRow { source: source(4), fields: with("Match Number", "5") },
        ];

        let (accepted, rejected) = normalize_batch(&rows);
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[0].1.match_number, 4);
        assert_eq!(accepted[1].1.match_number, 5);
        assert_eq!(accepted[1].0.source.line, 4);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].source.line, 3);
    }

    #[test]
    fn oversized_counter_rejects_only_its_row() {
        let source = |line| RowSource {
            file: "day1.csv".to_string(),
            line,
        };
        let mut typo = with("Team Number", "254");
        typo.insert("Auto Scored At Near".to_string(), "2000000000".to_string());
        let rows = vec![
            SourceRow { source: source(2), fields: sample_fields() },
            SourceRow { source: source(3), fields: typo },
        ];

        let (accepted, rejected) = normalize_batch(&rows);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].1.team_number, 118);
        assert_eq!(rejected.len(), 1);
        assert_eq!(
            rejected[0].reason,
            RejectReason::InvalidValue("auto_near".to_string())
        );
    }

    #[test]
    fn counters_are_capped() {
        let limit = MAX_COUNTER.to_string();
        let record = normalize_row(&with("Tele-Op Scored At Near", &limit)).unwrap();
        assert_eq!(record.tele_near, MAX_COUNTER);

        let above = (MAX_COUNTER + 1).to_string();
        let reason = normalize_row(&with("Tele-Op Scored At Near", &above)).unwrap_err();
        assert_eq!(reason, RejectReason::InvalidValue("tele_near".to_string()));

        let reason = normalize_row(&with("Auto Off Target", "4294967296")).unwrap_err();
        assert_eq!(reason, RejectReason::InvalidValue("auto_off".to_string()));
    }

    #[test]
    fn cycle_columns_are_optional() {
        let record = normalize_row(&sample_fields()).unwrap();
        assert_eq!(record.auto_cycles, None);
        assert_eq!(record.total_cycles, None);

        let mut fields = with("Auto Cycles", "3");
        fields.insert("Total Cycles".to_string(), "8".to_string());
        let record = normalize_row(&fields).unwrap();
        assert_eq!(record.auto_cycles, Some(3));
        assert_eq!(record.tele_cycles, None);
        assert_eq!(record.total_cycles, Some(8));

        let reason = normalize_row(&with("Tele-Op Cycles", "lots")).unwrap_err();
        assert_eq!(reason, RejectReason::InvalidValue("tele_cycles".to_string()));
    }

    #[test]
    fn known_columns_match_header_or_field() {
        assert!(is_known_column("Tele-Op Cycles"));
        assert!(is_known_column("end_game"));
        assert!(!is_known_column("Robot Weight"));
    }
}
