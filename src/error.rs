use serde::Serialize;

use crate::models::RowSource;

/// Why a row was left out of scoring. Every variant is local to its row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("invalid value for `{0}`")]
    InvalidValue(String),
    #[error("unrecognized value {1:?} for `{0}`")]
    InvalidEnum(String, String),
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

impl RejectReason {
    pub fn kind(&self) -> &'static str {
        match self {
            RejectReason::MissingField(_) => "MissingField",
            RejectReason::InvalidValue(_) => "InvalidValue",
            RejectReason::InvalidEnum(_, _) => "InvalidEnum",
            RejectReason::Unreadable(_) => "Unreadable",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub source: RowSource,
    pub reason: RejectReason,
}

/// Shape of one entry in `rejections.json`.
#[derive(Debug, Serialize)]
pub struct RejectionEntry {
    pub row: String,
    pub kind: &'static str,
    pub reason: String,
}

impl From<&Rejection> for RejectionEntry {
    fn from(rejection: &Rejection) -> Self {
        Self {
            row: rejection.source.to_string(),
            kind: rejection.reason.kind(),
            reason: rejection.reason.to_string(),
        }
    }
}
