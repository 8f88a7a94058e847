/// Audit stage definitions for tracking pipeline progress
///
/// An audit moves strictly forward through these stages; a failed fetch or
/// parse ends it early.
use crate::AuditError;
use std::fmt;

/// Represents the current stage of an audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditStage {
    // ===== Active Stages =====
    /// Primary page (and auxiliary resources) are being fetched
    Fetching,

    /// The primary page is being parsed into a document
    Parsing,

    /// Category analyzers are running
    Analyzing,

    /// Category results are being combined into the report
    Aggregating,

    // ===== Terminal Stages =====
    /// The report was produced
    Done,

    /// The primary page could not be fetched
    FetchFailed,

    /// The primary page could not be parsed
    ParseFailed,
}

impl AuditStage {
    /// Returns true if this is a terminal stage (no further processing)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::FetchFailed | Self::ParseFailed)
    }

    /// Returns true if this stage ended the audit without a report
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::ParseFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Analyzing => "analyzing",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::FetchFailed => "fetch_failed",
            Self::ParseFailed => "parse_failed",
        }
    }

    /// Returns true if the pipeline may move from this stage to `next`
    pub fn can_transition_to(&self, next: AuditStage) -> bool {
        matches!(
            (self, next),
            (Self::Fetching, Self::Parsing)
                | (Self::Fetching, Self::FetchFailed)
                | (Self::Parsing, Self::Analyzing)
                | (Self::Parsing, Self::ParseFailed)
                | (Self::Analyzing, Self::Aggregating)
                | (Self::Aggregating, Self::Done)
        )
    }

    /// Moves to `next`, rejecting transitions the pipeline never makes
    pub fn transition(self, next: AuditStage) -> Result<AuditStage, AuditError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AuditError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for AuditStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
