//! Domain models for the anonymous Q&A feature
//!
//! These types are shared between the HTTP handlers, the realtime hub and
//! the store modules. Wire serialization is camelCase to match the
//! platform's JSON contract.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Reaction labels pre-seeded at zero on every new answer
pub const DEFAULT_REACTION_LABELS: [&str; 3] = ["helpful", "clear", "smart"];

// ============================================================================
// Status enums
// ============================================================================

/// Question lifecycle status
///
/// `open`/`active` questions are archived by the background sweep once they
/// age past the configured threshold; `reported` is set by moderation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Open,
    Active,
    Archived,
    Reported,
}

impl QuestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Open => "open",
            QuestionStatus::Active => "active",
            QuestionStatus::Archived => "archived",
            QuestionStatus::Reported => "reported",
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(QuestionStatus::Open),
            "active" => Ok(QuestionStatus::Active),
            "archived" => Ok(QuestionStatus::Archived),
            "reported" => Ok(QuestionStatus::Reported),
            other => Err(Error::InvalidInput(format!(
                "Unknown question status: {}",
                other
            ))),
        }
    }
}

/// Answer moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    Open,
    Reported,
}

impl AnswerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::Open => "open",
            AnswerStatus::Reported => "reported",
        }
    }
}

impl fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(AnswerStatus::Open),
            "reported" => Ok(AnswerStatus::Reported),
            other => Err(Error::InvalidInput(format!(
                "Unknown answer status: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// Reaction tally
// ============================================================================

/// Per-answer reaction counters keyed by free-form label
///
/// Labels are not a fixed enum: the three default labels are seeded at zero
/// and new labels appear on first reaction. Stored as a JSON object in the
/// `answers.reactions` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionTally(pub BTreeMap<String, i64>);

impl ReactionTally {
    /// Tally with the default labels at zero
    pub fn seeded() -> Self {
        let mut map = BTreeMap::new();
        for label in DEFAULT_REACTION_LABELS {
            map.insert(label.to_string(), 0);
        }
        Self(map)
    }

    /// Current count for a label (0 if the label has never been used)
    pub fn count(&self, label: &str) -> i64 {
        self.0.get(label).copied().unwrap_or(0)
    }

    /// Increment a label by one, creating it if absent; returns the new count
    pub fn bump(&mut self, label: &str) -> i64 {
        let count = self.0.entry(label.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Serialize for the `answers.reactions` TEXT column
    pub fn to_storage(&self) -> String {
        // BTreeMap<String, i64> serialization cannot fail
        serde_json::to_string(&self.0).expect("reaction tally serializes")
    }

    /// Parse the `answers.reactions` TEXT column
    pub fn from_storage(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map(ReactionTally)
            .map_err(|e| Error::Internal(format!("Invalid reaction tally: {}", e)))
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Pseudonymous identity for an anonymous chat participant
///
/// Identified by a client-chosen opaque token; the display icon is chosen on
/// first contact and never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub animal_icon: String,
    pub created_at: DateTime<Utc>,
}

/// Anonymous question
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub session_id: String,
    pub status: QuestionStatus,
    /// Optional AI-generated summary (written by an external collaborator)
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Question joined with its live answer count
///
/// The count is a read-time aggregation, never a stored counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithCount {
    #[serde(flatten)]
    pub question: Question,
    pub answer_count: i64,
}

/// Anonymous answer to a question
///
/// Carries either text or an image payload (exactly one), plus the sender's
/// display icon and the per-answer reaction tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub sender_icon: String,
    pub session_id: String,
    pub status: AnswerStatus,
    pub reactions: ReactionTally,
    pub created_at: DateTime<Utc>,
}

/// Answer submission payload, shared by the REST endpoint and the realtime
/// `NEW_ANSWER` action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnswer {
    /// Parent question id as received from the client; validated to parse as
    /// a UUID, but the parent's existence is not checked
    pub question_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub sender_icon: String,
    pub session_id: String,
}

/// Per-session answer counts grouped by the parent question's status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub open: i64,
    pub active: i64,
    pub archived: i64,
    pub reported: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in ["open", "active", "archived", "reported"] {
            assert_eq!(status.parse::<QuestionStatus>().unwrap().as_str(), status);
        }
        assert!("deleted".parse::<QuestionStatus>().is_err());
    }

    #[test]
    fn test_seeded_tally_has_default_labels_at_zero() {
        let tally = ReactionTally::seeded();
        assert_eq!(tally.count("helpful"), 0);
        assert_eq!(tally.count("clear"), 0);
        assert_eq!(tally.count("smart"), 0);
        assert_eq!(tally.count("never-seen"), 0);
    }

    #[test]
    fn test_bump_creates_new_labels() {
        let mut tally = ReactionTally::seeded();
        assert_eq!(tally.bump("helpful"), 1);
        assert_eq!(tally.bump("helpful"), 2);
        assert_eq!(tally.bump("fire"), 1);
        assert_eq!(tally.count("fire"), 1);
    }

    #[test]
    fn test_tally_storage_round_trip() {
        let mut tally = ReactionTally::seeded();
        tally.bump("helpful");
        tally.bump("fire");
        let parsed = ReactionTally::from_storage(&tally.to_storage()).unwrap();
        assert_eq!(parsed, tally);
    }
}
