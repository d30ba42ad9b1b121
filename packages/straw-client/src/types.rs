//! Type definitions for survey API payloads
//!
//! Field names mirror the JSON the survey backend emits, so these types
//! deserialize the wire format directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Answer Values
// ============================================================================

/// A recorded yes/no choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerChoice {
    Yes,
    No,
}

/// What a user can send for a question: yes, no, or skip.
///
/// Skip is a first-class value. On the wire it is an empty `answer`
/// field; whether it removes the question from the unanswered set is the
/// server's call, reported back via `unanswered_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerValue {
    Yes,
    No,
    Skip,
}

impl AnswerValue {
    /// The value sent in the `answer` form field.
    pub fn wire_value(&self) -> &'static str {
        match self {
            AnswerValue::Yes => "yes",
            AnswerValue::No => "no",
            AnswerValue::Skip => "",
        }
    }

    /// The recorded choice this value produces, if any.
    pub fn as_choice(&self) -> Option<AnswerChoice> {
        match self {
            AnswerValue::Yes => Some(AnswerChoice::Yes),
            AnswerValue::No => Some(AnswerChoice::No),
            AnswerValue::Skip => None,
        }
    }
}

// ============================================================================
// Question
// ============================================================================

/// One yes/no survey question as the backend reports it.
///
/// `answer_url`, `edit_url` and `delete_url` are opaque capability
/// handles: the server includes them only when the caller is allowed to
/// perform the action, so presence signals permission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub yes_count: u32,
    #[serde(default)]
    pub no_count: u32,
    #[serde(default)]
    pub total_answers: u32,
    #[serde(default)]
    pub agree_ratio: f64,
    #[serde(default)]
    pub my_answer: Option<AnswerChoice>,
    #[serde(default)]
    pub my_answer_id: Option<i64>,
    pub answer_url: String,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub edit_url: Option<String>,
    #[serde(default)]
    pub delete_url: Option<String>,
}

impl Question {
    /// Whether the current user has recorded an answer.
    ///
    /// Invariant: `my_answer` is present exactly when `my_answer_id` is.
    pub fn is_answered(&self) -> bool {
        self.my_answer.is_some()
    }

    /// Share of yes answers as a percentage, 0.0 when nobody answered.
    pub fn computed_agree_ratio(&self) -> f64 {
        if self.total_answers == 0 {
            0.0
        } else {
            f64::from(self.yes_count) * 100.0 / f64::from(self.total_answers)
        }
    }
}

/// Formats a percentage with one decimal and a decimal comma, the way the
/// survey templates render ratios (`80.0` -> `"80,0"`).
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}").replace('.', ",")
}

// ============================================================================
// Response Payloads
// ============================================================================

/// Payload of the questions JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionList {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub total_users: u32,
}

/// Server response to submitting or editing an answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub question_id: Option<i64>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub yes_count: Option<u32>,
    #[serde(default)]
    pub agree_ratio: f64,
    /// Authoritative unanswered count. Absent on older backends; callers
    /// fall back to a local decrement.
    #[serde(default)]
    pub unanswered_count: Option<u32>,
    #[serde(default)]
    pub answer_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub edit_url: Option<String>,
    #[serde(default)]
    pub delete_url: Option<String>,
}

/// Server response to deleting an answer.
///
/// Carries enough of the question back that the caller can rebuild a
/// list row without another fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletedAnswer {
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub unanswered_count: Option<u32>,
    #[serde(default)]
    pub question_id: i64,
    #[serde(default)]
    pub question_url: String,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub agree_ratio: f64,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub edit_url: Option<String>,
    #[serde(default)]
    pub delete_url: Option<String>,
}

impl DeletedAnswer {
    /// Rebuilds the now-unanswered question from the snapshot the server
    /// returned, so it can go straight back into the unanswered set.
    pub fn reinserted_question(&self) -> Question {
        let yes_count = (self.agree_ratio * f64::from(self.total) / 100.0).round() as u32;
        Question {
            id: self.question_id,
            text: self.question_text.clone(),
            created_at: None,
            yes_count,
            no_count: self.total.saturating_sub(yes_count),
            total_answers: self.total,
            agree_ratio: self.agree_ratio,
            my_answer: None,
            my_answer_id: None,
            answer_url: self.question_url.clone(),
            can_edit: self.can_edit,
            edit_url: self.edit_url.clone(),
            delete_url: self.delete_url.clone(),
        }
    }
}

/// Server response to deleting a question. Backends answer with either
/// `hidden` (soft delete) or `deleted`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionDeleted {
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
}

impl QuestionDeleted {
    pub fn succeeded(&self) -> bool {
        self.hidden || self.deleted
    }
}
