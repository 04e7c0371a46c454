//! Record Models
//!
//! Raw records as returned by the remote store, and the canonical shapes the
//! rest of the server works with. Canonical records contain only plain
//! scalars, plain strings, or explicit attachment lists — the raw store's
//! list-wrapped lookup values never leak past normalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A raw record from the remote store: an opaque id plus a free-form field map
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default, rename = "createdTime")]
    pub created_time: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// One page of query results from the remote store
#[derive(Debug, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<RawRecord>,
    /// Cursor for the next page, when the store has more rows
    pub offset: Option<String>,
}

/// A file attached to a record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

/// A mentor looked up from the mentor collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mentor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_foundation_volunteer: bool,
}

/// A normalized student record.
///
/// Field-by-field mirror of the student collection's mentor-facing columns.
/// String fields default to `""`, counters to zero; lookup columns are
/// unwrapped from their single-element list shape during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    /// Linked mentor emails, lower-cased for matching
    pub mentor_emails: Vec<String>,
    pub name: String,
    pub research_area: String,
    pub city: String,
    pub graduation_year: String,
    pub mentor_confirmation: String,
    pub background_shared: String,
    pub expected_meetings: i64,
    pub completed_meetings: f64,
    pub notes_summary: String,
    /// Rendered as `H:MM` during normalization
    pub hours_recorded: String,
    pub foundation_student: String,
    /// Collapsed to Yes/No during normalization
    pub tuition_paid: String,
    pub program_manager_email: String,
    pub program_manager_name: String,
    pub revised_final_paper_due: String,
    pub student_no_shows: i64,
    pub reason_for_interest: String,
    pub white_label: String,
    pub previous_coursework: String,
    pub interview_notes: String,
    pub preferred_name: String,
    pub student_status: String,
    pub current_grade: String,
    pub country: String,
    pub writing_coach_name: String,
    pub writing_coach_email: String,
    pub publication_specialist_name: String,
    pub publication_specialist_email: String,
    pub publication_marker: String,
    pub publication_status: String,
    pub mentor_hourly_rate: Option<f64>,
    pub evaluation_form_link: String,
    pub revised_paper_upload: Vec<Attachment>,
    pub mentor_payment_status: String,
    pub payment_date_1: String,
    pub payment_date_2: String,
    pub payment_date_3: String,
}

/// A normalized deadline record, owned by one student via the name relation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub due_date: Option<String>,
    pub status: String,
    pub date_submitted: Option<String>,
    /// Submission-field-name → submitted content
    pub submissions: BTreeMap<String, Submission>,
}

/// Submitted content attached to a deadline: either a list of files or a
/// single inline value (a link, or opaque literal text rendered as-is)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submission {
    Files(Vec<SubmissionFile>),
    Inline(String),
}

/// One entry of a file-list submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionFile {
    File(Attachment),
    Literal(String),
}

impl Submission {
    /// True for inline values that look like a downloadable link
    pub fn is_link(&self) -> bool {
        matches!(self, Submission::Inline(v) if v.starts_with("http"))
    }
}

/// A mentor-update meeting note scoped to one student
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingNote {
    pub date: String,
    pub notes: String,
}

/// An evaluation & feedback record scoped to one student
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub created_time: String,
    pub attachments: Vec<Attachment>,
}
