//! Record Normalizer
//!
//! Maps raw store records onto canonical records via the declared field
//! maps. Missing fields take per-field defaults, lookup columns unwrap from
//! their single-element list shape, and display coercions (durations,
//! dates, tuition text) are applied here so downstream view logic only ever
//! sees one representation. A malformed field degrades to its default; a
//! record with no usable payload is dropped, never a panic.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

use crate::store::models::{
    Deadline, EvaluationItem, MeetingNote, Mentor, RawRecord, StudentRecord, Submission,
};
use crate::store::value::FieldValue;

/// Remote column names for the student collection
pub mod student_fields {
    pub const NAME: &str = "Student Cohort Application Tracker";
    pub const MENTOR_NAME: &str = "Mentor Name";
    pub const MENTOR_EMAIL: &str = "Mentor Email";
    pub const RESEARCH_AREA: &str = "Research Area - First Preference";
    pub const CITY: &str = "City of Residence";
    pub const GRADUATION_YEAR: &str = "Graduation Year";
    pub const MENTOR_CONFIRMATION: &str = "Mentor Confirmation";
    pub const BACKGROUND_SHARED: &str = "OB: Mentor Background Shared";
    pub const EXPECTED_MEETINGS: &str = "Number of Expected Meetings - Student/Mentor";
    pub const COMPLETED_MEETINGS: &str =
        "Total No. of Meetings Completed (Accounted for 1 No Show)";
    pub const NOTES_SUMMARY: &str = "Mentor-Student Notes Summary";
    pub const HOURS_RECORDED: &str = "[Current + Archived] No. of Hours Recorded";
    pub const FOUNDATION_STUDENT: &str = "Foundation Student";
    pub const TUITION_PAID: &str = "OB: Full Tuition Paid";
    pub const PROGRAM_MANAGER_EMAIL: &str = "Program Manager Email";
    pub const PROGRAM_MANAGER_NAME: &str = "Program Manager (Text)";
    pub const REVISED_FINAL_PAPER_DUE: &str = "PM: Student's Revised Final Paper - Due date";
    pub const STUDENT_NO_SHOWS: &str =
        "[Current + Archived] No. of Student No Shows in Mentor Meetings";
    pub const REASON_FOR_INTEREST: &str = "Reason for Interest in Areas";
    pub const WHITE_LABEL: &str = "White Label or Partner Payment Program";
    pub const PREVIOUS_COURSEWORK: &str = "Previous Coursework";
    pub const INTERVIEW_NOTES: &str = "Interview Notes For The Mentor";
    pub const PREFERRED_NAME: &str = "Preferred Name";
    pub const STUDENT_STATUS: &str = "PM: Student Status in Program";
    pub const CURRENT_GRADE: &str = "Current Grade in School";
    pub const COUNTRY: &str = "Country of Residence (single select)";
    pub const WRITING_COACH_NAME: &str = "Writing Coach Name (Text)";
    pub const WRITING_COACH_EMAIL: &str = "Writing Coach Email";
    pub const PUBLICATION_SPECIALIST_NAME: &str = "Publication Specialist (Text)";
    pub const PUBLICATION_SPECIALIST_EMAIL: &str = "Publication Specialist Email";
    pub const PUBLICATION_MARKER: &str = "publication marker";
    pub const PUBLICATION_STATUS: &str = "PS: Latest Publication Outcome - Latest";
    pub const MENTOR_HOURLY_RATE: &str = "FN: Mentor Hourly Base Rate";
    pub const EVALUATION_FORM_LINK: &str = "Evaluation form link";
    pub const REVISED_PAPER_UPLOAD: &str =
        "Revised Final Paper upload (from Mentor-Student Progress Up Date)";
    pub const MENTOR_PAYMENT_STATUS: &str = "FN: Mentor Payment Status (Total)";
    pub const PAYMENT_DATE_1: &str = "FN: 1st Payment date to Mentor";
    pub const PAYMENT_DATE_2: &str = "FN: 2nd Payment date to Mentor";
    pub const PAYMENT_DATE_3: &str = "FN: 3rd Pay Date";

    // Filter-only columns, never fetched into the record
    pub const CONFIRMED_LAUNCHED: &str = "Student Confirmed & Launched";
    pub const PARTICIPATION_DECISION: &str = "Written Confirmation/Participation Decision";
    pub const UPCOMING_COHORT: &str = "Upcoming Cohort (Cohort Table)";

    /// Exact field subset requested on student list queries. Keeps the
    /// store from returning every column of a wide table.
    pub const FETCH: [&str; 39] = [
        MENTOR_EMAIL,
        NAME,
        MENTOR_NAME,
        RESEARCH_AREA,
        CITY,
        GRADUATION_YEAR,
        MENTOR_CONFIRMATION,
        BACKGROUND_SHARED,
        EXPECTED_MEETINGS,
        COMPLETED_MEETINGS,
        NOTES_SUMMARY,
        HOURS_RECORDED,
        FOUNDATION_STUDENT,
        TUITION_PAID,
        PROGRAM_MANAGER_EMAIL,
        PROGRAM_MANAGER_NAME,
        REVISED_FINAL_PAPER_DUE,
        STUDENT_NO_SHOWS,
        REASON_FOR_INTEREST,
        WHITE_LABEL,
        PREVIOUS_COURSEWORK,
        INTERVIEW_NOTES,
        PREFERRED_NAME,
        STUDENT_STATUS,
        CURRENT_GRADE,
        COUNTRY,
        WRITING_COACH_NAME,
        WRITING_COACH_EMAIL,
        PUBLICATION_SPECIALIST_NAME,
        PUBLICATION_SPECIALIST_EMAIL,
        PUBLICATION_MARKER,
        PUBLICATION_STATUS,
        MENTOR_HOURLY_RATE,
        EVALUATION_FORM_LINK,
        REVISED_PAPER_UPLOAD,
        MENTOR_PAYMENT_STATUS,
        PAYMENT_DATE_1,
        PAYMENT_DATE_2,
        PAYMENT_DATE_3,
    ];
}

/// Remote column names for the mentor collection
pub mod mentor_fields {
    pub const EMAIL: &str = "Email";
    pub const NAME: &str = "Name";
    pub const MENTOR_NAME: &str = "Mentor Name";
    pub const CONTRACTOR_STATUS: &str = "Contractor/Volunteer Status";

    pub const FOUNDATION_VOLUNTEER: &str = "Foundation Volunteer";
}

/// Remote column names for the deadline collection
pub mod deadline_fields {
    pub const NAME: &str = "Deadline Name";
    pub const TYPE: &str = "Deadline Type";
    pub const DUE_DATE: &str = "Due Date (in use, updated to reflect student's timeline)";
    pub const STATUS: &str = "Deadline Status";
    pub const DATE_SUBMITTED: &str = "Date Submitted";

    /// Submission file columns; attachments or lookup links
    pub const SUBMISSION_FIELDS: [&str; 8] = [
        "Syllabus Submission (From Mentor)",
        "Research Question",
        "Research Proposal",
        "Research Outline",
        "Milestone",
        "Final Paper",
        "Revised Final Paper",
        "Target Publication Submission",
    ];
}

/// Remote column names for the progress/evaluations collection
pub mod progress_fields {
    pub const MEETING_KEY: &str = "Mentor Student Meeting Key";
    pub const RECORD_TYPE: &str = "Type of Record";
    pub const MEETING_DATE: &str = "Date of meeting";
    pub const MEETING_NOTES: &str = "Meeting Notes Between Mentor & Student";
    pub const EVAL_FORM: &str = "MFFF - Evaluation form";

    pub const TYPE_MENTOR_UPDATE: &str = "Mentor Update";
    pub const TYPE_EVALUATION: &str = "Evaluation & Feedback";
}

/// The textual key used to relate deadlines and progress records back to a
/// student: the display name's prefix before `|`, trimmed. Matching against
/// it is substring containment on the remote side — students whose trimmed
/// prefix is a substring of another's will cross-match, a limitation carried
/// over from the source system. Swapping in an id-based join only requires
/// replacing this derivation and the query formulas that use it.
pub fn student_match_key(display_name: &str) -> &str {
    display_name.split('|').next().unwrap_or(display_name).trim()
}

pub fn normalize_mentor(record: &RawRecord) -> Mentor {
    let f = &record.fields;
    let mut name = FieldValue::of(f, mentor_fields::NAME).text("");
    if name.is_empty() {
        name = FieldValue::of(f, mentor_fields::MENTOR_NAME).text("");
    }
    let statuses = FieldValue::of(f, mentor_fields::CONTRACTOR_STATUS).text_list();

    Mentor {
        id: record.id.clone(),
        name,
        email: FieldValue::of(f, mentor_fields::EMAIL).text(""),
        is_foundation_volunteer: statuses
            .iter()
            .any(|s| s == mentor_fields::FOUNDATION_VOLUNTEER),
    }
}

/// Normalize a raw student record. Returns `None` for a record with no
/// usable field payload; such records are dropped from result sets.
pub fn normalize_student(record: &RawRecord) -> Option<StudentRecord> {
    use student_fields as sf;

    if record.fields.is_empty() {
        return None;
    }
    let f = &record.fields;
    let field = |name: &str| FieldValue::of(f, name);

    let mentor_emails = field(sf::MENTOR_EMAIL)
        .text_list()
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    Some(StudentRecord {
        id: record.id.clone(),
        mentor_emails,
        name: field(sf::NAME).text("Unknown"),
        research_area: field(sf::RESEARCH_AREA).text(""),
        city: field(sf::CITY).text(""),
        graduation_year: field(sf::GRADUATION_YEAR).text(""),
        mentor_confirmation: field(sf::MENTOR_CONFIRMATION).text(""),
        background_shared: field(sf::BACKGROUND_SHARED).text(""),
        expected_meetings: field(sf::EXPECTED_MEETINGS).number().unwrap_or(0.0) as i64,
        completed_meetings: field(sf::COMPLETED_MEETINGS).number().unwrap_or(0.0),
        notes_summary: field(sf::NOTES_SUMMARY).text(""),
        hours_recorded: format_duration(&field(sf::HOURS_RECORDED)),
        foundation_student: field(sf::FOUNDATION_STUDENT).text(""),
        tuition_paid: normalize_tuition_paid(&field(sf::TUITION_PAID).text("")),
        program_manager_email: field(sf::PROGRAM_MANAGER_EMAIL).unwrapped_text(""),
        program_manager_name: field(sf::PROGRAM_MANAGER_NAME).unwrapped_text(""),
        revised_final_paper_due: field(sf::REVISED_FINAL_PAPER_DUE).unwrapped_text(""),
        student_no_shows: field(sf::STUDENT_NO_SHOWS).number().unwrap_or(0.0) as i64,
        reason_for_interest: field(sf::REASON_FOR_INTEREST).unwrapped_text(""),
        white_label: field(sf::WHITE_LABEL).unwrapped_text(""),
        previous_coursework: field(sf::PREVIOUS_COURSEWORK).unwrapped_text(""),
        interview_notes: field(sf::INTERVIEW_NOTES).unwrapped_text(""),
        preferred_name: field(sf::PREFERRED_NAME).text(""),
        student_status: field(sf::STUDENT_STATUS).text(""),
        current_grade: field(sf::CURRENT_GRADE).text(""),
        country: field(sf::COUNTRY).unwrapped_text(""),
        writing_coach_name: field(sf::WRITING_COACH_NAME).text(""),
        writing_coach_email: field(sf::WRITING_COACH_EMAIL).unwrapped_text(""),
        publication_specialist_name: field(sf::PUBLICATION_SPECIALIST_NAME).text(""),
        publication_specialist_email: field(sf::PUBLICATION_SPECIALIST_EMAIL).unwrapped_text(""),
        publication_marker: field(sf::PUBLICATION_MARKER).unwrapped_text(""),
        publication_status: field(sf::PUBLICATION_STATUS).unwrapped_text(""),
        mentor_hourly_rate: field(sf::MENTOR_HOURLY_RATE).number(),
        evaluation_form_link: field(sf::EVALUATION_FORM_LINK).unwrapped_text(""),
        revised_paper_upload: field(sf::REVISED_PAPER_UPLOAD).attachments(),
        mentor_payment_status: field(sf::MENTOR_PAYMENT_STATUS).unwrapped_text(""),
        payment_date_1: field(sf::PAYMENT_DATE_1).unwrapped_text(""),
        payment_date_2: field(sf::PAYMENT_DATE_2).unwrapped_text(""),
        payment_date_3: field(sf::PAYMENT_DATE_3).unwrapped_text(""),
    })
}

pub fn normalize_deadline(record: &RawRecord) -> Deadline {
    use deadline_fields as df;

    let f = &record.fields;
    let text_opt = |name: &str| {
        let value = FieldValue::of(f, name).unwrapped_text("");
        (!value.is_empty()).then_some(value)
    };

    let mut submissions = BTreeMap::new();
    for field_name in df::SUBMISSION_FIELDS {
        let value = FieldValue::of(f, field_name);
        if value.is_empty() {
            continue;
        }
        let submission = match &value {
            FieldValue::List(_) => Submission::Files(value.submission_files()),
            other => Submission::Inline(other.text("")),
        };
        submissions.insert(field_name.to_string(), submission);
    }

    Deadline {
        id: record.id.clone(),
        name: FieldValue::of(f, df::NAME).text(""),
        kind: FieldValue::of(f, df::TYPE).text(""),
        due_date: text_opt(df::DUE_DATE),
        status: FieldValue::of(f, df::STATUS).text(""),
        date_submitted: text_opt(df::DATE_SUBMITTED),
        submissions,
    }
}

pub fn normalize_meeting_note(record: &RawRecord) -> MeetingNote {
    let f = &record.fields;
    MeetingNote {
        date: FieldValue::of(f, progress_fields::MEETING_DATE).unwrapped_text(""),
        notes: FieldValue::of(f, progress_fields::MEETING_NOTES).text(""),
    }
}

pub fn normalize_evaluation(record: &RawRecord) -> EvaluationItem {
    EvaluationItem {
        created_time: record.created_time.clone(),
        attachments: FieldValue::of(&record.fields, progress_fields::EVAL_FORM).attachments(),
    }
}

/// Render a duration as `H:MM`. The store returns duration columns either
/// as raw seconds or as an already-formatted string.
pub fn format_duration(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) if !s.is_empty() => s.clone(),
        FieldValue::Number(n) => {
            let total = *n as i64;
            format!("{}:{:02}", total / 3600, (total % 3600) / 60)
        }
        FieldValue::List(items) => items
            .first()
            .map(format_duration)
            .unwrap_or_else(|| "N/A".to_string()),
        _ => "N/A".to_string(),
    }
}

/// Render a `YYYY-MM-DD` date for display, e.g. `March 1st, 2026`.
/// Unparseable input is shown as-is; empty input shows `Not set`.
pub fn format_date(raw: &str) -> String {
    if raw.is_empty() {
        return "Not set".to_string();
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => {
            let day = date.day();
            let suffix = match day {
                11..=13 => "th",
                _ => match day % 10 {
                    1 => "st",
                    2 => "nd",
                    3 => "rd",
                    _ => "th",
                },
            };
            format!("{} {}{}, {}", date.format("%B"), day, suffix, date.year())
        }
        Err(_) => raw.to_string(),
    }
}

/// Render an ISO UTC datetime in IST (UTC+5:30), e.g. `Feb 1, 2026 12:19 AM IST`.
/// Falls back to plain date rendering for non-datetime input.
pub fn format_datetime_ist(raw: &str) -> String {
    if raw.is_empty() {
        return "Not set".to_string();
    }
    let cleaned = raw.trim_matches(|c| c == '\'' || c == '"');
    if cleaned.is_empty() {
        return "Not set".to_string();
    }
    match NaiveDateTime::parse_from_str(cleaned, "%Y-%m-%dT%H:%M:%S%.fZ") {
        Ok(utc) => {
            let ist = utc + chrono::Duration::minutes(5 * 60 + 30);
            ist.format("%b %-d, %Y %-I:%M %p IST").to_string()
        }
        Err(_) => format_date(cleaned),
    }
}

/// Collapse free-text tuition/payment values to a binary Yes/No. Negative
/// markers are checked before positive ones so "pending payment" never
/// reads as paid. Empty and placeholder values pass through untouched.
pub fn normalize_tuition_paid(value: &str) -> String {
    if value.is_empty() || value == "—" {
        return value.to_string();
    }
    let v = value.trim().to_lowercase();
    if v == "yes" {
        return "Yes".to_string();
    }
    if v == "no" {
        return "No".to_string();
    }
    if v.contains("pending") || v.contains("clarification") {
        return "No".to_string();
    }
    if v.contains("paid") || v.contains("pay") {
        return "Yes".to_string();
    }
    "No".to_string()
}
