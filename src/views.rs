//! Derived View Builder
//!
//! Pure functions that turn normalized records into the sorted and
//! classified structures the UI consumes: the tri-tier due-date ordering,
//! the overdue predicate, status badges, deadline alert banners, and the
//! per-student cross-collection aggregation. Every function takes the
//! current moment as an argument so behavior is fixed under test.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::store::models::{Deadline, EvaluationItem, MeetingNote, StudentRecord};
use crate::store::normalize::{format_date, format_datetime_ist};

/// Deadline status value the store uses for completed submissions
pub const STATUS_SUBMITTED: &str = "Submitted";

/// Deadline type owned by the mentor rather than the student
pub const TYPE_SYLLABUS: &str = "Syllabus";
pub const TYPE_EVALUATION: &str = "Evaluation & Feedback";

/// Sort-key sentinel placing undated records last
const FAR_FUTURE: &str = "9999-99-99";

/// Read-time classification of a deadline; never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBadge {
    /// Submitted
    Success,
    /// Not submitted and past due
    Error,
    /// Not submitted, not yet due
    Pending,
}

/// Tri-tier sort key for due-date ordering: (0) due today or later, date
/// ascending; (1) due strictly in the past, date ascending; (2) no or
/// unparseable date, last. Total — every record maps to exactly one tier.
pub fn due_date_sort_key(due: Option<&str>, today: NaiveDate) -> (u8, String) {
    let Some(raw) = due.filter(|s| !s.is_empty()) else {
        return (2, FAR_FUTURE.to_string());
    };
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) if date >= today => (0, raw.to_string()),
        Ok(_) => (1, raw.to_string()),
        Err(_) => (2, FAR_FUTURE.to_string()),
    }
}

/// Order students by their revised-final-paper due date: upcoming soonest
/// first, then overdue, then no date
pub fn sort_students_by_due(students: &mut [StudentRecord], today: NaiveDate) {
    students.sort_by_key(|s| due_date_sort_key(Some(&s.revised_final_paper_due), today));
}

/// A deadline is overdue iff it is not submitted, has a due date, and that
/// date is before the current moment. No due date is never overdue.
pub fn is_overdue(due: Option<&str>, status: &str, now: NaiveDateTime) -> bool {
    if status == STATUS_SUBMITTED {
        return false;
    }
    let Some(raw) = due.filter(|s| !s.is_empty()) else {
        return false;
    };
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.and_time(NaiveTime::MIN) < now,
        Err(_) => false,
    }
}

pub fn status_badge(due: Option<&str>, status: &str, now: NaiveDateTime) -> StatusBadge {
    if status == STATUS_SUBMITTED {
        StatusBadge::Success
    } else if is_overdue(due, status, now) {
        StatusBadge::Error
    } else {
        StatusBadge::Pending
    }
}

/// A deadline paired with its read-time classification and display dates
#[derive(Debug, Clone, Serialize)]
pub struct DeadlineView {
    #[serde(flatten)]
    pub deadline: Deadline,
    pub badge: StatusBadge,
    pub due_display: String,
    pub submitted_display: String,
}

pub fn classify_deadline(deadline: &Deadline, now: NaiveDateTime) -> DeadlineView {
    DeadlineView {
        badge: status_badge(deadline.due_date.as_deref(), &deadline.status, now),
        due_display: format_date(deadline.due_date.as_deref().unwrap_or("")),
        submitted_display: format_datetime_ist(deadline.date_submitted.as_deref().unwrap_or("")),
        deadline: deadline.clone(),
    }
}

/// One overdue entry of the alert banner
#[derive(Debug, Clone, Serialize)]
pub struct OverdueAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub due_display: String,
}

/// The next upcoming pending deadline
#[derive(Debug, Clone, Serialize)]
pub struct NextDeadline {
    #[serde(rename = "type")]
    pub kind: String,
    pub due_display: String,
    pub days_left: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeadlineAlerts {
    pub overdue: Vec<OverdueAlert>,
    pub next_up: Option<NextDeadline>,
}

/// Compute the overdue and next-deadline banners over pending deadlines.
/// Expects the input already in due-date ascending order, so the first
/// future entry is the next one up.
pub fn deadline_alerts(deadlines: &[Deadline], now: NaiveDateTime) -> DeadlineAlerts {
    let mut alerts = DeadlineAlerts::default();

    for deadline in deadlines {
        if deadline.status == STATUS_SUBMITTED {
            continue;
        }
        let Some(raw) = deadline.due_date.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
            continue;
        };
        let due = date.and_time(NaiveTime::MIN);
        if due < now {
            alerts.overdue.push(OverdueAlert {
                kind: deadline.kind.clone(),
                due_display: format_date(raw),
            });
        } else if alerts.next_up.is_none() {
            alerts.next_up = Some(NextDeadline {
                kind: deadline.kind.clone(),
                due_display: format_date(raw),
                days_left: (due - now).num_days(),
            });
        }
    }

    alerts
}

/// Mentor-facing deadlines for one student: the syllabus plus the
/// evaluation & feedback rows
#[derive(Debug, Clone, Default, Serialize)]
pub struct MentorSubmissions {
    pub syllabus: Vec<DeadlineView>,
    pub evaluations: Vec<DeadlineView>,
}

/// Everything the student detail page needs, joined across collections
#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    /// Student-facing deadlines, Syllabus excluded, due date ascending
    pub deadlines: Vec<DeadlineView>,
    pub alerts: DeadlineAlerts,
    /// Mentor-update notes, newest first
    pub meeting_notes: Vec<MeetingNote>,
    /// Evaluation & feedback records, newest first
    pub evaluations: Vec<EvaluationItem>,
    pub mentor_submissions: MentorSubmissions,
}

/// Join one student's deadlines, meeting notes, and evaluation items into
/// the detail view. Deadlines of type Syllabus are mentor-facing and are
/// split out with the evaluation rows into `mentor_submissions`.
pub fn student_detail(
    all_deadlines: &[Deadline],
    meeting_notes: Vec<MeetingNote>,
    evaluations: Vec<EvaluationItem>,
    now: NaiveDateTime,
) -> StudentDetail {
    let student_deadlines: Vec<Deadline> = all_deadlines
        .iter()
        .filter(|d| d.kind != TYPE_SYLLABUS)
        .cloned()
        .collect();

    StudentDetail {
        alerts: deadline_alerts(&student_deadlines, now),
        deadlines: student_deadlines
            .iter()
            .map(|d| classify_deadline(d, now))
            .collect(),
        meeting_notes,
        evaluations,
        mentor_submissions: MentorSubmissions {
            syllabus: all_deadlines
                .iter()
                .filter(|d| d.kind == TYPE_SYLLABUS)
                .map(|d| classify_deadline(d, now))
                .collect(),
            evaluations: all_deadlines
                .iter()
                .filter(|d| d.kind == TYPE_EVALUATION)
                .map(|d| classify_deadline(d, now))
                .collect(),
        },
    }
}

/// Whether the mentor's evaluation counts as submitted. Inferred from the
/// evaluation link being present at all — the source system records no
/// explicit status, so "record exists" stands in for "submission complete".
pub fn eval_submitted(student: &StudentRecord) -> bool {
    !student.evaluation_form_link.trim().is_empty()
}

/// Whether the student's revised final paper has been uploaded
pub fn paper_submitted(student: &StudentRecord) -> bool {
    !student.revised_paper_upload.is_empty()
}

/// Display rendering for the mentor's hourly base rate
pub fn format_hourly_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("${}/hr", rate),
        None => "Not specified".to_string(),
    }
}

/// Mentor payment information derived from one student record
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInfo {
    pub hourly_rate_display: String,
    pub eval_submitted: bool,
    pub paper_submitted: bool,
    pub payment_status: String,
    /// Display-formatted payment dates, empty slots omitted
    pub payment_dates: Vec<String>,
    pub includes_publication: bool,
}

pub fn payment_info(student: &StudentRecord) -> PaymentInfo {
    PaymentInfo {
        hourly_rate_display: format_hourly_rate(student.mentor_hourly_rate),
        eval_submitted: eval_submitted(student),
        paper_submitted: paper_submitted(student),
        payment_status: if student.mentor_payment_status.is_empty() {
            "Not specified".to_string()
        } else {
            student.mentor_payment_status.clone()
        },
        payment_dates: [
            &student.payment_date_1,
            &student.payment_date_2,
            &student.payment_date_3,
        ]
        .into_iter()
        .filter(|d| !d.is_empty())
        .map(|d| format_date(d))
        .collect(),
        includes_publication: student.publication_marker.trim().to_lowercase() == "yes",
    }
}

/// A student record paired with its derived payment view, as served in the
/// confirmed-students list
#[derive(Debug, Serialize)]
pub struct StudentSummary {
    #[serde(flatten)]
    pub student: StudentRecord,
    pub payment: PaymentInfo,
}

pub fn student_summaries(students: Vec<StudentRecord>) -> Vec<StudentSummary> {
    students
        .into_iter()
        .map(|student| StudentSummary {
            payment: payment_info(&student),
            student,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn now() -> NaiveDateTime {
        today().and_hms_opt(12, 0, 0).unwrap()
    }

    fn deadline(kind: &str, due: Option<&str>, status: &str) -> Deadline {
        Deadline {
            id: format!("rec-{}", kind),
            name: format!("Jane Doe - {}", kind),
            kind: kind.to_string(),
            due_date: due.map(str::to_string),
            status: status.to_string(),
            ..Deadline::default()
        }
    }

    #[test]
    fn test_tri_tier_sort_order() {
        let mut keys = vec![
            ("past", due_date_sort_key(Some("2025-01-01"), today())),
            ("none", due_date_sort_key(None, today())),
            ("future", due_date_sort_key(Some("2099-01-01"), today())),
        ];
        keys.sort_by(|a, b| a.1.cmp(&b.1));

        let order: Vec<&str> = keys.iter().map(|(label, _)| *label).collect();
        assert_eq!(order, vec!["future", "past", "none"]);
    }

    #[test]
    fn test_sort_students_by_due() {
        let student = |name: &str, due: &str| StudentRecord {
            name: name.to_string(),
            revised_final_paper_due: due.to_string(),
            ..StudentRecord::default()
        };
        let mut students = vec![
            student("overdue", "2025-01-01"),
            student("undated", ""),
            student("soon", "2026-06-03"),
            student("later", "2026-07-01"),
        ];
        sort_students_by_due(&mut students, today());

        let order: Vec<&str> = students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(order, vec!["soon", "later", "overdue", "undated"]);
    }

    #[test]
    fn test_is_overdue() {
        assert!(is_overdue(Some("2020-01-01"), "Not Submitted", now()));
        assert!(!is_overdue(Some("2020-01-01"), "Submitted", now()));
        assert!(!is_overdue(None, "Not Submitted", now()));
        assert!(!is_overdue(Some(""), "Not Submitted", now()));
        assert!(!is_overdue(Some("2099-01-01"), "Not Submitted", now()));
        assert!(!is_overdue(Some("someday"), "Not Submitted", now()));
    }

    #[test]
    fn test_status_badge() {
        assert_eq!(
            status_badge(Some("2020-01-01"), "Submitted", now()),
            StatusBadge::Success
        );
        assert_eq!(
            status_badge(Some("2020-01-01"), "Not Submitted", now()),
            StatusBadge::Error
        );
        assert_eq!(
            status_badge(Some("2099-01-01"), "Not Submitted", now()),
            StatusBadge::Pending
        );
        assert_eq!(status_badge(None, "Not Submitted", now()), StatusBadge::Pending);
    }

    #[test]
    fn test_deadline_alerts() {
        let deadlines = vec![
            deadline("Research Question", Some("2026-01-10"), "Not Submitted"),
            deadline("Research Proposal", Some("2026-02-01"), "Submitted"),
            deadline("Milestone", Some("2026-06-04"), "Not Submitted"),
            deadline("Final Paper", Some("2026-07-01"), "Not Submitted"),
            deadline("Outline", None, "Not Submitted"),
        ];

        let alerts = deadline_alerts(&deadlines, now());
        assert_eq!(alerts.overdue.len(), 1);
        assert_eq!(alerts.overdue[0].kind, "Research Question");

        let next = alerts.next_up.unwrap();
        assert_eq!(next.kind, "Milestone");
        assert_eq!(next.days_left, 2);
    }

    #[test]
    fn test_student_detail_splits_mentor_deadlines() {
        let deadlines = vec![
            deadline("Syllabus", Some("2026-01-05"), "Submitted"),
            deadline("Research Question", Some("2026-06-10"), "Not Submitted"),
            deadline("Evaluation & Feedback", Some("2026-07-20"), "Not Submitted"),
        ];

        let detail = student_detail(&deadlines, Vec::new(), Vec::new(), now());

        let kinds: Vec<&str> = detail
            .deadlines
            .iter()
            .map(|d| d.deadline.kind.as_str())
            .collect();
        assert_eq!(kinds, vec!["Research Question", "Evaluation & Feedback"]);

        assert_eq!(detail.mentor_submissions.syllabus.len(), 1);
        assert_eq!(detail.mentor_submissions.evaluations.len(), 1);
        assert_eq!(detail.deadlines[0].badge, StatusBadge::Pending);
        assert_eq!(detail.deadlines[0].due_display, "June 10th, 2026");
    }

    #[test]
    fn test_eval_submitted_inferred_from_presence() {
        let mut student = StudentRecord::default();
        assert!(!eval_submitted(&student));
        student.evaluation_form_link = "https://forms.example/eval".to_string();
        assert!(eval_submitted(&student));
    }

    #[test]
    fn test_payment_info() {
        let student = StudentRecord {
            mentor_hourly_rate: Some(50.0),
            mentor_payment_status: "1st Payment Made".to_string(),
            payment_date_1: "2026-02-01".to_string(),
            publication_marker: "Yes".to_string(),
            ..StudentRecord::default()
        };

        let info = payment_info(&student);
        assert_eq!(info.hourly_rate_display, "$50/hr");
        assert_eq!(info.payment_status, "1st Payment Made");
        assert_eq!(info.payment_dates, vec!["February 1st, 2026".to_string()]);
        assert!(info.includes_publication);
        assert!(!info.eval_submitted);
        assert!(!info.paper_submitted);

        let empty = payment_info(&StudentRecord::default());
        assert_eq!(empty.hourly_rate_display, "Not specified");
        assert_eq!(empty.payment_status, "Not specified");
        assert!(empty.payment_dates.is_empty());
        assert!(!empty.includes_publication);
    }
}
