//! Portal Query Service
//!
//! The read paths behind every portal view: mentor lookup, the confirmed and
//! prospective student lists, and the per-student deadline/progress
//! collections. All reads go through the query cache, and every upstream
//! failure is logged and degraded to an empty result at this boundary —
//! handlers never see a partial list mixed with an error.

use chrono::NaiveDateTime;
use std::time::Duration;

use crate::config::StoreConfig;
use crate::store::cache::QueryCache;
use crate::store::filter::{Expr, field, text};
use crate::store::gateway::RecordSource;
use crate::store::models::{Deadline, EvaluationItem, MeetingNote, Mentor, StudentRecord};
use crate::store::normalize::{
    deadline_fields, mentor_fields, normalize_deadline, normalize_evaluation,
    normalize_meeting_note, normalize_mentor, normalize_student, progress_fields,
    student_fields, student_match_key,
};
use crate::views::{self, StudentDetail};

const FAR_FUTURE: &str = "9999-99-99";

/// Collection identifiers within the remote store
#[derive(Debug, Clone)]
pub struct Collections {
    pub students: String,
    pub deadlines: String,
    pub mentors: String,
    pub progress: String,
}

impl Collections {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            students: config.students_table.clone(),
            deadlines: config.deadlines_table.clone(),
            mentors: config.mentors_table.clone(),
            progress: config.progress_table.clone(),
        }
    }
}

/// Cached, failure-degrading read service over the record store
pub struct PortalService<S> {
    store: S,
    collections: Collections,
    cache: QueryCache,
    ttl: Duration,
}

impl<S: RecordSource> PortalService<S> {
    pub fn new(store: S, collections: Collections, ttl: Duration) -> Self {
        Self {
            store,
            collections,
            cache: QueryCache::new(),
            ttl,
        }
    }

    /// Find a mentor by case-insensitive email. First match wins when the
    /// collection holds duplicates.
    pub async fn mentor_by_email(&self, email: &str) -> Option<Mentor> {
        let email = email.trim().to_lowercase();
        self.cache
            .cached("mentor_by_email", &email, self.ttl, || async {
                let formula = field(mentor_fields::EMAIL)
                    .lower()
                    .eq(text(&email).lower())
                    .render();
                match self.store.query(&self.collections.mentors, &formula, None).await {
                    Ok(records) => records.first().map(normalize_mentor),
                    Err(e) => {
                        tracing::error!("Error fetching mentor: {}", e);
                        None
                    }
                }
            })
            .await
    }

    /// Confirmed & launched students linked to a mentor's email
    pub async fn confirmed_students(&self, mentor_email: &str) -> Vec<StudentRecord> {
        let email = mentor_email.trim().to_lowercase();
        self.cache
            .cached("confirmed_students", &email, self.ttl, || async {
                let formula = Expr::and(vec![
                    field(student_fields::CONFIRMED_LAUNCHED).eq(text("Yes")),
                    Expr::find(
                        text(&email),
                        field(student_fields::MENTOR_EMAIL).array_join().lower(),
                    ),
                ])
                .render();
                self.fetch_students(&formula).await
            })
            .await
    }

    /// Prospective students for the upcoming cohort linked to a mentor
    pub async fn prospective_students(&self, mentor_email: &str) -> Vec<StudentRecord> {
        let email = mentor_email.trim().to_lowercase();
        self.cache
            .cached("prospective_students", &email, self.ttl, || async {
                let formula = Expr::and(vec![
                    field(student_fields::PARTICIPATION_DECISION).ne(text("No")),
                    Expr::find(text("True"), field(student_fields::UPCOMING_COHORT).array_join()),
                    Expr::find(
                        text(&email),
                        field(student_fields::MENTOR_EMAIL).array_join().lower(),
                    ),
                ])
                .render();
                self.fetch_students(&formula).await
            })
            .await
    }

    async fn fetch_students(&self, formula: &str) -> Vec<StudentRecord> {
        match self
            .store
            .query(&self.collections.students, formula, Some(&student_fields::FETCH))
            .await
        {
            Ok(records) => records.iter().filter_map(normalize_student).collect(),
            Err(e) => {
                tracing::error!("Error fetching students: {}", e);
                Vec::new()
            }
        }
    }

    /// All deadlines carrying the student's name key, due date ascending.
    /// The match is substring containment on the deadline name — the
    /// store's fuzzy name relation, not a foreign key.
    pub async fn deadlines_for_student(&self, student_name: &str) -> Vec<Deadline> {
        self.cache
            .cached("deadlines_for_student", student_name, self.ttl, || async {
                let key = student_match_key(student_name);
                let formula = Expr::find(text(key), field(deadline_fields::NAME)).render();
                match self.store.query(&self.collections.deadlines, &formula, None).await {
                    Ok(records) => {
                        let mut deadlines: Vec<Deadline> =
                            records.iter().map(normalize_deadline).collect();
                        deadlines.sort_by(|a, b| {
                            a.due_date
                                .as_deref()
                                .unwrap_or(FAR_FUTURE)
                                .cmp(b.due_date.as_deref().unwrap_or(FAR_FUTURE))
                        });
                        deadlines
                    }
                    Err(e) => {
                        tracing::error!("Error fetching deadlines: {}", e);
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Mentor-update meeting notes for a student, newest first
    pub async fn meeting_notes_for_student(&self, student_name: &str) -> Vec<MeetingNote> {
        self.cache
            .cached("meeting_notes_for_student", student_name, self.ttl, || async {
                let formula = self.progress_formula(student_name, progress_fields::TYPE_MENTOR_UPDATE);
                match self.store.query(&self.collections.progress, &formula, None).await {
                    Ok(records) => {
                        let mut notes: Vec<MeetingNote> =
                            records.iter().map(normalize_meeting_note).collect();
                        notes.sort_by(|a, b| b.date.cmp(&a.date));
                        notes
                    }
                    Err(e) => {
                        tracing::error!("Error fetching meeting notes: {}", e);
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Evaluation & feedback records for a student, newest first
    pub async fn evaluations_for_student(&self, student_name: &str) -> Vec<EvaluationItem> {
        self.cache
            .cached("evaluations_for_student", student_name, self.ttl, || async {
                let formula = self.progress_formula(student_name, progress_fields::TYPE_EVALUATION);
                match self.store.query(&self.collections.progress, &formula, None).await {
                    Ok(records) => {
                        let mut items: Vec<EvaluationItem> =
                            records.iter().map(normalize_evaluation).collect();
                        items.sort_by(|a, b| b.created_time.cmp(&a.created_time));
                        items
                    }
                    Err(e) => {
                        tracing::error!("Error fetching evaluations: {}", e);
                        Vec::new()
                    }
                }
            })
            .await
    }

    fn progress_formula(&self, student_name: &str, record_type: &str) -> String {
        Expr::and(vec![
            Expr::find(
                text(student_match_key(student_name)),
                field(progress_fields::MEETING_KEY),
            ),
            field(progress_fields::RECORD_TYPE).eq(text(record_type)),
        ])
        .render()
    }

    /// The aggregated detail view for one student: deadlines, alert
    /// banners, meeting notes, and evaluations, fetched concurrently
    pub async fn student_detail(&self, student_name: &str, now: NaiveDateTime) -> StudentDetail {
        let (deadlines, notes, evaluations) = futures::join!(
            self.deadlines_for_student(student_name),
            self.meeting_notes_for_student(student_name),
            self.evaluations_for_student(student_name),
        );
        views::student_detail(&deadlines, notes, evaluations, now)
    }

    /// Drop every cached query result; the next read refetches
    pub fn refresh(&self) {
        let dropped = self.cache.len();
        self.cache.invalidate_all();
        tracing::info!("Query cache invalidated ({} entries dropped)", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::gateway::StoreError;
    use crate::store::models::RawRecord;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn collections() -> Collections {
        Collections {
            students: "Students".to_string(),
            deadlines: "Deadlines".to_string(),
            mentors: "Mentors".to_string(),
            progress: "Progress Updates".to_string(),
        }
    }

    fn record(id: &str, created: &str, fields: serde_json::Value) -> RawRecord {
        serde_json::from_value(json!({ "id": id, "createdTime": created, "fields": fields }))
            .unwrap()
    }

    /// In-memory record source routing on collection + filter content
    #[derive(Default)]
    struct StubSource {
        mentors: Vec<RawRecord>,
        students: Vec<RawRecord>,
        deadlines: Vec<RawRecord>,
        progress: Vec<RawRecord>,
        calls: AtomicUsize,
    }

    impl RecordSource for StubSource {
        async fn query(
            &self,
            collection: &str,
            filter: &str,
            _fields: Option<&[&str]>,
        ) -> Result<Vec<RawRecord>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let records = match collection {
                "Mentors" => self.mentors.clone(),
                "Students" => self.students.clone(),
                "Deadlines" => self.deadlines.clone(),
                "Progress Updates" => self
                    .progress
                    .iter()
                    .filter(|r| {
                        let kind = r
                            .fields
                            .get(progress_fields::RECORD_TYPE)
                            .and_then(|v| v.as_str())
                            .unwrap_or("");
                        filter.contains(kind)
                    })
                    .cloned()
                    .collect(),
                _ => Vec::new(),
            };
            Ok(records)
        }
    }

    struct FailingSource;

    impl RecordSource for FailingSource {
        async fn query(
            &self,
            collection: &str,
            _filter: &str,
            _fields: Option<&[&str]>,
        ) -> Result<Vec<RawRecord>, StoreError> {
            Err(StoreError::Status {
                status: StatusCode::BAD_GATEWAY,
                collection: collection.to_string(),
            })
        }
    }

    fn service(store: StubSource) -> PortalService<StubSource> {
        PortalService::new(store, collections(), Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_mentor_with_zero_students_gets_empty_list() {
        let portal = service(StubSource {
            mentors: vec![record(
                "recM1",
                "2026-01-01T00:00:00.000Z",
                json!({ "Name": "Dr. Ada Park", "Email": "ada@example.com" }),
            )],
            ..StubSource::default()
        });

        let mentor = portal.mentor_by_email("Ada@Example.com ").await.unwrap();
        assert_eq!(mentor.email, "ada@example.com");

        let students = portal.confirmed_students(&mentor.email).await;
        assert!(students.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_degrades_to_empty() {
        let portal = PortalService::new(FailingSource, collections(), Duration::from_secs(300));

        assert!(portal.mentor_by_email("ada@example.com").await.is_none());
        assert!(portal.confirmed_students("ada@example.com").await.is_empty());
        assert!(portal.deadlines_for_student("Jane Doe | Fall 2025").await.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_reads_hit_the_cache_until_refresh() {
        let portal = service(StubSource::default());

        let _ = portal.confirmed_students("ada@example.com").await;
        let _ = portal.confirmed_students("Ada@Example.com").await;
        assert_eq!(portal.store.calls.load(Ordering::SeqCst), 1);

        portal.refresh();
        let _ = portal.confirmed_students("ada@example.com").await;
        assert_eq!(portal.store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_student_detail_joins_and_sorts_collections() {
        let portal = service(StubSource {
            deadlines: vec![
                record(
                    "recD2",
                    "2026-01-02T00:00:00.000Z",
                    json!({
                        (deadline_fields::NAME): "Jane Doe - Final Paper",
                        (deadline_fields::TYPE): "Final Paper",
                        (deadline_fields::DUE_DATE): "2026-09-01",
                        (deadline_fields::STATUS): "Not Submitted",
                    }),
                ),
                record(
                    "recD1",
                    "2026-01-01T00:00:00.000Z",
                    json!({
                        (deadline_fields::NAME): "Jane Doe - Syllabus",
                        (deadline_fields::TYPE): "Syllabus",
                        (deadline_fields::DUE_DATE): "2026-07-01",
                        (deadline_fields::STATUS): "Submitted",
                    }),
                ),
            ],
            progress: vec![
                record(
                    "recP1",
                    "2026-02-01T00:00:00.000Z",
                    json!({
                        (progress_fields::RECORD_TYPE): "Mentor Update",
                        (progress_fields::MEETING_DATE): "2026-02-01",
                        (progress_fields::MEETING_NOTES): "Kickoff meeting",
                    }),
                ),
                record(
                    "recP2",
                    "2026-03-01T00:00:00.000Z",
                    json!({
                        (progress_fields::RECORD_TYPE): "Mentor Update",
                        (progress_fields::MEETING_DATE): "2026-03-01",
                        (progress_fields::MEETING_NOTES): "Outline review",
                    }),
                ),
                record(
                    "recP3",
                    "2026-04-01T00:00:00.000Z",
                    json!({
                        (progress_fields::RECORD_TYPE): "Evaluation & Feedback",
                        (progress_fields::EVAL_FORM): [
                            { "filename": "eval.pdf", "url": "https://files.example/e.pdf" }
                        ],
                    }),
                ),
            ],
            ..StubSource::default()
        });

        let now = chrono::NaiveDate::from_ymd_opt(2026, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let detail = portal.student_detail("Jane Doe | Fall 2025", now).await;

        // Syllabus is mentor-facing, not a student deadline
        assert_eq!(detail.deadlines.len(), 1);
        assert_eq!(detail.deadlines[0].deadline.kind, "Final Paper");
        assert_eq!(detail.mentor_submissions.syllabus.len(), 1);

        // Notes newest first
        assert_eq!(detail.meeting_notes[0].notes, "Outline review");
        assert_eq!(detail.meeting_notes[1].notes, "Kickoff meeting");

        assert_eq!(detail.evaluations.len(), 1);
        assert_eq!(detail.alerts.next_up.as_ref().unwrap().kind, "Final Paper");
    }
}
