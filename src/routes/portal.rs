//! Portal data routes: student lists, the per-student detail view, and the
//! explicit cache refresh. All of these sit behind the session gate.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::session::CurrentSession;
use crate::server::AppState;
use crate::views;

#[derive(Deserialize)]
pub struct DetailParams {
    pub name: String,
}

/// Confirmed students for the session mentor, upcoming due dates first,
/// each carrying its derived payment view
pub async fn confirmed_students(
    State(app): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Json<Value> {
    let mut students = app.portal.confirmed_students(&session.mentor.email).await;
    views::sort_students_by_due(&mut students, Local::now().date_naive());
    let students = views::student_summaries(students);
    Json(json!({ "students": students, "preview": session.preview }))
}

/// Prospective students for the upcoming cohort, same ordering
pub async fn prospective_students(
    State(app): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Json<Value> {
    let mut students = app.portal.prospective_students(&session.mentor.email).await;
    views::sort_students_by_due(&mut students, Local::now().date_naive());
    Json(json!({ "students": students, "preview": session.preview }))
}

/// The aggregated detail view for one student, addressed by display name
pub async fn student_detail(
    State(app): State<AppState>,
    Extension(_session): Extension<CurrentSession>,
    Query(params): Query<DetailParams>,
) -> Json<views::StudentDetail> {
    let detail = app
        .portal
        .student_detail(&params.name, Local::now().naive_local())
        .await;
    Json(detail)
}

/// Explicit refresh: drop every cached query so subsequent reads refetch
pub async fn refresh(State(app): State<AppState>) -> Json<Value> {
    app.portal.refresh();
    Json(json!({ "refreshed": true }))
}
