//! Auth routes for magic-link login, verification, preview, and session info

use axum::http::StatusCode;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::auth::session::{SESSION_COOKIE, session_id_from};
use crate::config::CONFIG;
use crate::mailer;
use crate::server::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct PreviewRequest {
    pub admin_key: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyParams {
    pub token: Option<String>,
}

fn error_body(message: &str) -> Json<Value> {
    Json(json!({ "error": message }))
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, id.to_string());
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::None); // cross origin
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::hours(12));
    cookie
}

/// Request a magic link. Looks up the mentor by email and sends the signed
/// login link; a mail failure is reported to the caller, never a crash.
pub async fn login(
    State(app): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> (StatusCode, Json<Value>) {
    let Some(mentor) = app.portal.mentor_by_email(&payload.email).await else {
        return (
            StatusCode::NOT_FOUND,
            error_body("Email not found. Please check your email address."),
        );
    };

    let token = match app.links.issue(&mentor.email) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to issue magic-link token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Failed to create login link"),
            );
        }
    };

    let link = mailer::magic_link(&CONFIG.auth.app_url, &token);
    let html = mailer::login_email_html(&mentor.name, &link);

    if app
        .mailer
        .send(&mentor.email, "Your Mentor Portal Login Link", &html)
        .await
    {
        (StatusCode::OK, Json(json!({ "sent": true })))
    } else {
        (StatusCode::BAD_GATEWAY, error_body("Failed to send email"))
    }
}

/// Verify a magic-link token from the URL and establish the session.
/// An absent, invalid, or expired token leaves the caller unauthenticated
/// with a user-visible error; there is no partial state.
pub async fn verify(
    State(app): State<AppState>,
    jar: CookieJar,
    Query(params): Query<VerifyParams>,
) -> (StatusCode, CookieJar, Json<Value>) {
    let Some(token) = params.token else {
        return (StatusCode::UNAUTHORIZED, jar, error_body("Missing login token"));
    };

    let Some(email) = app.links.verify(&token, CONFIG.auth.token_max_age) else {
        return (
            StatusCode::UNAUTHORIZED,
            jar,
            error_body("This login link has expired or is invalid. Please request a new one."),
        );
    };

    let Some(mentor) = app.portal.mentor_by_email(&email).await else {
        return (
            StatusCode::UNAUTHORIZED,
            jar,
            error_body("Email not found. Please check your email address."),
        );
    };

    let mut session = app.sessions.resolve(session_id_from(&jar));
    session.login(mentor.clone());
    app.sessions.save(session.clone());
    tracing::info!("Mentor signed in: {}", mentor.email);

    let jar = jar.add(session_cookie(session.id));
    (
        StatusCode::OK,
        jar,
        Json(json!({ "mentor": mentor, "preview": false })),
    )
}

/// Admin-key-gated preview: view the portal as an arbitrary mentor.
/// Preview never grants identity of its own — the key is checked first,
/// then the named mentor's identity is borrowed for read-only display.
pub async fn preview(
    State(app): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<PreviewRequest>,
) -> (StatusCode, CookieJar, Json<Value>) {
    if payload.admin_key != CONFIG.auth.admin_key {
        return (StatusCode::UNAUTHORIZED, jar, error_body("Invalid admin key."));
    }

    let Some(mentor) = app.portal.mentor_by_email(&payload.email).await else {
        return (StatusCode::NOT_FOUND, jar, error_body("Mentor email not found."));
    };

    let mut session = app.sessions.resolve(session_id_from(&jar));
    session.preview(mentor.clone());
    app.sessions.save(session.clone());
    tracing::info!("Preview session started for: {}", mentor.email);

    let jar = jar.add(session_cookie(session.id));
    (
        StatusCode::OK,
        jar,
        Json(json!({ "mentor": mentor, "preview": true })),
    )
}

/// Explicit logout: clears the session identity and drops the cookie
pub async fn logout(State(app): State<AppState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    if let Some(id) = session_id_from(&jar) {
        if let Some(mut session) = app.sessions.get(id) {
            session.logout();
            app.sessions.save(session);
        }
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (StatusCode::NO_CONTENT, jar)
}

/// Current session identity, if any
pub async fn me(State(app): State<AppState>, jar: CookieJar) -> (StatusCode, Json<Value>) {
    let session = session_id_from(&jar).and_then(|id| app.sessions.get(id));
    match session {
        Some(session) if session.is_authenticated() => (
            StatusCode::OK,
            Json(json!({ "mentor": session.mentor(), "preview": session.is_preview() })),
        ),
        _ => (StatusCode::UNAUTHORIZED, error_body("Not signed in")),
    }
}

pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
        .route("/api/auth/preview", post(preview))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}
