//! # Server Module
//!
//! HTTP server setup and route configuration for the Mentor Portal server.

use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::auth::session::{SessionGate, SessionStore};
use crate::auth::token::MagicLinkService;
use crate::config::CONFIG;
use crate::mailer::Mailer;
use crate::routes::health::ping;
use crate::routes::{auth, portal};
use crate::services::portal::{Collections, PortalService};
use crate::store::gateway::RecordStore;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<PortalService<RecordStore>>,
    pub sessions: Arc<SessionStore>,
    pub links: Arc<MagicLinkService>,
    pub mailer: Arc<Mailer>,
}

/// Starts the Mentor Portal HTTP server.
///
/// Wires the record store gateway, query cache, session store, token
/// service, and mailer into shared state, then serves the portal routes
/// until the process is terminated.
pub async fn start() {
    let config = &*CONFIG;

    let store = RecordStore::new(&config.store);
    let portal_service = Arc::new(PortalService::new(
        store,
        Collections::from_config(&config.store),
        Duration::from_secs(config.store.cache_ttl),
    ));
    let sessions = Arc::new(SessionStore::new());
    let links = Arc::new(MagicLinkService::new(&config.auth.link_secret));
    let mailer = Arc::new(Mailer::new(&config.mail));

    let app_state = AppState {
        portal: portal_service,
        sessions: sessions.clone(),
        links,
        mailer,
    };

    // Portal data endpoints require an authenticated session
    let portal_routes = Router::new()
        .route("/api/portal/students", get(portal::confirmed_students))
        .route(
            "/api/portal/students/prospective",
            get(portal::prospective_students),
        )
        .route("/api/portal/students/detail", get(portal::student_detail))
        .route("/api/portal/refresh", post(portal::refresh))
        .layer(middleware::from_fn_with_state(
            sessions.clone(),
            SessionGate::require_mentor,
        ));

    let ui_origin = config
        .auth
        .app_url
        .parse::<HeaderValue>()
        .expect("APP_URL must be a valid origin");

    // Main app router
    let app = Router::new()
        .route("/ping", get(ping)) // Health check endpoint
        .merge(portal_routes)
        .merge(auth::create_auth_routes())
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin([
                        ui_origin,
                        "http://localhost:3001".parse::<HeaderValue>().unwrap(),
                    ])
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([
                        header::ORIGIN,
                        header::CONTENT_TYPE,
                        header::ACCEPT,
                        header::AUTHORIZATION,
                    ])
                    .allow_credentials(true), // Allow cookies for auth
            ),
        )
        .with_state(app_state);

    // Use $PORT if set (hosted environments), otherwise the configured port
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address - port may already be in use");

    tracing::info!("🚀 Mentor Portal Server starting...");
    tracing::info!("📡 Listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);
    tracing::info!("🔑 Auth endpoints available at http://{}/api/auth/*", addr);
    tracing::info!("📚 Portal endpoints available at http://{}/api/portal/*", addr);

    // Start serving the application
    axum::serve(listener, app).await.unwrap();
}
