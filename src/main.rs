//! # Mentor Portal Server
//!
//! Backend for the mentor-facing portal: a mentor signs in through a
//! one-time magic link sent by email, then sees their assigned students,
//! deadlines, submissions, meeting notes, and evaluations, all read from a
//! remote tabular record store.
//!
//! ## Architecture
//! The server is organized into modules:
//! - `server`: Core server initialization and route wiring
//! - `config`: Environment variable configuration management
//! - `auth`: Magic-link token service and the session state machine
//! - `store`: Record store gateway, filter language, query cache, and
//!   record normalization
//! - `services`: Portal query service joining the collections per view
//! - `views`: Pure derived-view functions (sort tiers, overdue, badges)
//! - `routes`: HTTP route handlers organized by functionality
//!
//! ## Environment Setup
//! Copy `.env.example` to `.env` and configure the record store
//! credentials, the magic-link secret, and the mail API key.
//!
//! ## Running the Server
//! ```bash
//! cargo run
//! ```
//!
//! The server will start on `http://127.0.0.1:3000` by default.

mod auth;
mod config;
mod mailer;
mod routes;
mod server;
mod services;
mod store;
mod views;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point.
///
/// Loads `.env`, initializes the tracing/logging system, and starts the
/// HTTP server. Runs until the process is terminated.
#[tokio::main]
async fn main() {
    // Load local environment overrides before anything reads CONFIG
    dotenv::dotenv().ok();

    // Initialize the tracing subscriber for structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact(), // Use compact formatting
        )
        .init();

    // Log application startup
    tracing::info!("🏁 Starting Mentor Portal Server...");
    tracing::info!("📦 Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("🏗️  Build profile: {}", if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    });

    // Start the HTTP server - this will run indefinitely
    server::start().await;
}
