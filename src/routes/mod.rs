// # Routes Module
//
// HTTP route handlers for the Mentor Portal server, organized by
// functionality into separate submodules. Register new route modules here
// and wire them into the Router in `server.rs`.

/// Health check and monitoring endpoints
pub mod health;

/// Magic-link login, verification, preview, and session endpoints
pub mod auth;

/// Mentor-facing portal data endpoints
pub mod portal;
