//! # Authentication Module
//!
//! Magic-link token issuance and verification, plus the session state
//! machine that tracks identity and gates the portal endpoints.

pub mod session;
pub mod token;
