//! # Services Module
//!
//! Business logic services for the portal: cached record-store queries and
//! the per-student cross-collection aggregation behind each view.

pub mod portal;
