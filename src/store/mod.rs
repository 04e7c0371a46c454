//! # Record Store Module
//!
//! Everything between the portal and the remote tabular store: the query
//! gateway, the filter mini-language, the TTL result cache, the tagged
//! field decode, and record normalization into canonical shapes.

pub mod cache;
pub mod filter;
pub mod gateway;
pub mod models;
pub mod normalize;
pub mod value;
