//! Magic-Link Token Service
//!
//! Issues and verifies the short-lived signed tokens embedded in login links.
//! A token carries the mentor's email, its issuance time, and a fixed salt;
//! verification checks the signature over that exact payload and rejects
//! tokens older than the configured maximum age.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Fixed salt mixed into every magic-link token. A token signed under a
/// different salt never verifies, even with the right secret.
const LINK_SALT: &str = "magic-link";

/// Default maximum token age in seconds (1 hour)
pub const DEFAULT_MAX_AGE: u64 = 3600;

/// Claims carried inside a magic-link token
#[derive(Debug, Serialize, Deserialize, Clone)]
struct LinkClaims {
    /// The identity claim: the mentor's email
    sub: String,
    /// Issuance timestamp (seconds since epoch)
    iat: i64,
    /// Salt the token was issued under
    slt: String,
}

/// Service for issuing and verifying magic-link tokens
#[derive(Clone)]
pub struct MagicLinkService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl MagicLinkService {
    /// Create a new service signing with the provided secret
    pub fn new(secret: &str) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Expiry is judged from the embedded issued-at against the caller's
        // max_age, not from an `exp` claim, so the stock expiry check is off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue a signed token for an identity claim
    pub fn issue(&self, claim: &str) -> Result<String> {
        let claims = LinkClaims {
            sub: claim.to_string(),
            iat: Utc::now().timestamp(),
            slt: LINK_SALT.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode magic-link token")
    }

    /// Verify a token and return the embedded claim if still valid.
    ///
    /// Fails closed: returns `None` on a malformed token, a bad signature,
    /// a salt mismatch, or a token older than `max_age` seconds. Callers
    /// must request a fresh link rather than retry.
    pub fn verify(&self, token: &str, max_age: u64) -> Option<String> {
        let data = decode::<LinkClaims>(token, &self.decoding_key, &self.validation).ok()?;
        let claims = data.claims;

        if claims.slt != LINK_SALT {
            return None;
        }

        let age = Utc::now().timestamp() - claims.iat;
        if age > max_age as i64 {
            return None;
        }

        Some(claims.sub)
    }
}
