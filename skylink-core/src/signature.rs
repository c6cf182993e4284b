//! Submission signature verification: HMAC-SHA256 over
//! `pilotId:landingRate:timestamp` plus a replay-freshness window.
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

/// Maximum age of a signed submission, milliseconds.
pub const REPLAY_WINDOW_MS: i64 = 300_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("unsigned data")]
    Unsigned,
    #[error("data integrity failed")]
    Mismatch,
    #[error("data is expired (replay protection)")]
    Stale,
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustLevel {
    /// Signature recomputed and matched.
    Signed,
    /// No shared secret configured; nothing to verify.
    Unverified,
    /// Empty-string signature with a fresh timestamp: legacy clients that
    /// predate signing. Accepted, but callers should log it.
    Degraded,
}

/// Expected signature for a submission, lowercase hex.
#[must_use]
pub fn sign(secret: &str, pilot_id: &str, landing_rate: f64, timestamp: i64) -> String {
    let payload = format!("{pilot_id}:{landing_rate}:{timestamp}");
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("hmac accepts any key length");
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();
    digest.iter().fold(String::with_capacity(64), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Verify a submission's signature and freshness.
///
/// With no secret configured everything passes as [`TrustLevel::Unverified`].
/// With a secret, absent timestamp/signature fields are rejected; an
/// empty-string signature is accepted on the degraded-trust path as long as
/// the timestamp is fresh.
///
/// # Errors
///
/// Returns [`SignatureError`] when the submission is unsigned, mismatched,
/// or stale.
pub fn verify(
    secret: Option<&str>,
    pilot_id: &str,
    landing_rate: f64,
    timestamp: Option<i64>,
    signature: Option<&str>,
    now_ms: i64,
) -> Result<TrustLevel, SignatureError> {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return Ok(TrustLevel::Unverified);
    };

    let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
        return Err(SignatureError::Unsigned);
    };

    let mut level = TrustLevel::Degraded;
    if !signature.is_empty() {
        let expected = sign(secret, pilot_id, landing_rate, timestamp);
        if signature != expected {
            return Err(SignatureError::Mismatch);
        }
        level = TrustLevel::Signed;
    }

    if now_ms - timestamp > REPLAY_WINDOW_MS {
        return Err(SignatureError::Stale);
    }

    Ok(level)
}
