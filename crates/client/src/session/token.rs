//! Bearer token persistence and claim decoding.
//!
//! Tokens are JWTs issued by the backend. The client never holds the signing
//! key, so claims are decoded without verifying the signature and must only
//! be used for display and routing decisions, never for authorization.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, warn};

use shopapp_core::UserId;

use crate::storage::{SharedStore, StorageError, keys};

/// base64url that accepts payloads with or without `=` padding.
const JWT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors that can occur when decoding a stored token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No token is stored.
    #[error("no access token stored")]
    Missing,

    /// The token does not have the `header.payload.signature` shape.
    #[error("token is not a JWT: {0}")]
    Malformed(&'static str),

    /// The payload segment is not valid base64url.
    #[error("token payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The payload is not a JSON claims object.
    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The token store could not be read.
    #[error("token storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A numeric claim that some issuers encode as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum NumericClaim {
    Number(i64),
    Text(String),
}

impl NumericClaim {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Claims the client reads from the token payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    /// Subject (the backend uses the phone number).
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(default, rename = "userId")]
    user_id: Option<NumericClaim>,
    /// Expiration time (Unix timestamp, seconds).
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued at (Unix timestamp, seconds).
    #[serde(default)]
    pub iat: Option<i64>,
}

impl Claims {
    /// Decode the payload segment of a JWT.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the token is empty, not three dot-separated
    /// segments, or its payload is not base64url-encoded JSON.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed("expected three segments"));
        };

        if payload.is_empty() {
            return Err(TokenError::Malformed("empty payload"));
        }

        let bytes = JWT_ENGINE.decode(payload)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The `userId` claim, if present and numeric.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
            .as_ref()
            .and_then(NumericClaim::as_i64)
            .and_then(|id| i32::try_from(id).ok())
            .map(UserId::new)
    }

    /// The `exp` claim as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Whether the token is expired at `now`.
    ///
    /// A token without an `exp` claim never expires. An `exp` outside the
    /// representable range is treated as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|_| self.expires_at().is_none_or(|exp| exp <= now))
    }
}

/// Persisted bearer token.
#[derive(Clone)]
pub struct TokenStore {
    store: SharedStore,
}

impl TokenStore {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The stored token, or an empty string if none is stored.
    ///
    /// Storage failures are logged and reported as "no token".
    #[must_use]
    pub fn get(&self) -> String {
        self.try_get().unwrap_or_else(|e| {
            error!(error = %e, "Failed to read access token");
            String::new()
        })
    }

    /// The stored token, distinguishing storage failure from absence.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub fn try_get(&self) -> Result<String, StorageError> {
        Ok(self.store.get(keys::ACCESS_TOKEN)?.unwrap_or_default())
    }

    /// Persist a new token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub fn set(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(keys::ACCESS_TOKEN, token)
    }

    /// Delete the stored token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub fn remove(&self) -> Result<(), StorageError> {
        self.store.remove(keys::ACCESS_TOKEN)
    }

    /// Decode the stored token's claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Missing` when no token is stored, or another
    /// `TokenError` variant when the token cannot be decoded.
    pub fn claims(&self) -> Result<Claims, TokenError> {
        let token = self.try_get()?;
        Claims::decode(&token)
    }

    /// User id from the token, or `UserId::new(0)` when it cannot be determined.
    ///
    /// Decode failures are logged, never returned.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        match self.claims() {
            Ok(claims) => claims.user_id().unwrap_or_else(|| {
                warn!("Access token has no userId claim");
                UserId::new(0)
            }),
            Err(TokenError::Missing) => UserId::new(0),
            Err(e) => {
                error!(error = %e, "Failed to decode access token");
                UserId::new(0)
            }
        }
    }

    /// Whether the stored token has expired.
    ///
    /// Returns `false` when no token is stored: absence is not expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// [`Self::is_expired`] against an explicit clock.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.claims() {
            Ok(claims) => claims.is_expired_at(now),
            Err(TokenError::Missing) => false,
            Err(e) => {
                warn!(error = %e, "Treating undecodable access token as expired");
                true
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;
    use crate::storage::MemoryStore;

    /// Build an unsigned JWT with the given JSON payload.
    pub(crate) fn make_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    fn token_store() -> TokenStore {
        TokenStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_no_token_is_not_expired_and_has_no_user() {
        let tokens = token_store();
        assert_eq!(tokens.get(), "");
        assert!(!tokens.is_expired());
        assert_eq!(tokens.user_id(), UserId::new(0));
        assert!(matches!(tokens.claims(), Err(TokenError::Missing)));
    }

    #[test]
    fn test_set_get_remove() {
        let tokens = token_store();
        tokens.set("abc.def.ghi").unwrap();
        assert_eq!(tokens.get(), "abc.def.ghi");
        tokens.remove().unwrap();
        assert_eq!(tokens.get(), "");
    }

    #[test]
    fn test_user_id_from_numeric_claim() {
        let tokens = token_store();
        let exp = Utc::now().timestamp() + 3600;
        tokens
            .set(&make_token(&serde_json::json!({"userId": 42, "exp": exp})))
            .unwrap();

        assert_eq!(tokens.user_id(), UserId::new(42));
        assert!(!tokens.is_expired());
    }

    #[test]
    fn test_user_id_from_string_claim() {
        let tokens = token_store();
        tokens
            .set(&make_token(&serde_json::json!({"userId": "17"})))
            .unwrap();
        assert_eq!(tokens.user_id(), UserId::new(17));
    }

    #[test]
    fn test_user_id_missing_claim_is_zero() {
        let tokens = token_store();
        tokens
            .set(&make_token(&serde_json::json!({"sub": "0912345678"})))
            .unwrap();
        assert_eq!(tokens.user_id(), UserId::new(0));
    }

    #[test]
    fn test_malformed_tokens_yield_zero() {
        let tokens = token_store();
        for bad in ["garbage", "a.b", "a..c", "a.!!!.c", "a.b.c.d"] {
            tokens.set(bad).unwrap();
            assert_eq!(tokens.user_id(), UserId::new(0), "token {bad:?}");
            assert!(tokens.claims().is_err(), "token {bad:?}");
        }
    }

    #[test]
    fn test_expired_token() {
        let tokens = token_store();
        let exp = Utc::now().timestamp() - 10;
        tokens
            .set(&make_token(&serde_json::json!({"userId": 1, "exp": exp})))
            .unwrap();
        assert!(tokens.is_expired());
    }

    #[test]
    fn test_token_without_exp_never_expires() {
        let tokens = token_store();
        tokens
            .set(&make_token(&serde_json::json!({"userId": 1})))
            .unwrap();
        assert!(!tokens.is_expired());

        let far_future = Utc.timestamp_opt(4_000_000_000, 0).single().unwrap();
        assert!(!tokens.is_expired_at(far_future));
    }

    #[test]
    fn test_undecodable_token_counts_as_expired() {
        let tokens = token_store();
        tokens.set("not-a-jwt").unwrap();
        assert!(tokens.is_expired());
    }

    #[test]
    fn test_padded_payload_decodes() {
        let payload = base64::engine::general_purpose::URL_SAFE
            .encode(serde_json::json!({"userId": 5}).to_string());
        let claims = Claims::decode(&format!("h.{payload}.s")).unwrap();
        assert_eq!(claims.user_id(), Some(UserId::new(5)));
    }

    #[test]
    fn test_expires_at() {
        let claims = Claims {
            exp: Some(1_700_000_000),
            ..Claims::default()
        };
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_000_000);
        let before = Utc.timestamp_opt(1_699_999_999, 0).single().unwrap();
        assert!(!claims.is_expired_at(before));
    }
}
