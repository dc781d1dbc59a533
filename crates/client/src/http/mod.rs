//! Request header construction and failure mapping.
//!
//! [`HttpUtil`] builds the header sets the backend expects:
//!
//! | Builder                       | `Accept-Language` | `Content-Type` | `Authorization` |
//! |-------------------------------|-------------------|----------------|-----------------|
//! | [`HttpUtil::build_headers`]      | always         | optional       | never           |
//! | [`HttpUtil::build_auth_headers`] | always         | optional       | if logged in    |
//! | [`HttpUtil::build_file_upload_headers`] | always  | never          | if logged in    |
//!
//! Failures are mapped to [`ApiError`] by [`map_error`].

mod error;

use std::sync::{Arc, RwLock};

use reqwest::header::{
    ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue,
};
use tracing::warn;

pub use error::{ApiError, map_error};

use crate::config::DEFAULT_LANGUAGE;
use crate::session::TokenStore;

/// Header builder shared by all API calls.
///
/// Cloning is cheap; clones share the same language setting.
#[derive(Clone)]
pub struct HttpUtil {
    language: Arc<RwLock<HeaderValue>>,
    tokens: TokenStore,
}

impl HttpUtil {
    /// Create a builder with the default language (`vi`).
    #[must_use]
    pub fn new(tokens: TokenStore) -> Self {
        Self {
            language: Arc::new(RwLock::new(HeaderValue::from_static(DEFAULT_LANGUAGE))),
            tokens,
        }
    }

    /// Change the `Accept-Language` sent with every subsequent request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeaderValue` if `language` cannot be sent as a header;
    /// the previous language stays in effect.
    pub fn set_default_language(&self, language: &str) -> Result<(), InvalidHeaderValue> {
        let value = HeaderValue::from_str(language)?;
        match self.language.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
        Ok(())
    }

    /// The current `Accept-Language` value.
    #[must_use]
    pub fn default_language(&self) -> String {
        self.language_header()
            .to_str()
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string()
    }

    /// Language header plus, optionally, `Content-Type: application/json`.
    #[must_use]
    pub fn build_headers(&self, include_content_type: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if include_content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers.insert(ACCEPT_LANGUAGE, self.language_header());
        headers
    }

    /// [`Self::build_headers`] plus the bearer token when one is stored.
    #[must_use]
    pub fn build_auth_headers(&self, include_content_type: bool) -> HeaderMap {
        let mut headers = self.build_headers(include_content_type);
        self.insert_bearer(&mut headers);
        headers
    }

    /// Headers for multipart uploads.
    ///
    /// No `Content-Type`: the multipart body sets its own, with the boundary.
    #[must_use]
    pub fn build_file_upload_headers(&self) -> HeaderMap {
        self.build_auth_headers(false)
    }

    /// Headers carrying an explicit token instead of the stored one.
    #[must_use]
    pub fn build_headers_with_token(&self, token: &str) -> HeaderMap {
        let mut headers = self.build_headers(true);
        if let Some(value) = bearer_value(token) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn insert_bearer(&self, headers: &mut HeaderMap) {
        let token = self.tokens.get();
        if token.is_empty() {
            return;
        }
        if let Some(value) = bearer_value(&token) {
            headers.insert(AUTHORIZATION, value);
        }
    }

    fn language_header(&self) -> HeaderValue {
        match self.language.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// `Bearer <token>`, marked sensitive so it is redacted from debug output.
fn bearer_value(token: &str) -> Option<HeaderValue> {
    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(mut value) => {
            value.set_sensitive(true);
            Some(value)
        }
        Err(_) => {
            warn!("Stored token contains characters not allowed in a header; sending without it");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn util() -> (TokenStore, HttpUtil) {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        let util = HttpUtil::new(tokens.clone());
        (tokens, util)
    }

    #[test]
    fn test_build_headers() {
        let (_, util) = util();

        let headers = util.build_headers(true);
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "vi");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());

        let headers = util.build_headers(false);
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "vi");
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_auth_headers_without_token() {
        let (_, util) = util();
        let headers = util.build_auth_headers(true);
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_auth_headers_with_token() {
        let (tokens, util) = util();
        tokens.set("abc.def.ghi").unwrap();

        let headers = util.build_auth_headers(true);
        let auth = headers.get(AUTHORIZATION).unwrap();
        assert_eq!(auth, "Bearer abc.def.ghi");
        assert!(auth.is_sensitive());

        // Logging out is picked up without rebuilding the util
        tokens.remove().unwrap();
        assert!(util.build_auth_headers(true).get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_file_upload_headers() {
        let (tokens, util) = util();
        tokens.set("abc.def.ghi").unwrap();

        let headers = util.build_file_upload_headers();
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "vi");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc.def.ghi");
    }

    #[test]
    fn test_set_default_language_is_shared_by_clones() {
        let (_, util) = util();
        let clone = util.clone();

        util.set_default_language("en").unwrap();
        assert_eq!(clone.build_headers(false).get(ACCEPT_LANGUAGE).unwrap(), "en");
        assert_eq!(clone.default_language(), "en");
    }

    #[test]
    fn test_set_default_language_rejects_invalid_value() {
        let (_, util) = util();
        assert!(util.set_default_language("en\nX-Injected: 1").is_err());
        assert_eq!(util.default_language(), "vi");
    }

    #[test]
    fn test_headers_with_explicit_token() {
        let (_, util) = util();
        let headers = util.build_headers_with_token("tok");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }
}
