//! Bearer credentials.
//!
//! The client never reads ambient global state: a `CredentialProvider` is
//! handed to it at construction and asked for the token on every request.
//! Stored tokens sometimes already carry a `Bearer` prefix; `authorization_value`
//! strips any such prefix so the header always carries exactly one.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;

/// Key under which the dashboard persists its session token.
pub const TOKEN_KEY: &str = "token";

static BEARER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\s*bearer(?:\s+|$))+").unwrap());

/// Source of the bearer token attached to outgoing requests.
pub trait CredentialProvider: Send + Sync {
    /// Current token, possibly still prefixed. `None` sends no header.
    fn token(&self) -> Option<String>;
}

/// Requests go out unauthenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn token(&self) -> Option<String> {
        None
    }
}

/// A token fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Shared key-value store standing in for the browser's persisted storage.
///
/// The login flow writes `token`; clients holding a clone read it on every
/// request, so a refreshed token is picked up without rebuilding clients.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().ok()?.remove(key)
    }
}

impl CredentialProvider for TokenStore {
    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }
}

/// Build the `authorization` header value from a stored token.
///
/// Returns `None` when nothing but whitespace (or a bare prefix) is left.
pub fn authorization_value(raw: &str) -> Option<String> {
    let token = BEARER_PREFIX.replace(raw, "");
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(format!("Bearer {token}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_token_gets_one_prefix() {
        assert_eq!(authorization_value("abc123").as_deref(), Some("Bearer abc123"));
    }

    #[test]
    fn existing_prefix_is_not_doubled() {
        for raw in [
            "Bearer abc123",
            "bearer abc123",
            "BEARER   abc123",
            "  Bearer abc123  ",
            "Bearer Bearer abc123",
            "bearer\tabc123",
        ] {
            assert_eq!(authorization_value(raw).as_deref(), Some("Bearer abc123"), "{raw:?}");
        }
    }

    #[test]
    fn token_starting_with_bearer_word_is_kept() {
        assert_eq!(
            authorization_value("bearertoken").as_deref(),
            Some("Bearer bearertoken")
        );
    }

    #[test]
    fn blank_tokens_produce_no_header() {
        assert_eq!(authorization_value(""), None);
        assert_eq!(authorization_value("   "), None);
        assert_eq!(authorization_value("Bearer "), None);
    }

    #[test]
    fn token_store_reads_latest_value() {
        let store = TokenStore::new();
        assert_eq!(store.token(), None);
        store.set(TOKEN_KEY, "first");
        let reader = store.clone();
        store.set(TOKEN_KEY, "second");
        assert_eq!(reader.token().as_deref(), Some("second"));
        store.remove(TOKEN_KEY);
        assert_eq!(reader.token(), None);
    }
}
