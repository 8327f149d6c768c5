//! Server-side sessions keyed by an opaque cookie token.
//!
//! The middleware hands every request a [`SessionHandle`] through request
//! extensions and persists whatever the handler left in it once the response is
//! ready. A cookie is only issued when a new session actually holds data.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, Response},
    middleware::Next,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::identity::{random_id, Session};

/// Session shared between the middleware and the handler of one request
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    cookie_name: Arc<str>,
}

impl SessionRegistry {
    pub fn new(cookie_name: impl Into<Arc<str>>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Look up the session for a token, or start a fresh one under a new token.
    /// Returns `(token, session, is_new)`.
    pub async fn load(&self, token: Option<&str>) -> (String, Session, bool) {
        if let Some(token) = token {
            if let Some(session) = self.sessions.read().await.get(token) {
                return (token.to_string(), session.clone(), false);
            }
        }
        (random_id(), Session::new(), true)
    }

    pub async fn store(&self, token: &str, session: Session) {
        self.sessions.write().await.insert(token.to_string(), session);
    }

    #[cfg(test)]
    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Find a cookie's value in the request headers
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookies) = value.to_str() else {
            continue;
        };
        for pair in cookies.split(';') {
            let Some((k, v)) = pair.trim().split_once('=') else {
                continue;
            };
            if k == name {
                return Some(v.to_string());
            }
        }
    }
    None
}

/// Middleware loading and persisting the per-browser session
pub async fn session_middleware(
    State(registry): State<SessionRegistry>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let token = cookie_value(request.headers(), registry.cookie_name());
    let (token, session, is_new) = registry.load(token.as_deref()).await;

    let handle: SessionHandle = Arc::new(Mutex::new(session));
    request.extensions_mut().insert(handle.clone());

    let mut response = next.run(request).await;

    let session = handle.lock().await.clone();
    if is_new && session.is_empty() {
        return response;
    }
    registry.store(&token, session).await;

    if is_new {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            registry.cookie_name(),
            token
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::resolve_or_assign;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sid=abc123; other=x"),
        );
        assert_eq!(cookie_value(&headers, "sid"), Some("abc123".to_string()));
        assert_eq!(cookie_value(&headers, "theme"), Some("dark".to_string()));
        assert_eq!(cookie_value(&headers, "missing"), None);
        assert_eq!(cookie_value(&HeaderMap::new(), "sid"), None);
    }

    #[tokio::test]
    async fn test_load_unknown_token_starts_new_session() {
        let registry = SessionRegistry::new("sid");
        let (token, session, is_new) = registry.load(Some("forged")).await;
        assert!(is_new);
        assert_ne!(token, "forged");
        assert!(session.is_empty());

        let (_, _, is_new) = registry.load(None).await;
        assert!(is_new);
    }

    #[tokio::test]
    async fn test_store_and_load_roundtrip() {
        let registry = SessionRegistry::new("sid");
        let (token, mut session, _) = registry.load(None).await;
        let client_id = resolve_or_assign(&mut session);
        registry.store(&token, session).await;

        let (same_token, mut loaded, is_new) = registry.load(Some(&token)).await;
        assert!(!is_new);
        assert_eq!(same_token, token);
        assert_eq!(resolve_or_assign(&mut loaded), client_id);
        assert_eq!(registry.count().await, 1);
    }
}
