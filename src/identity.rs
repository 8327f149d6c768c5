//! Client identity tracking.
//!
//! Every browser gets an opaque client ID stored in its session. The ID doubles as
//! a capability token (game ownership is proven by presenting it), so it is drawn
//! from the operating system's CSPRNG rather than a general purpose generator.

use crate::types::ClientId;
use rand::rngs::OsRng;
use rand::{RngCore, TryRngCore};
use std::collections::HashMap;

/// Session key under which the client ID is stored
pub const CLIENT_ID_KEY: &str = "client_id";

/// Number of random bytes in generated IDs (rendered as twice as many hex chars)
pub const RANDOM_ID_BYTES: usize = 16;

/// Get `RANDOM_ID_BYTES` bytes of system randomness as a lowercase hex string.
pub fn random_id() -> String {
    let mut bytes = [0u8; RANDOM_ID_BYTES];
    OsRng.unwrap_err().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Per-browser key/value store carried across requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    values: HashMap<String, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Return the client's ID, assigning a fresh one on first use.
pub fn resolve_or_assign(session: &mut Session) -> ClientId {
    if let Some(client_id) = resolve(session) {
        return client_id;
    }

    let client_id = random_id();
    session.insert(CLIENT_ID_KEY, client_id.clone());
    tracing::debug!("Assigned new client id");
    client_id
}

/// Return the client's ID if one was ever assigned.
pub fn resolve(session: &Session) -> Option<ClientId> {
    session.get(CLIENT_ID_KEY).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_is_hex_of_expected_length() {
        let id = random_id();
        assert_eq!(id.len(), RANDOM_ID_BYTES * 2);
        assert_eq!(hex::decode(&id).unwrap().len(), RANDOM_ID_BYTES);
    }

    #[test]
    fn test_random_ids_differ() {
        let ids: std::collections::HashSet<_> = (0..100).map(|_| random_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_resolve_or_assign_is_stable() {
        let mut session = Session::new();
        assert_eq!(resolve(&session), None);

        let first = resolve_or_assign(&mut session);
        let second = resolve_or_assign(&mut session);
        assert_eq!(first, second);
        assert_eq!(resolve(&session), Some(first));
    }

    #[test]
    fn test_resolve_does_not_assign() {
        let session = Session::new();
        assert_eq!(resolve(&session), None);
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let mut a = Session::new();
        let mut b = Session::new();
        assert_ne!(resolve_or_assign(&mut a), resolve_or_assign(&mut b));
    }
}
