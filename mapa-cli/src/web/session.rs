//! Access gate and session tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, header};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "mapa_session";

/// Lifetime of an authenticated session
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Result of checking a submitted secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing was typed; prompt again without an error
    Empty,
    Rejected,
    Accepted,
}

/// Exact comparison against the configured secrets
#[derive(Debug, Clone)]
pub struct AccessGate {
    secrets: Arc<Vec<String>>,
}

impl AccessGate {
    pub fn new(secrets: Vec<String>) -> Self {
        let secrets = secrets.into_iter().filter(|s| !s.is_empty()).collect();
        Self {
            secrets: Arc::new(secrets),
        }
    }

    pub fn has_secrets(&self) -> bool {
        !self.secrets.is_empty()
    }

    pub fn verify(&self, input: &str) -> Verdict {
        if input.is_empty() {
            Verdict::Empty
        } else if self.secrets.iter().any(|s| s == input) {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }
}

/// Authenticated session ids with their issue time.
///
/// A session without a live entry here is unauthenticated. Expired
/// entries are pruned whenever a new session starts.
#[derive(Debug, Clone)]
pub struct SessionStore {
    authenticated: Arc<Mutex<HashMap<Uuid, Instant>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            authenticated: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Instant>> {
        self.authenticated
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new authenticated session and return its id
    pub fn authenticate(&self) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.lock();
        sessions.retain(|_, issued| now.duration_since(*issued) < self.ttl);
        sessions.insert(id, now);
        id
    }

    pub fn is_authenticated(&self, id: Uuid) -> bool {
        self.lock()
            .get(&id)
            .is_some_and(|issued| issued.elapsed() < self.ttl)
    }

    pub fn active(&self) -> usize {
        self.lock().len()
    }

    pub fn end(&self, id: Uuid) {
        self.lock().remove(&id);
    }
}

/// Session id carried by the request cookie, if any
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        id,
        SESSION_TTL.as_secs()
    )
}

pub fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
