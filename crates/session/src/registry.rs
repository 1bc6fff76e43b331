//! Session registry: concurrent sessions keyed by id.
//!
//! The map itself sits behind an `RwLock`; each session sits behind its own
//! `Mutex`. Holding a session's lock across a completion call serializes
//! turns within that session without blocking any other session.
//!
//! When the registry is full, creating a session evicts the one that was
//! least recently handed out.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use docchat_config::SessionConfig;
use docchat_core::error::{Result, SessionError};
use docchat_core::message::SessionId;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::session::Session;

/// Shared, lockable handle to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

struct Entry {
    handle: SessionHandle,
    created_at: DateTime<Utc>,
    last_used: AtomicU64,
}

/// A one-line listing of a session.
///
/// A session that is mid-turn is reported as `busy` with only its id and
/// creation time; its contents are not readable until the turn finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub busy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turns: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_document: Option<bool>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionSummary {
    fn busy(session_id: SessionId, created_at: DateTime<Utc>) -> Self {
        Self {
            session_id,
            busy: true,
            turns: None,
            has_document: None,
            created_at,
            updated_at: None,
        }
    }
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id().clone(),
            busy: false,
            turns: Some(session.log().len()),
            has_document: Some(session.document().document().is_some()),
            created_at: session.created_at(),
            updated_at: Some(session.updated_at()),
        }
    }
}

/// Owns every live session.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Entry>>,
    clock: AtomicU64,
    max_sessions: usize,
    max_document_length: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, max_document_length: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            max_sessions: max_sessions.max(1),
            max_document_length,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.max_sessions, config.max_document_length)
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Create an empty session and return its id and handle.
    pub async fn create(&self) -> (SessionId, SessionHandle) {
        let session = Session::new(self.max_document_length);
        let id = session.id().clone();
        let created_at = session.created_at();
        let handle = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(id, _)| id.clone());
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }
        sessions.insert(
            id.clone(),
            Entry {
                handle: handle.clone(),
                created_at,
                last_used: AtomicU64::new(self.tick()),
            },
        );

        (id, handle)
    }

    /// Look up a session and mark it as recently used.
    pub async fn get(&self, id: &SessionId) -> Result<SessionHandle> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(id)
            .ok_or_else(|| SessionError::SessionNotFound(id.clone()))?;
        entry.last_used.store(self.tick(), Ordering::Relaxed);
        Ok(entry.handle.clone())
    }

    /// Drop a session. In-flight holders of its handle finish normally.
    pub async fn remove(&self, id: &SessionId) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SessionError::SessionNotFound(id.clone()))
    }

    /// Summaries of all sessions: busy ones first, then most recently
    /// updated first. Never waits on a session that is mid-turn.
    pub async fn list(&self) -> Vec<SessionSummary> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions
            .iter()
            .map(|(id, entry)| match entry.handle.try_lock() {
                Ok(session) => SessionSummary::from(&*session),
                Err(_) => SessionSummary::busy(id.clone(), entry.created_at),
            })
            .collect();
        drop(sessions);

        summaries.sort_by(|a, b| {
            b.busy
                .cmp(&a.busy)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        summaries
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
