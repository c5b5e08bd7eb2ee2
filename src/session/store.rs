//! Session registry
//!
//! Maps session ids to the transport serving them. This is the only
//! state shared between requests.

use crate::mcp::transport::StreamableHttpTransport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A registered session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub transport: Arc<StreamableHttpTransport>,
    pub created_at: DateTime<Utc>,
}

/// Storage for live sessions
///
/// `lookup` and `register` must be atomic with respect to each other.
/// There is no removal; entries live as long as the process.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn lookup(&self, id: &str) -> Option<Arc<StreamableHttpTransport>>;

    /// Register `transport` under `id`.
    ///
    /// Registering the same transport again is a no-op. A different
    /// transport under a known id is ignored and the first one kept.
    async fn register(&self, id: String, transport: Arc<StreamableHttpTransport>);

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Process-local store behind a single lock
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a session's metadata
    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Ids of all live sessions, oldest first
    pub async fn ids(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        let mut entries: Vec<&Session> = sessions.values().collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        entries.into_iter().map(|s| s.id.clone()).collect()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn lookup(&self, id: &str) -> Option<Arc<StreamableHttpTransport>> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|session| Arc::clone(&session.transport))
    }

    async fn register(&self, id: String, transport: Arc<StreamableHttpTransport>) {
        let mut sessions = self.sessions.write().await;
        match sessions.entry(id) {
            Entry::Occupied(entry) => {
                if Arc::ptr_eq(&entry.get().transport, &transport) {
                    debug!(session_id = %entry.key(), "Session already registered");
                } else {
                    warn!(
                        session_id = %entry.key(),
                        "Refusing to replace transport of existing session"
                    );
                }
            }
            Entry::Vacant(entry) => {
                info!(session_id = %entry.key(), "Session registered");
                let session = Session {
                    id: entry.key().clone(),
                    transport,
                    created_at: Utc::now(),
                };
                entry.insert(session);
            }
        }
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
