use crate::history::HistoryStore;
use crate::pipeline::PipelineStage;
use crate::step::GenerationStep;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One user's pair of generation steps and their histories
pub struct Session {
    id: Uuid,
    title_step: GenerationStep,
    script_step: GenerationStep,
    stage: PipelineStage,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid, title_step: GenerationStep, script_step: GenerationStep) -> Self {
        Self {
            id,
            title_step,
            script_step,
            stage: PipelineStage::Idle,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Stage reached by the most recent submission
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn title_history(&self) -> &HistoryStore {
        self.title_step.history()
    }

    pub fn script_history(&self) -> &HistoryStore {
        self.script_step.history()
    }

    pub(crate) fn set_stage(&mut self, stage: PipelineStage) {
        self.stage = stage;
    }

    pub(crate) fn title_step_mut(&mut self) -> &mut GenerationStep {
        &mut self.title_step
    }

    pub(crate) fn script_step_mut(&mut self) -> &mut GenerationStep {
        &mut self.script_step
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Bounds on how many sessions the registry keeps and for how long
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionLimits {
    /// Sessions untouched for this long are dropped at the next eviction pass
    pub idle_ttl: Option<Duration>,
    /// Upper bound on registered sessions; the least recently used idle ones go first
    pub max_sessions: Option<usize>,
}

impl SessionLimits {
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = Some(ttl);
        self
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = Some(max);
        self
    }
}

struct RegistryEntry {
    session: SharedSession,
    last_seen: Instant,
}

impl RegistryEntry {
    fn new(session: SharedSession) -> Self {
        Self {
            session,
            last_seen: Instant::now(),
        }
    }

    /// No handler holds a handle to this session
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.session) == 1
    }
}

/// Sessions keyed by id
///
/// Each session sits behind its own mutex, so submissions within a session run
/// one at a time while different sessions proceed independently. Expired and
/// surplus sessions are evicted whenever a new one is registered; a session a
/// handler is still using is never evicted.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, RegistryEntry>>,
    limits: SessionLimits,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            sessions: RwLock::default(),
            limits,
        }
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    /// Register `session` under its own id, replacing any previous holder
    pub async fn insert(&self, session: Session) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions, 1);
        sessions.insert(id, RegistryEntry::new(Arc::clone(&shared)));
        tracing::debug!(session_id = %id, "Session registered");
        shared
    }

    /// Session for `id`, marking it as recently used
    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Existing session for `id`, or one built by `create` and registered
    pub async fn get_or_insert_with<F>(&self, id: Uuid, create: F) -> SharedSession
    where
        F: FnOnce() -> Session,
    {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(&id) {
            entry.last_seen = Instant::now();
            return Arc::clone(&entry.session);
        }

        self.evict(&mut sessions, 1);
        let shared = Arc::new(Mutex::new(create()));
        sessions.insert(id, RegistryEntry::new(Arc::clone(&shared)));
        tracing::debug!(session_id = %id, "Session registered");
        shared
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::debug!(session_id = %id, "Session removed");
        }
        removed
    }

    /// Drop expired sessions now instead of waiting for the next registration
    pub async fn prune(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions, 0)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop expired sessions and make room for `incoming` new ones; returns how
    /// many were dropped
    fn evict(&self, sessions: &mut HashMap<Uuid, RegistryEntry>, incoming: usize) -> usize {
        let before = sessions.len();

        if let Some(ttl) = self.limits.idle_ttl {
            sessions.retain(|_, entry| !entry.is_idle() || entry.last_seen.elapsed() < ttl);
        }

        if let Some(max) = self.limits.max_sessions {
            if sessions.len() + incoming > max {
                let mut idle: Vec<(Uuid, Instant)> = sessions
                    .iter()
                    .filter(|(_, entry)| entry.is_idle())
                    .map(|(id, entry)| (*id, entry.last_seen))
                    .collect();
                idle.sort_by_key(|(_, last_seen)| *last_seen);

                let surplus = sessions.len() + incoming - max;
                for (id, _) in idle.into_iter().take(surplus) {
                    sessions.remove(&id);
                }
                if sessions.len() + incoming > max {
                    tracing::warn!(
                        sessions = sessions.len(),
                        max_sessions = max,
                        "Session limit reached with every session in use"
                    );
                }
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }
}
