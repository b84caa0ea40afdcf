//! Single-curator review sessions
//!
//! Independent of collaborative voting: one curator works through a queue
//! and sorts each work into accept, reject, maybe or skip.

use crate::error::{CurationError, CurationResult};
use crate::store::{RecordStore, WorkStore};
use chrono::Utc;
use eden_types::{
    AgentId, Classification, CurationSession, CuratorId, SessionDecision, SessionId,
    SessionStatus, WorkId,
};
use std::path::Path;
use tracing::info;

/// Parameters for a new session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub curator_id: CuratorId,
    pub agent_id: Option<AgentId>,
    pub name: Option<String>,
    /// Explicit queue. When absent, the agent's uncurated works are queued.
    pub work_ids: Option<Vec<WorkId>>,
}

#[derive(Debug, Clone)]
pub struct Sessions {
    store: RecordStore<CurationSession>,
    works: WorkStore,
}

impl Sessions {
    pub fn new(data_dir: impl AsRef<Path>, works: WorkStore) -> Self {
        Self {
            store: RecordStore::new(data_dir),
            works,
        }
    }

    pub fn create(&self, request: NewSession) -> CurationResult<CurationSession> {
        let queue = match (request.work_ids, &request.agent_id) {
            (Some(ids), _) => ids,
            (None, Some(agent)) => self
                .works
                .load(agent)?
                .into_iter()
                .filter(|w| !w.is_curated())
                .map(|w| w.id)
                .collect(),
            (None, None) => Vec::new(),
        };

        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Session {}", Utc::now().format("%Y-%m-%d %H:%M")));
        let mut session = CurationSession::new(request.curator_id, name, queue);
        session.agent_id = request.agent_id;

        if !self.store.insert(session.clone())? {
            return Err(CurationError::Conflict(format!(
                "Session {} already exists",
                session.id
            )));
        }
        info!(
            session_id = %session.id,
            curator_id = %session.curator_id,
            queued = session.queue.len(),
            "Started curation session"
        );
        Ok(session)
    }

    pub fn get(&self, id: &SessionId) -> CurationResult<CurationSession> {
        self.store
            .get(id)?
            .ok_or_else(|| CurationError::NotFound(format!("Session {id} not found")))
    }

    /// All sessions, optionally limited to one curator, newest first
    pub fn list(&self, curator: Option<&CuratorId>) -> CurationResult<Vec<CurationSession>> {
        let mut sessions: Vec<CurationSession> = self
            .store
            .load_all()?
            .into_iter()
            .filter(|s| curator.map_or(true, |c| &s.curator_id == c))
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    pub fn classify(
        &self,
        id: &SessionId,
        work_id: WorkId,
        classification: Classification,
        note: Option<String>,
    ) -> CurationResult<CurationSession> {
        let mut session = self.get(id)?;
        if !session.is_active() {
            return Err(CurationError::Conflict(format!("Session {id} is completed")));
        }

        let mut decision = SessionDecision::new(work_id, classification);
        decision.note = note;
        info!(
            session_id = %id,
            work_id = %decision.work_id,
            classification = %classification,
            "Classified work"
        );
        session.classify(decision);

        self.store.replace_existing(session.clone(), "Session")?;
        Ok(session)
    }

    pub fn complete(&self, id: &SessionId) -> CurationResult<CurationSession> {
        let mut session = self.get(id)?;
        if !session.is_active() {
            return Err(CurationError::Conflict(format!(
                "Session {id} is already completed"
            )));
        }
        session.status = SessionStatus::Completed;
        session.completed_at = Some(Utc::now());

        self.store.replace_existing(session.clone(), "Session")?;
        info!(session_id = %id, reviewed = session.decisions.len(), "Completed curation session");
        Ok(session)
    }
}
