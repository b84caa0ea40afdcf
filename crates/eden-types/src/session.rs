//! Single-curator review sessions

use crate::error::ParseEnumError;
use crate::{AgentId, CuratorId, SessionId, WorkId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A curator working through a queue of works, sorting each into a bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurationSession {
    pub id: SessionId,

    pub curator_id: CuratorId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub status: SessionStatus,

    /// Works not yet classified, in review order
    #[serde(default)]
    pub queue: Vec<WorkId>,

    /// Latest classification per work
    #[serde(default)]
    pub decisions: Vec<SessionDecision>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CurationSession {
    pub fn new(curator_id: CuratorId, name: impl Into<String>, queue: Vec<WorkId>) -> Self {
        Self {
            id: SessionId::generate(),
            curator_id,
            agent_id: None,
            name: name.into(),
            status: SessionStatus::Active,
            queue,
            decisions: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Classify `work_id`, replacing an earlier classification and dropping
    /// the work from the pending queue
    pub fn classify(&mut self, decision: SessionDecision) {
        self.queue.retain(|w| w != &decision.work_id);
        match self
            .decisions
            .iter_mut()
            .find(|d| d.work_id == decision.work_id)
        {
            Some(existing) => *existing = decision,
            None => self.decisions.push(decision),
        }
    }

    /// Works grouped by classification
    pub fn queues(&self) -> SessionQueues {
        let mut queues = SessionQueues {
            remaining: self.queue.clone(),
            ..Default::default()
        };
        for decision in &self.decisions {
            let bucket = match decision.classification {
                Classification::Accept => &mut queues.accept,
                Classification::Reject => &mut queues.reject,
                Classification::Maybe => &mut queues.maybe,
                Classification::Skip => &mut queues.skip,
            };
            bucket.push(decision.work_id.clone());
        }
        queues
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

/// Bucket a curator places a work into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Accept,
    Reject,
    Maybe,
    Skip,
}

impl FromStr for Classification {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "maybe" => Ok(Self::Maybe),
            "skip" => Ok(Self::Skip),
            other => Err(ParseEnumError::new(
                "classification",
                other,
                "accept, reject, maybe, skip",
            )),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Maybe => "maybe",
            Self::Skip => "skip",
        };
        f.write_str(s)
    }
}

/// A single classification within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDecision {
    pub work_id: WorkId,

    pub classification: Classification,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub decided_at: DateTime<Utc>,
}

impl SessionDecision {
    pub fn new(work_id: WorkId, classification: Classification) -> Self {
        Self {
            work_id,
            classification,
            note: None,
            decided_at: Utc::now(),
        }
    }
}

/// Session works grouped by bucket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQueues {
    pub accept: Vec<WorkId>,
    pub reject: Vec<WorkId>,
    pub maybe: Vec<WorkId>,
    pub skip: Vec<WorkId>,
    pub remaining: Vec<WorkId>,
}
