//! Collaborative curation: participants, voting rules and per-work decisions
//!
//! A collaboration groups curators who vote on works. Each contested work
//! gets one [`Decision`] holding at most one [`Vote`] per curator. The
//! decision's `outcome` is a cached projection of its votes under the
//! collaboration's [`VotingRules`]; it is recomputed whenever it is read or
//! written and is never a source of truth on its own.

use crate::error::ParseEnumError;
use crate::{AgentId, CollaborationId, CuratorId, WorkId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A multi-curator voting group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub id: CollaborationId,

    pub title: String,

    /// Agent whose works are under review, when the collaboration is scoped to one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,

    #[serde(default)]
    pub participants: Vec<Participant>,

    #[serde(default)]
    pub voting_rules: VotingRules,

    #[serde(default)]
    pub decisions: Vec<Decision>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Collaboration {
    pub fn new(title: impl Into<String>, voting_rules: VotingRules) -> Self {
        let now = Utc::now();
        Self {
            id: CollaborationId::generate(),
            title: title.into(),
            agent_id: None,
            participants: Vec::new(),
            voting_rules,
            decisions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_participant(mut self, curator_id: CuratorId, name: impl Into<String>) -> Self {
        self.participants.push(Participant {
            curator_id,
            name: name.into(),
            active: true,
        });
        self
    }

    pub fn participant(&self, curator_id: &CuratorId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.curator_id == curator_id)
    }

    pub fn is_active_participant(&self, curator_id: &CuratorId) -> bool {
        self.participant(curator_id).is_some_and(|p| p.active)
    }

    pub fn decision(&self, work_id: &WorkId) -> Option<&Decision> {
        self.decisions.iter().find(|d| &d.work_id == work_id)
    }

    /// Decision for `work_id`, created empty and pending when absent
    pub fn decision_mut(&mut self, work_id: &WorkId) -> &mut Decision {
        let index = match self.decisions.iter().position(|d| &d.work_id == work_id) {
            Some(index) => index,
            None => {
                self.decisions.push(Decision::new(work_id.clone()));
                self.decisions.len() - 1
            }
        };
        &mut self.decisions[index]
    }
}

/// A curator taking part in a collaboration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub curator_id: CuratorId,

    #[serde(default)]
    pub name: String,

    /// Only active participants may vote and count toward quorum
    #[serde(default = "default_true")]
    pub active: bool,
}

/// How votes on a decision are counted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingRules {
    #[serde(default)]
    pub mechanism: VotingMechanism,

    /// Minimum fraction of active participants that must have voted
    #[serde(default = "default_quorum")]
    pub quorum: f64,

    /// Curators whose `reject` forces rejection under any mechanism
    #[serde(default)]
    pub veto_rights: Vec<CuratorId>,

    /// Per-curator weights for the weighted mechanism
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weightings: Option<BTreeMap<CuratorId, f64>>,
}

impl Default for VotingRules {
    fn default() -> Self {
        Self {
            mechanism: VotingMechanism::default(),
            quorum: default_quorum(),
            veto_rights: Vec::new(),
            weightings: None,
        }
    }
}

impl VotingRules {
    pub fn new(mechanism: VotingMechanism, quorum: f64) -> Self {
        Self {
            mechanism,
            quorum,
            ..Default::default()
        }
    }

    pub fn with_veto_rights(mut self, curators: Vec<CuratorId>) -> Self {
        self.veto_rights = curators;
        self
    }

    pub fn with_weightings(mut self, weightings: BTreeMap<CuratorId, f64>) -> Self {
        self.weightings = Some(weightings);
        self
    }
}

/// Vote-counting rule applied once quorum is met
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingMechanism {
    Unanimous,
    #[default]
    Majority,
    Weighted,
    Veto,
}

/// A curator's current stance on a work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Accept,
    Reject,
    Abstain,
}

impl FromStr for VoteChoice {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "abstain" => Ok(Self::Abstain),
            other => Err(ParseEnumError::new("vote", other, "accept, reject, abstain")),
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Abstain => "abstain",
        };
        f.write_str(s)
    }
}

/// One curator's vote within a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub curator_id: CuratorId,

    pub vote: VoteChoice,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl Vote {
    pub fn new(curator_id: CuratorId, vote: VoteChoice) -> Self {
        Self {
            curator_id,
            vote,
            reason: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Result of counting a decision's votes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Accepted,
    Rejected,
    #[default]
    Pending,
}

impl Outcome {
    pub fn is_final(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// All votes cast on one work within a collaboration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub work_id: WorkId,

    #[serde(default)]
    pub votes: Vec<Vote>,

    #[serde(default)]
    pub outcome: Outcome,

    /// Set while the outcome is final
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Decision {
    pub fn new(work_id: WorkId) -> Self {
        Self {
            work_id,
            votes: Vec::new(),
            outcome: Outcome::Pending,
            decided_at: None,
            created_at: Utc::now(),
        }
    }

    /// Record `vote`, replacing any earlier vote by the same curator in place
    pub fn record_vote(&mut self, vote: Vote) {
        match self
            .votes
            .iter_mut()
            .find(|v| v.curator_id == vote.curator_id)
        {
            Some(existing) => *existing = vote,
            None => self.votes.push(vote),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_quorum() -> f64 {
    0.5
}
