//! Collaborative curation: vote submission and decision status
//!
//! Every call reads `collaborations.json` in full; mutations write it back in
//! full. Stored outcomes are refreshed on every vote, and reads recompute
//! them from the current votes and participant list, so a participant
//! deactivated after voting began is reflected immediately in reported
//! outcomes without rewriting the file.

use crate::applier::DecisionApplier;
use crate::error::{CurationError, CurationResult};
use crate::store::{RecordStore, WorkStore};
use crate::tally::{summarize, tally, VoteSummary};
use chrono::{DateTime, Utc};
use eden_types::{
    Collaboration, CollaborationId, CuratorId, Decision, Outcome, Participant, Vote, VoteChoice,
    WorkId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// A validated vote submission
#[derive(Debug, Clone)]
pub struct VoteSubmission {
    pub work_id: WorkId,
    pub curator_id: CuratorId,
    pub vote: VoteChoice,
    pub reason: Option<String>,
}

/// Outcome block returned after a vote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOutcome {
    pub outcome: Outcome,
    pub vote_summary: VoteSummary,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Result of recording a vote
#[derive(Debug, Clone)]
pub struct VoteReceipt {
    pub vote: Vote,
    pub decision: DecisionOutcome,
    /// Whether the accepted decision was applied to the work
    pub applied: bool,
}

/// A decision with its current projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionStatus {
    pub work_id: WorkId,
    pub votes: Vec<Vote>,
    pub outcome: Outcome,
    pub vote_summary: VoteSummary,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Outcome counts across a collaboration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionStats {
    pub total_decisions: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub pending: usize,
}

/// Every decision of a collaboration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionsOverview {
    pub collaboration_id: CollaborationId,
    pub decisions: Vec<DecisionStatus>,
    pub stats: DecisionStats,
}

/// Collaboration records and the voting workflow over them
#[derive(Debug, Clone)]
pub struct Collaborations {
    store: RecordStore<Collaboration>,
    applier: DecisionApplier,
}

impl Collaborations {
    pub fn new(data_dir: impl AsRef<Path>, works: WorkStore) -> Self {
        Self {
            store: RecordStore::new(data_dir),
            applier: DecisionApplier::new(works),
        }
    }

    pub fn create(&self, collaboration: Collaboration) -> CurationResult<Collaboration> {
        if collaboration.title.trim().is_empty() {
            return Err(CurationError::Validation("title is required".to_string()));
        }
        let quorum = collaboration.voting_rules.quorum;
        if !(0.0..=1.0).contains(&quorum) {
            return Err(CurationError::Validation(format!(
                "quorum must be between 0 and 1, got {quorum}"
            )));
        }
        if let Some(dup) = first_duplicate(&collaboration.participants) {
            return Err(CurationError::Validation(format!(
                "participant {dup} listed more than once"
            )));
        }

        if !self.store.insert(collaboration.clone())? {
            return Err(CurationError::Conflict(format!(
                "Collaboration {} already exists",
                collaboration.id
            )));
        }

        info!(collaboration_id = %collaboration.id, "Created collaboration");
        Ok(collaboration)
    }

    pub fn list(&self) -> CurationResult<Vec<Collaboration>> {
        Ok(self.store.load_all()?)
    }

    pub fn get(&self, id: &CollaborationId) -> CurationResult<Collaboration> {
        self.store
            .get(id)?
            .ok_or_else(|| CurationError::NotFound(format!("Collaboration {id} not found")))
    }

    /// Activate or deactivate a participant.
    ///
    /// Stored outcomes are left as they are; reads project them against the
    /// new participant list and the next vote rewrites them.
    pub fn set_participant_active(
        &self,
        id: &CollaborationId,
        curator_id: &CuratorId,
        active: bool,
    ) -> CurationResult<Collaboration> {
        let mut collaboration = self.get(id)?;
        let participant = collaboration
            .participants
            .iter_mut()
            .find(|p| &p.curator_id == curator_id)
            .ok_or_else(|| {
                CurationError::NotFound(format!(
                    "Curator {curator_id} is not a participant of collaboration {id}"
                ))
            })?;
        participant.active = active;
        collaboration.updated_at = Utc::now();

        self.store
            .replace_existing(collaboration.clone(), "Collaboration")?;
        info!(
            collaboration_id = %id,
            curator_id = %curator_id,
            active,
            "Updated participant"
        );
        Ok(collaboration)
    }

    /// Record a vote and recompute the work's decision
    pub fn submit_vote(
        &self,
        id: &CollaborationId,
        submission: VoteSubmission,
    ) -> CurationResult<VoteReceipt> {
        let mut collaboration = self.get(id)?;

        if !collaboration.is_active_participant(&submission.curator_id) {
            return Err(CurationError::Forbidden(format!(
                "Curator {} is not an active participant of collaboration {}",
                submission.curator_id, id
            )));
        }

        let now = Utc::now();
        let vote = Vote {
            curator_id: submission.curator_id,
            vote: submission.vote,
            reason: submission.reason,
            timestamp: now,
        };

        let rules = collaboration.voting_rules.clone();
        let participants = collaboration.participants.clone();
        let decision = collaboration.decision_mut(&submission.work_id);
        decision.record_vote(vote.clone());
        decision.outcome = tally(&decision.votes, &rules, &participants);
        decision.decided_at = decision.outcome.is_final().then_some(now);
        let decision = decision.clone();
        collaboration.updated_at = now;

        debug!(
            collaboration_id = %id,
            work_id = %decision.work_id,
            curator_id = %vote.curator_id,
            vote = %vote.vote,
            outcome = %decision.outcome,
            "Recorded vote"
        );

        self.store
            .replace_existing(collaboration.clone(), "Collaboration")?;
        let applied = self.applier.apply(&collaboration, &decision);

        Ok(VoteReceipt {
            vote,
            decision: DecisionOutcome {
                outcome: decision.outcome,
                vote_summary: summarize(&decision.votes, &rules, &participants),
                decided_at: decision.decided_at,
            },
            applied,
        })
    }

    /// Status of one work's decision; a work nobody voted on is pending with no votes
    pub fn work_status(
        &self,
        id: &CollaborationId,
        work_id: &WorkId,
    ) -> CurationResult<DecisionStatus> {
        let collaboration = self.get(id)?;
        let decision = collaboration
            .decision(work_id)
            .cloned()
            .unwrap_or_else(|| Decision::new(work_id.clone()));
        Ok(project(&collaboration, decision))
    }

    pub fn all_decisions(&self, id: &CollaborationId) -> CurationResult<DecisionsOverview> {
        let collaboration = self.get(id)?;
        let decisions: Vec<DecisionStatus> = collaboration
            .decisions
            .iter()
            .cloned()
            .map(|d| project(&collaboration, d))
            .collect();

        let stats = decisions
            .iter()
            .fold(DecisionStats::default(), |mut stats, d| {
                stats.total_decisions += 1;
                match d.outcome {
                    Outcome::Accepted => stats.accepted += 1,
                    Outcome::Rejected => stats.rejected += 1,
                    Outcome::Pending => stats.pending += 1,
                }
                stats
            });

        Ok(DecisionsOverview {
            collaboration_id: collaboration.id,
            decisions,
            stats,
        })
    }
}

fn first_duplicate(participants: &[Participant]) -> Option<&CuratorId> {
    let mut seen = HashSet::new();
    participants
        .iter()
        .map(|p| &p.curator_id)
        .find(|id| !seen.insert(*id))
}

fn project(collaboration: &Collaboration, decision: Decision) -> DecisionStatus {
    let rules = &collaboration.voting_rules;
    let participants = &collaboration.participants;
    let outcome = tally(&decision.votes, rules, participants);
    DecisionStatus {
        vote_summary: summarize(&decision.votes, rules, participants),
        outcome,
        decided_at: if outcome.is_final() {
            decision.decided_at
        } else {
            None
        },
        work_id: decision.work_id,
        votes: decision.votes,
    }
}
