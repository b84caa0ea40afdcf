//! Applying accepted collaborative decisions to works

use crate::error::StoreResult;
use crate::store::WorkStore;
use chrono::Utc;
use eden_types::{Collaboration, CollaborationRef, Decision, HistoryEntry, Outcome};
use tracing::{info, warn};

/// Curator label stamped on works curated by a collaboration vote
pub const COLLABORATIVE_CURATOR: &str = "collaborative";

/// History action recorded when a collaboration accepts a work
pub const COLLABORATIVE_ACTION: &str = "collaborative_curation";

/// Marks works curated when a collaboration accepts them.
///
/// Application is a secondary effect of vote recording: failures are logged
/// and swallowed so the vote itself still succeeds. It runs on every vote
/// that leaves a decision accepted, so a work accumulates one history entry
/// per such vote.
#[derive(Debug, Clone)]
pub struct DecisionApplier {
    works: WorkStore,
}

impl DecisionApplier {
    pub fn new(works: WorkStore) -> Self {
        Self { works }
    }

    /// Apply `decision` if accepted. Returns whether the work was updated.
    pub fn apply(&self, collaboration: &Collaboration, decision: &Decision) -> bool {
        if decision.outcome != Outcome::Accepted {
            return false;
        }

        match self.try_apply(collaboration, decision) {
            Ok(true) => {
                info!(
                    collaboration_id = %collaboration.id,
                    work_id = %decision.work_id,
                    "Applied collaborative decision to work"
                );
                true
            }
            Ok(false) => {
                warn!(
                    collaboration_id = %collaboration.id,
                    work_id = %decision.work_id,
                    "Accepted work not found in any work store"
                );
                false
            }
            Err(err) => {
                warn!(
                    collaboration_id = %collaboration.id,
                    work_id = %decision.work_id,
                    error = %err,
                    "Failed to apply collaborative decision"
                );
                false
            }
        }
    }

    fn try_apply(&self, collaboration: &Collaboration, decision: &Decision) -> StoreResult<bool> {
        let work = match &collaboration.agent_id {
            Some(agent) => self.works.get(agent, &decision.work_id)?,
            None => self.works.locate(&decision.work_id)?,
        };
        let Some(work) = work else {
            return Ok(false);
        };

        let now = Utc::now();
        let participants: Vec<_> = decision.votes.iter().map(|v| v.curator_id.clone()).collect();
        let collaboration_ref = CollaborationRef {
            id: collaboration.id.clone(),
            title: collaboration.title.clone(),
        };

        let updated = self
            .works
            .update(&work.agent_id, &decision.work_id, |work| {
                let curation = work.curation_mut();
                curation.curated = true;
                curation.curated_at = Some(now);
                curation.curated_by = Some(COLLABORATIVE_CURATOR.to_string());
                curation.collaboration = Some(collaboration_ref);
                curation.history.push(HistoryEntry {
                    action: COLLABORATIVE_ACTION.to_string(),
                    actor: COLLABORATIVE_CURATOR.to_string(),
                    collaboration_id: Some(collaboration.id.clone()),
                    participants,
                    note: Some(format!("Accepted by collaboration '{}'", collaboration.title)),
                    timestamp: now,
                });
            })?;

        Ok(updated.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eden_types::{AgentId, CuratorId, Vote, VoteChoice, VotingRules, Work, WorkId};
    use tempfile::TempDir;

    fn setup() -> (TempDir, WorkStore, Collaboration, Decision) {
        let dir = TempDir::new().unwrap();
        let works = WorkStore::new(dir.path());
        works
            .upsert(Work::new(AgentId::new("abraham"), "Dawn").with_id(WorkId::new("w1")))
            .unwrap();

        let collab = Collaboration::new("Spring review", VotingRules::default())
            .with_participant(CuratorId::new("a"), "Ada");
        let mut decision = Decision::new(WorkId::new("w1"));
        decision.record_vote(Vote::new(CuratorId::new("a"), VoteChoice::Accept));
        decision.outcome = Outcome::Accepted;
        (dir, works, collab, decision)
    }

    #[test]
    fn test_apply_marks_work_curated() {
        let (_dir, works, collab, decision) = setup();
        let applier = DecisionApplier::new(works.clone());

        assert!(applier.apply(&collab, &decision));

        let work = works.locate(&WorkId::new("w1")).unwrap().unwrap();
        let curation = work.curation.unwrap();
        assert!(curation.curated);
        assert!(curation.curated_at.is_some());
        assert_eq!(curation.curated_by.as_deref(), Some(COLLABORATIVE_CURATOR));
        assert_eq!(curation.collaboration.unwrap().id, collab.id);
        assert_eq!(curation.history.len(), 1);
        assert_eq!(curation.history[0].participants, vec![CuratorId::new("a")]);
    }

    #[test]
    fn test_repeated_application_duplicates_history() {
        let (_dir, works, collab, decision) = setup();
        let applier = DecisionApplier::new(works.clone());

        assert!(applier.apply(&collab, &decision));
        assert!(applier.apply(&collab, &decision));
        assert!(applier.apply(&collab, &decision));

        let work = works.locate(&WorkId::new("w1")).unwrap().unwrap();
        assert_eq!(work.curation.unwrap().history.len(), 3);
    }

    #[test]
    fn test_pending_decision_is_not_applied() {
        let (_dir, works, collab, mut decision) = setup();
        decision.outcome = Outcome::Pending;
        let applier = DecisionApplier::new(works.clone());

        assert!(!applier.apply(&collab, &decision));
        assert!(!works.locate(&WorkId::new("w1")).unwrap().unwrap().is_curated());
    }

    #[test]
    fn test_missing_work_is_swallowed() {
        let (_dir, works, collab, mut decision) = setup();
        decision.work_id = WorkId::new("ghost");
        let applier = DecisionApplier::new(works);

        assert!(!applier.apply(&collab, &decision));
    }

    #[test]
    fn test_scoped_collaboration_only_searches_its_agent() {
        let (_dir, works, mut collab, decision) = setup();
        collab.agent_id = Some(AgentId::new("solienne"));
        let applier = DecisionApplier::new(works.clone());

        assert!(!applier.apply(&collab, &decision));
        assert!(!works.locate(&WorkId::new("w1")).unwrap().unwrap().is_curated());
    }
}
