//! Eden Curation - collaborative curation over JSON file stores
//!
//! This crate holds the curation logic of the registry:
//! - Per-agent work files and shared collection/collaboration/session files
//! - Vote tallying with quorum, veto rights and four counting mechanisms
//! - Applying accepted decisions to works
//! - Collection membership with permission and criteria checks
//! - Single-curator review sessions
//!
//! All operations are synchronous whole-file read-modify-write cycles.
//! [`Registry`] performs no locking of its own; the service wraps it in a
//! mutex so one process never interleaves two writers.

#![deny(unsafe_code)]

pub mod applier;
pub mod collaboration;
pub mod collection;
pub mod error;
pub mod session;
pub mod store;
pub mod tally;

pub use applier::DecisionApplier;
pub use collaboration::{
    Collaborations, DecisionOutcome, DecisionStats, DecisionStatus, DecisionsOverview,
    VoteReceipt, VoteSubmission,
};
pub use collection::{AddWork, Collections, ListFormat, MemberWork, WorkListing};
pub use error::{CurationError, CurationResult, StoreError, StoreResult};
pub use session::{NewSession, Sessions};
pub use store::{RecordStore, WorkStore};
pub use tally::{quorum_met, summarize, tally, VoteCounts, VoteSummary};

use std::path::{Path, PathBuf};

/// Every curation store rooted at one data directory
#[derive(Debug, Clone)]
pub struct Registry {
    data_dir: PathBuf,
    pub works: WorkStore,
    pub collaborations: Collaborations,
    pub collections: Collections,
    pub sessions: Sessions,
}

impl Registry {
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let works = WorkStore::new(&data_dir);
        Self {
            collaborations: Collaborations::new(&data_dir, works.clone()),
            collections: Collections::new(&data_dir, works.clone()),
            sessions: Sessions::new(&data_dir, works.clone()),
            works,
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
