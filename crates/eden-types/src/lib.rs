//! Eden Types - Core records for the Eden Genesis Registry curation layer
//!
//! ## Key Concepts
//!
//! - **Work**: A creation owned by an agent, optionally analysed and curated
//! - **Collection**: A curator-owned ordered set of works with acceptance criteria
//! - **Collaboration**: A group of curators voting on works under shared rules
//! - **Decision**: The per-work set of votes within a collaboration and its outcome
//! - **CurationSession**: A single curator sorting works into review buckets
//!
//! All records serialize to camelCase JSON, matching the on-disk store files
//! and the REST surface.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod collaboration;
pub mod collection;
pub mod error;
pub mod ids;
pub mod session;
pub mod work;

pub use collaboration::{
    Collaboration, Decision, Outcome, Participant, Vote, VoteChoice, VotingMechanism, VotingRules,
};
pub use collection::{
    Collaborator, Collection, CollectionCriteria, CollectionStats, CollectionWork, Permission,
};
pub use error::ParseEnumError;
pub use ids::{AgentId, CollaborationId, CollectionId, CuratorId, SessionId, WorkId};
pub use session::{
    Classification, CurationSession, SessionDecision, SessionQueues, SessionStatus,
};
pub use work::{CollaborationRef, HistoryEntry, Work, WorkAnalysis, WorkCuration};
