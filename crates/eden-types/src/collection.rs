//! Curated collections of works

use crate::error::ParseEnumError;
use crate::{AgentId, CollectionId, CuratorId, WorkId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A curator-owned, ordered set of works
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Curator that owns the collection. Owners hold every permission.
    pub owner_id: CuratorId,

    #[serde(default)]
    pub collaborators: Vec<Collaborator>,

    /// Membership entries, ordered by `position`
    #[serde(default)]
    pub works: Vec<CollectionWork>,

    #[serde(default)]
    pub criteria: CollectionCriteria,

    /// Aggregate stats, recomputed on every membership change
    #[serde(default)]
    pub stats: CollectionStats,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(title: impl Into<String>, owner_id: CuratorId) -> Self {
        let now = Utc::now();
        Self {
            id: CollectionId::generate(),
            title: title.into(),
            description: None,
            owner_id,
            collaborators: Vec::new(),
            works: Vec::new(),
            criteria: CollectionCriteria::default(),
            stats: CollectionStats::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_collaborator(mut self, curator_id: CuratorId, permissions: Vec<Permission>) -> Self {
        self.collaborators.push(Collaborator {
            curator_id,
            permissions,
        });
        self
    }

    pub fn with_criteria(mut self, criteria: CollectionCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Whether `curator` may perform `permission`. `Admin` implies every permission.
    pub fn allows(&self, curator: &CuratorId, permission: Permission) -> bool {
        if &self.owner_id == curator {
            return true;
        }
        self.collaborators
            .iter()
            .filter(|c| &c.curator_id == curator)
            .flat_map(|c| c.permissions.iter())
            .any(|p| *p == permission || *p == Permission::Admin)
    }

    pub fn contains(&self, work_id: &WorkId) -> bool {
        self.works.iter().any(|w| &w.work_id == work_id)
    }

    /// Reassign positions 0..n following current order
    pub fn renumber(&mut self) {
        for (index, entry) in self.works.iter_mut().enumerate() {
            entry.position = index;
        }
    }
}

/// A curator granted access to a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub curator_id: CuratorId,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Collection permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Add,
    Remove,
    Edit,
    Admin,
}

impl FromStr for Permission {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "edit" => Ok(Self::Edit),
            "admin" => Ok(Self::Admin),
            other => Err(ParseEnumError::new(
                "permission",
                other,
                "add, remove, edit, admin",
            )),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Edit => "edit",
            Self::Admin => "admin",
        };
        f.write_str(s)
    }
}

/// One membership entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWork {
    pub work_id: WorkId,

    /// Agent whose store holds the work
    pub agent_id: AgentId,

    pub position: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<CuratorId>,

    pub added_at: DateTime<Utc>,

    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Acceptance criteria, enforced only when `auto_accept` is set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quality: Option<f64>,

    #[serde(default)]
    pub required_themes: Vec<String>,

    #[serde(default)]
    pub auto_accept: bool,
}

/// Aggregate collection stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    #[serde(default)]
    pub work_count: usize,

    /// Mean quality across members that carry a quality score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_quality: Option<f64>,

    /// Up to five most frequent member themes
    #[serde(default)]
    pub top_themes: Vec<String>,

    #[serde(default)]
    pub views: u64,

    #[serde(default)]
    pub shares: u64,
}
