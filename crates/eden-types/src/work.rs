//! Works (creations) and their curation state

use crate::{AgentId, CollaborationId, CollectionId, CuratorId, WorkId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A creation produced by an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    /// Unique work identifier
    pub id: WorkId,

    /// Owning agent. Filled from the store file name when absent on disk.
    #[serde(default)]
    pub agent_id: AgentId,

    pub title: String,

    #[serde(default)]
    pub medium: String,

    #[serde(default)]
    pub themes: Vec<String>,

    /// Quality scoring, when the work has been analysed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<WorkAnalysis>,

    /// Curation state, created lazily on first curation action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curation: Option<WorkCuration>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Work {
    pub fn new(agent_id: AgentId, title: impl Into<String>) -> Self {
        Self {
            id: WorkId::generate(),
            agent_id,
            title: title.into(),
            medium: String::new(),
            themes: Vec::new(),
            analysis: None,
            curation: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: WorkId) -> Self {
        self.id = id;
        self
    }

    pub fn with_medium(mut self, medium: impl Into<String>) -> Self {
        self.medium = medium.into();
        self
    }

    pub fn with_themes<I, S>(mut self, themes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.themes = themes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.analysis.get_or_insert_with(WorkAnalysis::default).quality = Some(quality);
        self
    }

    /// Quality score from the analysis block, if any
    pub fn quality(&self) -> Option<f64> {
        self.analysis.as_ref().and_then(|a| a.quality)
    }

    /// Case-insensitive theme membership
    pub fn has_theme(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t.eq_ignore_ascii_case(theme))
    }

    pub fn is_curated(&self) -> bool {
        self.curation.as_ref().is_some_and(|c| c.curated)
    }

    /// Curation block, inserting an empty one when absent
    pub fn curation_mut(&mut self) -> &mut WorkCuration {
        self.curation.get_or_insert_with(WorkCuration::default)
    }
}

/// Scores produced by work analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniqueness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

/// Curation state attached to a work
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkCuration {
    #[serde(default)]
    pub curated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curated_at: Option<DateTime<Utc>>,

    /// Who curated the work ("collaborative" for vote-driven curation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curated_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Collaboration whose decision curated the work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboration: Option<CollaborationRef>,

    /// Collections the work is a member of
    #[serde(default)]
    pub collections: Vec<CollectionId>,

    /// Append-only log of curation actions. Not deduplicated.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Reference to the collaboration that curated a work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRef {
    pub id: CollaborationId,
    pub title: String,
}

/// One curation action recorded on a work
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub action: String,

    pub actor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboration_id: Option<CollaborationId>,

    #[serde(default)]
    pub participants: Vec<CuratorId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_work_json_loads_with_defaults() {
        let work: Work = serde_json::from_str(r#"{"id":"w1","title":"Dawn"}"#).unwrap();
        assert_eq!(work.id, WorkId::new("w1"));
        assert!(work.themes.is_empty());
        assert!(work.curation.is_none());
        assert_eq!(work.quality(), None);
        assert!(!work.is_curated());
    }

    #[test]
    fn test_curation_mut_creates_default_block() {
        let mut work = Work::new(AgentId::new("abraham"), "Dawn");
        work.curation_mut().curated = true;
        assert!(work.is_curated());
        assert!(work.curation.as_ref().unwrap().history.is_empty());
    }

    #[test]
    fn test_theme_lookup_ignores_case() {
        let work = Work::new(AgentId::new("abraham"), "Dawn").with_themes(["Light", "memory"]);
        assert!(work.has_theme("light"));
        assert!(work.has_theme("MEMORY"));
        assert!(!work.has_theme("water"));
    }

    #[test]
    fn test_serialized_work_uses_camel_case() {
        let work = Work::new(AgentId::new("abraham"), "Dawn").with_quality(0.8);
        let json = serde_json::to_value(&work).unwrap();
        assert_eq!(json["agentId"], "abraham");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["analysis"]["quality"], 0.8);
    }
}
