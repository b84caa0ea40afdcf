//! Collection membership and aggregate stats

use crate::error::{CurationError, CurationResult, StoreResult};
use crate::store::{RecordStore, WorkStore};
use chrono::Utc;
use eden_types::{
    AgentId, Collection, CollectionCriteria, CollectionId, CollectionStats, CollectionWork,
    CuratorId, Permission, ParseEnumError, Work, WorkId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Number of themes reported in collection stats
pub const TOP_THEMES: usize = 5;

/// Request to add a work to a collection
#[derive(Debug, Clone, Default)]
pub struct AddWork {
    pub work_id: WorkId,
    pub curator_id: Option<CuratorId>,
    pub position: Option<usize>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Shape of a membership listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFormat {
    #[default]
    Minimal,
    Full,
}

impl FromStr for ListFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Self::Minimal),
            "full" => Ok(Self::Full),
            other => Err(ParseEnumError::new("format", other, "full, minimal")),
        }
    }
}

/// Membership entry with the member work inlined
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberWork {
    #[serde(flatten)]
    pub entry: CollectionWork,
    /// `None` when the work no longer exists in its agent store
    pub work: Option<Work>,
}

/// Membership listing in the requested format
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WorkListing {
    Minimal(Vec<CollectionWork>),
    Full(Vec<MemberWork>),
}

impl WorkListing {
    pub fn len(&self) -> usize {
        match self {
            Self::Minimal(items) => items.len(),
            Self::Full(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collection records and membership management
#[derive(Debug, Clone)]
pub struct Collections {
    store: RecordStore<Collection>,
    works: WorkStore,
}

impl Collections {
    pub fn new(data_dir: impl AsRef<Path>, works: WorkStore) -> Self {
        Self {
            store: RecordStore::new(data_dir),
            works,
        }
    }

    pub fn create(&self, mut collection: Collection) -> CurationResult<Collection> {
        if collection.title.trim().is_empty() {
            return Err(CurationError::Validation("title is required".to_string()));
        }
        collection.stats = self.recompute_stats(&collection)?;

        if !self.store.insert(collection.clone())? {
            return Err(CurationError::Conflict(format!(
                "Collection {} already exists",
                collection.id
            )));
        }
        info!(collection_id = %collection.id, "Created collection");
        Ok(collection)
    }

    pub fn list(&self) -> CurationResult<Vec<Collection>> {
        Ok(self.store.load_all()?)
    }

    pub fn get(&self, id: &CollectionId) -> CurationResult<Collection> {
        self.store
            .get(id)?
            .ok_or_else(|| CurationError::NotFound(format!("Collection {id} not found")))
    }

    /// Add a work, enforcing permissions, uniqueness and acceptance criteria
    pub fn add_work(&self, id: &CollectionId, request: AddWork) -> CurationResult<Collection> {
        let mut collection = self.get(id)?;

        if let Some(curator) = &request.curator_id {
            if !collection.allows(curator, Permission::Add) {
                return Err(CurationError::Forbidden(format!(
                    "Curator {curator} may not add works to collection {id}"
                )));
            }
        }

        if collection.contains(&request.work_id) {
            return Err(CurationError::Conflict(format!(
                "Work {} is already in collection {id}",
                request.work_id
            )));
        }

        let work = self
            .works
            .locate(&request.work_id)?
            .ok_or_else(|| CurationError::NotFound(format!("Work {} not found", request.work_id)))?;

        if collection.criteria.auto_accept {
            check_criteria(&collection.criteria, &work)?;
        }

        let entry = CollectionWork {
            work_id: work.id.clone(),
            agent_id: work.agent_id.clone(),
            position: 0,
            added_by: request.curator_id.clone(),
            added_at: Utc::now(),
            metadata: request.metadata,
        };
        let index = request
            .position
            .unwrap_or(collection.works.len())
            .min(collection.works.len());
        collection.works.insert(index, entry);
        collection.renumber();
        collection.stats = self.recompute_stats(&collection)?;
        collection.updated_at = Utc::now();

        self.store
            .replace_existing(collection.clone(), "Collection")?;
        info!(
            collection_id = %id,
            work_id = %work.id,
            position = index,
            "Added work to collection"
        );

        self.link_work(&work.agent_id, &work.id, id, true);
        Ok(collection)
    }

    /// Remove a work from a collection
    pub fn remove_work(
        &self,
        id: &CollectionId,
        work_id: &WorkId,
        curator_id: Option<&CuratorId>,
    ) -> CurationResult<Collection> {
        let mut collection = self.get(id)?;

        if let Some(curator) = curator_id {
            if !collection.allows(curator, Permission::Remove) {
                return Err(CurationError::Forbidden(format!(
                    "Curator {curator} may not remove works from collection {id}"
                )));
            }
        }

        let index = collection
            .works
            .iter()
            .position(|w| &w.work_id == work_id)
            .ok_or_else(|| {
                CurationError::NotFound(format!("Work {work_id} is not in collection {id}"))
            })?;
        let removed = collection.works.remove(index);
        collection.renumber();
        collection.stats = self.recompute_stats(&collection)?;
        collection.updated_at = Utc::now();

        self.store
            .replace_existing(collection.clone(), "Collection")?;
        info!(collection_id = %id, work_id = %work_id, "Removed work from collection");

        self.link_work(&removed.agent_id, work_id, id, false);
        Ok(collection)
    }

    pub fn list_works(&self, id: &CollectionId, format: ListFormat) -> CurationResult<WorkListing> {
        let collection = self.get(id)?;
        match format {
            ListFormat::Minimal => Ok(WorkListing::Minimal(collection.works)),
            ListFormat::Full => {
                let mut cache = HashMap::new();
                let mut items = Vec::with_capacity(collection.works.len());
                for entry in collection.works {
                    let work = self.cached_work(&mut cache, &entry.agent_id, &entry.work_id)?;
                    items.push(MemberWork { entry, work });
                }
                Ok(WorkListing::Full(items))
            }
        }
    }

    /// Recompute stats from every member work. View and share counters carry over.
    pub fn recompute_stats(&self, collection: &Collection) -> StoreResult<CollectionStats> {
        let mut cache = HashMap::new();
        let mut members = Vec::with_capacity(collection.works.len());
        for entry in &collection.works {
            if let Some(work) = self.cached_work(&mut cache, &entry.agent_id, &entry.work_id)? {
                members.push(work);
            }
        }

        let qualities: Vec<f64> = members.iter().filter_map(Work::quality).collect();
        let average_quality = if qualities.is_empty() {
            None
        } else {
            Some(qualities.iter().sum::<f64>() / qualities.len() as f64)
        };

        Ok(CollectionStats {
            work_count: collection.works.len(),
            average_quality,
            top_themes: top_themes(&members, TOP_THEMES),
            views: collection.stats.views,
            shares: collection.stats.shares,
        })
    }

    fn cached_work(
        &self,
        cache: &mut HashMap<AgentId, Vec<Work>>,
        agent: &AgentId,
        work_id: &WorkId,
    ) -> StoreResult<Option<Work>> {
        if !cache.contains_key(agent) {
            cache.insert(agent.clone(), self.works.load(agent)?);
        }
        Ok(cache
            .get(agent)
            .and_then(|works| works.iter().find(|w| &w.id == work_id))
            .cloned())
    }

    /// Keep the work's collection references in step. Failures are logged only.
    fn link_work(&self, agent: &AgentId, work_id: &WorkId, collection_id: &CollectionId, add: bool) {
        let result = self.works.update(agent, work_id, |work| {
            let collections = &mut work.curation_mut().collections;
            collections.retain(|c| c != collection_id);
            if add {
                collections.push(collection_id.clone());
            }
        });
        if let Err(err) = result {
            warn!(
                collection_id = %collection_id,
                work_id = %work_id,
                error = %err,
                "Failed to update work collection references"
            );
        }
    }
}

fn check_criteria(criteria: &CollectionCriteria, work: &Work) -> CurationResult<()> {
    let mut failures = Vec::new();

    if let Some(min) = criteria.min_quality {
        match work.quality() {
            Some(quality) if quality >= min => {}
            Some(quality) => failures.push(format!("quality {quality} is below minimum {min}")),
            None => failures.push(format!("work has no quality score (minimum {min})")),
        }
    }

    let missing: Vec<&str> = criteria
        .required_themes
        .iter()
        .filter(|theme| !work.has_theme(theme))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        failures.push(format!("missing required themes: {}", missing.join(", ")));
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CurationError::CriteriaNotMet(failures.join("; ")))
    }
}

/// Most frequent themes, ties broken by first appearance
fn top_themes(works: &[Work], limit: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for theme in works.iter().flat_map(|w| w.themes.iter()) {
        match counts.iter_mut().find(|(t, _)| t == theme) {
            Some((_, count)) => *count += 1,
            None => counts.push((theme.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(t, _)| t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        works: WorkStore,
        collections: Collections,
        id: CollectionId,
    }

    fn curator(id: &str) -> CuratorId {
        CuratorId::new(id)
    }

    fn fixture(criteria: CollectionCriteria) -> Fixture {
        let dir = TempDir::new().unwrap();
        let works = WorkStore::new(dir.path());
        let abraham = AgentId::new("abraham");
        let solienne = AgentId::new("solienne");
        works
            .upsert(
                Work::new(abraham.clone(), "Dawn")
                    .with_id(WorkId::new("w1"))
                    .with_themes(["light", "memory"])
                    .with_quality(0.9),
            )
            .unwrap();
        works
            .upsert(
                Work::new(abraham, "Dusk")
                    .with_id(WorkId::new("w2"))
                    .with_themes(["light", "loss"])
                    .with_quality(0.5),
            )
            .unwrap();
        works
            .upsert(
                Work::new(solienne, "Mirror")
                    .with_id(WorkId::new("w3"))
                    .with_themes(["identity"]),
            )
            .unwrap();

        let collections = Collections::new(dir.path(), works.clone());
        let collection = collections
            .create(
                Collection::new("Light studies", curator("owner"))
                    .with_collaborator(curator("adder"), vec![Permission::Add])
                    .with_collaborator(curator("admin"), vec![Permission::Admin])
                    .with_criteria(criteria),
            )
            .unwrap();
        Fixture {
            _dir: dir,
            works,
            collections,
            id: collection.id,
        }
    }

    fn add(work: &str, curator_id: Option<&str>) -> AddWork {
        AddWork {
            work_id: WorkId::new(work),
            curator_id: curator_id.map(CuratorId::new),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_recomputes_stats_across_agents() {
        let fx = fixture(CollectionCriteria::default());
        fx.collections.add_work(&fx.id, add("w1", Some("owner"))).unwrap();
        fx.collections.add_work(&fx.id, add("w2", Some("adder"))).unwrap();
        let collection = fx.collections.add_work(&fx.id, add("w3", None)).unwrap();

        assert_eq!(collection.stats.work_count, 3);
        let avg = collection.stats.average_quality.unwrap();
        assert!((avg - 0.7).abs() < 1e-9);
        assert_eq!(collection.stats.top_themes[0], "light");
        assert_eq!(
            collection.stats.top_themes,
            vec!["light", "memory", "loss", "identity"]
        );
        assert_eq!(collection.works[2].agent_id, AgentId::new("solienne"));
    }

    #[test]
    fn test_add_links_work_back_to_collection() {
        let fx = fixture(CollectionCriteria::default());
        fx.collections.add_work(&fx.id, add("w1", None)).unwrap();
        let work = fx.works.locate(&WorkId::new("w1")).unwrap().unwrap();
        assert_eq!(work.curation.unwrap().collections, vec![fx.id.clone()]);

        fx.collections
            .remove_work(&fx.id, &WorkId::new("w1"), None)
            .unwrap();
        let work = fx.works.locate(&WorkId::new("w1")).unwrap().unwrap();
        assert!(work.curation.unwrap().collections.is_empty());
    }

    #[test]
    fn test_add_requires_permission() {
        let fx = fixture(CollectionCriteria::default());
        let err = fx
            .collections
            .add_work(&fx.id, add("w1", Some("stranger")))
            .unwrap_err();
        assert!(matches!(err, CurationError::Forbidden(_)));
    }

    #[test]
    fn test_duplicate_membership_conflicts() {
        let fx = fixture(CollectionCriteria::default());
        fx.collections.add_work(&fx.id, add("w1", None)).unwrap();
        let err = fx.collections.add_work(&fx.id, add("w1", None)).unwrap_err();
        assert!(matches!(err, CurationError::Conflict(_)));
    }

    #[test]
    fn test_unknown_work_or_collection_not_found() {
        let fx = fixture(CollectionCriteria::default());
        let err = fx.collections.add_work(&fx.id, add("nope", None)).unwrap_err();
        assert!(matches!(err, CurationError::NotFound(_)));

        let err = fx
            .collections
            .add_work(&CollectionId::new("missing"), add("w1", None))
            .unwrap_err();
        assert!(matches!(err, CurationError::NotFound(_)));
    }

    #[test]
    fn test_criteria_enforced_only_with_auto_accept() {
        let strict = CollectionCriteria {
            min_quality: Some(0.8),
            required_themes: vec!["Light".to_string()],
            auto_accept: true,
        };
        let fx = fixture(strict.clone());
        fx.collections.add_work(&fx.id, add("w1", None)).unwrap();
        let err = fx.collections.add_work(&fx.id, add("w2", None)).unwrap_err();
        assert!(matches!(err, CurationError::CriteriaNotMet(_)));
        let err = fx.collections.add_work(&fx.id, add("w3", None)).unwrap_err();
        match err {
            CurationError::CriteriaNotMet(reason) => {
                assert!(reason.contains("no quality score"));
                assert!(reason.contains("Light"));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let lax = fixture(CollectionCriteria {
            auto_accept: false,
            ..strict
        });
        lax.collections.add_work(&lax.id, add("w2", None)).unwrap();
    }

    #[test]
    fn test_position_inserts_and_renumbers() {
        let fx = fixture(CollectionCriteria::default());
        fx.collections.add_work(&fx.id, add("w1", None)).unwrap();
        fx.collections.add_work(&fx.id, add("w2", None)).unwrap();
        let collection = fx
            .collections
            .add_work(
                &fx.id,
                AddWork {
                    position: Some(0),
                    ..add("w3", None)
                },
            )
            .unwrap();

        let order: Vec<_> = collection.works.iter().map(|w| w.work_id.as_str()).collect();
        assert_eq!(order, vec!["w3", "w1", "w2"]);
        let positions: Vec<_> = collection.works.iter().map(|w| w.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_remove_checks_permission_and_membership() {
        let fx = fixture(CollectionCriteria::default());
        fx.collections.add_work(&fx.id, add("w1", None)).unwrap();
        fx.collections.add_work(&fx.id, add("w2", None)).unwrap();

        let err = fx
            .collections
            .remove_work(&fx.id, &WorkId::new("w1"), Some(&curator("adder")))
            .unwrap_err();
        assert!(matches!(err, CurationError::Forbidden(_)));

        let err = fx
            .collections
            .remove_work(&fx.id, &WorkId::new("w3"), Some(&curator("admin")))
            .unwrap_err();
        assert!(matches!(err, CurationError::NotFound(_)));

        let collection = fx
            .collections
            .remove_work(&fx.id, &WorkId::new("w1"), Some(&curator("admin")))
            .unwrap();
        assert_eq!(collection.stats.work_count, 1);
        assert_eq!(collection.works[0].position, 0);
        assert_eq!(collection.stats.average_quality, Some(0.5));
    }

    #[test]
    fn test_stats_preserve_counters() {
        let fx = fixture(CollectionCriteria::default());
        let mut collection = fx.collections.get(&fx.id).unwrap();
        collection.stats.views = 42;
        collection.stats.shares = 7;
        fx.collections.store.replace(collection).unwrap();

        let collection = fx.collections.add_work(&fx.id, add("w1", None)).unwrap();
        assert_eq!(collection.stats.views, 42);
        assert_eq!(collection.stats.shares, 7);
    }

    #[test]
    fn test_full_listing_inlines_works() {
        let fx = fixture(CollectionCriteria::default());
        fx.collections.add_work(&fx.id, add("w1", None)).unwrap();

        match fx.collections.list_works(&fx.id, ListFormat::Full).unwrap() {
            WorkListing::Full(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].work.as_ref().unwrap().title, "Dawn");
            }
            other => panic!("unexpected listing {other:?}"),
        }

        let minimal = fx.collections.list_works(&fx.id, ListFormat::Minimal).unwrap();
        let json = serde_json::to_value(&minimal).unwrap();
        assert_eq!(json[0]["workId"], "w1");
        assert!(json[0].get("work").is_none());
    }

    #[test]
    fn test_top_themes_limit_and_ties() {
        let agent = AgentId::new("a");
        let works = vec![
            Work::new(agent.clone(), "1").with_themes(["f", "a", "b", "c", "d", "e"]),
            Work::new(agent, "2").with_themes(["e"]),
        ];
        assert_eq!(top_themes(&works, 5), vec!["e", "f", "a", "b", "c"]);
    }

    #[test]
    fn test_list_format_parsing() {
        assert_eq!("full".parse::<ListFormat>().unwrap(), ListFormat::Full);
        let err = "verbose".parse::<ListFormat>().unwrap_err();
        assert_eq!(err, ParseEnumError::new("format", "verbose", "full, minimal"));
        assert_eq!(
            err.to_string(),
            "invalid format 'verbose'; expected one of: full, minimal"
        );
    }
}
