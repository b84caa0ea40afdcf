//! JSON file stores
//!
//! Every store file holds a JSON array that is read in full on each call and
//! rewritten in full after each mutation. Writes go through a temporary file
//! followed by a rename, so readers never observe a half-written file.
//! Callers that need read-modify-write isolation serialize access themselves.

use crate::error::{CurationError, CurationResult, StoreError, StoreResult};
use eden_types::{
    AgentId, Collaboration, CollaborationId, Collection, CollectionId, CurationSession, SessionId,
    Work, WorkId,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Read a JSON document, yielding `T::default()` for a missing or empty file
pub(crate) fn read_json<T>(path: &Path) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let bytes = fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Atomically replace `path` with the pretty-printed JSON of `value`
pub(crate) fn write_json<T>(path: &Path, value: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, bytes)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

/// Whether `key` can name a file in a store directory
fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Per-agent work files under `<data_dir>/works/<agent>.json`
#[derive(Debug, Clone)]
pub struct WorkStore {
    root: PathBuf,
}

impl WorkStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().join("works"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, agent: &AgentId) -> StoreResult<PathBuf> {
        let key = agent.as_str();
        if !valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }

    /// All works of an agent, in file order
    pub fn load(&self, agent: &AgentId) -> StoreResult<Vec<Work>> {
        let mut works: Vec<Work> = read_json(&self.path_for(agent)?)?;
        for work in works.iter_mut().filter(|w| w.agent_id.as_str().is_empty()) {
            work.agent_id = agent.clone();
        }
        Ok(works)
    }

    pub fn save(&self, agent: &AgentId, works: &[Work]) -> StoreResult<()> {
        write_json(&self.path_for(agent)?, works)
    }

    pub fn get(&self, agent: &AgentId, work_id: &WorkId) -> StoreResult<Option<Work>> {
        Ok(self.load(agent)?.into_iter().find(|w| &w.id == work_id))
    }

    /// Agents that have a work file, sorted
    pub fn agents(&self) -> StoreResult<Vec<AgentId>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut agents = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if valid_key(stem) => agents.push(AgentId::new(stem)),
                _ => warn!(path = %path.display(), "Skipping work file with invalid agent name"),
            }
        }
        agents.sort();
        Ok(agents)
    }

    /// Find a work by id across every agent file
    pub fn locate(&self, work_id: &WorkId) -> StoreResult<Option<Work>> {
        for agent in self.agents()? {
            if let Some(work) = self.get(&agent, work_id)? {
                return Ok(Some(work));
            }
        }
        Ok(None)
    }

    /// Insert or replace a work in its agent's file
    pub fn upsert(&self, work: Work) -> StoreResult<()> {
        let agent = work.agent_id.clone();
        let mut works = self.load(&agent)?;
        match works.iter_mut().find(|w| w.id == work.id) {
            Some(existing) => *existing = work,
            None => works.push(work),
        }
        self.save(&agent, &works)
    }

    /// Read-modify-write one work. `None` when the work is absent; nothing is written then.
    pub fn update<F>(&self, agent: &AgentId, work_id: &WorkId, f: F) -> StoreResult<Option<Work>>
    where
        F: FnOnce(&mut Work),
    {
        let mut works = self.load(agent)?;
        let Some(work) = works.iter_mut().find(|w| &w.id == work_id) else {
            return Ok(None);
        };
        f(work);
        let updated = work.clone();
        self.save(agent, &works)?;
        Ok(Some(updated))
    }
}

/// A record kept in a shared array file
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: PartialEq + std::fmt::Display;

    /// File name under the data directory
    const FILE_NAME: &'static str;

    fn record_id(&self) -> &Self::Id;
}

impl Record for Collaboration {
    type Id = CollaborationId;
    const FILE_NAME: &'static str = "collaborations.json";

    fn record_id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Collection {
    type Id = CollectionId;
    const FILE_NAME: &'static str = "collections.json";

    fn record_id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for CurationSession {
    type Id = SessionId;
    const FILE_NAME: &'static str = "sessions.json";

    fn record_id(&self) -> &Self::Id {
        &self.id
    }
}

/// Shared array file of records of one kind
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    path: PathBuf,
    _record: std::marker::PhantomData<fn() -> R>,
}

impl<R: Record> RecordStore<R> {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(R::FILE_NAME),
            _record: std::marker::PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_all(&self) -> StoreResult<Vec<R>> {
        read_json(&self.path)
    }

    pub fn save_all(&self, records: &[R]) -> StoreResult<()> {
        write_json(&self.path, records)
    }

    pub fn get(&self, id: &R::Id) -> StoreResult<Option<R>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|r| r.record_id() == id))
    }

    /// Append a record. Returns `false` without writing when the id is taken.
    pub fn insert(&self, record: R) -> StoreResult<bool> {
        let mut records = self.load_all()?;
        if records.iter().any(|r| r.record_id() == record.record_id()) {
            return Ok(false);
        }
        records.push(record);
        self.save_all(&records)?;
        Ok(true)
    }

    /// Overwrite a record in place. Returns `false` without writing when it is absent.
    pub fn replace(&self, record: R) -> StoreResult<bool> {
        let mut records = self.load_all()?;
        let Some(slot) = records
            .iter_mut()
            .find(|r| r.record_id() == record.record_id())
        else {
            return Ok(false);
        };
        *slot = record;
        self.save_all(&records)?;
        Ok(true)
    }

    /// Overwrite a record that was read earlier in the same operation.
    /// A record that vanished in between is reported as not found.
    pub(crate) fn replace_existing(&self, record: R, kind: &str) -> CurationResult<()> {
        let id = record.record_id().to_string();
        if self.replace(record)? {
            Ok(())
        } else {
            Err(CurationError::NotFound(format!("{kind} {id} not found")))
        }
    }
}
