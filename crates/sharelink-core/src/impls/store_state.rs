//! Map-based store state shared by the in-memory and JSON-file stores.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::gate;
use crate::domain::{Admission, Artifact, ArtifactId};
use crate::ports::StoreError;

/// Records keyed by id plus insertion order.
///
/// Design:
/// - `records` is the single source of truth for each artifact.
/// - `order` holds ids only, for insertion-ordered listing.
/// - Callers serialize access (one lock around the whole state).
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    records: HashMap<ArtifactId, Artifact>,
    order: Vec<ArtifactId>,
}

impl StoreState {
    pub(crate) fn from_records(records: Vec<Artifact>) -> Result<Self, StoreError> {
        let mut state = Self::default();
        for artifact in records {
            state.insert(artifact)?;
        }
        Ok(state)
    }

    pub(crate) fn insert(&mut self, artifact: Artifact) -> Result<ArtifactId, StoreError> {
        artifact.validate().map_err(StoreError::Validation)?;
        let id = artifact.id;
        if self.records.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        self.records.insert(id, artifact);
        self.order.push(id);
        Ok(id)
    }

    pub(crate) fn get(&self, id: ArtifactId) -> Result<&Artifact, StoreError> {
        self.records.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Records in insertion order.
    pub(crate) fn ordered(&self) -> impl Iterator<Item = &Artifact> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub(crate) fn remove(&mut self, id: ArtifactId) -> Result<Artifact, StoreError> {
        let artifact = self.records.remove(&id).ok_or(StoreError::NotFound(id))?;
        self.order.retain(|x| *x != id);
        Ok(artifact)
    }

    pub(crate) fn increment(&mut self, id: ArtifactId) -> Result<u64, StoreError> {
        let artifact = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        artifact.access_count = artifact.access_count.saturating_add(1);
        Ok(artifact.access_count)
    }

    pub(crate) fn consume(
        &mut self,
        id: ArtifactId,
        now: DateTime<Utc>,
    ) -> Result<Admission, StoreError> {
        let artifact = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let decision = gate::check_and_consume(artifact, now);
        Ok(Admission {
            decision,
            artifact: artifact.clone(),
        })
    }

    pub(crate) fn reclaimable(&self, now: DateTime<Utc>) -> Vec<ArtifactId> {
        self.ordered()
            .filter(|a| gate::evaluate(a, now).is_permanent_denial())
            .map(|a| a.id)
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
