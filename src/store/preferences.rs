//! Per-source on/off choices, persisted as one JSON object.
//!
//! The whole map is loaded from the backing [`KeyValueStore`] on first use and
//! rewritten in full on every mutation. All access goes through one async
//! mutex, so the first load happens once and concurrent writers are
//! serialized.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{Mutex, MutexGuard};

use crate::app::Result;
use crate::domain::TriState;
use crate::store::KeyValueStore;

pub const PREFERENCE_KEY: &str = "@PreferenceEnabledOrDisabled";

pub type PreferenceMap = HashMap<String, TriState>;

pub struct PreferenceStore {
    backend: Arc<dyn KeyValueStore + Send + Sync>,
    map: Mutex<Option<PreferenceMap>>,
}

impl PreferenceStore {
    pub fn new(backend: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        Self {
            backend,
            map: Mutex::new(None),
        }
    }

    pub async fn get(&self, name: &str) -> Result<TriState> {
        let guard = self.loaded().await?;
        Ok(guard
            .as_ref()
            .and_then(|map| map.get(name).copied())
            .unwrap_or_default())
    }

    pub async fn is_enabled(&self, name: &str) -> Result<bool> {
        Ok(self.get(name).await? == TriState::Enabled)
    }

    pub async fn is_disabled(&self, name: &str) -> Result<bool> {
        Ok(self.get(name).await? == TriState::Disabled)
    }

    pub async fn set_enabled(&self, name: &str) -> Result<()> {
        self.set(name, TriState::Enabled).await
    }

    pub async fn set_disabled(&self, name: &str) -> Result<()> {
        self.set(name, TriState::Disabled).await
    }

    /// Copy of every stored choice.
    pub async fn snapshot(&self) -> Result<PreferenceMap> {
        let guard = self.loaded().await?;
        Ok(guard.as_ref().cloned().unwrap_or_default())
    }

    /// Reset to no stored choices. Does not need a prior load.
    pub async fn clear_all(&self) -> Result<()> {
        let mut guard = self.map.lock().await;
        self.backend.set_item(PREFERENCE_KEY, "{}")?;
        *guard = Some(PreferenceMap::new());
        tracing::info!("Cleared all source preferences");
        Ok(())
    }

    async fn set(&self, name: &str, state: TriState) -> Result<()> {
        let mut guard = self.loaded().await?;
        let map = guard.get_or_insert_with(PreferenceMap::new);

        let mut next = map.clone();
        next.insert(name.to_string(), state);
        // Only commit in memory once the write went through.
        self.persist(&next)?;
        *map = next;

        tracing::info!("Saved preference {:?} for {}", state, name);
        Ok(())
    }

    async fn loaded(&self) -> Result<MutexGuard<'_, Option<PreferenceMap>>> {
        let mut guard = self.map.lock().await;
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        Ok(guard)
    }

    fn load(&self) -> Result<PreferenceMap> {
        let Some(raw) = self.backend.get_item(PREFERENCE_KEY)? else {
            return Ok(PreferenceMap::new());
        };

        let stored: Map<String, Value> = serde_json::from_str(&raw)?;
        let mut map = PreferenceMap::with_capacity(stored.len());
        for (name, value) in stored {
            match TriState::from_stored(&value) {
                Some(state) => {
                    map.insert(name, state);
                }
                None => tracing::warn!("Ignoring stored preference {} = {}", name, value),
            }
        }

        tracing::debug!("Loaded {} source preferences", map.len());
        Ok(map)
    }

    fn persist(&self, map: &PreferenceMap) -> Result<()> {
        let stored: BTreeMap<&str, u8> = map
            .iter()
            .filter_map(|(name, state)| state.stored_value().map(|v| (name.as_str(), v)))
            .collect();
        let raw = serde_json::to_string(&stored)?;
        self.backend.set_item(PREFERENCE_KEY, &raw)
    }
}
