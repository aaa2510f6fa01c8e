use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::models::{ShortEntry, ShortId};

/// In-memory mapping between sequential ids and the URLs they shorten.
///
/// Both directions are indexed: `urls[id - 1]` resolves an id, and `ids`
/// answers "has this exact string been registered already?" without a scan.
/// A single lock guards both so that the existence check and the insert in
/// [`LinkStore::register_or_get`] happen as one step.
///
/// Created empty at startup and never persisted. Entries are never removed.
#[derive(Debug, Default)]
pub struct LinkStore {
    inner: RwLock<Registry>,
}

#[derive(Debug, Default)]
struct Registry {
    urls: Vec<String>,
    ids: HashMap<String, ShortId>,
}

impl LinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `url`, registering it under the next id if this
    /// exact string has not been seen before.
    pub async fn register_or_get(&self, url: String) -> ShortEntry {
        let mut registry = self.inner.write().await;

        if let Some(&id) = registry.ids.get(&url) {
            return ShortEntry { id, url };
        }

        let id = ShortId::from_index(registry.urls.len());
        registry.urls.push(url.clone());
        registry.ids.insert(url.clone(), id);

        tracing::debug!(%id, %url, "registered new short url");
        ShortEntry { id, url }
    }

    /// Look up the URL stored under `id`.
    pub async fn resolve(&self, id: ShortId) -> Option<String> {
        let registry = self.inner.read().await;
        id.index()
            .and_then(|index| registry.urls.get(index))
            .cloned()
    }

    /// Id that the next distinct URL will receive.
    #[allow(dead_code)]
    pub async fn next_id(&self) -> ShortId {
        ShortId::from_index(self.inner.read().await.urls.len())
    }

    /// Number of distinct URLs registered.
    pub async fn len(&self) -> usize {
        self.inner.read().await.urls.len()
    }

    #[allow(dead_code)]
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
