use crate::app::Result;
use crate::domain::{Catalog, OrderedSource};
use crate::fetcher::Fetcher;
use crate::sources::order::order_with_store;
use crate::store::PreferenceStore;

/// The full catalog, ordered for display, plus load status.
///
/// Like [`SourceRefresh`](crate::sources::SourceRefresh), loads are split into
/// `begin`/`finish` so a UI can run the fetch elsewhere; [`SourceList::load`]
/// does both in place.
pub struct SourceList {
    catalog_url: String,
    sources: Option<Vec<OrderedSource>>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl SourceList {
    pub fn new(catalog_url: impl Into<String>) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            sources: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    pub fn sources(&self) -> &[OrderedSource] {
        self.sources.as_deref().unwrap_or(&[])
    }

    pub fn is_loaded(&self) -> bool {
        self.sources.is_some()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Identifies the most recent load. Bumped by every [`SourceList::begin`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Retry is offered only after a failed load.
    pub fn can_retry(&self) -> bool {
        self.error.is_some()
    }

    /// Drop the current list and mark a load in progress.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.sources = None;
        self.loading = true;
        self.error = None;
        self.generation
    }

    /// Apply the result of load `generation`; superseded loads are ignored.
    pub fn finish(&mut self, generation: u64, result: Result<Vec<OrderedSource>>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        match result {
            Ok(sources) => {
                tracing::info!("Loaded {} sources", sources.len());
                self.sources = Some(sources);
            }
            Err(e) => {
                tracing::warn!("Loading catalog failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    pub async fn load(&mut self, fetcher: &(dyn Fetcher + Send + Sync), prefs: &PreferenceStore) {
        let generation = self.begin();
        let result = fetch_catalog(fetcher, &self.catalog_url, prefs).await;
        self.finish(generation, result);
    }

    /// Reload after a failure. Does nothing when the last load succeeded.
    pub async fn retry(
        &mut self,
        fetcher: &(dyn Fetcher + Send + Sync),
        prefs: &PreferenceStore,
    ) -> bool {
        if !self.can_retry() {
            return false;
        }
        self.load(fetcher, prefs).await;
        true
    }

    /// Forget every stored choice and reload so catalog defaults apply again.
    pub async fn clear_selections(
        &mut self,
        fetcher: &(dyn Fetcher + Send + Sync),
        prefs: &PreferenceStore,
    ) -> Result<()> {
        prefs.clear_all().await?;
        self.load(fetcher, prefs).await;
        Ok(())
    }
}

/// Fetch the catalog and order it against the stored choices.
pub async fn fetch_catalog(
    fetcher: &(dyn Fetcher + Send + Sync),
    catalog_url: &str,
    prefs: &PreferenceStore,
) -> Result<Vec<OrderedSource>> {
    let body = fetcher.fetch(catalog_url).await?;
    let catalog = Catalog::from_json(&body)?;
    order_with_store(catalog.sources, prefs).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::app::DiaryError;
    use crate::store::SqliteStore;
    use crate::test_utils::StubFetcher;

    const CATALOG_URL: &str = "http://www.omgoa.com/scripts/newsSources.py";
    const CATALOG: &str = r#"{"dynamic_sections": [
        {"name": "A", "href": "http://a.example/?limit=10&offset=0", "isEnabledByDefault": false},
        {"name": "B", "href": "http://b.example/?limit=10&offset=0", "isEnabledByDefault": true}
    ]}"#;

    fn prefs() -> PreferenceStore {
        PreferenceStore::new(Arc::new(SqliteStore::in_memory().unwrap()))
    }

    fn names(list: &SourceList) -> Vec<(&str, bool)> {
        list.sources().iter().map(|s| (s.name(), s.enabled)).collect()
    }

    #[tokio::test]
    async fn test_load_orders_catalog() {
        let fetcher = StubFetcher::new().with_body("newsSources", CATALOG);
        let mut list = SourceList::new(CATALOG_URL);
        list.load(&fetcher, &prefs()).await;

        assert!(!list.loading());
        assert!(list.error().is_none());
        assert_eq!(names(&list), vec![("B", true), ("A", false)]);
        assert_eq!(fetcher.requested(), vec![CATALOG_URL]);
    }

    #[tokio::test]
    async fn test_failure_offers_retry() {
        let fetcher = StubFetcher::new().with_failure("newsSources", "Network request failed");
        let mut list = SourceList::new(CATALOG_URL);
        let prefs = prefs();
        list.load(&fetcher, &prefs).await;

        assert!(!list.loading());
        assert!(!list.is_loaded());
        assert_eq!(list.error(), Some("Network request failed"));
        assert!(list.can_retry());

        assert!(list.retry(&fetcher, &prefs).await);
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_without_error_is_noop() {
        let fetcher = StubFetcher::new().with_body("newsSources", CATALOG);
        let mut list = SourceList::new(CATALOG_URL);
        let prefs = prefs();
        list.load(&fetcher, &prefs).await;
        assert!(!list.retry(&fetcher, &prefs).await);
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_catalog_is_an_error() {
        let fetcher = StubFetcher::new().with_body("newsSources", "<html>");
        let mut list = SourceList::new(CATALOG_URL);
        list.load(&fetcher, &prefs()).await;
        assert!(list.error().is_some());
    }

    #[tokio::test]
    async fn test_clear_selections_restores_defaults() {
        let fetcher = StubFetcher::new().with_body("newsSources", CATALOG);
        let prefs = prefs();
        prefs.set_enabled("A").await.unwrap();
        prefs.set_disabled("B").await.unwrap();

        let mut list = SourceList::new(CATALOG_URL);
        list.load(&fetcher, &prefs).await;
        assert_eq!(names(&list), vec![("A", true), ("B", false)]);

        list.clear_selections(&fetcher, &prefs).await.unwrap();
        assert_eq!(names(&list), vec![("B", true), ("A", false)]);
    }

    #[test]
    fn test_superseded_load_is_ignored() {
        let mut list = SourceList::new(CATALOG_URL);
        let first = list.begin();
        let second = list.begin();
        assert!(!list.finish(first, Err(DiaryError::Other("late".into()))));
        assert!(list.loading());
        assert!(list.finish(second, Ok(Vec::new())));
        assert!(list.is_loaded());
        assert!(list.error().is_none());
    }
}
