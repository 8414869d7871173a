use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app::error::{DiaryError, Result};
use crate::config::{Config, NetworkConfig};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;
use crate::sources::RefreshPolicy;
use crate::store::{KeyValueStore, PreferenceStore, SqliteStore};

pub struct AppContext {
    pub prefs: Arc<PreferenceStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parallel_fetcher: ParallelFetcher,
    pub policy: RefreshPolicy,
    pub network: NetworkConfig,
}

impl AppContext {
    pub fn new(config: &Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };
        tracing::debug!("Using preference database {}", db_path.display());

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher = Arc::new(HttpFetcher::with_timeout(Duration::from_secs(
            config.network.timeout_secs,
        )));
        Self::with_parts(config, store, fetcher)
    }

    pub fn in_memory(config: &Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let fetcher = Arc::new(HttpFetcher::with_timeout(Duration::from_secs(
            config.network.timeout_secs,
        )));
        Self::with_parts(config, store, fetcher)
    }

    /// Wire a context around an existing store and fetcher.
    pub fn with_parts(
        config: &Config,
        store: Arc<dyn KeyValueStore + Send + Sync>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Result<Self> {
        let policy = config
            .refresh
            .policy()
            .map_err(|e| DiaryError::Config(e.to_string()))?;
        let parallel_fetcher =
            ParallelFetcher::with_workers(fetcher.clone(), config.network.workers);

        Ok(Self {
            prefs: Arc::new(PreferenceStore::new(store)),
            fetcher,
            parallel_fetcher,
            policy,
            network: config.network.clone(),
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| DiaryError::Config("Could not find data directory".into()))?;
        let diary_dir = data_dir.join("goa-diary");
        std::fs::create_dir_all(&diary_dir)?;
        Ok(diary_dir.join("preferences.db"))
    }
}
