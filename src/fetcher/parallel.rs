use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::Result;
use crate::domain::HeadlinePage;
use crate::fetcher::Fetcher;
use crate::sources::{fetch_page, FetchRequest};

pub const DEFAULT_WORKERS: usize = 4;

/// Runs a batch of source requests with bounded concurrency.
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Results come back in request order.
    pub async fn fetch_all(
        &self,
        requests: Vec<FetchRequest>,
    ) -> Vec<(FetchRequest, Result<HeadlinePage>)> {
        let mut handles = Vec::new();

        for request in requests {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("Semaphore closed");

                let result = fetch_page(fetcher.as_ref(), &request).await;
                (request, result)
            });

            handles.push(handle);
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        results
    }
}
