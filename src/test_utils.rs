//! Shared fakes for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{DiaryError, Result};
use crate::fetcher::Fetcher;

enum Reply {
    Body(Vec<u8>),
    Fail(String),
}

/// Answers requests whose URL contains a registered pattern, first match wins.
#[derive(Default)]
pub struct StubFetcher {
    routes: Vec<(String, Reply)>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, pattern: &str, body: &str) -> Self {
        self.routes
            .push((pattern.to_string(), Reply::Body(body.as_bytes().to_vec())));
        self
    }

    pub fn with_failure(mut self, pattern: &str, message: &str) -> Self {
        self.routes
            .push((pattern.to_string(), Reply::Fail(message.to_string())));
        self
    }

    /// Every URL fetched so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requested.lock().unwrap().push(url.to_string());
        match self.routes.iter().find(|(pattern, _)| url.contains(pattern.as_str())) {
            Some((_, Reply::Body(body))) => Ok(body.clone()),
            Some((_, Reply::Fail(message))) => Err(DiaryError::Other(message.clone())),
            None => Err(DiaryError::Other(format!("no route for {url}"))),
        }
    }
}
