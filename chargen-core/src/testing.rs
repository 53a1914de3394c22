//! Testing utilities for the choice engine.
//!
//! `MockClient` implements [`ChoiceClient`] with scripted responses:
//! - Queued per-endpoint option lists and injectable fetch failures
//! - Recorded commits and injectable commit failures
//! - A fetch counter and optional latency for concurrency tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tomekeeper::{ChoiceClient, Error, RawOption};

/// A scripted client for deterministic tests without network calls.
#[derive(Default)]
pub struct MockClient {
    /// Endpoint -> options to return.
    fetch_responses: Mutex<HashMap<String, Vec<RawOption>>>,
    /// Endpoints whose fetch fails with a network error.
    failing_endpoints: Mutex<HashSet<String>>,
    /// Artificial latency before a fetch resolves.
    fetch_delay: Option<Duration>,
    /// Total fetches issued.
    fetch_count: AtomicUsize,
    /// Recorded commits, in call order.
    commits: Mutex<Vec<(String, Vec<String>)>>,
    /// Choice ids whose commit fails.
    failing_commits: Mutex<HashSet<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add latency to every fetch, so a second caller can overlap the
    /// first in concurrency tests.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Script the options returned for an endpoint.
    pub fn queue_options(&self, endpoint: &str, options: Vec<RawOption>) {
        self.fetch_responses
            .lock()
            .expect("lock poisoned")
            .insert(endpoint.to_string(), options);
    }

    /// Make fetches for an endpoint fail.
    pub fn fail_endpoint(&self, endpoint: &str) {
        self.failing_endpoints
            .lock()
            .expect("lock poisoned")
            .insert(endpoint.to_string());
    }

    /// Stop failing an endpoint, so the next fetch succeeds.
    pub fn restore_endpoint(&self, endpoint: &str) {
        self.failing_endpoints
            .lock()
            .expect("lock poisoned")
            .remove(endpoint);
    }

    /// Make commits for a choice id fail.
    pub fn fail_commit(&self, choice_id: &str) {
        self.failing_commits
            .lock()
            .expect("lock poisoned")
            .insert(choice_id.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Commits recorded so far.
    pub fn commits(&self) -> Vec<(String, Vec<String>)> {
        self.commits.lock().expect("lock poisoned").clone()
    }

    /// Build a flat raw option record.
    pub fn flat_option(id: &str, name: &str) -> RawOption {
        RawOption {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            ..RawOption::default()
        }
    }
}

#[async_trait]
impl ChoiceClient for MockClient {
    async fn fetch_options(&self, endpoint: &str) -> Result<Vec<RawOption>, Error> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        if self
            .failing_endpoints
            .lock()
            .expect("lock poisoned")
            .contains(endpoint)
        {
            return Err(Error::Network("scripted failure".to_string()));
        }
        self.fetch_responses
            .lock()
            .expect("lock poisoned")
            .get(endpoint)
            .cloned()
            .ok_or_else(|| Error::Api {
                status: 404,
                message: format!("no scripted options for {endpoint}"),
            })
    }

    async fn commit_choice(&self, choice_id: &str, selected: &[String]) -> Result<(), Error> {
        if self
            .failing_commits
            .lock()
            .expect("lock poisoned")
            .contains(choice_id)
        {
            return Err(Error::Api {
                status: 400,
                message: "scripted commit failure".to_string(),
            });
        }
        self.commits
            .lock()
            .expect("lock poisoned")
            .push((choice_id.to_string(), selected.to_vec()));
        Ok(())
    }
}
