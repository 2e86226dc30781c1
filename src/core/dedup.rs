// src/core/dedup.rs
//! Short-lived cache that lets identical concurrent GET requests share one call

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::error::ApiError;

/// Raw response kept for every waiter of a shared request
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub type SharedRequest = Shared<BoxFuture<'static, Result<RawResponse, ApiError>>>;

struct PendingEntry {
    request: SharedRequest,
    created_at: Instant,
}

/// Builds the cache key for a request
pub fn request_key(method: &str, url: &str, params: Option<&serde_json::Value>) -> String {
    let params = params
        .map(|p| p.to_string())
        .unwrap_or_else(|| "{}".to_string());
    format!("{}:{}:{}", method.to_lowercase(), url, params)
}

pub struct PendingRequests {
    window: Duration,
    entries: Mutex<HashMap<String, PendingEntry>>,
}

impl PendingRequests {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of live entries (expired ones are not counted)
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|entry| now.duration_since(entry.created_at) < self.window)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `request` unless an identical one is already in flight within the
    /// window, in which case wait for that one's outcome instead.
    pub async fn run<F>(&self, key: String, request: F) -> Result<RawResponse, ApiError>
    where
        F: Future<Output = Result<RawResponse, ApiError>> + Send + 'static,
    {
        let shared = {
            let mut entries = self.lock();
            let now = Instant::now();

            match entries.get(&key) {
                Some(entry) if now.duration_since(entry.created_at) < self.window => {
                    debug!("Deduplicating request: {}", key);
                    entry.request.clone()
                }
                _ => {
                    entries.retain(|_, entry| now.duration_since(entry.created_at) < self.window);

                    let shared = request.boxed().shared();
                    entries.insert(
                        key.clone(),
                        PendingEntry {
                            request: shared.clone(),
                            created_at: now,
                        },
                    );
                    shared
                }
            }
        };

        let outcome = shared.clone().await;
        self.settle(&key, &shared);
        outcome
    }

    fn settle(&self, key: &str, shared: &SharedRequest) {
        let mut entries = self.lock();
        if entries
            .get(key)
            .map_or(false, |entry| entry.request.ptr_eq(shared))
        {
            entries.remove(key);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingEntry>> {
        // a poisoned map only ever loses cache entries
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
