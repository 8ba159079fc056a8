//! In-process cache for raw quote payloads.
//!
//! Keyed by the venue-qualified lookup key. Funds routinely share their top
//! holdings, so estimating several funds in one run would otherwise hit the
//! upstream repeatedly for the same stock. Entries live for the process
//! lifetime; nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::quote::RawQuote;

#[derive(Clone, Default)]
pub struct QuoteCache {
    inner: Arc<Mutex<HashMap<String, RawQuote>>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, lookup_key: &str) -> Option<RawQuote> {
        let cache = self.inner.lock().await;
        let entry = cache.get(lookup_key).cloned();
        if entry.is_some() {
            debug!(%lookup_key, "Quote cache HIT");
        } else {
            debug!(%lookup_key, "Quote cache MISS");
        }
        entry
    }

    pub async fn put(&self, lookup_key: String, raw: RawQuote) {
        let mut cache = self.inner.lock().await;
        debug!(%lookup_key, "Quote cache PUT");
        cache.insert(lookup_key, raw);
    }
}
