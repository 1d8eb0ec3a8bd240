use std::collections::HashMap;
use std::sync::Arc;

use super::traits::{StatsFetcher, TokenRenewer};
use super::Platform;

/// Registry of platform fetchers, keyed by platform, plus the token renewers.
#[derive(Default)]
pub struct FetcherRegistry {
    fetchers: HashMap<Platform, Arc<dyn StatsFetcher>>,
    renewers: Vec<Arc<dyn TokenRenewer>>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fetcher, replacing any previous one for the same platform.
    pub fn register(&mut self, fetcher: Arc<dyn StatsFetcher>) {
        self.fetchers.insert(fetcher.platform(), fetcher);
    }

    pub fn register_renewer(&mut self, renewer: Arc<dyn TokenRenewer>) {
        self.renewers.push(renewer);
    }

    pub fn get(&self, platform: Platform) -> Option<&dyn StatsFetcher> {
        self.fetchers.get(&platform).map(|f| f.as_ref())
    }

    pub fn renewers(&self) -> &[Arc<dyn TokenRenewer>] {
        &self.renewers
    }

    /// Registered platforms, in `Platform::ALL` order.
    pub fn list(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.fetchers.contains_key(p))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.fetchers.len()
    }
}
