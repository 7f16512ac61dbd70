//! Short-lived cache of signed URLs.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use svara_core::SignedUrl;

/// Entries with less validity left than this are not handed out.
pub const DEFAULT_FRESHNESS_MARGIN: Duration = Duration::from_secs(60);

/// Signed URLs keyed by object key.
#[derive(Debug)]
pub struct SignedUrlCache {
    entries: RwLock<HashMap<String, SignedUrl>>,
    margin: Duration,
}

impl Default for SignedUrlCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS_MARGIN)
    }
}

impl SignedUrlCache {
    /// Creates an empty cache with the given freshness margin.
    pub fn new(margin: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            margin,
        }
    }

    /// A cached URL for `key` that is still fresh.
    pub fn get(&self, key: &str) -> Option<SignedUrl> {
        let entries = self.entries.read().ok()?;
        entries
            .get(key)
            .filter(|url| url.is_fresh(self.margin))
            .cloned()
    }

    /// Stores a URL under its object key.
    pub fn insert(&self, url: SignedUrl) {
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, cached| cached.is_fresh(self.margin));
            entries.insert(url.key.clone(), url);
        }
    }

    /// Forgets the URL for `key`.
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
