//! Publishing parsed policies to concurrent readers
//!
//! A [`SharedPolicy`] holds the current [`PolicyDocument`] behind an `Arc`.
//! Readers take a snapshot and query it without further locking; a refresh
//! parses a complete new document and swaps it in, so readers never observe
//! a partially built policy.

use crate::robots::PolicyDocument;
use chrono::{Duration, Utc};
use std::sync::{Arc, RwLock};

/// The currently published policy for one site
#[derive(Debug, Default)]
pub struct SharedPolicy {
    current: RwLock<Arc<PolicyDocument>>,
}

impl SharedPolicy {
    /// Creates a holder publishing `document`
    pub fn new(document: PolicyDocument) -> Self {
        Self {
            current: RwLock::new(Arc::new(document)),
        }
    }

    /// Returns the published document
    ///
    /// The snapshot stays valid (and unchanged) after later replacements.
    pub fn snapshot(&self) -> Arc<PolicyDocument> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Publishes `document`, returning the one it replaced
    pub fn replace(&self, document: PolicyDocument) -> Arc<PolicyDocument> {
        let next = Arc::new(document);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());

        if guard.fingerprint().is_some() && guard.fingerprint() == next.fingerprint() {
            tracing::debug!("Publishing robots.txt policy with unchanged content");
        } else {
            tracing::info!(
                "Publishing robots.txt policy ({} groups, default group: {})",
                next.entries().len(),
                next.default_entry().is_some()
            );
        }

        std::mem::replace(&mut *guard, next)
    }

    /// Time since the published document was parsed
    ///
    /// # Returns
    ///
    /// * `Some(Duration)` - Age of the published document
    /// * `None` - The published document was never loaded
    pub fn age(&self) -> Option<Duration> {
        self.snapshot()
            .last_fetched_at()
            .map(|fetched_at| Utc::now() - fetched_at)
    }
}
