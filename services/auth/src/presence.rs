//! In-memory presence set
//!
//! Tracks which users this auth process considers logged in. The set backs
//! the single-active-session check and the admin "current users" listing;
//! it is process-local and intentionally not shared across replicas.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mutex-guarded set of logged-in user ids
///
/// The lock is held only for the map mutation, never across an RPC.
#[derive(Clone, Default)]
pub struct PresenceSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl PresenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user as logged in
    pub async fn mark(&self, user_id: &str) {
        self.inner.lock().await.insert(user_id.to_string());
    }

    /// Remove a user, returning whether they were present
    pub async fn remove(&self, user_id: &str) -> bool {
        self.inner.lock().await.remove(user_id)
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.inner.lock().await.contains(user_id)
    }

    /// Copy the ids out under the lock, sorted for stable pagination
    pub async fn snapshot(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.lock().await.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mark_contains_remove() {
        let set = PresenceSet::new();
        set.mark("u1").await;
        assert!(set.contains("u1").await);
        assert!(set.remove("u1").await);
        assert!(!set.contains("u1").await);
        assert!(!set.remove("u1").await);
    }

    #[tokio::test]
    async fn snapshot_is_sorted_and_detached() {
        let set = PresenceSet::new();
        set.mark("b").await;
        set.mark("a").await;
        set.mark("c").await;

        let snap = set.snapshot().await;
        assert_eq!(snap, vec!["a", "b", "c"]);

        // mutating after the snapshot does not affect it
        set.clear().await;
        assert_eq!(snap.len(), 3);
        assert!(set.snapshot().await.is_empty());
    }
}
