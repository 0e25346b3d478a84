//! Bounded FIFO window of signing credentials.
//!
//! Windows are immutable snapshots. Registration copies the window, which is
//! O(limit) per call; lookups, appends and evictions on a snapshot are O(1).
//! Limits are expected to stay small (tens of credentials).

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::types::Credentials;

/// Ordered ids (oldest first) plus an id index, kept in lockstep.
///
/// Every id in `order` has exactly one entry in `entries` and vice versa.
#[derive(Debug, Clone)]
pub(crate) struct RotationWindow {
    order: VecDeque<String>,
    entries: HashMap<String, Arc<Credentials>>,
    limit: NonZeroUsize,
}

impl RotationWindow {
    pub(crate) fn new(limit: NonZeroUsize) -> Self {
        Self {
            order: VecDeque::with_capacity(limit.get()),
            entries: HashMap::with_capacity(limit.get()),
            limit,
        }
    }

    /// Successor window with `credentials` at the tail, and the evicted head if any.
    ///
    /// A credential whose id is already present replaces the old entry and
    /// moves to the tail instead of occupying a second slot.
    pub(crate) fn with_registered(
        &self,
        credentials: Arc<Credentials>,
    ) -> (Self, Option<Arc<Credentials>>) {
        let mut next = self.clone();
        let id = credentials.id().to_string();

        if next.entries.remove(&id).is_some() {
            next.order.retain(|existing| existing != &id);
        }
        next.order.push_back(id.clone());
        next.entries.insert(id, credentials);

        let evicted = if next.order.len() > next.limit.get() {
            next.order
                .pop_front()
                .and_then(|oldest| next.entries.remove(&oldest))
        } else {
            None
        };

        (next, evicted)
    }

    /// Most recently registered credential
    pub(crate) fn active(&self) -> Option<&Arc<Credentials>> {
        self.order.back().and_then(|id| self.entries.get(id))
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Arc<Credentials>> {
        self.entries.get(id)
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn limit(&self) -> NonZeroUsize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Algorithm;

    fn creds(id: &str) -> Arc<Credentials> {
        Arc::new(Credentials::with_id(id, Algorithm::ES256, "private", "public"))
    }

    fn limit(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn evicts_oldest_once_full() {
        let window = RotationWindow::new(limit(2));
        let (window, gone) = window.with_registered(creds("a"));
        assert!(gone.is_none());
        let (window, gone) = window.with_registered(creds("b"));
        assert!(gone.is_none());
        let (window, gone) = window.with_registered(creds("c"));

        assert_eq!(gone.map(|c| c.id().to_string()), Some("a".to_string()));
        assert_eq!(window.ids().collect::<Vec<_>>(), vec!["b", "c"]);
        assert!(window.get("a").is_none());
        assert_eq!(window.active().map(|c| c.id()), Some("c"));
    }

    #[test]
    fn reads_do_not_reorder() {
        let window = RotationWindow::new(limit(2));
        let (window, _) = window.with_registered(creds("a"));
        let (window, _) = window.with_registered(creds("b"));
        assert!(window.get("a").is_some());
        let (window, gone) = window.with_registered(creds("c"));
        assert_eq!(gone.map(|c| c.id().to_string()), Some("a".to_string()));
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn reregistering_moves_to_tail_without_duplicates() {
        let window = RotationWindow::new(limit(3));
        let (window, _) = window.with_registered(creds("a"));
        let (window, _) = window.with_registered(creds("b"));
        let (window, gone) = window.with_registered(creds("a"));

        assert!(gone.is_none());
        assert_eq!(window.ids().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(window.active().map(|c| c.id()), Some("a"));
    }

    #[test]
    fn previous_snapshot_is_untouched() {
        let first = RotationWindow::new(limit(1));
        let (second, _) = first.with_registered(creds("a"));
        let (third, _) = second.with_registered(creds("b"));

        assert_eq!(first.len(), 0);
        assert_eq!(second.active().map(|c| c.id()), Some("a"));
        assert_eq!(third.active().map(|c| c.id()), Some("b"));
        assert_eq!(third.limit().get(), 1);
    }
}
