//! Credential store with lock-free reads and atomic rotation.
//!
//! The rotation window is published as an immutable snapshot behind an
//! [`ArcSwap`]. Readers load one snapshot, so "active credential" and
//! "credential by id" always observe a consistent window. Registration builds
//! the successor window and swaps it in with a read-copy-update loop, which
//! serialises concurrent registrations.

use arc_swap::ArcSwap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::{config::DEFAULT_CREDENTIALS_LIMIT, rotation::RotationWindow, types::Credentials};

/// Thread-safe, bounded store of signing credentials.
///
/// Tokens are signed with the most recently registered credential and verified
/// with whichever resident credential signed them. Once more than `limit`
/// credentials have been registered, the oldest is evicted and tokens it
/// signed stop verifying.
///
/// # Example
///
/// ```no_run
/// use keyroll_jwt::{Algorithm, CredentialStore, generate_credentials};
///
/// let store = CredentialStore::new(3);
/// let credentials = generate_credentials(Algorithm::ES256, None)?;
/// let id = credentials.id().to_string();
/// store.register(credentials);
///
/// assert_eq!(store.active().map(|c| c.id().to_string()), Some(id.clone()));
/// assert!(store.resolve(&id).is_some());
/// # Ok::<(), keyroll_jwt::CredentialsError>(())
/// ```
pub struct CredentialStore {
    window: ArcSwap<RotationWindow>,
}

impl CredentialStore {
    /// Create an empty store keeping at most `limit` credentials.
    ///
    /// A zero limit falls back to the default of 10.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = NonZeroUsize::new(limit).unwrap_or(DEFAULT_CREDENTIALS_LIMIT);
        Self::with_limit(limit)
    }

    /// Create an empty store keeping at most `limit` credentials
    #[must_use]
    pub fn with_limit(limit: NonZeroUsize) -> Self {
        Self {
            window: ArcSwap::from_pointee(RotationWindow::new(limit)),
        }
    }

    /// Register a credential as the new active signer.
    ///
    /// Never fails. Returns the id of the credential evicted to make room, if
    /// any; tokens signed by that credential no longer verify.
    pub fn register(&self, credentials: Credentials) -> Option<String> {
        let credentials = Arc::new(credentials);
        let mut evicted = None;

        self.window.rcu(|current| {
            let (next, gone) = current.with_registered(Arc::clone(&credentials));
            evicted = gone;
            Arc::new(next)
        });

        tracing::debug!(
            credentials_id = credentials.id(),
            algorithm = %credentials.algorithm(),
            "registered signing credentials"
        );

        evicted.map(|gone| {
            tracing::debug!(
                credentials_id = gone.id(),
                "evicted signing credentials from rotation window"
            );
            gone.id().to_string()
        })
    }

    /// Most recently registered credential, or `None` when the store is empty
    #[must_use]
    pub fn active(&self) -> Option<Arc<Credentials>> {
        self.window.load().active().cloned()
    }

    /// Credential with the given id, or `None` if evicted or never registered
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<Arc<Credentials>> {
        self.window.load().get(id).cloned()
    }

    /// Resident credential ids, oldest first
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.window.load().ids().map(str::to_string).collect()
    }

    /// Number of resident credentials
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.load().len()
    }

    /// Whether no credential has been registered yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident credentials
    #[must_use]
    pub fn limit(&self) -> usize {
        self.window.load().limit().get()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::with_limit(DEFAULT_CREDENTIALS_LIMIT)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("ids", &self.ids())
            .field("limit", &self.limit())
            .finish()
    }
}
