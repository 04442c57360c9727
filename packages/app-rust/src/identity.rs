//! The ambient "who is signed in" signal consulted by the auth handler.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use fleetline_core::Principal;

/// Source of the current user, if any.
pub trait IdentitySource: Send + Sync {
    fn current(&self) -> Option<Arc<Principal>>;
}

/// Session-scoped identity that can be swapped while runs are in flight.
///
/// Readers never block: each run sees either the old or the new principal.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    current: ArcSwapOption<Principal>,
}

impl SessionIdentity {
    /// A session with nobody signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(principal: Principal) -> Self {
        let session = Self::anonymous();
        session.sign_in(principal);
        session
    }

    pub fn sign_in(&self, principal: Principal) {
        tracing::info!(user = %principal.id, "signed in");
        self.current.store(Some(Arc::new(principal)));
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.current.swap(None) {
            tracing::info!(user = %previous.id, "signed out");
        }
    }
}

impl IdentitySource for SessionIdentity {
    fn current(&self) -> Option<Arc<Principal>> {
        self.current.load_full()
    }
}
