use std::sync::Arc;

use tokio::sync::watch;

use crate::models::Identity;

/// Observable current identity. Clones share the same underlying value.
#[derive(Clone)]
pub struct Session {
    tx: Arc<watch::Sender<Option<Identity>>>,
}

impl Session {
    pub fn anonymous() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn signed_in(identity: Identity) -> Self {
        let session = Self::anonymous();
        session.sign_in(identity);
        session
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn sign_in(&self, identity: Identity) {
        tracing::debug!(user = %identity.id, role = %identity.role, "signed in");
        self.tx.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.tx.send_replace(None) {
            tracing::debug!(user = %previous.id, "signed out");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}
