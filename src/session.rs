//! Current-owner session
//!
//! The crawl core only asks "is there a current owner id" when it saves
//! history. Anything that must react to sign-in/sign-out (a history view that
//! reloads, for instance) subscribes to the session explicitly.

use tokio::sync::watch;

/// Holds the current owner id, if any, and notifies subscribers on change
#[derive(Debug)]
pub struct Session {
    owner: watch::Sender<Option<String>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a signed-out session
    pub fn new() -> Self {
        let (owner, _) = watch::channel(None);
        Self { owner }
    }

    /// Creates a session already signed in as `owner_id`
    pub fn signed_in(owner_id: impl Into<String>) -> Self {
        let session = Self::new();
        session.sign_in(owner_id);
        session
    }

    /// Builds a session from an optional configured owner
    pub fn from_owner(owner_id: Option<&str>) -> Self {
        match owner_id {
            Some(owner_id) => Self::signed_in(owner_id),
            None => Self::new(),
        }
    }

    pub fn current_owner(&self) -> Option<String> {
        self.owner.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.owner.borrow().is_some()
    }

    /// Switches to `owner_id`; subscribers are notified only if it changed
    ///
    /// Blank ids are treated as signing out.
    pub fn sign_in(&self, owner_id: impl Into<String>) {
        let owner_id = owner_id.into();
        let next = if owner_id.trim().is_empty() {
            None
        } else {
            Some(owner_id)
        };
        self.set_owner(next);
    }

    pub fn sign_out(&self) {
        self.set_owner(None);
    }

    /// Receives every owner change from now on
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.owner.subscribe()
    }

    fn set_owner(&self, next: Option<String>) {
        let changed = self.owner.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });

        if changed {
            match &next {
                Some(owner_id) => tracing::debug!("Session signed in as {}", owner_id),
                None => tracing::debug!("Session signed out"),
            }
        }
    }
}
