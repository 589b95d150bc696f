//! Process-wide browser session registry.
//!
//! One mutual-exclusion domain guards the session map and the current
//! pointer together: every dispatcher operation locks the registry, reads
//! the current handle, and performs its single engine operation before
//! releasing the guard.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use engine::BrowserHandle;
use proto::{AutomationError, BrowserKind};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// The registry state: session map plus the single current pointer.
///
/// Invariant: `current`, when set, is always a key of `sessions`.
pub struct Sessions<H> {
    sessions: HashMap<String, H>,
    current: Option<String>,
}

impl<H> Sessions<H> {
    fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            current: None,
        }
    }

    /// Registers a handle under a fresh id and makes it current.
    pub fn insert(&mut self, kind: BrowserKind, handle: H) -> String {
        let id = self.generate_id(kind);
        self.sessions.insert(id.clone(), handle);
        self.set_current(Some(id.clone()));
        debug!("registered browser session {id}");
        id
    }

    /// Returns the current session handle.
    pub fn current(&self) -> Result<&H, AutomationError> {
        let id = self
            .current
            .as_deref()
            .ok_or(AutomationError::NoActiveSession)?;
        // The insert/remove paths keep the pointer valid; a stale id still
        // must read as "no session" rather than panic.
        self.sessions.get(id).ok_or(AutomationError::NoActiveSession)
    }

    /// Returns the current session id, if any.
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Points the registry at a different (or no) session.
    pub fn set_current(&mut self, id: Option<String>) {
        self.current = id;
    }

    /// Removes the current session, returning its id and handle.
    pub fn remove_current(&mut self) -> Result<(String, H), AutomationError> {
        let id = self
            .current
            .clone()
            .ok_or(AutomationError::NoActiveSession)?;
        let handle = self
            .sessions
            .remove(&id)
            .ok_or(AutomationError::NoActiveSession)?;
        self.current = None;
        debug!("removed browser session {id}");
        Ok((id, handle))
    }

    /// Removes a session by id. Clears the current pointer only when it
    /// referred to the removed session.
    pub fn remove(&mut self, id: &str) -> Option<H> {
        let handle = self.sessions.remove(id)?;
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        Some(handle)
    }

    /// Empties the registry, returning every session for teardown.
    pub fn drain(&mut self) -> Vec<(String, H)> {
        self.current = None;
        self.sessions.drain().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Builds `{kind}_{millis}` ids. Wall-clock ids can collide under rapid
    /// creation, so the millisecond value is bumped until the id is unique
    /// among registered sessions.
    fn generate_id(&self, kind: BrowserKind) -> String {
        let mut millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let mut id = format!("{kind}_{millis}");
        while self.sessions.contains_key(&id) {
            millis += 1;
            id = format!("{kind}_{millis}");
        }
        id
    }
}

/// Async wrapper putting [`Sessions`] behind a single mutex.
pub struct SessionRegistry<H> {
    inner: Mutex<Sessions<H>>,
}

impl<H> SessionRegistry<H> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Sessions::new()),
        }
    }

    /// Locks the registry for one dispatcher operation.
    pub async fn lock(&self) -> MutexGuard<'_, Sessions<H>> {
        self.inner.lock().await
    }
}

impl<H: BrowserHandle> SessionRegistry<H> {
    /// Cleanup sweep: quits every registered session, logging (not raising)
    /// per-session failures, and always ends with an empty registry and no
    /// current pointer. Returns the number of sessions swept.
    pub async fn clear(&self) -> usize {
        let drained = {
            let mut guard = self.inner.lock().await;
            guard.drain()
        };
        let count = drained.len();
        for (id, mut handle) in drained {
            if let Err(e) = handle.quit().await {
                warn!("Error closing browser session {id}: {e}");
            }
        }
        count
    }
}

impl<H> Default for SessionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBrowser;

    fn browser() -> MockBrowser {
        MockBrowser::plain(BrowserKind::Chrome)
    }

    #[test]
    fn insert_sets_current_and_shapes_the_id() {
        let mut sessions = Sessions::new();
        let id = sessions.insert(BrowserKind::Chrome, browser());
        assert!(id.starts_with("chrome_"));
        assert!(id["chrome_".len()..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(sessions.current_id(), Some(id.as_str()));
        assert!(sessions.current().is_ok());
    }

    #[test]
    fn ids_stay_unique_under_rapid_insertion() {
        let mut sessions = Sessions::new();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..50 {
            assert!(ids.insert(sessions.insert(BrowserKind::Firefox, browser())));
        }
        assert_eq!(sessions.len(), 50);
    }

    #[test]
    fn current_pointer_always_refers_to_a_registered_session() {
        let mut sessions = Sessions::new();
        let first = sessions.insert(BrowserKind::Chrome, browser());
        let second = sessions.insert(BrowserKind::Firefox, browser());

        // Removing a non-current session leaves the pointer alone.
        assert!(sessions.remove(&first).is_some());
        assert_eq!(sessions.current_id(), Some(second.as_str()));

        // Removing the current session clears the pointer.
        assert!(sessions.remove(&second).is_some());
        assert_eq!(sessions.current_id(), None);
        assert!(matches!(
            sessions.current(),
            Err(AutomationError::NoActiveSession)
        ));
    }

    #[test]
    fn remove_current_twice_fails_the_second_time() {
        let mut sessions = Sessions::new();
        sessions.insert(BrowserKind::Chrome, browser());
        assert!(sessions.remove_current().is_ok());
        assert!(matches!(
            sessions.remove_current(),
            Err(AutomationError::NoActiveSession)
        ));
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn clear_sweeps_everything_despite_quit_failures() {
        let registry = SessionRegistry::new();
        {
            let mut guard = registry.lock().await;
            guard.insert(BrowserKind::Chrome, browser());
            guard.insert(
                BrowserKind::Firefox,
                MockBrowser::failing_quit(BrowserKind::Firefox),
            );
        }

        let swept = registry.clear().await;
        assert_eq!(swept, 2);

        let guard = registry.lock().await;
        assert!(guard.is_empty());
        assert_eq!(guard.current_id(), None);
    }
}
