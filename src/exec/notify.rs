// src/exec/notify.rs

//! Quit notifications and their observers.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Raised exactly once when a continuous instance terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuitNotification {
    /// `true` when the supervisor itself ended the process; `false` means the
    /// process exited on its own, i.e. it crashed.
    pub manual_kill: bool,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal or the code is unknown.
    pub exit_code: Option<i32>,
}

impl QuitNotification {
    pub fn is_crash(&self) -> bool {
        !self.manual_kill
    }
}

/// Observer callback. Called from whatever task detected the termination;
/// marshaling onto another execution context is the observer's business.
pub type QuitCallback = Arc<dyn Fn(&QuitNotification) + Send + Sync>;

/// Handle returned by [`QuitObservers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registry of quit observers.
#[derive(Clone, Default)]
pub struct QuitObservers {
    inner: Arc<Mutex<ObserverList>>,
}

#[derive(Default)]
struct ObserverList {
    next_id: u64,
    observers: Vec<(SubscriptionId, QuitCallback)>,
}

impl fmt::Debug for QuitObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuitObservers")
            .field("count", &self.len())
            .finish()
    }
}

impl QuitObservers {
    pub fn subscribe(&self, callback: QuitCallback) -> SubscriptionId {
        let mut list = self.lock();
        let id = SubscriptionId(list.next_id);
        list.next_id += 1;
        list.observers.push((id, callback));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut list = self.lock();
        let before = list.observers.len();
        list.observers.retain(|(existing, _)| *existing != id);
        list.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `notification` to every observer registered right now.
    ///
    /// The list is copied before calling out, so an observer may subscribe
    /// or unsubscribe from inside its callback.
    pub fn notify(&self, notification: &QuitNotification) {
        let callbacks: Vec<QuitCallback> = self
            .lock()
            .observers
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(notification);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ObserverList> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
