//! # Event emission
//!
//! `on`/`once`/`off` registration over named events, with emission deferred
//! past the current task's synchronous continuation so a caller may
//! subscribe immediately after invoking a method that schedules one, such
//! as `asset:created`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// A registered event listener.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// A listener registration id, returned by [`EventEmitter::on`]/
/// [`EventEmitter::once`] so it can later be passed to
/// [`EventEmitter::off`].
pub type ListenerId = u64;

struct Registration {
    id: ListenerId,
    listener: Listener,
    once: bool,
}

/// A minimal async-aware pub/sub registry, scoped to one
/// [`crate::lifecycle::LifecycleManager`] or
/// [`crate::migration::MigrationManager`] instance.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Arc<Mutex<HashMap<String, Vec<Registration>>>>,
    next_id: Arc<AtomicU64>,
}

impl EventEmitter {
    /// Construct an emitter with no registered listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener that fires on every emission of `event`.
    pub fn on(&self, event: &str, listener: Listener) -> ListenerId {
        self.register(event, listener, false)
    }

    /// Register a listener that fires at most once, then is removed.
    pub fn once(&self, event: &str, listener: Listener) -> ListenerId {
        self.register(event, listener, true)
    }

    fn register(&self, event: &str, listener: Listener, once: bool) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.listeners.lock().expect("event listener mutex poisoned");
        listeners.entry(event.to_string()).or_default().push(Registration { id, listener, once });
        id
    }

    /// Remove a previously registered listener.
    pub fn off(&self, event: &str, id: ListenerId) {
        let mut listeners = self.listeners.lock().expect("event listener mutex poisoned");
        if let Some(registrations) = listeners.get_mut(event) {
            registrations.retain(|r| r.id != id);
        }
    }

    /// Emit `event` with `payload`, after yielding once to the executor so
    /// listeners registered immediately after the call that triggered this
    /// emission are still reachable.
    pub async fn emit(&self, event: &str, payload: Value) {
        tokio::task::yield_now().await;
        let to_call: Vec<Listener> = {
            let mut listeners = self.listeners.lock().expect("event listener mutex poisoned");
            let Some(registrations) = listeners.get_mut(event) else { return };
            let once_removed = registrations.iter().filter(|r| r.once).map(|r| r.id).collect::<Vec<_>>();
            let to_call = registrations.iter().map(|r| r.listener.clone()).collect();
            registrations.retain(|r| !once_removed.contains(&r.id));
            to_call
        };
        for listener in to_call {
            listener(&payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn on_fires_every_emission() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        emitter.on("asset:created", Arc::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        emitter.emit("asset:created", serde_json::json!({})).await;
        emitter.emit("asset:created", serde_json::json!({})).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn once_fires_a_single_time() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        emitter.once("asset:created", Arc::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        emitter.emit("asset:created", serde_json::json!({})).await;
        emitter.emit("asset:created", serde_json::json!({})).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn off_removes_listener() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let id = emitter.on("asset:created", Arc::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        emitter.off("asset:created", id);
        emitter.emit("asset:created", serde_json::json!({})).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
