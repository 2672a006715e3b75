// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Listener registration with explicit release handles.
//
// Every native callback the shell installs goes through a `ListenerSlot`,
// which holds at most one listener. Registering returns a `Subscription`;
// releasing (or dropping) it empties the slot again. A newer registration
// replaces the older one, and the older handle's release is then a no-op so
// it can never unhook its successor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Callback receiving one value per native event.
pub type Listener<T> = Box<dyn Fn(T) + Send + Sync>;

/// Hardware back handler. Returns `true` when the press was consumed.
pub type BackHandler = Box<dyn Fn() -> bool + Send + Sync>;

/// Handle for one registered listener.
#[must_use = "dropping a Subscription immediately unregisters its listener"]
pub struct Subscription {
    label: &'static str,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(label: &'static str, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            label,
            release: Some(Box::new(release)),
        }
    }

    /// Combine several handles into one that releases them all, in order.
    pub fn merge(label: &'static str, parts: Vec<Subscription>) -> Self {
        Self::new(label, move || {
            for part in parts {
                part.release();
            }
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Unregister the listener now.
    pub fn release(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(listener = self.label, "listener released");
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("active", &self.release.is_some())
            .finish()
    }
}

struct SlotInner<F: ?Sized> {
    next_id: AtomicU64,
    current: Mutex<Option<(u64, Arc<F>)>>,
}

impl<F: ?Sized> SlotInner<F> {
    fn lock(&self) -> MutexGuard<'_, Option<(u64, Arc<F>)>> {
        // A panicking listener must not wedge the slot forever.
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Single-listener registry for one kind of native event.
pub struct ListenerSlot<F: ?Sized> {
    label: &'static str,
    inner: Arc<SlotInner<F>>,
}

impl<F: ?Sized> Clone for ListenerSlot<F> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: ?Sized + Send + Sync + 'static> ListenerSlot<F> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            inner: Arc::new(SlotInner {
                next_id: AtomicU64::new(1),
                current: Mutex::new(None),
            }),
        }
    }

    /// Install `handler`, replacing whatever was registered before.
    pub fn register(&self, handler: Box<F>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let replaced = self.inner.lock().replace((id, Arc::from(handler))).is_some();
        if replaced {
            tracing::debug!(listener = self.label, "listener replaced");
        }

        let weak: Weak<SlotInner<F>> = Arc::downgrade(&self.inner);
        Subscription::new(self.label, move || {
            if let Some(inner) = weak.upgrade() {
                let mut current = inner.lock();
                if matches!(*current, Some((held, _)) if held == id) {
                    *current = None;
                }
            }
        })
    }

    /// Snapshot of the registered handler. Call it outside the slot lock.
    pub fn current(&self) -> Option<Arc<F>> {
        self.inner.lock().as_ref().map(|(_, handler)| Arc::clone(handler))
    }

    pub fn is_registered(&self) -> bool {
        self.inner.lock().is_some()
    }
}

impl<T: 'static> ListenerSlot<dyn Fn(T) + Send + Sync> {
    /// Deliver `value` to the listener. Returns `false` when nobody listens.
    pub fn emit(&self, value: T) -> bool {
        match self.current() {
            Some(listener) => {
                listener(value);
                true
            }
            None => {
                tracing::debug!(listener = self.label, "event dropped, no listener");
                false
            }
        }
    }
}

impl ListenerSlot<dyn Fn() -> bool + Send + Sync> {
    /// Run the handler. Unregistered slots leave the event unhandled.
    pub fn dispatch(&self) -> bool {
        self.current().is_some_and(|handler| handler())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    type CountSlot = ListenerSlot<dyn Fn(usize) + Send + Sync>;

    fn counter() -> (Arc<AtomicUsize>, Listener<usize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&hits);
        let listener: Listener<usize> = Box::new(move |n| {
            sink.fetch_add(n, Ordering::SeqCst);
        });
        (hits, listener)
    }

    #[test]
    fn emit_reaches_registered_listener() {
        let slot = CountSlot::new("test");
        let (hits, listener) = counter();
        let _sub = slot.register(listener);
        assert!(slot.emit(3));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn release_empties_slot() {
        let slot = CountSlot::new("test");
        let (hits, listener) = counter();
        let sub = slot.register(listener);
        sub.release();
        assert!(!slot.is_registered());
        assert!(!slot.emit(1));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drop_releases_too() {
        let slot = CountSlot::new("test");
        let (_, listener) = counter();
        drop(slot.register(listener));
        assert!(!slot.is_registered());
    }

    #[test]
    fn re_registering_replaces_instead_of_adding() {
        let slot = CountSlot::new("test");
        let (first_hits, first) = counter();
        let (second_hits, second) = counter();
        let old = slot.register(first);
        let _new = slot.register(second);

        slot.emit(1);
        assert_eq!(first_hits.load(Ordering::SeqCst), 0);
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);

        // The stale handle must not unhook its successor.
        old.release();
        assert!(slot.is_registered());
        slot.emit(1);
        assert_eq!(second_hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn back_dispatch_without_handler_is_unhandled() {
        let slot: ListenerSlot<dyn Fn() -> bool + Send + Sync> = ListenerSlot::new("back");
        assert!(!slot.dispatch());
        let _sub = slot.register(Box::new(|| true));
        assert!(slot.dispatch());
    }

    #[test]
    fn merged_subscription_releases_every_part() {
        let a = CountSlot::new("a");
        let b = CountSlot::new("b");
        let (_, la) = counter();
        let (_, lb) = counter();
        let merged = Subscription::merge("both", vec![a.register(la), b.register(lb)]);
        assert!(a.is_registered() && b.is_registered());
        merged.release();
        assert!(!a.is_registered());
        assert!(!b.is_registered());
    }
}
