//! A value holder with synchronous change notification.
//!
//! # Design
//! `set` always notifies, even when the new value equals the old one; there
//! is no dirty checking. Subscribers run on the writer's thread after the
//! value lock is released, so a subscriber may read or write the observable
//! it is attached to. `subscribe` delivers the current value immediately.
//!
//! Writers are serialized by a reentrant lock held across the store and its
//! notification, so subscribers see writes in the order they were applied
//! and the last value delivered always matches `get()`. A subscriber that
//! writes back on the same thread re-enters that lock.
//!
//! Views created by `map` hold only a weak reference to their target. Once
//! every handle to the view is dropped, its entry in the source's subscriber
//! list is discarded.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type Liveness = Box<dyn Fn() -> bool + Send + Sync>;

struct Entry<T> {
    id: u64,
    callback: Callback<T>,
    /// `None` for explicit subscriptions, which live until unsubscribed.
    alive: Option<Liveness>,
}

impl<T> Entry<T> {
    fn is_alive(&self) -> bool {
        self.alive.as_ref().map_or(true, |alive| alive())
    }
}

struct Inner<T> {
    value: Mutex<T>,
    subscribers: Mutex<Vec<Entry<T>>>,
    write_order: ReentrantMutex<()>,
    next_id: AtomicU64,
}

/// Shared observable value. Clones share the same value and subscribers.
pub struct Observable<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.lock())
            .field("subscribers", &self.inner.subscribers.lock().len())
            .finish()
    }
}

impl<T: Default + Clone + Send + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                value: Mutex::new(value),
                subscribers: Mutex::new(Vec::new()),
                write_order: ReentrantMutex::new(()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.lock().clone()
    }

    pub fn set(&self, value: T) {
        let _order = self.inner.write_order.lock();
        *self.inner.value.lock() = value.clone();
        self.notify(&value);
    }

    /// Replace the value with `f(current)` and notify.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let _order = self.inner.write_order.lock();
        let next = {
            let mut value = self.inner.value.lock();
            let next = f(&value);
            *value = next.clone();
            next
        };
        self.notify(&next);
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.attach(Arc::new(callback), None);
        let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.subscribers.lock().retain(|entry| entry.id != id);
                }
            }),
        }
    }

    /// Number of live subscribers, including views created by `map` that are
    /// still referenced.
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.inner.subscribers.lock();
        subscribers.retain(Entry::is_alive);
        subscribers.len()
    }

    /// Derive an observable that recomputes `f` on every change of `self`.
    ///
    /// The source keeps the view updated for as long as some handle to the
    /// view exists.
    pub fn map<U>(&self, f: impl Fn(&T) -> U + Send + Sync + 'static) -> Observable<U>
    where
        U: Clone + Send + 'static,
    {
        let derived = Observable::new(f(&self.get()));
        let target = Arc::downgrade(&derived.inner);
        let watched = target.clone();
        let update: Callback<T> = Arc::new(move |value: &T| {
            if let Some(inner) = target.upgrade() {
                Observable { inner }.set(f(value));
            }
        });
        self.attach(update, Some(Box::new(move || watched.strong_count() > 0)));
        derived
    }

    /// Register a subscriber and deliver the current value to it.
    fn attach(&self, callback: Callback<T>, alive: Option<Liveness>) -> u64 {
        let _order = self.inner.write_order.lock();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut subscribers = self.inner.subscribers.lock();
            subscribers.retain(Entry::is_alive);
            subscribers.push(Entry {
                id,
                callback: Arc::clone(&callback),
                alive,
            });
        }
        callback(&self.get());
        id
    }

    fn notify(&self, value: &T) {
        let subscribers: Vec<Callback<T>> = {
            let mut subscribers = self.inner.subscribers.lock();
            subscribers.retain(Entry::is_alive);
            subscribers
                .iter()
                .map(|entry| Arc::clone(&entry.callback))
                .collect()
        };
        for callback in subscribers {
            callback(value);
        }
    }
}

/// Handle returned by `Observable::subscribe`.
///
/// Dropping it keeps the subscription alive; call `unsubscribe` to stop
/// receiving updates.
#[must_use = "dropping a Subscription does not unsubscribe"]
pub struct Subscription {
    cancel: Box<dyn FnOnce() + Send + Sync>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        (self.cancel)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
