//! Shared observer machinery.
//!
//! Every observer follows the same lifecycle:
//!
//! ```text
//! Uninitialized ──subscribe──> Probing ──listeners attached──> Subscribed
//!                                 ^                                 │
//!                                 └──────subscribe── Detached <─────┘
//!                                                     (last consumer left)
//! ```
//!
//! The first subscription probes the current value (written to the cell
//! without notifying anyone), then attaches the source's listeners. Each
//! event updates the cell and notifies every consumer in registration order,
//! synchronously. When the last consumer leaves, the listeners are removed;
//! a later subscription probes again.
//!
//! Consumer callbacks run outside the state lock, so a callback may
//! unsubscribe itself or read [`Observer::current`]. Deliveries are
//! serialized per observer: a cell write and the notifications for it finish
//! before the next event is written, whichever thread the source calls from.

use std::fmt;
use std::sync::{Arc, Weak};

use bridge_traits::{platform::DynCallback, EventCallback, ListenerHandle, PlatformSendSync};
use parking_lot::{Mutex, ReentrantMutex};
use tracing::trace;

/// Lifecycle phase of an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverPhase {
    Uninitialized,
    Probing,
    Subscribed,
    Detached,
}

/// Where an observer's values come from.
///
/// Implemented by the concrete observers over native modules and web
/// signals.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ObserverSource: PlatformSendSync + 'static {
    type Value: Clone + PlatformSendSync + 'static;

    /// Used for logging.
    fn name(&self) -> &'static str;

    /// Value of a fresh cell, before probing.
    fn initial(&self) -> Self::Value;

    /// Current value, or `None` when the source has nothing to report.
    async fn probe(&self) -> Option<Self::Value>;

    /// Register change listeners delivering into `emitter`.
    fn attach(&self, emitter: Emitter<Self::Value>) -> Vec<Box<dyn ListenerHandle>>;
}

struct Inner<V> {
    phase: ObserverPhase,
    value: V,
    consumers: Vec<(u64, EventCallback<V>)>,
    listeners: Vec<Box<dyn ListenerHandle>>,
    next_consumer: u64,
    generation: u64,
}

struct Shared<V> {
    /// Held across cell write and notification. Reentrant so a consumer may
    /// trigger a nested event on the same thread.
    delivery: ReentrantMutex<()>,
    inner: Mutex<Inner<V>>,
}

impl<V: Clone> Shared<V> {
    fn remove_consumer(&self, id: u64) {
        let detached = {
            let mut inner = self.inner.lock();
            inner.consumers.retain(|(consumer, _)| *consumer != id);
            if inner.consumers.is_empty()
                && matches!(
                    inner.phase,
                    ObserverPhase::Probing | ObserverPhase::Subscribed
                )
            {
                inner.phase = ObserverPhase::Detached;
                std::mem::take(&mut inner.listeners)
            } else {
                Vec::new()
            }
        };

        for listener in detached {
            listener.remove();
        }
    }
}

/// Delivers source events into an observer's cell.
///
/// An emitter belongs to one attach generation; once the observer detaches
/// its events are ignored even if a listener outlives its removal.
pub struct Emitter<V> {
    shared: Weak<Shared<V>>,
    generation: u64,
}

impl<V> Clone for Emitter<V> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            generation: self.generation,
        }
    }
}

impl<V: Clone> Emitter<V> {
    /// Update the cell, then notify every consumer in registration order.
    pub fn emit(&self, value: V) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let _delivery = shared.delivery.lock();

        let consumers: Vec<EventCallback<V>> = {
            let mut inner = shared.inner.lock();
            if inner.generation != self.generation || inner.phase == ObserverPhase::Detached {
                return;
            }
            inner.value = value.clone();
            inner
                .consumers
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect()
        };

        for consumer in consumers {
            consumer(value.clone());
        }
    }
}

/// Observer with a current value and change notification.
pub struct Observer<S: ObserverSource> {
    source: Arc<S>,
    shared: Arc<Shared<S::Value>>,
}

impl<S: ObserverSource> Clone for Observer<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: ObserverSource> Observer<S> {
    pub fn new(source: S) -> Self {
        let value = source.initial();
        Self {
            source: Arc::new(source),
            shared: Arc::new(Shared {
                delivery: ReentrantMutex::new(()),
                inner: Mutex::new(Inner {
                    phase: ObserverPhase::Uninitialized,
                    value,
                    consumers: Vec::new(),
                    listeners: Vec::new(),
                    next_consumer: 0,
                    generation: 0,
                }),
            }),
        }
    }

    /// Latest value of the cell.
    pub fn current(&self) -> S::Value {
        self.shared.inner.lock().value.clone()
    }

    pub fn phase(&self) -> ObserverPhase {
        self.shared.inner.lock().phase
    }

    pub fn consumer_count(&self) -> usize {
        self.shared.inner.lock().consumers.len()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Register a consumer.
    ///
    /// The first consumer (or the first after a detach) probes the source and
    /// attaches its listeners before this returns.
    pub async fn subscribe<F>(&self, callback: F) -> Subscription<S::Value>
    where
        F: Fn(S::Value) + PlatformSendSync + 'static,
    {
        let callback: Arc<DynCallback<S::Value>> = Arc::new(callback);

        let (id, start) = {
            let mut inner = self.shared.inner.lock();
            let id = inner.next_consumer;
            inner.next_consumer += 1;
            inner.consumers.push((id, callback));

            let start = match inner.phase {
                ObserverPhase::Uninitialized | ObserverPhase::Detached => {
                    inner.phase = ObserverPhase::Probing;
                    inner.generation += 1;
                    inner.value = self.source.initial();
                    Some(inner.generation)
                }
                ObserverPhase::Probing | ObserverPhase::Subscribed => None,
            };
            (id, start)
        };

        let subscription = Subscription {
            shared: Arc::downgrade(&self.shared),
            id,
            active: true,
        };

        if let Some(generation) = start {
            self.start(generation).await;
        }

        subscription
    }

    async fn start(&self, generation: u64) {
        trace!(observer = self.source.name(), "Probing");
        let probed = self.source.probe().await;

        {
            let mut inner = self.shared.inner.lock();
            if inner.generation != generation || inner.phase != ObserverPhase::Probing {
                return;
            }
            if let Some(value) = probed {
                inner.value = value;
            }
        }

        let listeners = self.source.attach(Emitter {
            shared: Arc::downgrade(&self.shared),
            generation,
        });

        let stale = {
            let mut inner = self.shared.inner.lock();
            if inner.generation == generation && inner.phase == ObserverPhase::Probing {
                inner.listeners = listeners;
                inner.phase = ObserverPhase::Subscribed;
                Vec::new()
            } else {
                listeners
            }
        };

        for listener in stale {
            listener.remove();
        }
        trace!(observer = self.source.name(), "Subscribed");
    }
}

impl<S: ObserverSource> fmt::Debug for Observer<S>
where
    S::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("Observer")
            .field("source", &self.source.name())
            .field("phase", &inner.phase)
            .field("value", &inner.value)
            .field("consumers", &inner.consumers.len())
            .finish()
    }
}

/// A registered consumer. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription<V: Clone> {
    shared: Weak<Shared<V>>,
    id: u64,
    active: bool,
}

impl<V: Clone> Subscription<V> {
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !std::mem::replace(&mut self.active, false) {
            return;
        }
        if let Some(shared) = self.shared.upgrade() {
            shared.remove_consumer(self.id);
        }
    }
}

impl<V: Clone> Drop for Subscription<V> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<V: Clone> fmt::Debug for Subscription<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::CallbackHandle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counter source whose emitter is exposed to the test.
    #[derive(Default)]
    struct ManualSource {
        probes: AtomicUsize,
        removed: Arc<AtomicUsize>,
        emitter: Mutex<Option<Emitter<u32>>>,
        probe_value: Option<u32>,
    }

    impl ManualSource {
        fn fire(&self, value: u32) {
            let emitter = self.emitter.lock().clone();
            if let Some(emitter) = emitter {
                emitter.emit(value);
            }
        }
    }

    #[async_trait::async_trait]
    impl ObserverSource for ManualSource {
        type Value = u32;

        fn name(&self) -> &'static str {
            "manual"
        }

        fn initial(&self) -> u32 {
            0
        }

        async fn probe(&self) -> Option<u32> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.probe_value
        }

        fn attach(&self, emitter: Emitter<u32>) -> Vec<Box<dyn ListenerHandle>> {
            *self.emitter.lock() = Some(emitter);
            let removed = Arc::clone(&self.removed);
            vec![Box::new(CallbackHandle::new(move || {
                removed.fetch_add(1, Ordering::SeqCst);
            }))]
        }
    }

    #[tokio::test]
    async fn test_consumers_notified_in_registration_order() {
        let observer = Observer::new(ManualSource::default());
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut subs = Vec::new();
        for name in ["A", "B", "C"] {
            let log = Arc::clone(&log);
            subs.push(
                observer
                    .subscribe(move |value: u32| log.lock().push((name, value)))
                    .await,
            );
        }

        observer.source().fire(7);

        assert_eq!(*log.lock(), vec![("A", 7), ("B", 7), ("C", 7)]);
        assert_eq!(observer.current(), 7);
    }

    #[tokio::test]
    async fn test_probe_writes_silently_and_runs_once() {
        let observer = Observer::new(ManualSource {
            probe_value: Some(3),
            ..Default::default()
        });
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let _a = observer
            .subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        let _b = observer.subscribe(|_| {}).await;

        assert_eq!(observer.current(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(observer.source().probes.load(Ordering::SeqCst), 1);
        assert_eq!(observer.phase(), ObserverPhase::Subscribed);
    }

    #[tokio::test]
    async fn test_equal_values_are_not_coalesced() {
        let observer = Observer::new(ManualSource::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = observer
            .subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        observer.source().fire(1);
        observer.source().fire(1);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_last_unsubscribe_detaches_and_resubscribe_probes_again() {
        let observer = Observer::new(ManualSource::default());

        let a = observer.subscribe(|_| {}).await;
        let b = observer.subscribe(|_| {}).await;

        a.unsubscribe();
        assert_eq!(observer.phase(), ObserverPhase::Subscribed);
        assert_eq!(observer.source().removed.load(Ordering::SeqCst), 0);

        drop(b);
        assert_eq!(observer.phase(), ObserverPhase::Detached);
        assert_eq!(observer.source().removed.load(Ordering::SeqCst), 1);

        let _c = observer.subscribe(|_| {}).await;
        assert_eq!(observer.phase(), ObserverPhase::Subscribed);
        assert_eq!(observer.source().probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_emitter_is_ignored_after_detach() {
        let observer = Observer::new(ManualSource::default());
        let sub = observer.subscribe(|_| {}).await;
        let stale = observer.source().emitter.lock().clone();
        sub.unsubscribe();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _fresh = observer
            .subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        if let Some(stale) = stale {
            stale.emit(99);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(observer.current(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_events_notify_in_cell_order() {
        let observer = Observer::new(ManualSource::default());
        let out_of_order = Arc::new(AtomicUsize::new(0));

        let reader = observer.clone();
        let mismatches = Arc::clone(&out_of_order);
        let _sub = observer
            .subscribe(move |value: u32| {
                if reader.current() != value {
                    mismatches.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;

        let emitter = observer.source().emitter.lock().clone();
        let Some(emitter) = emitter else {
            panic!("source was not attached");
        };
        std::thread::scope(|scope| {
            for offset in [0u32, 10_000] {
                let emitter = emitter.clone();
                scope.spawn(move || {
                    for value in 0..2_000 {
                        emitter.emit(offset + value);
                    }
                });
            }
        });

        assert_eq!(out_of_order.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_callback_may_read_current() {
        let observer = Observer::new(ManualSource::default());
        let seen = Arc::new(Mutex::new(None));

        let reader = observer.clone();
        let slot = Arc::clone(&seen);
        let _sub = observer
            .subscribe(move |_| {
                *slot.lock() = Some(reader.current());
            })
            .await;

        observer.source().fire(5);
        assert_eq!(*seen.lock(), Some(5));
    }
}
