//! The publish/subscribe dispatcher.
//!
//! [`Dispatcher`] maps event names to weakly-held callbacks and turns every
//! `publish` into deferred invocations on the host's [`Scheduler`].
//!
//! ## Architecture
//! ```text
//! subscribe("tick", cb) ──► id 0 ──► subscriptions: { 0 → "tick" }
//!                                    handlers:      { "tick" → { 0 → WeakRef(cb) } }
//!
//! publish("tick", p)
//!     ├─ registry check (closed registries only)
//!     ├─ for each WeakRef under "tick":
//!     │     ├─ alive ──► scheduler.run_soon(cb(p.clone()))
//!     │     └─ dead  ──► mark
//!     ├─ purge marked ids from both indexes
//!     └─ return (no handler has run yet)
//! ```
//!
//! ## Rules
//! - Subscription ids start at 0, strictly increase and are never reused.
//! - Every id in `subscriptions` has an entry under its event in `handlers`
//!   and vice versa.
//! - A dead callback is never invoked; its record is purged no later than the
//!   next publish on its event.
//! - `publish` never calls a handler itself. Unsubscribing cannot retract an
//!   invocation that an earlier publish already scheduled.
//! - No ordering is promised among handlers of one event.
//!
//! ## Sharing
//! All state sits behind a `RefCell`, so a single `Rc<Dispatcher<P>>` can be
//! handed to every component that subscribes or publishes. No borrow is held
//! while jobs are handed to the scheduler or while handlers run, so handlers
//! may freely subscribe, unsubscribe and publish.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::config::DispatcherBuilder;
use crate::error::Result;
use crate::registry::EventRegistry;
use crate::scheduler::Scheduler;
use crate::weak::{Callback, WeakRef};

/// Opaque handle returned by [`Dispatcher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// The raw integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Both indexes plus the id counter.
struct State<P> {
    next_id: u64,
    /// id → event name.
    subscriptions: HashMap<SubscriptionId, String>,
    /// event name → (id → callback).
    handlers: HashMap<String, BTreeMap<SubscriptionId, WeakRef<P>>>,
}

impl<P> State<P> {
    fn new() -> Self {
        Self {
            next_id: 0,
            subscriptions: HashMap::new(),
            handlers: HashMap::new(),
        }
    }

    fn allocate_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Remove `id` from both indexes. Empty handler tables are dropped.
    fn remove(&mut self, id: SubscriptionId) -> bool {
        let Some(event) = self.subscriptions.remove(&id) else {
            return false;
        };
        if let Some(table) = self.handlers.get_mut(&event) {
            table.remove(&id);
            if table.is_empty() {
                self.handlers.remove(&event);
            }
        }
        true
    }
}

/// Name-addressed publish/subscribe over a cooperative scheduler.
///
/// `P` is the payload type shared by every event of this dispatcher; use an
/// enum when events carry different data, or `()` when they carry none.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use pubmarine::{Dispatcher, TaskQueue};
///
/// let queue = TaskQueue::new();
/// let dispatcher: Dispatcher<u32> = Dispatcher::new(queue.clone());
///
/// let total = Rc::new(Cell::new(0));
/// let handler = {
///     let total = Rc::clone(&total);
///     Rc::new(move |beat: u32| total.set(total.get() + beat))
/// };
///
/// let id = dispatcher.subscribe("server_msg", &handler)?;
/// dispatcher.publish("server_msg", 5)?;
/// assert_eq!(total.get(), 0); // deferred
///
/// queue.run_pending();
/// assert_eq!(total.get(), 5);
///
/// dispatcher.unsubscribe(id);
/// dispatcher.publish("server_msg", 5)?;
/// assert!(queue.is_empty());
/// # Ok::<(), pubmarine::DispatchError>(())
/// ```
pub struct Dispatcher<P> {
    scheduler: Rc<dyn Scheduler>,
    registry: EventRegistry,
    state: RefCell<State<P>>,
}

impl<P: Clone + 'static> Dispatcher<P> {
    /// Create a dispatcher that accepts any event name.
    pub fn new(scheduler: impl Scheduler + 'static) -> Self {
        Self::with_registry(scheduler, EventRegistry::dynamic())
    }

    /// Create a dispatcher restricted to `events`.
    ///
    /// An empty list accepts any name.
    pub fn with_events<I, N>(scheduler: impl Scheduler + 'static, events: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::with_registry(scheduler, EventRegistry::closed(events))
    }

    /// Create a dispatcher with an explicit registry.
    pub fn with_registry(scheduler: impl Scheduler + 'static, registry: EventRegistry) -> Self {
        Self {
            scheduler: Rc::new(scheduler),
            registry,
            state: RefCell::new(State::new()),
        }
    }

    /// Start a [`DispatcherBuilder`].
    pub fn builder() -> DispatcherBuilder<P> {
        DispatcherBuilder::new()
    }

    /// Subscribe `callback` to `event`.
    ///
    /// Only a weak reference is stored; the subscription ends by itself when
    /// the callback's owner is dropped. Subscribing the same callback twice
    /// yields two independent subscriptions.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnknownEvent`](crate::DispatchError::UnknownEvent) if
    /// a closed registry does not contain `event`.
    pub fn subscribe(
        &self,
        event: &str,
        callback: impl Into<WeakRef<P>>,
    ) -> Result<SubscriptionId> {
        self.registry.check(event)?;
        let weak = callback.into();
        let kind = weak.kind();

        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.subscriptions.insert(id, event.to_owned());
        state
            .handlers
            .entry(event.to_owned())
            .or_default()
            .insert(id, weak);
        drop(state);

        debug!(event, %id, ?kind, "subscribed");
        Ok(id)
    }

    /// Remove a subscription.
    ///
    /// Unknown or already removed ids are a silent no-op. Returns whether a
    /// record was removed. Invocations already scheduled by an earlier
    /// publish still run.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.state.borrow_mut().remove(id);
        if removed {
            debug!(%id, "unsubscribed");
        }
        removed
    }

    /// Publish `event`, scheduling one deferred invocation per live handler.
    ///
    /// Each handler receives its own clone of `payload`. Handlers whose owner
    /// is gone are purged instead. Publishing an event nobody listens to is
    /// not an error.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnknownEvent`](crate::DispatchError::UnknownEvent) if
    /// a closed registry does not contain `event`.
    pub fn publish(&self, event: &str, payload: P) -> Result<()> {
        self.registry.check(event)?;

        let (live, purged) = {
            let mut state = self.state.borrow_mut();
            let mut live: SmallVec<[Callback<P>; 4]> = SmallVec::new();
            let mut dead: SmallVec<[SubscriptionId; 4]> = SmallVec::new();

            if let Some(table) = state.handlers.get(event) {
                for (id, weak) in table {
                    match weak.resolve() {
                        Some(callback) => live.push(callback),
                        None => dead.push(*id),
                    }
                }
            }

            for id in &dead {
                state.remove(*id);
                trace!(event, %id, "purged dead subscription");
            }
            (live, dead.len())
        };

        let scheduled = live.len();
        for callback in live {
            let payload = payload.clone();
            self.scheduler
                .run_soon(Box::new(move || callback(payload)));
        }

        debug!(event, scheduled, purged, "published");
        Ok(())
    }

    /// Deprecated alias of [`publish`](Self::publish).
    #[deprecated(since = "0.1.0", note = "use `Dispatcher::publish` instead")]
    pub fn emit(&self, event: &str, payload: P) -> Result<()> {
        warn!(event, "Dispatcher::emit is deprecated; use Dispatcher::publish");
        self.publish(event, payload)
    }
}

impl<P> Dispatcher<P> {
    /// True if `id` names an active subscription.
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.state.borrow().subscriptions.contains_key(&id)
    }

    /// The event `id` is subscribed to, if it is still active.
    pub fn event_of(&self, id: SubscriptionId) -> Option<String> {
        self.state.borrow().subscriptions.get(&id).cloned()
    }

    /// Number of active subscriptions across all events.
    pub fn subscription_count(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }

    /// Number of subscription records under `event`, dead ones not yet
    /// purged included.
    pub fn handler_count(&self, event: &str) -> usize {
        self.state
            .borrow()
            .handlers
            .get(event)
            .map_or(0, BTreeMap::len)
    }

    /// Sorted names of events that currently have subscriptions.
    pub fn subscribed_events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.state.borrow().handlers.keys().cloned().collect();
        events.sort_unstable();
        events
    }

    /// The registry captured at construction.
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// The scheduler deferred invocations are posted to.
    pub fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }
}

impl<P> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("scheduler", &self.scheduler.name())
            .field("registry", &self.registry)
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}
