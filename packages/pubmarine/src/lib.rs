//! # PubMarine
//!
//! An in-process publish/subscribe event dispatcher for single-threaded,
//! cooperatively scheduled programs.
//!
//! Components talk through name-addressed events instead of holding
//! references to each other. The dispatcher keeps only **weak** references
//! to callbacks, and every publish turns into **deferred** invocations on the
//! host's scheduler, so no handler ever runs inside the call that triggered it.
//!
//! ## Architecture
//!
//! ```text
//! Component A                 Dispatcher<P>                      Scheduler
//!     │                            │                                 │
//!     ├─ subscribe("tick", &cb) ──►│ id ─► { "tick" → WeakRef(cb) }  │
//!     │                            │                                 │
//! Component B                      │                                 │
//!     ├─ publish("tick", p) ──────►│ resolve WeakRefs                │
//!     │                            │   ├─ alive ── run_soon(cb(p)) ─►│ [job]
//!     │                            │   └─ dead  ── purge record      │
//!     │◄──────── Ok(()) ───────────│                                 │
//!     │                                                              │
//!     │                       next loop turn ────────────────────────┤
//!     │                                                              ▼
//!                                                               cb(p) runs
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Ids are never reused** - subscription ids start at 0 and strictly increase
//! 2. **Indexes agree** - id→event and event→handlers always describe the same records
//! 3. **Closed registries hold** - with an allow-list, only listed names are accepted
//! 4. **Dead callbacks never run** - and are purged by the next publish on their event
//! 5. **Publish never invokes** - handlers run on a later scheduler turn
//!
//! ## Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use pubmarine::{Dispatcher, TaskQueue};
//!
//! let queue = TaskQueue::new();
//! let dispatcher: Rc<Dispatcher<u32>> = Rc::new(Dispatcher::new(queue.clone()));
//!
//! let seen = Rc::new(Cell::new(0));
//! let display = {
//!     let seen = Rc::clone(&seen);
//!     Rc::new(move |beat: u32| seen.set(beat))
//! };
//! dispatcher.subscribe("server_msg", &display)?;
//!
//! dispatcher.publish("server_msg", 3)?;
//! queue.run_pending();
//! assert_eq!(seen.get(), 3);
//!
//! // Dropping the subscriber's callback ends the subscription.
//! drop(display);
//! dispatcher.publish("server_msg", 4)?;
//! assert!(queue.is_empty());
//! assert_eq!(dispatcher.subscription_count(), 0);
//! # Ok::<(), pubmarine::DispatchError>(())
//! ```
//!
//! ## What This Is Not
//!
//! - Not cross-process or networked messaging
//! - Not thread-safe: one logical thread of control with cooperative suspension
//! - No ordering or priority among handlers or independent events

// Core modules
mod config;
mod dispatcher;
mod error;
mod registry;
mod scheduler;
mod weak;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export dispatcher types
pub use dispatcher::{Dispatcher, SubscriptionId};

// Re-export configuration types
pub use config::{DispatcherBuilder, DispatcherConfig};
pub use registry::EventRegistry;

// Re-export error types
pub use error::{DispatchError, Result};

// Re-export scheduling types
pub use scheduler::{Job, LocalSpawner, Scheduler, TaskQueue};

// Re-export weak reference types
pub use weak::{Callback, WeakKind, WeakRef};
