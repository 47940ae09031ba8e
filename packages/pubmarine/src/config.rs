//! Dispatcher configuration and builder.
//!
//! [`DispatcherConfig`] is the serializable form (e.g. a section of a
//! program's JSON config); [`DispatcherBuilder`] assembles a
//! [`Dispatcher`] from it or from code.
//!
//! ## Field semantics
//! - `events`: allowed event names. `None` or an empty list means any name is
//!   accepted.
//!
//! ## Example
//! ```
//! use pubmarine::{Dispatcher, DispatcherConfig, TaskQueue};
//!
//! let config = DispatcherConfig::from_json_str(r#"{ "events": ["incoming", "typed"] }"#)?;
//! let dispatcher: Dispatcher<String> = Dispatcher::builder()
//!     .config(&config)
//!     .build(TaskQueue::new());
//!
//! assert!(dispatcher.registry().contains("typed"));
//! assert!(dispatcher.publish("conn_lost", String::new()).is_err());
//! # Ok::<(), pubmarine::DispatchError>(())
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::registry::EventRegistry;
use crate::scheduler::Scheduler;

/// Serializable dispatcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Allowed event names; `None` accepts any name.
    pub events: Option<Vec<String>>,
}

impl DispatcherConfig {
    /// Parse a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The registry described by this config.
    pub fn registry(&self) -> EventRegistry {
        match &self.events {
            Some(events) => EventRegistry::closed(events.iter().cloned()),
            None => EventRegistry::dynamic(),
        }
    }
}

/// Builder for [`Dispatcher`].
///
/// Generic over the payload type so `Dispatcher::builder()` can infer `P`
/// from the binding the built dispatcher lands in.
pub struct DispatcherBuilder<P> {
    registry: EventRegistry,
    marker: PhantomData<fn(P)>,
}

impl<P> DispatcherBuilder<P> {
    /// Start with a dynamic registry.
    pub fn new() -> Self {
        Self {
            registry: EventRegistry::dynamic(),
            marker: PhantomData,
        }
    }

    /// Restrict the dispatcher to `names`.
    pub fn events<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.registry = EventRegistry::closed(names);
        self
    }

    /// Use an existing registry.
    pub fn registry(mut self, registry: EventRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Apply a loaded [`DispatcherConfig`].
    pub fn config(mut self, config: &DispatcherConfig) -> Self {
        self.registry = config.registry();
        self
    }
}

impl<P: Clone + 'static> DispatcherBuilder<P> {
    /// Build the dispatcher on top of `scheduler`.
    pub fn build(self, scheduler: impl Scheduler + 'static) -> Dispatcher<P> {
        Dispatcher::with_registry(scheduler, self.registry)
    }
}

impl<P> Default for DispatcherBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for DispatcherBuilder<P> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            marker: PhantomData,
        }
    }
}

impl<P> fmt::Debug for DispatcherBuilder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("registry", &self.registry)
            .finish()
    }
}
