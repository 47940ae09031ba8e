//! The set of event names a dispatcher accepts.
//!
//! A registry is either **dynamic** (any name is accepted and handler tables
//! are created on demand) or **closed** (a fixed allow-list captured at
//! construction). Closed registries turn typos into an immediate
//! [`DispatchError::UnknownEvent`] at subscribe/publish time instead of a
//! silently unheard event.
//!
//! An empty allow-list is treated as dynamic.

use std::collections::HashSet;

use crate::error::{DispatchError, Result};

/// Immutable set of allowed event names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRegistry {
    allowed: Option<HashSet<String>>,
}

impl EventRegistry {
    /// A registry that accepts any event name.
    pub fn dynamic() -> Self {
        Self { allowed: None }
    }

    /// A registry restricted to `names`. Duplicates collapse.
    ///
    /// Passing no names yields a dynamic registry.
    pub fn closed<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let allowed: HashSet<String> = names.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            return Self::dynamic();
        }
        Self {
            allowed: Some(allowed),
        }
    }

    /// True when only a fixed set of names is accepted.
    pub fn is_closed(&self) -> bool {
        self.allowed.is_some()
    }

    /// True if `event` may be subscribed to or published.
    pub fn contains(&self, event: &str) -> bool {
        match &self.allowed {
            Some(allowed) => allowed.contains(event),
            None => true,
        }
    }

    /// Fails with [`DispatchError::UnknownEvent`] if `event` is not accepted.
    pub fn check(&self, event: &str) -> Result<()> {
        if self.contains(event) {
            Ok(())
        } else {
            Err(DispatchError::unknown_event(event))
        }
    }

    /// Number of allowed names (`0` for a dynamic registry).
    pub fn len(&self) -> usize {
        self.allowed.as_ref().map_or(0, HashSet::len)
    }

    /// True for a dynamic registry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of allowed names (empty for a dynamic registry).
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .allowed
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_accepts_anything() {
        let registry = EventRegistry::dynamic();
        assert!(!registry.is_closed());
        assert!(registry.contains("anything"));
        assert!(registry.check("").is_ok());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_closed_registry_stores_names() {
        let registry = EventRegistry::closed(["one", "two"]);
        assert!(registry.is_closed());
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("one"));
        assert!(registry.contains("two"));
        assert_eq!(registry.names(), vec!["one", "two"]);
    }

    #[test]
    fn test_closed_registry_rejects_unknown() {
        let registry = EventRegistry::closed(["a", "b"]);
        let err = registry.check("c").unwrap_err();
        assert_eq!(err, DispatchError::unknown_event("c"));
        assert!(registry.check("a").is_ok());
    }

    #[test]
    fn test_duplicates_collapse() {
        let registry = EventRegistry::closed(vec!["a".to_string(), "a".to_string()]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_list_is_dynamic() {
        let registry = EventRegistry::closed(Vec::<String>::new());
        assert!(!registry.is_closed());
        assert!(registry.contains("whatever"));
    }
}
