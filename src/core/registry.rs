//! # Type-erased group registry.
//!
//! Maps each [`EventType`] to the [`Group`] created for it. Groups are stored
//! behind [`AnyGroup`] and recovered with a checked downcast; asking for a type
//! id under a different concrete kind than the one it was created with is a
//! [`DispatchError::Conflict`].
//!
//! ## Rules
//! - One group per type id, created lazily by the first subscriber.
//! - Groups are never removed.
//! - Lookups take a read lock; only group creation takes the write lock.

use std::any::type_name;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::group::{AnyGroup, Group};
use crate::error::DispatchError;
use crate::events::{Event, EventType};

/// Registered group and the concrete event kind it was created for.
struct Entry {
    group: Arc<dyn AnyGroup>,
    kind: &'static str,
}

/// Registry of groups keyed by type id.
pub(crate) struct Registry {
    groups: RwLock<HashMap<EventType, Entry>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the group for `event_type` if one exists.
    ///
    /// `Some(Err(..))` means the id is bound to another kind.
    pub(crate) fn get<T: Event>(
        &self,
        event_type: EventType,
    ) -> Option<Result<Arc<Group<T>>, DispatchError>> {
        let groups = self.groups.read().unwrap_or_else(PoisonError::into_inner);
        groups.get(&event_type).map(|entry| downcast(event_type, entry))
    }

    /// Returns the group for `event_type`, creating it with `make` if absent.
    ///
    /// The flag is `true` when this call created the group.
    pub(crate) fn get_or_create<T, F>(
        &self,
        event_type: EventType,
        make: F,
    ) -> Result<(Arc<Group<T>>, bool), DispatchError>
    where
        T: Event,
        F: FnOnce() -> Group<T>,
    {
        if let Some(found) = self.get::<T>(event_type) {
            return found.map(|group| (group, false));
        }

        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = groups.get(&event_type) {
            return downcast(event_type, entry).map(|group| (group, false));
        }

        let group = Arc::new(make());
        groups.insert(
            event_type,
            Entry {
                group: Arc::clone(&group) as Arc<dyn AnyGroup>,
                kind: type_name::<T>(),
            },
        );
        Ok((group, true))
    }

    /// Number of live consumers for `event_type` (0 if no group exists).
    pub(crate) fn count(&self, event_type: EventType) -> usize {
        let groups = self.groups.read().unwrap_or_else(PoisonError::into_inner);
        groups
            .get(&event_type)
            .map(|entry| entry.group.count())
            .unwrap_or(0)
    }

    /// Number of groups created so far.
    pub(crate) fn len(&self) -> usize {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn downcast<T: Event>(event_type: EventType, entry: &Entry) -> Result<Arc<Group<T>>, DispatchError> {
    Arc::clone(&entry.group)
        .as_any()
        .downcast::<Group<T>>()
        .map_err(|_| DispatchError::Conflict {
            event_type,
            want: type_name::<T>(),
            registered: entry.kind,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Ping;

    impl Event for Ping {
        const TYPE: EventType = 7;
    }

    #[derive(Clone, Debug)]
    struct Pong;

    impl Event for Pong {
        const TYPE: EventType = 7;
    }

    #[test]
    fn test_first_lookup_creates_later_lookups_reuse() {
        let registry = Registry::new();
        let (first, created) = registry
            .get_or_create::<Ping, _>(7, || Group::new(7, 8))
            .unwrap();
        assert!(created);

        let (second, created) = registry
            .get_or_create::<Ping, _>(7, || unreachable!("group already exists"))
            .unwrap();
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflicting_kind_is_rejected() {
        let registry = Registry::new();
        registry
            .get_or_create::<Ping, _>(7, || Group::new(7, 8))
            .unwrap();

        let err = registry
            .get_or_create::<Pong, _>(7, || Group::new(7, 8))
            .unwrap_err();
        match err {
            DispatchError::Conflict {
                event_type,
                want,
                registered,
            } => {
                assert_eq!(event_type, 7);
                assert!(want.ends_with("Pong"));
                assert!(registered.ends_with("Ping"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(registry.get::<Pong>(7), Some(Err(_))));
    }

    #[test]
    fn test_missing_group_counts_zero() {
        let registry = Registry::new();
        assert!(registry.get::<Ping>(99).is_none());
        assert_eq!(registry.count(99), 0);
    }
}
