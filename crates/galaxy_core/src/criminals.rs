//! Criminal registry.
//!
//! Entities that attack others get flagged for a while. Flagged entities are
//! fair game for police; the flag decays one step per tick.

use std::collections::BTreeMap;

use crate::entity::EntityId;

/// Ticks a fresh flag lasts.
pub const DEFAULT_TIMEOUT: i32 = 40;

/// Flagged entities and their remaining timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CriminalRegistry {
    timeouts: BTreeMap<EntityId, i32>,
    timeout: i32,
}

impl Default for CriminalRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl CriminalRegistry {
    /// An empty registry whose flags last `timeout` ticks.
    #[must_use]
    pub const fn new(timeout: i32) -> Self {
        Self {
            timeouts: BTreeMap::new(),
            timeout,
        }
    }

    /// Flag an entity, resetting its timeout if already flagged.
    pub fn add_criminal(&mut self, id: EntityId) {
        self.timeouts.insert(id, self.timeout);
    }

    /// Clear an entity's flag.
    pub fn remove_criminal(&mut self, id: EntityId) {
        self.timeouts.remove(&id);
    }

    /// Whether an entity is flagged.
    #[must_use]
    pub fn is_criminal(&self, id: EntityId) -> bool {
        self.timeouts.contains_key(&id)
    }

    /// Remaining timeout for an entity.
    #[must_use]
    pub fn timeout(&self, id: EntityId) -> Option<i32> {
        self.timeouts.get(&id).copied()
    }

    /// Age every flag by one tick, dropping the expired ones.
    pub fn update_criminals(&mut self) {
        self.timeouts.retain(|_, remaining| {
            *remaining -= 1;
            *remaining > 0
        });
    }

    /// Number of flagged entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timeouts.len()
    }

    /// Whether nobody is flagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timeouts.is_empty()
    }

    /// Flagged ids with their timeouts, ascending by id.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, i32)> + '_ {
        self.timeouts.iter().map(|(id, t)| (*id, *t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_after_timeout() {
        let mut registry = CriminalRegistry::default();
        registry.add_criminal(7);

        for _ in 0..39 {
            registry.update_criminals();
        }
        assert!(registry.is_criminal(7));
        assert_eq!(registry.timeout(7), Some(1));

        registry.update_criminals();
        assert!(!registry.is_criminal(7));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_re_adding_resets_timeout() {
        let mut registry = CriminalRegistry::new(5);
        registry.add_criminal(1);
        registry.update_criminals();
        registry.update_criminals();
        registry.add_criminal(1);
        assert_eq!(registry.timeout(1), Some(5));
    }

    #[test]
    fn test_remove() {
        let mut registry = CriminalRegistry::default();
        registry.add_criminal(3);
        registry.add_criminal(4);
        registry.remove_criminal(3);
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![(4, DEFAULT_TIMEOUT)]);
        assert_eq!(registry.len(), 1);
    }
}
