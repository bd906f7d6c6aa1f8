//! Bidirectional entity id ↔ visual handle index.

use std::collections::HashMap;

use super::scene::{EntityKind, HandleId};

/// Key of an entity in the index. Ids are unique per kind.
pub type EntityKey = (EntityKind, String);

/// Maps every attached entity to its visual handle and back.
///
/// The index is the sole authority on identity. Both directions are updated
/// together, so a lookup in one direction always agrees with the other.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    by_entity: HashMap<EntityKey, HandleId>,
    by_handle: HashMap<HandleId, EntityKey>,
}

impl IdentityIndex {
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Associates `key` with `handle`, dropping any previous association of
    /// either side.
    pub fn insert(&mut self, key: EntityKey, handle: HandleId) {
        if let Some(old_handle) = self.by_entity.remove(&key) {
            self.by_handle.remove(&old_handle);
        }
        if let Some(old_key) = self.by_handle.remove(&handle) {
            self.by_entity.remove(&old_key);
        }
        self.by_entity.insert(key.clone(), handle);
        self.by_handle.insert(handle, key);
    }

    pub fn handle_of(&self, kind: EntityKind, id: &str) -> Option<HandleId> {
        self.by_entity.get(&(kind, id.to_string())).copied()
    }

    pub fn entity_of(&self, handle: HandleId) -> Option<(EntityKind, &str)> {
        self.by_handle
            .get(&handle)
            .map(|(kind, id)| (*kind, id.as_str()))
    }

    pub fn remove_handle(&mut self, handle: HandleId) -> Option<EntityKey> {
        let key = self.by_handle.remove(&handle)?;
        self.by_entity.remove(&key);
        Some(key)
    }

    pub fn clear(&mut self) {
        self.by_entity.clear();
        self.by_handle.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_agree_both_ways() {
        let mut index = IdentityIndex::default();
        index.insert((EntityKind::Block, "b1".into()), HandleId::new(3));

        assert_eq!(index.handle_of(EntityKind::Block, "b1"), Some(HandleId::new(3)));
        assert_eq!(index.entity_of(HandleId::new(3)), Some((EntityKind::Block, "b1")));
        assert_eq!(index.handle_of(EntityKind::Annotation, "b1"), None);
    }

    #[test]
    fn test_reinsert_replaces_both_sides() {
        let mut index = IdentityIndex::default();
        index.insert((EntityKind::Block, "b1".into()), HandleId::new(1));
        index.insert((EntityKind::Block, "b1".into()), HandleId::new(2));

        assert_eq!(index.len(), 1);
        assert_eq!(index.entity_of(HandleId::new(1)), None);
        assert_eq!(index.handle_of(EntityKind::Block, "b1"), Some(HandleId::new(2)));
    }

    #[test]
    fn test_remove_handle_purges_entity() {
        let mut index = IdentityIndex::default();
        index.insert((EntityKind::Connection, "c1".into()), HandleId::new(9));
        assert_eq!(
            index.remove_handle(HandleId::new(9)),
            Some((EntityKind::Connection, "c1".to_string()))
        );
        assert!(index.is_empty());
        assert_eq!(index.handle_of(EntityKind::Connection, "c1"), None);
    }
}
