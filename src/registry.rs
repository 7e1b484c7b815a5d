//! Instance registry owned by a world.
//!
//! Keeps, per morph kind, the live nodes of that kind in the order they were
//! attached, so inspectors and reload tooling can enumerate them without
//! ambient global state.

use std::collections::HashMap;

use crate::error::{MorphError, Result};
use crate::tree::NodeId;

#[derive(Debug, Default)]
pub struct Registry {
    by_kind: HashMap<&'static str, Vec<NodeId>>,
    kinds: HashMap<NodeId, &'static str>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding only `root`.
    pub fn with_root(root: NodeId, kind: &'static str) -> Self {
        Self {
            by_kind: HashMap::from([(kind, vec![root])]),
            kinds: HashMap::from([(root, kind)]),
        }
    }

    pub fn register(&mut self, id: NodeId, kind: &'static str) -> Result<()> {
        if self.kinds.contains_key(&id) {
            return Err(MorphError::DuplicateRegistration(id));
        }
        self.kinds.insert(id, kind);
        self.by_kind.entry(kind).or_default().push(id);
        Ok(())
    }

    /// Forget `id`. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: NodeId) -> bool {
        let Some(kind) = self.kinds.remove(&id) else {
            return false;
        };
        if let Some(ids) = self.by_kind.get_mut(kind) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.by_kind.remove(kind);
            }
        }
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.kinds.contains_key(&id)
    }

    pub fn kind_of(&self, id: NodeId) -> Option<&'static str> {
        self.kinds.get(&id).copied()
    }

    /// Live instances of `kind`, oldest first.
    pub fn instances_of(&self, kind: &str) -> &[NodeId] {
        self.by_kind.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph::Morph;
    use crate::tree::Tree;

    fn ids(n: usize) -> Vec<NodeId> {
        let mut tree = Tree::new();
        (0..n).map(|_| tree.insert(Morph::new())).collect()
    }

    #[test]
    fn test_with_root() {
        let ids = ids(2);
        let mut registry = Registry::with_root(ids[0], "World");
        assert_eq!(registry.instances_of("World"), &[ids[0]]);
        assert!(matches!(
            registry.register(ids[0], "World"),
            Err(MorphError::DuplicateRegistration(_))
        ));
        registry.register(ids[1], "World").unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_and_enumerate() {
        let ids = ids(3);
        let mut registry = Registry::new();
        registry.register(ids[0], "Button").unwrap();
        registry.register(ids[1], "Morph").unwrap();
        registry.register(ids[2], "Button").unwrap();

        assert_eq!(registry.instances_of("Button"), &[ids[0], ids[2]]);
        assert_eq!(registry.instances_of("Text"), &[] as &[NodeId]);
        assert_eq!(registry.kind_of(ids[1]), Some("Morph"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_registration() {
        let ids = ids(1);
        let mut registry = Registry::new();
        registry.register(ids[0], "Morph").unwrap();

        let err = registry.register(ids[0], "Button").unwrap_err();
        assert!(matches!(err, MorphError::DuplicateRegistration(id) if id == ids[0]));
        assert_eq!(registry.kind_of(ids[0]), Some("Morph"));
    }

    #[test]
    fn test_unregister() {
        let ids = ids(2);
        let mut registry = Registry::new();
        registry.register(ids[0], "Morph").unwrap();
        registry.register(ids[1], "Morph").unwrap();

        assert!(registry.unregister(ids[0]));
        assert!(!registry.unregister(ids[0]));
        assert_eq!(registry.instances_of("Morph"), &[ids[1]]);

        assert!(registry.unregister(ids[1]));
        assert!(registry.is_empty());
    }
}
