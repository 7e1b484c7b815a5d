//! Arena-based morph storage.
//!
//! Every morph of a world lives in one dense vector; stable [`NodeId`]s map
//! to dense slots through a sparse table. Parent/child links are kept next to
//! each morph and nothing else about placement is cached, so positions are
//! always derived from these links.
//!
//! Ids carry a generation so a handle to a removed morph never resolves to
//! whatever later reuses its slot. Removal swaps the last dense entry into
//! the hole. A node's children are ordered by insertion, which is also their
//! z-order: the last child is on top.

use crate::morph::Morph;

/// Stable handle to a morph. Stale handles (to removed morphs) resolve to
/// nothing, even after their slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

struct Node {
    morph: Morph,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Slot in `sparse` pointing back here
    sparse_index: u32,
}

pub struct Tree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    free_indices: Vec<u32>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    /// Store a morph and return its id. The new node has no parent.
    pub fn insert(&mut self, morph: Morph) -> NodeId {
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            // Reuse a freed slot - bump the generation stored on removal
            let old_gen = self.sparse[idx as usize]
                .as_ref()
                .map(|e| e.generation)
                .unwrap_or(0);
            (idx, old_gen)
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(None);
            (idx, 0)
        };

        let dense_index = self.dense.len();
        self.dense.push(Node {
            morph,
            parent: None,
            children: Vec::new(),
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });

        NodeId::new(sparse_index, generation)
    }

    /// Remove a single node and return its morph.
    ///
    /// The node is unlinked from its parent. Its children keep pointing at the
    /// removed id; callers removing a subtree remove the children as well.
    pub fn remove(&mut self, id: NodeId) -> Option<Morph> {
        let dense_index = self.get_dense_index(id)?;

        if let Some(parent_id) = self.dense[dense_index].parent {
            if let Some(parent_dense) = self.get_dense_index(parent_id) {
                self.dense[parent_dense].children.retain(|&c| c != id);
            }
        }

        let last_dense_index = self.dense.len() - 1;
        let removed = self.dense.swap_remove(dense_index);

        // Fix up the moved node's sparse entry
        if dense_index != last_dense_index {
            let moved_sparse_idx = self.dense[dense_index].sparse_index;
            if let Some(ref mut entry) = self.sparse[moved_sparse_idx as usize] {
                entry.dense_index = dense_index;
            }
        }

        // Keep a tombstone carrying the next generation for slot reuse
        self.sparse[id.index as usize] = Some(SparseEntry {
            dense_index: usize::MAX,
            generation: id.generation.wrapping_add(1),
        });
        self.free_indices.push(id.index);

        Some(removed.morph)
    }

    fn get_dense_index(&self, id: NodeId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation && e.dense_index != usize::MAX)
            .map(|e| e.dense_index)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get_dense_index(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Morph> {
        self.get_dense_index(id).map(|idx| &self.dense[idx].morph)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Morph> {
        self.get_dense_index(id)
            .map(move |idx| &mut self.dense[idx].morph)
    }

    /// Append `child` to `parent`'s children, detaching it from any previous parent.
    pub fn set_parent(&mut self, child_id: NodeId, parent_id: NodeId) {
        if !self.contains(parent_id) {
            return;
        }
        let Some(child_dense) = self.get_dense_index(child_id) else {
            return;
        };

        if let Some(old_parent) = self.dense[child_dense].parent {
            if let Some(old_dense) = self.get_dense_index(old_parent) {
                self.dense[old_dense].children.retain(|&c| c != child_id);
            }
        }
        self.dense[child_dense].parent = Some(parent_id);

        if let Some(parent_dense) = self.get_dense_index(parent_id) {
            let children = &mut self.dense[parent_dense].children;
            if !children.contains(&child_id) {
                children.push(child_id);
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get_dense_index(id)
            .and_then(|idx| self.dense[idx].parent)
    }

    /// Children in insertion (z) order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get_dense_index(id)
            .map(|idx| self.dense[idx].children.as_slice())
            .unwrap_or(&[])
    }

    /// The parentless ancestor of `id` (or `id` itself).
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        if !self.contains(current) {
            return None;
        }
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// `id` followed by all of its descendants, depth-first pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
