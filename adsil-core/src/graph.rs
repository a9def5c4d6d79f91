//! The scene graph: an arena of transform nodes with lazy global-transform
//! recomputation, per §3/§4.B's `TransformNode` invariants.
//!
//! Modeled as an arena (`Vec<NodeSlot>`) indexed by [`NodeId`] rather than
//! `Rc<RefCell<..>>` with a `Weak` parent pointer, per the design note in
//! §9: this keeps mutation and dirty-propagation as plain graph walks with
//! no interior mutability or reference-counting overhead.

use crate::error::AdsilError;
use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

struct NodeSlot {
    local: Transform,
    global_cache: Transform,
    dirty: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Default)]
pub struct SceneGraph {
    nodes: Vec<NodeSlot>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new root node (no parent) with the given local transform.
    pub fn insert(&mut self, local: Transform) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeSlot {
            local,
            global_cache: local,
            dirty: false,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn local(&self, id: NodeId) -> Transform {
        self.slot(id).local
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slot(id).children
    }

    /// Whether `id`'s global transform is stale (needs a [`Self::global`]
    /// recompute). Used by mesh caches that must invalidate whenever their
    /// owning node's pose changes.
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.slot(id).dirty
    }

    /// Set a node's local transform, dirtying it and every transitive
    /// descendant before returning (invariant 2).
    pub fn set_local(&mut self, id: NodeId, local: Transform) {
        self.slot_mut(id).local = local;
        self.dirty_subtree(id);
    }

    /// Lazily recompute (if dirty) and return the global transform:
    /// `parent.global ∘ local`, or `local` for a root.
    pub fn global(&mut self, id: NodeId) -> Transform {
        if self.slot(id).dirty {
            let parent = self.slot(id).parent;
            let local = self.slot(id).local;
            let global = match parent {
                Some(p) => self.global(p).compose(&local),
                None => local,
            };
            let slot = self.slot_mut(id);
            slot.global_cache = global;
            slot.dirty = false;
        }
        self.slot(id).global_cache
    }

    /// Reparent `id` under `new_parent` (or detach to root if `None`).
    /// Fails with [`AdsilError::State`] if `new_parent` is a descendant of
    /// `id` (would create a cycle).
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), AdsilError> {
        if let Some(p) = new_parent {
            if p == id || self.is_descendant(id, p) {
                return Err(AdsilError::State(
                    "setParent would create a cycle".to_string(),
                ));
            }
        }

        if let Some(old_parent) = self.slot(id).parent {
            self.slot_mut(old_parent).children.retain(|&c| c != id);
        }

        self.slot_mut(id).parent = new_parent;
        if let Some(p) = new_parent {
            self.slot_mut(p).children.push(id);
        }

        self.dirty_subtree(id);
        Ok(())
    }

    /// Detach `id` from its parent, turning it into a root. Equivalent to
    /// `set_parent(id, None)`.
    pub fn remove_from_parent(&mut self, id: NodeId) {
        let _ = self.set_parent(id, None);
    }

    /// True iff `candidate` is in the subtree rooted at `ancestor`
    /// (including `ancestor` itself).
    fn is_descendant(&self, ancestor: NodeId, candidate: NodeId) -> bool {
        if ancestor == candidate {
            return true;
        }
        self.slot(ancestor)
            .children
            .iter()
            .any(|&c| self.is_descendant(c, candidate))
    }

    /// Breadth-first walk marking `id` and every transitive descendant
    /// dirty. Runs to completion before `set_local`/`set_parent` return.
    fn dirty_subtree(&mut self, id: NodeId) {
        let mut queue = vec![id];
        while let Some(node) = queue.pop() {
            self.slot_mut(node).dirty = true;
            queue.extend_from_slice(&self.slot(node).children);
        }
    }

    fn slot(&self, id: NodeId) -> &NodeSlot {
        &self.nodes[id.0 as usize]
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut NodeSlot {
        &mut self.nodes[id.0 as usize]
    }
}
