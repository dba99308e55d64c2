// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, lifecycle, spatial data, queries.

use alloc::{string::String, vec, vec::Vec};
use kurbo::{Point, Size, Vec2};

use crate::link::{LinkOutcome, LinkRequest, SceneEvent, Verdict};
use crate::types::{NodeId, Placement};

/// A tree of named nodes with cancelable structure changes.
///
/// The scene always contains a root node, created by [`Scene::new`] and never
/// removable. All other nodes are created detached and enter the tree through
/// [`Scene::adopt`]. Structure changes are two-phase: both ends of the link
/// are asked first (see [`LinkRequest`]), and only a fully allowed change is
/// committed. Committed changes report what happened as [`SceneEvent`]s in
/// the order the changes occurred; the scene itself never dispatches
/// callbacks.
///
/// Nodes are addressed by generational [`NodeId`]s. Reads with a stale
/// identifier return `None` (or an empty slice), property writes with one are
/// silently ignored, and structure changes with one panic.
///
/// ## Example
///
/// ```rust
/// use carom_scene::{Placement, Scene, Verdict};
/// use kurbo::{Point, Size};
///
/// let mut scene = Scene::new();
/// let root = scene.root();
/// let table = scene.insert_node("table");
/// let ball = scene.insert_spatial(
///     "ball",
///     Placement::new(Point::new(4.0, 3.0), Size::new(2.0, 2.0)),
/// );
///
/// // Structure changes go through the two-phase protocol.
/// assert!(scene.adopt(root, table).is_committed());
/// assert!(scene.adopt(table, ball).is_committed());
/// assert!(scene.is_connected(ball));
///
/// // A gate can veto a change before anything is touched.
/// let outcome = scene.abandon_with(table, ball, |_, _| Verdict::Veto);
/// assert!(!outcome.is_committed());
/// assert_eq!(scene.parent_of(ball), Some(table));
/// ```
pub struct Scene {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

struct Node {
    generation: u32,
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    connected: bool,
    placement: Option<Placement>,
}

impl Node {
    fn new(generation: u32, name: &str, placement: Option<Placement>) -> Self {
        Self {
            generation,
            name: String::from(name),
            parent: None,
            children: Vec::new(),
            connected: false,
            placement,
        }
    }
}

impl Scene {
    /// Create a scene holding only the root node.
    ///
    /// The root is a plain node named `"root"` and is connected from birth;
    /// everything adopted under it becomes connected too.
    pub fn new() -> Self {
        let mut root = Node::new(1, "root", None);
        root.connected = true;
        Self {
            nodes: vec![Some(root)],
            generations: vec![1],
            free_list: Vec::new(),
            root: NodeId::new(0, 1),
        }
    }

    /// The root node.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached plain node.
    ///
    /// Plain nodes carry no placement; spatial accessors return `None` for
    /// them. Use [`Scene::adopt`] to link the node into the tree.
    pub fn insert_node(&mut self, name: &str) -> NodeId {
        self.alloc(name, None)
    }

    /// Create a detached spatial node with the given placement.
    pub fn insert_spatial(&mut self, name: &str, placement: Placement) -> NodeId {
        self.alloc(name, Some(placement))
    }

    /// Link `child` under `parent`, with no gate.
    ///
    /// Equivalent to [`Scene::adopt_with`] with a gate that allows
    /// everything.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) -> LinkOutcome {
        self.adopt_with(parent, child, |_, _| Verdict::Allow)
    }

    /// Link `child` under `parent`, asking `gate` first.
    ///
    /// The gate is asked twice, parent's side then child's side (see
    /// [`LinkRequest`]); a veto on either cancels the change with the scene
    /// untouched. On commit the events are reported in order: the parent's
    /// [`SceneEvent::AdoptedChild`], the child's [`SceneEvent::Adopted`],
    /// then, if `parent` is connected, one [`SceneEvent::Connected`] per node
    /// of the child's subtree in depth-first order. Adopting under a
    /// disconnected parent defers connection until that parent's subtree
    /// joins the root.
    ///
    /// Panics if either identifier is stale, if `child` is the root or
    /// already has a parent, or if the link would create a cycle.
    pub fn adopt_with(
        &mut self,
        parent: NodeId,
        child: NodeId,
        mut gate: impl FnMut(&Self, &LinkRequest) -> Verdict,
    ) -> LinkOutcome {
        assert!(self.is_alive(parent), "dangling NodeId");
        assert!(self.is_alive(child), "dangling NodeId");
        assert_ne!(parent, child, "a node cannot adopt itself");
        assert_ne!(child, self.root, "the root cannot be adopted");
        assert!(
            self.node(child).parent.is_none(),
            "node already has a parent; abandon it first"
        );
        assert!(
            self.ancestors(parent).all(|ancestor| ancestor != child),
            "adoption would create a cycle"
        );

        let request = LinkRequest::AdoptChild { parent, child };
        if gate(self, &request) == Verdict::Veto {
            return LinkOutcome::Vetoed(request);
        }
        let request = LinkRequest::Adopt { child, parent };
        if gate(self, &request) == Verdict::Veto {
            return LinkOutcome::Vetoed(request);
        }

        self.link_parent(child, parent);
        let mut events = vec![
            SceneEvent::AdoptedChild { parent, child },
            SceneEvent::Adopted { child, parent },
        ];
        if self.node(parent).connected {
            self.connect_subtree(child, &mut events);
        }
        LinkOutcome::Committed(events)
    }

    /// Unlink `child` from `parent`, with no gate.
    pub fn abandon(&mut self, parent: NodeId, child: NodeId) -> LinkOutcome {
        self.abandon_with(parent, child, |_, _| Verdict::Allow)
    }

    /// Unlink `child` from `parent`, asking `gate` first.
    ///
    /// The gate is asked twice, parent's side then child's side; a veto on
    /// either cancels the change. On commit the events are the parent's
    /// [`SceneEvent::AbandonedChild`], the child's [`SceneEvent::Abandoned`],
    /// then one [`SceneEvent::Disconnected`] per node of the child's subtree,
    /// children before parents. Unlike connection, disconnection is not
    /// conditional: a subtree that was never connected still reports it, and
    /// it is never gated on its own.
    ///
    /// Panics if either identifier is stale or if `child` is not currently a
    /// child of `parent`.
    pub fn abandon_with(
        &mut self,
        parent: NodeId,
        child: NodeId,
        mut gate: impl FnMut(&Self, &LinkRequest) -> Verdict,
    ) -> LinkOutcome {
        assert!(self.is_alive(parent), "dangling NodeId");
        assert!(self.is_alive(child), "dangling NodeId");
        assert_eq!(
            self.node(child).parent,
            Some(parent),
            "not a child of the given parent"
        );

        let request = LinkRequest::AbandonChild { parent, child };
        if gate(self, &request) == Verdict::Veto {
            return LinkOutcome::Vetoed(request);
        }
        let request = LinkRequest::Abandon { child, parent };
        if gate(self, &request) == Verdict::Veto {
            return LinkOutcome::Vetoed(request);
        }

        self.unlink_parent(child, parent);
        let mut events = vec![
            SceneEvent::AbandonedChild { parent, child },
            SceneEvent::Abandoned { child, parent },
        ];
        self.disconnect_subtree(child, &mut events);
        LinkOutcome::Committed(events)
    }

    /// Unlink every child of `parent`, with no gate.
    pub fn abandon_all(&mut self, parent: NodeId) -> Vec<LinkOutcome> {
        self.abandon_all_with(parent, |_, _| Verdict::Allow)
    }

    /// Unlink every child of `parent`, gating each child separately.
    ///
    /// Children are processed in their current order; a vetoed child stays
    /// linked and does not stop the rest. One outcome is returned per child.
    pub fn abandon_all_with(
        &mut self,
        parent: NodeId,
        mut gate: impl FnMut(&Self, &LinkRequest) -> Verdict,
    ) -> Vec<LinkOutcome> {
        let children = self.children_of(parent).to_vec();
        children
            .into_iter()
            .map(|child| self.abandon_with(parent, child, &mut gate))
            .collect()
    }

    /// Free a detached node and its whole subtree.
    ///
    /// Every identifier in the subtree becomes stale; slots are reused by
    /// later inserts with a bumped generation. Panics if `id` is stale, is
    /// the root, or still has a parent.
    pub fn discard(&mut self, id: NodeId) {
        assert!(self.is_alive(id), "dangling NodeId");
        assert_ne!(id, self.root, "the root cannot be discarded");
        assert!(
            self.node(id).parent.is_none(),
            "node still has a parent; abandon it first"
        );
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.nodes[current.idx()].take().expect("dangling NodeId");
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
            self.free_list.push(current.idx());
        }
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation
    /// matches the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns the parent of a node if live, or `None` for detached nodes,
    /// the root, or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|node| node.parent)
    }

    /// Get the children of a node, or empty slice if the node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node(id).children
    }

    /// Whether `child` is currently a direct child of `parent`.
    pub fn has_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.children_of(parent).contains(&child)
    }

    /// Whether the node is part of the root's subtree. Stale ids are not.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some_and(|node| node.connected)
    }

    /// The node's name, if live.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id).map(|node| node.name.as_str())
    }

    /// Rename a node. Ignored for stale ids.
    pub fn set_name(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.node_opt_mut(id) {
            node.name = String::from(name);
        }
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Iterate `id` and all nodes below it, depth-first, children in order.
    ///
    /// Yields nothing for a stale id.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = if self.is_alive(id) { vec![id] } else { Vec::new() };
        Descendants { scene: self, stack }
    }

    /// Iterate the chain of parents above `id`, nearest first.
    ///
    /// The node itself is not included. Yields nothing for detached nodes,
    /// the root, or stale ids.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            current: self.parent_of(id),
        }
    }

    /// The node's placement, or `None` for plain nodes and stale ids.
    pub fn placement(&self, id: NodeId) -> Option<Placement> {
        self.node_opt(id).and_then(|node| node.placement)
    }

    /// The node's local position, or `None` for plain nodes and stale ids.
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.placement(id).map(|placement| placement.position)
    }

    /// The node's size, or `None` for plain nodes and stale ids.
    pub fn size(&self, id: NodeId) -> Option<Size> {
        self.placement(id).map(|placement| placement.size)
    }

    /// Replace the node's placement. Ignored for stale ids; panics on a
    /// plain node.
    pub fn set_placement(&mut self, id: NodeId, placement: Placement) {
        if let Some(node) = self.node_opt_mut(id) {
            assert!(node.placement.is_some(), "node has no placement");
            node.placement = Some(placement);
        }
    }

    /// Update the node's local position. Ignored for stale ids; panics on a
    /// plain node.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        if let Some(node) = self.node_opt_mut(id) {
            let placement = node.placement.as_mut().expect("node has no placement");
            placement.position = position;
        }
    }

    /// Update the node's size. Ignored for stale ids; panics on a plain
    /// node.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        if let Some(node) = self.node_opt_mut(id) {
            let placement = node.placement.as_mut().expect("node has no placement");
            placement.size = size;
        }
    }

    /// The node's position with every spatial ancestor's position added in.
    ///
    /// The chain stops at the first plain or parent-less ancestor, so a
    /// spatial subtree hanging off a plain node measures from that node.
    /// Returns `None` for plain nodes and stale ids.
    pub fn global_position(&self, id: NodeId) -> Option<Point> {
        let node = self.node_opt(id)?;
        let placement = node.placement?;
        let mut global = placement.position;
        let mut current = node.parent;
        while let Some(ancestor_id) = current {
            let ancestor = self.node(ancestor_id);
            let Some(ancestor_placement) = ancestor.placement else {
                break;
            };
            global += ancestor_placement.position.to_vec2();
            current = ancestor.parent;
        }
        Some(global)
    }

    /// Move the node so its global position becomes `global`.
    ///
    /// The local position is solved against the current ancestor chain.
    /// Ignored for stale ids; panics on a plain node.
    pub fn set_global_position(&mut self, id: NodeId, global: Point) {
        if !self.is_alive(id) {
            return;
        }
        let offset = self
            .parent_of(id)
            .and_then(|parent| self.global_position(parent))
            .map_or(Vec2::ZERO, Point::to_vec2);
        self.set_position(id, global - offset);
    }
}

/// Depth-first iterator over a node and its subtree.
///
/// Returned by [`Scene::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    scene: &'a Scene,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        // The `.rev()` means children are yielded in the order they are held.
        for &child in self.scene.node(current).children.iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}

/// Parent-chain iterator, nearest ancestor first.
///
/// Returned by [`Scene::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    scene: &'a Scene,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.scene.node(id).parent;
        Some(id)
    }
}

impl Scene {
    // --- internals ---

    fn alloc(&mut self, name: &str, placement: Option<Placement>) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, name, placement));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, name, placement)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    /// Flag the subtree connected and report each node, parents before
    /// children.
    fn connect_subtree(&mut self, id: NodeId, events: &mut Vec<SceneEvent>) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node_mut(current);
            node.connected = true;
            events.push(SceneEvent::Connected(current));
            // The `.rev()` means we visit the children in the order they are
            // held in `node.children`.
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
    }

    /// Flag the subtree disconnected and report each node, children before
    /// parents.
    fn disconnect_subtree(&mut self, id: NodeId, events: &mut Vec<SceneEvent>) {
        // Each node is pushed unvisited to flag it, then once more to emit
        // its event after its whole subtree has been emitted.
        let mut stack = vec![(id, false)];
        while let Some((current, visited)) = stack.pop() {
            if visited {
                events.push(SceneEvent::Disconnected(current));
                continue;
            }
            let node = self.node_mut(current);
            node.connected = false;
            stack.push((current, true));
            for &child in node.children.iter().rev() {
                stack.push((child, false));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn spatial(scene: &mut Scene, name: &str, x: f64, y: f64, w: f64, h: f64) -> NodeId {
        scene.insert_spatial(name, Placement::new(Point::new(x, y), Size::new(w, h)))
    }

    #[test]
    fn adopt_links_and_reports() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");

        let LinkOutcome::Committed(events) = scene.adopt(root, a) else {
            panic!("adopt was vetoed");
        };
        assert_eq!(
            events,
            vec![
                SceneEvent::AdoptedChild { parent: root, child: a },
                SceneEvent::Adopted { child: a, parent: root },
                SceneEvent::Connected(a),
            ]
        );
        assert_eq!(scene.parent_of(a), Some(root));
        assert!(scene.has_child(root, a));
        assert!(scene.is_connected(a));
    }

    #[test]
    fn adopt_under_detached_parent_defers_connection() {
        let mut scene = Scene::new();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");

        let LinkOutcome::Committed(events) = scene.adopt(a, b) else {
            panic!("adopt was vetoed");
        };
        assert_eq!(
            events,
            vec![
                SceneEvent::AdoptedChild { parent: a, child: b },
                SceneEvent::Adopted { child: b, parent: a },
            ]
        );
        assert!(!scene.is_connected(b));
    }

    #[test]
    fn adopt_connects_whole_subtree_in_depth_first_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        // Detached subtree: a -> [b -> [x], c].
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        let c = scene.insert_node("c");
        let x = scene.insert_node("x");
        scene.adopt(a, b);
        scene.adopt(b, x);
        scene.adopt(a, c);

        let LinkOutcome::Committed(events) = scene.adopt(root, a) else {
            panic!("adopt was vetoed");
        };
        assert_eq!(
            events,
            vec![
                SceneEvent::AdoptedChild { parent: root, child: a },
                SceneEvent::Adopted { child: a, parent: root },
                SceneEvent::Connected(a),
                SceneEvent::Connected(b),
                SceneEvent::Connected(x),
                SceneEvent::Connected(c),
            ]
        );
    }

    #[test]
    fn gate_sees_both_sides_in_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");

        let mut log = Vec::new();
        let outcome = scene.adopt_with(root, a, |_, request| {
            log.push(*request);
            Verdict::Allow
        });
        assert!(outcome.is_committed());
        assert_eq!(
            log,
            vec![
                LinkRequest::AdoptChild { parent: root, child: a },
                LinkRequest::Adopt { child: a, parent: root },
            ]
        );
    }

    #[test]
    fn parent_side_veto_leaves_scene_untouched() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");

        let mut asked = 0;
        let outcome = scene.adopt_with(root, a, |_, _| {
            asked += 1;
            Verdict::Veto
        });
        assert_eq!(asked, 1, "the child's side must not be asked after a veto");
        assert_eq!(
            outcome,
            LinkOutcome::Vetoed(LinkRequest::AdoptChild { parent: root, child: a })
        );
        assert_eq!(scene.parent_of(a), None);
        assert!(!scene.has_child(root, a));
        assert!(!scene.is_connected(a));
    }

    #[test]
    fn child_side_veto_cancels_the_change() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");

        let outcome = scene.adopt_with(root, a, |_, request| match request {
            LinkRequest::Adopt { .. } => Verdict::Veto,
            _ => Verdict::Allow,
        });
        assert_eq!(
            outcome,
            LinkOutcome::Vetoed(LinkRequest::Adopt { child: a, parent: root })
        );
        assert!(scene.children_of(root).is_empty());
    }

    #[test]
    fn gate_observes_the_scene_before_commit() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");

        scene.adopt_with(root, a, |scene, _| {
            assert!(scene.children_of(scene.root()).is_empty());
            Verdict::Allow
        });
        assert_eq!(scene.children_of(root), [a]);
    }

    #[test]
    fn abandon_unlinks_and_reports_children_first() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        scene.adopt(root, a);
        scene.adopt(a, b);

        let mut log = Vec::new();
        let LinkOutcome::Committed(events) = scene.abandon_with(root, a, |_, request| {
            log.push(*request);
            Verdict::Allow
        }) else {
            panic!("abandon was vetoed");
        };
        assert_eq!(
            log,
            vec![
                LinkRequest::AbandonChild { parent: root, child: a },
                LinkRequest::Abandon { child: a, parent: root },
            ]
        );
        assert_eq!(
            events,
            vec![
                SceneEvent::AbandonedChild { parent: root, child: a },
                SceneEvent::Abandoned { child: a, parent: root },
                SceneEvent::Disconnected(b),
                SceneEvent::Disconnected(a),
            ]
        );
        assert_eq!(scene.parent_of(a), None);
        assert!(!scene.is_connected(a));
        assert!(!scene.is_connected(b));
        assert!(scene.has_child(a, b), "the departing subtree keeps its own links");
    }

    #[test]
    fn abandon_disconnects_deep_subtree_children_first() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        let c = scene.insert_node("c");
        let x = scene.insert_node("x");
        scene.adopt(root, a);
        scene.adopt(a, b);
        scene.adopt(b, x);
        scene.adopt(a, c);

        let LinkOutcome::Committed(events) = scene.abandon(root, a) else {
            panic!("abandon was vetoed");
        };
        assert_eq!(
            events[2..],
            [
                SceneEvent::Disconnected(x),
                SceneEvent::Disconnected(b),
                SceneEvent::Disconnected(c),
                SceneEvent::Disconnected(a),
            ]
        );
    }

    #[test]
    fn abandon_of_detached_subtree_still_reports_disconnection() {
        let mut scene = Scene::new();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        scene.adopt(a, b);
        assert!(!scene.is_connected(b), "never linked to the root");

        // Connection is conditional on the parent, but disconnection is not:
        // even a subtree that was never connected reports it on abandonment.
        let LinkOutcome::Committed(events) = scene.abandon(a, b) else {
            panic!("abandon was vetoed");
        };
        assert_eq!(
            events,
            vec![
                SceneEvent::AbandonedChild { parent: a, child: b },
                SceneEvent::Abandoned { child: b, parent: a },
                SceneEvent::Disconnected(b),
            ]
        );
    }

    #[test]
    fn abandon_veto_preserves_the_link() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        scene.adopt(root, a);

        let outcome = scene.abandon_with(root, a, |_, _| Verdict::Veto);
        assert_eq!(
            outcome,
            LinkOutcome::Vetoed(LinkRequest::AbandonChild { parent: root, child: a })
        );
        assert_eq!(scene.parent_of(a), Some(root));
        assert!(scene.is_connected(a));
    }

    #[test]
    fn abandon_all_releases_children_in_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        let c = scene.insert_node("c");
        scene.adopt(root, a);
        scene.adopt(root, b);
        scene.adopt(root, c);

        let outcomes = scene.abandon_all(root);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            outcomes[0].events()[0],
            SceneEvent::AbandonedChild { parent: root, child: a }
        );
        assert_eq!(
            outcomes[2].events()[0],
            SceneEvent::AbandonedChild { parent: root, child: c }
        );
        assert!(scene.children_of(root).is_empty());
    }

    #[test]
    fn abandon_all_with_selective_gate_keeps_vetoed_children() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        let c = scene.insert_node("c");
        scene.adopt(root, a);
        scene.adopt(root, b);
        scene.adopt(root, c);

        let outcomes = scene.abandon_all_with(root, |_, request| match *request {
            LinkRequest::AbandonChild { child, .. } if child == b => Verdict::Veto,
            _ => Verdict::Allow,
        });
        assert!(outcomes[0].is_committed());
        assert!(!outcomes[1].is_committed());
        assert!(outcomes[2].is_committed());
        assert_eq!(scene.children_of(root), [b]);
    }

    #[test]
    fn readoption_reconnects() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        scene.adopt(root, a);
        scene.abandon(root, a);
        assert!(!scene.is_connected(a));

        let LinkOutcome::Committed(events) = scene.adopt(root, a) else {
            panic!("adopt was vetoed");
        };
        assert_eq!(events[2], SceneEvent::Connected(a));
        assert!(scene.is_connected(a));
    }

    #[test]
    #[should_panic(expected = "a node cannot adopt itself")]
    fn self_adoption_panics() {
        let mut scene = Scene::new();
        let a = scene.insert_node("a");
        scene.adopt(a, a);
    }

    #[test]
    #[should_panic(expected = "the root cannot be adopted")]
    fn adopting_the_root_panics() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        scene.adopt(a, root);
    }

    #[test]
    #[should_panic(expected = "node already has a parent")]
    fn double_adoption_panics() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        scene.adopt(root, a);
        scene.adopt(root, b);
        scene.adopt(b, a);
    }

    #[test]
    #[should_panic(expected = "adoption would create a cycle")]
    fn cyclic_adoption_panics() {
        let mut scene = Scene::new();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        scene.adopt(a, b);
        scene.adopt(b, a);
    }

    #[test]
    #[should_panic(expected = "dangling NodeId")]
    fn adopting_a_discarded_node_panics() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        scene.discard(a);
        scene.adopt(root, a);
    }

    #[test]
    #[should_panic(expected = "not a child of the given parent")]
    fn abandoning_a_non_child_panics() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        scene.adopt(root, a);
        scene.abandon(a, b);
    }

    #[test]
    #[should_panic(expected = "the root cannot be discarded")]
    fn discarding_the_root_panics() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.discard(root);
    }

    #[test]
    #[should_panic(expected = "node still has a parent")]
    fn discarding_an_attached_node_panics() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.insert_node("a");
        scene.adopt(root, a);
        scene.discard(a);
    }

    #[test]
    fn discard_frees_the_whole_subtree() {
        let mut scene = Scene::new();
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        let c = scene.insert_node("c");
        scene.adopt(a, b);
        scene.adopt(a, c);
        assert_eq!(scene.node_count(), 4);

        scene.discard(a);
        assert!(!scene.is_alive(a));
        assert!(!scene.is_alive(b));
        assert!(!scene.is_alive(c));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn liveness_insert_discard_reuse() {
        let mut scene = Scene::new();
        let a = scene.insert_node("a");
        assert!(scene.is_alive(a));

        scene.discard(a);
        assert!(!scene.is_alive(a));

        // A new node might reuse the slot, but the generation bumps.
        let b = scene.insert_node("b");
        assert!(scene.is_alive(b));
        assert!(!scene.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn names_respect_liveness() {
        let mut scene = Scene::new();
        let root = scene.root();
        assert_eq!(scene.name(root), Some("root"));

        let a = scene.insert_node("a");
        scene.set_name(a, "anvil");
        assert_eq!(scene.name(a), Some("anvil"));

        scene.discard(a);
        assert_eq!(scene.name(a), None);
        // Renaming a stale id is silently ignored.
        scene.set_name(a, "ghost");
    }

    #[test]
    fn descendants_in_depth_first_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        // root -> [a -> [c, d], b]
        let a = scene.insert_node("a");
        let b = scene.insert_node("b");
        let c = scene.insert_node("c");
        let d = scene.insert_node("d");
        scene.adopt(root, a);
        scene.adopt(root, b);
        scene.adopt(a, c);
        scene.adopt(a, d);

        let order: Vec<NodeId> = scene.descendants(root).collect();
        assert_eq!(order, vec![root, a, c, d, b]);

        let chain: Vec<NodeId> = scene.ancestors(c).collect();
        assert_eq!(chain, vec![a, root]);

        scene.abandon(root, a);
        scene.discard(a);
        assert_eq!(scene.descendants(a).count(), 0);
    }

    #[test]
    fn spatial_accessors_respect_node_kind_and_liveness() {
        let mut scene = Scene::new();
        let plain = scene.insert_node("plain");
        let ball = spatial(&mut scene, "ball", 4.0, 3.0, 2.0, 2.0);

        assert_eq!(scene.position(plain), None);
        assert_eq!(scene.size(plain), None);
        assert_eq!(scene.position(ball), Some(Point::new(4.0, 3.0)));
        assert_eq!(scene.size(ball), Some(Size::new(2.0, 2.0)));

        scene.set_position(ball, Point::new(7.0, 8.0));
        scene.set_size(ball, Size::new(5.0, 5.0));
        assert_eq!(
            scene.placement(ball),
            Some(Placement::new(Point::new(7.0, 8.0), Size::new(5.0, 5.0)))
        );

        scene.discard(ball);
        assert_eq!(scene.position(ball), None);
        // Writes through a stale id are silently ignored.
        scene.set_position(ball, Point::new(1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "node has no placement")]
    fn positioning_a_plain_node_panics() {
        let mut scene = Scene::new();
        let plain = scene.insert_node("plain");
        scene.set_position(plain, Point::new(1.0, 1.0));
    }

    #[test]
    fn global_position_chains_spatial_ancestors() {
        let mut scene = Scene::new();
        let root = scene.root();
        let table = spatial(&mut scene, "table", 10.0, 20.0, 40.0, 40.0);
        let ball = spatial(&mut scene, "ball", 1.0, 2.0, 2.0, 2.0);
        scene.adopt(root, table);
        scene.adopt(table, ball);

        // The root is plain, so the chain starts at `table`.
        assert_eq!(scene.global_position(table), Some(Point::new(10.0, 20.0)));
        assert_eq!(scene.global_position(ball), Some(Point::new(11.0, 22.0)));
    }

    #[test]
    fn global_position_stops_at_a_plain_ancestor() {
        let mut scene = Scene::new();
        let root = scene.root();
        let table = spatial(&mut scene, "table", 10.0, 20.0, 40.0, 40.0);
        let shelf = scene.insert_node("shelf");
        let cup = spatial(&mut scene, "cup", 1.0, 2.0, 1.0, 1.0);
        scene.adopt(root, table);
        scene.adopt(table, shelf);
        scene.adopt(shelf, cup);

        // `shelf` is plain, so `cup` measures from `shelf` and the positions
        // above it do not contribute.
        assert_eq!(scene.global_position(cup), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn set_global_position_solves_against_the_ancestor_chain() {
        let mut scene = Scene::new();
        let root = scene.root();
        let table = spatial(&mut scene, "table", 10.0, 20.0, 40.0, 40.0);
        let ball = spatial(&mut scene, "ball", 1.0, 2.0, 2.0, 2.0);
        scene.adopt(root, table);
        scene.adopt(table, ball);

        scene.set_global_position(ball, Point::new(0.0, 0.0));
        assert_eq!(scene.position(ball), Some(Point::new(-10.0, -20.0)));
        assert_eq!(scene.global_position(ball), Some(Point::new(0.0, 0.0)));

        // Without spatial ancestors, global and local coincide.
        let free = spatial(&mut scene, "free", 0.0, 0.0, 1.0, 1.0);
        scene.adopt(root, free);
        scene.set_global_position(free, Point::new(6.0, 7.0));
        assert_eq!(scene.position(free), Some(Point::new(6.0, 7.0)));
    }
}
