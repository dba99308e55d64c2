// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The simulation world: scene ownership, the body registry, and stepping.

use alloc::vec::Vec;

use carom_scene::{LinkOutcome, LinkRequest, NodeId, Placement, Scene, SceneEvent, Verdict};
use hashbrown::HashMap;
use kurbo::{Point, Rect, Size, Vec2};

use crate::body::{Body, ForceId};

/// A contact transition reported by [`World::step`].
///
/// Every transition is reported from both sides: one event naming each body
/// of the pair first. On the tick a pair starts overlapping, both
/// [`ContactEvent::Began`] events are followed by both
/// [`ContactEvent::Continued`] events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContactEvent {
    /// The pair overlaps this tick and did not the tick before.
    Began {
        /// The body this event is reported for.
        body: NodeId,
        /// The body it touched.
        other: NodeId,
    },
    /// The pair overlaps this tick.
    Continued {
        /// The body this event is reported for.
        body: NodeId,
        /// The body it is still touching.
        other: NodeId,
    },
    /// The pair stopped overlapping, or one side left the simulation.
    Ended {
        /// The body this event is reported for.
        body: NodeId,
        /// The body it separated from.
        other: NodeId,
    },
}

/// A scene plus the physics running over it.
///
/// The world owns a [`Scene`] and drives bodies in it: nodes created with
/// [`World::insert_body`] carry mass, velocity, and a force table. All
/// structure changes go through the world's delegates ([`World::adopt`],
/// [`World::abandon`], ...), which forward to the scene and track which
/// bodies are connected; only connected bodies move and collide. Reads go
/// straight to [`World::scene`].
///
/// [`World::step`] advances one tick: integrate every enrolled body, then
/// run one collision pass and return the tick's [`ContactEvent`]s. The pass
/// detects and reports; reacting (bouncing, say) is the caller's job, see
/// [`crate::resolve`].
///
/// ## Example
///
/// ```rust
/// use carom_dynamics::World;
/// use carom_scene::Placement;
/// use kurbo::{Point, Size, Vec2};
///
/// let mut world = World::new();
/// let root = world.root();
/// let ball = world.insert_body(
///     "ball",
///     Placement::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0)),
/// );
/// world.adopt(root, ball);
/// world.set_velocity(ball, Vec2::new(5.0, 0.0));
///
/// let report = world.step(1.0);
/// assert!(report.is_empty());
/// assert_eq!(world.scene().position(ball), Some(Point::new(5.0, 0.0)));
/// ```
pub struct World {
    scene: Scene,
    bodies: HashMap<NodeId, Body>,
    /// Bodies eligible for integration and the collision pass, in
    /// enrollment order.
    roster: Vec<NodeId>,
    /// Contact ends queued by withdrawals, delivered by the next step.
    pending: Vec<ContactEvent>,
    next_force: u64,
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("scene", &self.scene)
            .field("bodies", &self.bodies.len())
            .field("enrolled", &self.roster.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a world over a fresh scene.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            bodies: HashMap::new(),
            roster: Vec::new(),
            pending: Vec::new(),
            next_force: 0,
        }
    }

    /// Read access to the scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene's root node.
    pub fn root(&self) -> NodeId {
        self.scene.root()
    }

    /// Create a detached plain node.
    pub fn insert_node(&mut self, name: &str) -> NodeId {
        self.scene.insert_node(name)
    }

    /// Create a detached spatial node without a body.
    pub fn insert_spatial(&mut self, name: &str, placement: Placement) -> NodeId {
        self.scene.insert_spatial(name, placement)
    }

    /// Create a detached spatial node carrying a body.
    ///
    /// The body starts with mass 1, zero velocity, and no forces. It joins
    /// the simulation when its node becomes connected to the root.
    pub fn insert_body(&mut self, name: &str, placement: Placement) -> NodeId {
        let id = self.scene.insert_spatial(name, placement);
        self.bodies.insert(id, Body::new());
        id
    }

    /// [`Scene::adopt`] plus registry upkeep.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) -> LinkOutcome {
        self.adopt_with(parent, child, |_, _| Verdict::Allow)
    }

    /// [`Scene::adopt_with`] plus registry upkeep.
    ///
    /// Bodies in the adopted subtree enroll in the simulation if the change
    /// connects them to the root.
    pub fn adopt_with(
        &mut self,
        parent: NodeId,
        child: NodeId,
        mut gate: impl FnMut(&Scene, &LinkRequest) -> Verdict,
    ) -> LinkOutcome {
        let outcome = self.scene.adopt_with(parent, child, &mut gate);
        self.absorb(&outcome);
        outcome
    }

    /// [`Scene::abandon`] plus registry upkeep.
    pub fn abandon(&mut self, parent: NodeId, child: NodeId) -> LinkOutcome {
        self.abandon_with(parent, child, |_, _| Verdict::Allow)
    }

    /// [`Scene::abandon_with`] plus registry upkeep.
    ///
    /// Bodies in the released subtree leave the simulation if the change
    /// disconnects them. Their contacts are dropped, and the matching
    /// [`ContactEvent::Ended`] events are delivered by the next step.
    pub fn abandon_with(
        &mut self,
        parent: NodeId,
        child: NodeId,
        mut gate: impl FnMut(&Scene, &LinkRequest) -> Verdict,
    ) -> LinkOutcome {
        let outcome = self.scene.abandon_with(parent, child, &mut gate);
        self.absorb(&outcome);
        outcome
    }

    /// [`Scene::abandon_all`] plus registry upkeep.
    pub fn abandon_all(&mut self, parent: NodeId) -> Vec<LinkOutcome> {
        self.abandon_all_with(parent, |_, _| Verdict::Allow)
    }

    /// [`Scene::abandon_all_with`] plus registry upkeep.
    pub fn abandon_all_with(
        &mut self,
        parent: NodeId,
        mut gate: impl FnMut(&Scene, &LinkRequest) -> Verdict,
    ) -> Vec<LinkOutcome> {
        let outcomes = self.scene.abandon_all_with(parent, &mut gate);
        for outcome in &outcomes {
            self.absorb(outcome);
        }
        outcomes
    }

    /// [`Scene::discard`] plus registry upkeep.
    ///
    /// Bodies anywhere in the discarded subtree are dropped with their
    /// force tables. Like the scene call, this panics unless `id` is live
    /// and detached.
    pub fn discard(&mut self, id: NodeId) {
        let doomed: Vec<NodeId> = self.scene.descendants(id).collect();
        self.scene.discard(id);
        for node in doomed {
            self.bodies.remove(&node);
        }
    }

    /// See [`Scene::set_name`].
    pub fn set_name(&mut self, id: NodeId, name: &str) {
        self.scene.set_name(id, name);
    }

    /// See [`Scene::set_placement`].
    pub fn set_placement(&mut self, id: NodeId, placement: Placement) {
        self.scene.set_placement(id, placement);
    }

    /// See [`Scene::set_position`].
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        self.scene.set_position(id, position);
    }

    /// See [`Scene::set_size`].
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        self.scene.set_size(id, size);
    }

    /// See [`Scene::set_global_position`].
    pub fn set_global_position(&mut self, id: NodeId, global: Point) {
        self.scene.set_global_position(id, global);
    }

    /// Whether the node carries a body.
    pub fn is_body(&self, id: NodeId) -> bool {
        self.bodies.contains_key(&id)
    }

    /// Bodies currently in the simulation, in enrollment order.
    pub fn live_bodies(&self) -> &[NodeId] {
        &self.roster
    }

    /// The body's mass, or `None` if the node carries no body.
    pub fn mass(&self, id: NodeId) -> Option<f64> {
        self.bodies.get(&id).map(|body| body.mass)
    }

    /// The body's velocity, or `None` if the node carries no body.
    pub fn velocity(&self, id: NodeId) -> Option<Vec2> {
        self.bodies.get(&id).map(|body| body.velocity)
    }

    /// The body's net acceleration, or `None` if the node carries no body.
    pub fn acceleration(&self, id: NodeId) -> Option<Vec2> {
        self.bodies.get(&id).map(Body::acceleration)
    }

    /// Iterate the body's forces in insertion order. Empty for non-bodies.
    pub fn forces(&self, id: NodeId) -> impl Iterator<Item = (ForceId, Vec2)> + '_ {
        self.bodies
            .get(&id)
            .into_iter()
            .flat_map(|body| body.forces.iter().copied())
    }

    /// Set the body's mass. Panics if `mass` is not positive and finite,
    /// or if the node carries no body.
    pub fn set_mass(&mut self, id: NodeId, mass: f64) {
        assert!(
            mass > 0.0 && mass.is_finite(),
            "mass {mass} is out of range (must be positive and finite)"
        );
        self.body_mut(id).mass = mass;
    }

    /// Set the body's velocity. Panics if the node carries no body.
    pub fn set_velocity(&mut self, id: NodeId, velocity: Vec2) {
        self.body_mut(id).velocity = velocity;
    }

    /// Add a force to the body and return its handle.
    ///
    /// Every call adds a separate entry, so two equal vectors both pull;
    /// use the returned [`ForceId`] to update or remove this one later.
    /// Panics if the node carries no body.
    pub fn add_force(&mut self, id: NodeId, force: Vec2) -> ForceId {
        assert!(self.bodies.contains_key(&id), "no body for this node");
        let handle = ForceId(self.next_force);
        self.next_force += 1;
        self.body_mut(id).forces.push((handle, force));
        handle
    }

    /// Remove the force behind `handle`. Returns whether it was present.
    /// Panics if the node carries no body.
    pub fn remove_force(&mut self, id: NodeId, handle: ForceId) -> bool {
        let body = self.body_mut(id);
        let before = body.forces.len();
        body.forces.retain(|(held, _)| *held != handle);
        body.forces.len() < before
    }

    /// Replace the vector of the force behind `handle`. Returns whether it
    /// was present. Panics if the node carries no body.
    pub fn set_force(&mut self, id: NodeId, handle: ForceId, force: Vec2) -> bool {
        let body = self.body_mut(id);
        for (held, slot) in &mut body.forces {
            if *held == handle {
                *slot = force;
                return true;
            }
        }
        false
    }

    /// Drop all of the body's forces. Panics if the node carries no body.
    pub fn clear_forces(&mut self, id: NodeId) {
        self.body_mut(id).forces.clear();
    }

    /// Advance the simulation one tick and report contact transitions.
    ///
    /// In order:
    /// 1. Contact ends queued by earlier withdrawals are put at the head of
    ///    the report.
    /// 2. Every enrolled body integrates: acceleration is added to its
    ///    velocity, then `velocity * dt` to its position.
    /// 3. One collision pass compares every unordered pair of enrolled
    ///    bodies once, overlapping their boxes as closed intervals, and
    ///    reports begin/continue/end transitions against the contacts
    ///    remembered from earlier ticks.
    ///
    /// Enrollment is frozen when the tick starts. With `dt` of zero and no
    /// forces, a step moves nothing and repeats the same continued
    /// contacts.
    pub fn step(&mut self, dt: f64) -> Vec<ContactEvent> {
        let mut events = core::mem::take(&mut self.pending);
        let roster = self.roster.clone();

        for &id in &roster {
            let body = self.roster_body_mut(id);
            let acceleration = body.acceleration();
            body.velocity += acceleration;
            let velocity = body.velocity;
            let position = self.scene.position(id).expect("bodies are spatial");
            self.scene.set_position(id, position + velocity * dt);
        }

        for i in 0..roster.len() {
            for j in (i + 1)..roster.len() {
                let target = roster[i];
                let other = roster[j];
                let overlapping =
                    boxes_overlap(self.collision_box(target), self.collision_box(other));
                let was_touching = self
                    .bodies
                    .get(&target)
                    .expect("roster entries have bodies")
                    .contacts
                    .contains(&other);
                if overlapping {
                    if !was_touching {
                        self.roster_body_mut(target).contacts.push(other);
                        self.roster_body_mut(other).contacts.push(target);
                        events.push(ContactEvent::Began { body: target, other });
                        events.push(ContactEvent::Began { body: other, other: target });
                    }
                    events.push(ContactEvent::Continued { body: target, other });
                    events.push(ContactEvent::Continued { body: other, other: target });
                } else if was_touching {
                    self.roster_body_mut(target).contacts.retain(|c| *c != other);
                    self.roster_body_mut(other).contacts.retain(|c| *c != target);
                    events.push(ContactEvent::Ended { body: target, other });
                    events.push(ContactEvent::Ended { body: other, other: target });
                }
            }
        }

        events
    }
}

#[inline]
fn boxes_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

impl World {
    // --- internals ---

    /// Apply the registry consequences of a committed structure change.
    fn absorb(&mut self, outcome: &LinkOutcome) {
        for event in outcome.events() {
            match *event {
                SceneEvent::Connected(id) => self.enroll(id),
                SceneEvent::Disconnected(id) => self.withdraw(id),
                _ => {}
            }
        }
    }

    fn enroll(&mut self, id: NodeId) {
        if self.bodies.contains_key(&id) && !self.roster.contains(&id) {
            self.roster.push(id);
        }
    }

    /// Remove the body from the pass and break its contacts, queueing the
    /// end events for the next step.
    fn withdraw(&mut self, id: NodeId) {
        let Some(body) = self.bodies.get_mut(&id) else {
            return;
        };
        let contacts = core::mem::take(&mut body.contacts);
        self.roster.retain(|entry| *entry != id);
        for partner in contacts {
            if let Some(partner_body) = self.bodies.get_mut(&partner) {
                partner_body.contacts.retain(|contact| *contact != id);
            }
            self.pending.push(ContactEvent::Ended { body: id, other: partner });
            self.pending.push(ContactEvent::Ended { body: partner, other: id });
        }
    }

    /// The body's box in its parent's frame, centered on its position.
    fn collision_box(&self, id: NodeId) -> Rect {
        let placement = self.scene.placement(id).expect("bodies are spatial");
        Rect::from_center_size(placement.position, placement.size)
    }

    fn body_mut(&mut self, id: NodeId) -> &mut Body {
        self.bodies.get_mut(&id).expect("no body for this node")
    }

    fn roster_body_mut(&mut self, id: NodeId) -> &mut Body {
        self.bodies.get_mut(&id).expect("roster entries have bodies")
    }
}
