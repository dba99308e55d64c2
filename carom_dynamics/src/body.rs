// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-body simulation state: mass, velocity, forces, and current contacts.

use carom_scene::NodeId;
use kurbo::Vec2;
use smallvec::SmallVec;

/// Identifier for one force held by a body.
///
/// Handles are allocated by [`World::add_force`] and are unique across the
/// whole world, so holding one is enough to update or remove that force
/// later. A handle goes dead when its force is removed or its body's node
/// is discarded.
///
/// [`World::add_force`]: crate::World::add_force
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ForceId(pub(crate) u64);

pub(crate) struct Body {
    pub(crate) mass: f64,
    pub(crate) velocity: Vec2,
    /// Forces in insertion order; handles never repeat.
    pub(crate) forces: SmallVec<[(ForceId, Vec2); 4]>,
    /// Bodies this one currently overlaps, in contact order.
    pub(crate) contacts: SmallVec<[NodeId; 4]>,
}

impl Body {
    pub(crate) fn new() -> Self {
        Self {
            mass: 1.0,
            velocity: Vec2::ZERO,
            forces: SmallVec::new(),
            contacts: SmallVec::new(),
        }
    }

    /// Net acceleration of the current force table.
    pub(crate) fn acceleration(&self) -> Vec2 {
        let mut net = Vec2::ZERO;
        for &(_, force) in &self.forces {
            net += force;
        }
        net / self.mass
    }
}
