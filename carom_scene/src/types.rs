// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: node identifiers and spatial placement.

use kurbo::{Point, Size};

/// Identifier for a node in the scene (generational).
///
/// A `NodeId` stays valid until its node is discarded. Reads with a stale
/// identifier return `None`; structural operations panic on one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Spatial placement of a node: parent-relative center position and extents.
///
/// Placement is plain `Copy` data. Reads hand out snapshots and writes
/// replace whole values, so a caller can never alias into scene storage.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Placement {
    /// Center position, relative to the nearest spatial ancestor chain.
    pub position: Point,
    /// Extents of the node's box, centered on `position`.
    pub size: Size,
}

impl Placement {
    /// Placement with the given center and extents.
    pub const fn new(position: Point, size: Size) -> Self {
        Self { position, size }
    }
}
