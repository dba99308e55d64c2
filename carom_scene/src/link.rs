// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The two-phase link protocol: requests, verdicts, and lifecycle events.
//!
//! Every change to the parent/child structure of a [`Scene`] goes through
//! the same shape: a [`LinkRequest`] describing the proposed change is put
//! to a gate, the gate answers with a [`Verdict`], and only an allowed
//! request is committed. A committed change reports everything that
//! happened as a list of [`SceneEvent`]s inside [`LinkOutcome::Committed`];
//! a refused one returns the untouched request in [`LinkOutcome::Vetoed`].
//!
//! [`Scene`]: crate::Scene

use alloc::vec::Vec;

use crate::NodeId;

/// A proposed structural change, presented to a gate before commit.
///
/// The two adopt variants (and likewise the two abandon variants) describe
/// the same structural edit from the two ends of the link. Both are always
/// gated for a single operation, parent's side first, and a veto on either
/// cancels the whole change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkRequest {
    /// The parent is asked whether it will take `child` in.
    AdoptChild {
        /// The prospective parent.
        parent: NodeId,
        /// The node that would become its child.
        child: NodeId,
    },
    /// The child is asked whether it accepts `parent`.
    Adopt {
        /// The node that would gain a parent.
        child: NodeId,
        /// The prospective parent.
        parent: NodeId,
    },
    /// The parent is asked whether it will let `child` go.
    AbandonChild {
        /// The parent holding the link.
        parent: NodeId,
        /// The child that would be released.
        child: NodeId,
    },
    /// The child is asked whether it accepts losing `parent`.
    Abandon {
        /// The node that would lose its parent.
        child: NodeId,
        /// The parent being left.
        parent: NodeId,
    },
}

/// A gate's answer to a [`LinkRequest`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Verdict {
    /// Let the change proceed.
    #[default]
    Allow,
    /// Cancel the change; the scene is left untouched.
    Veto,
}

/// Something that happened to a node during a committed link change.
///
/// Events are returned, not dispatched: the scene reports them in order
/// and the caller reacts however it likes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// A parent took a child in.
    AdoptedChild {
        /// The parent that gained a child.
        parent: NodeId,
        /// The newly adopted child.
        child: NodeId,
    },
    /// A child gained a parent.
    Adopted {
        /// The newly adopted child.
        child: NodeId,
        /// The parent it now belongs to.
        parent: NodeId,
    },
    /// A parent let a child go.
    AbandonedChild {
        /// The parent that lost a child.
        parent: NodeId,
        /// The child that was released.
        child: NodeId,
    },
    /// A child lost its parent.
    Abandoned {
        /// The child that was released.
        child: NodeId,
        /// The parent it left.
        parent: NodeId,
    },
    /// The node joined the root's subtree.
    Connected(NodeId),
    /// The node left the root's subtree.
    Disconnected(NodeId),
}

/// The result of an adopt or abandon call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The change was committed; the events are in the order they occurred.
    Committed(Vec<SceneEvent>),
    /// A gate vetoed the change; the scene is untouched.
    Vetoed(LinkRequest),
}

impl LinkOutcome {
    /// Whether the change went through.
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    /// The events of a committed change, or an empty slice for a veto.
    pub fn events(&self) -> &[SceneEvent] {
        match self {
            Self::Committed(events) => events,
            Self::Vetoed(_) => &[],
        }
    }
}
