// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=carom_scene --heading-base-level=0

//! Carom Scene: a generational scene tree with a cancelable link protocol.
//!
//! Carom Scene is the structural half of the Carom toy physics stack. It owns
//! the hierarchy; simulation, bodies, and collisions live in `carom_dynamics`
//! on top of it.
//!
//! - Represents a tree of named nodes under a permanent root, addressed by
//!   generational [`NodeId`]s.
//! - Makes every structure change cancelable: both ends of a link are asked
//!   before an adopt or abandon commits, and either side can veto it.
//! - Reports committed changes as ordered [`SceneEvent`] lists instead of
//!   dispatching callbacks, so callers decide how to react.
//! - Tracks which nodes are connected to the root, with connection flowing
//!   parents-first and disconnection children-first through a moved subtree.
//! - Stores an optional spatial [`Placement`] per node and derives global
//!   positions by summing the spatial ancestor chain.
//!
//! ## The link protocol
//!
//! An adopt is proposed to the parent ([`LinkRequest::AdoptChild`]) and then
//! to the child ([`LinkRequest::Adopt`]); an abandon mirrors this with
//! [`LinkRequest::AbandonChild`] and [`LinkRequest::Abandon`]. A gate
//! answering [`Verdict::Veto`] at either step cancels the whole change and
//! the scene is left exactly as it was. There is no gate on connection:
//! once a change commits, the connectivity of the moved subtree follows from
//! it unconditionally.
//!
//! ## API overview
//!
//! - [`Scene`]: the tree, its root, and all queries and mutations.
//! - [`NodeId`]: generational handle of a node.
//! - [`Placement`]: parent-relative center position and size of a spatial node.
//! - [`LinkRequest`] / [`Verdict`]: the proposal put to a gate and its answer.
//! - [`LinkOutcome`] / [`SceneEvent`]: what a structure change returns.
//!
//! Key operations:
//! - [`Scene::insert_node`](Scene::insert_node) / [`Scene::insert_spatial`](Scene::insert_spatial) → [`NodeId`]
//! - [`Scene::adopt`](Scene::adopt) / [`Scene::adopt_with`](Scene::adopt_with) and
//!   [`Scene::abandon`](Scene::abandon) / [`Scene::abandon_with`](Scene::abandon_with) /
//!   [`Scene::abandon_all`](Scene::abandon_all) → [`LinkOutcome`]
//! - [`Scene::discard`](Scene::discard) frees a detached subtree.
//! - [`Scene::descendants`](Scene::descendants) and [`Scene::ancestors`](Scene::ancestors) walk the structure.
//! - [`Scene::position`](Scene::position) / [`Scene::size`](Scene::size) /
//!   [`Scene::global_position`](Scene::global_position) and their setters cover spatial data.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod link;
mod tree;
mod types;

pub use link::{LinkOutcome, LinkRequest, SceneEvent, Verdict};
pub use tree::{Ancestors, Descendants, Scene};
pub use types::{NodeId, Placement};
