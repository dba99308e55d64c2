// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=carom_dynamics --heading-base-level=0

//! Carom Dynamics: toy 2D physics over the [`carom_scene`] tree.
//!
//! ## Overview
//!
//! A [`World`] owns a [`Scene`](carom_scene::Scene) and runs bodies in it.
//! Any spatial node can carry a body ([`World::insert_body`]): mass, a
//! velocity, and a table of named forces. Structure changes go through the
//! world's delegates so it can track connection: a body simulates only
//! while its node is connected to the root, and leaves the pass the moment
//! it is cut loose.
//!
//! ## Stepping
//!
//! [`World::step`] advances one fixed tick. Each enrolled body first adds
//! its net acceleration (the force sum over its mass) to its velocity,
//! then moves by `velocity * dt`. After all bodies have moved, one
//! collision pass compares every unordered pair of enrolled bodies and
//! reports [`ContactEvent`]s: `Began` on the first overlapping tick
//! (followed by `Continued` the same tick), `Continued` while the overlap
//! holds, `Ended` when it stops or one side leaves the simulation.
//! Boxes are axis-aligned, centered on each node's position in its
//! parent's frame, and touching edges already count as contact.
//!
//! ## Reactions
//!
//! The pass only detects. What a contact does to the bodies is up to the
//! caller, and the [`resolve`] module covers the usual toy-physics
//! reactions: [`resolve::elastic_exchange`] for two free bodies, and
//! [`resolve::sector_toward`] plus [`resolve::deflect`] for bouncing off
//! an immovable box.
//!
//! ## API overview
//!
//! - [`World`]: the scene, the bodies, and [`World::step`].
//! - [`ContactEvent`]: begin/continue/end transitions, reported from both
//!   sides of each pair.
//! - [`ForceId`]: handle for updating or removing one force later.
//! - [`resolve`]: velocity reactions to apply on contact.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod body;
pub mod resolve;
mod world;

pub use body::ForceId;
pub use world::{ContactEvent, World};
