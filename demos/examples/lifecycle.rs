// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node lifecycle: two-phase links, connection cascades, and departures.
//!
//! This example walks the scene protocol end to end:
//! - adoptions report both sides, then the connection cascade,
//! - a gate can veto either side of a request before anything changes,
//! - abandoning a subtree disconnects it children-first,
//! - a body that leaves the world still gets its contacts ended.
//!
//! Run:
//! - `cargo run -p carom_demos --example lifecycle`

use carom_dynamics::{ContactEvent, World};
use carom_scene::{LinkOutcome, LinkRequest, NodeId, Placement, Scene, SceneEvent, Verdict};
use kurbo::{Point, Size};

fn place(x: f64, y: f64, w: f64, h: f64) -> Placement {
    Placement::new(Point::new(x, y), Size::new(w, h))
}

fn name(scene: &Scene, id: NodeId) -> &str {
    scene.name(id).unwrap_or("?")
}

fn describe(scene: &Scene, outcome: &LinkOutcome) {
    match outcome {
        LinkOutcome::Committed(events) => {
            for event in events {
                match *event {
                    SceneEvent::AdoptedChild { parent, child } => {
                        println!("  {} adopted {}", name(scene, parent), name(scene, child));
                    }
                    SceneEvent::Adopted { child, parent } => {
                        println!("  {} settled under {}", name(scene, child), name(scene, parent));
                    }
                    SceneEvent::AbandonedChild { parent, child } => {
                        println!("  {} released {}", name(scene, parent), name(scene, child));
                    }
                    SceneEvent::Abandoned { child, parent } => {
                        println!("  {} left {}", name(scene, child), name(scene, parent));
                    }
                    SceneEvent::Connected(id) => println!("  {} is now live", name(scene, id)),
                    SceneEvent::Disconnected(id) => println!("  {} went dark", name(scene, id)),
                }
            }
        }
        LinkOutcome::Vetoed(request) => println!("  vetoed: {request:?}"),
    }
}

fn main() {
    let mut scene = Scene::new();
    let root = scene.root();

    let table = scene.insert_spatial("table", place(0.0, 0.0, 300.0, 200.0));
    let rack = scene.insert_spatial("rack", place(60.0, 40.0, 40.0, 40.0));
    let eight = scene.insert_spatial("eight-ball", place(5.0, 5.0, 10.0, 10.0));
    let cue = scene.insert_spatial("cue-ball", place(-80.0, 0.0, 10.0, 10.0));

    // Link bottom-up first, so the last adoption connects the whole pile
    // in one cascade.
    println!("== Racking up ==");
    for (parent, child) in [(rack, eight), (table, rack), (root, table)] {
        let outcome = scene.adopt(parent, child);
        describe(&scene, &outcome);
    }

    let spot = scene.global_position(eight).expect("the eight-ball is spatial");
    println!("the eight-ball sits at ({}, {}) on the felt", spot.x, spot.y);

    // The cue ball refuses the rack: the child-side request is vetoed and
    // the scene stays exactly as it was.
    println!("== A choosy ball ==");
    let outcome = scene.adopt_with(rack, cue, |scene, request| match *request {
        LinkRequest::Adopt { parent, .. } => {
            println!("  cue-ball eyes {} and says no", name(scene, parent));
            Verdict::Veto
        }
        _ => Verdict::Allow,
    });
    describe(&scene, &outcome);
    let outcome = scene.adopt(table, cue);
    describe(&scene, &outcome);

    // Abandoning the rack takes the eight-ball with it, children first.
    println!("== Clearing the rack ==");
    let outcome = scene.abandon(table, rack);
    describe(&scene, &outcome);
    println!("the table still holds {} node(s)", scene.children_of(table).len());

    // A detached subtree can be dropped wholesale once nothing links to it.
    scene.discard(rack);
    assert!(!scene.is_alive(eight));

    // The same protocol runs under a world, which also settles contacts
    // for bodies that leave.
    println!("== Departure under contact ==");
    let mut world = World::new();
    let root = world.root();
    let bumper = world.insert_body("bumper", place(0.0, 0.0, 20.0, 20.0));
    let drifter = world.insert_body("drifter", place(15.0, 0.0, 20.0, 20.0));
    world.adopt(root, bumper);
    world.adopt(root, drifter);

    for event in world.step(0.0) {
        if let ContactEvent::Began { body, other } = event {
            println!(
                "  {} hit {}",
                name(world.scene(), body),
                name(world.scene(), other),
            );
        }
    }

    world.abandon(root, drifter);
    for event in world.step(0.0) {
        if let ContactEvent::Ended { body, other } = event {
            println!(
                "  {} parted from {}",
                name(world.scene(), body),
                name(world.scene(), other),
            );
        }
    }
}
