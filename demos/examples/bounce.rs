// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Balls in a box: forces, fixed-tick stepping, and contact reactions.
//!
//! This example shows the whole dynamics loop:
//! - four heavy wall bodies box in a region,
//! - two balls fall under a per-tick gravity force, one with a thruster
//!   that is removed mid-flight,
//! - contact reports drive the reactions from `carom_dynamics::resolve`.
//!
//! Run:
//! - `cargo run -p carom_demos --example bounce`

use carom_dynamics::resolve::{deflect, elastic_exchange, sector_toward};
use carom_dynamics::{ContactEvent, World};
use carom_scene::{NodeId, Placement};
use kurbo::{Point, Size, Vec2};

const RESTITUTION: f64 = 0.8;

fn place(x: f64, y: f64, w: f64, h: f64) -> Placement {
    Placement::new(Point::new(x, y), Size::new(w, h))
}

/// Apply one velocity reaction per `Began` event, each body resolving
/// against the velocities recorded before any reaction ran.
fn react(world: &mut World, report: &[ContactEvent], walls: &[NodeId]) {
    let before: Vec<(NodeId, Vec2)> = world
        .live_bodies()
        .iter()
        .map(|&id| (id, world.velocity(id).expect("enrolled bodies have velocities")))
        .collect();
    let recorded = |id: NodeId| {
        before
            .iter()
            .find(|(held, _)| *held == id)
            .map(|(_, velocity)| *velocity)
            .expect("contact events name enrolled bodies")
    };

    for event in report {
        let ContactEvent::Began { body, other } = *event else {
            continue;
        };
        // Walls never react.
        if walls.contains(&body) {
            continue;
        }
        let next = if walls.contains(&other) {
            // Bounce off the struck face, scaled by the restitution.
            let toward = world.scene().position(other).expect("walls are spatial")
                - world.scene().position(body).expect("balls are spatial");
            let sector = sector_toward(
                world.scene().size(body).expect("balls are spatial"),
                toward,
            );
            deflect(recorded(body), sector, RESTITUTION)
        } else {
            // Two free balls trade momentum elastically.
            let (mine, _) = elastic_exchange(
                world.mass(body).expect("balls are bodies"),
                recorded(body),
                world.mass(other).expect("balls are bodies"),
                recorded(other),
            );
            mine
        };
        world.set_velocity(body, next);
    }
}

fn main() {
    let mut world = World::new();
    let root = world.root();

    // A 220 x 100 interior, fenced by heavy walls.
    let walls: Vec<NodeId> = [
        ("floor", place(0.0, -55.0, 240.0, 10.0)),
        ("ceiling", place(0.0, 55.0, 240.0, 10.0)),
        ("left wall", place(-115.0, 0.0, 10.0, 100.0)),
        ("right wall", place(115.0, 0.0, 10.0, 100.0)),
    ]
    .into_iter()
    .map(|(name, placement)| {
        let wall = world.insert_body(name, placement);
        world.adopt(root, wall);
        world.set_mass(wall, 100.0);
        wall
    })
    .collect();

    let red = world.insert_body("red", place(-40.0, 0.0, 10.0, 10.0));
    let blue = world.insert_body("blue", place(40.0, 10.0, 10.0, 10.0));
    world.adopt(root, red);
    world.adopt(root, blue);

    // Gravity pulls every tick; the thruster only burns for the first five.
    for ball in [red, blue] {
        world.add_force(ball, Vec2::new(0.0, -2.0));
    }
    let thruster = world.add_force(red, Vec2::new(6.0, 0.5));

    let dt = 0.1;
    for tick in 0..80 {
        if tick == 5 {
            println!("tick {tick:2}: thruster cut");
            world.remove_force(red, thruster);
        }

        let report = world.step(dt);
        for event in &report {
            // Each transition is reported from both sides; print one.
            let (label, body, other) = match *event {
                ContactEvent::Began { body, other } => ("hit", body, other),
                ContactEvent::Ended { body, other } => ("left", body, other),
                ContactEvent::Continued { .. } => continue,
            };
            if walls.contains(&body) {
                continue;
            }
            println!(
                "tick {tick:2}: {} {label} {}",
                world.scene().name(body).expect("live nodes have names"),
                world.scene().name(other).expect("live nodes have names"),
            );
        }
        react(&mut world, &report, &walls);
    }

    println!();
    for ball in [red, blue] {
        let position = world.scene().position(ball).expect("balls are spatial");
        let velocity = world.velocity(ball).expect("balls are bodies");
        println!(
            "{:5} rests near ({:6.1}, {:6.1}) moving ({:5.1}, {:5.1})",
            world.scene().name(ball).expect("live nodes have names"),
            position.x,
            position.y,
            velocity.x,
            velocity.y,
        );
    }
}
