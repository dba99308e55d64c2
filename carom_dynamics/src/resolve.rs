// Copyright 2025 the Carom Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision reactions for callers that want bouncing.
//!
//! The collision pass only reports contacts; no velocity ever changes unless
//! the caller changes it. These helpers cover the two standard reactions to
//! a [`ContactEvent::Began`]:
//!
//! - [`elastic_exchange`] between two movable bodies. Each axis follows the
//!   1-D elastic collision formula, so equal masses swap velocities
//!   outright. Against an immovable counterpart, apply your own half of the
//!   result and drop the other half.
//! - [`sector_toward`] plus [`deflect`] for bouncing off an immovable wall:
//!   classify which face was struck from the box geometry, then mirror the
//!   matching velocity component, scaled by a restitution factor. The wall
//!   itself receives nothing.
//!
//! [`ContactEvent::Began`]: crate::ContactEvent::Began

use core::f64::consts::PI;
use core::f64::consts::TAU;

use kurbo::{Size, Vec2};

/// One face of a body's box, as seen from its center.
///
/// Directions follow the usual mathematical convention: [`Sector::Up`] is
/// the +y side and [`Sector::Right`] the +x side. In a y-down coordinate
/// system the vertical labels swap, but [`Sector::is_vertical`] is
/// unaffected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Sector {
    /// The +y face.
    Up,
    /// The +x face.
    Right,
    /// The -y face.
    Down,
    /// The -x face.
    Left,
}

impl Sector {
    /// Whether this is the up or down face.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

/// New velocities of a 1-D elastic collision.
///
/// `(m1, v1)` and `(m2, v2)` are the colliding masses and their velocities
/// along one axis; the result is their post-collision velocities in the
/// same order. Momentum and kinetic energy are conserved, so equal masses
/// trade velocities and a much heavier `m2` nearly reflects `v1`.
///
/// Panics if either mass is not positive and finite.
pub fn elastic_velocities(m1: f64, v1: f64, m2: f64, v2: f64) -> (f64, f64) {
    assert!(
        m1 > 0.0 && m1.is_finite(),
        "mass {m1} is out of range (must be positive and finite)"
    );
    assert!(
        m2 > 0.0 && m2.is_finite(),
        "mass {m2} is out of range (must be positive and finite)"
    );
    let total = m1 + m2;
    (
        ((m1 - m2) * v1 + 2.0 * m2 * v2) / total,
        ((m2 - m1) * v2 + 2.0 * m1 * v1) / total,
    )
}

/// [`elastic_velocities`] applied per axis to a pair of 2-D velocities.
///
/// Returns the new `(v1, v2)`. When the counterpart must not move (a wall),
/// discard its half instead of applying it.
pub fn elastic_exchange(m1: f64, v1: Vec2, m2: f64, v2: Vec2) -> (Vec2, Vec2) {
    let (x1, x2) = elastic_velocities(m1, v1.x, m2, v2.x);
    let (y1, y2) = elastic_velocities(m1, v1.y, m2, v2.y);
    (Vec2::new(x1, y1), Vec2::new(x2, y2))
}

/// Which face of a box of the given size an approach from `toward` strikes.
///
/// `toward` points from the box's center to the counterpart's center. The
/// four sectors are bounded by the box's corner diagonals, so a wide flat
/// box presents wide up/down faces and narrow left/right ones.
///
/// Panics if `size` or `toward` has a NaN component.
pub fn sector_toward(size: Size, toward: Vec2) -> Sector {
    let alpha = atan2_from_y(size.width / 2.0, size.height / 2.0);
    // Rotate so the up sector starts at zero, then wrap into [0, TAU).
    let mut angle = atan2_from_y(toward.x, toward.y) + alpha;
    if angle < 0.0 {
        angle += TAU;
    }
    let sectors = [
        (Sector::Up, 2.0 * alpha),
        (Sector::Right, PI - 2.0 * alpha),
        (Sector::Down, 2.0 * alpha),
        (Sector::Left, PI - 2.0 * alpha),
    ];
    let mut lower = 0.0;
    for (sector, width) in sectors {
        if angle < lower + width {
            return sector;
        }
        lower += width;
    }
    panic!("cannot resolve a sector for angle {angle}");
}

/// Bounce `velocity` off the face named by `sector`.
///
/// The component normal to the struck face is mirrored and scaled by
/// `restitution` (1.0 keeps all speed); the tangential component is kept.
pub fn deflect(velocity: Vec2, sector: Sector, restitution: f64) -> Vec2 {
    if sector.is_vertical() {
        Vec2::new(velocity.x, -restitution * velocity.y)
    } else {
        Vec2::new(-restitution * velocity.x, velocity.y)
    }
}

/// Angle of `(x, y)` measured from the +y axis, clockwise toward +x.
///
/// Routed through [`Vec2::atan2`] so `no_std` builds resolve it via libm.
#[inline]
fn atan2_from_y(x: f64, y: f64) -> f64 {
    Vec2::new(y, x).atan2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_masses_swap_velocities() {
        let (v1, v2) = elastic_velocities(1.0, 5.0, 1.0, -5.0);
        assert_eq!((v1, v2), (-5.0, 5.0));

        let (v1, v2) = elastic_exchange(
            1.0,
            Vec2::new(5.0, 2.0),
            1.0,
            Vec2::new(-5.0, 0.0),
        );
        assert_eq!(v1, Vec2::new(-5.0, 0.0));
        assert_eq!(v2, Vec2::new(5.0, 2.0));
    }

    #[test]
    fn heavy_counterpart_nearly_reflects() {
        let (v1, v2) = elastic_velocities(1.0, 5.0, 100.0, 0.0);
        assert_eq!(v1, (-99.0 * 5.0) / 101.0);
        assert_eq!(v2, 10.0 / 101.0);
        assert!(v1 < 0.0, "the light body must bounce back");
    }

    #[test]
    fn momentum_is_conserved() {
        let (m1, m2) = (2.0, 5.0);
        let (v1, v2) = elastic_velocities(m1, 3.0, m2, -1.0);
        let before = m1 * 3.0 + m2 * -1.0;
        let after = m1 * v1 + m2 * v2;
        assert!((after - before).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn zero_mass_panics() {
        elastic_velocities(0.0, 1.0, 1.0, 1.0);
    }

    #[test]
    fn sector_labels_follow_the_quadrants() {
        let square = Size::new(10.0, 10.0);
        assert_eq!(sector_toward(square, Vec2::new(0.0, 1.0)), Sector::Up);
        assert_eq!(sector_toward(square, Vec2::new(1.0, 0.0)), Sector::Right);
        assert_eq!(sector_toward(square, Vec2::new(0.0, -1.0)), Sector::Down);
        assert_eq!(sector_toward(square, Vec2::new(-1.0, 0.0)), Sector::Left);
        // Clearly inside a quadrant, not on a diagonal.
        assert_eq!(sector_toward(square, Vec2::new(0.9, 1.0)), Sector::Up);
        assert_eq!(sector_toward(square, Vec2::new(1.0, -0.9)), Sector::Right);
    }

    #[test]
    fn flat_boxes_widen_the_vertical_sectors() {
        let slab = Size::new(100.0, 10.0);
        // A mostly horizontal approach still faces the wide top side.
        assert_eq!(sector_toward(slab, Vec2::new(1.0, 0.2)), Sector::Up);
        assert_eq!(sector_toward(slab, Vec2::new(1.0, 0.0)), Sector::Right);

        let pillar = Size::new(10.0, 100.0);
        assert_eq!(sector_toward(pillar, Vec2::new(0.2, 1.0)), Sector::Right);
        assert_eq!(sector_toward(pillar, Vec2::new(0.05, 1.0)), Sector::Up);
    }

    #[test]
    #[should_panic(expected = "cannot resolve a sector")]
    fn undirected_approach_panics() {
        sector_toward(Size::new(10.0, 10.0), Vec2::new(f64::NAN, 1.0));
    }

    #[test]
    fn deflect_mirrors_the_struck_axis() {
        let velocity = Vec2::new(2.0, -4.0);
        assert_eq!(deflect(velocity, Sector::Down, 0.8), Vec2::new(2.0, 3.2));
        assert_eq!(deflect(velocity, Sector::Right, 0.8), Vec2::new(-1.6, -4.0));
        assert_eq!(deflect(velocity, Sector::Up, 1.0), Vec2::new(2.0, 4.0));
    }
}
