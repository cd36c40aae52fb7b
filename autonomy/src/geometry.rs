//! 2D field-relative geometry. Angles are radians, counterclockwise
//! positive; distances are meters.

use core::f64::consts::{PI, TAU};
use core::ops::Sub;

use serde::Deserialize;

/// Wrap an angle to [-pi, pi].
pub fn wrap_angle(radians: f64) -> f64 {
    let mut wrapped = libm::fmod(radians, TAU);
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped < -PI {
        wrapped += TAU;
    }
    wrapped
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Translation2d {
    pub x: f64,
    pub y: f64,
}

impl Translation2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        libm::hypot(other.x - self.x, other.y - self.y)
    }

    pub fn norm(&self) -> f64 {
        libm::hypot(self.x, self.y)
    }

    pub fn rotate_by(&self, rotation: Rotation2d) -> Self {
        let (sin, cos) = (rotation.sin(), rotation.cos());
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    pub fn interpolate(&self, other: &Self, t: f64) -> Self {
        Self {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
        }
    }
}

impl Sub for Translation2d {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Rotation2d {
    radians: f64,
}

impl Rotation2d {
    pub fn new(radians: f64) -> Self {
        Self { radians }
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self {
            radians: degrees.to_radians(),
        }
    }

    pub fn radians(&self) -> f64 {
        self.radians
    }

    pub fn degrees(&self) -> f64 {
        self.radians.to_degrees()
    }

    pub fn sin(&self) -> f64 {
        libm::sin(self.radians)
    }

    pub fn cos(&self) -> f64 {
        libm::cos(self.radians)
    }

    /// Equivalent rotation wrapped to [-pi, pi].
    pub fn wrapped(&self) -> Self {
        Self {
            radians: wrap_angle(self.radians),
        }
    }

    /// Interpolate along the shortest arc between two rotations.
    pub fn interpolate(&self, other: Self, t: f64) -> Self {
        let delta = wrap_angle(other.radians - self.radians);
        Self {
            radians: wrap_angle(self.radians + delta * t),
        }
    }
}

impl Sub for Rotation2d {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            radians: wrap_angle(self.radians - other.radians),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Pose2d {
    pub translation: Translation2d,
    pub rotation: Rotation2d,
}

impl Pose2d {
    pub fn new(x: f64, y: f64, radians: f64) -> Self {
        Self {
            translation: Translation2d::new(x, y),
            rotation: Rotation2d::new(radians),
        }
    }

    pub fn x(&self) -> f64 {
        self.translation.x
    }

    pub fn y(&self) -> f64 {
        self.translation.y
    }

    pub fn heading(&self) -> f64 {
        self.rotation.radians()
    }

    /// This pose expressed in `reference`'s coordinate frame.
    pub fn relative_to(&self, reference: &Pose2d) -> Pose2d {
        let delta = self.translation - reference.translation;
        let (sin, cos) = (reference.rotation.sin(), reference.rotation.cos());
        Pose2d {
            translation: Translation2d {
                x: delta.x * cos + delta.y * sin,
                y: -delta.x * sin + delta.y * cos,
            },
            rotation: self.rotation - reference.rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn wrap_angle_stays_in_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < EPSILON);
        assert!((wrap_angle(-3.0 * PI) + PI).abs() < EPSILON);
        assert!((wrap_angle(0.5) - 0.5).abs() < EPSILON);
        assert!((wrap_angle(TAU)).abs() < EPSILON);
    }

    #[test]
    fn degree_conversions_round_trip() {
        let rotation = Rotation2d::from_degrees(90.0);
        assert!((rotation.radians() - PI / 2.0).abs() < EPSILON);
        assert!((rotation.degrees() - 90.0).abs() < EPSILON);
        assert!((Rotation2d::new(3.0 * PI).wrapped().radians() - PI).abs() < EPSILON);
    }

    #[test]
    fn rotate_by_quarter_turn() {
        let rotated = Translation2d::new(1.0, 0.0).rotate_by(Rotation2d::new(PI / 2.0));
        assert!(rotated.x.abs() < EPSILON);
        assert!((rotated.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn relative_to_itself_is_identity() {
        let pose = Pose2d::new(3.0, -2.0, 0.7);
        let relative = pose.relative_to(&pose);
        assert!(relative.x().abs() < EPSILON);
        assert!(relative.y().abs() < EPSILON);
        assert!(relative.heading().abs() < EPSILON);
    }

    #[test]
    fn relative_to_rotated_reference() {
        // A point one meter ahead of a robot facing +y sits at (0, 1) on the
        // field but at (1, 0) in the robot frame.
        let target = Pose2d::new(0.0, 1.0, PI / 2.0);
        let reference = Pose2d::new(0.0, 0.0, PI / 2.0);
        let relative = target.relative_to(&reference);
        assert!((relative.x() - 1.0).abs() < EPSILON);
        assert!(relative.y().abs() < EPSILON);
        assert!(relative.heading().abs() < EPSILON);
    }

    #[test]
    fn interpolate_takes_shortest_arc() {
        let a = Rotation2d::new(PI - 0.1);
        let b = Rotation2d::new(-PI + 0.1);
        let mid = a.interpolate(b, 0.5);
        assert!((mid.radians().abs() - PI).abs() < 1e-6);
    }
}
