//! Dead-reckoned pose tracking from cumulative wheel distances.
//!
//! Heading comes from the difference between the two sides over the track
//! width, so no gyro is required; the tradeoff is the usual drift under
//! wheel slip.

use crate::geometry::{wrap_angle, Pose2d, Rotation2d};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialOdometry {
    track_width: f64,
    pose: Pose2d,
    last_left: f64,
    last_right: f64,
}

impl DifferentialOdometry {
    pub fn new(track_width: f64) -> Self {
        Self {
            track_width,
            pose: Pose2d::default(),
            last_left: 0.0,
            last_right: 0.0,
        }
    }

    pub fn pose(&self) -> Pose2d {
        self.pose
    }

    /// Re-seat the estimate at `pose`. `left`/`right` are the current
    /// cumulative wheel distances so the next update sees zero deltas.
    pub fn reset(&mut self, pose: Pose2d, left: f64, right: f64) {
        self.pose = pose;
        self.last_left = left;
        self.last_right = right;
    }

    /// Advance the estimate with the latest cumulative wheel distances in
    /// meters. Integrates along the chord at the midpoint heading.
    pub fn update(&mut self, left: f64, right: f64) -> Pose2d {
        let delta_left = left - self.last_left;
        let delta_right = right - self.last_right;
        self.last_left = left;
        self.last_right = right;

        let distance = (delta_left + delta_right) / 2.0;
        let delta_heading = (delta_right - delta_left) / self.track_width;

        let midpoint = self.pose.rotation.radians() + delta_heading / 2.0;
        self.pose = Pose2d {
            translation: crate::geometry::Translation2d {
                x: self.pose.translation.x + distance * libm::cos(midpoint),
                y: self.pose.translation.y + distance * libm::sin(midpoint),
            },
            rotation: Rotation2d::new(wrap_angle(self.pose.rotation.radians() + delta_heading)),
        };
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{FRAC_PI_2, PI};

    const EPSILON: f64 = 1e-6;

    #[test]
    fn driving_straight_moves_along_the_heading() {
        let mut odometry = DifferentialOdometry::new(0.3);
        odometry.update(1.0, 1.0);
        let pose = odometry.pose();
        assert!((pose.x() - 1.0).abs() < EPSILON);
        assert!(pose.y().abs() < EPSILON);
        assert!(pose.heading().abs() < EPSILON);
    }

    #[test]
    fn spinning_in_place_only_changes_heading() {
        let track_width = 0.3;
        let mut odometry = DifferentialOdometry::new(track_width);
        // Wheels move equal and opposite by a quarter-turn arc.
        let arc = FRAC_PI_2 * track_width / 2.0;
        odometry.update(-arc, arc);
        let pose = odometry.pose();
        assert!(pose.x().abs() < EPSILON);
        assert!(pose.y().abs() < EPSILON);
        assert!((pose.heading() - FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn quarter_arc_ends_up_where_expected() {
        // Drive a quarter circle of radius 1 in many small steps; the pose
        // should approach (1, 1) facing +y.
        let track_width = 0.3;
        let mut odometry = DifferentialOdometry::new(track_width);
        let steps = 1000;
        for i in 1..=steps {
            let theta = FRAC_PI_2 * i as f64 / steps as f64;
            let left = theta * (1.0 - track_width / 2.0);
            let right = theta * (1.0 + track_width / 2.0);
            odometry.update(left, right);
        }
        let pose = odometry.pose();
        assert!((pose.x() - 1.0).abs() < 1e-3);
        assert!((pose.y() - 1.0).abs() < 1e-3);
        assert!((pose.heading() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn reset_reseats_the_estimate() {
        let mut odometry = DifferentialOdometry::new(0.3);
        odometry.update(2.0, 2.0);
        odometry.reset(Pose2d::new(0.0, 0.0, PI), 2.0, 2.0);
        odometry.update(3.0, 3.0);
        let pose = odometry.pose();
        assert!((pose.x() + 1.0).abs() < EPSILON);
        assert!(pose.y().abs() < 1e-3);
    }
}
