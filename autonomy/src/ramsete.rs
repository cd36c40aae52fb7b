//! Ramsete nonlinear trajectory follower.
//!
//! Produces chassis speeds that converge on a moving trajectory reference.
//! `b` acts like a proportional gain on the pose error (rad^2/m^2) and
//! `zeta` is the damping ratio.

use crate::geometry::Pose2d;
use crate::kinematics::ChassisSpeeds;
use crate::trajectory::TrajectoryState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RamseteController {
    b: f64,
    zeta: f64,
}

impl Default for RamseteController {
    fn default() -> Self {
        Self::new(2.0, 0.7)
    }
}

impl RamseteController {
    pub fn new(b: f64, zeta: f64) -> Self {
        Self { b, zeta }
    }

    /// Chassis speeds that steer `current` toward the `desired` state.
    pub fn calculate(&self, current: &Pose2d, desired: &TrajectoryState) -> ChassisSpeeds {
        let error = desired.pose.relative_to(current);
        let heading_error = error.heading();

        let velocity_ref = desired.velocity;
        let omega_ref = desired.velocity * desired.curvature;

        let k = 2.0
            * self.zeta
            * libm::sqrt(omega_ref * omega_ref + self.b * velocity_ref * velocity_ref);

        ChassisSpeeds {
            vx: velocity_ref * libm::cos(heading_error) + k * error.x(),
            omega: omega_ref
                + k * heading_error
                + self.b * velocity_ref * sinc(heading_error) * error.y(),
        }
    }
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-4 {
        // Second-order taylor expansion of sin(x)/x near zero.
        1.0 - x * x / 6.0
    } else {
        libm::sin(x) / x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Pose2d;

    fn reference(velocity: f64, curvature: f64, pose: Pose2d) -> TrajectoryState {
        TrajectoryState {
            time: 0.0,
            velocity,
            acceleration: 0.0,
            pose,
            curvature,
        }
    }

    #[test]
    fn on_path_tracks_the_reference_exactly() {
        let controller = RamseteController::default();
        let pose = Pose2d::new(1.0, 2.0, 0.3);
        let desired = reference(1.5, 0.2, pose);

        let output = controller.calculate(&pose, &desired);
        assert!((output.vx - 1.5).abs() < 1e-9);
        assert!((output.omega - 1.5 * 0.2).abs() < 1e-9);
    }

    #[test]
    fn lagging_behind_speeds_up() {
        let controller = RamseteController::default();
        let current = Pose2d::default();
        // Reference is one meter ahead along +x.
        let desired = reference(1.0, 0.0, Pose2d::new(1.0, 0.0, 0.0));

        let output = controller.calculate(&current, &desired);
        assert!(output.vx > 1.0);
        assert!(output.omega.abs() < 1e-9);
    }

    #[test]
    fn offset_to_the_left_turns_left() {
        let controller = RamseteController::default();
        let current = Pose2d::default();
        // Reference sits one meter to the robot's left.
        let desired = reference(1.0, 0.0, Pose2d::new(0.0, 1.0, 0.0));

        let output = controller.calculate(&current, &desired);
        assert!(output.omega > 0.0);
    }

    #[test]
    fn at_rest_on_target_commands_nothing() {
        let controller = RamseteController::default();
        let pose = Pose2d::default();
        let desired = reference(0.0, 0.0, pose);

        let output = controller.calculate(&pose, &desired);
        assert!(output.vx.abs() < 1e-9);
        assert!(output.omega.abs() < 1e-9);
    }
}
