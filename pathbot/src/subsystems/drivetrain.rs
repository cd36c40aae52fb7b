use pros::prelude::*;

use robot_autonomy::geometry::Pose2d;
use robot_autonomy::kinematics::WheelSpeeds;
use robot_autonomy::odometry::DifferentialOdometry;
use robot_command::subsystem::Subsystem;

use crate::constants::drivetrain::{
    EXTERNAL_GEAR_RATIO, MAX_SPEED_MPS, PORT_LEFT_FRONT, PORT_LEFT_REAR, PORT_RIGHT_FRONT,
    PORT_RIGHT_REAR, TRACK_WIDTH_METERS, WHEEL_CIRCUMFERENCE_METERS,
};

/// Four-motor tank drivetrain with encoder odometry. Commands buffer wheel
/// outputs; `periodic` pushes them to the motors and feeds the odometry.
#[derive(Debug)]
pub struct Drivetrain {
    left_front: Motor,
    left_rear: Motor,
    right_front: Motor,
    right_rear: Motor,
    odometry: DifferentialOdometry,
    saved_pose: Pose2d,
    // Cumulative wheel travel from the last good encoder read, meters.
    last_distances: (f64, f64),
    left_output: f64,
    right_output: f64,
}

impl Drivetrain {
    pub fn new() -> pros::core::error::Result<Self> {
        Ok(Self {
            left_front: Motor::new(unsafe { SmartPort::new(PORT_LEFT_FRONT) }, BrakeMode::Brake)?,
            left_rear: Motor::new(unsafe { SmartPort::new(PORT_LEFT_REAR) }, BrakeMode::Brake)?,
            right_front: Motor::new(unsafe { SmartPort::new(PORT_RIGHT_FRONT) }, BrakeMode::Brake)?,
            right_rear: Motor::new(unsafe { SmartPort::new(PORT_RIGHT_REAR) }, BrakeMode::Brake)?,
            odometry: DifferentialOdometry::new(TRACK_WIDTH_METERS),
            saved_pose: Pose2d::default(),
            last_distances: (0.0, 0.0),
            left_output: 0.0,
            right_output: 0.0,
        })
    }

    /// Arcade mix: `forward` and `turn` in [-1, 1].
    pub fn arcade_drive(&mut self, forward: f64, turn: f64) {
        self.left_output = (forward + turn).clamp(-1.0, 1.0);
        self.right_output = (forward - turn).clamp(-1.0, 1.0);
    }

    /// Command linear wheel speeds in m/s, scaled against the drive's free
    /// speed.
    pub fn drive_wheel_speeds(&mut self, speeds: WheelSpeeds) {
        self.left_output = (speeds.left / MAX_SPEED_MPS).clamp(-1.0, 1.0);
        self.right_output = (speeds.right / MAX_SPEED_MPS).clamp(-1.0, 1.0);
    }

    pub fn stop(&mut self) {
        self.left_output = 0.0;
        self.right_output = 0.0;
    }

    pub fn current_pose(&self) -> Pose2d {
        self.odometry.pose()
    }

    pub fn saved_pose(&self) -> Pose2d {
        self.saved_pose
    }

    pub fn save_current_pose(&mut self) {
        self.saved_pose = self.odometry.pose();
    }

    /// Re-zero the pose estimate at the robot's current position.
    pub fn reset_odometry(&mut self) {
        let (left, right) = self.last_distances;
        self.odometry.reset(Pose2d::default(), left, right);
    }

    /// Cumulative wheel travel in meters. The right side is mirrored, so its
    /// reading is negated here along with its outputs in `periodic`.
    fn wheel_distances(&self) -> pros::core::error::Result<(f64, f64)> {
        let left = self.left_front.position()?.into_degrees() / 360.0
            * EXTERNAL_GEAR_RATIO
            * WHEEL_CIRCUMFERENCE_METERS;
        let right = -self.right_front.position()?.into_degrees() / 360.0
            * EXTERNAL_GEAR_RATIO
            * WHEEL_CIRCUMFERENCE_METERS;
        Ok((left, right))
    }
}

impl Subsystem for Drivetrain {
    fn periodic(&mut self) {
        if let Ok((left, right)) = self.wheel_distances() {
            self.last_distances = (left, right);
            self.odometry.update(left, right);
        }

        _ = self.left_front.set_output(self.left_output as f32);
        _ = self.left_rear.set_output(self.left_output as f32);
        _ = self.right_front.set_output(-self.right_output as f32);
        _ = self.right_rear.set_output(-self.right_output as f32);
    }
}
