use alloc::{rc::Rc, vec, vec::Vec};
use core::cell::RefCell;

use pros::prelude::*;

use robot_autonomy::kinematics::DifferentialDriveKinematics;
use robot_autonomy::ramsete::RamseteController;
use robot_autonomy::trajectory::Trajectory;
use robot_command::{command::Command, robot::ITERATION_PERIOD, AnySubsystem};

use crate::constants::drivetrain::{MAX_SPEED_MPS, TRACK_WIDTH_METERS};
use crate::subsystems::drivetrain::Drivetrain;

/// Drives the trajectory with the ramsete controller against odometry.
/// Time advances by the scheduler's fixed iteration period, so sampling is
/// deterministic.
pub struct FollowTrajectoryCommand {
    drivetrain: Rc<RefCell<Drivetrain>>,
    trajectory: Trajectory,
    controller: RamseteController,
    kinematics: DifferentialDriveKinematics,
    elapsed: f64,
    requirements: Vec<AnySubsystem>,
}

impl FollowTrajectoryCommand {
    pub fn new(drivetrain: Rc<RefCell<Drivetrain>>, trajectory: Trajectory) -> Self {
        Self {
            requirements: vec![AnySubsystem(drivetrain.clone())],
            drivetrain,
            trajectory,
            controller: RamseteController::default(),
            kinematics: DifferentialDriveKinematics::new(TRACK_WIDTH_METERS),
            elapsed: 0.0,
        }
    }
}

impl Command for FollowTrajectoryCommand {
    fn get_requirements(&self) -> &[AnySubsystem] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.elapsed = 0.0;
        Ok(())
    }

    fn execute(&mut self) -> Result {
        self.elapsed += ITERATION_PERIOD.as_secs_f64();
        let desired = self.trajectory.sample(self.elapsed);

        let mut drivetrain = self.drivetrain.borrow_mut();
        let speeds = self
            .controller
            .calculate(&drivetrain.current_pose(), &desired);
        let mut wheels = self.kinematics.to_wheel_speeds(speeds);
        wheels.desaturate(MAX_SPEED_MPS);
        drivetrain.drive_wheel_speeds(wheels);
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.elapsed >= self.trajectory.total_time())
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.drivetrain.borrow_mut().stop();
        Ok(())
    }
}
