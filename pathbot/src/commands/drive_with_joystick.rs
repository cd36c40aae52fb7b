use alloc::{rc::Rc, vec, vec::Vec};
use core::cell::RefCell;

use pros::devices::controller::JoystickAxis;
use pros::devices::Controller;
use pros::prelude::*;

use robot_command::{command::Command, AnySubsystem};

use crate::subsystems::drivetrain::Drivetrain;

/// Default drivetrain command: arcade drive from the driver's sticks.
pub struct DriveWithJoystickCommand {
    drivetrain: Rc<RefCell<Drivetrain>>,
    controller: Controller,
    requirements: Vec<AnySubsystem>,
}

impl DriveWithJoystickCommand {
    pub fn new(drivetrain: Rc<RefCell<Drivetrain>>, controller: Controller) -> Self {
        Self {
            requirements: vec![AnySubsystem(drivetrain.clone())],
            drivetrain,
            controller,
        }
    }
}

impl Command for DriveWithJoystickCommand {
    fn get_requirements(&self) -> &[AnySubsystem] {
        &self.requirements
    }

    fn execute(&mut self) -> Result {
        let forward = self.controller.joystick_axis(JoystickAxis::LeftY)?;
        let turn = self.controller.joystick_axis(JoystickAxis::RightX)?;
        self.drivetrain
            .borrow_mut()
            .arcade_drive(forward as f64, turn as f64);
        Ok(())
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.drivetrain.borrow_mut().stop();
        Ok(())
    }
}
