#![no_std]
#![no_main]

extern crate alloc;

use pros::prelude::*;

use robot::Robot;

mod commands;
mod constants;
mod robot;
mod subsystems;

#[derive(Default)]
struct Pathbot;

impl SyncRobot for Pathbot {
    fn opcontrol(&mut self) -> pros::core::error::Result {
        let mut robot = Robot::new()?;
        robot.configure_default_commands()?;
        robot.configure_button_bindings();
        robot_command::robot::start_robot(robot)
    }
}

sync_robot!(Pathbot);
