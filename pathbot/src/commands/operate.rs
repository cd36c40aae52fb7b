use alloc::vec::Vec;

use pros::devices::Controller;
use pros::prelude::*;

use robot_command::{command::Command, AnySubsystem};

/// Operator-console command. Scheduled for the whole driver-control period;
/// the console has nothing to drive yet, so the lifecycle methods are empty.
pub struct OperateCommand {
    // TODO: read the console once the end-effector controls are mapped.
    #[allow(dead_code)]
    console: Controller,
    requirements: Vec<AnySubsystem>,
}

impl OperateCommand {
    pub fn new(console: Controller) -> Self {
        Self {
            console,
            requirements: Vec::new(),
        }
    }
}

impl Command for OperateCommand {
    fn get_requirements(&self) -> &[AnySubsystem] {
        &self.requirements
    }

    fn execute(&mut self) -> Result {
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(false)
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        Ok(())
    }
}
