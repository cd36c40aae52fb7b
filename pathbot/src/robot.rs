use alloc::{rc::Rc, vec};
use core::cell::RefCell;

use pros::devices::controller::ControllerButton;
use pros::prelude::*;

use robot_autonomy::chooser::Chooser;
use robot_autonomy::generator::{self, TrajectoryConfig};
use robot_autonomy::trajectory::Trajectory;
use robot_command::command::trigger::Trigger;
use robot_command::command::{CommandRefExt, FunctionalCommand, SequentialGroup};
use robot_command::robot::ScheduledRobot;
use robot_command::subsystem::{Subsystem, SubsystemExt};
use robot_command::{AnyCommand, CommandScheduler};

use crate::commands::drive_with_joystick::DriveWithJoystickCommand;
use crate::commands::follow_trajectory::FollowTrajectoryCommand;
use crate::commands::operate::OperateCommand;
use crate::constants::{auto, controller};
use crate::subsystems::drivetrain::Drivetrain;

/// Pre-generated autonomous path, deployed alongside the program.
const STRAIGHT_TRAJECTORY: &str = include_str!("../paths/output/straight.wpilib.json");

/// The robot's subsystems, controllers and bindings all live here; mode hooks
/// only talk to the scheduler and the chooser.
pub struct Robot {
    drivetrain: Rc<RefCell<Drivetrain>>,
    auto_chooser: Chooser<AnyCommand>,
    active_auto: Option<AnyCommand>,
    operate: AnyCommand,
    select_next_was_pressed: bool,
    select_previous_was_pressed: bool,
}

impl Robot {
    pub fn new() -> pros::core::error::Result<Self> {
        let drivetrain = Drivetrain::new()?.register();

        let mut auto_chooser = Chooser::new();
        match Trajectory::from_json(STRAIGHT_TRAJECTORY) {
            Ok(trajectory) => {
                let follow = FollowTrajectoryCommand::new(drivetrain.clone(), trajectory);
                auto_chooser.set_default("straight", AnyCommand::from(follow));
            }
            Err(error) => println!("failed to load auto trajectory straight: {error}"),
        }

        let robot = Self {
            drivetrain,
            auto_chooser,
            active_auto: None,
            operate: AnyCommand::from(OperateCommand::new(controller::OPERATOR)),
            select_next_was_pressed: false,
            select_previous_was_pressed: false,
        };
        robot.report_selection();
        Ok(robot)
    }

    pub fn configure_default_commands(&mut self) -> pros::core::error::Result {
        CommandScheduler::set_default_command(
            &self.drivetrain,
            DriveWithJoystickCommand::new(self.drivetrain.clone(), controller::DRIVER),
        )?;
        Ok(())
    }

    pub fn configure_button_bindings(&mut self) {
        // Remember where the robot is, for the return path below.
        let drivetrain = self.drivetrain.clone();
        Trigger::button(controller::DRIVER, ControllerButton::LeftTrigger1).on_true(
            self.drivetrain.run_once(move || {
                drivetrain.borrow_mut().save_current_pose();
                Ok(())
            }),
        );

        // Generate a path back to the saved pose and run it. Generation
        // happens at press time so the path starts from the live pose.
        let drivetrain = self.drivetrain.clone();
        Trigger::button(controller::DRIVER, ControllerButton::R1).on_true(
            FunctionalCommand::instant(
                move || {
                    let start = drivetrain.borrow().current_pose();
                    let end = drivetrain.borrow().saved_pose();
                    let config = TrajectoryConfig::new(
                        auto::MAX_VELOCITY_MPS,
                        auto::MAX_ACCELERATION_MPS2,
                    );
                    match generator::generate(start, end, &config) {
                        Ok(trajectory) => {
                            let routine = SequentialGroup::new(vec![AnyCommand::from(
                                FunctionalCommand::print("running path"),
                            )])
                            .and_then(FollowTrajectoryCommand::new(drivetrain.clone(), trajectory))
                            .and_then(FunctionalCommand::print("done running path"));
                            CommandScheduler::schedule(routine)?;
                        }
                        Err(error) => println!("cannot generate return path: {error}"),
                    }
                    Ok(())
                },
                vec![],
            ),
        );

        // Re-zero odometry at the robot's current position.
        let drivetrain = self.drivetrain.clone();
        Trigger::button(controller::DRIVER, ControllerButton::X).on_true(
            self.drivetrain.run_once(move || {
                drivetrain.borrow_mut().reset_odometry();
                Ok(())
            }),
        );
    }

    fn report_selection(&self) {
        match self.auto_chooser.selected_name() {
            Some(name) => println!("auto selected: {name}"),
            None => println!("no auto routines available"),
        }
    }
}

impl ScheduledRobot for Robot {
    fn periodic(&mut self) -> Result {
        CommandScheduler::run()
    }

    fn disabled_init(&mut self) -> Result {
        CommandScheduler::cancel_all()
    }

    /// The chooser is operated from the driver controller while disabled:
    /// arrow buttons cycle, the selection echoes to the terminal.
    fn disabled_periodic(&mut self) -> Result {
        let next = controller::DRIVER.button(ControllerButton::Right);
        let previous = controller::DRIVER.button(ControllerButton::Left);

        if next && !self.select_next_was_pressed {
            self.auto_chooser.next();
            self.report_selection();
        }
        if previous && !self.select_previous_was_pressed {
            self.auto_chooser.previous();
            self.report_selection();
        }

        self.select_next_was_pressed = next;
        self.select_previous_was_pressed = previous;
        Ok(())
    }

    fn autonomous_init(&mut self) -> Result {
        self.active_auto = self.auto_chooser.selected().cloned();
        match &self.active_auto {
            Some(routine) => routine.schedule()?,
            None => println!("no auto routine selected"),
        }
        Ok(())
    }

    fn opcontrol_init(&mut self) -> Result {
        if let Some(routine) = self.active_auto.take() {
            routine.cancel()?;
        }
        self.operate.schedule()
    }
}
