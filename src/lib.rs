#![no_std]

extern crate alloc;

use alloc::{rc::Rc, vec::Vec};
use core::{
    cell::{Cell, RefCell},
    hash::Hash,
    ops::Deref,
};

use hashbrown::{HashMap, HashSet};
use pros::core::os_task_local;
use pros::devices::competition::{self, CompetitionMode};
use pros::prelude::*;
use snafu::Snafu;

use command::{Command, InterruptionBehavior};
use event::EventLoop;
use subsystem::Subsystem;

pub mod command;
pub mod event;
pub mod robot;
pub mod subsystem;

/// Shared handle to a registered subsystem. Equality and hashing are by
/// identity: two handles are equal only if they point at the same instance.
#[derive(Clone)]
pub struct AnySubsystem(pub Rc<RefCell<dyn Subsystem>>);

impl PartialEq for AnySubsystem {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for AnySubsystem {}

impl Hash for AnySubsystem {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl From<Rc<RefCell<dyn Subsystem>>> for AnySubsystem {
    fn from(subsystem: Rc<RefCell<dyn Subsystem>>) -> Self {
        Self(subsystem)
    }
}

impl<T: Subsystem + 'static> From<T> for AnySubsystem {
    fn from(subsystem: T) -> Self {
        Self(Rc::new(RefCell::new(subsystem)))
    }
}

impl Deref for AnySubsystem {
    type Target = Rc<RefCell<dyn Subsystem>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Shared handle to a command, with the same identity semantics as
/// [`AnySubsystem`].
#[derive(Clone)]
pub struct AnyCommand(pub Rc<RefCell<dyn Command>>);

impl PartialEq for AnyCommand {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for AnyCommand {}

impl Hash for AnyCommand {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl From<Rc<RefCell<dyn Command>>> for AnyCommand {
    fn from(command: Rc<RefCell<dyn Command>>) -> Self {
        Self(command)
    }
}

impl<T: Command + 'static> From<T> for AnyCommand {
    fn from(command: T) -> Self {
        Self(Rc::new(RefCell::new(command)))
    }
}

impl Deref for AnyCommand {
    type Target = Rc<RefCell<dyn Command>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Snafu)]
pub enum SetDefaultCommandError {
    #[snafu(display("Default commands must require their subsystem."))]
    MustRequireSubsystem,
    #[snafu(display("Cannot set the default command on a subsystem that is not registered."))]
    NotRegistered,
}

#[derive(Default)]
struct SchedulerState {
    /// Registered subsystems and their optional default commands.
    subsystems: RefCell<HashMap<AnySubsystem, Option<AnyCommand>>>,
    running: RefCell<HashSet<AnyCommand>>,
    /// Which running command currently owns each required subsystem.
    requirements: RefCell<HashMap<AnySubsystem, AnyCommand>>,
    in_run_loop: Cell<bool>,
    queued_schedule: RefCell<Vec<AnyCommand>>,
    queued_cancel: RefCell<Vec<AnyCommand>>,
    /// Commands whose `end` is on the stack; guards re-entrant cancellation.
    ending: RefCell<HashSet<AnyCommand>>,
    button_loop: Rc<RefCell<EventLoop>>,
}

impl SchedulerState {
    #[inline]
    fn is_running(&self, command: &AnyCommand) -> bool {
        self.running.borrow().contains(command)
    }

    fn release_requirements(&self, command: &AnyCommand) {
        self.requirements
            .borrow_mut()
            .retain(|_, holder| holder != command);
    }

    fn start_command(&self, command: AnyCommand, requirements: HashSet<AnySubsystem>) -> Result {
        {
            let mut owned = self.requirements.borrow_mut();
            for requirement in requirements {
                owned.insert(requirement, command.clone());
            }
        }
        self.running.borrow_mut().insert(command.clone());
        (*command.0).borrow_mut().initialize()
    }

    fn schedule_now(&self, command: AnyCommand) -> Result {
        if self.is_running(&command) {
            return Ok(());
        }

        if competition::mode() == CompetitionMode::Disabled
            && !(*command.0).borrow().runs_when_disabled()
        {
            return Ok(());
        }

        let requirements = CommandScheduler::requirements_of(&*(*command.0).borrow());

        let holders = {
            let owned = self.requirements.borrow();
            requirements
                .iter()
                .filter_map(|requirement| owned.get(requirement).cloned())
                .collect::<Vec<_>>()
        };

        for holder in &holders {
            if (*holder.0).borrow().get_interruption_behavior()
                == InterruptionBehavior::CancelIncoming
            {
                return Ok(());
            }
        }

        for holder in &holders {
            self.cancel(holder)?;
        }

        self.start_command(command, requirements)
    }

    fn cancel(&self, command: &AnyCommand) -> Result {
        if self.ending.borrow().contains(command) {
            return Ok(());
        }

        if self.in_run_loop.get() {
            self.queued_cancel.borrow_mut().push(command.clone());
            return Ok(());
        }

        if !self.is_running(command) {
            return Ok(());
        }

        self.ending.borrow_mut().insert(command.clone());
        let ended = (*command.0).borrow_mut().end(true);
        self.ending.borrow_mut().remove(command);
        ended?;

        self.running.borrow_mut().remove(command);
        self.release_requirements(command);
        Ok(())
    }
}

os_task_local! {
    static STATE: SchedulerState = SchedulerState::default();
}

pub struct CommandScheduler;

impl CommandScheduler {
    /// Register a subsystem with the scheduler.
    pub fn register<S: Subsystem + 'static>(subsystem: S) -> Rc<RefCell<S>> {
        let subsystem = Rc::new(RefCell::new(subsystem));
        STATE.with(|state| {
            state
                .subsystems
                .borrow_mut()
                .insert(AnySubsystem(subsystem.clone()), None);
        });
        subsystem
    }

    /// Schedule a command to run. Requests raised while the run loop is in
    /// progress are deferred to the end of that iteration.
    pub fn schedule(command: impl Into<AnyCommand>) -> Result {
        let command = command.into();
        STATE.with(|state| {
            if state.in_run_loop.get() {
                state.queued_schedule.borrow_mut().push(command);
                return Ok(());
            }

            state.schedule_now(command)
        })
    }

    pub fn cancel(command: impl Into<AnyCommand>) -> Result {
        let command = command.into();
        STATE.with(|state| state.cancel(&command))
    }

    pub fn cancel_all() -> Result {
        STATE.with(|state| {
            let running = state.running.borrow().iter().cloned().collect::<Vec<_>>();
            for command in running {
                state.cancel(&command)?;
            }
            Ok(())
        })
    }

    pub fn set_default_command<S>(
        subsystem: &Rc<RefCell<S>>,
        command: impl Command + 'static,
    ) -> core::result::Result<(), SetDefaultCommandError>
    where
        S: Subsystem + 'static,
    {
        STATE.with(|state| {
            let requirements = CommandScheduler::requirements_of(&command);
            if !requirements.contains(&AnySubsystem(subsystem.clone())) {
                return Err(SetDefaultCommandError::MustRequireSubsystem);
            }

            let mut subsystems = state.subsystems.borrow_mut();
            let slot = subsystems
                .get_mut(&AnySubsystem(subsystem.clone()))
                .ok_or(SetDefaultCommandError::NotRegistered)?;
            slot.replace(AnyCommand::from(command));
            Ok(())
        })
    }

    pub fn remove_default_command<S>(subsystem: &Rc<RefCell<S>>) -> Option<AnyCommand>
    where
        S: Subsystem + 'static,
    {
        STATE.with(|state| {
            state
                .subsystems
                .borrow_mut()
                .get_mut(&AnySubsystem(subsystem.clone()))?
                .take()
        })
    }

    /// One scheduler iteration: subsystem periodics, button bindings, command
    /// execution, then deferred schedule/cancel requests and default commands.
    pub fn run() -> Result {
        STATE.with(|state| {
            for subsystem in state.subsystems.borrow().keys() {
                let mut subsystem = (*subsystem.0).borrow_mut();
                subsystem.periodic();
                if robot::is_sim() {
                    subsystem.sim_periodic();
                }
            }

            // Bindings run with the loop flag already set so anything they
            // schedule or cancel is deferred rather than re-entrant.
            state.in_run_loop.set(true);

            let button_loop = state.button_loop.clone();
            let mut outcome = (*button_loop).borrow_mut().poll();

            if outcome.is_ok() {
                let disabled = competition::mode() == CompetitionMode::Disabled;
                let running = state.running.borrow().iter().cloned().collect::<Vec<_>>();
                outcome = Self::run_commands(state, &running, disabled);
            }

            state.in_run_loop.set(false);

            if let Err(error) = outcome {
                state.queued_schedule.borrow_mut().clear();
                state.queued_cancel.borrow_mut().clear();
                return Err(error);
            }

            let queued_schedule = state.queued_schedule.take();
            for command in queued_schedule {
                state.schedule_now(command)?;
            }

            let queued_cancel = state.queued_cancel.take();
            for command in queued_cancel {
                state.cancel(&command)?;
            }

            // Re-arm default commands for subsystems nothing requires.
            let idle_defaults = {
                let subsystems = state.subsystems.borrow();
                let owned = state.requirements.borrow();
                subsystems
                    .iter()
                    .filter(|(subsystem, _)| !owned.contains_key(*subsystem))
                    .filter_map(|(_, default)| default.clone())
                    .collect::<Vec<_>>()
            };
            for command in idle_defaults {
                state.schedule_now(command)?;
            }

            Ok(())
        })
    }

    fn run_commands(state: &SchedulerState, running: &[AnyCommand], disabled: bool) -> Result {
        for command in running {
            let mut command_ref = (*command.0).borrow_mut();

            if disabled && !command_ref.runs_when_disabled() {
                state.queued_cancel.borrow_mut().push(command.clone());
                continue;
            }

            command_ref.execute()?;

            if command_ref.is_finished()? {
                state.ending.borrow_mut().insert(command.clone());
                let ended = command_ref.end(false);
                state.ending.borrow_mut().remove(command);
                ended?;

                state.running.borrow_mut().remove(command);
                state.release_requirements(command);
            }
        }
        Ok(())
    }

    fn requirements_of(command: &dyn Command) -> HashSet<AnySubsystem> {
        command.get_requirements().iter().cloned().collect()
    }

    pub fn button_event_loop() -> Rc<RefCell<EventLoop>> {
        STATE.with(|state| state.button_loop.clone())
    }

    pub fn is_scheduled(command: &AnyCommand) -> bool {
        STATE.with(|state| state.is_running(command))
    }
}
