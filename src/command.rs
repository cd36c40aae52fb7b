use alloc::{boxed::Box, vec::Vec};

use pros::prelude::*;

use crate::{AnyCommand, AnySubsystem, CommandScheduler};

pub mod trigger;

/// An action the robot can perform. Runs when scheduled, until it is
/// interrupted or it finishes.
pub trait Command {
    fn get_requirements(&self) -> &[AnySubsystem];

    /// The initial subroutine of a command. Called once when the command is
    /// initially scheduled.
    fn initialize(&mut self) -> Result {
        Ok(())
    }
    fn execute(&mut self) -> Result {
        Ok(())
    }
    #[allow(unused_variables)]
    fn end(&mut self, interrupted: bool) -> Result {
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(false)
    }

    fn runs_when_disabled(&self) -> bool {
        false
    }

    fn get_interruption_behavior(&self) -> InterruptionBehavior {
        InterruptionBehavior::default()
    }
}

pub trait CommandRefExt {
    fn schedule(&self) -> Result;
    fn cancel(&self) -> Result;
    fn is_scheduled(&self) -> bool;
}

impl CommandRefExt for AnyCommand {
    fn schedule(&self) -> Result {
        CommandScheduler::schedule(self.clone())
    }

    fn cancel(&self) -> Result {
        CommandScheduler::cancel(self.clone())
    }

    fn is_scheduled(&self) -> bool {
        CommandScheduler::is_scheduled(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptionBehavior {
    #[default]
    CancelSelf,
    CancelIncoming,
}

pub struct FunctionalCommand {
    on_init: Box<dyn FnMut() -> Result>,
    on_execute: Box<dyn FnMut() -> Result>,
    on_end: Box<dyn FnMut(bool) -> Result>,
    is_finished: Box<dyn Fn() -> Result<bool>>,
    requirements: Vec<AnySubsystem>,
}

impl FunctionalCommand {
    pub fn new(
        on_init: impl FnMut() -> Result + 'static,
        on_execute: impl FnMut() -> Result + 'static,
        on_end: impl FnMut(bool) -> Result + 'static,
        is_finished: impl Fn() -> Result<bool> + 'static,
        requirements: Vec<AnySubsystem>,
    ) -> Self {
        Self {
            on_init: Box::new(on_init),
            on_execute: Box::new(on_execute),
            on_end: Box::new(on_end),
            is_finished: Box::new(is_finished),
            requirements,
        }
    }

    /// A command that runs `action` once and finishes immediately.
    pub fn instant(
        action: impl FnMut() -> Result + 'static,
        requirements: Vec<AnySubsystem>,
    ) -> Self {
        Self::new(action, || Ok(()), |_| Ok(()), || Ok(true), requirements)
    }

    /// A command that prints a message and finishes immediately.
    pub fn print(message: &'static str) -> Self {
        Self::instant(
            move || {
                println!("{message}");
                Ok(())
            },
            Vec::new(),
        )
    }
}

impl Command for FunctionalCommand {
    fn get_requirements(&self) -> &[AnySubsystem] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        (self.on_init)()
    }

    fn execute(&mut self) -> Result {
        (self.on_execute)()
    }

    fn end(&mut self, interrupted: bool) -> Result {
        (self.on_end)(interrupted)
    }

    fn is_finished(&self) -> Result<bool> {
        (self.is_finished)()
    }
}

/// Runs a list of commands one after another. The group requires the union of
/// its steps' requirements for its whole lifetime.
pub struct SequentialGroup {
    steps: Vec<AnyCommand>,
    current: usize,
    requirements: Vec<AnySubsystem>,
}

impl SequentialGroup {
    pub fn new(steps: Vec<AnyCommand>) -> Self {
        let mut requirements: Vec<AnySubsystem> = Vec::new();
        for step in &steps {
            for requirement in (**step).borrow().get_requirements() {
                if !requirements.contains(requirement) {
                    requirements.push(requirement.clone());
                }
            }
        }
        Self {
            steps,
            current: 0,
            requirements,
        }
    }

    pub fn and_then(mut self, next: impl Into<AnyCommand>) -> Self {
        let next = next.into();
        for requirement in (*next).borrow().get_requirements() {
            if !self.requirements.contains(requirement) {
                self.requirements.push(requirement.clone());
            }
        }
        self.steps.push(next);
        self
    }
}

impl Command for SequentialGroup {
    fn get_requirements(&self) -> &[AnySubsystem] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.current = 0;
        match self.steps.first() {
            Some(step) => (**step).borrow_mut().initialize(),
            None => Ok(()),
        }
    }

    fn execute(&mut self) -> Result {
        let Some(step) = self.steps.get(self.current) else {
            return Ok(());
        };

        let mut active = (**step).borrow_mut();
        active.execute()?;
        if active.is_finished()? {
            active.end(false)?;
            drop(active);

            self.current += 1;
            if let Some(next) = self.steps.get(self.current) {
                (**next).borrow_mut().initialize()?;
            }
        }
        Ok(())
    }

    fn end(&mut self, interrupted: bool) -> Result {
        if interrupted {
            if let Some(step) = self.steps.get(self.current) {
                (**step).borrow_mut().end(true)?;
            }
        }
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.current >= self.steps.len())
    }
}

#[macro_export]
macro_rules! run_once {
    ($on_init:block) => {
        $crate::command::FunctionalCommand::instant(move || $on_init, ::alloc::vec![])
    };
    ($on_init:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::instant(move || $on_init, ::alloc::vec![$($requirement),+])
    };
}

#[macro_export]
macro_rules! run {
    ($on_execute:block) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $on_execute,
            |_| Ok(()),
            || Ok(false),
            ::alloc::vec![],
        )
    };
    ($on_execute:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $on_execute,
            |_| Ok(()),
            || Ok(false),
            ::alloc::vec![$($requirement),+],
        )
    };
}

#[macro_export]
macro_rules! start_end {
    ($start:block, $end:block) => {
        $crate::command::FunctionalCommand::new(
            move || $start,
            || Ok(()),
            move |_| $end,
            || Ok(false),
            ::alloc::vec![],
        )
    };
    ($start:block, $end:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            move || $start,
            || Ok(()),
            move |_| $end,
            || Ok(false),
            ::alloc::vec![$($requirement),+],
        )
    };
}

#[macro_export]
macro_rules! run_end {
    ($execute:block, $end:block) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $execute,
            move |_| $end,
            || Ok(false),
            ::alloc::vec![],
        )
    };
    ($execute:block, $end:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $execute,
            move |_| $end,
            || Ok(false),
            ::alloc::vec![$($requirement),+],
        )
    };
}
