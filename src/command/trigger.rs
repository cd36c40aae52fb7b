use alloc::rc::Rc;
use core::cell::RefCell;

use pros::devices::controller::ControllerButton;
use pros::devices::Controller;
use pros::prelude::*;

use super::CommandRefExt;
use crate::{event::EventLoop, AnyCommand, CommandScheduler};

/// A boolean condition polled by an [`EventLoop`], used to bind commands to
/// controller buttons. Bindings fire from the scheduler's run loop, so
/// scheduling from a binding is deferred, never re-entrant.
pub struct Trigger {
    event_loop: Rc<RefCell<EventLoop>>,
    condition: Rc<dyn Fn() -> bool>,
}

impl Trigger {
    pub fn new_with_loop(
        event_loop: Rc<RefCell<EventLoop>>,
        condition: impl Fn() -> bool + 'static,
    ) -> Self {
        Self {
            event_loop,
            condition: Rc::new(condition),
        }
    }

    pub fn new(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            event_loop: CommandScheduler::button_event_loop(),
            condition: Rc::new(condition),
        }
    }

    pub fn button(controller: Controller, button: ControllerButton) -> Self {
        Self::new(move || controller.button(button).unwrap_or(false))
    }

    /// Schedule the command whenever the condition goes from false to true.
    pub fn on_true(self, command: impl Into<AnyCommand>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                command.schedule()?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    /// Schedule the command whenever the condition goes from true to false.
    pub fn on_false(self, command: impl Into<AnyCommand>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                command.schedule()?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    /// Schedule on the rising edge, cancel on the falling edge.
    pub fn while_true(self, command: impl Into<AnyCommand>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                command.schedule()?;
            } else if pressed_last && !pressed {
                command.cancel()?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    /// Toggle the command between scheduled and cancelled on each rising edge.
    pub fn toggle_on_true(self, command: impl Into<AnyCommand>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                if command.is_scheduled() {
                    command.cancel()?;
                } else {
                    command.schedule()?;
                }
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn is_active(&self) -> bool {
        (self.condition)()
    }

    pub fn and(&self, other: &Self) -> Self {
        let condition = self.condition.clone();
        let other_condition = other.condition.clone();
        Self::new(move || condition() && other_condition())
    }

    pub fn or(&self, other: &Self) -> Self {
        let condition = self.condition.clone();
        let other_condition = other.condition.clone();
        Self::new(move || condition() || other_condition())
    }

    pub fn negate(&self) -> Self {
        let condition = self.condition.clone();
        Self::new(move || !condition())
    }
}
