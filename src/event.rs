use alloc::{boxed::Box, vec::Vec};

use pros::prelude::*;

/// A list of fallible actions polled once per scheduler iteration.
#[derive(Default)]
pub struct EventLoop {
    events: Vec<Box<dyn FnMut() -> Result>>,
}

impl EventLoop {
    /// Add an action to run when the loop is polled.
    pub fn bind(&mut self, action: impl FnMut() -> Result + 'static) {
        self.events.push(Box::new(action));
    }

    pub fn poll(&mut self) -> Result {
        for event in self.events.iter_mut() {
            event()?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
