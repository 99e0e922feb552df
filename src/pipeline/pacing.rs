//! Human-paced display delays
//!
//! The trainer pauses through a [`Pacer`] after every displayed transition.
//! Non-interactive runs and tests use [`NoPacer`].

use std::{thread, time::Duration};

/// Delay inserted between displayed frames.
pub trait Pacer: Send {
    fn pause(&mut self);
}

/// Sleeps the current thread for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct SleepPacer {
    delay: Duration,
}

impl SleepPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

impl Pacer for SleepPacer {
    fn pause(&mut self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

impl Pacer for NoPacer {
    fn pause(&mut self) {}
}
