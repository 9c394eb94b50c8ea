use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};

/// Source of registration timestamps.
pub trait Clock: fmt::Debug {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock, truncated to whole seconds so a timestamp survives a
/// save/load round trip unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
