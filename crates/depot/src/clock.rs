//! Time gate for consumption: working-hours window plus an injectable clock.

use chrono::{Local, NaiveTime, Timelike};

/// Hours of the day during which pickups are allowed.
///
/// The window is `[open_hour, close_hour)` in whole hours. Windows with
/// `open_hour > close_hour` wrap past midnight (e.g. 22 → 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct WorkingHours {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            open_hour: 7,
            close_hour: 23,
        }
    }
}

impl WorkingHours {
    pub fn new(open_hour: u32, close_hour: u32) -> Self {
        Self {
            open_hour,
            close_hour,
        }
    }

    /// Whether `time` falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let hour = time.hour();
        if self.open_hour <= self.close_hour {
            hour >= self.open_hour && hour < self.close_hour
        } else {
            hour >= self.open_hour || hour < self.close_hour
        }
    }
}

/// Time source for the store's working-hours check.
///
/// Injectable so tests can pin the hour instead of reading the system clock.
pub trait Clock: Send + Sync {
    fn time_of_day(&self) -> NaiveTime;
}

/// Production clock reading local wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Clock pinned to a fixed time of day, for deterministic tests.
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn time_of_day(&self) -> NaiveTime {
        self.0
    }
}
