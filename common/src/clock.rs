use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::{
    error::ClockError,
    schedule::{DayOfWeek, DAYS_PER_WEEK, HOURS_PER_DAY},
};

/// Wall-clock position pushed by the clock-sync collaborator.
///
/// Fields are kept wide so out-of-range requests reach validation instead of
/// failing to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSync {
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
}

impl TimeSync {
    pub fn from_datetime<T: Datelike + Timelike>(now: &T) -> Self {
        Self {
            day: DayOfWeek::from_chrono(now.weekday()).index() as i64,
            hour: now.hour() as i64,
            minute: now.minute() as i64,
        }
    }

    pub fn validate(&self) -> Result<(), ClockError> {
        if !(0..DAYS_PER_WEEK as i64).contains(&self.day) {
            return Err(ClockError::InvalidDay(self.day));
        }
        if !(0..HOURS_PER_DAY as i64).contains(&self.hour) {
            return Err(ClockError::InvalidHour(self.hour));
        }
        if !(0..60).contains(&self.minute) {
            return Err(ClockError::InvalidMinute(self.minute));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub first_sync: bool,
}

/// Simulated week clock advanced by control ticks.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    hour: f64,
    day: u8,
    synced: bool,
    last_sync: Option<TimeSync>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, delta_hours: f64) {
        if !delta_hours.is_finite() || delta_hours <= 0.0 {
            return;
        }
        self.hour += delta_hours;
        while self.hour >= HOURS_PER_DAY as f64 {
            self.hour -= HOURS_PER_DAY as f64;
            self.day = ((self.day as usize + 1) % DAYS_PER_WEEK) as u8;
        }
    }

    /// Jumps straight to the given time. Invalid input leaves the clock untouched.
    pub fn sync(&mut self, time: TimeSync) -> Result<SyncOutcome, ClockError> {
        time.validate()?;

        let first_sync = !self.synced;
        self.day = time.day as u8;
        self.hour = time.hour as f64 + time.minute as f64 / 60.0;
        self.synced = true;
        self.last_sync = Some(time);

        Ok(SyncOutcome { first_sync })
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> f64 {
        self.hour
    }

    pub fn hour_of_day(&self) -> u8 {
        self.hour.floor() as u8
    }

    pub fn minute(&self) -> u8 {
        // Nudge past representation error so 08:07 does not read back as 08:06.
        ((self.hour - self.hour.floor()) * 60.0 + 1e-6).floor().min(59.0) as u8
    }

    /// Hours since Monday 00:00.
    pub fn absolute_hour(&self) -> usize {
        self.day as usize * HOURS_PER_DAY + self.hour_of_day() as usize
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn last_sync(&self) -> Option<TimeSync> {
        self.last_sync
    }
}
