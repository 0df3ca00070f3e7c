use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::{config::ScheduleLimits, error::ScheduleError};

pub const DAYS_PER_WEEK: usize = 7;
pub const HOURS_PER_DAY: usize = 24;
pub const SLOTS_PER_WEEK: usize = DAYS_PER_WEEK * HOURS_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub fn index(self) -> usize {
        match self {
            Self::Mon => 0,
            Self::Tue => 1,
            Self::Wed => 2,
            Self::Thu => 3,
            Self::Fri => 4,
            Self::Sat => 5,
            Self::Sun => 6,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index % DAYS_PER_WEEK {
            0 => Self::Mon,
            1 => Self::Tue,
            2 => Self::Wed,
            3 => Self::Thu,
            4 => Self::Fri,
            5 => Self::Sat,
            _ => Self::Sun,
        }
    }

    pub fn from_chrono(weekday: Weekday) -> Self {
        Self::from_index(weekday.num_days_from_monday() as usize)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }
}

/// The first set slot found searching forward from some point in the week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NextTarget {
    pub temperature: f32,
    pub day: u8,
    pub hour: u8,
}

/// Target temperature for every hour of the week, indexed `day * 24 + hour`.
///
/// A slot of 0 means no target is set for that hour.
///
/// Persisted as a plain array of 168 values. Loading goes through
/// [`WeeklySchedule::from_slots`] so the configured limits apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Vec<f32>")]
pub struct WeeklySchedule {
    slots: Vec<f32>,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::empty()
    }
}

impl WeeklySchedule {
    pub fn empty() -> Self {
        Self {
            slots: vec![0.0; SLOTS_PER_WEEK],
        }
    }

    /// Office default: warm up at 07:00, set back at 09:00, warm again at 18:00, night at 23:00.
    pub fn office_default() -> Self {
        let mut schedule = Self::empty();
        for day in 0..DAYS_PER_WEEK {
            let base = day * HOURS_PER_DAY;
            schedule.slots[base + 7] = 22.0;
            schedule.slots[base + 9] = 18.0;
            schedule.slots[base + 18] = 22.0;
            schedule.slots[base + 23] = 18.0;
        }
        schedule
    }

    pub fn slots(&self) -> &[f32] {
        &self.slots
    }

    pub fn set_count(&self) -> usize {
        self.slots.iter().filter(|slot| **slot > 0.0).count()
    }

    /// Target for a given day and hour, 0 when unset or out of range.
    pub fn get_target(&self, day: usize, hour: usize) -> f32 {
        if day >= DAYS_PER_WEEK || hour >= HOURS_PER_DAY {
            return 0.0;
        }
        self.slots[day * HOURS_PER_DAY + hour]
    }

    /// Target for an hour counted from Monday 00:00, wrapping every week.
    pub fn target_at(&self, absolute_hour: usize) -> f32 {
        self.slots[absolute_hour % SLOTS_PER_WEEK]
    }

    /// First set slot after the current one, searching forward around the week.
    ///
    /// The current slot itself is never returned, even when it is the only one set.
    pub fn find_next_target(&self, day: usize, hour: usize) -> Option<NextTarget> {
        let current = (day % DAYS_PER_WEEK) * HOURS_PER_DAY + hour.min(HOURS_PER_DAY - 1);

        (1..SLOTS_PER_WEEK)
            .map(|offset| (current + offset) % SLOTS_PER_WEEK)
            .find(|index| self.slots[*index] > 0.0)
            .map(|index| NextTarget {
                temperature: self.slots[index],
                day: (index / HOURS_PER_DAY) as u8,
                hour: (index % HOURS_PER_DAY) as u8,
            })
    }

    pub fn from_slots(slots: Vec<f32>, limits: &ScheduleLimits) -> Result<Self, ScheduleError> {
        Self::validate(&slots, limits)?;
        Ok(Self { slots })
    }

    /// Replaces every slot at once. Nothing changes unless all values are valid.
    pub fn replace(&mut self, values: &[f32], limits: &ScheduleLimits) -> Result<(), ScheduleError> {
        Self::validate(values, limits)?;
        self.slots.copy_from_slice(values);
        Ok(())
    }

    fn validate(values: &[f32], limits: &ScheduleLimits) -> Result<(), ScheduleError> {
        if values.len() != SLOTS_PER_WEEK {
            return Err(ScheduleError::WrongLength {
                got: values.len(),
                expected: SLOTS_PER_WEEK,
            });
        }

        match values.iter().position(|value| !limits.accepts(*value)) {
            Some(index) => Err(ScheduleError::InvalidTemperature {
                index,
                value: values[index],
            }),
            None => Ok(()),
        }
    }
}

impl From<WeeklySchedule> for Vec<f32> {
    fn from(schedule: WeeklySchedule) -> Self {
        schedule.slots
    }
}
