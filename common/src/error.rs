use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClockError {
    #[error("invalid day {0} (expected 0-6)")]
    InvalidDay(i64),
    #[error("invalid hour {0} (expected 0-23)")]
    InvalidHour(i64),
    #[error("invalid minute {0} (expected 0-59)")]
    InvalidMinute(i64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("schedule has {got} entries, expected {expected}")]
    WrongLength { got: usize, expected: usize },
    #[error("invalid temperature {value} at index {index}")]
    InvalidTemperature { index: usize, value: f32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
