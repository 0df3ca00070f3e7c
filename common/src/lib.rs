pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod forecast;
pub mod history;
pub mod manual_override;
pub mod policy;
pub mod schedule;
pub mod topics;
pub mod types;

pub use clock::{SimClock, SyncOutcome, TimeSync};
pub use config::{ControllerConfig, NetworkConfig, RuntimeConfig, ScheduleLimits};
pub use controller::{
    ClockSynced, ControlAction, HeatingCause, HeatingController, ScheduleReplaced, TickOutcome,
};
pub use error::{ClockError, ControlError, ScheduleError};
pub use forecast::{ForecastEngine, ForecastHorizon, Predictor};
pub use schedule::{DayOfWeek, NextTarget, WeeklySchedule};
pub use topics::*;
pub use types::{
    ControllerReport, ControllerStatus, ForecastView, ScheduleSummary, ScheduleUpdate,
    SettingsUpdate, SettingsView, TimeSyncStatus,
};
