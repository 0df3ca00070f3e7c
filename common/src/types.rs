use serde::{Deserialize, Serialize};

use crate::schedule::NextTarget;

/// State published after every tick once the clock is synced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerReport {
    pub temperature: Option<f32>,
    #[serde(rename = "predictedTemp")]
    pub predicted_temp: Option<f32>,
    #[serde(rename = "targetTemp")]
    pub target_temp: Option<f32>,
    #[serde(rename = "nextTarget")]
    pub next_target: Option<NextTarget>,
    #[serde(rename = "heatingOn")]
    pub heating_on: bool,
    #[serde(rename = "manualOverride")]
    pub manual_override: bool,
    #[serde(rename = "overrideCyclesRemaining")]
    pub override_cycles_remaining: u64,
    #[serde(rename = "autoEnabled")]
    pub auto_enabled: bool,
    #[serde(rename = "optimizationEvent")]
    pub optimization_event: bool,
    #[serde(rename = "clockSynced")]
    pub clock_synced: bool,
    #[serde(rename = "scheduleInitialized")]
    pub schedule_initialized: bool,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

/// Report plus controller internals; available before the first sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerStatus {
    #[serde(flatten)]
    pub report: ControllerReport,
    pub predictor: &'static str,
    #[serde(rename = "lastDecision")]
    pub last_decision: Option<&'static str>,
    #[serde(rename = "maxGap")]
    pub max_gap: Option<f32>,
    #[serde(rename = "ticksUntilCheck")]
    pub ticks_until_check: u32,
    #[serde(rename = "historyFilled")]
    pub history_filled: bool,
    #[serde(rename = "samplesPushed")]
    pub samples_pushed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub initialized: bool,
    #[serde(rename = "targetTemp")]
    pub target_temp: Option<f32>,
    #[serde(rename = "nextTarget")]
    pub next_target: Option<NextTarget>,
    #[serde(rename = "setCount")]
    pub set_count: usize,
}

/// Body of a schedule replace: 168 whole-degree slots, `day * 24 + hour`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub schedule: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSyncStatus {
    pub synced: bool,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

/// Partial settings write. Keys are the node's short setting names; values are
/// clamped rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    /// Manual override, 0 or 1.
    #[serde(rename = "mo", skip_serializing_if = "Option::is_none")]
    pub manual_override: Option<i64>,
    /// Optimization event flag, 0 or 1.
    #[serde(rename = "oe", skip_serializing_if = "Option::is_none")]
    pub optimization_event: Option<i64>,
    /// Heating status, 0 or 1.
    #[serde(rename = "hs", skip_serializing_if = "Option::is_none")]
    pub heating_status: Option<i64>,
    /// Status indicator flag, 0 or 1.
    #[serde(rename = "ls", skip_serializing_if = "Option::is_none")]
    pub led_status: Option<i64>,
    /// Override duration in control cycles.
    #[serde(rename = "od", skip_serializing_if = "Option::is_none")]
    pub override_duration: Option<i64>,
    /// Automatic control, 0 or 1.
    #[serde(rename = "ab", skip_serializing_if = "Option::is_none")]
    pub auto_behavior: Option<i64>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettingsView {
    #[serde(rename = "manualOverride")]
    pub manual_override: bool,
    #[serde(rename = "optimizationEvent")]
    pub optimization_event: bool,
    #[serde(rename = "heatingStatus")]
    pub heating_status: bool,
    #[serde(rename = "ledStatus")]
    pub led_status: bool,
    #[serde(rename = "overrideDuration")]
    pub override_duration: u64,
    #[serde(rename = "autoBehaviorEnabled")]
    pub auto_behavior_enabled: bool,
    #[serde(rename = "scheduleInitialized")]
    pub schedule_initialized: bool,
    #[serde(rename = "targetTemp")]
    pub target_temp: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub predictor: &'static str,
    #[serde(rename = "stepMinutes")]
    pub step_minutes: u32,
    /// Empty until the first forecast has run.
    pub predictions: Vec<f32>,
}
