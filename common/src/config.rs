use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeConfig {
    pub tick_seconds: u64,
    pub check_interval_ticks: u32,
    pub history_len: usize,
    pub horizon_steps: usize,
    pub step_minutes: u32,
    pub default_history_c: f32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 15,
            check_interval_ticks: 120,
            history_len: 96,
            horizon_steps: 96,
            step_minutes: 15,
            default_history_c: 20.0,
        }
    }
}

impl NodeConfig {
    pub fn tick_hours(&self) -> f64 {
        self.tick_seconds as f64 / 3600.0
    }

    pub fn sanitize(&mut self) {
        self.tick_seconds = self.tick_seconds.clamp(1, 3_600);
        self.check_interval_ticks = self.check_interval_ticks.max(1);
        self.history_len = self.history_len.clamp(1, 1_024);
        self.horizon_steps = self.horizon_steps.clamp(1, 1_024);
        self.step_minutes = self.step_minutes.clamp(1, 60);
        if !self.default_history_c.is_finite() {
            self.default_history_c = 20.0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorKind {
    Persistence,
    DampedTrend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastConfig {
    pub scaler_min_c: f32,
    pub scaler_range_c: f32,
    pub predictor: PredictorKind,
    pub quantize_inputs: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            scaler_min_c: 5.0,
            scaler_range_c: 30.0,
            predictor: PredictorKind::DampedTrend,
            quantize_inputs: false,
        }
    }
}

impl ForecastConfig {
    pub fn sanitize(&mut self) {
        if !self.scaler_min_c.is_finite() {
            self.scaler_min_c = 5.0;
        }
        if !self.scaler_range_c.is_finite() || self.scaler_range_c <= 0.0 {
            self.scaler_range_c = 30.0;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    pub turn_on_threshold_c: f32,
    pub turn_off_threshold_c: f32,
    pub fallback_min_c: f32,
    pub fallback_max_c: f32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            turn_on_threshold_c: 1.0,
            turn_off_threshold_c: 2.0,
            fallback_min_c: 10.0,
            fallback_max_c: 20.0,
        }
    }
}

impl PolicyConfig {
    pub fn sanitize(&mut self) {
        self.turn_on_threshold_c = self.turn_on_threshold_c.clamp(0.1, 10.0);
        self.turn_off_threshold_c = self.turn_off_threshold_c.clamp(0.1, 10.0);
        if self.fallback_min_c > self.fallback_max_c {
            std::mem::swap(&mut self.fallback_min_c, &mut self.fallback_max_c);
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleLimits {
    pub min_target_c: f32,
    pub max_target_c: f32,
}

impl Default for ScheduleLimits {
    fn default() -> Self {
        Self {
            min_target_c: 10.0,
            max_target_c: 30.0,
        }
    }
}

impl ScheduleLimits {
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        if !self.min_target_c.is_finite() {
            self.min_target_c = defaults.min_target_c;
        }
        if !self.max_target_c.is_finite() {
            self.max_target_c = defaults.max_target_c;
        }
        if self.min_target_c > self.max_target_c {
            std::mem::swap(&mut self.min_target_c, &mut self.max_target_c);
        }
    }

    pub fn accepts(&self, value: f32) -> bool {
        value == 0.0 || (self.min_target_c..=self.max_target_c).contains(&value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_user: String,
    pub mqtt_pass: String,
    pub client_id: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mqtt_host: "127.0.0.1".to_string(),
            mqtt_port: 1883,
            mqtt_user: String::new(),
            mqtt_pass: String::new(),
            client_id: "office-heating-node".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    pub node: NodeConfig,
    pub forecast: ForecastConfig,
    pub policy: PolicyConfig,
    pub limits: ScheduleLimits,
}

impl ControllerConfig {
    pub fn sanitize(&mut self) {
        self.node.sanitize();
        self.forecast.sanitize();
        self.policy.sanitize();
        self.limits.sanitize();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub controller: ControllerConfig,
    pub network: NetworkConfig,
    pub timezone: String,
    /// Seconds between clock syncs taken from system time. 0 disables it.
    pub time_sync_interval_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            network: NetworkConfig::default(),
            timezone: "Europe/Rome".to_string(),
            time_sync_interval_secs: 300,
        }
    }
}
