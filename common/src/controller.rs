use crate::{
    clock::{SimClock, SyncOutcome, TimeSync},
    config::ControllerConfig,
    error::ControlError,
    forecast::{ForecastEngine, ForecastHorizon},
    history::{HistoryBuffer, Sample},
    manual_override::{OverrideSession, OverrideTick},
    policy::{self, Decision, DecisionReason, PolicyInputs},
    schedule::{NextTarget, WeeklySchedule},
    types::{
        ControllerReport, ControllerStatus, ForecastView, ScheduleSummary, SettingsUpdate,
        SettingsView, TimeSyncStatus,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatingCause {
    Policy(DecisionReason),
    Button,
    Settings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    HeatingChanged {
        on: bool,
        cause: HeatingCause,
    },
    ForecastUpdated {
        immediate: f32,
        last: f32,
    },
    TargetChanged {
        from: Option<f32>,
        to: Option<f32>,
    },
    NextTargetChanged(Option<NextTarget>),
    OverrideChanged {
        active: bool,
        forced: Option<bool>,
    },
    OverrideExpired,
    /// Heating was switched off because the forecast overshoots every target.
    OptimizationEvent {
        max_gap: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub actions: Vec<ControlAction>,
    /// `None` until the clock has been synced.
    pub report: Option<ControllerReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClockSynced {
    pub first_sync: bool,
    pub actions: Vec<ControlAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleReplaced {
    pub summary: ScheduleSummary,
    pub actions: Vec<ControlAction>,
}

/// The whole node: history, forecast, schedule, override and clock.
///
/// Every operation runs to completion on `&mut self`; the host serializes
/// ticks, commands and queries through one lock.
#[derive(Debug, Clone)]
pub struct HeatingController {
    config: ControllerConfig,
    history: HistoryBuffer,
    engine: ForecastEngine,
    horizon: Option<ForecastHorizon>,
    schedule: WeeklySchedule,
    schedule_initialized: bool,
    manual_override: OverrideSession,
    clock: SimClock,

    heating: bool,
    auto_enabled: bool,
    optimization_event: bool,
    led_on: bool,

    current_target: Option<f32>,
    next_target: Option<NextTarget>,
    ticks_since_check: u32,
    last_temperature: Option<f32>,
    last_decision: Option<Decision>,
}

impl HeatingController {
    /// Starts with the office default schedule.
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_schedule(config, WeeklySchedule::office_default())
    }

    pub fn with_schedule(config: ControllerConfig, schedule: WeeklySchedule) -> Self {
        let mut config = config;
        config.sanitize();
        let engine = ForecastEngine::from_config(
            &config.forecast,
            config.node.horizon_steps,
            config.node.step_minutes,
        );
        Self::with_engine(config, engine, schedule)
    }

    /// Uses a caller-supplied forecast engine; `config` is taken as given.
    pub fn with_engine(
        config: ControllerConfig,
        engine: ForecastEngine,
        schedule: WeeklySchedule,
    ) -> Self {
        let history =
            HistoryBuffer::with_default(config.node.history_len, config.node.default_history_c);
        // An empty week counts as uninitialized until a replace is accepted.
        let schedule_initialized = schedule.set_count() > 0;
        let mut controller = Self {
            config,
            history,
            engine,
            horizon: None,
            schedule,
            schedule_initialized,
            manual_override: OverrideSession::default(),
            clock: SimClock::new(),
            heating: false,
            auto_enabled: true,
            optimization_event: false,
            led_on: false,
            current_target: None,
            next_target: None,
            ticks_since_check: 0,
            last_temperature: None,
            last_decision: None,
        };
        controller.current_target = controller.scheduled_target();
        controller
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_heating(&self) -> bool {
        self.heating
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    pub fn manual_override(&self) -> &OverrideSession {
        &self.manual_override
    }

    pub fn current_target(&self) -> Option<f32> {
        self.current_target
    }

    pub fn next_target(&self) -> Option<NextTarget> {
        self.next_target
    }

    pub fn last_decision(&self) -> Option<Decision> {
        self.last_decision
    }

    pub fn horizon(&self) -> Option<&ForecastHorizon> {
        self.horizon.as_ref()
    }

    /// One control cycle. Non-finite readings are not recorded, the rest of
    /// the cycle still runs.
    pub fn on_tick(&mut self, celsius: f32) -> TickOutcome {
        let mut actions = Vec::new();

        if self.manual_override.tick() == OverrideTick::Expired {
            self.auto_enabled = true;
            actions.push(ControlAction::OverrideExpired);
        }

        self.clock.advance(self.config.node.tick_hours());

        if celsius.is_finite() {
            self.history
                .push(Sample::new(celsius, self.clock.day(), self.clock.hour() as f32));
            self.last_temperature = Some(celsius);
        }

        self.refresh_current_target(&mut actions);

        self.ticks_since_check += 1;
        if self.ticks_since_check >= self.config.node.check_interval_ticks {
            self.ticks_since_check = 0;
            self.recompute_forecast(&mut actions);
            if self.clock.is_synced() {
                self.refresh_next_target(&mut actions);
                self.run_policy(&mut actions);
            }
        }

        TickOutcome {
            actions,
            report: self.report(),
        }
    }

    pub fn sync_clock(&mut self, time: TimeSync) -> Result<ClockSynced, ControlError> {
        let SyncOutcome { first_sync } = self.clock.sync(time)?;

        let mut actions = Vec::new();
        self.refresh_current_target(&mut actions);
        self.refresh_next_target(&mut actions);
        if first_sync {
            self.recompute_forecast(&mut actions);
        }
        Ok(ClockSynced {
            first_sync,
            actions,
        })
    }

    /// Replaces the whole week at once. Rejected input leaves everything unchanged.
    pub fn replace_schedule(&mut self, values: &[i32]) -> Result<ScheduleReplaced, ControlError> {
        let values: Vec<f32> = values.iter().map(|value| *value as f32).collect();
        self.schedule.replace(&values, &self.config.limits)?;
        self.schedule_initialized = true;

        let mut actions = Vec::new();
        self.refresh_current_target(&mut actions);
        self.refresh_next_target(&mut actions);
        self.recompute_forecast(&mut actions);

        Ok(ScheduleReplaced {
            summary: self.schedule_summary(),
            actions,
        })
    }

    /// Physical button press: cancels an active override, otherwise forces
    /// the opposite of the current heating state until pressed again.
    pub fn toggle_override(&mut self) -> Vec<ControlAction> {
        let mut actions = Vec::new();

        if self.manual_override.is_active() {
            self.manual_override.deactivate();
            self.auto_enabled = true;
        } else {
            let forced = !self.heating;
            self.manual_override.activate(forced);
            self.set_heating(forced, HeatingCause::Button, &mut actions);
        }

        actions.insert(
            0,
            ControlAction::OverrideChanged {
                active: self.manual_override.is_active(),
                forced: self.manual_override.forced_state(),
            },
        );
        actions
    }

    pub fn apply_settings(&mut self, update: SettingsUpdate) -> Vec<ControlAction> {
        let mut actions = Vec::new();
        let override_before = self.manual_override;

        if let Some(value) = update.manual_override {
            match (as_flag(value), self.manual_override.is_active()) {
                (true, false) => self.manual_override.activate(self.heating),
                (false, true) => {
                    self.manual_override.deactivate();
                    self.auto_enabled = true;
                }
                _ => {}
            }
        }
        if let Some(value) = update.heating_status {
            let on = as_flag(value);
            if self.manual_override.is_active() {
                self.manual_override.force(on);
            }
            self.set_heating(on, HeatingCause::Settings, &mut actions);
        }
        if let Some(cycles) = update.override_duration {
            self.manual_override.set_cycles_remaining(cycles);
        }
        if let Some(value) = update.auto_behavior {
            self.auto_enabled = as_flag(value);
        }
        if let Some(value) = update.optimization_event {
            self.optimization_event = as_flag(value);
        }
        if let Some(value) = update.led_status {
            self.led_on = as_flag(value);
        }

        if self.manual_override.is_active() != override_before.is_active()
            || self.manual_override.forced_state() != override_before.forced_state()
        {
            actions.insert(
                0,
                ControlAction::OverrideChanged {
                    active: self.manual_override.is_active(),
                    forced: self.manual_override.forced_state(),
                },
            );
        }
        actions
    }

    pub fn report(&self) -> Option<ControllerReport> {
        self.clock.is_synced().then(|| self.build_report())
    }

    pub fn status(&self) -> ControllerStatus {
        let decision = self.last_decision;
        ControllerStatus {
            report: self.build_report(),
            predictor: self.engine.predictor_name(),
            last_decision: decision.map(|decision| decision.reason.as_str()),
            max_gap: decision.and_then(|decision| decision.max_gap),
            ticks_until_check: self
                .config
                .node
                .check_interval_ticks
                .saturating_sub(self.ticks_since_check),
            history_filled: self.history.is_filled(),
            samples_pushed: self.history.pushed_count(),
        }
    }

    pub fn forecast(&self) -> ForecastView {
        ForecastView {
            predictor: self.engine.predictor_name(),
            step_minutes: self.config.node.step_minutes,
            predictions: self
                .horizon
                .as_ref()
                .map(|horizon| horizon.steps().to_vec())
                .unwrap_or_default(),
        }
    }

    pub fn schedule_summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            initialized: self.schedule_initialized,
            target_temp: self.current_target,
            next_target: self.next_target,
            set_count: self.schedule.set_count(),
        }
    }

    pub fn time_sync_status(&self) -> TimeSyncStatus {
        TimeSyncStatus {
            synced: self.clock.is_synced(),
            day: self.clock.day(),
            hour: self.clock.hour_of_day(),
            minute: self.clock.minute(),
        }
    }

    pub fn settings(&self) -> SettingsView {
        SettingsView {
            manual_override: self.manual_override.is_active(),
            optimization_event: self.optimization_event,
            heating_status: self.heating,
            led_status: self.led_on,
            override_duration: self.manual_override.cycles_remaining(),
            auto_behavior_enabled: self.auto_enabled,
            schedule_initialized: self.schedule_initialized,
            target_temp: self.current_target,
        }
    }

    fn build_report(&self) -> ControllerReport {
        ControllerReport {
            temperature: self.last_temperature,
            predicted_temp: self.horizon.as_ref().and_then(ForecastHorizon::immediate),
            target_temp: self.current_target,
            next_target: self.next_target,
            heating_on: self.heating,
            manual_override: self.manual_override.is_active(),
            override_cycles_remaining: self.manual_override.cycles_remaining(),
            auto_enabled: self.auto_enabled,
            optimization_event: self.optimization_event,
            clock_synced: self.clock.is_synced(),
            schedule_initialized: self.schedule_initialized,
            day: self.clock.day(),
            hour: self.clock.hour_of_day(),
            minute: self.clock.minute(),
        }
    }

    fn scheduled_target(&self) -> Option<f32> {
        let target = self.schedule.target_at(self.clock.absolute_hour());
        (target > 0.0).then_some(target)
    }

    fn refresh_current_target(&mut self, actions: &mut Vec<ControlAction>) {
        let target = self.scheduled_target();
        if target != self.current_target {
            actions.push(ControlAction::TargetChanged {
                from: self.current_target,
                to: target,
            });
            self.current_target = target;
        }
    }

    fn refresh_next_target(&mut self, actions: &mut Vec<ControlAction>) {
        let next = if self.schedule_initialized {
            self.schedule.find_next_target(
                self.clock.day() as usize,
                self.clock.hour_of_day() as usize,
            )
        } else {
            None
        };
        if next != self.next_target {
            self.next_target = next;
            actions.push(ControlAction::NextTargetChanged(next));
        }
    }

    fn recompute_forecast(&mut self, actions: &mut Vec<ControlAction>) {
        let horizon = self.engine.forecast(&self.history.snapshot_chronological());
        if let (Some(immediate), Some(last)) = (horizon.immediate(), horizon.last()) {
            actions.push(ControlAction::ForecastUpdated { immediate, last });
        }
        self.horizon = Some(horizon);
    }

    fn run_policy(&mut self, actions: &mut Vec<ControlAction>) {
        let Some(horizon) = self.horizon.as_ref() else {
            return;
        };

        let decision = policy::decide(
            &self.config.policy,
            &PolicyInputs {
                forecast: horizon,
                schedule: &self.schedule,
                absolute_hour: self.clock.absolute_hour(),
                manual_override: &self.manual_override,
                auto_enabled: self.auto_enabled,
                current_heating: self.heating,
            },
        );
        self.last_decision = Some(decision);

        if decision.reason == DecisionReason::Overshoot && self.heating {
            self.optimization_event = true;
            actions.push(ControlAction::OptimizationEvent {
                max_gap: decision.max_gap.unwrap_or_default(),
            });
        }
        self.set_heating(
            decision.heating,
            HeatingCause::Policy(decision.reason),
            actions,
        );
    }

    fn set_heating(&mut self, on: bool, cause: HeatingCause, actions: &mut Vec<ControlAction>) {
        if self.heating != on {
            self.heating = on;
            actions.push(ControlAction::HeatingChanged { on, cause });
        }
    }
}

fn as_flag(value: i64) -> bool {
    value.clamp(0, 1) == 1
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        error::ScheduleError,
        forecast::{Persistence, ScalerCalibration},
        manual_override::MAX_OVERRIDE_CYCLES,
        schedule::SLOTS_PER_WEEK,
    };

    fn persistence_controller(schedule: WeeklySchedule) -> HeatingController {
        let config = ControllerConfig::default();
        let engine = ForecastEngine::new(
            Arc::new(Persistence),
            ScalerCalibration {
                min_c: 0.0,
                range_c: 40.0,
            },
            config.node.horizon_steps,
            config.node.step_minutes,
        );
        HeatingController::with_engine(config, engine, schedule)
    }

    fn monday(hour: i64, minute: i64) -> TimeSync {
        TimeSync {
            day: 0,
            hour,
            minute,
        }
    }

    fn run_ticks(controller: &mut HeatingController, celsius: f32, ticks: usize) -> Vec<ControlAction> {
        (0..ticks)
            .flat_map(|_| controller.on_tick(celsius).actions)
            .collect()
    }

    fn week_with(entries: &[(usize, i32)]) -> Vec<i32> {
        let mut values = vec![0; SLOTS_PER_WEEK];
        for (index, value) in entries {
            values[*index] = *value;
        }
        values
    }

    #[test]
    fn no_report_until_first_sync() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());

        let outcome = controller.on_tick(20.0);
        assert_eq!(outcome.report, None);
        assert!(controller.report().is_none());

        controller.sync_clock(monday(8, 0)).unwrap();
        let outcome = controller.on_tick(20.0);
        let report = outcome.report.unwrap();
        assert!(report.clock_synced);
        assert_eq!(report.temperature, Some(20.0));
    }

    #[test]
    fn first_sync_forecasts_and_finds_next_target() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());

        let outcome = controller.sync_clock(monday(8, 0)).unwrap();
        assert!(outcome.first_sync);
        assert_eq!(
            controller.next_target(),
            Some(NextTarget {
                temperature: 18.0,
                day: 0,
                hour: 9,
            })
        );
        // 08:00 is not a scheduled slot.
        assert_eq!(controller.current_target(), None);
        let predicted = controller.report().unwrap().predicted_temp.unwrap();
        assert!((predicted - 20.0).abs() < 1e-4);

        let outcome = controller.sync_clock(monday(18, 10)).unwrap();
        assert!(!outcome.first_sync);
        assert_eq!(controller.current_target(), Some(22.0));
        assert_eq!(controller.next_target().map(|next| next.hour), Some(23));
    }

    #[test]
    fn rejected_sync_changes_nothing() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());

        let err = controller
            .sync_clock(TimeSync {
                day: 7,
                hour: 0,
                minute: 0,
            })
            .unwrap_err();

        assert!(matches!(err, ControlError::Clock(_)));
        assert!(!controller.clock().is_synced());
        assert!(controller.horizon().is_none());
        assert_eq!(controller.next_target(), None);
    }

    #[test]
    fn policy_runs_every_check_interval() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());
        controller.sync_clock(monday(8, 0)).unwrap();

        let actions = run_ticks(&mut controller, 20.0, 119);
        assert!(controller.last_decision().is_none());
        assert!(!actions
            .iter()
            .any(|action| matches!(action, ControlAction::HeatingChanged { .. })));

        let outcome = controller.on_tick(20.0);
        // Flat 20 °C against the 18:00 warm-up at 22 °C is a 2 °C shortfall.
        assert!(outcome.actions.contains(&ControlAction::HeatingChanged {
            on: true,
            cause: HeatingCause::Policy(DecisionReason::CriticalShortfall),
        }));
        assert!(controller.is_heating());
        assert_eq!(controller.status().ticks_until_check, 120);
    }

    #[test]
    fn morning_setback_keeps_heating_off() {
        // Monday 07:00 at 22 °C then 09:00 at 18 °C, nothing else.
        let mut controller = persistence_controller(WeeklySchedule::empty());
        controller
            .replace_schedule(&week_with(&[(7, 22), (9, 18)]))
            .unwrap();
        controller.sync_clock(monday(8, 0)).unwrap();

        assert_eq!(
            controller.next_target(),
            Some(NextTarget {
                temperature: 18.0,
                day: 0,
                hour: 9,
            })
        );

        run_ticks(&mut controller, 20.0, 120);

        let decision = controller.last_decision().unwrap();
        assert_eq!(decision.reason, DecisionReason::WithinBand);
        assert!(!controller.is_heating());
    }

    #[test]
    fn unscheduled_week_holds_between_bounds() {
        let mut controller = persistence_controller(WeeklySchedule::empty());
        controller.sync_clock(monday(8, 0)).unwrap();

        run_ticks(&mut controller, 20.0, 120);

        assert_eq!(
            controller.last_decision().map(|decision| decision.reason),
            Some(DecisionReason::FallbackHold)
        );
        assert!(!controller.is_heating());
        assert_eq!(controller.next_target(), None);
        assert!(!controller.schedule_summary().initialized);
    }

    #[test]
    fn overshoot_turns_off_and_raises_optimization_event() {
        let mut controller = persistence_controller(WeeklySchedule::empty());
        controller
            .replace_schedule(&week_with(&[(12, 18), (14, 19)]))
            .unwrap();
        controller.sync_clock(monday(8, 0)).unwrap();
        controller.apply_settings(SettingsUpdate {
            heating_status: Some(1),
            ..SettingsUpdate::default()
        });

        let actions = run_ticks(&mut controller, 25.0, 120);

        assert!(!controller.is_heating());
        assert!(controller.report().unwrap().optimization_event);
        assert!(actions
            .iter()
            .any(|action| matches!(action, ControlAction::OptimizationEvent { .. })));
    }

    #[test]
    fn schedule_replace_is_atomic_and_cascades() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());
        controller.sync_clock(monday(8, 0)).unwrap();
        let before = controller.schedule().clone();

        let err = controller.replace_schedule(&[20; 100]).unwrap_err();
        assert_eq!(
            err,
            ControlError::Schedule(ScheduleError::WrongLength {
                got: 100,
                expected: 168,
            })
        );
        let err = controller
            .replace_schedule(&week_with(&[(10, 35)]))
            .unwrap_err();
        assert!(matches!(err, ControlError::Schedule(_)));
        assert_eq!(controller.schedule(), &before);

        let replaced = controller
            .replace_schedule(&week_with(&[(8, 21), (15, 19)]))
            .unwrap();
        assert!(replaced.actions.contains(&ControlAction::TargetChanged {
            from: None,
            to: Some(21.0),
        }));
        assert_eq!(
            replaced.summary,
            ScheduleSummary {
                initialized: true,
                target_temp: Some(21.0),
                next_target: Some(NextTarget {
                    temperature: 19.0,
                    day: 0,
                    hour: 15,
                }),
                set_count: 2,
            }
        );
    }

    #[test]
    fn button_forces_opposite_state_until_pressed_again() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());
        controller.sync_clock(monday(8, 0)).unwrap();

        let actions = controller.toggle_override();
        assert_eq!(
            actions,
            vec![
                ControlAction::OverrideChanged {
                    active: true,
                    forced: Some(true),
                },
                ControlAction::HeatingChanged {
                    on: true,
                    cause: HeatingCause::Button,
                },
            ]
        );
        assert_eq!(
            controller.manual_override().cycles_remaining(),
            MAX_OVERRIDE_CYCLES
        );

        // Releasing the override keeps heating on; the next press forces it off.
        controller.toggle_override();
        assert!(controller.is_heating());
        controller.toggle_override();
        assert_eq!(controller.manual_override().forced_state(), Some(false));
        assert!(!controller.is_heating());

        run_ticks(&mut controller, 15.0, 240);
        assert!(!controller.is_heating());
        assert_eq!(
            controller.last_decision().map(|decision| decision.reason),
            Some(DecisionReason::Override)
        );
    }

    #[test]
    fn override_expiry_restores_auto() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());
        controller.sync_clock(monday(8, 0)).unwrap();
        controller.apply_settings(SettingsUpdate {
            manual_override: Some(1),
            override_duration: Some(3),
            auto_behavior: Some(0),
            ..SettingsUpdate::default()
        });
        assert!(controller.manual_override().is_active());

        let actions = run_ticks(&mut controller, 20.0, 3);

        assert!(actions.contains(&ControlAction::OverrideExpired));
        assert!(!controller.manual_override().is_active());
        assert!(controller.settings().auto_behavior_enabled);
    }

    #[test]
    fn settings_are_clamped() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());

        controller.apply_settings(SettingsUpdate {
            manual_override: Some(7),
            override_duration: Some(i64::MAX),
            optimization_event: Some(-3),
            led_status: Some(2),
            ..SettingsUpdate::default()
        });

        let settings = controller.settings();
        assert!(settings.manual_override);
        assert_eq!(settings.override_duration, MAX_OVERRIDE_CYCLES);
        assert!(!settings.optimization_event);
        assert!(settings.led_status);

        controller.apply_settings(SettingsUpdate {
            override_duration: Some(-10),
            ..SettingsUpdate::default()
        });
        assert_eq!(controller.settings().override_duration, 0);
    }

    #[test]
    fn disabled_auto_keeps_heating_state() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());
        controller.sync_clock(monday(8, 0)).unwrap();
        controller.apply_settings(SettingsUpdate {
            auto_behavior: Some(0),
            ..SettingsUpdate::default()
        });

        run_ticks(&mut controller, 5.0, 120);

        assert!(!controller.is_heating());
        assert_eq!(
            controller.last_decision().map(|decision| decision.reason),
            Some(DecisionReason::AutoDisabled)
        );
    }

    #[test]
    fn target_follows_clock_across_the_hour() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());
        controller.sync_clock(monday(6, 59)).unwrap();
        assert_eq!(controller.current_target(), None);

        let actions = run_ticks(&mut controller, 20.0, 8);

        assert_eq!(controller.current_target(), Some(22.0));
        assert!(actions.contains(&ControlAction::TargetChanged {
            from: None,
            to: Some(22.0),
        }));
    }

    #[test]
    fn resync_reports_target_change() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());
        controller.sync_clock(monday(6, 0)).unwrap();
        assert_eq!(controller.current_target(), None);

        let synced = controller.sync_clock(monday(7, 10)).unwrap();
        assert!(!synced.first_sync);
        assert_eq!(
            synced.actions,
            vec![
                ControlAction::TargetChanged {
                    from: None,
                    to: Some(22.0),
                },
                ControlAction::NextTargetChanged(Some(NextTarget {
                    temperature: 18.0,
                    day: 0,
                    hour: 9,
                })),
            ]
        );
        assert_eq!(controller.current_target(), Some(22.0));
    }

    #[test]
    fn non_finite_reading_is_not_recorded() {
        let mut controller = persistence_controller(WeeklySchedule::office_default());
        controller.on_tick(21.0);
        controller.on_tick(f32::NAN);

        let status = controller.status();
        assert_eq!(status.samples_pushed, 1);
        assert_eq!(status.report.temperature, Some(21.0));
    }
}
