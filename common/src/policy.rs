use serde::Serialize;

use crate::{
    config::PolicyConfig, forecast::ForecastHorizon, manual_override::OverrideSession,
    schedule::WeeklySchedule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionReason {
    Override,
    AutoDisabled,
    CriticalShortfall,
    Overshoot,
    WithinBand,
    FallbackBelowMin,
    FallbackAboveMax,
    FallbackHold,
}

impl DecisionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Override => "OVERRIDE",
            Self::AutoDisabled => "AUTO_DISABLED",
            Self::CriticalShortfall => "CRITICAL_SHORTFALL",
            Self::Overshoot => "OVERSHOOT",
            Self::WithinBand => "WITHIN_BAND",
            Self::FallbackBelowMin => "FALLBACK_BELOW_MIN",
            Self::FallbackAboveMax => "FALLBACK_ABOVE_MAX",
            Self::FallbackHold => "FALLBACK_HOLD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub heating: bool,
    pub reason: DecisionReason,
    /// Largest `target - forecast` over scheduled steps, if any step was scheduled.
    pub max_gap: Option<f32>,
    pub max_gap_step: Option<usize>,
}

impl Decision {
    fn unconditional(heating: bool, reason: DecisionReason) -> Self {
        Self {
            heating,
            reason,
            max_gap: None,
            max_gap_step: None,
        }
    }
}

pub struct PolicyInputs<'a> {
    pub forecast: &'a ForecastHorizon,
    pub schedule: &'a WeeklySchedule,
    /// Hours since Monday 00:00 at the time of the decision.
    pub absolute_hour: usize,
    pub manual_override: &'a OverrideSession,
    pub auto_enabled: bool,
    pub current_heating: bool,
}

/// Hour offset for forecast step `step`, rounded half up to whole hours.
pub fn step_hour_offset(step: usize, step_minutes: u32) -> usize {
    ((step + 1) * step_minutes as usize + 30) / 60
}

/// Lookahead hysteresis: heat when any scheduled hour in the horizon is forecast
/// to fall short of its target, stop when the forecast overshoots everywhere.
pub fn decide(config: &PolicyConfig, inputs: &PolicyInputs<'_>) -> Decision {
    if let Some(forced) = inputs.manual_override.forced_state() {
        return Decision::unconditional(forced, DecisionReason::Override);
    }
    if !inputs.auto_enabled {
        return Decision::unconditional(inputs.current_heating, DecisionReason::AutoDisabled);
    }

    let step_minutes = inputs.forecast.step_minutes();
    let mut max_gap: Option<(f32, usize)> = None;
    let mut critical = false;

    for (step, predicted) in inputs.forecast.steps().iter().enumerate() {
        let hour = inputs.absolute_hour + step_hour_offset(step, step_minutes);
        let target = inputs.schedule.target_at(hour);
        if target <= 0.0 {
            continue;
        }

        let gap = target - predicted;
        if max_gap.map_or(true, |(best, _)| gap > best) {
            max_gap = Some((gap, step));
        }
        if gap > config.turn_on_threshold_c {
            critical = true;
        }
    }

    let Some((gap, step)) = max_gap else {
        return fallback(config, inputs);
    };

    let (heating, reason) = if critical {
        (true, DecisionReason::CriticalShortfall)
    } else if gap < -config.turn_off_threshold_c {
        (false, DecisionReason::Overshoot)
    } else {
        (inputs.current_heating, DecisionReason::WithinBand)
    };

    Decision {
        heating,
        reason,
        max_gap: Some(gap),
        max_gap_step: Some(step),
    }
}

/// No target anywhere in the horizon: keep the room between absolute bounds.
fn fallback(config: &PolicyConfig, inputs: &PolicyInputs<'_>) -> Decision {
    let (heating, reason) = match inputs.forecast.immediate() {
        Some(predicted) if predicted < config.fallback_min_c => {
            (true, DecisionReason::FallbackBelowMin)
        }
        Some(predicted) if predicted > config.fallback_max_c => {
            (false, DecisionReason::FallbackAboveMax)
        }
        _ => (inputs.current_heating, DecisionReason::FallbackHold),
    };
    Decision::unconditional(heating, reason)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::ScheduleLimits,
        forecast::{ForecastEngine, Persistence, ScalerCalibration},
        schedule::SLOTS_PER_WEEK,
    };

    fn flat_forecast(celsius: f32) -> ForecastHorizon {
        let engine = ForecastEngine::new(
            Arc::new(Persistence),
            ScalerCalibration {
                min_c: 0.0,
                range_c: 40.0,
            },
            96,
            15,
        );
        engine.forecast(&[celsius; 96])
    }

    fn schedule_with(entries: &[(usize, f32)]) -> WeeklySchedule {
        let mut slots = vec![0.0; SLOTS_PER_WEEK];
        for (index, value) in entries {
            slots[*index] = *value;
        }
        WeeklySchedule::from_slots(slots, &ScheduleLimits::default()).unwrap()
    }

    fn inputs<'a>(
        forecast: &'a ForecastHorizon,
        schedule: &'a WeeklySchedule,
        manual_override: &'a OverrideSession,
        current_heating: bool,
    ) -> PolicyInputs<'a> {
        PolicyInputs {
            forecast,
            schedule,
            absolute_hour: 8,
            manual_override,
            auto_enabled: true,
            current_heating,
        }
    }

    #[test]
    fn step_offsets_round_half_up() {
        let offsets: Vec<usize> = (0..8).map(|step| step_hour_offset(step, 15)).collect();
        assert_eq!(offsets, vec![0, 1, 1, 1, 1, 2, 2, 2]);
        assert_eq!(step_hour_offset(95, 15), 24);
    }

    #[test]
    fn override_dominates_forecast_and_schedule() {
        let forecast = flat_forecast(5.0);
        let schedule = WeeklySchedule::office_default();
        let mut session = OverrideSession::default();
        session.activate(false);

        let decision = decide(
            &PolicyConfig::default(),
            &inputs(&forecast, &schedule, &session, true),
        );

        assert!(!decision.heating);
        assert_eq!(decision.reason, DecisionReason::Override);
    }

    #[test]
    fn auto_disabled_keeps_state() {
        let forecast = flat_forecast(5.0);
        let schedule = WeeklySchedule::office_default();
        let session = OverrideSession::default();
        let mut inputs = inputs(&forecast, &schedule, &session, false);
        inputs.auto_enabled = false;

        let decision = decide(&PolicyConfig::default(), &inputs);

        assert!(!decision.heating);
        assert_eq!(decision.reason, DecisionReason::AutoDisabled);
    }

    #[test]
    fn critical_shortfall_turns_heating_on() {
        let forecast = flat_forecast(20.0);
        // 12:00 wants 21.5 °C: a 1.5 °C shortfall.
        let schedule = schedule_with(&[(12, 21.5)]);
        let session = OverrideSession::default();

        let decision = decide(
            &PolicyConfig::default(),
            &inputs(&forecast, &schedule, &session, false),
        );

        assert!(decision.heating);
        assert_eq!(decision.reason, DecisionReason::CriticalShortfall);
        let gap = decision.max_gap.unwrap();
        assert!((gap - 1.5).abs() < 1e-4);
        // First step mapping to hour 12 is step 13: (14 * 15 + 30) / 60 = 4.
        assert_eq!(decision.max_gap_step, Some(13));
    }

    #[test]
    fn overshoot_turns_heating_off() {
        let forecast = flat_forecast(24.0);
        let schedule = schedule_with(&[(10, 21.0), (14, 18.0)]);
        let session = OverrideSession::default();

        let decision = decide(
            &PolicyConfig::default(),
            &inputs(&forecast, &schedule, &session, true),
        );

        assert!(!decision.heating);
        assert_eq!(decision.reason, DecisionReason::Overshoot);
    }

    #[test]
    fn gap_inside_band_keeps_state() {
        let forecast = flat_forecast(20.0);
        let schedule = schedule_with(&[(7, 22.0), (9, 18.0)]);
        let session = OverrideSession::default();

        for current in [false, true] {
            let decision = decide(
                &PolicyConfig::default(),
                &inputs(&forecast, &schedule, &session, current),
            );
            assert_eq!(decision.heating, current);
            assert_eq!(decision.reason, DecisionReason::WithinBand);
            assert!((decision.max_gap.unwrap() + 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn full_office_schedule_flags_evening_warmup() {
        let forecast = flat_forecast(20.0);
        let schedule = WeeklySchedule::office_default();
        let session = OverrideSession::default();

        let decision = decide(
            &PolicyConfig::default(),
            &inputs(&forecast, &schedule, &session, false),
        );

        assert!(decision.heating);
        assert_eq!(decision.reason, DecisionReason::CriticalShortfall);
    }

    #[test]
    fn empty_horizon_schedule_uses_absolute_bounds() {
        let schedule = WeeklySchedule::empty();
        let session = OverrideSession::default();
        let config = PolicyConfig::default();

        let cold = flat_forecast(8.0);
        let decision = decide(&config, &inputs(&cold, &schedule, &session, false));
        assert_eq!(
            (decision.heating, decision.reason),
            (true, DecisionReason::FallbackBelowMin)
        );

        let warm = flat_forecast(23.0);
        let decision = decide(&config, &inputs(&warm, &schedule, &session, true));
        assert_eq!(
            (decision.heating, decision.reason),
            (false, DecisionReason::FallbackAboveMax)
        );

        let mild = flat_forecast(20.0);
        let decision = decide(&config, &inputs(&mild, &schedule, &session, false));
        assert_eq!(
            (decision.heating, decision.reason),
            (false, DecisionReason::FallbackHold)
        );
        assert_eq!(decision.max_gap, None);
    }

    #[test]
    fn slot_outside_horizon_still_falls_back() {
        // From Monday 08:00 the horizon reaches Tuesday 08:00; Wednesday targets are out of view.
        let schedule = schedule_with(&[(2 * 24 + 12, 25.0)]);
        let forecast = flat_forecast(15.0);
        let session = OverrideSession::default();

        let decision = decide(
            &PolicyConfig::default(),
            &inputs(&forecast, &schedule, &session, true),
        );

        assert_eq!(decision.reason, DecisionReason::FallbackHold);
        assert!(decision.heating);
    }
}
