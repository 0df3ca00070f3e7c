use std::{collections::VecDeque, fmt, sync::Arc};

use serde::Serialize;

use crate::config::{ForecastConfig, PredictorKind};

/// Single-step temperature model.
///
/// `window` holds normalized values (see [`ScalerCalibration`]), oldest first.
/// The return value is the normalized temperature one step after the window.
pub trait Predictor: Send + Sync {
    fn predict(&self, window: &[f32]) -> f32;

    fn name(&self) -> &'static str;
}

/// Repeats the most recent value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Persistence;

impl Predictor for Persistence {
    fn predict(&self, window: &[f32]) -> f32 {
        window.last().copied().unwrap_or(0.5)
    }

    fn name(&self) -> &'static str {
        "persistence"
    }
}

/// Last value plus a damped slope over `lookback` steps, pulled slightly toward the window mean.
#[derive(Debug, Clone, Copy)]
pub struct DampedTrend {
    pub lookback: usize,
    pub damping: f32,
    pub reversion: f32,
}

impl Default for DampedTrend {
    fn default() -> Self {
        Self {
            lookback: 4,
            damping: 0.5,
            reversion: 0.02,
        }
    }
}

impl Predictor for DampedTrend {
    fn predict(&self, window: &[f32]) -> f32 {
        let Some(&last) = window.last() else {
            return 0.5;
        };

        let lookback = self.lookback.clamp(1, window.len().max(1));
        let slope = if window.len() > lookback {
            (last - window[window.len() - 1 - lookback]) / lookback as f32
        } else {
            0.0
        };
        let mean = window.iter().sum::<f32>() / window.len() as f32;

        last + self.damping * slope + self.reversion * (mean - last)
    }

    fn name(&self) -> &'static str {
        "damped_trend"
    }
}

/// Feeds the wrapped predictor inputs snapped to the signed 16-bit fixed-point grid.
#[derive(Debug, Clone, Copy)]
pub struct QuantizedInput<P> {
    inner: P,
}

impl<P> QuantizedInput<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

const FIXED_POINT_SCALE: f32 = 32_767.0;

fn quantize(value: f32) -> f32 {
    // `as i16` saturates, matching the fixed-point input range.
    ((value * FIXED_POINT_SCALE) as i16) as f32 / FIXED_POINT_SCALE
}

impl<P: Predictor> Predictor for QuantizedInput<P> {
    fn predict(&self, window: &[f32]) -> f32 {
        let quantized: Vec<f32> = window.iter().copied().map(quantize).collect();
        self.inner.predict(&quantized)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Calibration of the predictor's normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalerCalibration {
    pub min_c: f32,
    pub range_c: f32,
}

impl ScalerCalibration {
    pub fn normalize(&self, celsius: f32) -> f32 {
        (celsius - self.min_c) / self.range_c
    }

    pub fn denormalize(&self, scaled: f32) -> f32 {
        scaled * self.range_c + self.min_c
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastHorizon {
    steps: Vec<f32>,
    step_minutes: u32,
}

impl ForecastHorizon {
    pub fn steps(&self) -> &[f32] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    /// Prediction for the first step ahead.
    pub fn immediate(&self) -> Option<f32> {
        self.steps.first().copied()
    }

    pub fn last(&self) -> Option<f32> {
        self.steps.last().copied()
    }
}

#[derive(Clone)]
pub struct ForecastEngine {
    predictor: Arc<dyn Predictor>,
    calibration: ScalerCalibration,
    steps: usize,
    step_minutes: u32,
}

impl fmt::Debug for ForecastEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastEngine")
            .field("predictor", &self.predictor.name())
            .field("calibration", &self.calibration)
            .field("steps", &self.steps)
            .field("step_minutes", &self.step_minutes)
            .finish()
    }
}

impl ForecastEngine {
    pub fn new(
        predictor: Arc<dyn Predictor>,
        calibration: ScalerCalibration,
        steps: usize,
        step_minutes: u32,
    ) -> Self {
        Self {
            predictor,
            calibration,
            steps,
            step_minutes,
        }
    }

    pub fn from_config(config: &ForecastConfig, steps: usize, step_minutes: u32) -> Self {
        let predictor: Arc<dyn Predictor> = match (config.predictor, config.quantize_inputs) {
            (PredictorKind::Persistence, false) => Arc::new(Persistence),
            (PredictorKind::Persistence, true) => Arc::new(QuantizedInput::new(Persistence)),
            (PredictorKind::DampedTrend, false) => Arc::new(DampedTrend::default()),
            (PredictorKind::DampedTrend, true) => {
                Arc::new(QuantizedInput::new(DampedTrend::default()))
            }
        };
        let calibration = ScalerCalibration {
            min_c: config.scaler_min_c,
            range_c: config.scaler_range_c,
        };
        Self::new(predictor, calibration, steps, step_minutes)
    }

    pub fn predictor_name(&self) -> &'static str {
        self.predictor.name()
    }

    /// Autoregressive forecast: each prediction is appended to the window and
    /// treated as history for the next step.
    pub fn forecast(&self, history: &[f32]) -> ForecastHorizon {
        let mut window: VecDeque<f32> = history
            .iter()
            .map(|celsius| self.calibration.normalize(*celsius))
            .collect();
        let mut steps = Vec::with_capacity(self.steps);

        for _ in 0..self.steps {
            let scaled = self
                .predictor
                .predict(window.make_contiguous())
                .clamp(0.0, 1.0);
            steps.push(self.calibration.denormalize(scaled));

            if !window.is_empty() {
                window.pop_front();
                window.push_back(scaled);
            }
        }

        ForecastHorizon {
            steps,
            step_minutes: self.step_minutes,
        }
    }
}
