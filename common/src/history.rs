use serde::{Deserialize, Serialize};

/// A temperature reading stamped with the simulated clock position it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    pub celsius: f32,
    pub day: u8,
    pub hour: f32,
}

impl Sample {
    pub fn new(celsius: f32, day: u8, hour: f32) -> Self {
        Self { celsius, day, hour }
    }
}

/// Fixed-capacity ring of the most recent samples.
///
/// Chronological order is recovered by reading from the write cursor, which
/// always points at the oldest slot.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buf: Vec<Sample>,
    cursor: usize,
    filled: bool,
    pushed: u64,
}

impl HistoryBuffer {
    /// Empty ring. Unfilled slots read as 0 °C until overwritten.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: vec![Sample::default(); capacity],
            cursor: 0,
            filled: false,
            pushed: 0,
        }
    }

    /// Ring prefilled with a neutral temperature so forecasts are defined from the first tick.
    pub fn with_default(capacity: usize, default_c: f32) -> Self {
        let mut history = Self::new(capacity);
        history.buf.fill(Sample::new(default_c, 0, 0.0));
        history.filled = true;
        history
    }

    pub fn push(&mut self, sample: Sample) {
        self.buf[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % self.buf.len();
        if self.cursor == 0 {
            self.filled = true;
        }
        self.pushed = self.pushed.saturating_add(1);
    }

    /// Oldest to newest, always `capacity()` values long.
    pub fn snapshot_chronological(&self) -> Vec<f32> {
        let len = self.buf.len();
        (0..len)
            .map(|offset| self.buf[(self.cursor + offset) % len].celsius)
            .collect()
    }

    pub fn latest(&self) -> Option<Sample> {
        if self.pushed == 0 && !self.filled {
            return None;
        }
        let len = self.buf.len();
        Some(self.buf[(self.cursor + len - 1) % len])
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn pushed_count(&self) -> u64 {
        self.pushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_all(history: &mut HistoryBuffer, values: &[f32]) {
        for value in values {
            history.push(Sample::new(*value, 0, 0.0));
        }
    }

    #[test]
    fn snapshot_keeps_capacity_and_push_order() {
        let mut history = HistoryBuffer::with_default(4, 20.0);
        push_all(&mut history, &[1.0, 2.0]);
        assert_eq!(history.snapshot_chronological(), vec![20.0, 20.0, 1.0, 2.0]);

        push_all(&mut history, &[3.0, 4.0, 5.0]);
        assert_eq!(history.snapshot_chronological(), vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn snapshot_length_is_constant_for_any_push_count() {
        let mut history = HistoryBuffer::new(5);
        for n in 0..23 {
            assert_eq!(history.snapshot_chronological().len(), 5);
            history.push(Sample::new(n as f32, 0, 0.0));

            let snapshot = history.snapshot_chronological();
            let kept = (n + 1).min(5);
            let expected: Vec<f32> = ((n + 1 - kept)..=n).map(|v| v as f32).collect();
            assert_eq!(snapshot[5 - kept..].to_vec(), expected);
        }
    }

    #[test]
    fn fills_after_first_wrap() {
        let mut history = HistoryBuffer::new(3);
        assert!(!history.is_filled());
        assert_eq!(history.latest(), None);

        push_all(&mut history, &[1.0, 2.0]);
        assert!(!history.is_filled());
        assert_eq!(history.latest().map(|s| s.celsius), Some(2.0));

        push_all(&mut history, &[3.0]);
        assert!(history.is_filled());
        assert_eq!(history.pushed_count(), 3);
    }

    #[test]
    fn prefilled_history_reports_default_as_latest() {
        let history = HistoryBuffer::with_default(96, 20.0);
        assert!(history.is_filled());
        assert_eq!(history.latest().map(|s| s.celsius), Some(20.0));
        assert!(history.snapshot_chronological().iter().all(|v| *v == 20.0));
    }
}
