use serde::Serialize;

/// Upper bound on override length in control cycles; an override at the cap
/// lasts until someone turns it off.
pub const MAX_OVERRIDE_CYCLES: u64 = 1_576_800_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideTick {
    Inactive,
    Running { cycles_remaining: u64 },
    Expired,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverrideSession {
    active: bool,
    #[serde(rename = "heatingForcedState")]
    heating_forced_state: bool,
    #[serde(rename = "cyclesRemaining")]
    cycles_remaining: u64,
}

impl OverrideSession {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn forced_state(&self) -> Option<bool> {
        self.active.then_some(self.heating_forced_state)
    }

    pub fn cycles_remaining(&self) -> u64 {
        self.cycles_remaining
    }

    pub fn activate(&mut self, forced_state: bool) {
        self.active = true;
        self.heating_forced_state = forced_state;
        self.cycles_remaining = MAX_OVERRIDE_CYCLES;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.cycles_remaining = 0;
    }

    /// Forces heating while already active, keeping the remaining duration.
    pub fn force(&mut self, forced_state: bool) {
        self.heating_forced_state = forced_state;
    }

    /// Out-of-range values are clamped to `[0, MAX_OVERRIDE_CYCLES]`.
    pub fn set_cycles_remaining(&mut self, cycles: i64) {
        self.cycles_remaining = cycles.clamp(0, MAX_OVERRIDE_CYCLES as i64) as u64;
    }

    /// Counts down one control cycle. An active session with no cycles left
    /// keeps running until deactivated.
    pub fn tick(&mut self) -> OverrideTick {
        if !self.active {
            return OverrideTick::Inactive;
        }
        if self.cycles_remaining == 0 {
            return OverrideTick::Running {
                cycles_remaining: 0,
            };
        }

        self.cycles_remaining -= 1;
        if self.cycles_remaining == 0 {
            self.active = false;
            OverrideTick::Expired
        } else {
            OverrideTick::Running {
                cycles_remaining: self.cycles_remaining,
            }
        }
    }
}
