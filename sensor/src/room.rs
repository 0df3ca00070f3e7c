/// Heating adds 1 °C every 120 ticks of 15 s.
const HEATING_RATE_PER_TICK: f32 = 1.0 / 120.0;
/// Idle rooms drift 0.5 °C every 120 ticks toward ambient.
const DRIFT_RATE_PER_TICK: f32 = 0.5 / 120.0;
const WARMING_FACTOR: f32 = 0.3;
const OCCUPIED_AMBIENT_C: f32 = 20.0;
const UNOCCUPIED_AMBIENT_C: f32 = 18.0;
const MIN_ROOM_C: f32 = 10.0;
const MAX_ROOM_C: f32 = 35.0;

/// Thermal model of one office, stepped once per control tick.
#[derive(Debug, Clone)]
pub struct RoomModel {
    celsius: f32,
    ripple_amplitude: f32,
    ticks: u64,
}

impl RoomModel {
    pub fn new(initial_c: f32) -> Self {
        Self {
            celsius: initial_c.clamp(MIN_ROOM_C, MAX_ROOM_C),
            ripple_amplitude: 0.1,
            ticks: 0,
        }
    }

    /// Disables the measurement ripple.
    pub fn without_ripple(mut self) -> Self {
        self.ripple_amplitude = 0.0;
        self
    }

    pub fn celsius(&self) -> f32 {
        self.celsius
    }

    pub fn step(&mut self, heating: bool, occupied: bool) -> f32 {
        self.ticks = self.ticks.wrapping_add(1);

        if heating {
            self.celsius += HEATING_RATE_PER_TICK;
        } else {
            let ambient = if occupied {
                OCCUPIED_AMBIENT_C
            } else {
                UNOCCUPIED_AMBIENT_C
            };
            if self.celsius > ambient {
                self.celsius -= DRIFT_RATE_PER_TICK;
            } else if self.celsius < ambient {
                self.celsius += DRIFT_RATE_PER_TICK * WARMING_FACTOR;
            }
        }

        self.celsius += self.ripple();
        self.celsius = self.celsius.clamp(MIN_ROOM_C, MAX_ROOM_C);
        self.celsius
    }

    /// Repeating sawtooth in `[-amplitude, amplitude]` that averages to zero.
    fn ripple(&self) -> f32 {
        let phase = (self.ticks.wrapping_mul(8) % 21) as f32 - 10.0;
        phase / 10.0 * self.ripple_amplitude
    }
}

/// Office hours: Monday to Friday, 09:00 to 18:00.
pub fn is_office_hours(day: u8, hour: u8) -> bool {
    day < 5 && (9..18).contains(&hour)
}
