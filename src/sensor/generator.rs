use std::f64::consts::PI;

use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::profile::{HeartRateRange, TripState};

/// Cycles per tick of the sinusoidal component.
pub const FREQUENCY: f64 = 1.0 / 10.0;

pub const EMOTIONAL_FACTOR_RANGE: (f64, f64) = (0.5, 1.5);
pub const AMPLITUDE_RANGE: (f64, f64) = (5.0, 15.0);

/// `base_rate + amplitude * sin(2π * frequency * tick) * circadian_factor`
pub fn sample(base_rate: f64, amplitude: f64, frequency: f64, tick: u64, circadian_factor: f64) -> f64 {
    base_rate + amplitude * (2.0 * PI * frequency * tick as f64).sin() * circadian_factor
}

/// Hour-of-day multiplier, reading `tick` as a Unix timestamp (UTC).
pub fn circadian_factor(tick: u64) -> f64 {
    let hour = i64::try_from(tick)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|t| t.hour());

    match hour {
        Some(6..=11) => 1.2,
        Some(12..=17) => 1.0,
        Some(18..=23) => 1.1,
        _ => 0.9,
    }
}

// ============================================================================
// SIGNAL GENERATOR - Random draws around the pure sample formula
// ============================================================================

pub struct SignalGenerator<R: Rng = StdRng> {
    rng: R,
    pub frequency: f64,
}

impl SignalGenerator<StdRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Unseeded generator; runs are not reproducible.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> SignalGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, frequency: FREQUENCY }
    }

    /// Calm with probability 0.5.
    pub fn trip_state(&mut self) -> TripState {
        if self.rng.gen::<f64>() < 0.5 {
            TripState::Calm
        } else {
            TripState::Stressed
        }
    }

    pub fn emotional_factor(&mut self) -> f64 {
        self.rng.gen_range(EMOTIONAL_FACTOR_RANGE.0..EMOTIONAL_FACTOR_RANGE.1)
    }

    pub fn amplitude(&mut self) -> f64 {
        self.rng.gen_range(AMPLITUDE_RANGE.0..AMPLITUDE_RANGE.1)
    }

    pub fn base_rate(&mut self, range: HeartRateRange, emotional_factor: f64) -> f64 {
        emotional_factor * self.rng.gen_range(range.low..range.high)
    }

    /// Draws base rate then amplitude for one actor and evaluates the formula.
    pub fn next_bpm(
        &mut self,
        range: HeartRateRange,
        emotional_factor: f64,
        tick: u64,
        circadian_factor: f64,
    ) -> f64 {
        let base_rate = self.base_rate(range, emotional_factor);
        let amplitude = self.amplitude();
        sample(base_rate, amplitude, self.frequency, tick, circadian_factor)
    }
}
