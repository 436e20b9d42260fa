use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use super::series::{Sample, Series};
use crate::sensor::generator::{circadian_factor, SignalGenerator};
use crate::sensor::profile::{AgeGroup, AgeProfile, TripState};

/// 6 minutes at one sample per second.
pub const DEFAULT_RIDE_DURATION_SECS: u64 = 6 * 60;

/// Upper bound on samples reserved up front; longer rides grow as they go.
const MAX_PREALLOCATED_TICKS: u64 = 1 << 16;

/// One simulated tick together with the trip state it was drawn under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRecord {
    pub sample: Sample,
    pub trip_state: TripState,
}

// ============================================================================
// RIDE SIMULATOR - Drives the generator tick by tick for both actors
// ============================================================================

pub struct RideSimulator<R: Rng = StdRng> {
    generator: SignalGenerator<R>,
    profile: AgeProfile,
    passenger: AgeGroup,
    driver: AgeGroup,
    duration_secs: u64,
    tick: u64,
}

impl RideSimulator<StdRng> {
    pub fn new(passenger: AgeGroup, driver: AgeGroup, duration_secs: u64, seed: u64) -> Self {
        Self::with_generator(SignalGenerator::new(seed), passenger, driver, duration_secs)
    }
}

impl<R: Rng> RideSimulator<R> {
    pub fn with_generator(
        generator: SignalGenerator<R>,
        passenger: AgeGroup,
        driver: AgeGroup,
        duration_secs: u64,
    ) -> Self {
        Self {
            generator,
            profile: AgeProfile::standard(),
            passenger,
            driver,
            duration_secs,
            tick: 0,
        }
    }

    pub fn with_profile(mut self, profile: AgeProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining(&self) -> u64 {
        self.duration_secs - self.tick
    }

    /// Advances one tick. Random draws happen in a fixed order: trip state,
    /// passenger emotion, driver emotion, passenger base and amplitude,
    /// driver base and amplitude.
    pub fn step(&mut self) -> Option<TickRecord> {
        if self.tick >= self.duration_secs {
            return None;
        }
        let tick = self.tick;

        let trip_state = self.generator.trip_state();
        let passenger_emotion = self.generator.emotional_factor();
        let driver_emotion = self.generator.emotional_factor();
        let circadian = circadian_factor(tick);

        let passenger_range = self.profile.range(self.passenger, trip_state);
        let passenger_bpm = self.generator.next_bpm(passenger_range, passenger_emotion, tick, circadian);

        let driver_range = self.profile.range(self.driver, trip_state);
        let driver_bpm = self.generator.next_bpm(driver_range, driver_emotion, tick, circadian);

        self.tick += 1;

        Some(TickRecord {
            sample: Sample::new(tick, driver_bpm, passenger_bpm),
            trip_state,
        })
    }

    /// Runs the remaining ticks and collects them.
    pub fn run(mut self) -> Series {
        let mut series = Series::with_capacity(preallocation(self.remaining()));
        while let Some(record) = self.step() {
            series.push(record.sample.driver_bpm, record.sample.passenger_bpm);
        }
        debug!(
            samples = series.len(),
            passenger = %self.passenger,
            driver = %self.driver,
            "ride simulated"
        );
        series
    }
}

impl<R: Rng> Iterator for RideSimulator<R> {
    type Item = TickRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}

fn preallocation(remaining: u64) -> usize {
    remaining.min(MAX_PREALLOCATED_TICKS) as usize
}
