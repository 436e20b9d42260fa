use crate::sensor::filter::smooth_valid;

/// One tick of a ride: both actors' BPM at `tick` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub tick: u64,
    pub driver_bpm: f64,
    pub passenger_bpm: f64,
}

impl Sample {
    pub fn new(tick: u64, driver_bpm: f64, passenger_bpm: f64) -> Self {
        Self { tick, driver_bpm, passenger_bpm }
    }

    pub fn max_bpm(&self) -> f64 {
        self.driver_bpm.max(self.passenger_bpm)
    }
}

/// Append-only, tick-ordered sequence of samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    samples: Vec<Sample>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSummary {
    pub max: f64,
    pub mean: f64,
    pub above_danger: usize,
    pub above_control: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub len: usize,
    pub driver: ActorSummary,
    pub passenger: ActorSummary,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples: Vec::with_capacity(capacity) }
    }

    /// Appends the pair as the next tick and returns the stored sample.
    pub fn push(&mut self, driver_bpm: f64, passenger_bpm: f64) -> Sample {
        let sample = Sample::new(self.samples.len() as u64, driver_bpm, passenger_bpm);
        self.samples.push(sample);
        sample
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn driver_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.driver_bpm).collect()
    }

    pub fn passenger_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.passenger_bpm).collect()
    }

    pub fn driver_max(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.driver_bpm).reduce(f64::max)
    }

    pub fn passenger_max(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.passenger_bpm).reduce(f64::max)
    }

    /// Ticks where both actors are strictly above `threshold`.
    pub fn both_high(&self, threshold: f64) -> Vec<u64> {
        self.samples
            .iter()
            .filter(|s| s.driver_bpm > threshold && s.passenger_bpm > threshold)
            .map(|s| s.tick)
            .collect()
    }

    /// Valid-mode moving averages, `(driver, passenger)`.
    pub fn smoothed(&self, window: usize) -> (Vec<f64>, Vec<f64>) {
        (
            smooth_valid(&self.driver_values(), window),
            smooth_valid(&self.passenger_values(), window),
        )
    }

    pub fn summary(&self, danger: f64, control: f64) -> Option<SeriesSummary> {
        if self.is_empty() {
            return None;
        }
        let actor = |values: Vec<f64>| ActorSummary {
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: values.iter().sum::<f64>() / values.len() as f64,
            above_danger: values.iter().filter(|&&v| v > danger).count(),
            above_control: values.iter().filter(|&&v| v > control).count(),
        };
        Some(SeriesSummary {
            len: self.len(),
            driver: actor(self.driver_values()),
            passenger: actor(self.passenger_values()),
        })
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl FromIterator<(f64, f64)> for Series {
    /// Builds from `(driver_bpm, passenger_bpm)` pairs, numbering ticks from 0.
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut series = Series::new();
        for (driver, passenger) in iter {
            series.push(driver, passenger);
        }
        series
    }
}
