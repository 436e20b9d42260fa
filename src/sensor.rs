//! Sensor module - Age profiles, heart-rate signal generation and smoothing

pub mod profile;
pub mod generator;
pub mod filter;

pub use profile::{AgeGroup, AgeProfile, HeartRateRange, Role, TripState};
pub use generator::{circadian_factor, sample, SignalGenerator, FREQUENCY};
pub use filter::{smooth_valid, MovingAverage};
