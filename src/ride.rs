//! Ride module - Paired driver/passenger series and the simulator that fills them

pub mod series;
pub mod simulator;

pub use series::{ActorSummary, Sample, Series, SeriesSummary};
pub use simulator::{RideSimulator, TickRecord, DEFAULT_RIDE_DURATION_SECS};
