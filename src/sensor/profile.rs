use std::fmt;

use crate::error::{MonitorError, Result};

// ============================================================================
// ROLES AND AGE GROUPS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Driver,
    Passenger,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Driver => write!(f, "driver"),
            Role::Passenger => write!(f, "passenger"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Child,
    Adult,
    Elderly,
}

impl AgeGroup {
    /// Classifies a raw age for the given role.
    ///
    /// Drivers must be 18..=100 and passengers at least 18; anyone who gets
    /// past that check is `Adult` below 65, `Elderly` below 100, and rejected
    /// at 100 or above. `Child` is never produced here even though the range
    /// table carries child ranges.
    pub fn classify(age: i32, role: Role) -> Result<AgeGroup> {
        let rejected = match role {
            Role::Driver => !(18..=100).contains(&age),
            Role::Passenger => age < 18,
        };
        if rejected {
            return Err(MonitorError::InvalidAge { age, role });
        }

        if age < 65 {
            Ok(AgeGroup::Adult)
        } else if age < 100 {
            Ok(AgeGroup::Elderly)
        } else {
            Err(MonitorError::InvalidAge { age, role })
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeGroup::Child => write!(f, "child"),
            AgeGroup::Adult => write!(f, "adult"),
            AgeGroup::Elderly => write!(f, "elderly"),
        }
    }
}

// ============================================================================
// TRIP STATE AND RANGES
// ============================================================================

/// Mood of the ride for one tick, shared by both actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripState {
    Calm,
    Stressed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateRange {
    pub low: f64,
    pub high: f64,
}

impl HeartRateRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GroupRanges {
    relaxed: HeartRateRange,
    stressed: HeartRateRange,
}

/// Relaxed/stressed BPM ranges per age group.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeProfile {
    child: GroupRanges,
    adult: GroupRanges,
    elderly: GroupRanges,
}

impl AgeProfile {
    pub fn standard() -> Self {
        Self {
            child: GroupRanges {
                relaxed: HeartRateRange::new(80.0, 100.0),
                stressed: HeartRateRange::new(120.0, 160.0),
            },
            adult: GroupRanges {
                relaxed: HeartRateRange::new(60.0, 80.0),
                stressed: HeartRateRange::new(100.0, 150.0),
            },
            elderly: GroupRanges {
                relaxed: HeartRateRange::new(70.0, 90.0),
                stressed: HeartRateRange::new(110.0, 140.0),
            },
        }
    }

    pub fn range(&self, group: AgeGroup, state: TripState) -> HeartRateRange {
        let ranges = match group {
            AgeGroup::Child => &self.child,
            AgeGroup::Adult => &self.adult,
            AgeGroup::Elderly => &self.elderly,
        };
        match state {
            TripState::Calm => ranges.relaxed,
            TripState::Stressed => ranges.stressed,
        }
    }
}

impl Default for AgeProfile {
    fn default() -> Self {
        Self::standard()
    }
}
