//! Daily rainfall reconstruction.
//!
//! The archive stores the rain that fell during each logging interval, not a running
//! daily total, but the remote service wants the total. Replaying the records in
//! chronological order and summing the per-interval amounts reconstructs it.

use chrono::{DateTime, Local, NaiveDate};

/// Running rainfall total for the local calendar day currently being replayed.
///
/// This is a plain value. Each `observe` consumes the old state and returns the new one,
/// so the accumulator can be threaded through a traversal without any shared mutable
/// state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DailyAccumulator {
    day: Option<NaiveDate>,
    rain: f64,
}

impl DailyAccumulator {
    /// Create an accumulator that has seen no records yet.
    pub fn new() -> Self {
        DailyAccumulator::default()
    }

    /// Fold the next record, in chronological order, into the accumulator.
    ///
    /// A record on a new local calendar day starts its total from its own rain amount,
    /// never from a carried-over total.
    pub fn observe(self, timestamp: DateTime<Local>, rain_accumulation: f64) -> Self {
        let day = timestamp.date_naive();

        let rain = if self.day == Some(day) {
            self.rain + rain_accumulation
        } else {
            rain_accumulation
        };

        DailyAccumulator {
            day: Some(day),
            rain,
        }
    }

    /// The daily total so far, inclusive of the last observed record.
    pub fn daily_rain(&self) -> f64 {
        self.rain
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
