//! Timing values carried through the bridge
//!
//! These are the three opentime-style value kinds the dynamic value can hold.
//! Only the surface the bridge and its tests need is provided.

/// A point in time expressed as `value / rate` seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RationalTime {
    /// Time in units of `1 / rate` seconds
    pub value: f64,
    /// Units per second
    pub rate: f64,
}

impl RationalTime {
    /// Create a time at `value` units of `rate` per second.
    pub const fn new(value: f64, rate: f64) -> Self {
        Self { value, rate }
    }

    /// Create a time from seconds at the given rate.
    pub fn from_seconds(seconds: f64, rate: f64) -> Self {
        Self::new(seconds * rate, rate)
    }

    /// This time in seconds.
    pub fn to_seconds(&self) -> f64 {
        self.value / self.rate
    }

    /// The same instant expressed at another rate.
    pub fn rescaled_to(&self, rate: f64) -> Self {
        if rate == self.rate {
            return *self;
        }
        Self::new(self.value * rate / self.rate, rate)
    }
}

impl PartialEq for RationalTime {
    // Times are equal when they denote the same instant, whatever the rate
    fn eq(&self, other: &Self) -> bool {
        self.rescaled_to(other.rate).value == other.value
    }
}

/// A half-open span of time `[start_time, start_time + duration)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeRange {
    /// First instant in the range
    pub start_time: RationalTime,
    /// Length of the range
    pub duration: RationalTime,
}

impl TimeRange {
    /// Create a range from a start and a duration.
    pub const fn new(start_time: RationalTime, duration: RationalTime) -> Self {
        Self {
            start_time,
            duration,
        }
    }

    /// The first instant after the range, at the start time's rate.
    pub fn end_time_exclusive(&self) -> RationalTime {
        let duration = self.duration.rescaled_to(self.start_time.rate);
        RationalTime::new(self.start_time.value + duration.value, self.start_time.rate)
    }

    /// Whether `time` falls inside the range.
    pub fn contains(&self, time: RationalTime) -> bool {
        let seconds = time.to_seconds();
        seconds >= self.start_time.to_seconds() && seconds < self.end_time_exclusive().to_seconds()
    }
}

/// An affine retiming: `offset + scale * t`, expressed at `rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeTransform {
    /// Offset added after scaling
    pub offset: RationalTime,
    /// Multiplier applied to the input time
    pub scale: f64,
    /// Output rate; non-positive keeps the input's rate
    pub rate: f64,
}

impl Default for TimeTransform {
    fn default() -> Self {
        Self {
            offset: RationalTime::default(),
            scale: 1.0,
            rate: -1.0,
        }
    }
}

impl TimeTransform {
    /// Create a transform.
    pub const fn new(offset: RationalTime, scale: f64, rate: f64) -> Self {
        Self {
            offset,
            scale,
            rate,
        }
    }

    /// Apply this transform to a time.
    pub fn applied_to(&self, time: RationalTime) -> RationalTime {
        let scaled = RationalTime::new(time.value * self.scale, time.rate);
        let offset = self.offset.rescaled_to(time.rate);
        let result = RationalTime::new(scaled.value + offset.value, time.rate);
        if self.rate > 0.0 {
            result.rescaled_to(self.rate)
        } else {
            result
        }
    }
}
