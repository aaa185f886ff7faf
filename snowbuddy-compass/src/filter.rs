use crate::geometry::normalize_degrees;

/// Number of samples kept when no capacity is configured
pub const DEFAULT_FILTER_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    /// No samples yet, or just reset
    Empty,
    /// Some samples, but fewer than capacity
    Filling,
    /// Steady state, every new sample evicts the oldest
    Full,
}

#[derive(Debug, Clone)]
/// Moving circular average over the last `capacity` heading samples.
///
/// Headings can't be averaged arithmetically (359 and 1 would average to 180), so each sample is
/// treated as a unit vector and the mean vector's angle is used instead.
///
/// Samples live in a fixed ring buffer, once full the oldest sample is overwritten in place.
pub struct HeadingFilter {
    samples: Vec<f64>,
    capacity: usize,
    /// Index of the oldest sample once the buffer is full
    head: usize,
}

impl Default for HeadingFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_CAPACITY)
    }
}

impl HeadingFilter {
    /// Create a filter retaining `capacity` samples, a capacity of 0 is treated as 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn phase(&self) -> FilterPhase {
        match self.samples.len() {
            0 => FilterPhase::Empty,
            n if n < self.capacity => FilterPhase::Filling,
            _ => FilterPhase::Full,
        }
    }

    /// Retained samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        let (newer, older) = self.samples.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }

    /// Add a heading sample and get the smoothed heading including it
    pub fn add_sample(&mut self, heading: f64) -> f64 {
        let heading = normalize_degrees(heading);

        if self.samples.len() < self.capacity {
            self.samples.push(heading);
        } else {
            self.samples[self.head] = heading;
            self.head = (self.head + 1) % self.capacity;
        }

        self.smoothed()
    }

    /// Circular mean of the retained samples, `0` when there are none
    pub fn smoothed(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }

        let (sum_x, sum_y) = self.samples.iter().fold((0.0, 0.0), |(x, y), heading| {
            let rad = heading.to_radians();
            (x + rad.cos(), y + rad.sin())
        });

        let count = self.samples.len() as f64;
        let (mean_x, mean_y) = (sum_x / count, sum_y / count);

        normalize_degrees(mean_y.atan2(mean_x).to_degrees())
    }

    /// Forget all samples, used when the navigation target changes or the compass closes
    pub fn reset(&mut self) {
        self.samples.clear();
        self.head = 0;
    }
}
