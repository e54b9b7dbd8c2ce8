use serde::Deserialize;
use std::error::Error;
use std::path::Path;

/// Magnitude (in gravity units) a sample must reach to count as a spike
pub const SHAKE_THRESHOLD_GRAVITY: f64 = 2.7;

/// Minimum spacing between two reported shakes
pub const SHAKE_COOLDOWN_MS: u64 = 500;

/// One 3-axis accelerometer sample, already normalized to gravity units
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MotionSample {
    pub t_ms: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Turns a stream of acceleration samples into discrete shake events,
/// reporting at most one event per cooldown window.
///
/// Time is whatever the caller feeds in via `t_ms`; the debouncer never
/// reads a clock itself, so replayed traces and tests behave identically
/// to live input.
#[derive(Debug, Clone)]
pub struct MotionDebouncer {
    threshold: f64,
    cooldown_ms: u64,
    last_event_ms: Option<u64>,
}

impl MotionDebouncer {
    pub fn new(threshold: f64, cooldown_ms: u64) -> Self {
        Self {
            threshold,
            cooldown_ms,
            last_event_ms: None,
        }
    }

    pub fn last_event_ms(&self) -> Option<u64> {
        self.last_event_ms
    }

    /// Feed one sample; true means a shake event fires now.
    ///
    /// Sub-threshold samples never touch the stored timestamp. A NaN axis
    /// makes the magnitude NaN, which fails the `>=` comparison and is
    /// treated as "no spike" rather than an error; a missed shake is the
    /// safe failure mode here.
    pub fn on_sample(&mut self, sample: MotionSample) -> bool {
        if !(sample.magnitude() >= self.threshold) {
            return false;
        }

        if let Some(last) = self.last_event_ms {
            if sample.t_ms.saturating_sub(last) < self.cooldown_ms {
                // continuation of the same physical shake
                return false;
            }
        }

        self.last_event_ms = Some(sample.t_ms);
        true
    }
}

impl Default for MotionDebouncer {
    fn default() -> Self {
        Self::new(SHAKE_THRESHOLD_GRAVITY, SHAKE_COOLDOWN_MS)
    }
}

/// Read a recorded accelerometer trace from a CSV file with a
/// `t_ms,x,y,z` header. Rows are sorted by timestamp so replay pacing
/// holds even for traces written out of order.
pub fn read_trace<P: AsRef<Path>>(path: P) -> Result<Vec<MotionSample>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut samples = Vec::new();
    for record in reader.deserialize() {
        let sample: MotionSample = record?;
        samples.push(sample);
    }
    samples.sort_by_key(|s| s.t_ms);
    Ok(samples)
}
