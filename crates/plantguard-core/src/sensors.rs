// Sensor value types and the live sensor stream.
//
// SAFETY INVARIANTS:
// 1. Every reading is clamped to physical bounds before it leaves this module
// 2. Readings are immutable values; a new instance is produced per tick
// 3. temperature_rate is 0 on the first tick and whenever the clock stalls
// 4. The steady-state walk perturbs the previous reading (mean-reverting-ish),
//    it never free-runs outside the sensor range

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Instantaneous sensor channel values, without timing metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Reactor temperature in °C
    pub temperature: f64,

    /// Tank pressure in psi
    pub pressure: f64,

    /// Polymerization inhibitor concentration in ppm
    pub inhibitor_level: f64,
}

/// Physical clamping bounds for one operating mode.
///
/// General mode covers normal plant operation; scenario mode widens the
/// temperature band so a simulated runaway can actually be observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorBounds {
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub pressure_min: f64,
    pub pressure_max: f64,
    pub inhibitor_min: f64,
    pub inhibitor_max: f64,
}

impl SensorBounds {
    /// Bounds for steady plant operation.
    pub const GENERAL: SensorBounds = SensorBounds {
        temperature_min: 10.0,
        temperature_max: 40.0,
        pressure_min: 1.0,
        pressure_max: 60.0,
        inhibitor_min: 0.0,
        inhibitor_max: 600.0,
    };

    /// Bounds while a disaster scenario is active (temperature band widened).
    pub const SCENARIO: SensorBounds = SensorBounds {
        temperature_min: 0.0,
        temperature_max: 120.0,
        pressure_min: 1.0,
        pressure_max: 60.0,
        inhibitor_min: 0.0,
        inhibitor_max: 600.0,
    };

    /// Clamp a snapshot into these bounds. Out-of-range external input is
    /// clamped rather than rejected: monitoring must not skip a tick.
    pub fn clamp(&self, snapshot: SensorSnapshot) -> SensorSnapshot {
        SensorSnapshot {
            temperature: snapshot
                .temperature
                .clamp(self.temperature_min, self.temperature_max),
            pressure: snapshot.pressure.clamp(self.pressure_min, self.pressure_max),
            inhibitor_level: snapshot
                .inhibitor_level
                .clamp(self.inhibitor_min, self.inhibitor_max),
        }
    }
}

/// One timestamped sensor reading, produced once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Reactor temperature in °C
    pub temperature: f64,

    /// Tank pressure in psi
    pub pressure: f64,

    /// Inhibitor concentration in ppm
    pub inhibitor_level: f64,

    /// Capture time (milliseconds since Unix epoch)
    pub timestamp_ms: i64,

    /// First derivative of temperature, °C per minute
    pub temperature_rate: f64,
}

impl SensorReading {
    /// Build a reading with no prior sample (rate of change 0).
    pub fn initial(snapshot: SensorSnapshot, timestamp_ms: i64) -> Self {
        SensorReading {
            temperature: snapshot.temperature,
            pressure: snapshot.pressure,
            inhibitor_level: snapshot.inhibitor_level,
            timestamp_ms,
            temperature_rate: 0.0,
        }
    }

    /// The channel values of this reading, without timing metadata.
    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            temperature: self.temperature,
            pressure: self.pressure,
            inhibitor_level: self.inhibitor_level,
        }
    }
}

/// Steady-state random walk step sizes per channel.
///
/// The inhibitor step carries a slight downward bias, modeling slow
/// depletion during normal operation.
const TEMPERATURE_STEP: f64 = 2.0;
const PRESSURE_STEP: f64 = 3.0;
const INHIBITOR_STEP: f64 = 5.0;
const INHIBITOR_BIAS: f64 = 0.52;

/// Produces one new `SensorReading` per tick and tracks the previous sample
/// for the rate-of-change computation.
#[derive(Debug)]
pub struct SensorStream {
    previous: Option<SensorReading>,
    rng: StdRng,
}

impl SensorStream {
    pub fn new() -> Self {
        SensorStream {
            previous: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic stream for tests.
    pub fn from_seed(seed: u64) -> Self {
        SensorStream {
            previous: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Forget the previous sample, so the next reading reports rate 0.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Prime the stream with a known reading (e.g. the safe baseline after
    /// an incident resolution) so the next rate computation starts from it.
    pub fn prime(&mut self, reading: SensorReading) {
        self.previous = Some(reading);
    }

    /// Produce the next reading from externally supplied channel values
    /// (scenario trajectory or a real feed), clamped to `bounds`.
    pub fn next_from(
        &mut self,
        snapshot: SensorSnapshot,
        bounds: SensorBounds,
        timestamp_ms: i64,
    ) -> SensorReading {
        let clamped = bounds.clamp(snapshot);
        self.finish(clamped, timestamp_ms)
    }

    /// Produce the next steady-state reading: a bounded random walk around
    /// the previous reading, clamped to general bounds.
    pub fn next_steady(&mut self, timestamp_ms: i64) -> SensorReading {
        let base = match self.previous {
            Some(prev) => prev.snapshot(),
            // No prior sample: seed the walk from the steady operating point.
            None => crate::scenario::steady_point(&mut self.rng),
        };

        let walked = SensorSnapshot {
            temperature: base.temperature
                + (self.rng.gen::<f64>() - 0.5) * TEMPERATURE_STEP,
            pressure: base.pressure + (self.rng.gen::<f64>() - 0.5) * PRESSURE_STEP,
            inhibitor_level: base.inhibitor_level
                + (self.rng.gen::<f64>() - INHIBITOR_BIAS) * INHIBITOR_STEP,
        };

        let clamped = SensorBounds::GENERAL.clamp(walked);
        self.finish(clamped, timestamp_ms)
    }

    fn finish(&mut self, snapshot: SensorSnapshot, timestamp_ms: i64) -> SensorReading {
        let rate = match self.previous {
            Some(prev) => {
                let dt_minutes = (timestamp_ms - prev.timestamp_ms) as f64 / 60_000.0;
                if dt_minutes > 0.0 {
                    (snapshot.temperature - prev.temperature) / dt_minutes
                } else {
                    // Clock stalled or skewed backwards; never report a
                    // rate derived from a non-positive interval.
                    0.0
                }
            }
            None => 0.0,
        };

        let reading = SensorReading {
            temperature: snapshot.temperature,
            pressure: snapshot.pressure,
            inhibitor_level: snapshot.inhibitor_level,
            timestamp_ms,
            temperature_rate: rate,
        };
        self.previous = Some(reading);
        reading
    }
}

impl Default for SensorStream {
    fn default() -> Self {
        Self::new()
    }
}
