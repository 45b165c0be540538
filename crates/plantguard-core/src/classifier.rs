// Risk classification state machine.
//
// SAFETY INVARIANTS:
// 1. classify is pure: same reading, same tier, always
// 2. Rules are evaluated highest-priority first; the first match wins
// 3. No hysteresis: the tier is recomputed from instantaneous values each
//    tick, so oscillation across a threshold is expected behavior
// 4. Readings that match no rule fall back to Warning, never to Normal

use crate::sensors::SensorReading;
use serde::{Deserialize, Serialize};

/// Temperature rate of change above which the plant is critical regardless
/// of absolute values (°C/min).
pub const CRITICAL_RATE_C_PER_MIN: f64 = 5.0;

/// Discrete plant risk tier, ordered by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RiskTier {
    Normal,
    Warning,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Normal => "NORMAL",
            RiskTier::Warning => "WARNING",
            RiskTier::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a reading into a risk tier.
///
/// Decision table, first match wins:
/// 1. dT/dt > 5 °C/min                      → Critical
/// 2. T > 35 °C or P > 55 psi               → Critical
/// 3. T > 25 °C or inhibitor < 50 ppm       → Warning
/// 4. 15≤T≤25, 2≤P≤25, 100≤inhibitor≤500    → Normal
/// 5. anything else (e.g. P below 2 psi)    → Warning
pub fn classify(reading: &SensorReading) -> RiskTier {
    if reading.temperature_rate > CRITICAL_RATE_C_PER_MIN {
        return RiskTier::Critical;
    }

    if reading.temperature > 35.0 || reading.pressure > 55.0 {
        return RiskTier::Critical;
    }

    if reading.temperature > 25.0 || reading.inhibitor_level < 50.0 {
        return RiskTier::Warning;
    }

    if (15.0..=25.0).contains(&reading.temperature)
        && (2.0..=25.0).contains(&reading.pressure)
        && (100.0..=500.0).contains(&reading.inhibitor_level)
    {
        return RiskTier::Normal;
    }

    RiskTier::Warning
}
