// Sliding-window history of recent sensor readings.
//
// SAFETY INVARIANTS:
// 1. Append-only; the only removal is the time-based sweep on append
// 2. Every retained point satisfies now - timestamp <= 300 000 ms
// 3. Points are stored in non-decreasing timestamp order
// 4. Snapshots are oldest-first, suitable for trend charting

use crate::classifier::RiskTier;
use crate::sensors::SensorReading;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Trailing retention window: five minutes.
pub const HISTORY_WINDOW_MS: i64 = 300_000;

/// One charted point: channel values plus the tier active at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp_ms: i64,
    pub temperature: f64,
    pub pressure: f64,
    pub inhibitor_level: f64,
    pub tier: RiskTier,
}

impl HistoryPoint {
    pub fn from_reading(reading: &SensorReading, tier: RiskTier) -> Self {
        HistoryPoint {
            timestamp_ms: reading.timestamp_ms,
            temperature: reading.temperature,
            pressure: reading.pressure,
            inhibitor_level: reading.inhibitor_level,
            tier,
        }
    }
}

/// Time-windowed buffer of recent readings (not a fixed-size ring; the
/// window is time-based).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryBuffer {
    points: VecDeque<HistoryPoint>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        HistoryBuffer {
            points: VecDeque::new(),
        }
    }

    /// Append a point, then sweep everything older than the window relative
    /// to `now_ms`.
    pub fn append(&mut self, point: HistoryPoint, now_ms: i64) {
        self.points.push_back(point);
        while let Some(front) = self.points.front() {
            if now_ms - front.timestamp_ms > HISTORY_WINDOW_MS {
                self.points.pop_front();
            } else {
                break;
            }
        }
    }

    /// Retained points, oldest first.
    pub fn snapshot(&self) -> Vec<HistoryPoint> {
        self.points.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
