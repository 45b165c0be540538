// Disaster-scenario trajectory model.
//
// Two historical failure modes are simulated for operator training, plus a
// steady-state baseline:
//   - PressureRunaway: saturating exponential temperature rise with linear
//     pressure buildup (tank pressure-runaway pattern)
//   - InhibitorDepletion: exponential inhibitor decay with a slow
//     temperature climb (styrene inhibitor-loss pattern)
//
// SAFETY INVARIANTS:
// 1. trajectory() is pure and deterministic for a given (kind, elapsed)
// 2. Elapsed time is clamped to >= 0; clock skew never produces negative t
// 3. Runaway temperature is non-decreasing and capped at 120 °C
// 4. Depleting inhibitor is non-increasing and floored at 0 ppm

use crate::sensors::SensorSnapshot;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Pressure-runaway physics constants.
const RUNAWAY_T0: f64 = 25.0;
const RUNAWAY_TMAX: f64 = 120.0;
const RUNAWAY_TAU_S: f64 = 15.0;
const RUNAWAY_P0: f64 = 15.0;
const RUNAWAY_P_SLOPE: f64 = 0.3;
const RUNAWAY_PMAX: f64 = 60.0;
const RUNAWAY_I0: f64 = 250.0;
const RUNAWAY_I_SLOPE: f64 = 0.2;

/// Inhibitor-depletion physics constants.
const DEPLETION_I0: f64 = 200.0;
const DEPLETION_K_PER_S: f64 = 0.02;
const DEPLETION_T0: f64 = 25.0;
const DEPLETION_T_SLOPE: f64 = 0.1;
const DEPLETION_TMAX: f64 = 40.0;
const DEPLETION_P0: f64 = 12.0;
const DEPLETION_P_SLOPE: f64 = 0.05;
const DEPLETION_PMAX: f64 = 60.0;

/// Steady-state operating points and jitter amplitudes.
const STEADY_TEMPERATURE: f64 = 20.0;
const STEADY_PRESSURE: f64 = 15.0;
const STEADY_INHIBITOR: f64 = 300.0;
const STEADY_TEMPERATURE_VARIANCE: f64 = 4.0;
const STEADY_PRESSURE_VARIANCE: f64 = 2.0;
const STEADY_INHIBITOR_VARIANCE: f64 = 20.0;

/// A simulated failure mode, or steady operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Normal operations; sensor values random-walk around their baselines
    Steady,

    /// Tank pressure-runaway: exponential temperature rise, linear pressure
    PressureRunaway,

    /// Inhibitor leak: exponential depletion with a slow temperature climb
    InhibitorDepletion,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Steady => "STEADY",
            ScenarioKind::PressureRunaway => "PRESSURE_RUNAWAY",
            ScenarioKind::InhibitorDepletion => "INHIBITOR_DEPLETION",
        }
    }

    /// Incident tag used for damage-prevented lookups when an intervention
    /// against this scenario is authorized. Steady operation has none.
    pub fn incident_tag(&self) -> Option<&'static str> {
        match self {
            ScenarioKind::Steady => None,
            ScenarioKind::PressureRunaway => Some("pressure-runaway"),
            ScenarioKind::InhibitorDepletion => Some("inhibitor-depletion"),
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected scenario and, once started, its activation time.
///
/// `started_at_ms = None` means the scenario is selected but not running;
/// sensor values keep coming from the steady-state walk until it starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub kind: ScenarioKind,
    pub started_at_ms: Option<i64>,
}

impl ScenarioRun {
    pub fn inactive(kind: ScenarioKind) -> Self {
        ScenarioRun {
            kind,
            started_at_ms: None,
        }
    }

    /// A run drives the sensor feed only when started and not steady.
    pub fn is_active(&self) -> bool {
        self.started_at_ms.is_some() && self.kind != ScenarioKind::Steady
    }

    /// Seconds since activation, clamped to zero against clock skew.
    pub fn elapsed_seconds(&self, now_ms: i64) -> f64 {
        match self.started_at_ms {
            Some(start) => ((now_ms - start) as f64 / 1_000.0).max(0.0),
            None => 0.0,
        }
    }
}

/// Channel values for a scenario at a given elapsed time. Pure.
///
/// For `Steady` this returns the fixed operating points; live steady-state
/// jitter is applied by `steady_point`, not here, so that scenario sampling
/// stays fully deterministic.
pub fn trajectory(kind: ScenarioKind, elapsed_seconds: f64) -> SensorSnapshot {
    let t = elapsed_seconds.max(0.0);

    match kind {
        ScenarioKind::Steady => SensorSnapshot {
            temperature: STEADY_TEMPERATURE,
            pressure: STEADY_PRESSURE,
            inhibitor_level: STEADY_INHIBITOR,
        },
        ScenarioKind::PressureRunaway => SensorSnapshot {
            temperature: (RUNAWAY_T0
                + (RUNAWAY_TMAX - RUNAWAY_T0) * (1.0 - (-t / RUNAWAY_TAU_S).exp()))
            .min(RUNAWAY_TMAX),
            pressure: (RUNAWAY_P0 + RUNAWAY_P_SLOPE * t).min(RUNAWAY_PMAX),
            inhibitor_level: (RUNAWAY_I0 - RUNAWAY_I_SLOPE * t).max(0.0),
        },
        ScenarioKind::InhibitorDepletion => SensorSnapshot {
            temperature: (DEPLETION_T0 + DEPLETION_T_SLOPE * t).min(DEPLETION_TMAX),
            pressure: (DEPLETION_P0 + DEPLETION_P_SLOPE * t).min(DEPLETION_PMAX),
            inhibitor_level: (DEPLETION_I0 * (-DEPLETION_K_PER_S * t).exp()).max(0.0),
        },
    }
}

/// One steady-state sample: operating point plus bounded uniform jitter,
/// independent across calls (no memory).
pub fn steady_point<R: Rng>(rng: &mut R) -> SensorSnapshot {
    SensorSnapshot {
        temperature: STEADY_TEMPERATURE
            + (rng.gen::<f64>() - 0.5) * STEADY_TEMPERATURE_VARIANCE,
        pressure: STEADY_PRESSURE + (rng.gen::<f64>() - 0.5) * STEADY_PRESSURE_VARIANCE,
        inhibitor_level: STEADY_INHIBITOR
            + (rng.gen::<f64>() - 0.5) * STEADY_INHIBITOR_VARIANCE,
    }
}
