// PLANTGUARD CORE
// Sensor model, deterministic risk classification, disaster-scenario
// trajectories, sliding-window history, and the plant worker roster.
//
// SAFETY INVARIANTS:
// 1. Classification is a pure function of the current reading (no hysteresis)
// 2. Sensor values are clamped to physical bounds before classification
// 3. Scenario trajectories are deterministic for a given elapsed time
// 4. The history buffer retains only the trailing five minutes, in order
// 5. A worker's safe flag latches true until a full session reset

pub mod classifier;
pub mod history;
pub mod scenario;
pub mod sensors;
pub mod workers;

pub use classifier::{classify, RiskTier};
pub use history::{HistoryBuffer, HistoryPoint, HISTORY_WINDOW_MS};
pub use scenario::{steady_point, trajectory, ScenarioKind, ScenarioRun};
pub use sensors::{SensorBounds, SensorReading, SensorSnapshot, SensorStream};
pub use workers::{initial_roster, Worker};
