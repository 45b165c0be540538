// Plant worker roster for evacuation tracking.
//
// SAFETY INVARIANTS:
// 1. The safe flag only transitions false -> true (mark-safe or incident
//    resolution); it reverts only on a full session reset
// 2. Marking an unknown worker is a logged no-op, never an error

use log::debug;
use serde::{Deserialize, Serialize};

/// One plant worker shown on the evacuation map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: u32,
    pub name: String,
    /// Plant zone (A, B or C)
    pub zone: char,
    /// Plant unit the worker is assigned to
    pub unit: String,
    /// Whether the worker has reached the safe assembly point
    pub safe: bool,
    /// Map position, pixels
    pub x: f64,
    pub y: f64,
}

impl Worker {
    fn new(id: u32, name: &str, zone: char, unit: &str, x: f64, y: f64) -> Self {
        Worker {
            id,
            name: name.to_string(),
            zone,
            unit: unit.to_string(),
            safe: false,
            x,
            y,
        }
    }
}

/// The fixed initial roster: ten workers across hazard storage (unit 610),
/// processing (unit M6) and the reactor bay.
pub fn initial_roster() -> Vec<Worker> {
    vec![
        Worker::new(1, "Worker A", 'A', "610", 120.0, 80.0),
        Worker::new(2, "Worker B", 'A', "610", 150.0, 100.0),
        Worker::new(3, "Worker C", 'A', "610", 180.0, 120.0),
        Worker::new(4, "Worker D", 'B', "M6", 620.0, 80.0),
        Worker::new(5, "Worker E", 'B', "M6", 650.0, 100.0),
        Worker::new(6, "Worker F", 'B', "M6", 680.0, 120.0),
        Worker::new(7, "Worker G", 'C', "Reactor", 350.0, 270.0),
        Worker::new(8, "Worker H", 'C', "Reactor", 400.0, 300.0),
        Worker::new(9, "Worker I", 'C', "Reactor", 450.0, 320.0),
        Worker::new(10, "Worker J", 'B', "M6", 630.0, 140.0),
    ]
}

/// Mark one worker safe. Returns true if the flag changed; unknown ids and
/// already-safe workers are no-ops.
pub fn mark_safe(roster: &mut [Worker], worker_id: u32) -> bool {
    match roster.iter_mut().find(|w| w.id == worker_id) {
        Some(worker) if !worker.safe => {
            worker.safe = true;
            true
        }
        Some(_) => false,
        None => {
            debug!("mark_safe: unknown worker id {}", worker_id);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_roster_is_ten_workers_all_unsafe() {
        let roster = initial_roster();
        assert_eq!(roster.len(), 10);
        assert!(roster.iter().all(|w| !w.safe));
    }

    #[test]
    fn test_mark_safe_latches() {
        let mut roster = initial_roster();
        assert!(mark_safe(&mut roster, 3));
        assert!(roster[2].safe);
        // Second mark is a no-op, flag stays true.
        assert!(!mark_safe(&mut roster, 3));
        assert!(roster[2].safe);
    }

    #[test]
    fn test_unknown_worker_is_noop() {
        let mut roster = initial_roster();
        assert!(!mark_safe(&mut roster, 999));
        assert!(roster.iter().all(|w| !w.safe));
    }
}
