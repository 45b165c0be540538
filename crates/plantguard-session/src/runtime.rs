// Timer-driven session runtime.
//
// One spawned task owns the aggregate and consumes a single ordered queue:
// a repeating interval pushes ticks, and human intents arrive on the same
// mailbox, so every mutation is serialized by construction. Snapshots are
// published through a watch channel after each applied intent.
//
// SAFETY INVARIANTS:
// 1. The aggregate is owned by exactly one task; no lock is needed
// 2. The tick timer lives inside the task loop: closing the mailbox (drop
//    or Shutdown) ends the loop and releases the timer on every exit path
// 3. Tick cadence follows scenario activation (1 s active, 2 s steady)

use crate::intent::SessionIntent;
use crate::session::{SafetySession, SessionSnapshot};
use chrono::Utc;
use log::{debug, info};
use plantguard_core::ScenarioKind;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session task is no longer running")]
    SessionClosed,
}

/// Runtime configuration. Defaults match live operation; tests shrink the
/// cadences and pin the RNG seed.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Tick interval while a scenario run is active
    pub scenario_tick: Duration,

    /// Tick interval during steady-state monitoring
    pub steady_tick: Duration,

    /// Fixed sensor-noise seed, for deterministic tests
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            scenario_tick: crate::session::SCENARIO_TICK,
            steady_tick: crate::session::STEADY_TICK,
            seed: None,
        }
    }
}

/// Client half of the session: intent senders plus the snapshot feed.
///
/// Dropping the handle closes the mailbox, which stops the session task.
#[derive(Debug)]
pub struct SessionHandle {
    intents: mpsc::UnboundedSender<SessionIntent>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Latest published aggregate snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until the session publishes a new snapshot, then return it.
    pub async fn next_snapshot(&mut self) -> Result<SessionSnapshot, SessionError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| SessionError::SessionClosed)?;
        Ok(self.snapshots.borrow().clone())
    }

    pub fn select_scenario(&self, kind: ScenarioKind) -> Result<(), SessionError> {
        self.send(SessionIntent::SelectScenario(kind))
    }

    pub fn start_scenario(&self) -> Result<(), SessionError> {
        self.send(SessionIntent::StartScenario)
    }

    pub fn stop_scenario(&self) -> Result<(), SessionError> {
        self.send(SessionIntent::StopScenario)
    }

    pub fn reset_scenario(&self) -> Result<(), SessionError> {
        self.send(SessionIntent::ResetScenario)
    }

    pub fn authorize(&self, action_name: &str, incident_tag: &str) -> Result<(), SessionError> {
        self.send(SessionIntent::Authorize {
            action_name: action_name.to_string(),
            incident_tag: incident_tag.to_string(),
        })
    }

    pub fn resolve_incident(&self) -> Result<(), SessionError> {
        self.send(SessionIntent::ResolveIncident)
    }

    pub fn mark_worker_safe(&self, worker_id: u32) -> Result<(), SessionError> {
        self.send(SessionIntent::MarkWorkerSafe(worker_id))
    }

    pub fn reset(&self) -> Result<(), SessionError> {
        self.send(SessionIntent::Reset)
    }

    /// Stop the session task and wait for it to finish.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        let _ = self.intents.send(SessionIntent::Shutdown);
        self.task.await.map_err(|_| SessionError::SessionClosed)
    }

    fn send(&self, intent: SessionIntent) -> Result<(), SessionError> {
        self.intents
            .send(intent)
            .map_err(|_| SessionError::SessionClosed)
    }
}

/// Launch the session task and return its handle.
pub fn spawn_session(config: SessionConfig) -> SessionHandle {
    let (intent_tx, mut intent_rx) = mpsc::unbounded_channel::<SessionIntent>();

    // Wall-clock anchor plus runtime-clock elapsed: timestamps stay
    // monotone under the tokio clock (including the paused test clock).
    let epoch_ms = Utc::now().timestamp_millis();
    let started = tokio::time::Instant::now();
    let now_ms = move || epoch_ms + started.elapsed().as_millis() as i64;

    let mut session = match config.seed {
        Some(seed) => SafetySession::from_seed(seed, now_ms()),
        None => SafetySession::new(now_ms()),
    };

    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

    let task = tokio::spawn(async move {
        let mut cadence = if session.scenario_run().is_active() {
            config.scenario_tick
        } else {
            config.steady_tick
        };
        let mut ticker = tokio::time::interval(cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately; skip it so the
        // session does not double-read at startup.
        ticker.tick().await;

        info!("session runtime started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    session.apply(SessionIntent::Tick, now_ms());
                }
                received = intent_rx.recv() => match received {
                    None | Some(SessionIntent::Shutdown) => {
                        debug!("session runtime stopping");
                        break;
                    }
                    Some(intent) => session.apply(intent, now_ms()),
                }
            }

            let wanted = if session.scenario_run().is_active() {
                config.scenario_tick
            } else {
                config.steady_tick
            };
            if wanted != cadence {
                cadence = wanted;
                ticker = tokio::time::interval(cadence);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker.tick().await;
            }

            if snapshot_tx.send(session.snapshot()).is_err() {
                // Every receiver is gone; nobody is watching the plant
                // through this handle anymore.
                debug!("session runtime stopping: snapshot channel closed");
                break;
            }
        }
    });

    SessionHandle {
        intents: intent_tx,
        snapshots: snapshot_rx,
        task,
    }
}
