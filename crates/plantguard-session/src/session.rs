// The safety-session aggregate.
//
// Owns the canonical mutable state and applies intents one at a time. All
// temporal logic takes an explicit `now_ms`, so the aggregate itself is
// deterministic and directly testable without a runtime.
//
// SAFETY INVARIANTS:
// 1. The stored tier is always classify(current reading)
// 2. A ledger transition is recorded exactly when the tier changes
// 3. accumulated EDP never decreases; worker safe flags only latch true
//    (until a full Reset)

use crate::intent::SessionIntent;
use log::{debug, info};
use plantguard_audit::{AuthorizedAction, ComplianceLedger, ImpactAccumulator, ResolutionRecord};
use plantguard_core::classifier::CRITICAL_RATE_C_PER_MIN;
use plantguard_core::{
    classify, initial_roster, trajectory, HistoryBuffer, HistoryPoint, RiskTier, ScenarioKind,
    ScenarioRun, SensorBounds, SensorReading, SensorSnapshot, SensorStream, Worker,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tick cadence while a scenario run is active.
pub const SCENARIO_TICK: Duration = Duration::from_millis(1_000);

/// Tick cadence during steady-state monitoring.
pub const STEADY_TICK: Duration = Duration::from_millis(2_000);

/// Safe post-incident baseline: 25 °C, 15 psi, 200 ppm.
const BASELINE: SensorSnapshot = SensorSnapshot {
    temperature: 25.0,
    pressure: 15.0,
    inhibitor_level: 200.0,
};

/// Read-only view of the aggregate handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub reading: SensorReading,
    pub tier: RiskTier,
    pub scenario: ScenarioRun,

    /// Derived projection: is the temperature rate of change alone enough
    /// to classify the plant critical? Computed, never stored.
    pub rate_critical: bool,

    /// Trailing five minutes of readings, oldest first
    pub history: Vec<HistoryPoint>,

    /// Full compliance ledger (carries its own verification routine)
    pub ledger: ComplianceLedger,

    /// Accumulated damage prevented, millions USD
    pub edp_total_musd: f64,

    pub authorized_actions: Vec<AuthorizedAction>,
    pub workers: Vec<Worker>,
    pub resolution_log: Vec<ResolutionRecord>,
}

/// The aggregate root. Single-writer: exactly one owner applies intents.
#[derive(Debug)]
pub struct SafetySession {
    reading: SensorReading,
    tier: RiskTier,
    run: ScenarioRun,
    stream: SensorStream,
    history: HistoryBuffer,
    ledger: ComplianceLedger,
    impact: ImpactAccumulator,
    workers: Vec<Worker>,

    /// Sensor-noise seed, if pinned; a Reset re-seeds the stream from it so
    /// a deterministic session stays deterministic across resets
    seed: Option<u64>,
}

impl SafetySession {
    pub fn new(now_ms: i64) -> Self {
        Self::with_stream(SensorStream::new(), None, now_ms)
    }

    /// Deterministic session for tests.
    pub fn from_seed(seed: u64, now_ms: i64) -> Self {
        Self::with_stream(SensorStream::from_seed(seed), Some(seed), now_ms)
    }

    fn with_stream(mut stream: SensorStream, seed: Option<u64>, now_ms: i64) -> Self {
        let reading = SensorReading::initial(BASELINE, now_ms);
        stream.prime(reading);
        let tier = classify(&reading);

        let mut ledger = ComplianceLedger::new();
        ledger.record_transition(None, tier, reading.snapshot(), now_ms);

        SafetySession {
            reading,
            tier,
            run: ScenarioRun::inactive(ScenarioKind::Steady),
            stream,
            history: HistoryBuffer::new(),
            ledger,
            impact: ImpactAccumulator::new(),
            workers: initial_roster(),
            seed,
        }
    }

    /// Apply one intent. The only mutation entry point.
    pub fn apply(&mut self, intent: SessionIntent, now_ms: i64) {
        match intent {
            SessionIntent::Tick => self.tick(now_ms),
            SessionIntent::SelectScenario(kind) => {
                info!("session: scenario selected: {}", kind);
                self.run = ScenarioRun::inactive(kind);
            }
            SessionIntent::StartScenario => {
                info!("session: scenario {} started", self.run.kind);
                self.run.started_at_ms = Some(now_ms);
            }
            SessionIntent::StopScenario | SessionIntent::ResetScenario => {
                // Elapsed time derives from the start instant, so stopping
                // and rewinding are the same mutation.
                info!("session: scenario {} stopped", self.run.kind);
                self.run.started_at_ms = None;
            }
            SessionIntent::Authorize {
                action_name,
                incident_tag,
            } => self.authorize(&action_name, &incident_tag, now_ms),
            SessionIntent::ResolveIncident => self.resolve_incident(now_ms),
            SessionIntent::MarkWorkerSafe(worker_id) => {
                plantguard_core::workers::mark_safe(&mut self.workers, worker_id);
            }
            SessionIntent::Reset => {
                info!("session: full reset");
                *self = match self.seed {
                    Some(seed) => SafetySession::from_seed(seed, now_ms),
                    None => SafetySession::new(now_ms),
                };
            }
            SessionIntent::Shutdown => {
                // Handled by the runtime loop; applying it here is a no-op.
                debug!("session: shutdown intent reached the aggregate");
            }
        }
    }

    /// One monitoring tick: produce a reading, classify it, record the
    /// transition if the tier changed, and append to the history window.
    fn tick(&mut self, now_ms: i64) {
        let reading = if self.run.is_active() {
            let snapshot = trajectory(self.run.kind, self.run.elapsed_seconds(now_ms));
            self.stream.next_from(snapshot, SensorBounds::SCENARIO, now_ms)
        } else {
            self.stream.next_steady(now_ms)
        };

        let tier = classify(&reading);
        if tier != self.tier {
            self.ledger
                .record_transition(Some(self.tier), tier, reading.snapshot(), now_ms);
        }

        self.history
            .append(HistoryPoint::from_reading(&reading, tier), now_ms);
        self.reading = reading;
        self.tier = tier;
    }

    fn authorize(&mut self, action_name: &str, incident_tag: &str, now_ms: i64) {
        self.ledger
            .record_authorization(action_name, self.tier, self.reading.snapshot(), now_ms);
        self.impact
            .apply_authorization(action_name, incident_tag, now_ms);
    }

    /// Force the plant back to the safe baseline: deactivate the scenario,
    /// reset readings, evacuate everyone, credit the resolution.
    fn resolve_incident(&mut self, now_ms: i64) {
        info!("session: incident resolved, returning to baseline");

        self.run = ScenarioRun::inactive(ScenarioKind::Steady);

        let reading = SensorReading::initial(BASELINE, now_ms);
        self.stream.prime(reading);

        let tier = classify(&reading);
        if tier != self.tier {
            self.ledger
                .record_transition(Some(self.tier), tier, reading.snapshot(), now_ms);
        }
        self.reading = reading;
        self.tier = tier;

        for worker in &mut self.workers {
            worker.safe = true;
        }

        self.impact.apply_resolution(now_ms);
    }

    pub fn current_tier(&self) -> RiskTier {
        self.tier
    }

    pub fn current_reading(&self) -> &SensorReading {
        &self.reading
    }

    pub fn scenario_run(&self) -> &ScenarioRun {
        &self.run
    }

    /// Tick cadence for the current mode.
    pub fn tick_interval(&self) -> Duration {
        if self.run.is_active() {
            SCENARIO_TICK
        } else {
            STEADY_TICK
        }
    }

    /// Build the read-only snapshot for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            reading: self.reading,
            tier: self.tier,
            scenario: self.run,
            rate_critical: self.reading.temperature_rate > CRITICAL_RATE_C_PER_MIN,
            history: self.history.snapshot(),
            ledger: self.ledger.clone(),
            edp_total_musd: self.impact.total_musd(),
            authorized_actions: self.impact.actions().to_vec(),
            workers: self.workers.clone(),
            resolution_log: self.impact.resolutions().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plantguard_audit::LedgerEntryKind;

    const T0: i64 = 1_700_000_000_000;

    fn ticked(session: &mut SafetySession, seconds: i64) {
        for s in 1..=seconds {
            session.apply(SessionIntent::Tick, T0 + s * 1_000);
        }
    }

    #[test]
    fn test_initial_state_is_normal_baseline() {
        let session = SafetySession::from_seed(1, T0);
        assert_eq!(session.current_tier(), RiskTier::Normal);
        assert_eq!(session.current_reading().temperature, 25.0);
        // The initial classification itself is on the audit trail.
        let snap = session.snapshot();
        assert_eq!(snap.ledger.len(), 1);
        assert!(snap.ledger.verify().is_ok());
    }

    #[test]
    fn test_runaway_scenario_reaches_critical_and_is_ledgered() {
        let mut session = SafetySession::from_seed(1, T0);
        session.apply(
            SessionIntent::SelectScenario(ScenarioKind::PressureRunaway),
            T0,
        );
        session.apply(SessionIntent::StartScenario, T0);
        ticked(&mut session, 60);

        // T(60) ≈ 118 °C: far past the 35 °C critical threshold.
        assert_eq!(session.current_tier(), RiskTier::Critical);

        let snap = session.snapshot();
        assert!(snap.ledger.verify().is_ok());
        let transitions: Vec<_> = snap
            .ledger
            .entries()
            .filter(|e| e.kind == LedgerEntryKind::StateChange)
            .collect();
        // INIT -> NORMAL, then at least one escalation.
        assert!(transitions.len() >= 2);
        assert_eq!(transitions.last().unwrap().new_tier, RiskTier::Critical);
    }

    #[test]
    fn test_selected_scenario_is_inert_until_started() {
        let mut session = SafetySession::from_seed(1, T0);
        session.apply(
            SessionIntent::SelectScenario(ScenarioKind::PressureRunaway),
            T0,
        );
        ticked(&mut session, 30);
        // Steady walk stays within general bounds; no runaway values.
        assert!(session.current_reading().temperature <= 40.0);
        assert!(!session.scenario_run().is_active());
    }

    #[test]
    fn test_stop_scenario_returns_feed_to_steady_walk() {
        let mut session = SafetySession::from_seed(1, T0);
        session.apply(
            SessionIntent::SelectScenario(ScenarioKind::PressureRunaway),
            T0,
        );
        session.apply(SessionIntent::StartScenario, T0);
        ticked(&mut session, 40);
        session.apply(SessionIntent::StopScenario, T0 + 40_000);
        assert!(!session.scenario_run().is_active());
        assert_eq!(session.tick_interval(), STEADY_TICK);
    }

    #[test]
    fn test_authorize_records_ledger_entry_and_credits_edp() {
        let mut session = SafetySession::from_seed(1, T0);
        let before = session.snapshot().edp_total_musd;
        session.apply(
            SessionIntent::Authorize {
                action_name: "Emergency Venting".to_string(),
                incident_tag: "pressure-runaway".to_string(),
            },
            T0 + 1_000,
        );

        let snap = session.snapshot();
        assert!((snap.edp_total_musd - before - 45.2).abs() < 1e-9);
        assert_eq!(snap.authorized_actions.len(), 1);
        let newest = &snap.ledger.snapshot_newest_first()[0];
        assert_eq!(newest.kind, LedgerEntryKind::Authorization);
        assert_eq!(newest.authorized_action.as_deref(), Some("Emergency Venting"));
        assert!(snap.ledger.verify().is_ok());
    }

    #[test]
    fn test_resolve_incident_restores_baseline_and_evacuates() {
        let mut session = SafetySession::from_seed(1, T0);
        session.apply(
            SessionIntent::SelectScenario(ScenarioKind::InhibitorDepletion),
            T0,
        );
        session.apply(SessionIntent::StartScenario, T0);
        ticked(&mut session, 120);
        // I(120) ≈ 18 ppm: well under the 50 ppm warning line.
        assert!(session.current_tier() >= RiskTier::Warning);

        let before = session.snapshot().edp_total_musd;
        session.apply(SessionIntent::ResolveIncident, T0 + 121_000);

        let snap = session.snapshot();
        assert_eq!(snap.tier, RiskTier::Normal);
        assert_eq!(snap.reading.temperature, 25.0);
        assert_eq!(snap.reading.inhibitor_level, 200.0);
        assert!(!snap.scenario.is_active());
        assert!(snap.workers.iter().all(|w| w.safe));
        assert!(snap.edp_total_musd > before);
        assert_eq!(snap.resolution_log.len(), 1);
        assert!(snap.ledger.verify().is_ok());
    }

    #[test]
    fn test_mark_worker_safe_latches_and_unknown_id_is_noop() {
        let mut session = SafetySession::from_seed(1, T0);
        session.apply(SessionIntent::MarkWorkerSafe(4), T0);
        session.apply(SessionIntent::MarkWorkerSafe(999), T0);
        let snap = session.snapshot();
        assert!(snap.workers.iter().find(|w| w.id == 4).unwrap().safe);
        assert_eq!(snap.workers.iter().filter(|w| w.safe).count(), 1);
    }

    #[test]
    fn test_history_tracks_ticks_oldest_first() {
        let mut session = SafetySession::from_seed(1, T0);
        ticked(&mut session, 10);
        let history = session.snapshot().history;
        assert_eq!(history.len(), 10);
        for pair in history.windows(2) {
            assert!(pair[0].timestamp_ms <= pair[1].timestamp_ms);
        }
    }

    #[test]
    fn test_reset_restores_initial_aggregate() {
        let mut session = SafetySession::from_seed(1, T0);
        session.apply(SessionIntent::MarkWorkerSafe(2), T0);
        session.apply(
            SessionIntent::Authorize {
                action_name: "vent".to_string(),
                incident_tag: "thermal".to_string(),
            },
            T0,
        );
        ticked(&mut session, 5);
        session.apply(SessionIntent::Reset, T0 + 6_000);

        let snap = session.snapshot();
        assert_eq!(snap.tier, RiskTier::Normal);
        assert!(snap.workers.iter().all(|w| !w.safe));
        assert!(snap.authorized_actions.is_empty());
        assert!(snap.history.is_empty());
        assert_eq!(snap.ledger.len(), 1);
    }

    #[test]
    fn test_reset_of_a_seeded_session_replays_the_same_readings() {
        let mut reset_session = SafetySession::from_seed(77, T0);
        ticked(&mut reset_session, 8);
        reset_session.apply(SessionIntent::Reset, T0);
        ticked(&mut reset_session, 8);

        let mut fresh_session = SafetySession::from_seed(77, T0);
        ticked(&mut fresh_session, 8);

        let replayed = reset_session.snapshot().history;
        let original = fresh_session.snapshot().history;
        assert_eq!(replayed.len(), original.len());
        for (a, b) in replayed.iter().zip(original.iter()) {
            assert_eq!(a.temperature, b.temperature);
            assert_eq!(a.pressure, b.pressure);
            assert_eq!(a.inhibitor_level, b.inhibitor_level);
        }
    }

    #[test]
    fn test_tick_cadence_follows_scenario_activation() {
        let mut session = SafetySession::from_seed(1, T0);
        assert_eq!(session.tick_interval(), STEADY_TICK);
        session.apply(
            SessionIntent::SelectScenario(ScenarioKind::PressureRunaway),
            T0,
        );
        assert_eq!(session.tick_interval(), STEADY_TICK);
        session.apply(SessionIntent::StartScenario, T0);
        assert_eq!(session.tick_interval(), SCENARIO_TICK);
    }
}
