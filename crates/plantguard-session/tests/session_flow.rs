// End-to-end session flow: a full training drill from steady state through
// a pressure-runaway escalation, operator intervention, and resolution,
// exercised through the public runtime handle only.

use plantguard_audit::LedgerEntryKind;
use plantguard_core::{RiskTier, ScenarioKind};
use plantguard_session::{spawn_session, SessionConfig};
use std::time::Duration;

fn drill_config() -> SessionConfig {
    SessionConfig {
        seed: Some(404),
        ..SessionConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn full_drill_escalates_intervenes_and_resolves() {
    let handle = spawn_session(drill_config());

    // Phase 1: steady monitoring. The plant should hold a sane reading.
    tokio::time::sleep(Duration::from_secs(10)).await;
    let snap = handle.snapshot();
    assert!(snap.reading.temperature <= 40.0);
    assert!(!snap.scenario.is_active());

    // Phase 2: run the pressure-runaway drill until the plant is critical.
    handle.select_scenario(ScenarioKind::PressureRunaway).unwrap();
    handle.start_scenario().unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;

    let snap = handle.snapshot();
    assert_eq!(snap.tier, RiskTier::Critical);
    assert!(snap.scenario.is_active());
    assert!(snap.reading.temperature > 35.0);

    // Phase 3: operator authorizes emergency venting.
    let edp_before = snap.edp_total_musd;
    handle.authorize("Emergency Venting", "pressure-runaway").unwrap();
    handle.mark_worker_safe(7).unwrap();
    // Yield to the session task without crossing a tick boundary.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let snap = handle.snapshot();
    assert!((snap.edp_total_musd - edp_before - 45.2).abs() < 1e-9);
    let newest_auth = snap
        .ledger
        .snapshot_newest_first()
        .into_iter()
        .find(|e| e.kind == LedgerEntryKind::Authorization)
        .expect("authorization entry on the ledger");
    assert_eq!(newest_auth.authorized_action.as_deref(), Some("Emergency Venting"));
    assert_eq!(newest_auth.new_tier, RiskTier::Critical);

    // Phase 4: resolve the incident; plant returns to the safe baseline.
    handle.resolve_incident().unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let snap = handle.snapshot();
    assert_eq!(snap.tier, RiskTier::Normal);
    assert!(!snap.scenario.is_active());
    assert!(snap.workers.iter().all(|w| w.safe));
    assert_eq!(snap.resolution_log.len(), 1);

    // The whole drill must leave a verifiable audit trail.
    assert!(snap.ledger.verify().is_ok());
    let transitions = snap
        .ledger
        .entries()
        .filter(|e| e.kind == LedgerEntryKind::StateChange)
        .count();
    assert!(transitions >= 3, "init, escalation, and recovery transitions");

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reset_restores_the_initial_aggregate() {
    let handle = spawn_session(drill_config());

    handle.select_scenario(ScenarioKind::InhibitorDepletion).unwrap();
    handle.start_scenario().unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    handle.authorize("Inhibitor Dosing", "inhibitor-depletion").unwrap();
    handle.mark_worker_safe(2).unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!handle.snapshot().authorized_actions.is_empty());

    handle.reset().unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let snap = handle.snapshot();
    assert_eq!(snap.tier, RiskTier::Normal);
    assert!(snap.authorized_actions.is_empty());
    assert!(snap.workers.iter().all(|w| !w.safe));
    assert!(snap.history.is_empty() || snap.history.len() <= 1);
    assert!(snap.ledger.verify().is_ok());

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stopping_a_scenario_returns_to_steady_cadence() {
    let mut handle = spawn_session(drill_config());

    handle.select_scenario(ScenarioKind::PressureRunaway).unwrap();
    handle.start_scenario().unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    let during = handle.snapshot().history.len();

    handle.stop_scenario().unwrap();
    handle.next_snapshot().await.unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;

    let snap = handle.snapshot();
    assert!(!snap.scenario.is_active());
    // Steady cadence is 2 s: 20 s adds ~10 points, not ~20.
    let added = snap.history.len() - during;
    assert!(added <= 12, "steady cadence should halve the tick rate, added {added}");

    handle.shutdown().await.unwrap();
}
