// PlantGuard console runner.
//
// Drives a safety session for a fixed duration, optionally under one of the
// training scenarios, logging tier transitions as they happen and closing
// with an audit report: final tier, damage prevented, and the result of the
// compliance ledger's integrity verification.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use plantguard_core::{RiskTier, ScenarioKind};
use plantguard_session::{spawn_session, SessionConfig};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScenarioArg {
    /// Steady-state monitoring only
    Steady,
    /// Tank pressure-runaway training scenario
    PressureRunaway,
    /// Inhibitor-depletion training scenario
    InhibitorDepletion,
}

impl From<ScenarioArg> for ScenarioKind {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Steady => ScenarioKind::Steady,
            ScenarioArg::PressureRunaway => ScenarioKind::PressureRunaway,
            ScenarioArg::InhibitorDepletion => ScenarioKind::InhibitorDepletion,
        }
    }
}

#[derive(Parser)]
#[command(name = "plantguard")]
#[command(about = "Industrial safety-monitoring console engine", long_about = None)]
struct Cli {
    /// Scenario to run
    #[arg(long, value_enum, default_value_t = ScenarioArg::Steady)]
    scenario: ScenarioArg,

    /// How long to monitor before the closing report, in seconds
    #[arg(long, default_value_t = 60)]
    duration_secs: u64,

    /// Resolve any open incident before the closing report
    #[arg(long, default_value_t = false)]
    resolve: bool,

    /// Fixed sensor-noise seed (deterministic run)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut handle = spawn_session(SessionConfig {
        seed: cli.seed,
        ..SessionConfig::default()
    });

    let kind: ScenarioKind = cli.scenario.into();
    if kind != ScenarioKind::Steady {
        handle.select_scenario(kind)?;
        handle.start_scenario()?;
        info!("scenario {} started", kind);
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(cli.duration_secs);
    let mut tier = handle.snapshot().tier;

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            snapshot = handle.next_snapshot() => {
                let snapshot = snapshot?;
                if snapshot.tier != tier {
                    info!(
                        "tier {} -> {} (T={:.1}°C P={:.1}psi I={:.0}ppm dT/dt={:.1}°C/min)",
                        tier,
                        snapshot.tier,
                        snapshot.reading.temperature,
                        snapshot.reading.pressure,
                        snapshot.reading.inhibitor_level,
                        snapshot.reading.temperature_rate,
                    );
                    tier = snapshot.tier;
                }
            }
        }
    }

    if cli.resolve && tier != RiskTier::Normal {
        handle.resolve_incident()?;
        handle.next_snapshot().await?;
    }

    let report = handle.snapshot();
    println!("=== PlantGuard session report ===");
    println!("final tier:        {}", report.tier);
    println!(
        "final reading:     {:.1} °C / {:.1} psi / {:.0} ppm",
        report.reading.temperature, report.reading.pressure, report.reading.inhibitor_level
    );
    println!("history points:    {}", report.history.len());
    println!("ledger entries:    {}", report.ledger.len());
    println!(
        "ledger integrity:  {}",
        match report.ledger.verify() {
            Ok(()) => "VERIFIED".to_string(),
            Err(err) => format!("FAILED ({err})"),
        }
    );
    println!("damage prevented:  ${:.2}M", report.edp_total_musd);
    println!(
        "workers safe:      {}/{}",
        report.workers.iter().filter(|w| w.safe).count(),
        report.workers.len()
    );
    for line in &report.resolution_log {
        println!("resolution:        {}", line.message);
    }

    handle.shutdown().await?;
    Ok(())
}
