// Environmental-damage-prevented (EDP) accumulator.
//
// Each authorized intervention credits the running EDP total from a fixed
// table keyed by the incident it prevented; incident resolutions credit a
// fixed amount and leave a resolution-log message for the audit trail.
//
// SAFETY INVARIANTS:
// 1. The total is monotonically non-decreasing; it is only ever incremented,
//    never recomputed from scratch
// 2. AuthorizedAction records are immutable once created
// 3. Unknown incident tags credit the default value rather than failing

use log::info;
use serde::{Deserialize, Serialize};

/// EDP credited by a remote incident resolution, millions USD.
pub const RESOLUTION_CREDIT_MUSD: f64 = 12.16;

/// Baseline EDP attributed to continuous monitoring, millions USD.
pub const BASELINE_EDP_MUSD: f64 = 12.16;

/// Estimated damage prevented for a given incident tag, millions USD.
fn edp_value_musd(incident_tag: &str) -> f64 {
    match incident_tag {
        "pressure-runaway" => 45.2,
        "inhibitor-depletion" => 12.16,
        "thermal" => 28.9,
        _ => 15.0,
    }
}

/// A human-authorized safety intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedAction {
    pub id: u64,
    pub action_name: String,
    pub timestamp_ms: i64,
    /// Incident tag the intervention prevented
    pub prevented_incident: String,
    /// EDP credited for it, millions USD
    pub edp_value_musd: f64,
}

/// One resolution-log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub id: u64,
    pub timestamp_ms: i64,
    pub message: String,
}

/// Running EDP total plus the actions and resolutions behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactAccumulator {
    total_musd: f64,
    actions: Vec<AuthorizedAction>,
    resolutions: Vec<ResolutionRecord>,
    next_id: u64,
}

impl Default for ImpactAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ImpactAccumulator {
    pub fn new() -> Self {
        ImpactAccumulator {
            total_musd: BASELINE_EDP_MUSD,
            actions: Vec::new(),
            resolutions: Vec::new(),
            next_id: 0,
        }
    }

    /// Credit an authorized intervention. Returns the EDP value applied.
    pub fn apply_authorization(
        &mut self,
        action_name: &str,
        incident_tag: &str,
        timestamp_ms: i64,
    ) -> f64 {
        let value = edp_value_musd(incident_tag);
        self.actions.push(AuthorizedAction {
            id: self.next_id,
            action_name: action_name.to_string(),
            timestamp_ms,
            prevented_incident: incident_tag.to_string(),
            edp_value_musd: value,
        });
        self.next_id += 1;
        self.total_musd += value;
        info!(
            "impact: authorized \"{}\" against {} (+${:.2}M, total ${:.2}M)",
            action_name, incident_tag, value, self.total_musd
        );
        value
    }

    /// Credit a remote incident resolution and append its log line.
    /// Returns the EDP value applied.
    pub fn apply_resolution(&mut self, timestamp_ms: i64) -> f64 {
        let message = format!(
            "SUCCESS: Remote intervention authorized. Personnel evacuated to \
             Safe Assembly Point. EDP Impact: +${:.2}M",
            RESOLUTION_CREDIT_MUSD
        );
        self.resolutions.push(ResolutionRecord {
            id: self.next_id,
            timestamp_ms,
            message,
        });
        self.next_id += 1;

        self.actions.push(AuthorizedAction {
            id: self.next_id,
            action_name: "Remote Incident Resolution".to_string(),
            timestamp_ms,
            prevented_incident: "inhibitor-depletion".to_string(),
            edp_value_musd: RESOLUTION_CREDIT_MUSD,
        });
        self.next_id += 1;

        self.total_musd += RESOLUTION_CREDIT_MUSD;
        info!(
            "impact: incident resolved (+${:.2}M, total ${:.2}M)",
            RESOLUTION_CREDIT_MUSD, self.total_musd
        );
        RESOLUTION_CREDIT_MUSD
    }

    /// Accumulated EDP, millions USD.
    pub fn total_musd(&self) -> f64 {
        self.total_musd
    }

    pub fn actions(&self) -> &[AuthorizedAction] {
        &self.actions
    }

    pub fn resolutions(&self) -> &[ResolutionRecord] {
        &self.resolutions
    }
}
