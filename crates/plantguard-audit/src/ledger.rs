// Hash-chained compliance ledger.
//
// Every risk-tier transition and every human authorization is recorded as an
// immutable entry whose SHA-256 hash covers the entry's own fields plus the
// previous entry's hash, anchoring a chain of custody back to a genesis
// constant.
//
// SAFETY INVARIANTS:
// 1. Entries are append-only; ids are strictly increasing
// 2. integrity_hash(entry_n) depends on integrity_hash(entry_{n-1})
// 3. The ledger is capped; evicting the oldest entry promotes its hash to
//    the checkpoint anchor so the retained suffix stays verifiable
// 4. Verification is read-only and never fatal: a mismatch is reported as a
//    typed result naming the first bad entry

use log::{info, warn};
use plantguard_core::{RiskTier, SensorSnapshot};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use thiserror::Error;

/// Fixed anchor for the first entry of a fresh chain.
pub const GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Maximum retained entries before checkpoint eviction kicks in.
pub const LEDGER_CAPACITY: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger integrity check failed at entry {index} (id {entry_id})")]
    IntegrityViolation { index: usize, entry_id: u64 },
}

/// What a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEntryKind {
    /// The classifier's tier changed between consecutive readings
    StateChange,

    /// A human authorized a safety intervention
    Authorization,
}

impl LedgerEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryKind::StateChange => "STATE_CHANGE",
            LedgerEntryKind::Authorization => "AUTHORIZATION",
        }
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Strictly increasing entry id
    pub id: u64,

    /// Record time (milliseconds since Unix epoch)
    pub timestamp_ms: i64,

    pub kind: LedgerEntryKind,

    /// Tier before the transition; None for the very first classification
    pub previous_tier: Option<RiskTier>,

    /// Tier after the transition (for authorizations, the tier active at
    /// the moment of authorization)
    pub new_tier: RiskTier,

    /// Sensor values at record time
    pub snapshot: SensorSnapshot,

    /// Action name for Authorization entries
    pub authorized_action: Option<String>,

    /// SHA-256 over this entry's fields chained with the previous hash
    pub integrity_hash: String,
}

impl LedgerEntry {
    /// Compute the chained hash for an entry's fields. Every stored field
    /// is covered, the id included, so no single-field mutation can escape
    /// verification.
    fn compute_hash(
        previous_hash: &str,
        id: u64,
        timestamp_ms: i64,
        kind: LedgerEntryKind,
        previous_tier: Option<RiskTier>,
        new_tier: RiskTier,
        snapshot: &SensorSnapshot,
        authorized_action: Option<&str>,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}{}{}{}{}{}{}{}{}{}",
            previous_hash,
            id,
            timestamp_ms,
            kind.as_str(),
            previous_tier.map(|t| t.as_str()).unwrap_or("INIT"),
            new_tier.as_str(),
            snapshot.temperature,
            snapshot.pressure,
            snapshot.inhibitor_level,
            authorized_action.unwrap_or(""),
        ));
        hex::encode(hasher.finalize())
    }
}

/// Append-only, capacity-bounded ledger with a checkpointed hash chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceLedger {
    entries: VecDeque<LedgerEntry>,

    /// Anchor of the retained chain: genesis, or the hash of the most
    /// recently evicted entry
    checkpoint_hash: String,

    capacity: usize,
    next_id: u64,
}

impl Default for ComplianceLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceLedger {
    pub fn new() -> Self {
        Self::with_capacity(LEDGER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ComplianceLedger {
            entries: VecDeque::new(),
            checkpoint_hash: GENESIS_HASH.to_string(),
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    /// Record a risk-tier transition. The session calls this only when the
    /// new tier differs from the previous one.
    pub fn record_transition(
        &mut self,
        previous_tier: Option<RiskTier>,
        new_tier: RiskTier,
        snapshot: SensorSnapshot,
        timestamp_ms: i64,
    ) -> &LedgerEntry {
        info!(
            "compliance: state change {} -> {}",
            previous_tier.map(|t| t.as_str()).unwrap_or("INIT"),
            new_tier.as_str()
        );
        self.append(
            LedgerEntryKind::StateChange,
            previous_tier,
            new_tier,
            snapshot,
            None,
            timestamp_ms,
        )
    }

    /// Record a human authorization, carrying the tier active at the moment.
    pub fn record_authorization(
        &mut self,
        action: &str,
        current_tier: RiskTier,
        snapshot: SensorSnapshot,
        timestamp_ms: i64,
    ) -> &LedgerEntry {
        info!("compliance: authorization \"{}\" at tier {}", action, current_tier);
        self.append(
            LedgerEntryKind::Authorization,
            Some(current_tier),
            current_tier,
            snapshot,
            Some(action.to_string()),
            timestamp_ms,
        )
    }

    fn append(
        &mut self,
        kind: LedgerEntryKind,
        previous_tier: Option<RiskTier>,
        new_tier: RiskTier,
        snapshot: SensorSnapshot,
        authorized_action: Option<String>,
        timestamp_ms: i64,
    ) -> &LedgerEntry {
        let previous_hash = self
            .entries
            .back()
            .map(|e| e.integrity_hash.clone())
            .unwrap_or_else(|| self.checkpoint_hash.clone());

        let integrity_hash = LedgerEntry::compute_hash(
            &previous_hash,
            self.next_id,
            timestamp_ms,
            kind,
            previous_tier,
            new_tier,
            &snapshot,
            authorized_action.as_deref(),
        );

        let entry = LedgerEntry {
            id: self.next_id,
            timestamp_ms,
            kind,
            previous_tier,
            new_tier,
            snapshot,
            authorized_action,
            integrity_hash,
        };
        self.next_id += 1;
        self.entries.push_back(entry);

        // Bounded retention: promote the evicted hash to the checkpoint
        // anchor so forward verification of the suffix stays well-defined.
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                self.checkpoint_hash = evicted.integrity_hash;
            }
        }

        self.entries.back().unwrap()
    }

    /// Recompute the chain from the checkpoint anchor and compare against
    /// stored hashes. Read-only; a mismatch names the first bad entry.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let mut previous_hash = self.checkpoint_hash.as_str();

        for (index, entry) in self.entries.iter().enumerate() {
            let recomputed = LedgerEntry::compute_hash(
                previous_hash,
                entry.id,
                entry.timestamp_ms,
                entry.kind,
                entry.previous_tier,
                entry.new_tier,
                &entry.snapshot,
                entry.authorized_action.as_deref(),
            );
            if recomputed != entry.integrity_hash {
                warn!(
                    "compliance: integrity check failed at entry {} (id {})",
                    index, entry.id
                );
                return Err(LedgerError::IntegrityViolation {
                    index,
                    entry_id: entry.id,
                });
            }
            previous_hash = entry.integrity_hash.as_str();
        }

        Ok(())
    }

    /// Entries newest-first, the display order of the compliance panel.
    pub fn snapshot_newest_first(&self) -> Vec<LedgerEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    /// Entries oldest-first (chain order).
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn checkpoint_hash(&self) -> &str {
        &self.checkpoint_hash
    }

    #[cfg(test)]
    fn entry_mut(&mut self, index: usize) -> &mut LedgerEntry {
        &mut self.entries[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(t: f64) -> SensorSnapshot {
        SensorSnapshot {
            temperature: t,
            pressure: 15.0,
            inhibitor_level: 300.0,
        }
    }

    fn ledger_with_entries(n: usize) -> ComplianceLedger {
        let mut ledger = ComplianceLedger::new();
        let mut tier = RiskTier::Normal;
        ledger.record_transition(None, tier, snap(20.0), 0);
        for i in 1..n {
            let next = if tier == RiskTier::Normal {
                RiskTier::Warning
            } else {
                RiskTier::Normal
            };
            ledger.record_transition(Some(tier), next, snap(20.0 + i as f64), i as i64 * 1_000);
            tier = next;
        }
        ledger
    }

    #[test]
    fn test_first_entry_chains_from_genesis() {
        let ledger = ledger_with_entries(1);
        assert_eq!(ledger.checkpoint_hash(), GENESIS_HASH);
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_chain_verifies_end_to_end() {
        let ledger = ledger_with_entries(50);
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_tampering_with_any_field_is_detected() {
        let mut ledger = ledger_with_entries(20);
        ledger.entry_mut(7).snapshot.temperature = 99.9;
        assert_eq!(
            ledger.verify(),
            Err(LedgerError::IntegrityViolation {
                index: 7,
                entry_id: 7
            })
        );
    }

    #[test]
    fn test_rewriting_an_entry_id_is_detected() {
        let mut ledger = ledger_with_entries(10);
        ledger.entry_mut(4).id = 999;
        assert_eq!(
            ledger.verify(),
            Err(LedgerError::IntegrityViolation {
                index: 4,
                entry_id: 999
            })
        );
    }

    #[test]
    fn test_tampering_with_a_hash_breaks_the_link_after_it() {
        let mut ledger = ledger_with_entries(20);
        // A forged hash makes entry 5 itself fail recomputation.
        ledger.entry_mut(5).integrity_hash = "f".repeat(64);
        let err = ledger.verify().unwrap_err();
        assert_eq!(err, LedgerError::IntegrityViolation { index: 5, entry_id: 5 });
    }

    #[test]
    fn test_eviction_checkpoints_and_suffix_verifies() {
        let ledger = ledger_with_entries(LEDGER_CAPACITY + 25);
        assert_eq!(ledger.len(), LEDGER_CAPACITY);
        assert_ne!(ledger.checkpoint_hash(), GENESIS_HASH);
        assert!(ledger.verify().is_ok());
        // Oldest retained entry is the 26th ever recorded.
        assert_eq!(ledger.entries().next().unwrap().id, 25);
    }

    #[test]
    fn test_authorization_entry_carries_action_and_tier() {
        let mut ledger = ComplianceLedger::new();
        ledger.record_authorization("Emergency Venting", RiskTier::Critical, snap(80.0), 1_000);
        let entry = &ledger.snapshot_newest_first()[0];
        assert_eq!(entry.kind, LedgerEntryKind::Authorization);
        assert_eq!(entry.new_tier, RiskTier::Critical);
        assert_eq!(entry.authorized_action.as_deref(), Some("Emergency Venting"));
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_snapshot_is_newest_first() {
        let ledger = ledger_with_entries(5);
        let ids: Vec<u64> = ledger.snapshot_newest_first().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_ids_strictly_increase_across_eviction() {
        let ledger = ledger_with_entries(LEDGER_CAPACITY + 10);
        let ids: Vec<u64> = ledger.entries().map(|e| e.id).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
