// PLANTGUARD AUDIT
// Tamper-evident compliance ledger and the environmental-damage-prevented
// (EDP) accumulator backing authorized interventions.
//
// SAFETY INVARIANTS:
// 1. Ledger entries are append-only; each entry's hash chains from its
//    predecessor, so altering any retained entry is detectable
// 2. Eviction promotes the evicted entry's hash to a checkpoint anchor,
//    keeping the retained suffix verifiable
// 3. The accumulated EDP total is monotonically non-decreasing

pub mod impact;
pub mod ledger;

pub use impact::{
    AuthorizedAction, ImpactAccumulator, ResolutionRecord, RESOLUTION_CREDIT_MUSD,
};
pub use ledger::{
    ComplianceLedger, LedgerEntry, LedgerEntryKind, LedgerError, GENESIS_HASH,
    LEDGER_CAPACITY,
};
