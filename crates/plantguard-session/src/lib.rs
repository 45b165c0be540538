// PLANTGUARD SESSION
// The safety-session orchestrator: one authority owns the mutable aggregate
// (current reading, tier, scenario run, history, ledger, accumulator,
// roster) and serializes every mutation through a single intent mailbox.
//
// SAFETY INVARIANTS:
// 1. Exactly one tier is current at any instant; it is always the
//    classifier's pure function of the current reading
// 2. No two mutations apply concurrently: ticks and human intents are
//    consumed by one task from one ordered queue
// 3. Timers are released on every exit path (mailbox close ends the loop)

pub mod intent;
pub mod runtime;
pub mod session;

pub use intent::SessionIntent;
pub use runtime::{spawn_session, SessionConfig, SessionError, SessionHandle};
pub use session::{SafetySession, SessionSnapshot};
