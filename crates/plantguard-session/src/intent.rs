// Intents accepted by the safety session's mailbox.
//
// Everything that can mutate the aggregate — sensor ticks and human
// decisions alike — arrives as one of these, so all mutations interleave
// deterministically on a single queue.

use plantguard_core::ScenarioKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionIntent {
    /// Advance the sensor stream by one reading and reclassify
    Tick,

    /// Choose a scenario; clears any active run without starting a new one
    SelectScenario(ScenarioKind),

    /// Activate the selected scenario from now
    StartScenario,

    /// Deactivate the running scenario, keeping its selection
    StopScenario,

    /// Deactivate and rewind the selected scenario
    ResetScenario,

    /// Human authorization of a safety intervention
    Authorize {
        action_name: String,
        incident_tag: String,
    },

    /// Force the plant back to the safe baseline and credit the resolution
    ResolveIncident,

    /// Mark one worker as evacuated (no-op for unknown ids)
    MarkWorkerSafe(u32),

    /// Restore the entire aggregate to its initial state
    Reset,

    /// Stop the session task and release its timer
    Shutdown,
}
