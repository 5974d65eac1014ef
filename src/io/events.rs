use crate::core::state::AetherState;
use anyhow::Result;

/// Messages feeding the scheduler's select loop.
///
/// External triggers (chat, simulated events, shutdown) arrive from the
/// interface; `EventExpired`, `EvolutionDone` and `ChatDone` are sent back by
/// tasks the scheduler spawned itself.
#[derive(Debug)]
pub enum Impulse {
    /// A user-injected transient event (last-write-wins, 30 s TTL).
    SimulateEvent(String),
    /// TTL timer fired for the event generation it was armed with.
    EventExpired(u64),
    /// User chat message from the interface panel.
    Chat(String),
    /// An evolution request completed; `seq` orders overlapping responses.
    EvolutionDone {
        seq: u64,
        outcome: Result<AetherState>,
    },
    /// The in-flight chat exchange produced a reply.
    ChatDone(String),
    SystemInterrupt,
}
