use serde::{Deserialize, Serialize};

use crate::device::DeviceState;

/// A queue event received from the telephony manager.
///
/// This is a closed set: every event kind the engine reacts to (or
/// deliberately ignores) has a variant, so dispatch is exhaustive and a new
/// kind is a compile error rather than a silently dropped string key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ManagerEvent {
    /// A caller entered a queue.
    Join {
        queue: String,
        unique_id: String,
        caller_id_num: String,
    },
    /// A caller left a queue (answered, transferred, or hung up).
    Leave { queue: String, unique_id: String },
    /// A caller hung up before reaching an agent.
    QueueCallerAbandoned { queue: String, unique_id: String },
    /// An agent was connected to a queued call.
    AgentConnect {
        queue: String,
        unique_id: String,
        member_name: String,
    },
    /// An agent dumped the call before the caller was bridged.
    AgentDump {
        queue: String,
        unique_id: String,
        member_name: String,
    },
    /// An agent finished handling a queued call.
    AgentComplete {
        queue: String,
        unique_id: String,
        member_name: String,
    },
    /// A member's device state changed.
    QueueMemberStatus {
        queue: String,
        location: String,
        penalty: i64,
        calls_taken: i64,
        last_call: i64,
        status: DeviceState,
        paused: bool,
    },
    /// A member was paused or unpaused.
    QueueMemberPaused {
        queue: String,
        location: String,
        member_name: String,
        paused: bool,
    },
    /// A member was dynamically added to a queue.
    QueueMemberAdded {
        queue: String,
        location: String,
        member_name: String,
        penalty: i64,
        calls_taken: i64,
        last_call: i64,
        status: DeviceState,
        paused: bool,
    },
    /// A member was dynamically removed from a queue.
    QueueMemberRemoved {
        queue: String,
        location: String,
        member_name: String,
    },
}

impl ManagerEvent {
    /// The queue this event pertains to. Every event kind carries one.
    pub fn queue(&self) -> &str {
        match self {
            Self::Join { queue, .. }
            | Self::Leave { queue, .. }
            | Self::QueueCallerAbandoned { queue, .. }
            | Self::AgentConnect { queue, .. }
            | Self::AgentDump { queue, .. }
            | Self::AgentComplete { queue, .. }
            | Self::QueueMemberStatus { queue, .. }
            | Self::QueueMemberPaused { queue, .. }
            | Self::QueueMemberAdded { queue, .. }
            | Self::QueueMemberRemoved { queue, .. } => queue,
        }
    }
}

/// One record of the full queue-status dump the manager produces on request.
///
/// After (re)connecting, the embedding transport asks the manager for the
/// complete current state of every queue and replays the answer through the
/// engine to rebuild the datastore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueueSnapshotRecord {
    /// A caller currently waiting in a queue.
    Entry {
        queue: String,
        unique_id: String,
        caller_id_num: String,
    },
    /// A member currently attached to a queue.
    Member {
        queue: String,
        location: String,
        member_name: String,
        penalty: i64,
        calls_taken: i64,
        last_call: i64,
        status: DeviceState,
        paused: bool,
    },
}

impl QueueSnapshotRecord {
    /// The queue this record belongs to.
    pub fn queue(&self) -> &str {
        match self {
            Self::Entry { queue, .. } | Self::Member { queue, .. } => queue,
        }
    }
}
