use ringback_ami::{Location, ManagerEvent, QueueSnapshotRecord};
use tracing::{debug, info, warn};

use crate::database::{MemberUpdate, QueueDatabase, UpsertMember};
use crate::filter::EventFilter;

/// Translates telephony-manager events into queue store writes.
///
/// Application is best-effort and at-most-once: an argument defect or a
/// failed write is logged and the event dropped, and the next event is
/// processed regardless. Nothing here retries.
pub struct QueueStateMutator {
    db: QueueDatabase,
    filter: EventFilter,
}

impl QueueStateMutator {
    pub fn new(db: QueueDatabase, filter: EventFilter) -> Self {
        Self { db, filter }
    }

    /// Apply one manager event to the store.
    pub async fn apply(&self, event: &ManagerEvent) {
        if !self.filter.is_monitored(event.queue()) {
            return;
        }
        debug!("📨 Applying {:?}", event);

        match event {
            ManagerEvent::Join {
                queue,
                unique_id,
                caller_id_num,
            } => {
                if unique_id.is_empty() {
                    warn!("Join for queue {} without a unique id, dropped", queue);
                    return;
                }
                if let Err(e) = self.db.insert_caller(unique_id, caller_id_num, queue).await {
                    warn!("Failed to track caller {}: {}", unique_id, e);
                }
            }

            ManagerEvent::Leave { queue, unique_id } => {
                if unique_id.is_empty() {
                    warn!("Leave for queue {} without a unique id, dropped", queue);
                    return;
                }
                // Not forced: a caller flagged for callback survives leaving
                // the live queue, they are dialed back later.
                if let Err(e) = self.db.remove_caller(unique_id, false).await {
                    warn!("Failed to untrack caller {}: {}", unique_id, e);
                }
            }

            ManagerEvent::QueueMemberAdded {
                queue,
                location,
                member_name,
                penalty,
                calls_taken,
                last_call,
                status,
                paused,
            } => {
                let parsed = match Location::parse(location) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!("Member add for queue {} dropped: {}", queue, e);
                        return;
                    }
                };
                let member = UpsertMember {
                    agent: parsed.agent,
                    queue: queue.clone(),
                    display_name: Some(member_name.clone()),
                    location: location.clone(),
                    penalty: *penalty,
                    calls_taken: *calls_taken,
                    last_call: *last_call,
                    status: *status,
                    paused: *paused,
                };
                if let Err(e) = self.db.upsert_member(&member).await {
                    warn!("Failed to add member {} to {}: {}", location, queue, e);
                }
            }

            ManagerEvent::QueueMemberStatus {
                queue,
                location,
                penalty,
                calls_taken,
                last_call,
                status,
                paused,
            } => {
                if location.is_empty() {
                    warn!("Member status for queue {} without a location, dropped", queue);
                    return;
                }
                let update = MemberUpdate {
                    penalty: *penalty,
                    calls_taken: *calls_taken,
                    last_call: *last_call,
                    status: *status,
                    paused: *paused,
                };
                match self.db.update_member_status(queue, location, &update).await {
                    Ok(0) => debug!("Status for unknown member {} in {}", location, queue),
                    Ok(_) => {}
                    Err(e) => warn!("Failed to update member {} in {}: {}", location, queue, e),
                }
            }

            ManagerEvent::QueueMemberPaused {
                queue,
                location,
                paused,
                ..
            } => {
                if location.is_empty() {
                    warn!("Member pause for queue {} without a location, dropped", queue);
                    return;
                }
                if let Err(e) = self.db.update_member_paused(queue, location, *paused).await {
                    warn!("Failed to pause member {} in {}: {}", location, queue, e);
                }
            }

            ManagerEvent::QueueMemberRemoved {
                queue, location, ..
            } => {
                if location.is_empty() {
                    warn!("Member removal for queue {} without a location, dropped", queue);
                    return;
                }
                if let Err(e) = self.db.remove_member(queue, location).await {
                    warn!("Failed to remove member {} from {}: {}", location, queue, e);
                }
            }

            // Accepted without a state change. Abandon/connect/dump/complete
            // transitions belong to the call-record side of the system; they
            // are matched here so a future handler has a place to go.
            ManagerEvent::QueueCallerAbandoned { .. }
            | ManagerEvent::AgentConnect { .. }
            | ManagerEvent::AgentDump { .. }
            | ManagerEvent::AgentComplete { .. } => {}
        }
    }

    /// Rebuild queue state from the manager's full queue-status dump.
    ///
    /// Called once per (re)connect: entries that never asked for a callback
    /// and all member rows are stale the moment the connection dropped, so
    /// both are cleared and the dump is replayed through the same per-type
    /// logic as live events. Flagged callback entries are preserved, they
    /// are owed a call regardless of the connection's history.
    pub async fn reconcile(&self, snapshot: &[QueueSnapshotRecord]) {
        info!("🔄 Reconciling queue state from manager dump ({} records)", snapshot.len());

        if let Err(e) = self.db.clear_non_callback_entries().await {
            warn!("Failed to clear stale queue entries: {}", e);
        }
        if let Err(e) = self.db.clear_all_members().await {
            warn!("Failed to clear stale member rows: {}", e);
        }

        for record in snapshot {
            if !self.filter.is_monitored(record.queue()) {
                continue;
            }

            match record {
                QueueSnapshotRecord::Entry {
                    queue,
                    unique_id,
                    caller_id_num,
                } => {
                    if unique_id.is_empty() {
                        warn!("Snapshot entry for queue {} without a unique id, dropped", queue);
                        continue;
                    }
                    if let Err(e) = self.db.insert_caller(unique_id, caller_id_num, queue).await {
                        warn!("Failed to restore caller {}: {}", unique_id, e);
                    }
                }
                QueueSnapshotRecord::Member {
                    queue,
                    location,
                    member_name,
                    penalty,
                    calls_taken,
                    last_call,
                    status,
                    paused,
                } => {
                    let parsed = match Location::parse(location) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            warn!("Snapshot member for queue {} dropped: {}", queue, e);
                            continue;
                        }
                    };
                    let member = UpsertMember {
                        agent: parsed.agent,
                        queue: queue.clone(),
                        display_name: Some(member_name.clone()),
                        location: location.clone(),
                        penalty: *penalty,
                        calls_taken: *calls_taken,
                        last_call: *last_call,
                        status: *status,
                        paused: *paused,
                    };
                    if let Err(e) = self.db.upsert_member(&member).await {
                        warn!("Failed to restore member {} in {}: {}", location, queue, e);
                    }
                }
            }
        }
    }
}
