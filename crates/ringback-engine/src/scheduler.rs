use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ringback_ami::{ManagerLink, OriginateRequest, Originator};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::{CallbackConfig, OriginateConfig};
use crate::database::{CallbackCandidate, QueueDatabase};

/// Timer-driven loop that dials pending callbacks back out.
///
/// One sweep per interval; per monitored queue, at most one candidate per
/// sweep. Origination is fire-and-forget: the answered/unanswered outcome is
/// established later by an in-call verification step, so the attempt counter
/// moves on every origination and a hard limit bounds redials against
/// unreachable numbers.
pub struct CallbackScheduler {
    db: QueueDatabase,
    queues: Vec<String>,
    interval: u64,
    attempt_limit: u32,
    originate: OriginateConfig,
    originator: Arc<dyn Originator>,
    link: ManagerLink,
}

impl CallbackScheduler {
    pub fn new(
        db: QueueDatabase,
        config: &CallbackConfig,
        originator: Arc<dyn Originator>,
        link: ManagerLink,
    ) -> Self {
        Self {
            db,
            queues: config.queues.monitored.clone(),
            interval: config.scheduler.interval,
            attempt_limit: config.scheduler.attempt_limit,
            originate: config.originate.clone(),
            originator,
            link,
        }
    }

    /// Run the sweep loop until the owning task is dropped.
    pub async fn run(self) {
        info!(
            "⏰ Callback scheduler running every {}s over {} queue(s)",
            self.interval,
            self.queues.len()
        );

        let mut ticker = tokio::time::interval(Duration::from_secs(self.interval));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }

    /// One pass over every monitored queue. Skipped entirely while the
    /// manager link is down; a sweep already in flight when the link drops
    /// finishes its datastore writes normally.
    pub async fn sweep(&self) {
        if !self.link.is_up() {
            debug!("Manager link down, skipping callback sweep");
            return;
        }

        for queue in &self.queues {
            self.tick_queue(queue).await;
        }
    }

    /// Handle the single oldest pending callback of one queue.
    pub async fn tick_queue(&self, queue: &str) {
        let candidate = match self.db.oldest_callback_candidate(queue).await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return,
            Err(e) => {
                warn!("Candidate lookup for queue {} failed: {}", queue, e);
                return;
            }
        };

        if candidate.count >= i64::from(self.attempt_limit) {
            info!(
                "🛑 Caller {} exceeded the callback attempt limit ({}), giving up",
                candidate.uid, self.attempt_limit
            );
            if let Err(e) = self.db.remove_caller(&candidate.uid, true).await {
                warn!("Failed to drop exhausted entry {}: {}", candidate.uid, e);
            }
            return;
        }

        // A flagged entry always carries the number the toggle recorded; a
        // row without one can never be dialed, so it is dropped rather than
        // swept forever.
        let Some(number) = candidate.number.clone().or_else(|| candidate.callerid.clone()) else {
            warn!("Candidate {} has no callback number, dropping it", candidate.uid);
            if let Err(e) = self.db.remove_caller(&candidate.uid, true).await {
                warn!("Failed to drop undialable entry {}: {}", candidate.uid, e);
            }
            return;
        };

        info!(
            "📲 Originating callback for {} in queue {} (attempt {} of {})",
            candidate.uid,
            queue,
            candidate.count + 1,
            self.attempt_limit
        );

        let request = self.build_request(&candidate, &number);
        if let Err(e) = self.originator.originate(request).await {
            // Not retried here; the attempt counter and the next sweep decide.
            warn!("Origination for {} failed: {}", candidate.uid, e);
        }

        if let Err(e) = self.db.increment_attempts(&candidate.uid).await {
            warn!("Failed to count attempt for {}: {}", candidate.uid, e);
        }
    }

    fn build_request(&self, candidate: &CallbackCandidate, number: &str) -> OriginateRequest {
        let mut variables = HashMap::new();
        variables.insert("CALLBACK_UID".to_string(), candidate.uid.clone());
        variables.insert("CALLBACK_QUEUE".to_string(), candidate.queue_name.clone());
        if let Some(ticket) = &candidate.ticket {
            variables.insert("CALLBACK_TICKET".to_string(), ticket.clone());
        }
        if let Some(room) = &candidate.room {
            variables.insert("CALLBACK_ROOM".to_string(), room.clone());
        }
        if let Some(dnid) = &candidate.caller_dnid {
            variables.insert("CALLBACK_DNID".to_string(), dnid.clone());
        }

        OriginateRequest {
            channel: self.originate.channel(number),
            context: self.originate.context.clone(),
            exten: self.originate.exten.clone(),
            priority: self.originate.priority,
            caller_id: self.originate.caller_id.clone(),
            timeout_ms: self.originate.timeout_ms,
            variables,
        }
    }
}
