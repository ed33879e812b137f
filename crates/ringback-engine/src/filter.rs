use std::collections::HashSet;

use crate::config::QueuesConfig;

/// Decides whether an inbound manager event pertains to a monitored queue.
///
/// Applied before any event-driven state mutation. Call-script commands are
/// never filtered: the script only runs inside monitored queues.
#[derive(Debug, Clone)]
pub struct EventFilter {
    monitored: HashSet<String>,
}

impl EventFilter {
    pub fn new(config: &QueuesConfig) -> Self {
        Self {
            monitored: config.monitored.iter().cloned().collect(),
        }
    }

    pub fn is_monitored(&self, queue: &str) -> bool {
        self.monitored.contains(queue)
    }
}
