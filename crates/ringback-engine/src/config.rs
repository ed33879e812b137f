use serde::{Deserialize, Serialize};

/// Callback engine configuration
///
/// Every component receives the section it needs at construction; nothing
/// reads configuration from ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackConfig {
    /// Monitored queue settings
    pub queues: QueuesConfig,

    /// Callback scheduler settings
    pub scheduler: SchedulerConfig,

    /// Fixed routing parameters for originated callbacks
    pub originate: OriginateConfig,

    /// Database configuration
    pub database: DatabaseConfig,
}

/// Monitored queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuesConfig {
    /// Queue names the engine tracks; events for any other queue are ignored
    pub monitored: Vec<String>,
}

/// Callback scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Sweep interval (seconds)
    pub interval: u64,

    /// Maximum callback attempts before an entry is given up on
    pub attempt_limit: u32,
}

/// Fixed routing parameters for originated callback legs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginateConfig {
    /// Outbound trunk the callback number is dialed through
    pub trunk: String,

    /// Dialplan context the answered leg lands in
    pub context: String,

    /// Dialplan extension within the context
    pub exten: String,

    /// Dialplan priority to start at
    pub priority: u32,

    /// Caller id presented to the called party
    pub caller_id: String,

    /// Answer timeout (milliseconds)
    pub timeout_ms: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path (`:memory:` for an in-memory store)
    pub database_path: String,

    /// Maximum pooled connections
    pub max_connections: u32,
}

impl OriginateConfig {
    /// Dial string for a callback number through the configured trunk.
    pub fn channel(&self, number: &str) -> String {
        format!("SIP/{}@{}", number, self.trunk)
    }
}

impl CallbackConfig {
    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<(), String> {
        if self.scheduler.interval == 0 {
            return Err("scheduler interval must be greater than 0".to_string());
        }

        if self.scheduler.attempt_limit == 0 {
            return Err("attempt_limit must be greater than 0".to_string());
        }

        if self.queues.monitored.iter().any(|name| name.is_empty()) {
            return Err("monitored queue names cannot be empty".to_string());
        }

        if self.originate.trunk.is_empty() {
            return Err("originate trunk cannot be empty".to_string());
        }

        if self.originate.context.is_empty() {
            return Err("originate context cannot be empty".to_string());
        }

        if self.originate.exten.is_empty() {
            return Err("originate exten cannot be empty".to_string());
        }

        if self.originate.timeout_ms == 0 {
            return Err("originate timeout_ms must be greater than 0".to_string());
        }

        if self.database.max_connections == 0 {
            return Err("max_connections must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            queues: QueuesConfig::default(),
            scheduler: SchedulerConfig::default(),
            originate: OriginateConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for QueuesConfig {
    fn default() -> Self {
        Self {
            monitored: Vec::new(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: 90,    // a sweep every 90 seconds
            attempt_limit: 3,
        }
    }
}

impl Default for OriginateConfig {
    fn default() -> Self {
        Self {
            trunk: "trunk.call-center.local".to_string(),
            context: "queue-callback".to_string(),
            exten: "s".to_string(),
            priority: 1,
            caller_id: "8005550100".to_string(),
            timeout_ms: 30_000, // 30 seconds
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: "callback_queue.db".to_string(),
            max_connections: 5,
        }
    }
}
