//! # Callback Queue Engine for RINGBACK
//!
//! This crate manages the callback queue of a call-center telephone system:
//! callers waiting in a monitored support queue may opt to be called back
//! instead of holding, and the engine tracks queue membership, agent
//! availability, and pending callbacks, then periodically dials flagged
//! callers back out with a bounded number of attempts.
//!
//! ## Features
//!
//! - **Queue Store**: persistent entry/member/blacklist state over SQLite
//! - **Event Filtering**: only configured queues are ever tracked
//! - **State Mutation**: typed manager events applied best-effort, at-most-once
//! - **Script Commands**: toggle/remove callback with blacklist enforcement
//! - **Callback Scheduling**: FIFO per-queue origination with an attempt cap
//!
//! ## Architecture
//!
//! - [`database`]: the queue store, the only shared mutable resource
//! - [`filter`]: monitored-queue membership checks
//! - [`mutator`]: manager events → store writes
//! - [`commands`]: call-script command surface
//! - [`scheduler`]: the periodic callback sweep
//! - [`engine`]: the facade the embedding application drives
//!
//! The telephony transports themselves live outside this crate; their typed
//! boundary is the `ringback-ami` crate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ringback_engine::prelude::*;
//!
//! # #[derive(Debug)] struct MyOriginator;
//! # #[async_trait::async_trait]
//! # impl Originator for MyOriginator {
//! #     async fn originate(&self, _request: OriginateRequest) -> anyhow::Result<()> { Ok(()) }
//! # }
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut config = CallbackConfig::default();
//!     config.queues.monitored = vec!["Support".to_string()];
//!
//!     let engine = CallbackEngine::new(config, Some(":memory:".to_string())).await?;
//!
//!     // The embedding transport marks the link up once the manager
//!     // connection is established, then feeds events and the status dump.
//!     engine.link().set_up();
//!     let scheduler = engine.spawn_scheduler(Arc::new(MyOriginator));
//!
//!     scheduler.await.ok();
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod error;

// Callback queue functionality
pub mod commands;
pub mod database;
pub mod engine;
pub mod filter;
pub mod mutator;
pub mod scheduler;

// Re-exports for convenience
pub use config::CallbackConfig;
pub use engine::CallbackEngine;
pub use error::{CallbackError, Result};

/// Common imports for embedding applications
pub mod prelude {
    pub use crate::commands::CallbackCommands;
    pub use crate::config::{
        CallbackConfig, DatabaseConfig, OriginateConfig, QueuesConfig, SchedulerConfig,
    };
    pub use crate::database::{CallbackCandidate, QueueDatabase, QueueEntryRow, QueueMemberRow};
    pub use crate::engine::CallbackEngine;
    pub use crate::error::{CallbackError, Result};
    pub use crate::filter::EventFilter;
    pub use crate::mutator::QueueStateMutator;
    pub use crate::scheduler::CallbackScheduler;
    pub use ringback_ami::{
        CallSession, DeviceState, Location, ManagerEvent, ManagerLink, OriginateRequest,
        Originator, QueueSnapshotRecord,
    };
}
