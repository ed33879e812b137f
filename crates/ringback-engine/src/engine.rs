use std::sync::Arc;

use ringback_ami::{ManagerEvent, ManagerLink, Originator, QueueSnapshotRecord};
use tokio::task::JoinHandle;
use tracing::info;

use crate::commands::CallbackCommands;
use crate::config::CallbackConfig;
use crate::database::QueueDatabase;
use crate::error::{CallbackError, Result};
use crate::filter::EventFilter;
use crate::mutator::QueueStateMutator;
use crate::scheduler::CallbackScheduler;

/// The callback engine: store, mutator, command handler, and scheduler under
/// one roof.
///
/// The embedding application owns the transports. It feeds manager events to
/// [`handle_event`](CallbackEngine::handle_event), replays the full
/// queue-status dump through [`reconcile`](CallbackEngine::reconcile) after
/// each (re)connect, dispatches script commands to
/// [`commands`](CallbackEngine::commands), and flips the
/// [`link`](CallbackEngine::link) as the manager connection comes and goes.
pub struct CallbackEngine {
    config: CallbackConfig,
    db: QueueDatabase,
    mutator: QueueStateMutator,
    commands: CallbackCommands,
    link: ManagerLink,
}

impl CallbackEngine {
    /// Build an engine from validated configuration.
    ///
    /// `db_path` overrides the configured database path; pass
    /// `Some(":memory:")` for an ephemeral store.
    pub async fn new(config: CallbackConfig, db_path: Option<String>) -> Result<Self> {
        config.validate().map_err(CallbackError::config)?;

        let path = db_path.unwrap_or_else(|| config.database.database_path.clone());
        let db = if path == ":memory:" {
            QueueDatabase::new_in_memory().await?
        } else {
            QueueDatabase::new(&path, config.database.max_connections).await?
        };

        let filter = EventFilter::new(&config.queues);
        let mutator = QueueStateMutator::new(db.clone(), filter);
        let commands = CallbackCommands::new(db.clone());

        info!(
            "✅ Callback engine ready ({} monitored queue(s))",
            config.queues.monitored.len()
        );

        Ok(Self {
            config,
            db,
            mutator,
            commands,
            link: ManagerLink::new(),
        })
    }

    pub fn config(&self) -> &CallbackConfig {
        &self.config
    }

    /// The queue store, shared with every component.
    pub fn database(&self) -> &QueueDatabase {
        &self.db
    }

    /// The call-script command surface.
    pub fn commands(&self) -> &CallbackCommands {
        &self.commands
    }

    /// A handle to the manager-connection liveness flag.
    pub fn link(&self) -> ManagerLink {
        self.link.clone()
    }

    /// Apply one manager event (best-effort, see the mutator's contract).
    pub async fn handle_event(&self, event: &ManagerEvent) {
        self.mutator.apply(event).await;
    }

    /// Rebuild queue state from a full queue-status dump.
    pub async fn reconcile(&self, snapshot: &[QueueSnapshotRecord]) {
        self.mutator.reconcile(snapshot).await;
    }

    /// Spawn the callback scheduler onto the runtime. Dropping or aborting
    /// the returned handle stops future sweeps; in-flight store writes
    /// complete normally.
    pub fn spawn_scheduler(&self, originator: Arc<dyn Originator>) -> JoinHandle<()> {
        let scheduler =
            CallbackScheduler::new(self.db.clone(), &self.config, originator, self.link.clone());
        tokio::spawn(scheduler.run())
    }
}
