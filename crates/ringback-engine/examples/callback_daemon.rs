//! Callback Daemon Example
//!
//! A minimal embedding of the callback engine:
//! 1. Loads configuration (JSON file or defaults)
//! 2. Opens the queue store and marks the manager link up
//! 3. Runs the callback scheduler against a logging originator
//!
//! A real deployment replaces the logging originator with the telephony
//! manager transport, feeds live events to `engine.handle_event`, and
//! reconciles on every reconnect.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use tokio::time::sleep;
use tracing::info;

use ringback_engine::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "callback_daemon", about = "Run the callback queue engine")]
struct Args {
    /// Path to a JSON configuration file; defaults apply if omitted
    #[arg(long)]
    config: Option<String>,

    /// Queue names to monitor (overrides the config file)
    #[arg(long = "queue")]
    queues: Vec<String>,

    /// Database path ("`:memory:`" for an ephemeral store)
    #[arg(long, default_value = ":memory:")]
    database: String,
}

/// Logs each origination instead of dialing through a manager connection.
struct LoggingOriginator;

#[async_trait]
impl Originator for LoggingOriginator {
    async fn originate(&self, request: OriginateRequest) -> Result<()> {
        info!(
            "📲 Would originate {} into {}@{} (variables: {:?})",
            request.channel, request.exten, request.context, request.variables
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config: CallbackConfig = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => CallbackConfig::default(),
    };
    if !args.queues.is_empty() {
        config.queues.monitored = args.queues.clone();
    }
    if config.queues.monitored.is_empty() {
        config.queues.monitored = vec!["Support".to_string()];
    }

    info!(
        "🚀 Starting callback daemon over queues {:?}",
        config.queues.monitored
    );

    let monitored = config.queues.monitored.clone();
    let engine = CallbackEngine::new(config, Some(args.database)).await?;

    // No transport in this example, so the link is simply declared up.
    engine.link().set_up();
    let _scheduler = engine.spawn_scheduler(Arc::new(LoggingOriginator));

    loop {
        sleep(Duration::from_secs(60)).await;
        for queue in &monitored {
            let pending = engine.database().pending_callbacks(queue).await?;
            info!("📊 Queue {}: {} pending callback(s)", queue, pending);
        }
    }
}
