use ringback_ami::CallSession;
use tracing::{debug, info, warn};

use crate::database::QueueDatabase;
use crate::error::{CallbackError, Result};

/// Announcement played when a callback number is refused.
const INVALID_NUMBER_PROMPT: &str = "privacy-incorrect";

/// Handles the two commands call-flow scripts invoke against the callback
/// queue.
///
/// Each command validates first, mutates second, and responds to the session
/// exactly once, on every path. Commands are never filtered by queue: the
/// script only runs inside monitored queues.
pub struct CallbackCommands {
    db: QueueDatabase,
}

impl CallbackCommands {
    pub fn new(db: QueueDatabase) -> Self {
        Self { db }
    }

    /// Toggle the callback flag for the session's caller.
    ///
    /// The callback number is the explicit `number` argument, falling back to
    /// the session's caller id. A blacklisted number signals the rejection
    /// announcement and changes nothing; toggling off clears scheduler
    /// eligibility but keeps the entry.
    pub async fn toggle_callback(
        &self,
        session: &mut dyn CallSession,
        number: Option<String>,
        room: Option<String>,
    ) -> Result<()> {
        let uid = session.unique_id().to_string();
        if uid.is_empty() {
            self.fail_session(session).await;
            return Err(CallbackError::invalid_argument("no unique id on session"));
        }

        let number = number.unwrap_or_else(|| session.caller_id().to_string());
        if number.is_empty() {
            self.fail_session(session).await;
            return Err(CallbackError::invalid_argument("no callback number set"));
        }

        let blacklisted = match self.db.is_blacklisted(&number).await {
            Ok(blacklisted) => blacklisted,
            Err(e) => {
                warn!("Blacklist check for {} failed: {}", uid, e);
                self.fail_session(session).await;
                return Ok(());
            }
        };

        if blacklisted {
            info!("🚫 Callback number for {} refused by blacklist", uid);
            self.reject_session(session).await;
            return Ok(());
        }

        match self.db.toggle_callback(&uid, Some(&number), room.as_deref()).await {
            Ok(0) => {
                // The script handed us a uid the store never saw; nothing is
                // created on its behalf.
                self.fail_session(session).await;
                Err(CallbackError::not_found(format!("no queue entry for uid {}", uid)))
            }
            Ok(_) => {
                info!("🔁 Callback toggled for {} (number {})", uid, number);
                self.finish_session(session).await;
                Ok(())
            }
            Err(e) => {
                warn!("Callback toggle for {} failed: {}", uid, e);
                self.fail_session(session).await;
                Ok(())
            }
        }
    }

    /// Force-remove the entry for `unique_id`, whatever its callback flag.
    ///
    /// Used once a scheduled callback has been answered and the caller is
    /// back in the live queue, so the scheduler cannot dial them twice.
    /// Idempotent: an absent uid is not an error.
    pub async fn remove_callback(
        &self,
        session: &mut dyn CallSession,
        unique_id: Option<String>,
    ) -> Result<()> {
        let Some(uid) = unique_id else {
            self.finish_session(session).await;
            return Err(CallbackError::invalid_argument("no unique id given"));
        };

        match self.db.remove_caller(&uid, true).await {
            Ok(0) => debug!("Remove callback for {}: nothing to remove", uid),
            Ok(_) => info!("🗑️ Callback entry {} removed", uid),
            Err(e) => warn!("Callback removal for {} failed: {}", uid, e),
        }

        self.finish_session(session).await;
        Ok(())
    }

    /// Complete the session normally.
    async fn finish_session(&self, session: &mut dyn CallSession) {
        if let Err(e) = session.finish().await {
            warn!("Session finish failed: {}", e);
        }
    }

    /// Complete the session after an internal failure: give the caller a
    /// beat, restart the script at priority 1.
    async fn fail_session(&self, session: &mut dyn CallSession) {
        if let Err(e) = session.wait(1).await {
            warn!("Session wait failed: {}", e);
        }
        if let Err(e) = session.set_priority(1).await {
            warn!("Session priority reset failed: {}", e);
        }
        self.finish_session(session).await;
    }

    /// Tell the caller their number was refused, then complete the session.
    async fn reject_session(&self, session: &mut dyn CallSession) {
        if let Err(e) = session.set_variable("INVALID", "1").await {
            warn!("Session variable set failed: {}", e);
        }
        if let Err(e) = session.stream_file(INVALID_NUMBER_PROMPT).await {
            warn!("Session announcement failed: {}", e);
        }
        self.fail_session(session).await;
    }
}
