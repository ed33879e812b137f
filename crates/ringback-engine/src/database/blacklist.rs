//! Callback-number blacklist probe.
//!
//! The blacklist itself is managed outside the engine; the command handler
//! only ever asks whether a number is on it.

use anyhow::Result;

use super::QueueDatabase;

impl QueueDatabase {
    /// Whether `number` must never be dialed back.
    pub async fn is_blacklisted(&self, number: &str) -> Result<bool> {
        let listed: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM callback_blacklist WHERE number = ?1)",
        )
        .bind(number)
        .fetch_one(&self.pool)
        .await?;

        Ok(listed != 0)
    }
}
