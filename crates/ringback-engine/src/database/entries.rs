//! Queue entry operations: one row per tracked caller.

use anyhow::Result;
use sqlx::FromRow;
use tracing::debug;

use super::QueueDatabase;

/// A caller tracked for a monitored queue.
#[derive(FromRow, Debug, Clone)]
pub struct QueueEntryRow {
    pub id: i64,
    pub uid: String,
    pub callback: bool,
    pub callerid: Option<String>,
    pub number: Option<String>,
    pub room: Option<String>,
    pub queue_name: String,
    pub count: i64,
}

/// The oldest pending callback of one queue, joined with any call record
/// for ticket/DNID correlation. Derived, never persisted.
#[derive(FromRow, Debug, Clone)]
pub struct CallbackCandidate {
    pub uid: String,
    pub callerid: Option<String>,
    pub number: Option<String>,
    pub room: Option<String>,
    pub queue_name: String,
    pub count: i64,
    pub ticket: Option<String>,
    pub caller_dnid: Option<String>,
}

impl QueueDatabase {
    /// Track a caller that joined a monitored queue. Callback is off and the
    /// attempt counter zero until the caller asks otherwise.
    pub async fn insert_caller(&self, uid: &str, caller_id: &str, queue: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO queue (uid, callback, callerid, queue_name, count)
             VALUES (?1, 0, ?2, ?3, 0)",
        )
        .bind(uid)
        .bind(caller_id)
        .bind(queue)
        .execute(&self.pool)
        .await?;

        debug!("📞 Tracking caller {} in queue {}", uid, queue);
        Ok(())
    }

    /// Remove a caller. Without `force` the row survives while its callback
    /// flag is set, so a flagged caller outlives leaving the live queue.
    /// Returns the number of rows removed.
    pub async fn remove_caller(&self, uid: &str, force: bool) -> Result<u64> {
        let sql = if force {
            "DELETE FROM queue WHERE uid = ?1"
        } else {
            "DELETE FROM queue WHERE uid = ?1 AND callback = 0"
        };

        let result = sqlx::query(sql).bind(uid).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Flip the callback flag for a caller and record the number/room to call
    /// back on. A single statement, so the flip is atomic. Returns the number
    /// of rows touched; 0 means the uid is unknown.
    pub async fn toggle_callback(
        &self,
        uid: &str,
        number: Option<&str>,
        room: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE queue SET
                 callback = CASE WHEN callback = 0 THEN 1 ELSE 0 END,
                 number = ?1,
                 room = ?2
             WHERE uid = ?3",
        )
        .bind(number)
        .bind(room)
        .bind(uid)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Bump the attempt counter after an origination attempt, successful or
    /// not. The counter never moves any other way.
    pub async fn increment_attempts(&self, uid: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE queue SET count = count + 1 WHERE uid = ?1")
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// The oldest caller of `queue` still waiting for a callback, FIFO by
    /// insertion order, joined with any call record for the ticket and DNID.
    pub async fn oldest_callback_candidate(&self, queue: &str) -> Result<Option<CallbackCandidate>> {
        let candidate = sqlx::query_as::<_, CallbackCandidate>(
            "SELECT q.uid, q.callerid, q.number, q.room, q.queue_name, q.count,
                    r.ticket, r.caller_dnid
             FROM queue AS q
             LEFT JOIN records AS r ON r.uid = q.uid
             WHERE q.queue_name = ?1 AND q.callback = 1
             ORDER BY q.id ASC
             LIMIT 1",
        )
        .bind(queue)
        .fetch_optional(&self.pool)
        .await?;

        Ok(candidate)
    }

    /// Point read of one entry.
    pub async fn entry(&self, uid: &str) -> Result<Option<QueueEntryRow>> {
        let row = sqlx::query_as::<_, QueueEntryRow>(
            "SELECT id, uid, callback, callerid, number, room, queue_name, count
             FROM queue
             WHERE uid = ?1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// How many callers of `queue` are waiting for a callback.
    pub async fn pending_callbacks(&self, queue: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM queue WHERE queue_name = ?1 AND callback = 1",
        )
        .bind(queue)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Drop every entry that is not flagged for callback. Idempotent; used
    /// only while reinitializing from a full queue-status dump.
    pub async fn clear_non_callback_entries(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM queue WHERE callback = 0")
            .execute(&self.pool)
            .await?;

        debug!("📋 Cleared {} non-callback entries", result.rows_affected());
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_point_read() {
        let db = QueueDatabase::new_in_memory().await.unwrap();

        db.insert_caller("100", "5550001", "Dev").await.unwrap();
        let entry = db.entry("100").await.unwrap().expect("entry exists");

        assert_eq!(entry.uid, "100");
        assert_eq!(entry.queue_name, "Dev");
        assert_eq!(entry.callerid.as_deref(), Some("5550001"));
        assert!(!entry.callback);
        assert_eq!(entry.count, 0);
    }

    #[tokio::test]
    async fn duplicate_uid_rejected() {
        let db = QueueDatabase::new_in_memory().await.unwrap();

        db.insert_caller("100", "5550001", "Dev").await.unwrap();
        assert!(db.insert_caller("100", "5550001", "Dev").await.is_err());
    }

    #[tokio::test]
    async fn plain_remove_spares_flagged_entries() {
        let db = QueueDatabase::new_in_memory().await.unwrap();

        db.insert_caller("100", "5550001", "Dev").await.unwrap();
        db.toggle_callback("100", Some("5551234"), None).await.unwrap();

        assert_eq!(db.remove_caller("100", false).await.unwrap(), 0);
        assert!(db.entry("100").await.unwrap().is_some());

        assert_eq!(db.remove_caller("100", true).await.unwrap(), 1);
        assert!(db.entry("100").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn toggle_flips_both_ways() {
        let db = QueueDatabase::new_in_memory().await.unwrap();
        db.insert_caller("100", "5550001", "Dev").await.unwrap();

        assert_eq!(
            db.toggle_callback("100", Some("5551234"), Some("A1")).await.unwrap(),
            1
        );
        let entry = db.entry("100").await.unwrap().unwrap();
        assert!(entry.callback);
        assert_eq!(entry.number.as_deref(), Some("5551234"));
        assert_eq!(entry.room.as_deref(), Some("A1"));

        assert_eq!(db.toggle_callback("100", None, None).await.unwrap(), 1);
        let entry = db.entry("100").await.unwrap().unwrap();
        assert!(!entry.callback);

        // Unknown uid touches nothing
        assert_eq!(db.toggle_callback("999", None, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn oldest_candidate_is_fifo_and_joined() {
        let db = QueueDatabase::new_in_memory().await.unwrap();

        db.insert_caller("100", "5550001", "Dev").await.unwrap();
        db.insert_caller("101", "5550002", "Dev").await.unwrap();
        db.insert_caller("102", "5550003", "Support").await.unwrap();
        db.toggle_callback("100", Some("5551111"), None).await.unwrap();
        db.toggle_callback("101", Some("5552222"), None).await.unwrap();
        db.toggle_callback("102", Some("5553333"), None).await.unwrap();

        sqlx::query("INSERT INTO records (uid, ticket, caller_dnid) VALUES ('100', 'T-77', '8005550100')")
            .execute(db.pool())
            .await
            .unwrap();

        let candidate = db
            .oldest_callback_candidate("Dev")
            .await
            .unwrap()
            .expect("candidate exists");
        assert_eq!(candidate.uid, "100");
        assert_eq!(candidate.ticket.as_deref(), Some("T-77"));
        assert_eq!(candidate.caller_dnid.as_deref(), Some("8005550100"));

        // Other queues are independent
        let other = db
            .oldest_callback_candidate("Support")
            .await
            .unwrap()
            .expect("candidate exists");
        assert_eq!(other.uid, "102");
        assert_eq!(other.ticket, None);
    }

    #[tokio::test]
    async fn unflagged_entries_are_never_candidates() {
        let db = QueueDatabase::new_in_memory().await.unwrap();
        db.insert_caller("100", "5550001", "Dev").await.unwrap();

        assert!(db.oldest_callback_candidate("Dev").await.unwrap().is_none());
        assert_eq!(db.pending_callbacks("Dev").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn attempt_counter_only_increases() {
        let db = QueueDatabase::new_in_memory().await.unwrap();
        db.insert_caller("100", "5550001", "Dev").await.unwrap();

        db.increment_attempts("100").await.unwrap();
        db.increment_attempts("100").await.unwrap();

        let entry = db.entry("100").await.unwrap().unwrap();
        assert_eq!(entry.count, 2);
    }

    #[tokio::test]
    async fn reset_keeps_callback_rows() {
        let db = QueueDatabase::new_in_memory().await.unwrap();

        db.insert_caller("100", "5550001", "Dev").await.unwrap();
        db.insert_caller("101", "5550002", "Dev").await.unwrap();
        db.toggle_callback("101", Some("5551234"), None).await.unwrap();

        assert_eq!(db.clear_non_callback_entries().await.unwrap(), 1);
        assert!(db.entry("100").await.unwrap().is_none());
        assert!(db.entry("101").await.unwrap().is_some());
    }
}
