//! Queue member operations: one row per (queue, location) pair.

use anyhow::Result;
use chrono::Utc;
use ringback_ami::DeviceState;
use sqlx::FromRow;
use tracing::debug;

use super::QueueDatabase;

/// A staffed position attached to a queue.
#[derive(FromRow, Debug, Clone)]
pub struct QueueMemberRow {
    pub agent: String,
    pub queue_name: String,
    pub name: Option<String>,
    pub location: String,
    pub penalty: i64,
    pub calls_taken: i64,
    pub last_call: i64,
    pub status: i64,
    pub paused: bool,
}

/// Full member state written on an add event or a snapshot record.
#[derive(Debug, Clone)]
pub struct UpsertMember {
    pub agent: String,
    pub queue: String,
    pub display_name: Option<String>,
    pub location: String,
    pub penalty: i64,
    pub calls_taken: i64,
    pub last_call: i64,
    pub status: DeviceState,
    pub paused: bool,
}

/// The fields a status event refreshes.
#[derive(Debug, Clone)]
pub struct MemberUpdate {
    pub penalty: i64,
    pub calls_taken: i64,
    pub last_call: i64,
    pub status: DeviceState,
    pub paused: bool,
}

impl QueueDatabase {
    /// Insert a member, replacing any previous state for the same
    /// (queue, location) key.
    pub async fn upsert_member(&self, member: &UpsertMember) -> Result<()> {
        sqlx::query(
            "INSERT INTO queue_members
                 (agent, queue_name, name, location, penalty, calls_taken,
                  last_call, status, paused, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT (queue_name, location) DO UPDATE SET
                 agent = excluded.agent,
                 name = excluded.name,
                 penalty = excluded.penalty,
                 calls_taken = excluded.calls_taken,
                 last_call = excluded.last_call,
                 status = excluded.status,
                 paused = excluded.paused,
                 timestamp = excluded.timestamp",
        )
        .bind(&member.agent)
        .bind(&member.queue)
        .bind(&member.display_name)
        .bind(&member.location)
        .bind(member.penalty)
        .bind(member.calls_taken)
        .bind(member.last_call)
        .bind(member.status.code())
        .bind(member.paused)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!("👤 Member {} upserted for queue {}", member.location, member.queue);
        Ok(())
    }

    /// Field-by-field refresh on a status event. Returns the number of rows
    /// touched; 0 means the member is unknown.
    pub async fn update_member_status(
        &self,
        queue: &str,
        location: &str,
        update: &MemberUpdate,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE queue_members SET
                 penalty = ?1,
                 calls_taken = ?2,
                 last_call = ?3,
                 status = ?4,
                 paused = ?5,
                 timestamp = ?6
             WHERE queue_name = ?7 AND location = ?8",
        )
        .bind(update.penalty)
        .bind(update.calls_taken)
        .bind(update.last_call)
        .bind(update.status.code())
        .bind(update.paused)
        .bind(Utc::now())
        .bind(queue)
        .bind(location)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Flip only the paused flag.
    pub async fn update_member_paused(
        &self,
        queue: &str,
        location: &str,
        paused: bool,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE queue_members SET
                 paused = ?1,
                 timestamp = ?2
             WHERE queue_name = ?3 AND location = ?4",
        )
        .bind(paused)
        .bind(Utc::now())
        .bind(queue)
        .bind(location)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Remove a member by its (queue, location) key.
    pub async fn remove_member(&self, queue: &str, location: &str) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM queue_members WHERE queue_name = ?1 AND location = ?2")
                .bind(queue)
                .bind(location)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Drop every member row. Idempotent; used only while reinitializing
    /// from a full queue-status dump.
    pub async fn clear_all_members(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM queue_members")
            .execute(&self.pool)
            .await?;

        debug!("📋 Cleared {} member rows", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Members of one queue, for diagnostics and tests.
    pub async fn members(&self, queue: &str) -> Result<Vec<QueueMemberRow>> {
        let rows = sqlx::query_as::<_, QueueMemberRow>(
            "SELECT agent, queue_name, name, location, penalty, calls_taken,
                    last_call, status, paused
             FROM queue_members
             WHERE queue_name = ?1
             ORDER BY location ASC",
        )
        .bind(queue)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
