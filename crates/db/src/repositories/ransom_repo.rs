//! Repository for the `ransoms` table.
//!
//! Progress and unlock mutations are keyed by subject and guarded by
//! `state = 'active'`, so they are no-ops once a ransom has unlocked.

use sqlx::PgPool;
use watchgate_core::ransom::RansomState;
use watchgate_core::types::DbId;

use crate::models::ransom::{CreateRansom, PrerequisiteUsage, Ransom};

/// Column list for `ransoms` queries.
const COLUMNS: &str = "\
    id, subject, prerequisite, locked_collection, progress, threshold, state, \
    issued_by, lock_message, unlock_message, created_at, unlocked_at";

/// Provides data access for ransoms.
pub struct RansomRepo;

impl RansomRepo {
    /// Insert a new active ransom with zero progress.
    ///
    /// Fails with a unique violation on `uq_ransoms_active_subject` if the
    /// subject already has an active ransom.
    pub async fn create(pool: &PgPool, dto: &CreateRansom) -> Result<Ransom, sqlx::Error> {
        let query = format!(
            "INSERT INTO ransoms \
                 (subject, prerequisite, locked_collection, threshold, state, \
                  issued_by, lock_message, unlock_message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ransom>(&query)
            .bind(&dto.subject)
            .bind(&dto.prerequisite)
            .bind(&dto.locked_collection)
            .bind(dto.effective_threshold())
            .bind(RansomState::Active.as_str())
            .bind(&dto.issued_by)
            .bind(&dto.lock_message)
            .bind(&dto.unlock_message)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ransom>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ransoms WHERE id = $1");
        sqlx::query_as::<_, Ransom>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All active ransoms, oldest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Ransom>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ransoms WHERE state = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Ransom>(&query)
            .bind(RansomState::Active.as_str())
            .fetch_all(pool)
            .await
    }

    /// All unlocked ransoms, most recently unlocked first.
    pub async fn list_unlocked(pool: &PgPool) -> Result<Vec<Ransom>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ransoms WHERE state = $1 ORDER BY unlocked_at DESC, id DESC"
        );
        sqlx::query_as::<_, Ransom>(&query)
            .bind(RansomState::Unlocked.as_str())
            .fetch_all(pool)
            .await
    }

    /// Set progress on the subject's active ransom.
    ///
    /// Returns the number of rows updated (0 when the subject has none).
    pub async fn set_progress(
        pool: &PgPool,
        subject: &str,
        progress: f64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ransoms SET progress = $2 WHERE subject = $1 AND state = $3",
        )
        .bind(subject)
        .bind(progress)
        .bind(RansomState::Active.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Transition the subject's active ransom to unlocked.
    ///
    /// Returns the updated row, or `None` when there was nothing to unlock
    /// (no ransom, or already unlocked).
    pub async fn mark_unlocked(pool: &PgPool, subject: &str) -> Result<Option<Ransom>, sqlx::Error> {
        let query = format!(
            "UPDATE ransoms SET state = $2, unlocked_at = NOW() \
             WHERE subject = $1 AND state = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ransom>(&query)
            .bind(subject)
            .bind(RansomState::Unlocked.as_str())
            .bind(RansomState::Active.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a ransom in any state. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ransoms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Prerequisites ranked by how many ransoms used them.
    pub async fn most_used_prerequisites(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<PrerequisiteUsage>, sqlx::Error> {
        sqlx::query_as::<_, PrerequisiteUsage>(
            "SELECT prerequisite, COUNT(*) AS times_used \
             FROM ransoms \
             GROUP BY prerequisite \
             ORDER BY times_used DESC, prerequisite \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
