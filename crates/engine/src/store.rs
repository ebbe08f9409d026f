//! Ransom persistence seam.
//!
//! The engine only talks to storage through [`RansomStore`]. The contract:
//!
//! - at most one `Active` ransom per subject (creation of a second one fails
//!   with [`StoreError::ActiveRansomExists`]);
//! - `set_progress` and `mark_unlocked` only touch the subject's `Active`
//!   ransom and are no-ops otherwise, which makes `mark_unlocked` safe to
//!   call twice.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use watchgate_core::ransom::RansomState;
use watchgate_core::types::DbId;
use watchgate_db::models::ransom::{CreateRansom, PrerequisiteUsage, Ransom};
use watchgate_db::repositories::RansomRepo;
use watchgate_db::DbPool;

use crate::error::StoreError;

/// Name of the partial unique index guarding one active ransom per subject.
pub const ACTIVE_SUBJECT_CONSTRAINT: &str = "uq_ransoms_active_subject";

#[async_trait]
pub trait RansomStore: Send + Sync {
    /// Insert a new `Active` ransom with zero progress.
    async fn create_ransom(&self, dto: &CreateRansom) -> Result<Ransom, StoreError>;

    async fn find_ransom(&self, id: DbId) -> Result<Option<Ransom>, StoreError>;

    async fn list_active(&self) -> Result<Vec<Ransom>, StoreError>;

    /// Unlocked ransoms, most recently unlocked first.
    async fn list_unlocked(&self) -> Result<Vec<Ransom>, StoreError>;

    /// Set progress on the subject's active ransom. Returns `false` if there is none.
    async fn set_progress(&self, subject: &str, progress: f64) -> Result<bool, StoreError>;

    /// Unlock the subject's active ransom, returning it, or `None` if there is none.
    async fn mark_unlocked(&self, subject: &str) -> Result<Option<Ransom>, StoreError>;

    /// Delete a ransom in any state. Returns `false` if it did not exist.
    async fn delete_ransom(&self, id: DbId) -> Result<bool, StoreError>;

    async fn most_used_prerequisites(&self, limit: i64) -> Result<Vec<PrerequisiteUsage>, StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// [`RansomStore`] backed by the `ransoms` table.
#[derive(Clone)]
pub struct PgRansomStore {
    pool: DbPool,
}

impl PgRansomStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RansomStore for PgRansomStore {
    async fn create_ransom(&self, dto: &CreateRansom) -> Result<Ransom, StoreError> {
        RansomRepo::create(&self.pool, dto).await.map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(ACTIVE_SUBJECT_CONSTRAINT) =>
            {
                StoreError::ActiveRansomExists {
                    subject: dto.subject.clone(),
                }
            }
            other => StoreError::Database(other),
        })
    }

    async fn find_ransom(&self, id: DbId) -> Result<Option<Ransom>, StoreError> {
        Ok(RansomRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_active(&self) -> Result<Vec<Ransom>, StoreError> {
        Ok(RansomRepo::list_active(&self.pool).await?)
    }

    async fn list_unlocked(&self) -> Result<Vec<Ransom>, StoreError> {
        Ok(RansomRepo::list_unlocked(&self.pool).await?)
    }

    async fn set_progress(&self, subject: &str, progress: f64) -> Result<bool, StoreError> {
        Ok(RansomRepo::set_progress(&self.pool, subject, progress).await? > 0)
    }

    async fn mark_unlocked(&self, subject: &str) -> Result<Option<Ransom>, StoreError> {
        Ok(RansomRepo::mark_unlocked(&self.pool, subject).await?)
    }

    async fn delete_ransom(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(RansomRepo::delete(&self.pool, id).await?)
    }

    async fn most_used_prerequisites(&self, limit: i64) -> Result<Vec<PrerequisiteUsage>, StoreError> {
        Ok(RansomRepo::most_used_prerequisites(&self.pool, limit).await?)
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// [`RansomStore`] held in process memory.
///
/// Honors the same contract as the Postgres store. Can be switched into an
/// unavailable mode to exercise storage failures.
#[derive(Default)]
pub struct MemoryRansomStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: DbId,
    rows: Vec<Ransom>,
    unavailable: bool,
}

impl MemoryRansomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Snapshot of every stored ransom, in insertion order.
    pub fn all(&self) -> Vec<Ransom> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn available(&self) -> Result<MutexGuard<'_, MemoryInner>, StoreError> {
        let inner = self.lock();
        if inner.unavailable {
            return Err(StoreError::Unavailable("in-memory store disabled".into()));
        }
        Ok(inner)
    }
}

impl MemoryInner {
    fn active_mut(&mut self, subject: &str) -> Option<&mut Ransom> {
        self.rows
            .iter_mut()
            .find(|r| r.subject == subject && r.state == RansomState::Active)
    }
}

#[async_trait]
impl RansomStore for MemoryRansomStore {
    async fn create_ransom(&self, dto: &CreateRansom) -> Result<Ransom, StoreError> {
        let mut inner = self.available()?;
        if inner.active_mut(&dto.subject).is_some() {
            return Err(StoreError::ActiveRansomExists {
                subject: dto.subject.clone(),
            });
        }

        inner.next_id += 1;
        let ransom = Ransom {
            id: inner.next_id,
            subject: dto.subject.clone(),
            prerequisite: dto.prerequisite.clone(),
            locked_collection: dto.locked_collection.clone(),
            progress: 0.0,
            threshold: dto.effective_threshold(),
            state: RansomState::Active,
            issued_by: dto.issued_by.clone(),
            lock_message: dto.lock_message.clone(),
            unlock_message: dto.unlock_message.clone(),
            created_at: chrono::Utc::now(),
            unlocked_at: None,
        };
        inner.rows.push(ransom.clone());
        Ok(ransom)
    }

    async fn find_ransom(&self, id: DbId) -> Result<Option<Ransom>, StoreError> {
        let inner = self.available()?;
        Ok(inner.rows.iter().find(|r| r.id == id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Ransom>, StoreError> {
        let inner = self.available()?;
        Ok(inner.rows.iter().filter(|r| r.is_active()).cloned().collect())
    }

    async fn list_unlocked(&self) -> Result<Vec<Ransom>, StoreError> {
        let inner = self.available()?;
        let mut unlocked: Vec<Ransom> = inner
            .rows
            .iter()
            .filter(|r| r.state == RansomState::Unlocked)
            .cloned()
            .collect();
        unlocked.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at).then(b.id.cmp(&a.id)));
        Ok(unlocked)
    }

    async fn set_progress(&self, subject: &str, progress: f64) -> Result<bool, StoreError> {
        let mut inner = self.available()?;
        Ok(match inner.active_mut(subject) {
            Some(ransom) => {
                ransom.progress = progress;
                true
            }
            None => false,
        })
    }

    async fn mark_unlocked(&self, subject: &str) -> Result<Option<Ransom>, StoreError> {
        let mut inner = self.available()?;
        Ok(inner.active_mut(subject).map(|ransom| {
            ransom.state = RansomState::Unlocked;
            ransom.unlocked_at = Some(chrono::Utc::now());
            ransom.clone()
        }))
    }

    async fn delete_ransom(&self, id: DbId) -> Result<bool, StoreError> {
        let mut inner = self.available()?;
        let before = inner.rows.len();
        inner.rows.retain(|r| r.id != id);
        Ok(inner.rows.len() < before)
    }

    async fn most_used_prerequisites(&self, limit: i64) -> Result<Vec<PrerequisiteUsage>, StoreError> {
        let inner = self.available()?;
        let mut usage: Vec<PrerequisiteUsage> = Vec::new();
        for ransom in &inner.rows {
            match usage.iter_mut().find(|u| u.prerequisite == ransom.prerequisite) {
                Some(entry) => entry.times_used += 1,
                None => usage.push(PrerequisiteUsage {
                    prerequisite: ransom.prerequisite.clone(),
                    times_used: 1,
                }),
            }
        }
        usage.sort_by(|a, b| {
            b.times_used
                .cmp(&a.times_used)
                .then_with(|| a.prerequisite.cmp(&b.prerequisite))
        });
        usage.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn dto(subject: &str, prerequisite: &str) -> CreateRansom {
        CreateRansom {
            subject: subject.into(),
            prerequisite: prerequisite.into(),
            locked_collection: "Horror".into(),
            threshold: Some(20.0),
            issued_by: None,
            lock_message: None,
            unlock_message: None,
        }
    }

    #[tokio::test]
    async fn one_active_ransom_per_subject() {
        let store = MemoryRansomStore::new();
        store.create_ransom(&dto("bob", "Inception")).await.unwrap();

        let err = store.create_ransom(&dto("bob", "Heat")).await.unwrap_err();
        assert_matches!(err, StoreError::ActiveRansomExists { ref subject } if subject == "bob");

        store.mark_unlocked("bob").await.unwrap();
        assert!(store.create_ransom(&dto("bob", "Heat")).await.is_ok());
    }

    #[tokio::test]
    async fn mutations_without_active_ransom_are_noops() {
        let store = MemoryRansomStore::new();
        assert!(!store.set_progress("ghost", 50.0).await.unwrap());
        assert!(store.mark_unlocked("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unlock_is_terminal_and_freezes_progress() {
        let store = MemoryRansomStore::new();
        store.create_ransom(&dto("bob", "Inception")).await.unwrap();
        assert!(store.set_progress("bob", 25.0).await.unwrap());

        let unlocked = store.mark_unlocked("bob").await.unwrap().unwrap();
        let unlocked_at = unlocked.unlocked_at;
        assert!(unlocked_at.is_some());

        assert!(store.mark_unlocked("bob").await.unwrap().is_none());
        assert!(!store.set_progress("bob", 99.0).await.unwrap());

        let stored = store.find_ransom(unlocked.id).await.unwrap().unwrap();
        assert_eq!(stored.progress, 25.0);
        assert_eq!(stored.unlocked_at, unlocked_at);
    }

    #[tokio::test]
    async fn most_used_counts_prerequisites() {
        let store = MemoryRansomStore::new();
        store.create_ransom(&dto("ann", "Heat")).await.unwrap();
        store.create_ransom(&dto("bob", "Inception")).await.unwrap();
        store.create_ransom(&dto("cat", "Inception")).await.unwrap();

        let usage = store.most_used_prerequisites(1).await.unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].prerequisite, "Inception");
        assert_eq!(usage[0].times_used, 2);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryRansomStore::new();
        store.set_unavailable(true);
        assert_matches!(store.list_active().await, Err(StoreError::Unavailable(_)));
    }
}
