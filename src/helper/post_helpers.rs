use crate::models::db_operations::posts_db_operations::{self, IdPolicy};
use crate::models::db_operations::storage_operations::{PostStorage, StorageError};
use crate::models::{Post, PostCollection, PostFields};
use crate::AppState;
use actix_web::error::BlockingError;
use actix_web::web;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Whether load-modify-save sequences are serialised inside this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    #[default]
    Locked,
    /// No coordination between requests. Concurrent writers can lose updates.
    Legacy,
}

impl ConcurrencyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcurrencyMode::Locked => "locked",
            ConcurrencyMode::Legacy => "legacy",
        }
    }
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConcurrencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "locked" => Ok(ConcurrencyMode::Locked),
            "legacy" => Ok(ConcurrencyMode::Legacy),
            other => Err(format!("unknown concurrency mode '{}', expected 'locked' or 'legacy'", other)),
        }
    }
}

/// Request-level access to the posts document. Every call goes back to the
/// storage backend; nothing is cached between calls.
pub struct PostStore {
    storage: Arc<dyn PostStorage>,
    id_policy: IdPolicy,
    mode: ConcurrencyMode,
    write_lock: Mutex<()>,
}

impl PostStore {
    pub fn new(storage: Arc<dyn PostStorage>, id_policy: IdPolicy, mode: ConcurrencyMode) -> Self {
        PostStore { storage, id_policy, mode, write_lock: Mutex::new(()) }
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    pub fn describe(&self) -> String {
        self.storage.describe()
    }

    fn critical_section(&self) -> Option<MutexGuard<'_, ()>> {
        match self.mode {
            ConcurrencyMode::Locked => Some(self.write_lock.lock().unwrap_or_else(|poisoned| {
                log::error!("Posts write lock was poisoned! Recovering lock.");
                poisoned.into_inner()
            })),
            ConcurrencyMode::Legacy => None,
        }
    }

    pub fn fetch_all_posts(&self) -> Result<PostCollection, StorageError> {
        let _guard = self.critical_section();
        self.storage.load()
    }

    pub fn fetch_post_by_id(&self, post_id: u64) -> Result<Option<Post>, StorageError> {
        let posts = self.fetch_all_posts()?;
        Ok(posts_db_operations::find_post_by_id(&posts, post_id).cloned())
    }

    /// Loads the whole document, applies `change` and saves the whole document back.
    /// The save happens even when `change` turned out to be a no-op, but not when it failed.
    pub fn modify<T>(
        &self,
        change: impl FnOnce(&mut PostCollection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let _guard = self.critical_section();
        let mut posts = self.storage.load()?;
        let outcome = change(&mut posts)?;
        self.storage.save(&posts)?;
        Ok(outcome)
    }

    pub fn create_post(&self, fields: PostFields) -> Result<Post, StorageError> {
        let policy = self.id_policy;
        let post = self.modify(|posts| posts_db_operations::add_post(posts, policy, fields))?;
        log::info!("Created post {} ('{}')", post.id, post.title);
        Ok(post)
    }

    pub fn delete_post(&self, post_id: u64) -> Result<bool, StorageError> {
        let removed = self.modify(|posts| Ok(posts_db_operations::delete_post(posts, post_id)))?;
        log_outcome("Deleted", post_id, removed);
        Ok(removed)
    }

    pub fn update_post(&self, post_id: u64, fields: PostFields) -> Result<bool, StorageError> {
        let updated = self.modify(|posts| Ok(posts_db_operations::update_post(posts, post_id, fields)))?;
        log_outcome("Updated", post_id, updated);
        Ok(updated)
    }

    pub fn like_post(&self, post_id: u64) -> Result<bool, StorageError> {
        let liked = self.modify(|posts| posts_db_operations::increment_likes(posts, post_id))?;
        log_outcome("Liked", post_id, liked);
        Ok(liked)
    }
}

fn log_outcome(action: &str, post_id: u64, matched: bool) {
    if matched {
        log::info!("{} post {}", action, post_id);
    } else {
        log::debug!("{} nothing: post {} does not exist", action, post_id);
    }
}

#[derive(Error, Debug)]
pub enum StoreCallError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Blocking task failed: {0}")]
    Blocking(#[from] BlockingError),
}

/// Runs `job` against the shared store on the blocking thread pool.
/// File I/O and waits on the write lock must never run on an actix worker.
pub async fn with_store<T, F>(state: web::Data<AppState>, job: F) -> Result<T, StoreCallError>
where
    F: FnOnce(&PostStore) -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(move || job(&state.store)).await??)
}
