use crate::helper::post_helpers::PostStore;
use crate::models::db_operations::storage_operations::{JsonFileStorage, PostStorage, StorageError, WriteStrategy};
use crate::models::{PostCollection, PostFields};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Could not create directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum SetupOutcome {
    Created,
    AlreadyExists,
}

/// Creates the posts document as an empty JSON array, along with its parent
/// directory. An existing document is never touched.
pub fn setup_posts_file(path: &Path) -> Result<SetupOutcome, SetupError> {
    if path.exists() {
        return Ok(SetupOutcome::AlreadyExists);
    }

    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).map_err(|source| SetupError::CreateDir {
            path: parent_dir.display().to_string(),
            source,
        })?;
    }

    JsonFileStorage::new(path, WriteStrategy::Atomic).save(&PostCollection::new())?;
    Ok(SetupOutcome::Created)
}

// ====================================================================
// ====================== POSTS ADMIN COMMANDS ========================
// ====================================================================
// Each returns the lines `blog_cli posts ...` prints on success.

pub fn list_posts(store: &PostStore) -> Result<Vec<String>, StorageError> {
    let posts = store.fetch_all_posts()?;
    if posts.is_empty() {
        return Ok(vec!["No posts yet.".to_string()]);
    }

    let mut lines = vec![format!("Listing {} post(s):", posts.len())];
    lines.extend(posts.iter().map(|post| {
        format!("- [{}] {} by {} ({} likes)", post.id, post.title, post.author, post.like_count())
    }));
    Ok(lines)
}

pub fn add_post(store: &PostStore, fields: PostFields) -> Result<String, StorageError> {
    let post = store.create_post(fields)?;
    Ok(format!("✅ Post {} ('{}') created.", post.id, post.title))
}

/// Deleting an unknown id is reported, not treated as a failure.
pub fn delete_post(store: &PostStore, post_id: u64) -> Result<String, StorageError> {
    if store.delete_post(post_id)? {
        Ok(format!("✅ Post {} deleted.", post_id))
    } else {
        Ok(format!("ℹ️ No post with id {} found. Nothing deleted.", post_id))
    }
}
