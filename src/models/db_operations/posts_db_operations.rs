use crate::models::db_operations::storage_operations::StorageError;
use crate::models::{Post, PostCollection, PostFields};
use std::fmt;
use std::str::FromStr;

/// How a freshly added post gets its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// `max(existing ids) + 1`, or 1 for an empty document.
    #[default]
    MaxPlusOne,
    /// Id of the last post in file order, plus one.
    LastPlusOne,
    /// Number of posts plus one. Can hand out an id that is still in use after a delete.
    CountPlusOne,
}

impl IdPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPolicy::MaxPlusOne => "max_plus_one",
            IdPolicy::LastPlusOne => "last_plus_one",
            IdPolicy::CountPlusOne => "count_plus_one",
        }
    }
}

impl fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "max_plus_one" => Ok(IdPolicy::MaxPlusOne),
            "last_plus_one" => Ok(IdPolicy::LastPlusOne),
            "count_plus_one" => Ok(IdPolicy::CountPlusOne),
            other => Err(format!(
                "unknown id policy '{}', expected one of: max_plus_one, last_plus_one, count_plus_one",
                other
            )),
        }
    }
}

/// Fails when the base id is already `u64::MAX`, since wrapping would hand out a duplicate.
pub fn next_post_id(posts: &[Post], policy: IdPolicy) -> Result<u64, StorageError> {
    let base = match policy {
        IdPolicy::MaxPlusOne => posts.iter().map(|p| p.id).max().unwrap_or(0),
        IdPolicy::LastPlusOne => posts.last().map_or(0, |p| p.id),
        IdPolicy::CountPlusOne => posts.len() as u64,
    };
    base.checked_add(1).ok_or(StorageError::IdSpaceExhausted(base))
}

// ====================================================================
// ===================== IN-MEMORY MUTATIONS ==========================
// ====================================================================
// None of these persist anything. Callers run them inside
// `PostStore::modify` so the whole document is saved afterwards.

/// Appends a new post with zero likes and returns a copy of it.
pub fn add_post(posts: &mut PostCollection, policy: IdPolicy, fields: PostFields) -> Result<Post, StorageError> {
    let post = Post {
        id: next_post_id(posts, policy)?,
        author: fields.author,
        title: fields.title,
        content: fields.content,
        likes: Some(0),
        ..Default::default()
    };
    posts.push(post.clone());
    Ok(post)
}

/// Removes the first post with `post_id`. Returns false (and changes nothing) when absent.
pub fn delete_post(posts: &mut PostCollection, post_id: u64) -> bool {
    match posts.iter().position(|p| p.id == post_id) {
        Some(index) => {
            posts.remove(index);
            true
        }
        None => false,
    }
}

/// Overwrites author, title and content in place. `id` and `likes` are left alone.
pub fn update_post(posts: &mut PostCollection, post_id: u64, fields: PostFields) -> bool {
    match find_post_mut(posts, post_id) {
        Some(post) => {
            post.author = fields.author;
            post.title = fields.title;
            post.content = fields.content;
            true
        }
        None => false,
    }
}

/// Bumps the like counter by one. A post without a counter starts from zero.
/// A counter already at `u64::MAX` is an error and stays untouched.
pub fn increment_likes(posts: &mut PostCollection, post_id: u64) -> Result<bool, StorageError> {
    match find_post_mut(posts, post_id) {
        Some(post) => {
            let likes = post.like_count().checked_add(1).ok_or(StorageError::LikesOverflow(post_id))?;
            post.likes = Some(likes);
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn find_post_by_id(posts: &[Post], post_id: u64) -> Option<&Post> {
    posts.iter().find(|p| p.id == post_id)
}

fn find_post_mut(posts: &mut PostCollection, post_id: u64) -> Option<&mut Post> {
    posts.iter_mut().find(|p| p.id == post_id)
}
