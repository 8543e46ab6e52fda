use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One blog entry as it is stored in the posts document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    // Older documents carry no counter at all; keep it absent on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    // Keys this backend does not know about; written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    pub fn like_count(&self) -> u64 {
        self.likes.unwrap_or(0)
    }
}

/// The whole posts document. File order is insertion order.
pub type PostCollection = Vec<Post>;

/// The editable part of a post, as submitted by the add/update forms.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PostFields {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl PostFields {
    pub fn new(author: &str, title: &str, content: &str) -> Self {
        PostFields {
            author: author.to_string(),
            title: title.to_string(),
            content: content.to_string(),
        }
    }
}

pub mod db_operations;
