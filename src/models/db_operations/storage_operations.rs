use crate::models::PostCollection;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Posts file not found: {0}")]
    NotFound(String),
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("No post id left above {0}")]
    IdSpaceExhausted(u64),
    #[error("Like counter of post {0} is at its maximum")]
    LikesOverflow(u64),
}

/// Where the posts document lives. Every request loads the full collection
/// and, for mutations, saves it back in full.
pub trait PostStorage: Send + Sync {
    fn load(&self) -> Result<PostCollection, StorageError>;
    fn save(&self, posts: &PostCollection) -> Result<(), StorageError>;
    /// Human readable location, used in log lines.
    fn describe(&self) -> String;
}

/// How `JsonFileStorage` writes the document back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteStrategy {
    /// Write a sibling temp file, then rename it over the target.
    #[default]
    Atomic,
    /// Truncate and rewrite the target in place. A crash mid-write leaves a torn file.
    Overwrite,
}

impl WriteStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteStrategy::Atomic => "atomic",
            WriteStrategy::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "atomic" => Ok(WriteStrategy::Atomic),
            "overwrite" => Ok(WriteStrategy::Overwrite),
            other => Err(format!("unknown write strategy '{}', expected 'atomic' or 'overwrite'", other)),
        }
    }
}

// Keeps temp file names unique when several writers race in legacy mode.
static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct JsonFileStorage {
    path: PathBuf,
    write_strategy: WriteStrategy,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>, write_strategy: WriteStrategy) -> Self {
        JsonFileStorage { path: path.into(), write_strategy }
    }

    fn io_error(&self, path: &Path, source: io::Error) -> StorageError {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(path.display().to_string())
        } else {
            StorageError::Io { path: path.display().to_string(), source }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "posts.json".to_string());
        let counter = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{}.{}.{}.tmp", file_name, std::process::id(), counter))
    }
}

impl PostStorage for JsonFileStorage {
    fn load(&self) -> Result<PostCollection, StorageError> {
        let text = fs::read_to_string(&self.path).map_err(|e| self.io_error(&self.path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, posts: &PostCollection) -> Result<(), StorageError> {
        let text = serde_json::to_string(posts)?;
        match self.write_strategy {
            WriteStrategy::Overwrite => {
                fs::write(&self.path, text).map_err(|e| self.io_error(&self.path, e))
            }
            WriteStrategy::Atomic => {
                let tmp_path = self.temp_path();
                // A failed write can leave a partial temp file, so clean up on both steps.
                let written = fs::write(&tmp_path, text).and_then(|_| fs::rename(&tmp_path, &self.path));
                if let Err(e) = written {
                    fs::remove_file(&tmp_path).ok();
                    return Err(self.io_error(&self.path, e));
                }
                Ok(())
            }
        }
    }

    fn describe(&self) -> String {
        format!("{} ({} writes)", self.path.display(), self.write_strategy)
    }
}

/// Keeps the serialized document in memory. Goes through the same JSON
/// encoding as the file backend, so tests see identical behaviour.
pub struct MemoryStorage {
    document: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new(posts: &PostCollection) -> Result<Self, StorageError> {
        Ok(MemoryStorage { document: Mutex::new(Some(serde_json::to_string(posts)?)) })
    }

    /// Starts from raw text, which may be malformed on purpose.
    pub fn from_json(text: &str) -> Self {
        MemoryStorage { document: Mutex::new(Some(text.to_string())) }
    }

    /// A storage with no document at all; `load` fails until something is saved.
    pub fn missing() -> Self {
        MemoryStorage { document: Mutex::new(None) }
    }

    pub fn raw(&self) -> Option<String> {
        self.document.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

impl PostStorage for MemoryStorage {
    fn load(&self) -> Result<PostCollection, StorageError> {
        let document = self.document.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match document.as_deref() {
            Some(text) => Ok(serde_json::from_str(text)?),
            None => Err(StorageError::NotFound("<memory>".to_string())),
        }
    }

    fn save(&self, posts: &PostCollection) -> Result<(), StorageError> {
        let text = serde_json::to_string(posts)?;
        *self.document.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(text);
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
