use std::sync::Arc;

use crate::config::Config;
use crate::helper::post_helpers::PostStore;
use crate::models::db_operations::storage_operations::JsonFileStorage;

/// Shared by every worker. Holds no posts itself, only the way to reach them.
pub struct AppState {
    pub store: PostStore,
}

impl AppState {
    pub fn new(store: PostStore) -> Self {
        AppState { store }
    }

    pub fn from_config(config: &Config) -> Self {
        let storage = JsonFileStorage::new(config.posts_file(), config.write_strategy);
        AppState::new(PostStore::new(Arc::new(storage), config.id_policy, config.concurrency_mode))
    }
}

pub mod config;
pub mod helper;
pub mod models;
pub mod routes;
pub mod setup;
