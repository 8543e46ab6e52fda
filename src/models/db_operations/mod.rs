pub mod posts_db_operations;
pub mod storage_operations;
