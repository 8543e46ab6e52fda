pub mod api;
pub mod blog;
