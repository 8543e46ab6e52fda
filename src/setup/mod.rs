pub mod posts_setup;
