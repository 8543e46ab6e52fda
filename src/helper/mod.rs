pub mod form_helpers;
pub mod post_helpers;
