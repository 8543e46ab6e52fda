use crate::models::PostFields;
use actix_web::{web, HttpResponse};
use std::collections::HashMap;
use url::form_urlencoded;

/// Parses URL-encoded form data from bytes, handling potential UTF-8 errors gracefully.
pub fn parse_form(form_bytes: &web::Bytes) -> Result<HashMap<String, String>, HttpResponse> {
    let body = match String::from_utf8(form_bytes.to_vec()) {
        Ok(s) => s,
        Err(_) => return Err(HttpResponse::BadRequest().body("Invalid UTF-8 in request body.")),
    };
    Ok(form_urlencoded::parse(body.as_bytes()).into_owned().collect())
}

/// Pulls author, title and content out of a parsed form. Absent fields become
/// empty strings; values are kept exactly as submitted.
pub fn post_fields_from_form(parsed: &HashMap<String, String>) -> PostFields {
    let field = |name: &str| parsed.get(name).cloned().unwrap_or_default();
    PostFields {
        author: field("author"),
        title: field("title"),
        content: field("content"),
    }
}
