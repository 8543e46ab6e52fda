use crate::helper::form_helpers;
use crate::helper::post_helpers::{with_store, StoreCallError};
use crate::AppState;
use actix_web::{web, HttpResponse, Responder};
use tera::{Context, Tera};

// --- Route Configuration ---
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(show_index))
        .route("/add", web::get().to(show_add_form))
        .route("/add", web::post().to(add_post_action))
        .route("/delete/{post_id}", web::post().to(delete_post_action))
        .route("/update/{post_id}", web::get().to(show_update_form))
        .route("/update/{post_id}", web::post().to(update_post_action))
        .route("/like/{post_id}", web::post().to(like_post_action));
}

fn redirect_to_index() -> HttpResponse {
    HttpResponse::Found().append_header(("location", "/")).finish()
}

fn render(tera: &Tera, template: &str, ctx: &Context) -> HttpResponse {
    match tera.render(template, ctx) {
        Ok(rendered) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(rendered),
        Err(err) => {
            log::error!("Template rendering error for '{}': {}", template, err);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

fn storage_failure(action: &str, err: StoreCallError) -> HttpResponse {
    log::error!("Failed to {}: {}", action, err);
    HttpResponse::InternalServerError().body("Internal Server Error")
}

// --- Page Rendering Handlers ---
async fn show_index(tera: web::Data<Tera>, state: web::Data<AppState>) -> impl Responder {
    match with_store(state, |store| store.fetch_all_posts()).await {
        Ok(posts) => {
            let mut ctx = Context::new();
            ctx.insert("posts", &posts);
            render(&tera, "index.html", &ctx)
        }
        Err(e) => storage_failure("load posts for the index page", e),
    }
}

async fn show_add_form(tera: web::Data<Tera>) -> impl Responder {
    render(&tera, "add.html", &Context::new())
}

async fn show_update_form(
    post_id: web::Path<u64>,
    tera: web::Data<Tera>,
    state: web::Data<AppState>,
) -> impl Responder {
    let post_id = post_id.into_inner();
    match with_store(state, move |store| store.fetch_post_by_id(post_id)).await {
        Ok(Some(post)) => {
            let mut ctx = Context::new();
            ctx.insert("post", &post);
            render(&tera, "update.html", &ctx)
        }
        Ok(None) => HttpResponse::NotFound().body("Post not found"),
        Err(e) => storage_failure(&format!("load post {} for editing", post_id), e),
    }
}

// --- Core Action Handlers ---
// Every action redirects to the index, including when the target id does not exist.
async fn add_post_action(state: web::Data<AppState>, form: web::Bytes) -> impl Responder {
    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response, // Return the 400 Bad Request
    };
    let fields = form_helpers::post_fields_from_form(&parsed);

    match with_store(state, move |store| store.create_post(fields)).await {
        Ok(_) => redirect_to_index(),
        Err(e) => storage_failure("add post", e),
    }
}

async fn delete_post_action(post_id: web::Path<u64>, state: web::Data<AppState>) -> impl Responder {
    let post_id = post_id.into_inner();
    match with_store(state, move |store| store.delete_post(post_id)).await {
        Ok(_) => redirect_to_index(),
        Err(e) => storage_failure(&format!("delete post {}", post_id), e),
    }
}

async fn update_post_action(
    post_id: web::Path<u64>,
    state: web::Data<AppState>,
    form: web::Bytes,
) -> impl Responder {
    let post_id = post_id.into_inner();
    let parsed = match form_helpers::parse_form(&form) {
        Ok(p) => p,
        Err(response) => return response,
    };
    let fields = form_helpers::post_fields_from_form(&parsed);

    match with_store(state, move |store| store.update_post(post_id, fields)).await {
        Ok(_) => redirect_to_index(),
        Err(e) => storage_failure(&format!("update post {}", post_id), e),
    }
}

async fn like_post_action(post_id: web::Path<u64>, state: web::Data<AppState>) -> impl Responder {
    let post_id = post_id.into_inner();
    match with_store(state, move |store| store.like_post(post_id)).await {
        Ok(_) => redirect_to_index(),
        Err(e) => storage_failure(&format!("like post {}", post_id), e),
    }
}
