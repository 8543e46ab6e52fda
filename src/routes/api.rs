use crate::helper::post_helpers::with_store;
use crate::AppState;
use actix_web::{web, HttpResponse, Responder};

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            .route("/posts", web::get().to(get_all_posts))
            .route("/posts/{post_id}", web::get().to(get_post_by_id)),
    );
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

async fn get_all_posts(state: web::Data<AppState>) -> impl Responder {
    match with_store(state, |store| store.fetch_all_posts()).await {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(e) => {
            log::error!("Failed to fetch posts: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_post_by_id(post_id: web::Path<u64>, state: web::Data<AppState>) -> impl Responder {
    let post_id = post_id.into_inner();
    match with_store(state, move |store| store.fetch_post_by_id(post_id)).await {
        Ok(Some(post)) => HttpResponse::Ok().json(post),
        Ok(None) => HttpResponse::NotFound().body("Post not found"),
        Err(e) => {
            log::error!("Failed to fetch post {}: {}", post_id, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
