use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use blog_backend::config::Config;
use blog_backend::helper::post_helpers::{ConcurrencyMode, PostStore};
use blog_backend::models::db_operations::posts_db_operations::IdPolicy;
use blog_backend::models::db_operations::storage_operations::{JsonFileStorage, WriteStrategy};
use blog_backend::routes;
use blog_backend::AppState;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tera::Tera;

const SEED: &str = r#"[{"id":1,"author":"A","title":"T","content":"C","likes":0}]"#;

struct Fixture {
    _dir: TempDir,
    path: PathBuf,
    state: web::Data<AppState>,
}

impl Fixture {
    fn with_document(document: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.json");
        if let Some(document) = document {
            fs::write(&path, document).unwrap();
        }
        let storage = JsonFileStorage::new(&path, WriteStrategy::Atomic);
        let store = PostStore::new(Arc::new(storage), IdPolicy::MaxPlusOne, ConcurrencyMode::Locked);
        Fixture { _dir: dir, path, state: web::Data::new(AppState::new(store)) }
    }

    fn seeded() -> Self {
        Self::with_document(Some(SEED))
    }

    fn stored(&self) -> Value {
        serde_json::from_str(&fs::read_to_string(&self.path).unwrap()).unwrap()
    }
}

fn templates() -> Tera {
    Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*.html")).unwrap()
}

macro_rules! blog_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(templates()))
                .app_data($state.clone())
                .configure(routes::api::config_api)
                .configure(routes::blog::config_routes),
        )
        .await
    };
}

fn form_post(uri: &str, body: &'static str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(body)
}

fn assert_redirects_to_index(resp: &actix_web::dev::ServiceResponse) {
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
}

#[actix_web::test]
async fn like_update_delete_scenario() {
    let fixture = Fixture::seeded();
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, test::TestRequest::post().uri("/like/1").to_request()).await;
    assert_redirects_to_index(&resp);
    assert_eq!(fixture.stored()[0]["likes"], 1);

    let before = fixture.stored();
    let resp = test::call_service(&app, test::TestRequest::post().uri("/like/99").to_request()).await;
    assert_redirects_to_index(&resp);
    assert_eq!(fixture.stored(), before);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/update/99").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(test::read_body(resp).await, "Post not found");

    let resp = test::call_service(&app, test::TestRequest::post().uri("/delete/1").to_request()).await;
    assert_redirects_to_index(&resp);
    assert_eq!(fixture.stored(), json!([]));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("No posts yet."));
    assert!(!body.contains("post-1"));
}

#[actix_web::test]
async fn index_lists_posts_in_file_order() {
    let fixture = Fixture::with_document(Some(
        r#"[{"id":5,"author":"Zed","title":"Later","content":"x","likes":2},
            {"id":2,"author":"Amy","title":"Earlier","content":"y"}]"#,
    ));
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/html; charset=utf-8");
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();

    let later = body.find("Later").unwrap();
    let earlier = body.find("Earlier").unwrap();
    assert!(later < earlier);
    assert!(body.contains("Like (2)"));
    // a post stored without a counter shows zero likes
    assert!(body.contains("Like (0)"));
}

#[actix_web::test]
async fn add_form_renders() {
    let fixture = Fixture::seeded();
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/add").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(r#"action="/add""#));
    assert!(body.contains(r#"name="content""#));
}

#[actix_web::test]
async fn adding_a_post_appends_it_with_defaults_for_missing_fields() {
    let fixture = Fixture::seeded();
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, form_post("/add", "title=Second+post&content=Hello%21").to_request()).await;
    assert_redirects_to_index(&resp);

    assert_eq!(
        fixture.stored()[1],
        json!({"id": 2, "author": "", "title": "Second post", "content": "Hello!", "likes": 0})
    );
}

#[actix_web::test]
async fn update_form_is_prefilled_and_escaped() {
    let fixture = Fixture::with_document(Some(
        r#"[{"id":3,"author":"Bob","title":"<b>Bold</b>","content":"Body text","likes":4}]"#,
    ));
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/update/3").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(r#"value="Bob""#));
    assert!(body.contains("&lt;b&gt;Bold&lt;&#x2F;b&gt;"));
    assert!(body.contains("Body text</textarea>"));
    assert!(body.contains(r#"action="/update/3""#));
}

#[actix_web::test]
async fn updating_keeps_id_and_likes() {
    let fixture = Fixture::with_document(Some(
        r#"[{"id":3,"author":"Bob","title":"Old","content":"Old body","likes":4}]"#,
    ));
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, form_post("/update/3", "author=Rob&title=New&content=").to_request()).await;
    assert_redirects_to_index(&resp);
    assert_eq!(
        fixture.stored(),
        json!([{"id": 3, "author": "Rob", "title": "New", "content": "", "likes": 4}])
    );
}

#[actix_web::test]
async fn updating_an_unknown_post_redirects_without_changes() {
    let fixture = Fixture::seeded();
    let app = blog_app!(fixture.state);
    let before = fixture.stored();

    let resp = test::call_service(&app, form_post("/update/42", "author=X&title=Y&content=Z").to_request()).await;
    assert_redirects_to_index(&resp);
    assert_eq!(fixture.stored(), before);
}

#[actix_web::test]
async fn deleting_twice_is_harmless() {
    let fixture = Fixture::seeded();
    let app = blog_app!(fixture.state);

    for _ in 0..2 {
        let resp = test::call_service(&app, test::TestRequest::post().uri("/delete/1").to_request()).await;
        assert_redirects_to_index(&resp);
        assert_eq!(fixture.stored(), json!([]));
    }
}

#[actix_web::test]
async fn non_numeric_ids_do_not_match() {
    let fixture = Fixture::seeded();
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/update/abc").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = test::call_service(&app, test::TestRequest::post().uri("/like/-1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(fixture.stored()[0]["likes"], 0);
}

#[actix_web::test]
async fn invalid_utf8_form_is_rejected() {
    let fixture = Fixture::seeded();
    let app = blog_app!(fixture.state);

    let req = test::TestRequest::post()
        .uri("/add")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(vec![0x74_u8, 0x3d, 0xff])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fixture.stored().as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn missing_posts_file_is_a_server_error() {
    let fixture = Fixture::with_document(None);
    let app = blog_app!(fixture.state);

    for req in [
        test::TestRequest::get().uri("/").to_request(),
        test::TestRequest::get().uri("/update/1").to_request(),
        test::TestRequest::post().uri("/like/1").to_request(),
        test::TestRequest::get().uri("/api/posts").to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
    assert!(!fixture.path.exists());
}

#[actix_web::test]
async fn malformed_posts_file_is_a_server_error() {
    let fixture = Fixture::with_document(Some("{ not json"));
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, form_post("/add", "title=x").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(fs::read_to_string(&fixture.path).unwrap(), "{ not json");
}

#[actix_web::test]
async fn overflowing_id_or_likes_is_a_server_error() {
    let document = format!(
        r#"[{{"id":{max},"author":"A","title":"T","content":"C","likes":{max}}}]"#,
        max = u64::MAX
    );
    let fixture = Fixture::with_document(Some(&document));
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, form_post("/add", "title=x").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let uri = format!("/like/{}", u64::MAX);
    let resp = test::call_service(&app, test::TestRequest::post().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(fs::read_to_string(&fixture.path).unwrap(), document);

    // the store keeps serving requests afterwards
    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn api_exposes_posts_as_json() {
    let fixture = Fixture::seeded();
    let app = blog_app!(fixture.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/is_server_active").to_request()).await;
    assert_eq!(test::read_body(resp).await, "active");

    let posts: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/posts").to_request()).await;
    assert_eq!(posts, fixture.stored());

    let post: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/posts/1").to_request()).await;
    assert_eq!(post["title"], "T");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/posts/99").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn state_built_from_config_uses_configured_policies() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    fs::write(&path, r#"[{"id":1,"author":"","title":"a","content":""},{"id":2,"author":"","title":"b","content":""}]"#).unwrap();
    let posts_path = path.display().to_string();
    let config = Config::from_lookup(|key| match key {
        "POSTS_FILE_PATH" => Some(posts_path.clone()),
        "ID_POLICY" => Some("last_plus_one".to_string()),
        "WRITE_STRATEGY" => Some("overwrite".to_string()),
        _ => None,
    })
    .unwrap();
    let state = web::Data::new(AppState::from_config(&config));
    let app = blog_app!(state);

    let resp = test::call_service(&app, test::TestRequest::post().uri("/delete/2").to_request()).await;
    assert_redirects_to_index(&resp);
    let resp = test::call_service(&app, form_post("/add", "title=c").to_request()).await;
    assert_redirects_to_index(&resp);

    let stored: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored[1]["id"], 2);
    assert_eq!(stored[1]["title"], "c");
    // the untouched legacy post still has no counter
    assert!(stored[0].get("likes").is_none());
}
