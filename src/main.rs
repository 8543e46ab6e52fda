use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware::{Logger, DefaultHeaders}};
use tera::Tera;
use blog_backend::{config::Config, routes, AppState};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "blog_server", author, version, about = "Starts the blog web server.")]
struct Cli {
    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

fn build_cors(allowed_origins: &str) -> Cors {
    let cors = if allowed_origins.trim() == "*" {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    cors.allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![actix_web::http::header::ACCEPT, actix_web::http::header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    // Initialize logger using the value from config
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    let tera = Tera::new(&config.templates_glob).expect("Tera initialization failed");

    let posts_file = config.posts_file();
    if !posts_file.exists() {
        log::warn!(
            "Posts file '{}' does not exist yet; every request will fail until it is created. Run 'cargo run --bin blog_cli -- --env-file <path> db setup'",
            posts_file.display()
        );
    }

    let app_state = web::Data::new(AppState::from_config(&config));
    log::info!(
        "Serving posts from {} (id policy: {}, concurrency: {})",
        app_state.store.describe(),
        app_state.store.id_policy(),
        app_state.store.mode()
    );

    let server_address = config.server_address();
    println!("🚀 Server starting at http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&config.allowed_origins))
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block"))
            )
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(tera.clone()))
            .app_data(app_state.clone())
            .configure(routes::api::config_api)
            .configure(routes::blog::config_routes)
            .service(actix_files::Files::new("/static", &config.static_path))
    })
    .bind(server_address)?
    .run()
    .await
}
