use clap::{Parser, Subcommand};
use blog_backend::config::Config;
use blog_backend::models::PostFields;
use blog_backend::setup::posts_setup::{self, SetupOutcome};
use blog_backend::AppState;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "blog_cli", author, version, about = "A CLI for setting up and inspecting the posts file.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Posts {
        #[command(subcommand)]
        action: PostsAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// Create the posts file as an empty list if it does not exist.
    Setup,
}

#[derive(Subcommand, Debug)]
enum PostsAction {
    List,
    Add {
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    Delete {
        #[arg(long)]
        id: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env(&cli.env_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let succeeded = match &cli.command {
        Commands::Db { action: DbAction::Setup } => setup_posts_file(&config),
        Commands::Posts { action } => {
            let state = AppState::from_config(&config);
            match action {
                PostsAction::List => list_posts(&state),
                PostsAction::Add { author, title, content } => {
                    add_post(&state, PostFields::new(author, title, content))
                }
                PostsAction::Delete { id } => delete_post(&state, *id),
            }
        }
    };

    if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn setup_posts_file(config: &Config) -> bool {
    let posts_path = config.posts_file();
    println!("\nSetting up posts file at '{}'...", posts_path.display());
    match posts_setup::setup_posts_file(&posts_path) {
        Ok(SetupOutcome::Created) => {
            println!("✅ Posts file created with an empty post list.");
            true
        }
        Ok(SetupOutcome::AlreadyExists) => {
            println!("ℹ️ Posts file already exists at '{}'. Skipping creation.", posts_path.display());
            true
        }
        Err(e) => {
            eprintln!("❌ Error setting up posts file: {}", e);
            false
        }
    }
}

fn list_posts(state: &AppState) -> bool {
    match posts_setup::list_posts(&state.store) {
        Ok(lines) => {
            lines.iter().for_each(|line| println!("{}", line));
            true
        }
        Err(e) => {
            eprintln!("❌ Error reading posts: {}. Did you run `blog_cli db setup`?", e);
            false
        }
    }
}

fn add_post(state: &AppState, fields: PostFields) -> bool {
    match posts_setup::add_post(&state.store, fields) {
        Ok(message) => {
            println!("{}", message);
            true
        }
        Err(e) => {
            eprintln!("❌ Error creating post: {}", e);
            false
        }
    }
}

fn delete_post(state: &AppState, post_id: u64) -> bool {
    match posts_setup::delete_post(&state.store, post_id) {
        Ok(message) => {
            println!("{}", message);
            true
        }
        Err(e) => {
            eprintln!("❌ Error deleting post: {}", e);
            false
        }
    }
}
