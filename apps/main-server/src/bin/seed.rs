//! Loads demo data into the configured SQLite database.
//!
//! `tasktime-seed` wipes and reseeds; `tasktime-seed --verify` only prints
//! the current row counts.

use std::env;

use chrono::Utc;
use task_store::{SqliteTaskStore, TaskStore};
use tasktime_server::{config::MEMORY_DATABASE_URL, init_tracing, seed::seed_demo_data};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(&env::var("TASKTIME_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:tasktime.db?mode=rwc".to_string());
    if database_url == MEMORY_DATABASE_URL {
        anyhow::bail!("Seeding needs a persistent DATABASE_URL, not '{}'", MEMORY_DATABASE_URL);
    }

    let store = SqliteTaskStore::connect(&database_url).await?;
    let verify_only = env::args().skip(1).any(|arg| arg == "--verify");

    let counts = if verify_only {
        store.counts().await?
    } else {
        seed_demo_data(&store, Utc::now()).await?
    };

    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}
