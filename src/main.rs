// src/main.rs

use dotenvy::dotenv;
use elearn_quiz::{config::Config, db};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Prepares the quiz store: connects, applies migrations and reports what it found.
#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "quiz.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if let Err(e) = run(&config).await {
        tracing::error!("Quiz store setup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> elearn_quiz::QuizResult<()> {
    let pool = db::connect(config).await?;
    tracing::info!("Database connected...");

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;
    tracing::info!("Migrations applied successfully.");

    let quizzes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
        .fetch_one(&pool)
        .await?;
    let attempts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts")
        .fetch_one(&pool)
        .await?;
    tracing::info!(quizzes, attempts, "Quiz store ready");

    pool.close().await;
    Ok(())
}
