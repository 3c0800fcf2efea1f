use anyhow::anyhow;
use infra::config::AppConfigImpl;
use infra::AppState;
use log::{info, warn};
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use migration::{Migrator, MigratorTrait};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {m}{n}";

/// 日志同时输出到控制台和文件，级别取 RUST_LOG，默认 info
fn init_logging(log_file: &str) -> anyhow::Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .appender(Appender::builder().build(
            "stdout",
            Box::new(
                ConsoleAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                    .build(),
            ),
        ))
        .build(
            Root::builder()
                .appender("file")
                .appender("stdout")
                .build(log_level.parse().unwrap_or(log::LevelFilter::Info)),
        )?;

    log4rs::init_config(config)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfigImpl::load().map_err(|e| anyhow!("failed to load config: {}", e))?;
    init_logging(&cfg.log_file)?;

    let db = infra::db::init_db(&cfg.database()).await?;

    if cfg.run_migrations {
        Migrator::up(&db, None).await?;
        info!("ob_participation schema is up to date");
    } else {
        let pending = Migrator::get_pending_migrations(&db).await?;
        if !pending.is_empty() {
            warn!("{} pending migration(s), run_migrations is disabled", pending.len());
        }
    }

    let state = AppState::with_postgres(db, &cfg);
    info!(
        "OpenBooking participation service ready (notification: {})",
        if state.has_notifier() { "enabled" } else { "disabled" }
    );
    Ok(())
}
