use crate::config::DatabaseConfig;
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// 初始化连接池并用一次 SELECT 1 验证连接可用
pub async fn init_db(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(cfg.connect_timeout)
        .acquire_timeout(cfg.acquire_timeout)
        .idle_timeout(cfg.idle_timeout)
        .max_lifetime(cfg.max_lifetime)
        .sqlx_logging(cfg.sqlx_logging)
        .sqlx_logging_level(log::LevelFilter::Info);

    let db = Database::connect(opt).await?;

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, "SELECT 1".to_owned()))
        .await?;

    info!("Database connection pool initialized successfully");
    Ok(db)
}
