use env_logger::Env;
use log::info;
use sea_orm_migration::prelude::*;

/// 单独执行迁移：`migration up` / `migration down` / `migration status`
#[async_std::main]
async fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("OpenBooking schema migrations");
    cli::run_cli(migration::Migrator).await;
}
