pub use sea_orm_migration::prelude::*;

mod m20160104_000001_create_participation_domain;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20160104_000001_create_participation_domain::Migration)]
    }
}
