use sea_orm_migration::prelude::*;

mod m20250601_000001_create_stores;
mod m20250601_000002_create_users;
mod m20250601_000003_create_ratings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_stores::Migration),
            Box::new(m20250601_000002_create_users::Migration),
            Box::new(m20250601_000003_create_ratings::Migration),
        ]
    }
}
