use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(storerate_ratings_migration::Migrator).await;
}
