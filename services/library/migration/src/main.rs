use sea_orm_migration::prelude::*;

use gcmn_library_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
