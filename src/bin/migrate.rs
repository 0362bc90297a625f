use sea_orm_migration::MigratorTrait;
use tienda_online::{
    db::{create_orm_conn, run_migrations},
    migration::Migrator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;
    let orm = create_orm_conn(&database_url).await?;

    let pending = Migrator::get_pending_migrations(&orm).await?.len();
    run_migrations(&orm).await?;
    println!("Applied {pending} pending migration(s)");
    Ok(())
}
