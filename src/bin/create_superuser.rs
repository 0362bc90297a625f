use tienda_online::{
    config::SuperuserConfig,
    db::{create_orm_conn, run_migrations},
    services::auth_service::ensure_superuser,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;
    let superuser = SuperuserConfig::from_env().ok_or_else(|| {
        anyhow::anyhow!("SUPERUSER_USERNAME, SUPERUSER_EMAIL and SUPERUSER_PASSWORD must be set")
    })?;

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let created = ensure_superuser(
        &orm,
        &superuser.username,
        &superuser.email,
        &superuser.password,
    )
    .await?;

    if created {
        println!("Superuser {} created", superuser.username);
    } else {
        println!("Superuser {} already exists, skipping", superuser.username);
    }
    Ok(())
}
