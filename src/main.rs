mod modules;

use anyhow::Context;
use shelf_db::Db;
use shelf_kernel::settings::Settings;
use shelf_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().ok();

    let settings = Settings::load().with_context(|| "failed to load SHELF settings")?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "shelf-app bootstrap starting"
    );

    let db = Db::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| "failed to open database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };

    registry.init_all(&ctx).await?;
    db.run_migrations(&registry.collect_migrations()).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("shelf-app bootstrap complete");

    shelf_http::start_server(&registry, &settings, db.clone()).await?;

    registry.stop_all().await?;
    db.close().await;

    Ok(())
}
