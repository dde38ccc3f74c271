use anyhow::Context;
use bookshelf_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = bookshelf_kernel::settings::Settings::load()
        .with_context(|| "failed to load bookshelf settings")?;

    bookshelf_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        host = %settings.server.host,
        port = settings.server.port,
        "bookshelf bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    bookshelf_app::modules::register_all(&mut registry);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    bookshelf_http::start_server(&registry, &settings).await?;

    registry.stop_all().await?;

    tracing::info!("bookshelf shut down cleanly");
    Ok(())
}
