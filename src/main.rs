use std::sync::Arc;

use anyhow::Context;

use alexandria_app::modules;
use alexandria_authz::{RolePolicy, TokenAuthenticator};
use alexandria_catalog::CatalogService;
use alexandria_kernel::settings::Settings;
use alexandria_kernel::{InitCtx, ModuleRegistry};
use alexandria_store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load alexandria settings")?;
    alexandria_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        "alexandria bootstrap starting"
    );

    let catalog = Arc::new(CatalogService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(RolePolicy),
    ));
    let auth = Arc::new(TokenAuthenticator::from_tokens(&settings.auth.tokens));
    let deps = modules::ModuleDeps {
        catalog,
        auth,
        legacy_nonce: settings.auth.legacy_nonce.clone(),
    };

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &deps);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("alexandria bootstrap complete");
    alexandria_http::start_server(&registry, &settings).await
}
