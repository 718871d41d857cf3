use std::sync::Arc;

use civita::{
    api::{start_api_server, ApiState},
    auth::TokenService,
    blobs::FsBlobStore,
    config::AppConfig,
    observability::{init_tracing, log_config_info},
    storage::create_pool,
    Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = AppConfig::from_env()?;
    init_tracing(&config.observability)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Civita backend");
    log_config_info(&config);

    let pool = create_pool(&config.database).await?;

    let state = ApiState {
        pool,
        token_service: Arc::new(TokenService::new(&config.auth)),
        blob_store: Arc::new(FsBlobStore::new(&config.blobs.root)),
        bcrypt_cost: config.auth.bcrypt_cost,
        max_upload_bytes: config.server.max_upload_bytes,
    };

    start_api_server(&config.server, state).await
}
