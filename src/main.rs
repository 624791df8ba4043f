use std::sync::Arc;

use anyhow::Context;

use contacts_api::config::AppConfig;
use contacts_api::database::{manager, PgContactStore};
use contacts_api::secrets::{HttpSecretsClient, TokenVerifier};
use contacts_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_* and SECRETS_* vars.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("starting Contacts API on port {}", config.server.port);

    let secrets: Arc<HttpSecretsClient> =
        Arc::new(HttpSecretsClient::new(config.secrets.base_url.clone()));
    let verifier = Arc::new(TokenVerifier::new(secrets.clone(), &config.secrets.base_path));

    let credentials =
        manager::resolve_credentials(secrets.as_ref(), &config.secrets.base_path)
            .await
            .context("resolving database credentials")?;
    let pool = manager::connect(&credentials).await.context("connecting to database")?;

    let store = PgContactStore::new(pool);
    store.ensure_schema().await.context("ensuring contact table exists")?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(Arc::new(config), Arc::new(store), verifier);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Contacts API listening on http://{}", bind_addr);

    axum::serve(listener, contacts_api::app(state)).await.context("server")?;
    Ok(())
}
