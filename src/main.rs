//! inboxd - entry point for the aggregation service

use std::sync::Arc;

use inboxd::config::Config;
use inboxd::domain::PartitionQuery;
use inboxd::providers::{GmailClient, MailboxProvider, OAuthConfig};
use inboxd::registry::AccountRegistry;
use inboxd::server::{self, AppState};
use inboxd::services::{AccountFetcher, Aggregator};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting inboxd");

    if let Err(e) = run() {
        tracing::error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let gmail = Arc::new(GmailClient::new(
        OAuthConfig {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        },
        config.partition_page_size,
    ));

    let registry = Arc::new(AccountRegistry::new());
    let fetcher = AccountFetcher::new(
        gmail.clone() as Arc<dyn MailboxProvider>,
        PartitionQuery::defaults(),
    );
    let aggregator = Arc::new(Aggregator::new(
        registry.clone(),
        fetcher,
        config.max_feed_size,
    ));

    let app = server::router(AppState {
        registry,
        aggregator,
        issuer: gmail,
        frontend_url: config.frontend_url.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
