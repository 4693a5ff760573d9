//! wabridge CLI entry point.
//!
//! Provides `serve` to run the webhook server and `register-webhook` to point
//! Serpro at it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use wabridge::answers::rest::RestAnswerSource;
use wabridge::answers::{AnswerSource, CannedAnswers};
use wabridge::cache::{InMemoryTokenCache, SharedTokenCache};
use wabridge::config::{CacheConfig, Config};
use wabridge::credentials::{OAuth2ClientCredentials, StaticToken};
use wabridge::http::{build_client, sanitize_body};
use wabridge::logging::{self, LoggingGuard};
use wabridge::server::{self, AppState};
use wabridge::whatsapp::client::{serpro_token_url, serpro_webhook_url, DeliveryClient, Endpoints};
use wabridge::whatsapp::outbound::Translator;
use wabridge::whatsapp::router::{Channel, Dispatcher};
use wabridge::whatsapp::Provider;

/// wabridge — WhatsApp webhook bridge for the Meta Cloud API and Serpro.
#[derive(Parser)]
#[command(name = "wabridge", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the webhook server.
    Serve,
    /// Register this server's webhook URL with Serpro and exit.
    RegisterWebhook {
        /// Public webhook URL; defaults to `serpro.webhook_url`.
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("failed to load configuration")?;

    match cli.command {
        Command::Serve => handle_serve(config).await,
        Command::RegisterWebhook { url } => handle_register_webhook(config, url).await,
    }
}

/// Run the webhook server until Ctrl-C.
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let _logging_guard = init_logging(&config)?;

    if config.server.verify_token.is_empty() {
        warn!("no verify token configured, webhook verification will always fail");
    }

    let http = build_client(
        config.http.connect_timeout(),
        config.http.request_timeout(),
    );
    let cache = build_token_cache(&config.cache).await?;

    let answers: Arc<dyn AnswerSource> = match &config.answers.rest_url {
        Some(url) => {
            info!(url = %url, "using REST answer source");
            Arc::new(RestAnswerSource::new(http.clone(), url.clone()))
        }
        None => {
            info!(count = config.answers.canned.len(), "using canned answers");
            Arc::new(CannedAnswers::new(config.answers.canned.clone()))
        }
    };

    let labels = config.translator.labels();
    let cloud_api = Channel {
        translator: Translator::cloud_api(labels.clone()),
        client: cloud_api_client(&config, http.clone()),
    };
    let serpro = Channel {
        translator: Translator::serpro(config.serpro.waba_id.clone(), labels),
        client: serpro_client(&config, http, cache),
    };

    let state = Arc::new(AppState {
        verify_token: config.server.verify_token.clone(),
        dispatcher: Dispatcher::new(answers, cloud_api, serpro),
    });
    let app = server::router(state, &config.server.webhook_path);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!(
        bind = %config.server.bind,
        path = %config.server.webhook_path,
        "webhook server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server failed")?;

    info!("webhook server stopped");
    Ok(())
}

/// Register the webhook URL with Serpro.
async fn handle_register_webhook(config: Config, url: Option<String>) -> anyhow::Result<()> {
    logging::init_cli(&config.logging.level);

    let webhook_url = url.unwrap_or_else(|| config.serpro.webhook_url.clone());
    if webhook_url.is_empty() {
        anyhow::bail!("no webhook URL given; pass --url or set SERPRO_WEBHOOK_URL");
    }

    let http = build_client(
        config.http.connect_timeout(),
        config.http.request_timeout(),
    );
    let cache = build_token_cache(&config.cache).await?;
    let client = serpro_client(&config, http, cache);
    let registration_url = serpro_webhook_url(&config.serpro.base_url, &config.serpro.client_id);

    let response = client
        .register_webhook(&registration_url, &webhook_url)
        .await
        .context("webhook registration failed")?;
    if !response.is_success() {
        anyhow::bail!(
            "webhook registration rejected with status {}: {}",
            response.status,
            sanitize_body(&response.body)
        );
    }

    info!(webhook_url = %webhook_url, status = response.status, "webhook registered");
    Ok(())
}

fn init_logging(config: &Config) -> anyhow::Result<Option<LoggingGuard>> {
    match &config.logging.logs_dir {
        Some(dir) => Ok(Some(logging::init_production(dir, &config.logging.level)?)),
        None => {
            logging::init_cli(&config.logging.level);
            Ok(None)
        }
    }
}

fn cloud_api_client(config: &Config, http: reqwest::Client) -> DeliveryClient {
    DeliveryClient::new(
        Provider::CloudApi,
        http,
        Endpoints::cloud_api(&config.cloud_api.api_base, &config.cloud_api.phone_number_id),
        Arc::new(StaticToken::new(config.cloud_api.access_token.clone())),
    )
}

fn serpro_client(config: &Config, http: reqwest::Client, cache: SharedTokenCache) -> DeliveryClient {
    let credentials = OAuth2ClientCredentials::new(
        http.clone(),
        serpro_token_url(&config.serpro.base_url),
        config.serpro.client_id.clone(),
        config.serpro.client_secret.clone(),
        cache,
    );
    DeliveryClient::new(
        Provider::Serpro,
        http,
        Endpoints::serpro(&config.serpro.base_url, &config.serpro.client_id),
        Arc::new(credentials),
    )
}

#[cfg(feature = "redis-cache")]
async fn build_token_cache(config: &CacheConfig) -> anyhow::Result<SharedTokenCache> {
    match &config.redis_url {
        Some(url) => {
            let cache = wabridge::cache::RedisTokenCache::connect(url)
                .await
                .context("failed to connect to redis token cache")?;
            info!("using redis token cache");
            Ok(Arc::new(cache))
        }
        None => Ok(Arc::new(InMemoryTokenCache::new())),
    }
}

#[cfg(not(feature = "redis-cache"))]
async fn build_token_cache(config: &CacheConfig) -> anyhow::Result<SharedTokenCache> {
    if config.redis_url.is_some() {
        warn!("redis_url is set but built without the redis-cache feature, using in-memory token cache");
    }
    Ok(Arc::new(InMemoryTokenCache::new()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
