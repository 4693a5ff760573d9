//! Configuration loading and validation.
//!
//! Loads settings from `./wabridge.toml` (or `$WABRIDGE_CONFIG_PATH`), then
//! applies environment overrides. A `.env` file in the working directory is
//! read into the environment first.
//!
//! Precedence: env vars > config file > defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::answers::{Answer, AnswerOption};
use crate::server::DEFAULT_WEBHOOK_PATH;
use crate::whatsapp::outbound::{ListLabels, DEFAULT_LIST_LABEL};

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Webhook server settings.
    pub server: ServerConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
    /// Outbound HTTP client settings.
    pub http: HttpConfig,
    /// Meta Cloud API settings.
    pub cloud_api: CloudApiConfig,
    /// Serpro API settings.
    pub serpro: SerproConfig,
    /// Token cache backend.
    pub cache: CacheConfig,
    /// Outbound rendering settings.
    pub translator: TranslatorConfig,
    /// Answer source settings.
    pub answers: AnswersConfig,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// If the file does not exist, defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting configuration is invalid.
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "failed to read .env file");
            }
        }
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration resolving every environment variable through `env`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = Self::config_path_with(&env);
        let mut config = Self::load_from_file(&path)?;
        config.apply_overrides(&env);
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file only, no env overrides.
    fn load_from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Resolve the config file path using a custom env resolver.
    ///
    /// Checks `$WABRIDGE_CONFIG_PATH` first, then `./wabridge.toml`.
    pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        env("WABRIDGE_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("wabridge.toml"))
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function so tests do not touch the process environment.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        // Server.
        if let Some(v) = env("WABRIDGE_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = env("WEBHOOK_VERIFY_TOKEN") {
            self.server.verify_token = v;
        }

        // Logging.
        if let Some(v) = env("WABRIDGE_LOG_LEVEL") {
            self.logging.level = v;
        }

        // Cloud API.
        if let Some(v) = env("WPP_AUTHORIZATION_TOKEN") {
            self.cloud_api.access_token = v;
        }
        if let Some(v) = env("WPP_PHONE_NUMBER_IDENTIFIER") {
            self.cloud_api.phone_number_id = v;
        }

        // Serpro.
        if let Some(v) = env("SERPRO_CLIENT_ID") {
            self.serpro.client_id = v;
        }
        if let Some(v) = env("SERPRO_CLIENT_SECRET") {
            self.serpro.client_secret = v;
        }
        if let Some(v) = env("SERPRO_WABA_ID") {
            self.serpro.waba_id = v;
        }
        if let Some(v) = env("SERPRO_WEBHOOK_URL") {
            self.serpro.webhook_url = v;
        }

        // Token cache. A full URL wins over host/port.
        if let Some(url) = env("REDIS_URL") {
            self.cache.redis_url = Some(url);
        } else if let Some(host) = env("REDIS_HOST") {
            let port = env("REDIS_PORT").unwrap_or_else(|| "6379".to_owned());
            self.cache.redis_url = Some(format!("redis://{host}:{port}"));
        }

        // Answers.
        if let Some(v) = env("RASA_REST_URL") {
            self.answers.rest_url = Some(v);
        }
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrongly typed values.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }

    /// Check addresses and URLs.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid server.bind: {}", self.server.bind))?;
        if !self.server.webhook_path.starts_with('/') {
            anyhow::bail!(
                "server.webhook_path must start with '/': {}",
                self.server.webhook_path
            );
        }

        validate_url("cloud_api.api_base", &self.cloud_api.api_base)?;
        validate_url("serpro.base_url", &self.serpro.base_url)?;
        if !self.serpro.webhook_url.is_empty() {
            validate_url("serpro.webhook_url", &self.serpro.webhook_url)?;
        }
        if let Some(url) = &self.answers.rest_url {
            validate_url("answers.rest_url", url)?;
        }
        Ok(())
    }
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    url::Url::parse(value).with_context(|| format!("invalid {name}: {value}"))?;
    Ok(())
}

// ── Server config ───────────────────────────────────────────────

/// Webhook server settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Path receiving verification `GET`s and event `POST`s.
    pub webhook_path: String,
    /// Secret expected in `hub.verify_token`.
    pub verify_token: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("webhook_path", &self.webhook_path)
            .field("verify_token", &"__REDACTED__")
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            verify_token: String::new(),
        }
    }
}

// ── Logging config ──────────────────────────────────────────────

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for rotated JSON logs; console only when unset.
    pub logs_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            logs_dir: None,
        }
    }
}

// ── HTTP config ─────────────────────────────────────────────────

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl HttpConfig {
    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

// ── Provider configs ────────────────────────────────────────────

/// Meta Cloud API settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct CloudApiConfig {
    /// Graph API base URL including the version.
    pub api_base: String,
    /// Sending phone number id.
    pub phone_number_id: String,
    /// Long-lived access token.
    pub access_token: String,
}

impl std::fmt::Debug for CloudApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudApiConfig")
            .field("api_base", &self.api_base)
            .field("phone_number_id", &self.phone_number_id)
            .field("access_token", &"__REDACTED__")
            .finish()
    }
}

impl Default for CloudApiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://graph.facebook.com/v19.0".to_string(),
            phone_number_id: String::new(),
            access_token: String::new(),
        }
    }
}

/// Serpro API settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SerproConfig {
    /// API base URL.
    pub base_url: String,
    /// OAuth2 client id; also part of every client URL.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// WhatsApp Business account id sent in every message.
    pub waba_id: String,
    /// Public URL of this server's webhook, used by `register-webhook`.
    pub webhook_url: String,
}

impl std::fmt::Debug for SerproConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerproConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"__REDACTED__")
            .field("waba_id", &self.waba_id)
            .field("webhook_url", &self.webhook_url)
            .finish()
    }
}

impl Default for SerproConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.whatsapp.serpro.gov.br".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            waba_id: String::new(),
            webhook_url: String::new(),
        }
    }
}

// ── Cache config ────────────────────────────────────────────────

/// Token cache backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis URL; the in-process cache is used when unset.
    pub redis_url: Option<String>,
}

// ── Translator config ───────────────────────────────────────────

/// Outbound rendering settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Label of the button that opens a list message.
    pub list_button_label: String,
    /// Title of the list section.
    pub list_section_title: String,
}

impl TranslatorConfig {
    /// Labels for list messages.
    pub fn labels(&self) -> ListLabels {
        ListLabels {
            button: self.list_button_label.clone(),
            section_title: self.list_section_title.clone(),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            list_button_label: DEFAULT_LIST_LABEL.to_string(),
            list_section_title: DEFAULT_LIST_LABEL.to_string(),
        }
    }
}

// ── Answers config ──────────────────────────────────────────────

/// Answer source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnswersConfig {
    /// Rasa-style REST channel; canned answers are used when unset.
    pub rest_url: Option<String>,
    /// Script replayed by the canned answer source.
    pub canned: Vec<Answer>,
}

impl Default for AnswersConfig {
    fn default() -> Self {
        Self {
            rest_url: None,
            canned: default_canned_answers(),
        }
    }
}

fn default_canned_answers() -> Vec<Answer> {
    vec![
        Answer::text(
            "Olá, eu sou a Duda, a assistente virtual da Plataforma Empurrando Juntas. \
             Meu trabalho é descobrir a opinião das pessoas sobre determinados temas.",
        ),
        Answer::text("Vou te mandar o que me responderam e gostaria da sua opinião:"),
        Answer::with_options(
            "Ser digital não significa ser complexo. O que você acha disso?",
            vec![
                AnswerOption::new("1", "Concordar"),
                AnswerOption::new("-1", "Discordar"),
                AnswerOption::new("0", "Pular"),
            ],
        ),
    ]
}

// ── Tests ───────────────────────────────────────────────────────
