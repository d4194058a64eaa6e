use super::error::ServerError;
use crate::fulfillment::StatusPolicy;
use crate::stripe::CheckoutSettings;
use std::str::FromStr;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_PATH | ./data/workshop.db | SQLite file |
/// | HTTP_PORT | 8080 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | default log filter |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | - | enables rolling file logs |
/// | STRIPE_SECRET_KEY | dev placeholder | required outside development |
/// | STRIPE_WEBHOOK_SECRET | dev placeholder | required outside development |
/// | STRIPE_API_BASE | https://api.stripe.com | gateway base URL |
/// | CHECKOUT_CURRENCY | eur | checkout currency |
/// | CHECKOUT_SESSION_TTL_MINUTES | 30 | checkout session expiry |
/// | FRONTEND_BASE_URL | http://localhost:5173 | redirect base |
/// | EMAIL_BACKEND | log | `log` or `ses` |
/// | SES_FROM_EMAIL | noreply@workshop.local | sender address |
/// | CARD_LUHN_CHECK | false | Luhn check on card numbers |
/// | STRICT_STATUS_TRANSITIONS | false | reject non-adjacent admin status writes |
/// | WEBHOOK_TOLERANCE_SECS | 300 | max webhook timestamp skew |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    pub checkout_currency: String,
    pub checkout_session_ttl_minutes: i64,
    pub frontend_base_url: String,
    pub email_backend: EmailBackend,
    pub ses_from_email: String,
    pub card_luhn_check: bool,
    pub strict_status_transitions: bool,
    pub webhook_tolerance_secs: i64,
}

/// Where customer notifications go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailBackend {
    /// Written to the log only
    #[default]
    Log,
    /// Sent through AWS SES
    Ses,
}

impl FromStr for EmailBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "ses" => Ok(Self::Ses),
            other => Err(format!("unknown EMAIL_BACKEND '{other}' (expected log or ses)")),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, ServerError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(ServerError::Config(format!(
                        "{name} must be set in {environment} environment"
                    )));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(ServerError::Config(format!(
                "{name} must not be empty in {environment} environment"
            )));
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ServerError> {
        let defaults = Self::default();
        let environment = env_string("ENVIRONMENT", &defaults.environment);

        let email_backend = match std::env::var("EMAIL_BACKEND") {
            Ok(v) if !v.trim().is_empty() => v.parse().map_err(ServerError::Config)?,
            _ => defaults.email_backend,
        };

        Ok(Self {
            database_path: env_string("DATABASE_PATH", &defaults.database_path),
            http_port: env_or("HTTP_PORT", defaults.http_port),
            log_level: env_string("LOG_LEVEL", &defaults.log_level),
            log_json: env_or("LOG_JSON", defaults.log_json),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            stripe_api_base: env_string("STRIPE_API_BASE", &defaults.stripe_api_base),
            checkout_currency: env_string("CHECKOUT_CURRENCY", &defaults.checkout_currency)
                .to_ascii_lowercase(),
            checkout_session_ttl_minutes: env_or(
                "CHECKOUT_SESSION_TTL_MINUTES",
                defaults.checkout_session_ttl_minutes,
            ),
            frontend_base_url: env_string("FRONTEND_BASE_URL", &defaults.frontend_base_url),
            email_backend,
            ses_from_email: env_string("SES_FROM_EMAIL", &defaults.ses_from_email),
            card_luhn_check: env_or("CARD_LUHN_CHECK", defaults.card_luhn_check),
            strict_status_transitions: env_or(
                "STRICT_STATUS_TRANSITIONS",
                defaults.strict_status_transitions,
            ),
            webhook_tolerance_secs: env_or(
                "WEBHOOK_TOLERANCE_SECS",
                defaults.webhook_tolerance_secs,
            ),
            environment,
        })
    }

    /// Defaults with a custom database and port
    ///
    /// Used by tests; never reads the environment.
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16) -> Self {
        Self {
            database_path: database_path.into(),
            http_port,
            ..Self::default()
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn status_policy(&self) -> StatusPolicy {
        if self.strict_status_transitions {
            StatusPolicy::Strict
        } else {
            StatusPolicy::Permissive
        }
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            currency: self.checkout_currency.clone(),
            ttl_minutes: self.checkout_session_ttl_minutes,
            frontend_base_url: self.frontend_base_url.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "./data/workshop.db".into(),
            http_port: 8080,
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            stripe_secret_key: "dev-STRIPE_SECRET_KEY-not-for-production".into(),
            stripe_webhook_secret: "dev-STRIPE_WEBHOOK_SECRET-not-for-production".into(),
            stripe_api_base: "https://api.stripe.com".into(),
            checkout_currency: "eur".into(),
            checkout_session_ttl_minutes: 30,
            frontend_base_url: "http://localhost:5173".into(),
            email_backend: EmailBackend::Log,
            ses_from_email: "noreply@workshop.local".into(),
            card_luhn_check: false,
            strict_status_transitions: false,
            webhook_tolerance_secs: 300,
        }
    }
}
