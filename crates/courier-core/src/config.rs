//! Environment configuration.
//!
//! Every struct derives [`Envconfig`]; binaries call `init_from_env()` after
//! loading `.env`. None of them derive `Debug`, so credentials are not printed by
//! accident; use the `Display` impls for logging.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct RedisConfig {
    #[envconfig(from = "REDIS_HOST", default = "127.0.0.1")]
    pub host: String,
    #[envconfig(from = "REDIS_PORT", default = "6379")]
    pub port: u16,
    #[envconfig(from = "COURIER_QUEUE_KEY", default = "task_queue")]
    pub queue_key: String,
    #[envconfig(from = "COURIER_STATUS_PREFIX", default = "task_status:")]
    pub status_prefix: String,
    /// Per-attempt bound on opening a connection.
    #[envconfig(from = "REDIS_CONNECT_TIMEOUT_MS", default = "2000")]
    pub connect_timeout_ms: u64,
    /// Reconnect attempts before a command fails with a connectivity error. The
    /// worker's own backoff takes over after that.
    #[envconfig(from = "REDIS_RECONNECT_RETRIES", default = "1")]
    pub reconnect_retries: usize,
    #[envconfig(from = "REDIS_RECONNECT_MAX_DELAY_MS", default = "500")]
    pub reconnect_max_delay_ms: u64,
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

impl Display for RedisConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "REDIS_HOST: {}, REDIS_PORT: {}, COURIER_QUEUE_KEY: {}, COURIER_STATUS_PREFIX: {}, REDIS_CONNECT_TIMEOUT_MS: {}, REDIS_RECONNECT_RETRIES: {}",
            self.host,
            self.port,
            self.queue_key,
            self.status_prefix,
            self.connect_timeout_ms,
            self.reconnect_retries
        )
    }
}

#[derive(Envconfig, Clone)]
pub struct ServiceConfig {
    #[envconfig(from = "COURIER_LIST_LIMIT", default = "100")]
    pub list_limit: usize,
}

impl Display for ServiceConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "COURIER_LIST_LIMIT: {}", self.list_limit)
    }
}

#[derive(Envconfig, Clone)]
pub struct WorkerConfig {
    #[envconfig(from = "WORKER_DEQUEUE_TIMEOUT_MS", default = "1000")]
    pub dequeue_timeout_ms: u64,
    #[envconfig(from = "WORKER_CONNECTIVITY_BACKOFF_MS", default = "5000")]
    pub connectivity_backoff_ms: u64,
    #[envconfig(from = "WORKER_ERROR_BACKOFF_MS", default = "1000")]
    pub error_backoff_ms: u64,
    /// `0` disables the bound.
    #[envconfig(from = "WORKER_HANDLER_TIMEOUT_SECS", default = "300")]
    pub handler_timeout_secs: u64,
}

impl Display for WorkerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WORKER_DEQUEUE_TIMEOUT_MS: {}, WORKER_CONNECTIVITY_BACKOFF_MS: {}, WORKER_ERROR_BACKOFF_MS: {}, WORKER_HANDLER_TIMEOUT_SECS: {}",
            self.dequeue_timeout_ms,
            self.connectivity_backoff_ms,
            self.error_backoff_ms,
            self.handler_timeout_secs
        )
    }
}

/// Worker loop timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    /// How long one dequeue waits. Keeps the loop responsive to shutdown.
    pub dequeue_timeout: Duration,
    /// Pause after the queue reports a connectivity failure.
    pub connectivity_backoff: Duration,
    /// Pause after any other iteration failure.
    pub error_backoff: Duration,
    /// Upper bound on one handler run. `None` lets a handler block the loop forever.
    pub handler_timeout: Option<Duration>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            dequeue_timeout: Duration::from_secs(1),
            connectivity_backoff: Duration::from_secs(5),
            error_backoff: Duration::from_secs(1),
            handler_timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Floor for the dequeue wait. A zero wait would mean "block forever" to `BLPOP`.
pub const MIN_DEQUEUE_TIMEOUT: Duration = Duration::from_millis(10);

impl From<&WorkerConfig> for WorkerSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            dequeue_timeout: Duration::from_millis(config.dequeue_timeout_ms)
                .max(MIN_DEQUEUE_TIMEOUT),
            connectivity_backoff: Duration::from_millis(config.connectivity_backoff_ms),
            error_backoff: Duration::from_millis(config.error_backoff_ms),
            handler_timeout: match config.handler_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

/// TLS mode for the SMTP relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// TLS from the first byte (port 465).
    Implicit,
    StartTls,
    None,
}

#[derive(Envconfig, Clone)]
pub struct SmtpConfig {
    #[envconfig(from = "SMTP_HOST", default = "smtp.gmail.com")]
    pub host: String,
    #[envconfig(from = "SMTP_PORT", default = "465")]
    pub port: u16,
    /// `tls`, `starttls` or `none`.
    #[envconfig(from = "SMTP_TLS", default = "tls")]
    pub tls: String,
    #[envconfig(from = "SMTP_USERNAME")]
    pub username: Option<String>,
    #[envconfig(from = "SMTP_PASSWORD")]
    pub password: Option<String>,
    /// Falls back to `SMTP_USERNAME`.
    #[envconfig(from = "SMTP_FROM")]
    pub from: Option<String>,
    #[envconfig(from = "SMTP_TIMEOUT_SECS", default = "10")]
    pub timeout_secs: u64,
}

impl SmtpConfig {
    pub fn tls_mode(&self) -> SmtpTls {
        match self.tls.trim().to_lowercase().as_str() {
            "none" => SmtpTls::None,
            "starttls" => SmtpTls::StartTls,
            _ => SmtpTls::Implicit,
        }
    }

    /// Sender address: `SMTP_FROM`, else the login name.
    pub fn sender(&self) -> Option<String> {
        self.from
            .as_deref()
            .or(self.username.as_deref())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Username/password pair, both trimmed, when both are set.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.trim().to_string(), pass.trim().to_string())),
            _ => None,
        }
    }
}

impl Display for SmtpConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SMTP_HOST: {}, SMTP_PORT: {}, SMTP_TLS: {}, SMTP_USERNAME: {}, SMTP_PASSWORD: {}",
            self.host,
            self.port,
            self.tls,
            self.username.as_deref().unwrap_or("<unset>"),
            if self.password.is_some() { "***" } else { "<unset>" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn redis_defaults() {
        let config = RedisConfig::init_from_hashmap(&HashMap::new()).unwrap();
        assert_eq!(config.url(), "redis://127.0.0.1:6379/");
        assert_eq!(config.queue_key, "task_queue");
        assert_eq!(config.status_prefix, "task_status:");
        assert_eq!(config.connect_timeout_ms, 2000);
        assert_eq!(config.reconnect_retries, 1);
    }

    #[test]
    fn redis_overrides() {
        let config =
            RedisConfig::init_from_hashmap(&env(&[("REDIS_HOST", "cache"), ("REDIS_PORT", "6380")]))
                .unwrap();
        assert_eq!(config.url(), "redis://cache:6380/");
    }

    #[test]
    fn worker_defaults_match_the_backoff_policy() {
        let config = WorkerConfig::init_from_hashmap(&HashMap::new()).unwrap();
        let settings = WorkerSettings::from(&config);
        assert_eq!(settings, WorkerSettings::default());
        assert_eq!(settings.connectivity_backoff, Duration::from_secs(5));
        assert_eq!(settings.error_backoff, Duration::from_secs(1));
    }

    #[test]
    fn zero_dequeue_timeout_is_raised_to_the_floor() {
        let config =
            WorkerConfig::init_from_hashmap(&env(&[("WORKER_DEQUEUE_TIMEOUT_MS", "0")])).unwrap();
        assert_eq!(WorkerSettings::from(&config).dequeue_timeout, MIN_DEQUEUE_TIMEOUT);
    }

    #[test]
    fn zero_handler_timeout_means_unbounded() {
        let config =
            WorkerConfig::init_from_hashmap(&env(&[("WORKER_HANDLER_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(WorkerSettings::from(&config).handler_timeout, None);
    }

    #[test]
    fn smtp_sender_falls_back_to_username_and_trims() {
        let config = SmtpConfig::init_from_hashmap(&env(&[
            ("SMTP_USERNAME", " me@example.com \n"),
            ("SMTP_PASSWORD", " secret\n"),
        ]))
        .unwrap();

        assert_eq!(config.sender().as_deref(), Some("me@example.com"));
        assert_eq!(
            config.credentials(),
            Some(("me@example.com".to_string(), "secret".to_string()))
        );
        assert_eq!(config.tls_mode(), SmtpTls::Implicit);
        assert_eq!(config.port, 465);
    }

    #[test]
    fn smtp_display_hides_password() {
        let config = SmtpConfig::init_from_hashmap(&env(&[
            ("SMTP_USERNAME", "me@example.com"),
            ("SMTP_PASSWORD", "hunter2"),
        ]))
        .unwrap();
        let shown = config.to_string();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("***"));
    }

    #[test]
    fn list_limit_defaults_to_100() {
        let config = ServiceConfig::init_from_hashmap(&HashMap::new()).unwrap();
        assert_eq!(config.list_limit, 100);
    }
}
