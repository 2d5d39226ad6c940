use std::{env, num::NonZeroUsize, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::delivery::SmtpConfig;
use crate::pipeline::{CurationPolicy, TimeWindowSetting, select::diversity::SelectionPolicy};
use crate::util::retry::RetryConfig;

const DEFAULT_NAVER_ENDPOINT: &str = "https://openapi.naver.com/v1/search/news.json";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_GEMINI_MODEL: &str = "gemini-pro-latest";

const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP relays inferred from the sender's mailbox domain.
const KNOWN_SMTP_HOSTS: &[(&str, &str)] = &[
    ("@gmail.com", "smtp.gmail.com"),
    ("@naver.com", "smtp.naver.com"),
];

/// Email delivery as configured by the `SMTP_*` and `DIGEST_MAIL_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailSettings {
    /// No mail variable is set.
    Disabled,
    /// Some mail variables are set but `missing` is not.
    Incomplete { missing: &'static str },
    Ready(SmtpConfig),
}

/// How the primary selection pass removes topical duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeMethod {
    Keyword,
    Gemini,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    naver_client_id: String,
    naver_client_secret: String,
    naver_search_endpoint: String,
    naver_page_size: usize,
    naver_pages_per_query: usize,
    google_api_key: Option<String>,
    use_gemini: bool,
    gemini_model: String,
    gemini_base_url: String,
    gemini_timeout: Duration,
    dedupe_method: DedupeMethod,
    digest_target: usize,
    max_per_outlet: usize,
    candidate_cap: usize,
    workers: NonZeroUsize,
    grouping_prefix: usize,
    similarity_threshold: f64,
    min_body_words: usize,
    min_topic_hits: usize,
    time_window: TimeWindowSetting,
    http_timeout: Duration,
    http_max_attempts: usize,
    http_backoff_base_ms: u64,
    http_backoff_cap_ms: u64,
    http_user_agent: String,
    webhook_url: Option<String>,
    output_dir: Option<PathBuf>,
    mail: MailSettings,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// Reads and validates every setting from the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the search credentials are missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let naver_client_id = env_var("NAVER_CLIENT_ID")?;
        let naver_client_secret = env_var("NAVER_CLIENT_SECRET")?;
        let naver_search_endpoint = optional_var("NAVER_SEARCH_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_NAVER_ENDPOINT.to_string());
        let naver_page_size = parse_usize("NAVER_PAGE_SIZE", 30)?;
        let naver_pages_per_query = parse_usize("NAVER_PAGES_PER_QUERY", 3)?;

        // Summarizer and grouper
        let google_api_key = optional_var("GOOGLE_API_KEY");
        let use_gemini = parse_bool("USE_GEMINI", true)?;
        let gemini_model =
            optional_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let gemini_base_url =
            optional_var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        let gemini_timeout = parse_duration_ms("GEMINI_TIMEOUT_MS", 30_000)?;
        let dedupe_method = parse_dedupe_method("DEDUPE_METHOD")?;

        // Curation limits
        let digest_target = parse_usize("DIGEST_TARGET", 5)?;
        let max_per_outlet = parse_usize("DIGEST_MAX_PER_OUTLET", 2)?;
        let candidate_cap = parse_usize("DIGEST_CANDIDATE_CAP", 50)?;
        let workers = parse_non_zero_usize("DIGEST_WORKERS", 10)?;
        let grouping_prefix = parse_usize("DIGEST_GROUPING_PREFIX", 15)?;
        let similarity_threshold = parse_ratio("DIGEST_SIMILARITY_THRESHOLD", 0.4)?;
        let min_body_words = parse_usize("DIGEST_MIN_BODY_WORDS", 60)?;
        let min_topic_hits = parse_usize("DIGEST_MIN_TOPIC_HITS", 2)?;
        let time_window = parse_time_window("DIGEST_TIME_WINDOW")?;

        // Outbound HTTP (search and page fetch)
        let http_timeout = parse_duration_ms("HTTP_TIMEOUT_MS", 10_000)?;
        // Total tries per request, the first one included.
        let http_max_attempts = parse_usize("HTTP_MAX_ATTEMPTS", 3)?;
        let http_backoff_base_ms = parse_u64("HTTP_BACKOFF_BASE_MS", 500)?;
        let http_backoff_cap_ms = parse_u64("HTTP_BACKOFF_CAP_MS", 4000)?;
        let http_user_agent = optional_var("HTTP_USER_AGENT")
            .unwrap_or_else(|| format!("KR-RE-NEWS/{}", env!("CARGO_PKG_VERSION")));

        // Delivery
        let webhook_url = optional_var("DIGEST_WEBHOOK_URL");
        let output_dir = optional_var("DIGEST_OUTPUT_DIR").map(PathBuf::from);
        let mail = parse_mail_settings(http_timeout)?;

        Ok(Self {
            naver_client_id,
            naver_client_secret,
            naver_search_endpoint,
            naver_page_size,
            naver_pages_per_query,
            google_api_key,
            use_gemini,
            gemini_model,
            gemini_base_url,
            gemini_timeout,
            dedupe_method,
            digest_target,
            max_per_outlet,
            candidate_cap,
            workers,
            grouping_prefix,
            similarity_threshold,
            min_body_words,
            min_topic_hits,
            time_window,
            http_timeout,
            http_max_attempts,
            http_backoff_base_ms,
            http_backoff_cap_ms,
            http_user_agent,
            webhook_url,
            output_dir,
            mail,
        })
    }

    #[must_use]
    pub fn naver_client_id(&self) -> &str {
        &self.naver_client_id
    }

    #[must_use]
    pub fn naver_client_secret(&self) -> &str {
        &self.naver_client_secret
    }

    #[must_use]
    pub fn naver_search_endpoint(&self) -> &str {
        &self.naver_search_endpoint
    }

    #[must_use]
    pub fn naver_page_size(&self) -> usize {
        self.naver_page_size
    }

    #[must_use]
    pub fn naver_pages_per_query(&self) -> usize {
        self.naver_pages_per_query
    }

    /// The API key when the Gemini capabilities are switched on.
    #[must_use]
    pub fn gemini_api_key(&self) -> Option<&str> {
        if self.use_gemini {
            self.google_api_key.as_deref()
        } else {
            None
        }
    }

    #[must_use]
    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }

    #[must_use]
    pub fn gemini_base_url(&self) -> &str {
        &self.gemini_base_url
    }

    #[must_use]
    pub fn gemini_timeout(&self) -> Duration {
        self.gemini_timeout
    }

    #[must_use]
    pub fn dedupe_method(&self) -> DedupeMethod {
        self.dedupe_method
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    #[must_use]
    pub fn http_user_agent(&self) -> &str {
        &self.http_user_agent
    }

    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.http_max_attempts,
            self.http_backoff_base_ms,
            self.http_backoff_cap_ms,
        )
    }

    #[must_use]
    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    #[must_use]
    pub fn output_dir(&self) -> Option<&PathBuf> {
        self.output_dir.as_ref()
    }

    #[must_use]
    pub fn mail(&self) -> &MailSettings {
        &self.mail
    }

    #[must_use]
    pub fn policy(&self) -> CurationPolicy {
        CurationPolicy {
            selection: SelectionPolicy {
                target: self.digest_target,
                max_per_outlet: self.max_per_outlet,
                similarity_threshold: self.similarity_threshold,
            },
            candidate_cap: self.candidate_cap,
            workers: self.workers,
            grouping_prefix: self.grouping_prefix,
            min_body_words: self.min_body_words,
            min_topic_hits: self.min_topic_hits,
            time_window: self.time_window,
        }
    }
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    optional_var(name).ok_or(ConfigError::Missing(name))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn invalid<E>(name: &'static str, error: E) -> ConfigError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    }
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<NonZeroUsize, ConfigError> {
    let parsed = parse_usize(name, default)?;
    NonZeroUsize::new(parsed).ok_or_else(|| ConfigError::Invalid {
        name,
        source: anyhow::anyhow!("must be greater than zero"),
    })
}

fn parse_duration_ms(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    Ok(Duration::from_millis(parse_u64(name, default_ms)?))
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    optional_var(name).map_or(Ok(default), |raw| {
        raw.parse::<usize>().map_err(|error| invalid(name, error))
    })
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    optional_var(name).map_or(Ok(default), |raw| {
        raw.parse::<u64>().map_err(|error| invalid(name, error))
    })
}

fn parse_u16(name: &'static str, default: u16) -> Result<u16, ConfigError> {
    optional_var(name).map_or(Ok(default), |raw| {
        raw.parse::<u16>().map_err(|error| invalid(name, error))
    })
}

fn parse_ratio(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = optional_var(name) else {
        return Ok(default);
    };
    let parsed = raw.parse::<f64>().map_err(|error| invalid(name, error))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("value must be between 0 and 1"),
        });
    }
    Ok(parsed)
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = optional_var(name) else {
        return Ok(default);
    };
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("invalid boolean value: {raw}"),
        }),
    }
}

fn parse_dedupe_method(name: &'static str) -> Result<DedupeMethod, ConfigError> {
    let Some(raw) = optional_var(name) else {
        return Ok(DedupeMethod::Keyword);
    };
    match raw.to_lowercase().as_str() {
        "keyword" => Ok(DedupeMethod::Keyword),
        "gemini" => Ok(DedupeMethod::Gemini),
        _ => Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("expected keyword or gemini, got {raw}"),
        }),
    }
}

/// Credentials and recipient are required; the host may be inferred from the
/// username and the sender defaults to the username.
fn parse_mail_settings(timeout: Duration) -> Result<MailSettings, ConfigError> {
    let username = optional_var("SMTP_USERNAME");
    let password = optional_var("SMTP_PASSWORD");
    let to = optional_var("DIGEST_MAIL_TO");
    let host = optional_var("SMTP_HOST");
    let from = optional_var("DIGEST_MAIL_FROM");
    let port = parse_u16("SMTP_PORT", DEFAULT_SMTP_PORT)?;

    if [&username, &password, &to, &host, &from]
        .iter()
        .all(|value| value.is_none())
    {
        return Ok(MailSettings::Disabled);
    }
    let Some(username) = username else {
        return Ok(MailSettings::Incomplete {
            missing: "SMTP_USERNAME",
        });
    };
    let Some(password) = password else {
        return Ok(MailSettings::Incomplete {
            missing: "SMTP_PASSWORD",
        });
    };
    let Some(to) = to else {
        return Ok(MailSettings::Incomplete {
            missing: "DIGEST_MAIL_TO",
        });
    };
    let Some(host) = host.or_else(|| infer_smtp_host(&username)) else {
        return Ok(MailSettings::Incomplete {
            missing: "SMTP_HOST",
        });
    };

    Ok(MailSettings::Ready(SmtpConfig {
        host,
        port,
        from: from.unwrap_or_else(|| username.clone()),
        username,
        password,
        to,
        timeout,
    }))
}

fn infer_smtp_host(username: &str) -> Option<String> {
    let lowered = username.to_lowercase();
    KNOWN_SMTP_HOSTS
        .iter()
        .find(|(suffix, _)| lowered.ends_with(suffix))
        .map(|(_, host)| (*host).to_string())
}

/// `none`, `today`, or `<N>h` with `N > 0`.
fn parse_time_window(name: &'static str) -> Result<TimeWindowSetting, ConfigError> {
    let Some(raw) = optional_var(name) else {
        return Ok(TimeWindowSetting::Unbounded);
    };
    let lowered = raw.to_lowercase();
    match lowered.as_str() {
        "none" => Ok(TimeWindowSetting::Unbounded),
        "today" => Ok(TimeWindowSetting::Today),
        other => {
            let hours = other
                .strip_suffix('h')
                .and_then(|digits| digits.parse::<u32>().ok())
                .filter(|hours| *hours > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name,
                    source: anyhow::anyhow!("expected none, today, or <hours>h, got {raw}"),
                })?;
            Ok(TimeWindowSetting::LastHours(hours))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: &[&str] = &[
        "NAVER_CLIENT_ID",
        "NAVER_CLIENT_SECRET",
        "NAVER_SEARCH_ENDPOINT",
        "NAVER_PAGE_SIZE",
        "NAVER_PAGES_PER_QUERY",
        "GOOGLE_API_KEY",
        "USE_GEMINI",
        "GEMINI_MODEL",
        "GEMINI_BASE_URL",
        "GEMINI_TIMEOUT_MS",
        "DEDUPE_METHOD",
        "DIGEST_TARGET",
        "DIGEST_MAX_PER_OUTLET",
        "DIGEST_CANDIDATE_CAP",
        "DIGEST_WORKERS",
        "DIGEST_GROUPING_PREFIX",
        "DIGEST_SIMILARITY_THRESHOLD",
        "DIGEST_MIN_BODY_WORDS",
        "DIGEST_MIN_TOPIC_HITS",
        "DIGEST_TIME_WINDOW",
        "HTTP_TIMEOUT_MS",
        "HTTP_MAX_ATTEMPTS",
        "HTTP_BACKOFF_BASE_MS",
        "HTTP_BACKOFF_CAP_MS",
        "HTTP_USER_AGENT",
        "DIGEST_WEBHOOK_URL",
        "DIGEST_OUTPUT_DIR",
        "SMTP_HOST",
        "SMTP_PORT",
        "SMTP_USERNAME",
        "SMTP_PASSWORD",
        "DIGEST_MAIL_TO",
        "DIGEST_MAIL_FROM",
    ];

    /// Runs `f` with every known variable cleared except `overrides`.
    fn with_env<F: FnOnce()>(overrides: &[(&str, &str)], f: F) {
        let vars: Vec<(&str, Option<&str>)> = ALL_VARS
            .iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| *value);
                (*name, value)
            })
            .collect();
        temp_env::with_vars(vars, f);
    }

    const CREDENTIALS: [(&str, &str); 2] = [
        ("NAVER_CLIENT_ID", "client-id"),
        ("NAVER_CLIENT_SECRET", "client-secret"),
    ];

    #[test]
    fn from_env_uses_defaults_when_optional_missing() {
        with_env(&CREDENTIALS, || {
            let config = Config::from_env().expect("config should load");

            assert_eq!(config.naver_client_id(), "client-id");
            assert_eq!(config.naver_search_endpoint(), DEFAULT_NAVER_ENDPOINT);
            assert_eq!(config.naver_page_size(), 30);
            assert_eq!(config.naver_pages_per_query(), 3);
            assert!(config.gemini_api_key().is_none());
            assert_eq!(config.gemini_model(), "gemini-pro-latest");
            assert_eq!(config.gemini_timeout(), Duration::from_millis(30_000));
            assert_eq!(config.dedupe_method(), DedupeMethod::Keyword);
            assert_eq!(config.http_timeout(), Duration::from_millis(10_000));
            assert_eq!(config.retry_config(), RetryConfig::new(3, 500, 4000));
            assert!(config.http_user_agent().starts_with("KR-RE-NEWS/"));
            assert!(config.webhook_url().is_none());
            assert!(config.output_dir().is_none());
            assert_eq!(config.mail(), &MailSettings::Disabled);

            let policy = config.policy();
            assert_eq!(policy.selection.target, 5);
            assert_eq!(policy.selection.max_per_outlet, 2);
            assert!((policy.selection.similarity_threshold - 0.4).abs() < f64::EPSILON);
            assert_eq!(policy.candidate_cap, 50);
            assert_eq!(policy.workers.get(), 10);
            assert_eq!(policy.grouping_prefix, 15);
            assert_eq!(policy.min_body_words, 60);
            assert_eq!(policy.min_topic_hits, 2);
            assert_eq!(policy.time_window, TimeWindowSetting::Unbounded);
        });
    }

    #[test]
    fn from_env_overrides_values() {
        let mut overrides = CREDENTIALS.to_vec();
        overrides.extend([
            ("GOOGLE_API_KEY", "gkey"),
            ("DEDUPE_METHOD", "Gemini"),
            ("DIGEST_TARGET", "7"),
            ("DIGEST_WORKERS", "4"),
            ("DIGEST_TIME_WINDOW", "24h"),
            ("HTTP_MAX_ATTEMPTS", "5"),
            ("DIGEST_OUTPUT_DIR", "/tmp/digest"),
        ]);
        with_env(&overrides, || {
            let config = Config::from_env().expect("config should load");

            assert_eq!(config.gemini_api_key(), Some("gkey"));
            assert_eq!(config.dedupe_method(), DedupeMethod::Gemini);
            assert_eq!(config.retry_config().max_attempts, 5);
            assert_eq!(config.output_dir(), Some(&PathBuf::from("/tmp/digest")));
            let policy = config.policy();
            assert_eq!(policy.selection.target, 7);
            assert_eq!(policy.workers.get(), 4);
            assert_eq!(policy.time_window, TimeWindowSetting::LastHours(24));
        });
    }

    #[test]
    fn use_gemini_false_hides_the_key() {
        let mut overrides = CREDENTIALS.to_vec();
        overrides.extend([("GOOGLE_API_KEY", "gkey"), ("USE_GEMINI", "false")]);
        with_env(&overrides, || {
            let config = Config::from_env().expect("config should load");
            assert!(config.gemini_api_key().is_none());
        });
    }

    #[test]
    fn from_env_errors_when_credentials_missing() {
        with_env(&[("NAVER_CLIENT_ID", "client-id")], || {
            let error = Config::from_env().expect_err("missing secret should fail");
            assert!(matches!(error, ConfigError::Missing("NAVER_CLIENT_SECRET")));
        });
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        with_env(
            &[("NAVER_CLIENT_ID", "  "), ("NAVER_CLIENT_SECRET", "s")],
            || {
                let error = Config::from_env().expect_err("blank id should fail");
                assert!(matches!(error, ConfigError::Missing("NAVER_CLIENT_ID")));
            },
        );
    }

    #[test]
    fn from_env_rejects_invalid_values() {
        let cases = [
            ("DIGEST_WORKERS", "0"),
            ("DIGEST_TARGET", "five"),
            ("DIGEST_SIMILARITY_THRESHOLD", "1.5"),
            ("DIGEST_TIME_WINDOW", "yesterday"),
            ("DIGEST_TIME_WINDOW", "0h"),
            ("DEDUPE_METHOD", "semantic"),
            ("USE_GEMINI", "maybe"),
            ("SMTP_PORT", "smtp"),
        ];
        for (name, value) in cases {
            let mut overrides = CREDENTIALS.to_vec();
            overrides.push((name, value));
            with_env(&overrides, || {
                let error = Config::from_env().expect_err("invalid value should fail");
                assert!(
                    matches!(error, ConfigError::Invalid { name: invalid, .. } if invalid == name),
                    "{name}={value} gave {error}"
                );
            });
        }
    }

    #[test]
    fn today_window_is_accepted() {
        let mut overrides = CREDENTIALS.to_vec();
        overrides.push(("DIGEST_TIME_WINDOW", "TODAY"));
        with_env(&overrides, || {
            let config = Config::from_env().expect("config should load");
            assert_eq!(config.policy().time_window, TimeWindowSetting::Today);
        });
    }

    #[test]
    fn mail_host_is_inferred_from_sender_domain() {
        let mut overrides = CREDENTIALS.to_vec();
        overrides.extend([
            ("SMTP_USERNAME", "digest@naver.com"),
            ("SMTP_PASSWORD", "app-password"),
            ("DIGEST_MAIL_TO", "reader@example.com"),
        ]);
        with_env(&overrides, || {
            let config = Config::from_env().expect("config should load");
            let MailSettings::Ready(smtp) = config.mail() else {
                panic!("mail should be ready, got {:?}", config.mail());
            };
            assert_eq!(smtp.host, "smtp.naver.com");
            assert_eq!(smtp.port, 587);
            assert_eq!(smtp.from, "digest@naver.com");
            assert_eq!(smtp.to, "reader@example.com");
            assert_eq!(smtp.timeout, Duration::from_millis(10_000));
        });
    }

    #[test]
    fn explicit_mail_host_and_sender_win() {
        let mut overrides = CREDENTIALS.to_vec();
        overrides.extend([
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USERNAME", "relay-user"),
            ("SMTP_PASSWORD", "pw"),
            ("DIGEST_MAIL_FROM", "news@example.com"),
            ("DIGEST_MAIL_TO", "reader@example.com"),
        ]);
        with_env(&overrides, || {
            let config = Config::from_env().expect("config should load");
            let MailSettings::Ready(smtp) = config.mail() else {
                panic!("mail should be ready, got {:?}", config.mail());
            };
            assert_eq!(smtp.host, "mail.example.com");
            assert_eq!(smtp.port, 2525);
            assert_eq!(smtp.from, "news@example.com");
        });
    }

    #[test]
    fn partial_mail_settings_name_the_first_missing_variable() {
        let cases: [(&[(&str, &str)], &str); 3] = [
            (&[("SMTP_USERNAME", "digest@gmail.com")], "SMTP_PASSWORD"),
            (
                &[("SMTP_USERNAME", "digest@gmail.com"), ("SMTP_PASSWORD", "pw")],
                "DIGEST_MAIL_TO",
            ),
            (
                &[
                    ("SMTP_USERNAME", "digest@corp.example"),
                    ("SMTP_PASSWORD", "pw"),
                    ("DIGEST_MAIL_TO", "reader@example.com"),
                ],
                "SMTP_HOST",
            ),
        ];
        for (mail_vars, expected) in cases {
            let mut overrides = CREDENTIALS.to_vec();
            overrides.extend_from_slice(mail_vars);
            with_env(&overrides, || {
                let config = Config::from_env().expect("incomplete mail is not a setup error");
                assert_eq!(
                    config.mail(),
                    &MailSettings::Incomplete { missing: expected }
                );
            });
        }
    }
}
