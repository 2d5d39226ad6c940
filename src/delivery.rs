//! Hand-off of a rendered digest to external collaborators.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::{info, warn};

use crate::digest::Digest;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed")]
    Request(#[from] reqwest::Error),
    #[error("webhook returned status {0}")]
    Status(StatusCode),
    #[error("mail message could not be built")]
    Message(#[from] lettre::error::Error),
    #[error("smtp send failed")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait DeliverySink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, digest: &Digest) -> Result<(), DeliveryError>;
}

/// POSTs `{subject, text, html}` as JSON.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    url: Url,
}

impl WebhookSink {
    /// # Errors
    /// Fails when the URL is invalid or the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webhook HTTP client")?;
        let url = Url::parse(url).context("invalid webhook URL")?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl DeliverySink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, digest: &Digest) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(digest)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status));
        }
        Ok(())
    }
}

pub const TEXT_FILE: &str = "digest.txt";
pub const HTML_FILE: &str = "digest.html";

/// Writes [`TEXT_FILE`] and [`HTML_FILE`] into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn write(&self, name: &str, contents: &str) -> Result<(), DeliveryError> {
        let path = self.dir.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| DeliveryError::Io { path, source })
    }
}

#[async_trait]
impl DeliverySink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn deliver(&self, digest: &Digest) -> Result<(), DeliveryError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DeliveryError::Io {
                path: self.dir.clone(),
                source,
            })?;
        self.write(TEXT_FILE, &digest.text).await?;
        self.write(HTML_FILE, &digest.html).await
    }
}

/// Connection and envelope settings for [`SmtpSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
    pub timeout: Duration,
}

/// Mails the HTML rendering over STARTTLS.
pub struct SmtpSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpSink {
    /// The transport connects lazily, so this only validates settings.
    ///
    /// # Errors
    /// Fails when an address does not parse or the TLS relay cannot be set up.
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("invalid sender address {:?}", config.from))?;
        let to: Mailbox = config
            .to
            .parse()
            .with_context(|| format!("invalid recipient address {:?}", config.to))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("failed to set up smtp relay {}", config.host))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();
        Ok(Self { transport, from, to })
    }

    fn message(&self, digest: &Digest) -> Result<Message, DeliveryError> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(digest.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(digest.html.clone())?)
    }
}

#[async_trait]
impl DeliverySink for SmtpSink {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn deliver(&self, digest: &Digest) -> Result<(), DeliveryError> {
        let message = self.message(digest)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Hands `digest` to every sink and returns how many succeeded.
///
/// A failing sink is logged; it never fails the run.
pub async fn deliver_all(sinks: &[Arc<dyn DeliverySink>], digest: &Digest) -> usize {
    if sinks.is_empty() {
        warn!("no delivery sink configured, skipping delivery");
        return 0;
    }
    let mut delivered = 0;
    for sink in sinks {
        match sink.deliver(digest).await {
            Ok(()) => {
                delivered += 1;
                info!(sink = sink.name(), subject = %digest.subject, "digest delivered");
            }
            Err(error) => {
                warn!(sink = sink.name(), error = %error, "digest delivery failed");
            }
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn digest() -> Digest {
        Digest {
            subject: "📰 [2026-10-14] 부동산 뉴스 요약 (0건)".to_string(),
            text: "텍스트".to_string(),
            html: "<html></html>".to_string(),
            articles: Vec::new(),
        }
    }

    #[tokio::test]
    async fn webhook_posts_rendered_payloads() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "subject": "📰 [2026-10-14] 부동산 뉴스 요약 (0건)",
                "text": "텍스트",
                "html": "<html></html>"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let sink = WebhookSink::new(&server.uri(), Duration::from_secs(5)).expect("sink builds");

        sink.deliver(&digest()).await.expect("delivered");
    }

    #[tokio::test]
    async fn webhook_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let sink = WebhookSink::new(&server.uri(), Duration::from_secs(5)).expect("sink builds");

        let error = sink.deliver(&digest()).await.expect_err("should fail");
        assert!(matches!(error, DeliveryError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
    }

    #[tokio::test]
    async fn file_sink_writes_both_renderings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("out");
        let sink = FileSink::new(&target);

        sink.deliver(&digest()).await.expect("written");

        let text = std::fs::read_to_string(target.join(TEXT_FILE)).expect("text");
        let html = std::fs::read_to_string(target.join(HTML_FILE)).expect("html");
        assert_eq!(text, "텍스트");
        assert_eq!(html, "<html></html>");
    }

    #[tokio::test]
    async fn failing_sink_does_not_stop_others() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let sinks: Vec<Arc<dyn DeliverySink>> = vec![
            Arc::new(WebhookSink::new(&server.uri(), Duration::from_secs(5)).expect("sink")),
            Arc::new(FileSink::new(dir.path())),
        ];

        assert_eq!(deliver_all(&sinks, &digest()).await, 1);
    }

    fn smtp_config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: "digest@gmail.com".to_string(),
            password: "app-password".to_string(),
            from: "digest@gmail.com".to_string(),
            to: "reader@example.com".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn smtp_message_carries_subject_and_html() {
        let sink = SmtpSink::new(&smtp_config()).expect("sink builds");
        let digest = Digest {
            html: "<html><body>서울 집값</body></html>".to_string(),
            ..digest()
        };

        let message = sink.message(&digest).expect("message builds");
        let headers = message.headers().to_string();

        assert!(headers.contains("To: reader@example.com"));
        assert!(headers.contains("Content-Type: text/html"));
        assert!(headers.contains("Subject:"));
        assert_eq!(message.envelope().to().len(), 1);
    }

    #[test]
    fn smtp_sink_rejects_bad_recipient() {
        let config = SmtpConfig {
            to: "not an address".to_string(),
            ..smtp_config()
        };
        assert!(SmtpSink::new(&config).is_err());
    }

    #[tokio::test]
    async fn no_sinks_means_nothing_delivered() {
        assert_eq!(deliver_all(&[], &digest()).await, 0);
    }
}
