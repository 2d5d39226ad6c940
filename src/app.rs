use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    clients::{
        GeminiClient, NaverSearchClient,
        gemini::GeminiConfig,
        naver::NaverSearchConfig,
    },
    config::{Config, DedupeMethod, MailSettings},
    delivery::{DeliverySink, FileSink, SmtpSink, WebhookSink},
    pipeline::{
        DigestPipeline,
        fetch::{HttpPageFetcher, HttpPageFetcherConfig},
        select::grouping::{GeminiGrouper, Grouper},
        summarizer::{GeminiSummarizer, Summarizer},
    },
};

/// Everything one run needs, wired from [`Config`].
pub struct ComponentRegistry {
    pipeline: DigestPipeline,
    sinks: Vec<Arc<dyn DeliverySink>>,
}

impl ComponentRegistry {
    /// Builds the clients and the pipeline.
    ///
    /// A Gemini client that cannot be built only disables the summarizer and
    /// grouper; every other failure is returned.
    ///
    /// # Errors
    /// Fails when the search client, page fetcher, or a delivery sink cannot be built.
    pub fn build(config: &Config) -> Result<Self> {
        let retry = config.retry_config();

        let search = Arc::new(
            NaverSearchClient::new(&NaverSearchConfig {
                endpoint: config.naver_search_endpoint().to_string(),
                client_id: config.naver_client_id().to_string(),
                client_secret: config.naver_client_secret().to_string(),
                page_size: config.naver_page_size(),
                pages_per_query: config.naver_pages_per_query(),
                timeout: config.http_timeout(),
                user_agent: config.http_user_agent().to_string(),
                retry,
            })
            .context("failed to build naver search client")?,
        );
        let fetcher = Arc::new(
            HttpPageFetcher::new(&HttpPageFetcherConfig {
                timeout: config.http_timeout(),
                user_agent: config.http_user_agent().to_string(),
                retry,
            })
            .context("failed to build page fetcher")?,
        );

        let gemini = gemini_client(config);
        let summarizer = gemini
            .clone()
            .map(|client| Arc::new(GeminiSummarizer::new(client)) as Arc<dyn Summarizer>);
        let grouper = match (config.dedupe_method(), gemini) {
            (DedupeMethod::Gemini, Some(client)) => {
                Some(Arc::new(GeminiGrouper::new(client)) as Arc<dyn Grouper>)
            }
            (DedupeMethod::Gemini, None) => {
                warn!("gemini grouping requested without a usable client, using keyword dedupe");
                None
            }
            (DedupeMethod::Keyword, _) => None,
        };
        info!(
            summarizer = summarizer.is_some(),
            grouper = grouper.is_some(),
            "capabilities configured"
        );

        let pipeline = DigestPipeline::builder(search, fetcher)
            .with_policy(config.policy())
            .with_summarizer(summarizer)
            .with_grouper(grouper)
            .build()
            .context("failed to build digest pipeline")?;

        let sinks = delivery_sinks(config)?;

        Ok(Self { pipeline, sinks })
    }

    #[must_use]
    pub fn pipeline(&self) -> &DigestPipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn sinks(&self) -> &[Arc<dyn DeliverySink>] {
        &self.sinks
    }
}

fn gemini_client(config: &Config) -> Option<Arc<GeminiClient>> {
    let Some(api_key) = config.gemini_api_key() else {
        info!("gemini disabled, summaries fall back to search descriptions");
        return None;
    };
    match GeminiClient::new(&GeminiConfig {
        base_url: config.gemini_base_url().to_string(),
        api_key: api_key.to_string(),
        model: config.gemini_model().to_string(),
        timeout: config.gemini_timeout(),
    }) {
        Ok(client) => Some(Arc::new(client)),
        Err(error) => {
            warn!(error = %error, "gemini client unavailable, continuing without it");
            None
        }
    }
}

fn delivery_sinks(config: &Config) -> Result<Vec<Arc<dyn DeliverySink>>> {
    let mut sinks: Vec<Arc<dyn DeliverySink>> = Vec::new();
    match config.mail() {
        MailSettings::Ready(smtp) => {
            let sink = SmtpSink::new(smtp).context("failed to build smtp sink")?;
            sinks.push(Arc::new(sink));
        }
        MailSettings::Incomplete { missing } => {
            warn!(missing = *missing, "email settings incomplete, skipping email delivery");
        }
        MailSettings::Disabled => {}
    }
    if let Some(url) = config.webhook_url() {
        let sink = WebhookSink::new(url, config.http_timeout())
            .context("failed to build webhook sink")?;
        sinks.push(Arc::new(sink));
    }
    if let Some(dir) = config.output_dir() {
        sinks.push(Arc::new(FileSink::new(dir.clone())));
    }
    Ok(sinks)
}
