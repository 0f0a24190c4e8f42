use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::common::{ArticleMetrics, FigshareRef};

use super::{AttemptFailure, RetryDecision, RetryPolicy};

/// Production statistics endpoint
pub const STATS_BASE_URL: &str = "https://stats.figshare.com";

/// Statistics response body. Counters the API omits are zero, not null.
#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    views: u64,
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    shares: u64,
    #[serde(default)]
    cites: u64,
}

impl From<StatsResponse> for ArticleMetrics {
    fn from(body: StatsResponse) -> Self {
        Self {
            views: body.views,
            downloads: body.downloads,
            shares: body.shares,
            citations: body.cites,
        }
    }
}

/// Client for the per-portal Figshare statistics API
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    policy: RetryPolicy,
}

impl StatsClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> reqwest::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
            policy,
        })
    }

    fn stats_url(&self, article: &FigshareRef) -> String {
        format!(
            "{}/{}/total/article/{}",
            self.base_url, article.host_site, article.article_id
        )
    }

    /// Fetch all four metrics for one article. `None` means the row's metric
    /// cells stay null: retries were exhausted on bad statuses or timeouts,
    /// or a transport failure ended the lookup early.
    pub async fn fetch_metrics(&self, article: &FigshareRef) -> Option<ArticleMetrics> {
        let url = self.stats_url(article);
        let mut attempts = 0;

        loop {
            info!("Requesting stats: {}", url);

            let failure = match self.client.get(&url).timeout(self.timeout).send().await {
                Ok(resp) if resp.status() == StatusCode::OK => {
                    match resp.json::<StatsResponse>().await {
                        Ok(body) => {
                            let metrics = ArticleMetrics::from(body);
                            debug!(
                                "Fetched {}/{}: views={} downloads={} shares={} citations={}",
                                article.host_site,
                                article.article_id,
                                metrics.views,
                                metrics.downloads,
                                metrics.shares,
                                metrics.citations
                            );
                            return Some(metrics);
                        }
                        Err(e) => {
                            warn!("Undecodable stats body from {}: {}", url, e);
                            AttemptFailure::Network
                        }
                    }
                }
                Ok(resp) => {
                    warn!(
                        "Attempt {}: status {} from {}",
                        attempts + 1,
                        resp.status(),
                        url
                    );
                    AttemptFailure::BadStatus
                }
                Err(e) if e.is_timeout() => {
                    warn!("Attempt {}: request timed out for {}", attempts + 1, url);
                    AttemptFailure::TimedOut
                }
                Err(e) => {
                    warn!("Request failed for {}: {}", url, e);
                    AttemptFailure::Network
                }
            };

            attempts += 1;
            match self.policy.decide(attempts, failure) {
                RetryDecision::Retry { backoff } => {
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                }
                RetryDecision::GiveUp => {
                    warn!(
                        "Failed to get stats for article {} at {} after {} attempt(s)",
                        article.article_id, article.host_site, attempts
                    );
                    return None;
                }
            }
        }
    }
}
