use async_trait::async_trait;

use crate::error::{HarvestError, Result};

/// Page body plus the URL it was finally served from (after redirects).
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub text: String,
    pub resolved_url: String,
}

/// GET a documentation page. Any non-success status is an error.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// `PageFetcher` over a shared `reqwest::Client`. No retries; the client's
/// default redirect policy and timeouts apply.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| HarvestError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let resolved_url = response.url().to_string();
        let text = response.text().await.map_err(|e| HarvestError::Parse {
            url: resolved_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(FetchedPage { text, resolved_url })
    }
}
