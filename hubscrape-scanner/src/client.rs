use crate::error::{Result, ScanError};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://huggingface.co";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/107.0.0.0 Safari/537.36";

/// Anchors wrapping one model card on a listing page.
pub const DEFAULT_CARD_SELECTOR: &str = r#"a[class="block p-2"]"#;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP access to a model hub: one configured client plus the hub's base URL.
#[derive(Debug, Clone)]
pub struct HubClient {
    client: Client,
    base_url: Url,
    card_selector: Selector,
}

/// Collects client settings before the underlying reqwest client is built.
#[derive(Debug, Clone)]
pub struct HubClientBuilder {
    base_url: String,
    user_agent: String,
    headers: Vec<(String, String)>,
    timeout_secs: u64,
    card_selector: String,
}

impl Default for HubClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            card_selector: DEFAULT_CARD_SELECTOR.to_string(),
        }
    }
}

impl HubClientBuilder {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_card_selector(mut self, selector: impl Into<String>) -> Self {
        self.card_selector = selector.into();
        self
    }

    pub fn build(self) -> Result<HubClient> {
        let mut base_url = Url::parse(&self.base_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        // Relative joins replace the last path segment unless it ends in `/`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let card_selector = Selector::parse(&self.card_selector)
            .map_err(|e| ScanError::InvalidSelector(format!("{}: {}", self.card_selector, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| ScanError::InvalidHeader(format!("User-Agent: {}", e)))?,
        );
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ScanError::InvalidHeader(format!("{}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScanError::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs((self.timeout_secs / 2).max(1)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(HubClient {
            client,
            base_url,
            card_selector,
        })
    }
}

impl HubClient {
    pub fn builder() -> HubClientBuilder {
        HubClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn card_selector(&self) -> &Selector {
        &self.card_selector
    }

    /// Listing page `page`, sorted by descending download count.
    pub fn listing_url(&self, page: u32) -> Result<Url> {
        let mut url = self
            .base_url
            .join("models")
            .map_err(|e| ScanError::InvalidUrl(format!("listing url: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("p", &page.to_string())
            .append_pair("sort", "downloads");
        Ok(url)
    }

    /// Resolves a link found on a hub page into an absolute detail-page URL.
    pub fn resolve(&self, href: &str) -> Option<String> {
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return None;
        }
        let mut resolved = self.base_url.join(href).ok()?;
        resolved.set_fragment(None);
        Some(resolved.to_string())
    }

    /// GETs `url` and returns the body parsed as an HTML document.
    ///
    /// Non-2xx responses are reported as [`ScanError::Status`].
    pub async fn fetch_document(&self, url: &str) -> Result<Html> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(Html::parse_document(&body))
    }
}
