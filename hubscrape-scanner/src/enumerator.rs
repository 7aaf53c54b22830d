use crate::client::HubClient;
use crate::error::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Called after each listing page with the page index and the number of
/// model URLs collected so far.
pub type PageCallback = Arc<dyn Fn(u32, usize) + Send + Sync>;

/// Walks the hub's listing pages and collects model detail-page URLs.
pub struct Enumerator {
    client: HubClient,
    page_callback: Option<PageCallback>,
}

impl Enumerator {
    pub fn new(client: HubClient) -> Self {
        Self {
            client,
            page_callback: None,
        }
    }

    pub fn with_page_callback(mut self, callback: PageCallback) -> Self {
        self.page_callback = Some(callback);
        self
    }

    /// Collects model URLs from listing pages `0..=max_pages`.
    ///
    /// The page bound is checked after a page has been fetched, so the walk
    /// always requests one page past `max_pages` (page 1 when `max_pages` is
    /// 0) unless an empty page stops it first. A listing page that cannot be
    /// fetched aborts the walk with an error naming the page.
    pub async fn enumerate(&self, max_pages: u32, delay: Duration) -> Result<Vec<String>> {
        let start = Instant::now();
        let mut model_urls = Vec::new();
        let mut page: u32 = 0;

        loop {
            let listing_url = self.client.listing_url(page).map_err(|e| e.on_page(page))?;
            let page_urls = self
                .fetch_listing(listing_url.as_str())
                .await
                .map_err(|e| e.on_page(page))?;

            if page_urls.is_empty() || page > max_pages {
                debug!(
                    "Stopping at page {} ({} cards, limit {})",
                    page,
                    page_urls.len(),
                    max_pages
                );
                break;
            }

            info!("Reading page: {}", page);
            model_urls.extend(page_urls);

            if let Some(ref callback) = self.page_callback {
                callback(page, model_urls.len());
            }

            page += 1;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        info!("Number of model urls stored: {}", model_urls.len());
        debug!("Enumeration took {:?}", start.elapsed());
        Ok(model_urls)
    }

    async fn fetch_listing(&self, listing_url: &str) -> Result<Vec<String>> {
        let document = self.client.fetch_document(listing_url).await?;

        let urls = document
            .select(self.client.card_selector())
            .filter_map(|card| card.value().attr("href"))
            .filter_map(|href| self.client.resolve(href))
            .collect();

        Ok(urls)
    }
}
