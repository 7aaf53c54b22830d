use crate::client::HubClient;
use crate::error::{Result, ScanError};
use crate::record::ModelRecord;
use crate::variant::extract_from_document;
use tracing::{debug, error};

/// Fetches model detail pages and turns their embedded metadata into
/// [`ModelRecord`]s.
pub struct Extractor {
    client: HubClient,
}

impl Extractor {
    pub fn new(client: HubClient) -> Self {
        Self { client }
    }

    /// Extracts the attributes of the model at `url`.
    ///
    /// Transport failures (connect, timeout, DNS) are returned as errors.
    /// A non-2xx response, as served for deleted or private models, is
    /// treated like a page without metadata: it is logged and yields an
    /// empty record. Pages whose metadata is missing or unreadable are
    /// logged the same way and yield an empty or partial record.
    pub async fn extract(&self, url: &str) -> Result<ModelRecord> {
        let extraction = match self.client.fetch_document(url).await {
            Ok(document) => extract_from_document(&document),
            Err(ScanError::Status { status, .. }) => {
                error!(url = %url, "Error in {}: HTTP {}", url, status);
                return Ok(ModelRecord::new());
            }
            Err(e) => return Err(e),
        };

        for issue in &extraction.issues {
            error!(url = %url, "Error in {}: {}", url, issue);
        }

        debug!(
            "Extracted {} fields from {} ({})",
            extraction.record.len(),
            url,
            extraction
                .variant
                .map(|v| v.to_string())
                .unwrap_or_else(|| "no variant".to_string())
        );

        Ok(extraction.record)
    }
}
