use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Listing page {page} failed")]
    Listing {
        page: u32,
        #[source]
        source: Box<ScanError>,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

impl ScanError {
    /// Wraps a failure that happened while fetching listing page `page`.
    pub fn on_page(self, page: u32) -> Self {
        ScanError::Listing {
            page,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
