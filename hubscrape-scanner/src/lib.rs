pub mod client;
pub mod enumerator;
pub mod error;
pub mod extractor;
pub mod record;
pub mod variant;

pub use client::{HubClient, HubClientBuilder};
pub use enumerator::{Enumerator, PageCallback};
pub use error::ScanError;
pub use extractor::Extractor;
pub use record::{FieldValue, ModelRecord};
pub use variant::{ExtractIssue, PageVariant};
