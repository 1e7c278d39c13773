use async_trait::async_trait;
use axum::body::Bytes;

use crate::web::bill::data::Bill;

pub mod openai;
pub mod prompt;

/// An uploaded receipt, as read from the multipart request
#[derive(Debug, Clone)]
pub struct ReceiptImage {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// The decoded bill plus the status the model service reported for the call
#[derive(Debug, Clone)]
pub struct Extraction {
    pub bill: Bill,
    pub status: Option<String>,
}

/// Turns a receipt image into structured bill data.
/// Called exactly once per upload, no retries.
#[async_trait]
pub trait BillExtractor: Send + Sync {
    async fn extract(&self, image: &ReceiptImage) -> Result<Extraction, anyhow::Error>;
}
