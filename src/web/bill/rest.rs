use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    llm::{BillExtractor, Extraction, ReceiptImage},
    web::{Result, bill::data::Bill, error::Error},
};

pub const IMAGE_FIELD: &str = "image";
pub const STATUS_FAILED: &str = "failed";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LlmOutput {
    Bill(Bill),
    Error(String),
}

#[derive(Debug, Serialize)]
pub struct LlmResp {
    pub output: LlmOutput,
    /// `null` when the model service did not report one
    pub status: Option<String>,
}

impl LlmResp {
    pub fn success(extraction: Extraction) -> Self {
        Self {
            output: LlmOutput::Bill(extraction.bill),
            status: extraction.status,
        }
    }

    pub fn failed(err: &Error) -> Self {
        Self {
            output: LlmOutput::Error(format!("Error occured: {err}")),
            status: Some(STATUS_FAILED.to_owned()),
        }
    }
}

/// Receives a receipt image as multipart upload and returns the extracted bill
/// Every failure is reported in the body, the HTTP status is always 200
#[tracing::instrument(level = tracing::Level::DEBUG, skip(extractor, multipart))]
pub async fn extract_bill(
    State(extractor): State<Arc<dyn BillExtractor>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Json<LlmResp> {
    match do_extract_bill(extractor.as_ref(), multipart).await {
        Ok(extraction) => {
            info!(
                restaurant = extraction.bill.restaurant().unwrap_or("<unknown>"),
                items = extraction.bill.items().len(),
                "Bill extracted"
            );
            Json(LlmResp::success(extraction))
        }
        Err(e) => {
            error!("Error extracting bill: {e}");
            Json(LlmResp::failed(&e))
        }
    }
}

async fn do_extract_bill(
    extractor: &dyn BillExtractor,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Extraction> {
    let image = read_image(multipart?).await?;
    info!(
        "File received : {}",
        image.filename.as_deref().unwrap_or("<unnamed>")
    );
    extractor.extract(&image).await.map_err(Error::Extraction)
}

// takes the first field named `image`, other fields are skipped
async fn read_image(mut multipart: Multipart) -> Result<ReceiptImage> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;
        return Ok(ReceiptImage {
            filename,
            content_type,
            bytes,
        });
    }
    Err(Error::MissingImage)
}
