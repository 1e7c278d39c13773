use axum::extract::multipart::{MultipartError, MultipartRejection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    NotMultipart(#[from] MultipartRejection),
    #[error("{0}")]
    Multipart(#[from] MultipartError),
    #[error("no 'image' field in upload")]
    MissingImage,
    #[error("{0:#}")]
    Extraction(anyhow::Error),
}
