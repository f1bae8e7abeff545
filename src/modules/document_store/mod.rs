//! Document store module
//!
//! Forwards JSON payloads as new documents to a Cloudant/CouchDB-style
//! REST endpoint.

mod document_store_client;

use reqwest::StatusCode;
use thiserror::Error;

pub use document_store_client::DocumentStoreClient;

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("invalid document store url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("read response (status {status}): {message}")]
    ReadBody { status: StatusCode, message: String },

    #[error("document store returned status {status}")]
    Rejected { status: StatusCode, body: Vec<u8> },
}
