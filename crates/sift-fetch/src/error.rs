//! Error types for page fetching

use thiserror::Error;

/// Errors that can occur while fetching a page
///
/// None of these escape [`crate::ContentAcquirer`]; they are logged and
/// turned into stub content.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, timeout, redirect loop)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// The address could not be parsed as an http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be configured
    #[error("Client error: {0}")]
    Client(String),
}
