//! Sift Content Acquisition
//!
//! Turns links found in chat text into structured [`WebsiteContent`].
//!
//! # Overview
//!
//! - [`detect_urls`]: find `http(s)` links and bare domains in free text
//! - [`HttpFetcher`]: `PageFetcher` implementation over `reqwest`
//! - [`ContentAcquirer`]: `fetch_one` / `fetch_many`, never failing
//! - [`html::parse_page`]: markup → `WebsiteContent`
//!
//! [`WebsiteContent`]: sift_domain::WebsiteContent

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod html;
pub mod urls;

pub use acquisition::ContentAcquirer;
pub use config::FetchConfig;
pub use error::FetchError;
pub use fetcher::HttpFetcher;
pub use urls::{detect_urls, host_of};
