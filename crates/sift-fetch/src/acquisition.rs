//! Content acquisition
//!
//! `fetch_one` and `fetch_many` never fail. Anything that goes wrong
//! between the request and the parsed page yields a stub built from the
//! host name, so downstream analysis always has something to work with.

use crate::config::FetchConfig;
use crate::fetcher::HttpFetcher;
use crate::html::parse_page;
use crate::urls::host_of;
use crate::FetchError;
use futures::stream::{self, StreamExt};
use sift_domain::traits::PageFetcher;
use sift_domain::WebsiteContent;
use tracing::{debug, warn};

/// Turns links into `WebsiteContent`
pub struct ContentAcquirer<F> {
    fetcher: F,
    config: FetchConfig,
}

impl ContentAcquirer<HttpFetcher> {
    /// Acquirer backed by the real HTTP fetcher
    pub fn http(config: FetchConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: PageFetcher> ContentAcquirer<F> {
    /// Create an acquirer around any fetcher
    pub fn new(fetcher: F, config: FetchConfig) -> Self {
        Self { fetcher, config }
    }

    /// Active configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch and parse one page; a stub on any failure
    pub async fn fetch_one(&self, url: &str) -> WebsiteContent {
        let host = host_of(url);
        match self.fetcher.fetch(url).await {
            Ok(markup) => {
                let content = parse_page(url, &host, &markup, self.config.excerpt_chars);
                debug!(url, title = %content.title, "Page parsed");
                content
            }
            Err(e) => {
                warn!(url, error = %e, "Fetch failed, using host stub");
                WebsiteContent::stub(url, host)
            }
        }
    }

    /// Fetch several pages with bounded concurrency
    ///
    /// The output has one entry per input link (after the `max_urls` cap),
    /// in input order.
    pub async fn fetch_many(&self, urls: &[String]) -> Vec<WebsiteContent> {
        let limit = self.config.max_urls;
        if urls.len() > limit {
            warn!(requested = urls.len(), limit, "Too many links, extra ones dropped");
        }

        stream::iter(urls.iter().take(limit))
            .map(|url| self.fetch_one(url))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Serves canned markup; unknown URLs fail. Earlier URLs answer later so
    /// completion order differs from input order.
    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        type Error = String;

        async fn fetch(&self, url: &str) -> Result<String, Self::Error> {
            let delay = 50u64.saturating_sub(url.len() as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| format!("no page for {}", url))
        }
    }

    fn acquirer(pages: &[(&str, &str)]) -> ContentAcquirer<StubFetcher> {
        let pages = pages
            .iter()
            .map(|(u, m)| (u.to_string(), m.to_string()))
            .collect();
        ContentAcquirer::new(StubFetcher { pages }, FetchConfig::default())
    }

    #[tokio::test]
    async fn test_fetch_one_parses_page() {
        let acq = acquirer(&[(
            "https://www.example.com/",
            "<html><head><title>Example</title></head><body>hi</body></html>",
        )]);
        let content = acq.fetch_one("https://www.example.com/").await;
        assert_eq!(content.title, "Example");
        assert_eq!(content.host, "example.com");
        assert_eq!(content.raw_content_excerpt, "hi");
    }

    #[tokio::test]
    async fn test_fetch_one_failure_yields_stub() {
        let acq = acquirer(&[]);
        let content = acq.fetch_one("https://missing.dev/page").await;
        assert_eq!(content.url, "https://missing.dev/page");
        assert_eq!(content.title, "missing.dev");
        assert!(content.is_stub());
    }

    #[tokio::test]
    async fn test_fetch_many_preserves_order_and_length() {
        let acq = acquirer(&[
            ("https://a.io", "<title>A</title>"),
            ("https://ccc.io/long/path", "<title>C</title>"),
        ]);
        let urls = vec![
            "https://a.io".to_string(),
            "https://bb.io/broken".to_string(),
            "https://ccc.io/long/path".to_string(),
        ];

        let contents = acq.fetch_many(&urls).await;
        let titles: Vec<_> = contents.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "bb.io", "C"]);
        for (content, url) in contents.iter().zip(&urls) {
            assert_eq!(&content.url, url);
        }
    }

    #[tokio::test]
    async fn test_fetch_many_caps_url_count() {
        let mut acq = acquirer(&[]);
        acq.config.max_urls = 3;
        let urls: Vec<String> = (0..5).map(|i| format!("https://s{}.io", i)).collect();
        assert_eq!(acq.fetch_many(&urls).await.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_many_empty() {
        let acq = acquirer(&[]);
        assert!(acq.fetch_many(&[]).await.is_empty());
    }
}
