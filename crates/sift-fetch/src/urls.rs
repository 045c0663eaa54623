//! URL detection in free-form chat text
//!
//! Picks up explicit `http(s)://` links and bare domains such as
//! `example.com/docs`. Bare domains only count when their last label is one
//! of [`BARE_DOMAIN_TLDS`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Top-level domains accepted without a scheme
pub const BARE_DOMAIN_TLDS: [&str; 9] = ["com", "io", "ai", "org", "net", "co", "tw", "dev", "app"];

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let url_chars = r"[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]";
    let label = r"[a-z0-9](?:[a-z0-9-]*[a-z0-9])?";
    let pattern = format!(
        r"(?i)(https?://{chars}+)|({label}(?:\.{label})*\.[a-z]{{2,}})(/{chars}*)?",
        chars = url_chars,
        label = label,
    );
    Regex::new(&pattern).unwrap_or_else(|_| unreachable!())
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'];

/// Find every link in `text`, in order of appearance, without duplicates
///
/// Bare domains get an `https://` prefix. Trailing punctuation that belongs
/// to the sentence rather than the link is dropped.
///
/// # Examples
///
/// ```
/// use sift_fetch::detect_urls;
///
/// let urls = detect_urls("see https://a.example.org/x, and docs.rs.dev!");
/// assert_eq!(urls, vec!["https://a.example.org/x", "https://docs.rs.dev"]);
/// ```
pub fn detect_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for caps in URL_PATTERN.captures_iter(text) {
        let candidate = if let Some(explicit) = caps.get(1) {
            explicit.as_str().to_string()
        } else if let Some(domain) = caps.get(2) {
            if text[..domain.start()].ends_with('@') {
                continue;
            }
            let tld = domain
                .as_str()
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !BARE_DOMAIN_TLDS.contains(&tld.as_str()) {
                continue;
            }
            let path = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
            format!("https://{}{}", domain.as_str(), path)
        } else {
            continue;
        };

        let trimmed = candidate.trim_end_matches(TRAILING_PUNCTUATION);
        if trimmed.ends_with("://") {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            urls.push(trimmed.to_string());
        }
    }

    urls
}

/// Host name of `url` without a leading `www.`; the input itself when it
/// does not parse
pub fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_explicit_links() {
        let urls = detect_urls("first https://example.com/a?b=1 then http://foo.test/x.");
        assert_eq!(urls, vec!["https://example.com/a?b=1", "http://foo.test/x"]);
    }

    #[test]
    fn test_bare_domains_get_https() {
        let urls = detect_urls("推薦 figma.com 和 notion.so 還有 huggingface.co/models");
        assert_eq!(urls, vec!["https://figma.com", "https://huggingface.co/models"]);
    }

    #[test]
    fn test_bare_domain_next_to_cjk_text() {
        let urls = detect_urls("請看example.ai這個工具");
        assert_eq!(urls, vec!["https://example.ai"]);
    }

    #[test]
    fn test_duplicates_removed_order_kept() {
        let urls = detect_urls("b.io a.io b.io https://a.io");
        assert_eq!(urls, vec!["https://b.io", "https://a.io"]);
    }

    #[test]
    fn test_emails_and_filenames_ignored() {
        assert!(detect_urls("mail me at someone@example.com").is_empty());
        assert!(detect_urls("open report.pdf and main.rs").is_empty());
        assert!(detect_urls("version 1.2.3").is_empty());
    }

    #[test]
    fn test_no_urls() {
        assert!(detect_urls("明天下午三點開會").is_empty());
        assert!(detect_urls("").is_empty());
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://www.example.com/path"), "example.com");
        assert_eq!(host_of("https://docs.rs"), "docs.rs");
        assert_eq!(host_of("not a url"), "not a url");
    }

    proptest! {
        #[test]
        fn prop_detected_urls_are_unique_and_schemed(text in "[a-z .:/]{0,80}") {
            let urls = detect_urls(&text);
            let unique: HashSet<_> = urls.iter().collect();
            prop_assert_eq!(unique.len(), urls.len());
            for url in &urls {
                prop_assert!(url.starts_with("http://") || url.starts_with("https://"));
            }
        }
    }
}
