//! HTML → `WebsiteContent` extraction
//!
//! Parsing never fails: missing pieces fall back along fixed chains and end
//! at the host name (for the title) or the empty string.

use scraper::{ElementRef, Html, Node, Selector};
use sift_domain::WebsiteContent;

/// Elements whose text never counts as page content
const NOISE_ELEMENTS: [&str; 9] = [
    "script", "style", "noscript", "nav", "header", "footer", "aside", "iframe", "svg",
];

/// Headings and navigation labels kept per page
pub const MAX_OUTLINE_ITEMS: usize = 10;

/// Shortest paragraph accepted as a description fallback
const MIN_PARAGRAPH_CHARS: usize = 40;

/// Build a `WebsiteContent` from page markup
pub fn parse_page(url: &str, host: &str, markup: &str, excerpt_chars: usize) -> WebsiteContent {
    let document = Html::parse_document(markup);

    let title = first_text(&document, "title")
        .or_else(|| first_text(&document, "h1"))
        .or_else(|| meta_content(&document, r#"meta[property="og:title"]"#))
        .or_else(|| meta_content(&document, r#"meta[name="twitter:title"]"#))
        .unwrap_or_else(|| host.to_string());

    let description = meta_content(&document, r#"meta[name="description"]"#)
        .or_else(|| meta_content(&document, r#"meta[property="og:description"]"#))
        .or_else(|| meta_content(&document, r#"meta[name="twitter:description"]"#))
        .or_else(|| first_substantial_paragraph(&document))
        .unwrap_or_default();

    let keywords = meta_content(&document, r#"meta[name="keywords"]"#).unwrap_or_default();

    let author = meta_content(&document, r#"meta[name="author"]"#)
        .or_else(|| meta_content(&document, r#"meta[property="article:author"]"#))
        .unwrap_or_default();

    let body_text = body_text(&document);

    WebsiteContent {
        url: url.to_string(),
        host: host.to_string(),
        title,
        description,
        keywords,
        author,
        raw_content_excerpt: truncate_chars(&body_text, excerpt_chars),
        headings: collect_texts(&document, "h1, h2, h3"),
        nav_links: collect_texts(&document, "nav a"),
    }
}

/// Cut `text` to at most `max` characters on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|t| !t.is_empty())
}

fn first_substantial_paragraph(document: &Html) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|t| t.chars().count() >= MIN_PARAGRAPH_CHARS)
}

fn collect_texts(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    let mut items: Vec<String> = Vec::new();
    for text in document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
    {
        if !text.is_empty() && !items.contains(&text) {
            items.push(text);
        }
        if items.len() == MAX_OUTLINE_ITEMS {
            break;
        }
    }
    items
}

fn body_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next())
        .unwrap_or_else(|| document.root_element());

    let mut buffer = String::new();
    push_visible_text(root, &mut buffer);
    collapse_whitespace(&buffer)
}

fn push_visible_text(element: ElementRef<'_>, buffer: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                buffer.push_str(text);
                buffer.push(' ');
            }
            Node::Element(el) if !NOISE_ELEMENTS.contains(&el.name()) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    push_visible_text(child_ref, buffer);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head>
            <title>  Example   Tool </title>
            <meta name="description" content="A tool for examples">
            <meta name="keywords" content="ai, tools">
            <meta property="article:author" content="Jane">
            <script>var hidden = "script text";</script>
            <style>.x { color: red }</style>
          </head>
          <body>
            <header>Site header</header>
            <nav><a href="/a">Docs</a><a href="/b">Pricing</a><a href="/a">Docs</a></nav>
            <h1>Welcome</h1>
            <h2>Features</h2>
            <p>Visible   body text.</p>
            <aside>sidebar</aside>
            <footer>footer text</footer>
          </body>
        </html>"#;

    #[test]
    fn test_parse_full_page() {
        let content = parse_page("https://example.com", "example.com", PAGE, 1200);
        assert_eq!(content.title, "Example Tool");
        assert_eq!(content.description, "A tool for examples");
        assert_eq!(content.keywords, "ai, tools");
        assert_eq!(content.author, "Jane");
        assert_eq!(content.headings, vec!["Welcome", "Features"]);
        assert_eq!(content.nav_links, vec!["Docs", "Pricing"]);
    }

    #[test]
    fn test_noise_is_stripped_from_body() {
        let content = parse_page("https://example.com", "example.com", PAGE, 1200);
        let body = &content.raw_content_excerpt;
        assert!(body.contains("Visible body text."));
        for noise in ["script text", "color: red", "Site header", "sidebar", "footer text", "Pricing"] {
            assert!(!body.contains(noise), "{} leaked into {}", noise, body);
        }
    }

    #[test]
    fn test_title_fallback_chain() {
        let og = r#"<html><head><meta property="og:title" content="OG Title"></head><body></body></html>"#;
        assert_eq!(parse_page("u", "h.com", og, 100).title, "OG Title");

        let h1 = r#"<html><body><h1>Heading</h1></body></html>"#;
        assert_eq!(parse_page("u", "h.com", h1, 100).title, "Heading");

        let bare = "<html><body></body></html>";
        assert_eq!(parse_page("u", "h.com", bare, 100).title, "h.com");
    }

    #[test]
    fn test_description_falls_back_to_paragraph() {
        let page = r#"<html><body><p>short</p><p>This paragraph is long enough to describe the page.</p></body></html>"#;
        let content = parse_page("u", "h.com", page, 100);
        assert_eq!(content.description, "This paragraph is long enough to describe the page.");
    }

    #[test]
    fn test_excerpt_truncation_is_char_safe() {
        let page = format!("<html><body><p>{}</p></body></html>", "中文".repeat(50));
        let content = parse_page("u", "h.com", &page, 7);
        assert_eq!(content.raw_content_excerpt.chars().count(), 7);
    }

    #[test]
    fn test_outline_is_capped() {
        let headings: String = (0..15).map(|i| format!("<h2>Section {}</h2>", i)).collect();
        let page = format!("<html><body>{}</body></html>", headings);
        let content = parse_page("u", "h.com", &page, 100);
        assert_eq!(content.headings.len(), MAX_OUTLINE_ITEMS);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
