//! Post-processing of exported pages.
//!
//! After the renderer has exported every page as static HTML, each page gets
//! its critical styles published as stylesheets and linked from its head.
//! Pages with parametric routes cannot exist as static files and are dropped.

use crate::assets::{minify_or_keep, stylesheet_link};
use crate::critical::{extract_critical, strip_inline_style, Placement, StyleCache};
use crate::publish::{CssPublisher, PublishError};

/// Marks a dynamic route segment, as in `/~demos/:id`.
pub const DEFAULT_PARAMETRIC_MARKER: &str = ":";

const HEAD_OPEN: &str = "<head>";
const HEAD_CLOSE: &str = "</head>";

/// An exported page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPage {
    /// Route path or output file path of the page
    pub path: String,
    /// Full HTML document
    pub content: String,
}

impl ExportedPage {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Configuration for export post-processing.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Prefix for stylesheet hrefs
    pub public_path: String,

    /// Pages whose path contains this are dropped
    pub parametric_marker: String,

    /// Minify stylesheets before publishing
    pub minify: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            public_path: "/".to_string(),
            parametric_marker: DEFAULT_PARAMETRIC_MARKER.to_string(),
            minify: false,
        }
    }
}

/// Counters for one post-processing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Pages kept
    pub pages: usize,
    /// Parametric pages dropped
    pub dropped: usize,
    /// Stylesheet links injected
    pub links: usize,
    /// Stylesheets physically written
    pub written: usize,
}

/// Result of post-processing.
#[derive(Debug)]
pub struct ExportOutput {
    /// Kept pages, in input order
    pub pages: Vec<ExportedPage>,
    pub stats: ExportStats,
}

/// Errors that can occur during post-processing.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to publish styles for {page}: {source}")]
    Publish {
        page: String,
        #[source]
        source: PublishError,
    },
}

/// Publishes critical styles for exported pages and links them in.
pub struct ExportProcessor {
    config: ExportConfig,
    publisher: CssPublisher,
    caches: Vec<Box<dyn StyleCache>>,
}

impl ExportProcessor {
    pub fn new(
        config: ExportConfig,
        publisher: CssPublisher,
        caches: Vec<Box<dyn StyleCache>>,
    ) -> Self {
        Self {
            config,
            publisher,
            caches,
        }
    }

    /// Check if a page path names a parametric route.
    pub fn is_parametric(&self, path: &str) -> bool {
        !self.config.parametric_marker.is_empty() && path.contains(&self.config.parametric_marker)
    }

    /// Process exported pages.
    ///
    /// A failed stylesheet write aborts the whole run: a page linking a
    /// missing stylesheet would render unstyled.
    pub fn process(&self, pages: Vec<ExportedPage>) -> Result<ExportOutput, ExportError> {
        let mut stats = ExportStats::default();
        let mut kept = Vec::with_capacity(pages.len());

        for mut page in pages {
            if self.is_parametric(&page.path) {
                tracing::debug!("Dropping parametric page {}", page.path);
                stats.dropped += 1;
                continue;
            }

            self.process_page(&mut page, &mut stats)?;
            stats.pages += 1;
            kept.push(page);
        }

        tracing::info!(
            "Processed {} pages ({} parametric dropped), {} stylesheet links, {} new stylesheets",
            stats.pages,
            stats.dropped,
            stats.links,
            stats.written
        );

        Ok(ExportOutput { pages: kept, stats })
    }

    fn process_page(
        &self,
        page: &mut ExportedPage,
        stats: &mut ExportStats,
    ) -> Result<(), ExportError> {
        let fragments = extract_critical(&page.content, &self.caches);
        if fragments.is_empty() {
            return Ok(());
        }

        let mut head_start = String::new();
        let mut head_end = String::new();
        let mut linked = Vec::with_capacity(fragments.len());

        for fragment in &fragments {
            let css = if self.config.minify {
                minify_or_keep(&fragment.css)
            } else {
                fragment.css.clone()
            };

            let published = self
                .publisher
                .publish(&fragment.cache_key, &fragment.rule_ids, &css)
                .map_err(|source| ExportError::Publish {
                    page: page.path.clone(),
                    source,
                })?;
            if published.written {
                stats.written += 1;
            }

            let (marker, links) = match fragment.placement {
                Placement::Prepend => (HEAD_OPEN, &mut head_start),
                Placement::Append => (HEAD_CLOSE, &mut head_end),
            };
            // Without a place for the link, the inline styles stay
            if !page.content.contains(marker) {
                tracing::warn!(
                    "No {} in {}, keeping inline styles of '{}'",
                    marker,
                    page.path,
                    fragment.cache_key
                );
                continue;
            }
            linked.push(fragment);

            let href = format!(r#"href="{}{}""#, self.config.public_path, published.file_name);
            if page.content.contains(&href) {
                tracing::debug!("{} already links {}", page.path, published.file_name);
                continue;
            }
            links.push_str(&stylesheet_link(&self.config.public_path, &published.file_name));
            stats.links += 1;
        }

        for fragment in linked {
            page.content = strip_inline_style(&page.content, fragment);
        }
        insert_at_marker(&mut page.content, &head_start, HEAD_OPEN, true);
        insert_at_marker(&mut page.content, &head_end, HEAD_CLOSE, false);

        Ok(())
    }
}

/// Insert text next to the first occurrence of a marker.
fn insert_at_marker(content: &mut String, text: &str, marker: &str, after: bool) {
    if text.is_empty() {
        return;
    }
    if let Some(pos) = content.find(marker) {
        let at = if after { pos + marker.len() } else { pos };
        content.insert_str(at, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical::{RuleCache, StyleRule};
    use std::fs;
    use tempfile::tempdir;

    const PAGE: &str = r#"<html><head><title>Button</title></head><body><button class="btn">Go</button></body></html>"#;

    fn cache(key: &str, priority: bool, class_name: &str, css: &str) -> Box<dyn StyleCache> {
        Box::new(RuleCache {
            key: key.to_string(),
            priority,
            rules: vec![StyleRule {
                id: format!("{key}-1"),
                class_name: class_name.to_string(),
                css: css.to_string(),
            }],
        })
    }

    fn processor(out: &std::path::Path, caches: Vec<Box<dyn StyleCache>>) -> ExportProcessor {
        ExportProcessor::new(ExportConfig::default(), CssPublisher::new(out), caches)
    }

    #[test]
    fn drops_parametric_pages() {
        let temp = tempdir().unwrap();
        let processor = processor(temp.path(), vec![]);
        let pages = vec![
            ExportedPage::new("index.html", PAGE),
            ExportedPage::new("~demos/:id/index.html", PAGE),
            ExportedPage::new("components/button/index.html", PAGE),
            ExportedPage::new(":lang/index.html", PAGE),
        ];

        let output = processor.process(pages).unwrap();

        assert_eq!(output.pages.len(), 2);
        assert_eq!(output.stats.dropped, 2);
        assert!(output.pages.iter().all(|p| !p.path.contains(':')));
        assert_eq!(output.pages[0].path, "index.html");
        assert_eq!(output.pages[1].path, "components/button/index.html");
    }

    #[test]
    fn links_critical_styles_before_head_close() {
        let temp = tempdir().unwrap();
        let processor = processor(temp.path(), vec![cache("css", false, "btn", ".btn{padding:4px}")]);

        let output = processor.process(vec![ExportedPage::new("index.html", PAGE)]).unwrap();

        let file_name = CssPublisher::file_name("css", &["css-1".to_string()]);
        let expected = format!(r#"<title>Button</title><link rel="stylesheet" href="/{file_name}"></head>"#);
        assert!(output.pages[0].content.contains(&expected));
        assert_eq!(
            fs::read_to_string(temp.path().join(&file_name)).unwrap(),
            ".btn{padding:4px}"
        );
        assert_eq!(output.stats.links, 1);
        assert_eq!(output.stats.written, 1);
    }

    #[test]
    fn priority_styles_follow_head_open() {
        let temp = tempdir().unwrap();
        let processor = processor(
            temp.path(),
            vec![
                cache("css", false, "btn", ".btn{}"),
                cache("token", true, "btn", ":root{--c:red}"),
                cache("vars", true, "btn", ":root{--d:blue}"),
            ],
        );

        let output = processor.process(vec![ExportedPage::new("index.html", PAGE)]).unwrap();
        let html = &output.pages[0].content;

        let token = CssPublisher::file_name("token", &["token-1".to_string()]);
        let vars = CssPublisher::file_name("vars", &["vars-1".to_string()]);
        let css = CssPublisher::file_name("css", &["css-1".to_string()]);
        assert!(html.starts_with(&format!(
            r#"<html><head><link rel="stylesheet" href="/{token}"><link rel="stylesheet" href="/{vars}"><title>"#
        )));
        assert!(html.contains(&format!(r#"<link rel="stylesheet" href="/{css}"></head>"#)));
        assert_eq!(output.stats.links, 3);
    }

    #[test]
    fn shared_styles_publish_once() {
        let temp = tempdir().unwrap();
        let processor = processor(temp.path(), vec![cache("css", false, "btn", ".btn{}")]);
        let pages = vec![
            ExportedPage::new("a.html", PAGE),
            ExportedPage::new("b.html", PAGE),
        ];

        let output = processor.process(pages).unwrap();

        assert_eq!(output.stats.links, 2);
        assert_eq!(output.stats.written, 1);
        assert_eq!(output.pages[0].content, output.pages[1].content);
    }

    #[test]
    fn pages_without_critical_styles_are_untouched() {
        let temp = tempdir().unwrap();
        let processor = processor(temp.path(), vec![cache("css", false, "card", ".card{}")]);

        let output = processor.process(vec![ExportedPage::new("index.html", PAGE)]).unwrap();

        assert_eq!(output.pages[0].content, PAGE);
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_head_leaves_page_unmodified() {
        let temp = tempdir().unwrap();
        let processor = processor(temp.path(), vec![cache("css", false, "btn", ".btn{}")]);
        let fragment = r#"<div class="btn"></div>"#;

        let output = processor.process(vec![ExportedPage::new("partial.html", fragment)]).unwrap();

        assert_eq!(output.pages[0].content, fragment);
        assert_eq!(output.stats.links, 0);
    }

    #[test]
    fn missing_head_keeps_inline_styles() {
        let temp = tempdir().unwrap();
        let processor = processor(temp.path(), vec![cache("css", false, "btn", ".btn{}")]);
        let fragment = r#"<style data-style-key="css css-1">.btn{}</style><div class="btn"></div>"#;

        let output = processor.process(vec![ExportedPage::new("partial.html", fragment)]).unwrap();

        assert_eq!(output.pages[0].content, fragment);
        assert_eq!(output.stats.links, 0);
    }

    #[test]
    fn processing_twice_adds_no_duplicate_links() {
        let temp = tempdir().unwrap();
        let processor = processor(temp.path(), vec![cache("css", false, "btn", ".btn{}")]);

        let first = processor.process(vec![ExportedPage::new("index.html", PAGE)]).unwrap();
        let second = processor.process(first.pages.clone()).unwrap();

        assert_eq!(second.pages[0].content, first.pages[0].content);
        assert_eq!(second.pages[0].content.matches("<link ").count(), 1);
        assert_eq!(first.stats.links, 1);
        assert_eq!(second.stats.links, 0);
        assert_eq!(second.stats.written, 0);
    }

    #[test]
    fn replaces_inline_styles_with_links() {
        let temp = tempdir().unwrap();
        let processor = processor(temp.path(), vec![cache("css", false, "btn", ".btn{}")]);
        let html = r#"<html><head><style data-style-key="css css-1">.btn{}</style></head><body class="btn"></body></html>"#;

        let output = processor.process(vec![ExportedPage::new("index.html", html)]).unwrap();

        let content = &output.pages[0].content;
        assert!(!content.contains("<style"));
        assert!(content.contains(r#"<link rel="stylesheet" href="/style-css."#));
    }

    #[test]
    fn uses_public_path_and_minifies() {
        let temp = tempdir().unwrap();
        let config = ExportConfig {
            public_path: "/docs/".to_string(),
            minify: true,
            ..Default::default()
        };
        let processor = ExportProcessor::new(
            config,
            CssPublisher::new(temp.path()),
            vec![cache("css", false, "btn", ".btn {\n  color: red;\n}\n")],
        );

        let output = processor.process(vec![ExportedPage::new("index.html", PAGE)]).unwrap();

        let file_name = CssPublisher::file_name("css", &["css-1".to_string()]);
        assert!(output.pages[0]
            .content
            .contains(&format!(r#"href="/docs/{file_name}""#)));
        assert_eq!(
            fs::read_to_string(temp.path().join(file_name)).unwrap(),
            ".btn{color:red}"
        );
    }

    #[test]
    fn write_failures_abort() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("dist");
        fs::write(&blocker, "not a directory").unwrap();
        let processor = processor(&blocker, vec![cache("css", false, "btn", ".btn{}")]);

        let result = processor.process(vec![ExportedPage::new("index.html", PAGE)]);

        assert!(matches!(result, Err(ExportError::Publish { .. })));
    }
}
