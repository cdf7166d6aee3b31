//! Stylesheet text processing.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

/// Minify CSS using lightningcss.
pub fn minify_css(css: &str) -> Result<String, String> {
    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| format!("CSS parse error: {}", e))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| format!("CSS minify error: {}", e))?;

    Ok(minified.code)
}

/// Minify CSS, keeping the original text if it cannot be parsed.
pub fn minify_or_keep(css: &str) -> String {
    match minify_css(css) {
        Ok(minified) => minified,
        Err(e) => {
            tracing::warn!("Publishing unminified CSS: {}", e);
            css.to_string()
        }
    }
}

/// Stylesheet link element for a published file.
pub fn stylesheet_link(public_path: &str, file_name: &str) -> String {
    format!(r#"<link rel="stylesheet" href="{}{}">"#, public_path, file_name)
}
