//! Critical style extraction.
//!
//! Style caches collect every rule generated while rendering a site. For a
//! single page only the rules the page actually references matter; those are
//! its critical styles.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Attribute identifying an inline `<style>` tag rendered for a style cache.
pub const STYLE_KEY_ATTR: &str = "data-style-key";

/// Where a cache's stylesheet link goes in the page head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Before `</head>` (default)
    #[default]
    Append,
    /// Right after `<head>`, for token and variable styles every other
    /// stylesheet builds on
    Prepend,
}

/// Rules a cache contributes to one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriticalStyles {
    /// Concatenated CSS text of the referenced rules
    pub css: String,
    /// Identifiers of the referenced rules, in cache order
    pub ids: Vec<String>,
}

/// A collection of generated style rules.
pub trait StyleCache {
    /// Key identifying this cache; part of published file names.
    fn key(&self) -> &str;

    fn placement(&self) -> Placement {
        Placement::Append
    }

    /// Rules from this cache referenced by the given page HTML.
    fn extract_critical(&self, html: &str) -> CriticalStyles;
}

/// Critical styles of one cache on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleFragment {
    pub cache_key: String,
    pub css: String,
    pub rule_ids: Vec<String>,
    pub placement: Placement,
}

/// Extract the critical style fragments of a page.
///
/// Fragments come out in cache order. Caches contributing no CSS produce no
/// fragment, and a cache key seen earlier on the page is skipped.
pub fn extract_critical(html: &str, caches: &[Box<dyn StyleCache>]) -> Vec<StyleFragment> {
    let mut seen = HashSet::new();
    let mut fragments = Vec::new();

    for cache in caches {
        let key = cache.key();
        if !seen.insert(key.to_string()) {
            tracing::debug!("Skipping repeated style cache '{}'", key);
            continue;
        }

        let critical = cache.extract_critical(html);
        if critical.css.is_empty() {
            continue;
        }

        fragments.push(StyleFragment {
            cache_key: key.to_string(),
            css: critical.css,
            rule_ids: critical.ids,
            placement: cache.placement(),
        });
    }

    fragments
}

/// Render the inline `<style>` tag server rendering emits for a fragment.
pub fn inline_style_tag(fragment: &StyleFragment) -> String {
    format!(
        r#"<style {}="{}">{}</style>"#,
        STYLE_KEY_ATTR,
        style_key_value(fragment),
        fragment.css
    )
}

/// Remove the inline `<style>` tag of a fragment from page HTML.
///
/// Tags are matched by their identity attribute, not their content.
pub fn strip_inline_style(html: &str, fragment: &StyleFragment) -> String {
    let open = format!(r#"<style {}="{}">"#, STYLE_KEY_ATTR, style_key_value(fragment));

    let Some(start) = html.find(&open) else {
        return html.to_string();
    };
    let Some(close) = html[start..].find("</style>") else {
        return html.to_string();
    };

    let end = start + close + "</style>".len();
    let mut stripped = String::with_capacity(html.len() - (end - start));
    stripped.push_str(&html[..start]);
    stripped.push_str(&html[end..]);
    stripped
}

fn style_key_value(fragment: &StyleFragment) -> String {
    let mut value = fragment.cache_key.clone();
    for id in &fragment.rule_ids {
        value.push(' ');
        value.push_str(id);
    }
    value
}

/// A style cache loaded from a serialized rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCache {
    pub key: String,

    /// Link ahead of every other stylesheet
    #[serde(default)]
    pub priority: bool,

    #[serde(default)]
    pub rules: Vec<StyleRule>,
}

/// A single generated rule and the class name that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    pub id: String,
    pub class_name: String,
    pub css: String,
}

impl StyleCache for RuleCache {
    fn key(&self) -> &str {
        &self.key
    }

    fn placement(&self) -> Placement {
        if self.priority {
            Placement::Prepend
        } else {
            Placement::Append
        }
    }

    fn extract_critical(&self, html: &str) -> CriticalStyles {
        let classes = page_classes(html);
        let mut ids_seen = HashSet::new();
        let mut critical = CriticalStyles::default();

        for rule in &self.rules {
            if !classes.contains(rule.class_name.as_str()) || !ids_seen.insert(rule.id.as_str()) {
                continue;
            }
            critical.css.push_str(&rule.css);
            critical.ids.push(rule.id.clone());
        }

        critical
    }
}

/// Every class name used in a `class` attribute of the page.
fn page_classes(html: &str) -> HashSet<&str> {
    static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?i)\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid class regex")
    });

    CLASS_ATTR
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .flat_map(|m| m.as_str().split_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(id: &str, class_name: &str, css: &str) -> StyleRule {
        StyleRule {
            id: id.to_string(),
            class_name: class_name.to_string(),
            css: css.to_string(),
        }
    }

    fn button_cache() -> RuleCache {
        RuleCache {
            key: "css".to_string(),
            priority: false,
            rules: vec![
                rule("a1", "btn", ".btn{padding:4px}"),
                rule("b2", "btn-primary", ".btn-primary{color:blue}"),
                rule("c3", "card", ".card{margin:0}"),
            ],
        }
    }

    struct Fixed(&'static str, &'static str);

    impl StyleCache for Fixed {
        fn key(&self) -> &str {
            self.0
        }

        fn extract_critical(&self, _html: &str) -> CriticalStyles {
            CriticalStyles {
                css: self.1.to_string(),
                ids: vec!["x".to_string()],
            }
        }
    }

    #[test]
    fn rule_cache_keeps_referenced_rules() {
        let html = r#"<body><button class="btn btn-primary">Go</button></body>"#;

        let critical = button_cache().extract_critical(html);

        assert_eq!(critical.css, ".btn{padding:4px}.btn-primary{color:blue}");
        assert_eq!(critical.ids, vec!["a1", "b2"]);
    }

    #[test]
    fn reads_single_quoted_classes() {
        let critical = button_cache().extract_critical("<div class='card'></div>");
        assert_eq!(critical.ids, vec!["c3"]);
    }

    #[test]
    fn class_names_match_whole_tokens() {
        let critical = button_cache().extract_critical(r#"<div class="btn-primaryx"></div>"#);
        assert!(critical.css.is_empty());
    }

    #[test]
    fn extract_skips_unused_caches() {
        let caches: Vec<Box<dyn StyleCache>> = vec![
            Box::new(button_cache()),
            Box::new(Fixed("empty", "")),
            Box::new(Fixed("token", ":root{--c:red}")),
        ];

        let fragments = extract_critical(r#"<p class="card"></p>"#, &caches);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].cache_key, "css");
        assert_eq!(fragments[0].rule_ids, vec!["c3"]);
        assert_eq!(fragments[1].cache_key, "token");
    }

    #[test]
    fn extract_emits_each_key_once() {
        let caches: Vec<Box<dyn StyleCache>> = vec![
            Box::new(Fixed("token", ":root{--a:1}")),
            Box::new(Fixed("token", ":root{--b:2}")),
        ];

        let fragments = extract_critical("<html></html>", &caches);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].css, ":root{--a:1}");
    }

    #[test]
    fn priority_caches_prepend() {
        let mut cache = button_cache();
        assert_eq!(cache.placement(), Placement::Append);
        cache.priority = true;
        assert_eq!(cache.placement(), Placement::Prepend);
    }

    #[test]
    fn strips_matching_inline_tag() {
        let fragment = StyleFragment {
            cache_key: "css".to_string(),
            css: ".btn{padding:4px}".to_string(),
            rule_ids: vec!["a1".to_string()],
            placement: Placement::Append,
        };
        let tag = inline_style_tag(&fragment);
        assert_eq!(tag, r#"<style data-style-key="css a1">.btn{padding:4px}</style>"#);

        let html = format!("<head>{tag}<style data-style-key=\"other\">x</style></head>");
        let stripped = strip_inline_style(&html, &fragment);

        assert_eq!(stripped, r#"<head><style data-style-key="other">x</style></head>"#);
    }

    #[test]
    fn keeps_html_without_matching_tag() {
        let fragment = StyleFragment {
            cache_key: "css".to_string(),
            css: ".btn{}".to_string(),
            rule_ids: vec!["a1".to_string(), "a2".to_string()],
            placement: Placement::Append,
        };
        let html = r#"<head><style data-style-key="css a1">.btn{}</style><style data-style-key="css a1 a2">.btn{}"#;

        assert_eq!(strip_inline_style(html, &fragment), html);
        assert_eq!(strip_inline_style("<head></head>", &fragment), "<head></head>");
    }

    #[test]
    fn deserializes_rule_cache() {
        let json = r#"{"key":"antd","priority":true,"rules":[{"id":"r1","className":"ant-btn","css":".ant-btn{}"}]}"#;

        let cache: RuleCache = serde_json::from_str(json).unwrap();

        assert_eq!(cache.key, "antd");
        assert!(cache.priority);
        assert_eq!(cache.rules[0].class_name, "ant-btn");
    }
}
