//! Block segmentation for demo companion markdown.
//!
//! A demo's companion markdown holds one section per locale, introduced by a
//! level-2 heading naming the locale, and optionally a stylesheet introduced by
//! a CSS code fence or an inline `<style>` tag:
//!
//! ````markdown
//! ## en-US
//! Primary and default buttons.
//!
//! ## zh-CN
//! 主按钮和默认按钮。
//!
//! ```css
//! .demo-button { margin: 8px; }
//! ```
//! ````
//!
//! This is a line scanner, not a markdown parser: anything that is not a
//! block opener belongs to the block in progress.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::codeblock::opens_style_fence;

/// Reserved block name for stylesheet content.
pub const STYLE_BLOCK: &str = "style";

/// Named text blocks parsed from one markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocks {
    blocks: HashMap<String, String>,
}

impl Blocks {
    /// Body text of the block with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.blocks.get(name).map(String::as_str)
    }

    /// Stylesheet text, with fence and `<style>` markers removed.
    pub fn style(&self) -> Option<&str> {
        self.get(STYLE_BLOCK)
    }

    /// Check if a block with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    /// Number of blocks, including an unnamed leading block if present.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over `(name, text)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn flush(&mut self, name: &str, lines: &[&str]) {
        if lines.is_empty() {
            return;
        }

        let text = if name == STYLE_BLOCK {
            strip_style_markers(&lines.join("\n"))
        } else {
            lines[1..].join("\n")
        };

        // Repeated names: the later block wins
        self.blocks.insert(name.to_string(), text);
    }
}

/// Segment a markdown document into named blocks.
///
/// Never fails. Content before the first opener lands in a block named `""`,
/// which is not a valid locale and is ignored by lookups for real names.
pub fn parse_blocks(markdown: &str) -> Blocks {
    let mut blocks = Blocks::default();
    let mut current_name = String::new();
    let mut current_lines: Vec<&str> = Vec::new();

    for line in markdown.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        match block_name(line) {
            Some(name) => {
                blocks.flush(&current_name, &current_lines);
                current_name = name;
                current_lines.clear();
                current_lines.push(line);
            }
            None => current_lines.push(line),
        }
    }

    blocks.flush(&current_name, &current_lines);
    blocks
}

/// Name of the block a line opens, if it opens one.
fn block_name(line: &str) -> Option<String> {
    if let Some(rest) = line.strip_prefix("## ") {
        return Some(rest.trim().to_string());
    }
    if opens_style_fence(line) || opens_style_tag(line) {
        return Some(STYLE_BLOCK.to_string());
    }
    None
}

fn opens_style_tag(line: &str) -> bool {
    let Some(rest) = line.trim_start().strip_prefix("<style") else {
        return false;
    };
    rest.starts_with('>') || rest.starts_with(char::is_whitespace)
}

/// Remove code fence lines and `<style>` tags, each with the newline after it.
fn strip_style_markers(text: &str) -> String {
    static FENCE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^ {0,3}(?:`{3,}|~{3,})[^\n]*\n?").expect("Invalid fence regex")
    });
    static STYLE_TAG: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)</?style(?:\s[^>]*)?>\n?").expect("Invalid style tag regex")
    });

    let text = FENCE.replace_all(text, "");
    STYLE_TAG.replace_all(&text, "").into_owned()
}
