//! Code fence detection.

/// Language named by a code fence info string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    Css,
    Less,
    Scss,
    Sass,
    #[default]
    Unknown,
}

impl Language {
    /// Parse language from code fence info string.
    pub fn from_info(info: &str) -> Self {
        let lang = info.split_whitespace().next().unwrap_or("");
        match lang.to_lowercase().as_str() {
            "css" => Self::Css,
            "less" => Self::Less,
            "scss" => Self::Scss,
            "sass" => Self::Sass,
            _ => Self::Unknown,
        }
    }

    /// Check if this language holds stylesheet text.
    pub fn is_style(&self) -> bool {
        matches!(self, Self::Css | Self::Less | Self::Scss | Self::Sass)
    }
}

/// Info string of a fence opener line, if the line opens a fence.
///
/// Accepts backtick and tilde fences of three or more characters, with up to
/// three spaces of indentation.
pub fn fence_info(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = rest.len() - rest.trim_start_matches(marker).len();
    if run < 3 {
        return None;
    }
    Some(rest[run..].trim())
}

/// Check if a line opens a fenced code block holding stylesheet text.
pub fn opens_style_fence(line: &str) -> bool {
    fence_info(line).is_some_and(|info| Language::from_info(info).is_style())
}
