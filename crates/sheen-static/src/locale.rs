//! Locale-specific URL paths.
//!
//! The site has a default locale served at plain paths and a second locale
//! served at the same paths with a suffix: `/components/button` and
//! `/components/button-cn`. The home page of the second locale is
//! `/index-cn`.

/// Naming scheme for second-locale paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleScheme {
    /// Suffix appended after a dash (`cn` for `-cn`)
    pub suffix: String,
    /// Name of the home page in suffixed form (`index` for `/index-cn`)
    pub index: String,
}

impl Default for LocaleScheme {
    fn default() -> Self {
        Self {
            suffix: "cn".to_string(),
            index: "index".to_string(),
        }
    }
}

impl LocaleScheme {
    pub fn new(suffix: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            index: index.into(),
        }
    }

    /// Check if a path is already in the suffixed locale.
    ///
    /// True when the path ends with `-<suffix>`, optionally followed by `/`.
    pub fn is_localized(&self, path: &str) -> bool {
        let path = path.strip_suffix('/').unwrap_or(path);
        path.strip_suffix(self.suffix.as_str())
            .is_some_and(|rest| rest.ends_with('-'))
    }

    /// Canonical path for a locale.
    ///
    /// Resolving an already canonical path returns it unchanged.
    pub fn resolve(&self, path: &str, localized: bool) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        if localized {
            self.to_localized(path)
        } else {
            self.to_default(path)
        }
    }

    /// Like [`resolve`](Self::resolve), keeping any `?query` and `#hash`.
    pub fn resolve_url(&self, url: &str, localized: bool) -> String {
        let split = url.find(['?', '#']).unwrap_or(url.len());
        let (path, rest) = url.split_at(split);
        let mut resolved = self.resolve(path, localized);
        resolved.push_str(rest);
        resolved
    }

    fn to_localized(&self, path: String) -> String {
        if self.is_localized(&path) {
            return path;
        }
        if self.is_home(&path) {
            return format!("/{}-{}", self.index, self.suffix);
        }
        match path.strip_suffix('/') {
            Some(trimmed) => format!("{}-{}/", trimmed, self.suffix),
            None => format!("{}-{}", path, self.suffix),
        }
    }

    fn to_default(&self, mut path: String) -> String {
        let marker = format!("-{}", self.suffix);
        let marker_slash = format!("{marker}/");

        // Doubly suffixed paths lose every suffix
        loop {
            if path.ends_with(&marker_slash) {
                path.truncate(path.len() - marker_slash.len());
                path.push('/');
            } else if path.ends_with(&marker) {
                path.truncate(path.len() - marker.len());
            } else {
                break;
            }
        }

        if path.is_empty() || self.is_home(&path) {
            return "/".to_string();
        }
        path
    }

    fn is_home(&self, path: &str) -> bool {
        let trimmed = path.trim_end_matches('/');
        trimmed.is_empty() || trimmed.strip_prefix('/') == Some(self.index.as_str())
    }
}
