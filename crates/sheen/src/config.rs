//! Configuration file (sheen.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sheen_static::export::DEFAULT_PARAMETRIC_MARKER;
use sheen_static::{ExportConfig, LocaleScheme, RouteEntry};

/// Default config file name.
pub const CONFIG_FILE: &str = "sheen.toml";

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub export: ExportSettings,
    /// Pages registered by hand, outside the docs directory
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_public_path")]
    pub public_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            public_path: default_public_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocaleConfig {
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_index")]
    pub index: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            index: default_index(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_parametric_marker")]
    pub parametric_marker: String,
    #[serde(default)]
    pub minify: bool,
    /// JSON file with the style caches collected during rendering
    #[serde(default = "default_style_caches")]
    pub style_caches: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            parametric_marker: default_parametric_marker(),
            minify: false,
            style_caches: default_style_caches(),
        }
    }
}

fn default_output() -> String {
    "dist".to_string()
}
fn default_public_path() -> String {
    "/".to_string()
}
fn default_suffix() -> String {
    "cn".to_string()
}
fn default_index() -> String {
    "index".to_string()
}
fn default_parametric_marker() -> String {
    DEFAULT_PARAMETRIC_MARKER.to_string()
}
fn default_style_caches() -> String {
    "style-caches.json".to_string()
}

/// A loaded configuration and the directory it was loaded from.
#[derive(Debug)]
pub struct Config {
    pub file: ConfigFile,
    /// Directory relative paths in the config resolve against
    pub base_dir: PathBuf,
}

impl Config {
    /// Load configuration if the file exists.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base_dir = std::path::absolute(&base_dir)
            .with_context(|| format!("Failed to resolve {}", base_dir.display()))?;

        if !path.exists() {
            tracing::debug!("No {}, using defaults", path.display());
            return Ok(Self {
                file: ConfigFile::default(),
                base_dir,
            });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file = parse(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());

        Ok(Self { file, base_dir })
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.file.site.output)
    }

    pub fn locale_scheme(&self) -> LocaleScheme {
        LocaleScheme::new(&self.file.locale.suffix, &self.file.locale.index)
    }

    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            public_path: self.file.site.public_path.clone(),
            parametric_marker: self.file.export.parametric_marker.clone(),
            minify: self.file.export.minify,
        }
    }

    /// Extra routes with their files made absolute.
    pub fn extra_routes(&self) -> Vec<RouteEntry> {
        self.file
            .routes
            .iter()
            .cloned()
            .map(|route| route.with_base(&self.base_dir))
            .collect()
    }
}

fn parse(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}
