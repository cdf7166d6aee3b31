//! Export post-processing command.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use walkdir::WalkDir;

use sheen_static::{CssPublisher, ExportProcessor, ExportedPage, RuleCache, StyleCache};

use crate::config::Config;

/// Command-line overrides for the export command.
#[derive(Debug, Default)]
pub struct ExportOptions {
    pub dir: Option<PathBuf>,
    pub styles: Option<PathBuf>,
    pub public_path: Option<String>,
    pub minify: bool,
}

/// Run the export command.
///
/// Rewrites the exported HTML pages in place, publishes their critical
/// stylesheets next to them and removes pages of parametric routes.
pub fn run(config: &Config, options: ExportOptions) -> Result<()> {
    let start = Instant::now();

    let dir = options.dir.unwrap_or_else(|| config.output_dir());
    if !dir.is_dir() {
        anyhow::bail!(
            "Directory not found: {}. Export the site first.",
            dir.display()
        );
    }

    let styles = options
        .styles
        .unwrap_or_else(|| config.resolve(&config.file.export.style_caches));
    let caches = load_caches(&styles)?;

    let mut export_config = config.export_config();
    if let Some(public_path) = options.public_path {
        export_config.public_path = public_path;
    }
    export_config.minify |= options.minify;

    let pages = read_pages(&dir)?;
    tracing::info!("Post-processing {} pages in {}", pages.len(), dir.display());

    let processor = ExportProcessor::new(export_config, CssPublisher::new(&dir), caches);
    let parametric: Vec<PathBuf> = pages
        .iter()
        .filter(|page| processor.is_parametric(&page.path))
        .map(|page| dir.join(&page.path))
        .collect();

    let output = processor.process(pages)?;

    output.pages.par_iter().try_for_each(|page| -> Result<()> {
        let path = dir.join(&page.path);
        fs::write(&path, &page.content)
            .with_context(|| format!("Failed to write {}", path.display()))
    })?;

    for path in &parametric {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
        tracing::debug!("Removed parametric page {}", path.display());
    }

    tracing::info!(
        "Linked {} stylesheets ({} new) across {} pages in {}ms",
        output.stats.links,
        output.stats.written,
        output.stats.pages,
        start.elapsed().as_millis()
    );

    Ok(())
}

/// Load the style caches collected during rendering.
///
/// A missing file means the renderer collected no styles.
fn load_caches(path: &Path) -> Result<Vec<Box<dyn StyleCache>>> {
    if !path.exists() {
        tracing::warn!("Style caches not found: {}", path.display());
        return Ok(Vec::new());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let caches: Vec<RuleCache> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded {} style caches from {}", caches.len(), path.display());

    Ok(caches
        .into_iter()
        .map(|cache| Box::new(cache) as Box<dyn StyleCache>)
        .collect())
}

/// Read every HTML page under the export directory, ordered by path.
fn read_pages(dir: &Path) -> Result<Vec<ExportedPage>> {
    let paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("html"))
        .collect();

    let mut pages = paths
        .par_iter()
        .map(|path| -> Result<ExportedPage> {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(ExportedPage::new(page_path(dir, path), content))
        })
        .collect::<Result<Vec<_>>>()?;

    pages.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(pages)
}

/// Page path relative to the export directory, with `/` separators.
fn page_path(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
