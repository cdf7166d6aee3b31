//! Write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'sheen export' after your site has been rendered.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Sheen Configuration

[site]
# Directory holding the exported site
output = "dist"

# Prefix for stylesheet links
public_path = "/"

[locale]
# Second-locale paths end with -<suffix>, e.g. /components/button-cn
suffix = "cn"

# Home page of the second locale: /<index>-<suffix>
index = "index"

[export]
# Pages whose path contains this are parametric and get removed
parametric_marker = ":"

# Minify published stylesheets
minify = false

# Style caches collected while rendering
style_caches = "style-caches.json"

# Extra pages outside the docs directory
# [[routes]]
# id = "changelog"
# path = "changelog"
# absPath = "/changelog"
# parentId = "DocLayout"
# file = "CHANGELOG.en-US.md"
"#;
