//! Demo preview metadata command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use sheen_mdx::{generate_preview_props, DemoSource, Passthrough, PreviewProps};

/// Run the preview command.
pub fn run(demo: Option<PathBuf>, doc: Option<PathBuf>, code: Option<String>) -> Result<()> {
    let props = preview_props(demo, doc, code)?;
    let json = serde_json::to_string_pretty(&props).context("Failed to serialize preview props")?;
    println!("{json}");
    Ok(())
}

fn preview_props(
    demo: Option<PathBuf>,
    doc: Option<PathBuf>,
    code: Option<String>,
) -> Result<PreviewProps> {
    let source = match (demo, code) {
        (Some(demo), _) => {
            let file_abs_path = std::path::absolute(&demo)
                .with_context(|| format!("Failed to resolve {}", demo.display()))?;
            // Without an embedding document there is no locale to pick
            let md_abs_path = match doc {
                Some(doc) => std::path::absolute(&doc)
                    .with_context(|| format!("Failed to resolve {}", doc.display()))?,
                None => file_abs_path.clone(),
            };
            DemoSource::ExternalDemoFile {
                file_abs_path,
                md_abs_path,
            }
        }
        (None, Some(entry_point_code)) => DemoSource::InlineCodeBlock { entry_point_code },
        (None, None) => anyhow::bail!("Pass either --demo or --code"),
    };

    Ok(generate_preview_props(
        PreviewProps::default(),
        &source,
        &Passthrough,
    )?)
}
