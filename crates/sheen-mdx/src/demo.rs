//! Preview metadata for demos.
//!
//! The site renderer asks for preview props once per demo. Demos are either
//! written inline as a code block inside a document, or live in their own
//! source file next to a companion markdown file carrying per-locale
//! descriptions and a custom stylesheet (see [`crate::blocks`]).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::blocks::parse_blocks;

/// Where a demo's code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoSource {
    /// Code written inline in a document's code block.
    InlineCodeBlock { entry_point_code: String },

    /// Code in its own file, embedded by a document.
    ExternalDemoFile {
        /// Path of the demo source file
        file_abs_path: PathBuf,
        /// Path of the document embedding the demo (e.g. `index.zh-CN.md`)
        md_abs_path: PathBuf,
    },
}

/// Props handed to the renderer's previewer component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewProps {
    /// Demo title, as provided by the renderer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Localized description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Custom stylesheet for the demo
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Transformed demo source shown in the code panel
    pub jsx: String,
}

/// Errors that can occur while transforming demo source.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Failed to transform demo source: {0}")]
    Transform(String),
}

/// Transforms demo source before it is shown (e.g. TypeScript to JavaScript).
pub trait SourceTransformer {
    fn transform(&self, source: &str) -> Result<String, TransformError>;
}

/// Leaves source untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl SourceTransformer for Passthrough {
    fn transform(&self, source: &str) -> Result<String, TransformError> {
        Ok(source.to_string())
    }
}

/// Locale named by a document's file name.
///
/// Takes the second-to-last dot-separated segment: `index.zh-CN.md` yields
/// `zh-CN`. Names with fewer than three segments carry no locale.
pub fn locale_from_path(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let segments: Vec<&str> = name.split('.').collect();
    if segments.len() < 3 {
        return None;
    }
    let locale = segments[segments.len() - 2];
    (!locale.is_empty()).then_some(locale)
}

/// Augment the renderer's base props with metadata for a demo.
///
/// Missing companion files read as empty. When the companion markdown is
/// non-empty, its locale block replaces the description and its style block
/// replaces the style.
pub fn generate_preview_props(
    mut props: PreviewProps,
    source: &DemoSource,
    transformer: &dyn SourceTransformer,
) -> Result<PreviewProps, TransformError> {
    match source {
        DemoSource::InlineCodeBlock { entry_point_code } => {
            props.jsx = if entry_point_code.is_empty() {
                String::new()
            } else {
                transformer.transform(entry_point_code)?
            };
        }
        DemoSource::ExternalDemoFile {
            file_abs_path,
            md_abs_path,
        } => {
            let code = read_or_empty(&file_abs_path.with_extension("tsx"));
            props.jsx = transformer.transform(&code)?;

            let md = read_or_empty(&file_abs_path.with_extension("md"));
            if !md.is_empty() {
                let blocks = parse_blocks(&md);
                props.description = locale_from_path(md_abs_path)
                    .and_then(|locale| blocks.get(locale))
                    .map(str::to_string);
                props.style = blocks.style().map(str::to_string);
            }
        }
    }

    Ok(props)
}

fn read_or_empty(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Companion file {} unreadable: {}", path.display(), e);
            String::new()
        }
    }
}
