//! Content-addressed stylesheet publishing.
//!
//! A critical stylesheet is named after its cache key and a short hash of the
//! rule ids it holds, so the same set of rules always lands in the same file
//! and pages sharing styles share one download.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Number of hash bytes in a published file name (two hex chars each).
const SHORT_HASH_BYTES: usize = 4;

/// A stylesheet published to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedFile {
    /// File name relative to the output directory
    pub file_name: String,

    /// Whether this call wrote the file (false when it already existed)
    pub written: bool,
}

/// Errors that can occur while publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to write stylesheet {path}: {source}")]
    Write { path: String, source: io::Error },
}

/// Writes critical stylesheets into a build output directory.
#[derive(Debug, Clone)]
pub struct CssPublisher {
    output_dir: PathBuf,
}

impl CssPublisher {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for a cache's rule set: `style-<key>.<hash>.css`.
    ///
    /// The hash covers the rule ids joined in the given order.
    pub fn file_name(cache_key: &str, rule_ids: &[String]) -> String {
        format!("style-{}.{}.css", cache_key, short_hash(&rule_ids.concat()))
    }

    /// Publish a stylesheet, writing it only if no file of that name exists.
    ///
    /// Existing files are trusted and never overwritten, so repeated builds
    /// into the same directory write each distinct rule set once.
    pub fn publish(
        &self,
        cache_key: &str,
        rule_ids: &[String],
        css: &str,
    ) -> Result<PublishedFile, PublishError> {
        let file_name = Self::file_name(cache_key, rule_ids);
        let path = self.output_dir.join(&file_name);

        if path.exists() {
            tracing::debug!("Stylesheet {} already published", file_name);
            return Ok(PublishedFile {
                file_name,
                written: false,
            });
        }

        let write_err = |source| PublishError::Write {
            path: path.display().to_string(),
            source,
        };
        fs::create_dir_all(&self.output_dir).map_err(write_err)?;
        fs::write(&path, css).map_err(write_err)?;
        tracing::debug!("Published stylesheet {}", file_name);

        Ok(PublishedFile {
            file_name,
            written: true,
        })
    }
}

/// First four bytes of the SHA-256 digest, hex-encoded.
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..SHORT_HASH_BYTES])
}
