//! Demo companion markdown parsing.
//!
//! This crate segments a demo's companion markdown into per-locale
//! descriptions and a custom stylesheet, and builds the preview props the
//! site renderer shows next to each demo.

pub mod blocks;
pub mod codeblock;
pub mod demo;

pub use blocks::{parse_blocks, Blocks, STYLE_BLOCK};
pub use codeblock::Language;
pub use demo::{
    generate_preview_props, locale_from_path, DemoSource, Passthrough, PreviewProps,
    SourceTransformer, TransformError,
};
