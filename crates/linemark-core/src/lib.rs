// SPDX-License-Identifier: AGPL-3.0-or-later
//! Linemark Core - Block and inline markup engine
//!
//! This crate provides:
//! - A block taxonomy for line-oriented markup, chosen by first character
//! - An inline pipeline for emphasis, links and footnotes
//! - Renderers for HTML, PDF-oriented HTML, XML articles, blog XML and Markdown
//! - File operations for converting documents on disk
//!
//! # Example
//!
//! ```
//! use linemark_core::{Document, MemoryLoader, ParseConfig, RenderConfig};
//!
//! let doc = Document::parse("# title: Notes\n\n+hello+ world", &ParseConfig::default()).unwrap();
//! let html = doc.to_html(&RenderConfig::default(), &MemoryLoader::new()).unwrap();
//! assert!(html.contains("<p><i>hello</i> world</p>"));
//! ```

pub mod ast;
pub mod context;
pub mod document;
pub mod escape;
pub mod file_ops;
pub mod formats;
pub mod inline;
pub mod traits;

pub use ast::{Block, BlockKind, DocumentMeta, LineSpan, OutputFormat, BLOCK_TRIGGERS};
pub use context::RenderContext;
pub use document::Document;
pub use traits::{
    Assembly, ConversionError, FsLoader, MemoryLoader, ParseConfig, RenderConfig, Renderer,
    ResourceLoader, Result,
};
