// SPDX-License-Identifier: AGPL-3.0-or-later
//! Renderer traits, configuration and the conversion error type

use crate::ast::{Block, BlockKind, LineSpan, OutputFormat};
use crate::document::Document;
use crate::context::RenderContext;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while parsing or rendering a document
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A block does not have the shape its kind requires
    #[error("malformed {kind} block at {lines}: {message}")]
    MalformedBlock {
        kind: BlockKind,
        lines: LineSpan,
        message: String,
    },

    /// The template needs a metadata key the document does not define
    #[error("missing metadata key `{key}`")]
    MissingMetadata { key: String },

    /// A referenced file or stylesheet could not be read
    #[error("cannot read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Output cannot be represented in the target encoding
    #[error("cannot convert to {encoding}: {message}")]
    EncodingConversion { encoding: String, message: String },

    /// A list line without a marker appears before the first item
    #[error("{kind} block at {lines}: continuation line {line} comes before any item")]
    ListContinuation {
        kind: BlockKind,
        lines: LineSpan,
        line: usize,
    },
}

impl ConversionError {
    pub(crate) fn malformed(block: &Block, message: impl Into<String>) -> Self {
        ConversionError::MalformedBlock {
            kind: block.kind(),
            lines: block.span(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Configuration for parsing
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Directory that reference blocks are resolved against
    pub base_dir: PathBuf,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }
}

impl ParseConfig {
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }
}

/// Configuration for rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Stylesheets linked or embedded in the HTML page
    pub stylesheets: Vec<PathBuf>,
    /// Inline stylesheet contents instead of linking them
    pub embed_stylesheets: bool,
    /// Language attribute of XML articles
    pub lang: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            stylesheets: Vec::new(),
            embed_stylesheets: true,
            lang: "fr".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn with_stylesheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.stylesheets.push(path.into());
        self
    }

    pub fn with_embed_stylesheets(mut self, embed: bool) -> Self {
        self.embed_stylesheets = embed;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

/// Source of the files that reference blocks and stylesheets point to
pub trait ResourceLoader {
    fn read_text(&self, path: &Path) -> io::Result<String>;
}

/// Reads resources from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl ResourceLoader for FsLoader {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory resources, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl ResourceLoader for MemoryLoader {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path.display()))
        })
    }
}

/// Read a resource, naming the path on failure
pub(crate) fn load(loader: &dyn ResourceLoader, path: &Path) -> Result<String> {
    loader
        .read_text(path)
        .map_err(|source| ConversionError::FileRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Blocks and footnotes collected by one render pass, ready for a page template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    /// Rendered blocks in source order
    pub blocks: Vec<String>,
    /// Footnote bodies, numbered from 1
    pub notes: Vec<String>,
    /// Sections left open after the last block
    pub header_depth: usize,
}

/// Trait for output format renderers
pub trait Renderer {
    /// Returns the format this renderer produces
    fn format(&self) -> OutputFormat;

    /// Convert one block
    fn render_block(&self, block: &Block, ctx: &mut RenderContext<'_>) -> Result<String>;

    /// Wrap the collected blocks in the format's page chrome
    fn page(
        &self,
        doc: &Document,
        assembly: &Assembly,
        config: &RenderConfig,
        loader: &dyn ResourceLoader,
    ) -> Result<String>;

    /// Render every body block with a fresh context, then apply the page template
    fn assemble(&self, doc: &Document, loader: &dyn ResourceLoader) -> Result<Assembly> {
        let mut ctx = RenderContext::new(doc.base_dir(), loader);
        tracing::debug!(
            format = %self.format(),
            blocks = doc.body().len(),
            "starting render pass"
        );
        let blocks = doc
            .body()
            .iter()
            .map(|block| self.render_block(block, &mut ctx))
            .collect::<Result<Vec<_>>>()?;
        let (notes, header_depth) = ctx.finish();
        Ok(Assembly {
            blocks,
            notes,
            header_depth,
        })
    }

    /// Render a document to a string
    fn render(
        &self,
        doc: &Document,
        config: &RenderConfig,
        loader: &dyn ResourceLoader,
    ) -> Result<String> {
        let assembly = self.assemble(doc, loader)?;
        self.page(doc, &assembly, config, loader)
    }
}
