// SPDX-License-Identifier: AGPL-3.0-or-later
//! Documents: block splitting, metadata extraction and render entry points

use crate::ast::{Block, BlockKind, DocumentMeta, OutputFormat};
use crate::escape::escape_markup;
use crate::formats::{self, pdf};
use crate::traits::{ConversionError, ParseConfig, RenderConfig, ResourceLoader, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// A parsed document: its blocks in source order and its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
    meta: DocumentMeta,
    /// Whether `blocks[0]` is the metadata comment
    has_meta_block: bool,
    base_dir: PathBuf,
}

impl Document {
    /// Parse markup text.
    ///
    /// When the first block is a comment, each of its lines is read as
    /// `key: value` metadata and the block is left out of rendered output.
    pub fn parse(text: &str, config: &ParseConfig) -> Result<Self> {
        let blocks = split_blocks(text);
        tracing::debug!(blocks = blocks.len(), "document split into blocks");

        let mut meta = DocumentMeta::default();
        let has_meta_block = matches!(blocks.first(), Some(b) if b.kind() == BlockKind::Comment);
        if has_meta_block {
            let block = &blocks[0];
            for line in block.comment_lines()? {
                let (key, value) = line.split_once(':').ok_or_else(|| {
                    ConversionError::malformed(block, format!("metadata line without `:`: {line}"))
                })?;
                meta.insert(key.trim(), value.trim().to_string());
            }
        }

        Ok(Self {
            blocks,
            meta,
            has_meta_block,
            base_dir: config.base_dir.clone(),
        })
    }

    /// Every block, including the metadata comment
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Blocks that are rendered
    pub fn body(&self) -> &[Block] {
        if self.has_meta_block {
            &self.blocks[1..]
        } else {
            &self.blocks
        }
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Title as it appears in `format`: escaped for HTML, XML and blog output
    pub fn title_for(&self, format: OutputFormat) -> Option<Cow<'_, str>> {
        let title = self.meta.title.as_deref()?;
        Some(if format.escapes_title() {
            Cow::Owned(escape_markup(title))
        } else {
            Cow::Borrowed(title)
        })
    }

    /// Like [`Document::title_for`], failing when there is no title
    pub fn require_title(&self, format: OutputFormat) -> Result<Cow<'_, str>> {
        self.title_for(format)
            .ok_or_else(|| ConversionError::MissingMetadata {
                key: "title".to_string(),
            })
    }

    /// Render to a string.
    ///
    /// For [`OutputFormat::Pdf`] this is the HTML before transcoding; use
    /// [`Document::render_bytes`] for the final Latin-1 output.
    pub fn render(
        &self,
        format: OutputFormat,
        config: &RenderConfig,
        loader: &dyn ResourceLoader,
    ) -> Result<String> {
        formats::renderer_for(format).render(self, config, loader)
    }

    /// Render to the bytes written to disk
    pub fn render_bytes(
        &self,
        format: OutputFormat,
        config: &RenderConfig,
        loader: &dyn ResourceLoader,
    ) -> Result<Vec<u8>> {
        let text = self.render(format, config, loader)?;
        match format {
            OutputFormat::Pdf => pdf::transcode(&text, self.meta.encoding_or_default()),
            _ => Ok(text.into_bytes()),
        }
    }

    pub fn to_html(&self, config: &RenderConfig, loader: &dyn ResourceLoader) -> Result<String> {
        self.render(OutputFormat::Html, config, loader)
    }

    pub fn to_pdf(&self, config: &RenderConfig, loader: &dyn ResourceLoader) -> Result<Vec<u8>> {
        self.render_bytes(OutputFormat::Pdf, config, loader)
    }

    pub fn to_xml(&self, config: &RenderConfig, loader: &dyn ResourceLoader) -> Result<String> {
        self.render(OutputFormat::Xml, config, loader)
    }

    pub fn to_blog(&self, config: &RenderConfig, loader: &dyn ResourceLoader) -> Result<String> {
        self.render(OutputFormat::Blog, config, loader)
    }

    pub fn to_markdown(&self, config: &RenderConfig, loader: &dyn ResourceLoader) -> Result<String> {
        self.render(OutputFormat::Markdown, config, loader)
    }
}

/// Split text into blocks at runs of blank lines
pub fn split_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut start = 1;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(Block::new(std::mem::take(&mut current), start));
            }
        } else {
            if current.is_empty() {
                start = index + 1;
            }
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        blocks.push(Block::new(current, start));
    }
    blocks
}
