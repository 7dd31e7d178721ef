// SPDX-License-Identifier: AGPL-3.0-or-later
//! Markdown output
//!
//! Nothing is escaped. Footnotes stay inline as `N[body]` markers.

use crate::ast::{Block, BlockKind, OutputFormat};
use crate::context::RenderContext;
use crate::document::Document;
use crate::inline::{transform, Flavor};
use crate::traits::{Assembly, RenderConfig, Renderer, ResourceLoader, Result};

/// Markdown format handler
pub struct MarkdownHandler;

impl MarkdownHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn fenced(content: &str) -> String {
    format!("```\n{content}\n```")
}

impl Renderer for MarkdownHandler {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn render_block(&self, block: &Block, ctx: &mut RenderContext<'_>) -> Result<String> {
        match block.kind() {
            BlockKind::Paragraph => Ok(transform(&block.lines().join(" "), Flavor::Markdown, ctx)),
            BlockKind::Comment => Ok(block
                .comment_lines()?
                .into_iter()
                .map(|line| format!("% {line}"))
                .collect::<Vec<_>>()
                .join("\n")),
            BlockKind::Source => Ok(fenced(&block.source_lines()?.join("\n"))),
            BlockKind::Reference => {
                let reference = block.reference()?;
                if reference.is_image() {
                    Ok(format!("![]({})", reference.target))
                } else {
                    Ok(fenced(&ctx.read_relative(reference.target)?))
                }
            }
            BlockKind::Header => {
                let heading = block.heading()?;
                ctx.set_depth(heading.level);
                Ok(format!("{} {}", "#".repeat(heading.level), heading.text))
            }
            BlockKind::UnorderedList => Ok(block
                .list_items()?
                .iter()
                .map(|item| format!("- {}", transform(&item.joined(), Flavor::Markdown, ctx)))
                .collect::<Vec<_>>()
                .join("\n")),
            BlockKind::OrderedList => Ok(block
                .list_items()?
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    format!("{}. {}", i + 1, transform(&item.joined(), Flavor::Markdown, ctx))
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn page(
        &self,
        _doc: &Document,
        assembly: &Assembly,
        _config: &RenderConfig,
        _loader: &dyn ResourceLoader,
    ) -> Result<String> {
        let mut output = String::new();
        for block in &assembly.blocks {
            output.push_str(block);
            output.push_str("\n\n");
        }
        Ok(output)
    }
}
