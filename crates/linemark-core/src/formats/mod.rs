// SPDX-License-Identifier: AGPL-3.0-or-later
//! Renderers for each output format

pub mod blog;
pub mod html;
pub mod markdown;
pub mod pdf;
pub mod xml;

pub use blog::BlogHandler;
pub use html::HtmlHandler;
pub use markdown::MarkdownHandler;
pub use pdf::PdfHandler;
pub use xml::XmlHandler;

use crate::ast::{Block, OutputFormat};
use crate::context::RenderContext;
use crate::escape::{escape_comment, escape_markup};
use crate::inline::{transform, Flavor};
use crate::traits::{Renderer, Result};

/// Renderer for an output format
pub fn renderer_for(format: OutputFormat) -> &'static dyn Renderer {
    match format {
        OutputFormat::Html => &HtmlHandler,
        OutputFormat::Pdf => &PdfHandler,
        OutputFormat::Xml => &XmlHandler,
        OutputFormat::Blog => &BlogHandler,
        OutputFormat::Markdown => &MarkdownHandler,
    }
}

/// Escape then inline-transform a piece of text
pub(crate) fn markup(text: &str, flavor: Flavor, ctx: &mut RenderContext<'_>) -> String {
    transform(&escape_markup(text), flavor, ctx)
}

/// Paragraph lines, newlines kept, wrapped in `<p>`
pub(crate) fn paragraph(block: &Block, flavor: Flavor, ctx: &mut RenderContext<'_>) -> String {
    format!("<p>{}</p>", markup(&block.lines().join("\n"), flavor, ctx))
}

/// HTML comment holding the comment lines, shared by HTML and XML output
pub(crate) fn comment(block: &Block) -> Result<String> {
    let text = block
        .comment_lines()?
        .into_iter()
        .map(escape_comment)
        .collect::<Vec<_>>()
        .join("\n");
    Ok(format!("<!--\n{text}\n-->"))
}

/// De-indented, escaped source lines
pub(crate) fn escaped_source(block: &Block) -> Result<String> {
    Ok(block
        .source_lines()?
        .into_iter()
        .map(escape_markup)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// List items wrapped in `list_tag`, one `item_tag` element per line.
///
/// Each physical line is escaped and transformed on its own, then joined to
/// its item with a space.
pub(crate) fn list(
    block: &Block,
    flavor: Flavor,
    ctx: &mut RenderContext<'_>,
    list_tag: &str,
    item_tag: &str,
) -> Result<String> {
    let mut output = format!("<{list_tag}>\n");
    for item in block.list_items()? {
        let text = item
            .segments
            .iter()
            .map(|segment| markup(segment, flavor, ctx))
            .collect::<Vec<_>>()
            .join(" ");
        output.push_str(&format!("<{item_tag}>{text}</{item_tag}>\n"));
    }
    output.push_str(&format!("</{list_tag}>"));
    Ok(output)
}

/// XML `<sect>` closing tags, one per line
pub(crate) fn close_sections(output: &mut String, count: usize) {
    for _ in 0..count {
        output.push_str("</sect>\n");
    }
}
