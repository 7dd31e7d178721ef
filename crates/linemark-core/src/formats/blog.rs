// SPDX-License-Identifier: AGPL-3.0-or-later
//! Blog entry output: XML blocks in a flat `weblog` envelope

use super::close_sections;
use super::xml::{self, xml_declaration};
use crate::ast::{Block, OutputFormat};
use crate::context::RenderContext;
use crate::document::Document;
use crate::traits::{Assembly, RenderConfig, Renderer, ResourceLoader, Result};
use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

pub const WEBLOG_DOCTYPE: &str = "<!DOCTYPE weblog PUBLIC \"-//CAFEBABE//DTD weblog 1.0//EN\"\n                        \"../dtd/weblog.dtd\">";

/// Blog format handler
pub struct BlogHandler;

impl BlogHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BlogHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for BlogHandler {
    fn format(&self) -> OutputFormat {
        OutputFormat::Blog
    }

    fn render_block(&self, block: &Block, ctx: &mut RenderContext<'_>) -> Result<String> {
        xml::render_block(block, ctx)
    }

    fn page(
        &self,
        doc: &Document,
        assembly: &Assembly,
        _config: &RenderConfig,
        _loader: &dyn ResourceLoader,
    ) -> Result<String> {
        let title = doc.require_title(OutputFormat::Blog)?;
        let meta = doc.meta();
        let id = entry_id(&title);

        let mut out = String::with_capacity(4096);
        out.push_str(&xml_declaration(meta.encoding_or_default()));
        out.push_str(WEBLOG_DOCTYPE);
        out.push_str("\n\n");
        out.push_str(&format!("<weblog id=\"{id}\"\n"));
        out.push_str(&format!(
            "        date=\"{}\">\n\n",
            meta.date.as_deref().unwrap_or_default()
        ));
        out.push_str(&format!(" <title>{title}</title>\n\n"));
        for block in &assembly.blocks {
            out.push_str(block);
            out.push('\n');
        }
        close_sections(&mut out, assembly.header_depth);
        out.push_str("\n</weblog>\n");
        Ok(out)
    }
}

/// Entry id: the title with every non-word character replaced by `_`
pub fn entry_id(title: &str) -> String {
    NON_WORD.replace_all(title, "_").into_owned()
}
