// SPDX-License-Identifier: AGPL-3.0-or-later
//! Unstyled HTML for PDF printing
//!
//! Printers get no stylesheet, so source listings are framed in a shaded
//! table cell and the page is transcoded to ISO-8859-1.

use super::html::{self, Listing};
use crate::ast::{Block, OutputFormat};
use crate::context::RenderContext;
use crate::document::Document;
use crate::traits::{Assembly, ConversionError, RenderConfig, Renderer, ResourceLoader, Result};
use encoding_rs::Encoding;

/// Charset announced by the page and used for its bytes
pub const PDF_ENCODING: &str = "ISO-8859-1";

/// PDF-oriented HTML handler
pub struct PdfHandler;

impl PdfHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PdfHandler {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn render_block(&self, block: &Block, ctx: &mut RenderContext<'_>) -> Result<String> {
        html::render_block(block, ctx, Listing::Framed)
    }

    fn page(
        &self,
        doc: &Document,
        assembly: &Assembly,
        _config: &RenderConfig,
        _loader: &dyn ResourceLoader,
    ) -> Result<String> {
        let title = doc.title_for(OutputFormat::Pdf);
        let mut page = String::with_capacity(4096);

        page.push_str("<html>\n<head>\n");
        page.push_str(&format!(
            "<meta http-equiv='Content-Type' content='text/html; charset={PDF_ENCODING}'>\n"
        ));
        if let Some(ref title) = title {
            page.push_str(&format!("<title>{title}</title>\n"));
        }
        page.push_str("</head>\n<body>\n");

        html::write_heading(&mut page, title.as_deref(), doc.meta());
        for block in &assembly.blocks {
            page.push_str(block);
            page.push('\n');
        }
        html::write_notes(&mut page, &assembly.notes);

        page.push_str("</body>\n</html>\n");
        Ok(page)
    }
}

/// Encode rendered text as ISO-8859-1.
///
/// `declared` is the document's source encoding; it must be a known label.
/// Every character above U+00FF is rejected, including the ones windows-1252
/// would place in 0x80-0x9F.
pub fn transcode(text: &str, declared: &str) -> Result<Vec<u8>> {
    let source = Encoding::for_label(declared.trim().as_bytes()).ok_or_else(|| {
        ConversionError::EncodingConversion {
            encoding: declared.to_string(),
            message: "unknown source encoding".to_string(),
        }
    })?;
    tracing::debug!(from = source.name(), to = PDF_ENCODING, "transcoding page");

    let mut bytes = Vec::with_capacity(text.len());
    for (offset, character) in text.char_indices() {
        let byte = u8::try_from(u32::from(character)).map_err(|_| {
            ConversionError::EncodingConversion {
                encoding: PDF_ENCODING.to_string(),
                message: format!("character {character:?} at byte {offset} is not representable"),
            }
        })?;
        bytes.push(byte);
    }
    Ok(bytes)
}
