// SPDX-License-Identifier: AGPL-3.0-or-later
//! Generic XML article output
//!
//! Headers open `<sect>` elements that stay open until a header of the
//! same or a shallower level, or the end of the document, closes them.

use super::{close_sections, comment, escaped_source, list, markup, paragraph};
use crate::ast::{Block, BlockKind, OutputFormat};
use crate::context::RenderContext;
use crate::document::Document;
use crate::escape::escape_markup;
use crate::inline::Flavor;
use crate::traits::{Assembly, RenderConfig, Renderer, ResourceLoader, Result};

/// Public identifier of the article DTD
pub const ARTICLE_DOCTYPE: &str = "<!DOCTYPE article PUBLIC \"-//CAFEBABE//DTD article 1.0//EN\"\n                         \"../dtd/article.dtd\">";

/// XML article handler
pub struct XmlHandler;

impl XmlHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XmlHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for XmlHandler {
    fn format(&self) -> OutputFormat {
        OutputFormat::Xml
    }

    fn render_block(&self, block: &Block, ctx: &mut RenderContext<'_>) -> Result<String> {
        render_block(block, ctx)
    }

    fn page(
        &self,
        doc: &Document,
        assembly: &Assembly,
        config: &RenderConfig,
        _loader: &dyn ResourceLoader,
    ) -> Result<String> {
        let title = doc.require_title(OutputFormat::Xml)?;
        let meta = doc.meta();
        let id = title.replace(' ', "_");
        let attr = |value: &Option<String>| value.clone().unwrap_or_default();

        let mut xml = String::with_capacity(4096);
        xml.push_str(&xml_declaration(meta.encoding_or_default()));
        xml.push_str(ARTICLE_DOCTYPE);
        xml.push_str("\n\n");
        xml.push_str(&format!("<article id=\"{id}\"\n"));
        xml.push_str(&format!("         author=\"{}\"\n", attr(&meta.author)));
        xml.push_str(&format!("         email=\"{}\"\n", attr(&meta.email)));
        xml.push_str(&format!("         date=\"{}\"\n", attr(&meta.date)));
        xml.push_str(&format!("         lang=\"{}\">\n\n", config.lang));
        xml.push_str(&format!(" <title>{title}</title>\n\n"));
        xml.push_str(" <text>\n\n");
        for block in &assembly.blocks {
            xml.push_str(block);
            xml.push('\n');
        }
        close_sections(&mut xml, assembly.header_depth);
        xml.push_str("\n </text>\n\n</article>\n");
        Ok(xml)
    }
}

pub(crate) fn xml_declaration(encoding: &str) -> String {
    format!("<?xml version=\"1.0\" encoding=\"{encoding}\"?>\n")
}

/// Convert one block to XML, shared with blog output
pub(crate) fn render_block(block: &Block, ctx: &mut RenderContext<'_>) -> Result<String> {
    match block.kind() {
        BlockKind::Paragraph => Ok(paragraph(block, Flavor::Xml, ctx)),
        BlockKind::Comment => comment(block),
        BlockKind::Source => Ok(format!("<source>{}</source>", escaped_source(block)?)),
        BlockKind::Reference => {
            let reference = block.reference()?;
            if reference.is_image() {
                Ok(format!("<figure url='{}'></figure>", reference.target))
            } else {
                let source = escape_markup(&ctx.read_relative(reference.target)?);
                Ok(format!("<source>{source}</source>"))
            }
        }
        BlockKind::Header => {
            let heading = block.heading()?;
            let text = markup(heading.text, Flavor::Xml, ctx);
            let closes = ctx.open_section(heading.level);
            Ok(format!(
                "{}<sect><title>{text}</title>",
                "</sect>".repeat(closes)
            ))
        }
        BlockKind::UnorderedList => list(block, Flavor::Xml, ctx, "list", "item"),
        BlockKind::OrderedList => list(block, Flavor::Xml, ctx, "enum", "item"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ConversionError, MemoryLoader, ParseConfig};
    use pretty_assertions::assert_eq;

    fn assemble(text: &str) -> Assembly {
        let doc = Document::parse(text, &ParseConfig::default()).unwrap();
        XmlHandler::new().assemble(&doc, &MemoryLoader::new()).unwrap()
    }

    #[test]
    fn test_paragraph_term() {
        assert_eq!(assemble("+hello+ world").blocks, vec!["<p><term>hello</term> world</p>"]);
    }

    #[test]
    fn test_inline_notes() {
        let assembly = assemble("Fact[source: me]");
        assert_eq!(assembly.blocks, vec!["<p>Fact<note>source: me</note></p>"]);
        assert_eq!(assembly.notes, vec!["source: me"]);
    }

    #[test]
    fn test_section_nesting_balanced() {
        let assembly = assemble("! One\n\n!! Two\n\n!!! Three\n\n!! Two b\n\n! One b");
        assert_eq!(
            assembly.blocks,
            vec![
                "<sect><title>One</title>",
                "<sect><title>Two</title>",
                "<sect><title>Three</title>",
                "</sect></sect><sect><title>Two b</title>",
                "</sect></sect><sect><title>One b</title>",
            ]
        );
        assert_eq!(assembly.header_depth, 1);

        let all = assembly.blocks.concat();
        let opened = all.matches("<sect>").count();
        let closed = all.matches("</sect>").count() + assembly.header_depth;
        assert_eq!(opened, closed);
    }

    #[test]
    fn test_lists_and_figures() {
        assert_eq!(
            assemble("- a\n- b").blocks,
            vec!["<list>\n<item>a</item>\n<item>b</item>\n</list>"]
        );
        assert_eq!(
            assemble("* a").blocks,
            vec!["<enum>\n<item>a</item>\n</enum>"]
        );
        assert_eq!(
            assemble("@ pic.gif").blocks,
            vec!["<figure url='pic.gif'></figure>"]
        );
    }

    #[test]
    fn test_file_reference_is_escaped_source() {
        let doc = Document::parse("@ snippet.c", &ParseConfig::default().with_base_dir("src")).unwrap();
        let loader = MemoryLoader::new().with_file("src/snippet.c", "if (a < b && c) {}");
        let assembly = XmlHandler::new().assemble(&doc, &loader).unwrap();
        assert_eq!(
            assembly.blocks,
            vec!["<source>if (a &lt; b &amp;&amp; c) {}</source>"]
        );
    }

    #[test]
    fn test_page() {
        let doc = Document::parse(
            "# title: A <Doc>\n# author: Jane\n\n! Intro\n\nHello",
            &ParseConfig::default(),
        )
        .unwrap();
        let xml = XmlHandler::new()
            .render(&doc, &RenderConfig::default(), &MemoryLoader::new())
            .unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE article"));
        assert!(xml.contains("<article id=\"A_&lt;Doc&gt;\"\n         author=\"Jane\"\n         email=\"\""));
        assert!(xml.contains("lang=\"fr\">"));
        assert!(xml.contains(" <title>A &lt;Doc&gt;</title>"));
        assert!(xml.ends_with("<sect><title>Intro</title>\n<p>Hello</p>\n</sect>\n\n </text>\n\n</article>\n"));
    }

    #[test]
    fn test_page_requires_title() {
        let doc = Document::parse("Hello", &ParseConfig::default()).unwrap();
        let err = XmlHandler::new()
            .render(&doc, &RenderConfig::default(), &MemoryLoader::new())
            .unwrap_err();
        assert!(matches!(err, ConversionError::MissingMetadata { ref key } if key == "title"));
    }
}
