// SPDX-License-Identifier: AGPL-3.0-or-later
//! Styled HTML page output

use super::{comment, escaped_source, list, markup, paragraph};
use crate::ast::{Block, BlockKind, DocumentMeta, OutputFormat};
use crate::context::RenderContext;
use crate::document::Document;
use crate::escape::escape_markup;
use crate::inline::Flavor;
use crate::traits::{load, Assembly, RenderConfig, Renderer, ResourceLoader, Result};

/// HTML format handler
pub struct HtmlHandler;

impl HtmlHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// How source listings are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Listing {
    /// Bare `<pre>`, styled by the stylesheet
    Plain,
    /// `<pre>` inside a shaded table cell, for unstyled output
    Framed,
}

impl Listing {
    fn wrap(&self, source: &str) -> String {
        match self {
            Listing::Plain => format!("<pre>{source}</pre>"),
            Listing::Framed => format!(
                "<table width='100%' border='0' cellpadding='10'><tr>\
                 <td bgcolor='#F0F0F0'><pre>{source}</pre>\
                 </td></tr></table><p></p>"
            ),
        }
    }
}

impl Renderer for HtmlHandler {
    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn render_block(&self, block: &Block, ctx: &mut RenderContext<'_>) -> Result<String> {
        render_block(block, ctx, Listing::Plain)
    }

    fn page(
        &self,
        doc: &Document,
        assembly: &Assembly,
        config: &RenderConfig,
        loader: &dyn ResourceLoader,
    ) -> Result<String> {
        let meta = doc.meta();
        let title = doc.title_for(OutputFormat::Html);
        let mut html = String::with_capacity(4096);

        html.push_str("<html>\n<head>\n");
        html.push_str(&format!(
            "<meta http-equiv='Content-Type' content='text/html; charset={}'>\n",
            meta.encoding_or_default()
        ));
        if let Some(ref title) = title {
            html.push_str(&format!("<title>{title}</title>\n"));
        }
        for stylesheet in &config.stylesheets {
            if config.embed_stylesheets {
                let css = load(loader, stylesheet)?;
                html.push_str(&format!(
                    "<style type='text/css' media='screen'>\n<!--\n{css}\n-->\n</style>\n"
                ));
            } else {
                html.push_str(&format!(
                    "<link rel='stylesheet' type='text/css' href='{}'>\n",
                    stylesheet.display()
                ));
            }
        }
        html.push_str("</head>\n");
        html.push_str("<body marginwidth=\"10\" marginheight=\"10\" bgcolor=\"#213449\">\n");
        html.push_str("<table class=\"page\" width=\"700\" height=\"100%\" align=\"center\">\n");
        html.push_str("<tr class=\"page\" valign=\"top\">\n<td class=\"page\">\n");

        write_heading(&mut html, title.as_deref(), meta);
        for block in &assembly.blocks {
            html.push_str(block);
            html.push('\n');
        }
        write_notes(&mut html, &assembly.notes);

        html.push_str("</td></tr></table>\n</body>\n</html>\n");
        Ok(html)
    }
}

/// Convert one block to HTML
pub(crate) fn render_block(
    block: &Block,
    ctx: &mut RenderContext<'_>,
    listing: Listing,
) -> Result<String> {
    match block.kind() {
        BlockKind::Paragraph => Ok(paragraph(block, Flavor::Html, ctx)),
        BlockKind::Comment => comment(block),
        BlockKind::Source => Ok(listing.wrap(&escaped_source(block)?)),
        BlockKind::Reference => {
            let reference = block.reference()?;
            if reference.is_image() {
                Ok(format!("<center><p><img src='{}'></p></center>", reference.target))
            } else {
                let source = escape_markup(&ctx.read_relative(reference.target)?);
                Ok(match listing {
                    Listing::Plain => format!("<p>{}</p>", listing.wrap(&source)),
                    Listing::Framed => listing.wrap(&source),
                })
            }
        }
        BlockKind::Header => {
            let heading = block.heading()?;
            let level = heading.level + 1;
            let text = markup(heading.text, Flavor::Html, ctx);
            let name = heading.text.replace(' ', "_");
            Ok(format!("<a name='{name}'><h{level}>{text}</h{level}></a>"))
        }
        BlockKind::UnorderedList => list(block, Flavor::Html, ctx, "ul", "li"),
        BlockKind::OrderedList => list(block, Flavor::Html, ctx, "ol", "li"),
    }
}

/// Centered title and author credit
pub(crate) fn write_heading(html: &mut String, title: Option<&str>, meta: &DocumentMeta) {
    if let Some(title) = title {
        html.push_str(&format!("<center><h1>{title}</h1></center>\n"));
    }
    if let Some(ref author) = meta.author {
        html.push_str("<center>\n<i>\n<font size=\"-2\">\n");
        html.push_str(&format!("&copy; {author}\n"));
        if let Some(ref email) = meta.email {
            html.push_str(&format!("(<a href=\"mailto:{email}\">{email}</a>)\n"));
        }
        html.push_str("</font>\n</i>\n</center>\n<br>\n<br>\n");
    }
}

/// Footnote table linking back to each reference
pub(crate) fn write_notes(html: &mut String, notes: &[String]) {
    if notes.is_empty() {
        return;
    }
    html.push_str("<hr noshade='true' size='1'>\n");
    html.push_str("<table class=\"note\" width=\"100%\">\n");
    for (i, note) in notes.iter().enumerate() {
        let n = i + 1;
        html.push_str("<tr class=\"note\">\n");
        html.push_str("<td class=\"note\" align=\"left\" valign=\"top\">\n");
        html.push_str(&format!("<a href='#source{n}' name='note{n}'>[{n}]</a>\n"));
        html.push_str("</td>\n");
        html.push_str("<td class=\"note\" align=\"left\" valign=\"top\" width=\"100%\">\n");
        html.push_str(&format!("{note}\n"));
        html.push_str("</td>\n</tr>\n");
    }
    html.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MemoryLoader, ParseConfig};
    use pretty_assertions::assert_eq;

    fn render(text: &str) -> String {
        let doc = Document::parse(text, &ParseConfig::default()).unwrap();
        HtmlHandler::new()
            .render(&doc, &RenderConfig::default(), &MemoryLoader::new())
            .unwrap()
    }

    fn body(text: &str) -> Vec<String> {
        let doc = Document::parse(text, &ParseConfig::default()).unwrap();
        HtmlHandler::new()
            .assemble(&doc, &MemoryLoader::new())
            .unwrap()
            .blocks
    }

    #[test]
    fn test_paragraph_with_term() {
        assert_eq!(body("+hello+ world"), vec!["<p><i>hello</i> world</p>"]);
    }

    #[test]
    fn test_paragraph_link() {
        assert_eq!(
            body("{http://example.com link text}"),
            vec!["<p><a href='http://example.com'>link text</a></p>"]
        );
    }

    #[test]
    fn test_paragraph_keeps_newlines() {
        assert_eq!(body("one\ntwo"), vec!["<p>one\ntwo</p>"]);
    }

    #[test]
    fn test_source_block() {
        assert_eq!(
            body("$  int x = 1;\n$  int y = 2;"),
            vec!["<pre>int x = 1;\nint y = 2;</pre>"]
        );
        assert_eq!(body("$ a < *b*"), vec!["<pre>a &lt; *b*</pre>"]);
    }

    #[test]
    fn test_header_anchor_and_level() {
        assert_eq!(
            body("!! Getting started"),
            vec!["<a name='Getting_started'><h3>Getting started</h3></a>"]
        );
    }

    #[test]
    fn test_image_reference() {
        assert_eq!(
            body("@ img/shot.JPG"),
            vec!["<center><p><img src='img/shot.JPG'></p></center>"]
        );
    }

    #[test]
    fn test_file_reference() {
        let doc = Document::parse("@ code.rs", &ParseConfig::default().with_base_dir("src")).unwrap();
        let loader = MemoryLoader::new().with_file("src/code.rs", "if a < b {}");
        let blocks = HtmlHandler::new().assemble(&doc, &loader).unwrap().blocks;
        assert_eq!(blocks, vec!["<p><pre>if a &lt; b {}</pre></p>"]);
    }

    #[test]
    fn test_missing_reference_is_fatal() {
        let doc = Document::parse("@ nope.txt", &ParseConfig::default()).unwrap();
        let err = HtmlHandler::new()
            .render(&doc, &RenderConfig::default(), &MemoryLoader::new())
            .unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(
            body("* one\n* two"),
            vec!["<ol>\n<li>one</li>\n<li>two</li>\n</ol>"]
        );
    }

    #[test]
    fn test_title_in_page() {
        let page = render("# title: My Doc\n\nHello");
        assert!(page.contains("<title>My Doc</title>"));
        assert!(page.contains("<center><h1>My Doc</h1></center>"));
        assert!(page.contains("<p>Hello</p>\n"));
        assert!(!page.contains("<!--"));
    }

    #[test]
    fn test_page_without_metadata() {
        let page = render("Hello");
        assert!(page.starts_with("<html>\n<head>\n<meta http-equiv='Content-Type' content='text/html; charset=UTF-8'>\n</head>"));
        assert!(!page.contains("<title>"));
        assert!(!page.contains("&copy;"));
    }

    #[test]
    fn test_author_credit() {
        let page = render("# author: Jane\n# email: jane@example.com\n\nHi");
        assert!(page.contains("&copy; Jane\n(<a href=\"mailto:jane@example.com\">jane@example.com</a>)\n"));
    }

    #[test]
    fn test_notes_table() {
        let page = render("Text[A note] more[Other]");
        assert!(page.contains("<a href='#note1' name='source1'>[1]</a>"));
        assert!(page.contains("<a href='#source2' name='note2'>[2]</a>\n</td>"));
        assert!(page.contains("width=\"100%\">\nA note\n</td>"));
    }

    #[test]
    fn test_stylesheets() {
        let doc = Document::parse("Hi", &ParseConfig::default()).unwrap();
        let loader = MemoryLoader::new().with_file("style.css", "body { color: red }");
        let embedded = HtmlHandler::new()
            .render(&doc, &RenderConfig::default().with_stylesheet("style.css"), &loader)
            .unwrap();
        assert!(embedded.contains("<!--\nbody { color: red }\n-->"));

        let linked = HtmlHandler::new()
            .render(
                &doc,
                &RenderConfig::default()
                    .with_stylesheet("style.css")
                    .with_embed_stylesheets(false),
                &loader,
            )
            .unwrap();
        assert!(linked.contains("<link rel='stylesheet' type='text/css' href='style.css'>"));
    }
}
