// SPDX-License-Identifier: AGPL-3.0-or-later
//! End-to-end rendering of documents through every format

use linemark_core::file_ops::{convert_file, open_file};
use linemark_core::{
    ConversionError, Document, FsLoader, MemoryLoader, OutputFormat, ParseConfig, RenderConfig,
};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

const SAMPLE: &str = "\
# title: Field Guide
# author: Ada
# date: 2024-03-01

! Introduction

Birds are +warm-blooded+[Mostly.] animals.
See {http://birds.example the atlas}.

!! Species

- Robin
- Wren, a *small*
  brown bird

$ count = 0
$   count += 1
";

fn render(format: OutputFormat) -> String {
    let doc = Document::parse(SAMPLE, &ParseConfig::default()).unwrap();
    doc.render(format, &RenderConfig::default(), &MemoryLoader::new())
        .unwrap()
}

#[test]
fn html_page() {
    let html = render(OutputFormat::Html);
    assert!(html.contains("<title>Field Guide</title>"));
    assert!(html.contains("&copy; Ada\n"));
    assert!(html.contains("<a name='Introduction'><h2>Introduction</h2></a>\n"));
    assert!(html.contains(
        "<p>Birds are <i>warm-blooded</i><a href='#note1' name='source1'>[1]</a> animals.\n\
         See <a href='http://birds.example'>the atlas</a>.</p>"
    ));
    assert!(html.contains("<ul>\n<li>Robin</li>\n<li>Wren, a <b>small</b> brown bird</li>\n</ul>"));
    assert!(html.contains("<pre>count = 0\n  count += 1</pre>"));
    assert!(html.contains("<a href='#source1' name='note1'>[1]</a>\n</td>"));
}

#[test]
fn xml_article() {
    let xml = render(OutputFormat::Xml);
    assert!(xml.contains("<article id=\"Field_Guide\"\n         author=\"Ada\""));
    assert!(xml.contains("date=\"2024-03-01\""));
    assert!(xml.contains("<p>Birds are <term>warm-blooded</term><note>Mostly.</note> animals."));
    assert!(xml.contains("<link url='http://birds.example'>the atlas</link>"));
    assert!(xml.contains("<sect><title>Introduction</title>\n"));
    assert!(xml.contains("<sect><title>Species</title>\n"));
    assert!(xml.contains("<source>count = 0\n  count += 1</source>\n</sect>\n</sect>\n\n </text>"));
}

#[test]
fn blog_entry() {
    let blog = render(OutputFormat::Blog);
    assert!(blog.contains("<weblog id=\"Field_Guide\"\n        date=\"2024-03-01\">"));
    assert!(blog.ends_with("</source>\n</sect>\n</sect>\n\n</weblog>\n"));
}

#[test]
fn markdown_document() {
    let md = render(OutputFormat::Markdown);
    assert_eq!(
        md,
        "# Introduction\n\n\
         Birds are *warm-blooded*1[Mostly.] animals. See [the atlas](http://birds.example).\n\n\
         ## Species\n\n\
         - Robin\n- Wren, a **small** brown bird\n\n\
         ```\ncount = 0\n  count += 1\n```\n\n"
    );
}

#[test]
fn renders_are_independent() {
    let doc = Document::parse("a[one] b[two]", &ParseConfig::default()).unwrap();
    let config = RenderConfig::default();
    let loader = MemoryLoader::new();
    let first = doc.to_html(&config, &loader).unwrap();
    let _ = doc.to_markdown(&config, &loader).unwrap();
    let second = doc.to_html(&config, &loader).unwrap();
    assert_eq!(first, second);
    assert!(!second.contains("note3"));
}

#[test]
fn pdf_bytes_are_latin1() {
    let doc = Document::parse("# title: Café\n\nDéjà vu", &ParseConfig::default()).unwrap();
    let bytes = doc.to_pdf(&RenderConfig::default(), &MemoryLoader::new()).unwrap();
    let needle = b"<p>D\xe9j\xe0 vu</p>";
    assert!(bytes.windows(needle.len()).any(|w| w == needle));
    assert!(bytes.windows(4).any(|w| w == b"Caf\xe9"));
}

#[test]
fn pdf_rejects_unrepresentable_text() {
    for text in [
        "Snowman \u{2603}",
        "Prix 5\u{20AC}",
        "\u{201C}quoted\u{201D}",
        "a \u{2014} b",
        "wait\u{2026}",
    ] {
        let doc = Document::parse(text, &ParseConfig::default()).unwrap();
        let result = doc.to_pdf(&RenderConfig::default(), &MemoryLoader::new());
        assert!(
            matches!(result, Err(ConversionError::EncodingConversion { .. })),
            "{text:?} rendered as {result:?}"
        );
    }
}

#[test]
fn reference_from_disk() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("snippet.c"), "a < b").unwrap();
    let doc = Document::parse(
        "@ snippet.c",
        &ParseConfig::default().with_base_dir(dir.path()),
    )
    .unwrap();
    let xml_block = doc.to_markdown(&RenderConfig::default(), &FsLoader).unwrap();
    assert_eq!(xml_block, "```\na < b\n```\n\n");

    let missing = Document::parse(
        "@ absent.c",
        &ParseConfig::default().with_base_dir(dir.path()),
    )
    .unwrap();
    match missing.to_html(&RenderConfig::default(), &FsLoader) {
        Err(ConversionError::FileRead { path, .. }) => assert!(path.ends_with("absent.c")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn convert_file_on_disk() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("guide.txt");
    fs::write(&input, SAMPLE).unwrap();
    let output = dir.path().join("guide.xml");

    convert_file(&input, &output, OutputFormat::Blog, &RenderConfig::default()).unwrap();
    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE weblog"));

    let opened = open_file(&input).unwrap();
    assert_eq!(opened.document.base_dir(), dir.path());
}
