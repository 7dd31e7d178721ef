// SPDX-License-Identifier: AGPL-3.0-or-later
//! Block taxonomy, output formats and document metadata
//!
//! A block is a maximal run of non-blank source lines. Its kind is chosen
//! once, from the first character of its first line, by looking it up in
//! [`BLOCK_TRIGGERS`]; anything not listed there is a paragraph.

use crate::traits::{ConversionError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

static HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(!+)\s*(.*)$").unwrap());
static SOURCE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\$\s*").unwrap());
static REFERENCE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^@\s*(.*)$").unwrap());

/// Extensions rendered as pictures rather than included as text
const IMAGE_EXTENSIONS: &[&str] = &["png", "gif", "jpg"];

/// Output formats a document can be rendered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Styled HTML page
    Html,
    /// Unstyled HTML meant for PDF printing, Latin-1 encoded
    Pdf,
    /// Generic XML article
    Xml,
    /// Blog entry XML
    Blog,
    /// Markdown
    Markdown,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Html,
        OutputFormat::Pdf,
        OutputFormat::Xml,
        OutputFormat::Blog,
        OutputFormat::Markdown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Xml => "xml",
            OutputFormat::Blog => "blog",
            OutputFormat::Markdown => "markdown",
        }
    }

    /// File extension of rendered output
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html | OutputFormat::Pdf => "html",
            OutputFormat::Xml | OutputFormat::Blog => "xml",
            OutputFormat::Markdown => "md",
        }
    }

    /// Formats that store the title escaped
    pub fn escapes_title(&self) -> bool {
        matches!(self, OutputFormat::Html | OutputFormat::Xml | OutputFormat::Blog)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "pdf" => Ok(OutputFormat::Pdf),
            "xml" => Ok(OutputFormat::Xml),
            "blog" => Ok(OutputFormat::Blog),
            "mark" | "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// The seven block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    Comment,
    Source,
    Reference,
    Header,
    UnorderedList,
    OrderedList,
}

/// Leading characters that select a block kind
pub const BLOCK_TRIGGERS: &[(char, BlockKind)] = &[
    ('#', BlockKind::Comment),
    ('$', BlockKind::Source),
    ('@', BlockKind::Reference),
    ('!', BlockKind::Header),
    ('-', BlockKind::UnorderedList),
    ('*', BlockKind::OrderedList),
];

impl BlockKind {
    /// Select the kind for a block starting with `first_line`
    pub fn classify(first_line: &str) -> Self {
        first_line
            .chars()
            .next()
            .and_then(|c| {
                BLOCK_TRIGGERS
                    .iter()
                    .find(|(trigger, _)| *trigger == c)
                    .map(|(_, kind)| *kind)
            })
            .unwrap_or(BlockKind::Paragraph)
    }

    /// Leading character for this kind, if it has one
    pub fn trigger(&self) -> Option<char> {
        BLOCK_TRIGGERS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(c, _)| *c)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Comment => "comment",
            BlockKind::Source => "source",
            BlockKind::Reference => "reference",
            BlockKind::Header => "header",
            BlockKind::UnorderedList => "unordered list",
            BlockKind::OrderedList => "ordered list",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 1-based, inclusive range of source lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSpan {
    pub first: usize,
    pub last: usize,
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "line {}", self.first)
        } else {
            write!(f, "lines {}-{}", self.first, self.last)
        }
    }
}

/// A parsed heading line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading<'a> {
    /// Number of `!` characters
    pub level: usize,
    pub text: &'a str,
}

/// A file referenced by an `@` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    pub target: &'a str,
}

impl Reference<'_> {
    /// Whether the target is a picture (`.png`, `.gif`, `.jpg`, any case)
    pub fn is_image(&self) -> bool {
        Path::new(self.target)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// One list item: the text after the marker plus its continuation lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<'a> {
    pub segments: Vec<&'a str>,
}

impl ListItem<'_> {
    /// Segments joined with single spaces
    pub fn joined(&self) -> String {
        self.segments.join(" ")
    }
}

/// A run of non-blank source lines with its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    kind: BlockKind,
    lines: Vec<String>,
    span: LineSpan,
}

impl Block {
    /// Build a block from its lines, classifying it by the first character.
    ///
    /// `first_line` is the 1-based source line number of `lines[0]`.
    pub fn new(lines: Vec<String>, first_line: usize) -> Self {
        let kind = lines
            .first()
            .map(|line| BlockKind::classify(line))
            .unwrap_or(BlockKind::Paragraph);
        Self::with_kind(kind, lines, first_line)
    }

    /// Build a block of an explicit kind without classifying it.
    pub fn with_kind(kind: BlockKind, lines: Vec<String>, first_line: usize) -> Self {
        let last = first_line + lines.len().saturating_sub(1);
        Self {
            kind,
            lines,
            span: LineSpan {
                first: first_line,
                last,
            },
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn span(&self) -> LineSpan {
        self.span
    }

    fn first_line(&self) -> Result<&str> {
        self.lines
            .first()
            .map(String::as_str)
            .ok_or_else(|| ConversionError::malformed(self, "block has no lines"))
    }

    /// Text of every comment line, after the `#` and any following spaces
    pub fn comment_lines(&self) -> Result<Vec<&str>> {
        self.lines
            .iter()
            .map(|line| {
                line.strip_prefix('#')
                    .map(str::trim_start)
                    .ok_or_else(|| {
                        ConversionError::malformed(self, format!("comment line without `#`: {line}"))
                    })
            })
            .collect()
    }

    /// Level and text of a header block
    pub fn heading(&self) -> Result<Heading<'_>> {
        let first = self.first_line()?;
        let caps = HEADER_LINE
            .captures(first)
            .ok_or_else(|| ConversionError::malformed(self, "header must start with `!`"))?;
        Ok(Heading {
            level: caps[1].len(),
            text: caps.get(2).map_or("", |m| m.as_str()),
        })
    }

    /// Source lines with the opening `$` marker's width removed from each
    pub fn source_lines(&self) -> Result<Vec<&str>> {
        let first = self.first_line()?;
        let indent = SOURCE_MARKER
            .find(first)
            .ok_or_else(|| ConversionError::malformed(self, "source must start with `$`"))?
            .as_str()
            .chars()
            .count();
        Ok(self
            .lines
            .iter()
            .map(|line| match line.char_indices().nth(indent) {
                Some((offset, _)) => &line[offset..],
                None => "",
            })
            .collect())
    }

    /// Target of a reference block
    pub fn reference(&self) -> Result<Reference<'_>> {
        let first = self.first_line()?;
        let target = REFERENCE_LINE
            .captures(first)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end())
            .ok_or_else(|| ConversionError::malformed(self, "reference must start with `@`"))?;
        if target.is_empty() {
            return Err(ConversionError::malformed(self, "reference has no file name"));
        }
        Ok(Reference { target })
    }

    /// Items of a list block.
    ///
    /// Lines starting with the kind's marker open an item; other lines are
    /// trimmed and appended to the current one.
    pub fn list_items(&self) -> Result<Vec<ListItem<'_>>> {
        let marker = match self.kind {
            BlockKind::UnorderedList | BlockKind::OrderedList => self.kind.trigger(),
            _ => None,
        }
        .ok_or_else(|| ConversionError::malformed(self, "not a list block"))?;

        let mut items: Vec<ListItem<'_>> = Vec::new();
        for (offset, line) in self.lines.iter().enumerate() {
            if let Some(rest) = line.strip_prefix(marker) {
                items.push(ListItem {
                    segments: vec![rest.trim_start()],
                });
            } else {
                let current = items.last_mut().ok_or(ConversionError::ListContinuation {
                    kind: self.kind,
                    lines: self.span,
                    line: self.span.first + offset,
                })?;
                current.segments.push(line.trim());
            }
        }
        Ok(items)
    }
}

/// Metadata read from the leading comment block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
    pub encoding: Option<String>,
    /// Keys the templates do not use
    pub extra: BTreeMap<String, String>,
}

impl DocumentMeta {
    /// Store a value under `key`, routing known keys to their fields
    pub fn insert(&mut self, key: &str, value: String) {
        match key {
            "title" => self.title = Some(value),
            "author" => self.author = Some(value),
            "email" => self.email = Some(value),
            "date" => self.date = Some(value),
            "encoding" => self.encoding = Some(value),
            _ => {
                tracing::debug!(key, "unrecognized metadata key");
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "title" => self.title.as_deref(),
            "author" => self.author.as_deref(),
            "email" => self.email.as_deref(),
            "date" => self.date.as_deref(),
            "encoding" => self.encoding.as_deref(),
            _ => self.extra.get(key).map(String::as_str),
        }
    }

    /// Declared source encoding, `UTF-8` when absent
    pub fn encoding_or_default(&self) -> &str {
        self.encoding.as_deref().unwrap_or("UTF-8")
    }
}
