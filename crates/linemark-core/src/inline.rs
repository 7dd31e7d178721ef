// SPDX-License-Identifier: AGPL-3.0-or-later
//! Inline markup: emphasis, links and footnotes
//!
//! Text goes through a fixed sequence of passes, each producing a new
//! string: emphasis markers, then links and footnotes, then escape
//! unwinding. A marker preceded by a backslash is skipped by every pass and
//! the backslash is removed at the very end, so `\*` comes out as a literal
//! `*`.

use crate::ast::OutputFormat;
use crate::context::RenderContext;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// The four emphasis markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    /// `+text+`
    Term,
    /// `*text*`
    Bold,
    /// `_text_`
    Underline,
    /// `~text~`
    Code,
}

impl Emphasis {
    pub fn marker(&self) -> char {
        match self {
            Emphasis::Term => '+',
            Emphasis::Bold => '*',
            Emphasis::Underline => '_',
            Emphasis::Code => '~',
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Emphasis::Term => &*TERM,
            Emphasis::Bold => &*BOLD,
            Emphasis::Underline => &*UNDERLINE,
            Emphasis::Code => &*CODE,
        }
    }
}

/// Opening marker not escaped, at least one character inside, closing
/// marker not escaped. Group 1 keeps the character before the opening marker.
fn emphasis_regex(marker: char) -> Regex {
    let m = regex::escape(&marker.to_string());
    Regex::new(&format!(r"(?ms)(^|[^\\]){m}(.*?)([^\\]){m}")).unwrap()
}

static TERM: LazyLock<Regex> = LazyLock::new(|| emphasis_regex(Emphasis::Term.marker()));
static BOLD: LazyLock<Regex> = LazyLock::new(|| emphasis_regex(Emphasis::Bold.marker()));
static UNDERLINE: LazyLock<Regex> = LazyLock::new(|| emphasis_regex(Emphasis::Underline.marker()));
static CODE: LazyLock<Regex> = LazyLock::new(|| emphasis_regex(Emphasis::Code.marker()));

static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?ms)(^|[^\\])\{(.*?)\}").unwrap());
static NOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?ms)(^|[^\\])\[(.*?)\]").unwrap());
static ESCAPED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\(.)").unwrap());

/// Markup family used for inline substitutions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Html,
    Xml,
    Markdown,
}

impl From<OutputFormat> for Flavor {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Html | OutputFormat::Pdf => Flavor::Html,
            OutputFormat::Xml | OutputFormat::Blog => Flavor::Xml,
            OutputFormat::Markdown => Flavor::Markdown,
        }
    }
}

/// Emphasis substitution: which marker, and the tokens around its content
struct EmphasisRule {
    emphasis: Emphasis,
    open: &'static str,
    close: &'static str,
}

const fn rule(emphasis: Emphasis, open: &'static str, close: &'static str) -> EmphasisRule {
    EmphasisRule {
        emphasis,
        open,
        close,
    }
}

const HTML_EMPHASIS: &[EmphasisRule] = &[
    rule(Emphasis::Term, "<i>", "</i>"),
    rule(Emphasis::Bold, "<b>", "</b>"),
    rule(Emphasis::Underline, "<u>", "</u>"),
    rule(Emphasis::Code, "<tt>", "</tt>"),
];

const XML_EMPHASIS: &[EmphasisRule] = &[
    rule(Emphasis::Term, "<term>", "</term>"),
    rule(Emphasis::Bold, "<imp>", "</imp>"),
    rule(Emphasis::Underline, "<imp>", "</imp>"),
    rule(Emphasis::Code, "<code>", "</code>"),
];

// `*` must be rewritten before `+`, whose output is itself `*`.
const MARKDOWN_EMPHASIS: &[EmphasisRule] = &[
    rule(Emphasis::Code, "`", "`"),
    rule(Emphasis::Bold, "**", "**"),
    rule(Emphasis::Term, "*", "*"),
    rule(Emphasis::Underline, "~~", "~~"),
];

impl Flavor {
    fn emphasis_rules(&self) -> &'static [EmphasisRule] {
        match self {
            Flavor::Html => HTML_EMPHASIS,
            Flavor::Xml => XML_EMPHASIS,
            Flavor::Markdown => MARKDOWN_EMPHASIS,
        }
    }

    fn link(&self, url: &str, text: &str) -> String {
        match self {
            Flavor::Html => format!("<a href='{url}'>{text}</a>"),
            Flavor::Xml => format!("<link url='{url}'>{text}</link>"),
            Flavor::Markdown => format!("[{text}]({url})"),
        }
    }

    fn note(&self, index: usize, body: &str) -> String {
        match self {
            Flavor::Html => format!("<a href='#note{index}' name='source{index}'>[{index}]</a>"),
            Flavor::Xml => format!("<note>{body}</note>"),
            Flavor::Markdown => format!("{index}[{body}]"),
        }
    }
}

/// Apply every inline pass to `text`.
///
/// Footnote bodies are appended to `ctx` in order of appearance. HTML and
/// XML text must already be escaped; Markdown text is used as is.
pub fn transform(text: &str, flavor: Flavor, ctx: &mut RenderContext<'_>) -> String {
    let text = apply_emphasis(text, flavor);
    let text = match flavor {
        // Markdown links produce `[...]`, which the note pass would capture.
        Flavor::Markdown => apply_links(&apply_notes(&text, flavor, ctx), flavor),
        Flavor::Html | Flavor::Xml => apply_notes(&apply_links(&text, flavor), flavor, ctx),
    };
    unescape(&text).into_owned()
}

/// Rewrite emphasis markers, one marker kind at a time.
pub fn apply_emphasis(text: &str, flavor: Flavor) -> String {
    flavor
        .emphasis_rules()
        .iter()
        .fold(text.to_string(), |text, rule| {
            let pattern = rule.emphasis.pattern();
            if !pattern.is_match(&text) {
                return text;
            }
            let replacement = format!("${{1}}{}${{2}}${{3}}{}", rule.open, rule.close);
            pattern.replace_all(&text, replacement.as_str()).into_owned()
        })
}

/// Split a link body into its URL and visible text.
///
/// `{url words...}` links the words; `{url}` shows the URL itself.
pub fn split_link(body: &str) -> (&str, Cow<'_, str>) {
    let mut parts = body.split_whitespace();
    match (parts.next(), parts.clone().next()) {
        (Some(url), Some(_)) => (url, Cow::Owned(parts.collect::<Vec<_>>().join(" "))),
        (Some(url), None) => (url, Cow::Borrowed(url)),
        (None, _) => (body, Cow::Borrowed(body)),
    }
}

fn apply_links(text: &str, flavor: Flavor) -> String {
    LINK.replace_all(text, |caps: &Captures<'_>| {
        let (url, label) = split_link(&caps[2]);
        format!("{}{}", &caps[1], flavor.link(url, &label))
    })
    .into_owned()
}

fn apply_notes(text: &str, flavor: Flavor, ctx: &mut RenderContext<'_>) -> String {
    NOTE.replace_all(text, |caps: &Captures<'_>| {
        let body = &caps[2];
        let index = ctx.push_note(unescape(body));
        format!("{}{}", &caps[1], flavor.note(index, body))
    })
    .into_owned()
}

/// Replace every `\x` with `x`.
pub fn unescape(text: &str) -> Cow<'_, str> {
    ESCAPED.replace_all(text, "${1}")
}
