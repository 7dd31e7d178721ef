// SPDX-License-Identifier: AGPL-3.0-or-later
//! Text escaping shared by the HTML and XML renderers.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// One or more spaces in front of high punctuation.
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +([:;?!])").unwrap());

/// Entity used in place of the spaces before `:`, `;`, `?` and `!`.
pub const NBSP: &str = "&#x00A0;";

/// Escape `&`, `<` and `>` and apply the French typography rule.
///
/// Ampersands are replaced first so the entities produced for `<` and `>`
/// are not escaped twice. Any run of spaces right before `:`, `;`, `?` or
/// `!` collapses to a single non-breaking space entity. Quotes are left
/// untouched.
pub fn escape_markup(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    SPACE_BEFORE_PUNCT
        .replace_all(&escaped, |caps: &Captures<'_>| format!("{NBSP}{}", &caps[1]))
        .into_owned()
}

/// [`escape_markup`] lifted over optional values; `None` stays `None`.
pub fn escape_optional(text: Option<&str>) -> Option<String> {
    text.map(escape_markup)
}

/// Remove every `--`, which may not appear inside an HTML comment.
pub fn escape_comment(text: &str) -> String {
    text.replace("--", "")
}
