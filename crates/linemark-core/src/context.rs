// SPDX-License-Identifier: AGPL-3.0-or-later
//! Mutable state threaded through one render pass.
//!
//! A context is created empty at the start of every pass, so footnote
//! numbering and section depth never leak from one render into the next.

use crate::traits::{self, ResourceLoader};
use std::path::Path;

/// Footnotes, section depth and file access for a single render pass.
pub struct RenderContext<'a> {
    notes: Vec<String>,
    header_depth: usize,
    /// Levels of the sections currently open, outermost first
    open_sections: Vec<usize>,
    base_dir: &'a Path,
    loader: &'a dyn ResourceLoader,
}

impl<'a> RenderContext<'a> {
    pub fn new(base_dir: &'a Path, loader: &'a dyn ResourceLoader) -> Self {
        Self {
            notes: Vec::new(),
            header_depth: 0,
            open_sections: Vec::new(),
            base_dir,
            loader,
        }
    }

    /// Record a footnote body and return its 1-based number.
    pub fn push_note(&mut self, body: impl Into<String>) -> usize {
        self.notes.push(body.into());
        let index = self.notes.len();
        tracing::trace!(index, "footnote allocated");
        index
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn header_depth(&self) -> usize {
        self.header_depth
    }

    /// Move to a new section at `level`.
    ///
    /// Returns how many open sections must be closed before the new one is
    /// opened: every open section at `level` or deeper. Going deeper closes
    /// nothing, so the opened and closed sections always balance.
    pub fn open_section(&mut self, level: usize) -> usize {
        let keep = self
            .open_sections
            .iter()
            .position(|&open| open >= level)
            .unwrap_or(self.open_sections.len());
        let closes = self.open_sections.len() - keep;
        self.open_sections.truncate(keep);
        self.open_sections.push(level);
        tracing::trace!(level, closes, open = self.open_sections.len(), "section opened");
        self.header_depth = level;
        closes
    }

    /// Track the heading level without emitting sections.
    pub fn set_depth(&mut self, level: usize) {
        self.header_depth = level;
    }

    /// Read a file relative to the document's base directory.
    pub fn read_relative(&self, relative: &str) -> traits::Result<String> {
        traits::load(self.loader, &self.base_dir.join(relative))
    }

    /// Number of sections still open
    pub fn open_sections(&self) -> usize {
        self.open_sections.len()
    }

    /// Consume the context, returning the footnotes and the number of
    /// sections left open.
    pub fn finish(self) -> (Vec<String>, usize) {
        (self.notes, self.open_sections.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MemoryLoader;

    #[test]
    fn test_notes_numbered_from_one() {
        let loader = MemoryLoader::new();
        let mut ctx = RenderContext::new(Path::new("."), &loader);
        assert_eq!(ctx.push_note("a"), 1);
        assert_eq!(ctx.push_note("b"), 2);
        assert_eq!(ctx.notes(), ["a", "b"]);
    }

    #[test]
    fn test_section_closing_counts() {
        let loader = MemoryLoader::new();
        let mut ctx = RenderContext::new(Path::new("."), &loader);
        assert_eq!(ctx.open_section(1), 0);
        assert_eq!(ctx.open_section(2), 0);
        assert_eq!(ctx.open_section(3), 0);
        assert_eq!(ctx.open_section(2), 2);
        assert_eq!(ctx.open_section(1), 2);
        assert_eq!(ctx.header_depth(), 1);
        let (notes, open) = ctx.finish();
        assert!(notes.is_empty());
        assert_eq!(open, 1);
    }

    #[test]
    fn test_skipped_levels_stay_balanced() {
        let loader = MemoryLoader::new();
        let mut ctx = RenderContext::new(Path::new("."), &loader);
        assert_eq!(ctx.open_section(3), 0);
        assert_eq!(ctx.open_section(1), 1);
        assert_eq!(ctx.open_section(3), 0);
        assert_eq!(ctx.open_sections(), 2);
        assert_eq!(ctx.open_section(2), 1);
        assert_eq!(ctx.open_sections(), 2);
    }

    #[test]
    fn test_markdown_depth_opens_nothing() {
        let loader = MemoryLoader::new();
        let mut ctx = RenderContext::new(Path::new("."), &loader);
        ctx.set_depth(2);
        assert_eq!(ctx.header_depth(), 2);
        assert_eq!(ctx.finish().1, 0);
    }

    #[test]
    fn test_read_relative_joins_base() {
        let loader = MemoryLoader::new().with_file("docs/code.txt", "fn main() {}");
        let ctx = RenderContext::new(Path::new("docs"), &loader);
        assert_eq!(ctx.read_relative("code.txt").unwrap(), "fn main() {}");
        assert!(ctx.read_relative("missing.txt").is_err());
    }
}
