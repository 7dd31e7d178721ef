// SPDX-License-Identifier: AGPL-3.0-or-later
//! File operations for document loading and conversion
//!
//! Provides:
//! - File opening with encoding detection
//! - Output format detection from extensions
//! - Conversion of a source file to an output file

use crate::ast::OutputFormat;
use crate::document::Document;
use crate::traits::{ConversionError, FsLoader, ParseConfig, RenderConfig};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File operation errors
#[derive(Debug, Error)]
pub enum FileError {
    /// IO error during file operations
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Format detection failed
    #[error("Could not detect output format for file: {}", path.display())]
    UnknownFormat { path: PathBuf },

    /// Parse or render error
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Result type for file operations
pub type FileResult<T> = std::result::Result<T, FileError>;

/// Metadata about an opened file
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Full path to the file
    pub path: PathBuf,
    /// Encoding the text was decoded from
    pub encoding: &'static str,
    /// File size in bytes
    pub size: u64,
}

/// Opened document with file metadata
#[derive(Debug, Clone)]
pub struct OpenedDocument {
    /// The parsed document
    pub document: Document,
    /// File information
    pub file_info: FileInfo,
}

/// Detect the output format from a file extension
pub fn format_from_extension(path: &Path) -> Option<OutputFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "html" | "htm" => Some(OutputFormat::Html),
        "xml" => Some(OutputFormat::Xml),
        "md" | "markdown" => Some(OutputFormat::Markdown),
        _ => None,
    }
}

/// Decode source bytes.
///
/// UTF-8 is tried first. Otherwise the text is decoded as windows-1252 and,
/// if its metadata declares another known encoding, decoded again with that
/// one.
pub fn decode_source(bytes: &[u8]) -> (Cow<'_, str>, &'static encoding_rs::Encoding) {
    let (text, encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return (text, encoding);
    }

    let (fallback, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    let declared = Document::parse(&fallback, &ParseConfig::default())
        .ok()
        .and_then(|doc| doc.meta().encoding.clone())
        .and_then(|label| encoding_rs::Encoding::for_label(label.trim().as_bytes()));
    match declared {
        Some(encoding) if encoding != encoding_rs::WINDOWS_1252 => {
            (encoding.decode(bytes).0, encoding)
        }
        _ => (fallback, encoding_rs::WINDOWS_1252),
    }
}

/// Open a source file and parse it.
///
/// Reference blocks resolve against the file's directory.
pub fn open_file(path: impl AsRef<Path>) -> FileResult<OpenedDocument> {
    let path = path.as_ref();
    let io_err = |source| FileError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = fs::read(path).map_err(io_err)?;
    let size = bytes.len() as u64;
    let (text, encoding) = decode_source(&bytes);

    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let document = Document::parse(&text, &ParseConfig::default().with_base_dir(base_dir))?;
    tracing::debug!(path = %path.display(), encoding = encoding.name(), "opened document");

    Ok(OpenedDocument {
        document,
        file_info: FileInfo {
            path: path.to_path_buf(),
            encoding: encoding.name(),
            size,
        },
    })
}

/// Render a document from disk resources
pub fn render_to_bytes(
    doc: &Document,
    format: OutputFormat,
    config: &RenderConfig,
) -> FileResult<Vec<u8>> {
    Ok(doc.render_bytes(format, config, &FsLoader)?)
}

/// Output path next to `input`, with the format's extension
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    match format {
        OutputFormat::Pdf => input.with_extension("pdf.html"),
        _ => input.with_extension(format.extension()),
    }
}

/// Convert `input` to `output` in the given format
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    format: OutputFormat,
    config: &RenderConfig,
) -> FileResult<()> {
    let output = output.as_ref();
    let opened = open_file(input)?;
    let bytes = render_to_bytes(&opened.document, format, config)?;
    fs::write(output, bytes).map_err(|source| FileError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    tracing::info!(output = %output.display(), %format, "document converted");
    Ok(())
}

/// Convert `input`, picking the format from the output extension
pub fn convert_file_auto(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &RenderConfig,
) -> FileResult<()> {
    let output = output.as_ref();
    let format = format_from_extension(output).ok_or_else(|| FileError::UnknownFormat {
        path: output.to_path_buf(),
    })?;
    convert_file(input, output, format, config)
}
