// ABOUTME: Context document persistence: load-or-create and full overwrite saves.
// ABOUTME: Writes pretty JSON with 4-space indentation to <workspace>/context.json.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};

use crate::context::ContextDocument;

/// File name of the context document inside a workspace.
pub const CONTEXT_FILE_NAME: &str = "context.json";

/// Path to the context document for a given workspace directory.
pub fn context_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join(CONTEXT_FILE_NAME)
}

/// Load a context document from disk, if it exists.
pub fn load_context_from(path: &Path) -> anyhow::Result<Option<ContextDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let doc: ContextDocument = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(doc))
}

/// Load the document at `path`, or write a fresh default one there.
///
/// An existing document is taken as-is: no defaults are re-applied.
pub fn load_or_create(path: &Path) -> anyhow::Result<ContextDocument> {
    if let Some(doc) = load_context_from(path)? {
        return Ok(doc);
    }
    let doc = ContextDocument::new_default();
    save_context_to(path, &doc)?;
    Ok(doc)
}

/// Pretty printer with 4-space indentation that writes non-ASCII characters
/// as `\uXXXX` escapes (UTF-16 code units, lowercase hex).
struct AsciiPrettyFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl AsciiPrettyFormatter<'_> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for AsciiPrettyFormatter<'_> {
    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units).iter() {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }

    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

/// Serialize a document the way it is stored on disk.
pub fn to_pretty_json(doc: &ContextDocument) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let formatter = AsciiPrettyFormatter::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Overwrite `path` with the full document. Not atomic.
pub fn save_context_to(path: &Path, doc: &ContextDocument) -> anyhow::Result<()> {
    let content = to_pretty_json(doc)?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
