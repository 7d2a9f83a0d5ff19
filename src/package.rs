//! Building new archives and swapping them into place.

use crate::container::OoxmlContainer;
use crate::error::Result;
use crate::xml::XmlElement;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const PACKAGE_RELS_PART: &str = "_rels/.rels";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const NUMBERING_PART: &str = "word/numbering.xml";
pub const SETTINGS_PART: &str = "word/settings.xml";

/// WordprocessingML main namespace.
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Package relationships namespace.
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub const OFFICE_DOCUMENT_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const STYLES_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub const NUMBERING_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
pub const SETTINGS_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";

/// Writes a fresh archive entry by entry.
///
/// The archive is assembled in memory; [`PackageWriter::persist`] writes it
/// to a sibling temp file and renames it over the destination.
pub struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    written: Vec<String>,
}

impl PackageWriter {
    /// Create an empty archive writer.
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            written: Vec::new(),
        }
    }

    /// Add an entry from raw bytes.
    pub fn add_bytes(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(data)?;
        self.written.push(name.to_string());
        Ok(())
    }

    /// Serialize an element tree as a UTF-8 XML entry.
    pub fn add_xml(&mut self, name: &str, root: &XmlElement) -> Result<()> {
        let bytes = root.to_xml_bytes()?;
        self.add_bytes(name, &bytes)
    }

    /// Copy an entry from `source` without decompressing it.
    pub fn copy_raw(&mut self, source: &OoxmlContainer, name: &str) -> Result<()> {
        source.raw_copy_into(name, &mut self.zip)?;
        self.written.push(name.to_string());
        Ok(())
    }

    /// Whether an entry of this name was already written.
    pub fn contains(&self, name: &str) -> bool {
        self.written.iter().any(|n| n == name)
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }

    /// Finish the archive and atomically replace `path` with it.
    pub fn persist(self, path: &Path) -> Result<()> {
        let bytes = self.finish()?;
        replace_atomically(path, &bytes)
    }
}

impl Default for PackageWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `bytes` to a temp file beside `path`, then rename it over `path`.
///
/// The rename is the platform's replace primitive, so concurrent readers
/// see either the old file or the new one. If anything fails before the
/// rename, `path` is untouched and the temp file is removed.
pub fn replace_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".reqdot-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(path)?;
    Ok(())
}
