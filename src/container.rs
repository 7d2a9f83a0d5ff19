//! ZIP container abstraction for OOXML packages.

use crate::error::{Error, Result};
use crate::xml::{self, XmlElement};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

impl Relationship {
    /// Whether the target is an absolute in-package path.
    pub fn is_absolute(&self) -> bool {
        !self.external && self.target.starts_with('/')
    }
}

/// Relationships parsed from a .rels file, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    pub records: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a .rels part. Fails on malformed XML.
    pub fn parse(xml: &str) -> Result<Self> {
        let root = xml::parse(xml)?;
        Ok(Self::from_element(&root))
    }

    /// Collect `Relationship` children of a parsed `Relationships` root.
    pub fn from_element(root: &XmlElement) -> Self {
        let records = root
            .elements()
            .filter(|e| e.local_name() == "Relationship")
            .map(|e| Relationship {
                id: e.get_attr("Id").unwrap_or_default().to_string(),
                rel_type: e.get_attr("Type").unwrap_or_default().to_string(),
                target: e.get_attr("Target").unwrap_or_default().to_string(),
                external: e
                    .get_attr("TargetMode")
                    .is_some_and(|m| m.eq_ignore_ascii_case("external")),
            })
            .collect();
        Self { records }
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Get relationships by type.
    pub fn get_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.records
            .iter()
            .filter(|r| r.rel_type == rel_type)
            .collect()
    }

    /// Iterate relationships.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.records.iter()
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// After decoding UTF-16 bytes into a Rust String the declaration still
/// says UTF-16, which would make quick-xml reinterpret the text.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::Encoding(e.to_string()));
    }

    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        let content = decode_utf16_le(&bytes[2..])?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let content = decode_utf16_be(&bytes[2..])?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // UTF-16 without BOM: ASCII markup leaves NULs in alternating bytes
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16_le(bytes).map(|s| fix_xml_encoding_declaration(&s))
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16_be(bytes).map(|s| fix_xml_encoding_declaration(&s))
            } else {
                Err(Error::Encoding("part is neither UTF-8 nor UTF-16".to_string()))
            }
        }
    }
}

fn decode_utf16_le(bytes: &[u8]) -> Result<String> {
    let len = bytes.len() & !1;

    let u16_iter = (0..len)
        .step_by(2)
        .map(|i| u16::from_le_bytes([bytes[i], bytes[i + 1]]));

    char::decode_utf16(u16_iter)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))
}

fn decode_utf16_be(bytes: &[u8]) -> Result<String> {
    let len = bytes.len() & !1;

    let u16_iter = (0..len)
        .step_by(2)
        .map(|i| u16::from_be_bytes([bytes[i], bytes[i + 1]]));

    char::decode_utf16(u16_iter)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Read-only OOXML container over a ZIP archive held in memory.
///
/// The archive is never modified through this type; repairs build a new
/// archive and copy untouched entries across verbatim.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use reqdot::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("Requirements.dotx")?;
    /// # Ok::<(), reqdot::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create an OOXML container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part as a string, decoding UTF-8 or UTF-16.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a part's raw (uncompressed) bytes.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read a part if present; `None` when the entry does not exist.
    pub fn read_xml_opt(&self, path: &str) -> Result<Option<String>> {
        if !self.exists(path) {
            return Ok(None);
        }
        self.read_xml(path).map(Some)
    }

    /// Check if an entry exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().index_for_name(path).is_some()
    }

    /// List all entry names in archive order.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        (0..archive.len())
            .filter_map(|i| archive.name_for_index(i).map(String::from))
            .collect()
    }

    /// Read and parse a relationships part.
    pub fn read_relationships(&self, rels_path: &str) -> Result<Relationships> {
        let content = self.read_xml(rels_path)?;
        Relationships::parse(&content)
    }

    /// Copy an entry's compressed bytes and header into `writer` unchanged.
    pub fn raw_copy_into<W: Write + Seek>(
        &self,
        path: &str,
        writer: &mut zip::ZipWriter<W>,
    ) -> Result<()> {
        let mut archive = self.archive.borrow_mut();
        let index = archive
            .index_for_name(path)
            .ok_or_else(|| Error::MissingComponent(path.to_string()))?;
        let file = archive.by_index_raw(index)?;
        writer.raw_copy_file(file)?;
        Ok(())
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_relationships_parse() {
        let rels = Relationships::parse(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://test/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://test/link" Target="/word/x.xml" TargetMode="External"/>
  <Relationship Id="rId3" Type="http://test/styles" Target="/word/numbering.xml"/>
</Relationships>"#,
        )
        .unwrap();

        assert_eq!(rels.records.len(), 3);
        assert!(rels.get("rId1").is_some());
        assert!(rels.get("rId9").is_none());
        assert_eq!(rels.get_by_type("http://test/styles").len(), 2);
        assert!(!rels.get("rId2").unwrap().is_absolute());
        assert!(rels.get("rId3").unwrap().is_absolute());
    }

    #[test]
    fn test_relationships_parse_malformed() {
        assert!(Relationships::parse("<Relationships><Relationship").is_err());
    }

    #[test]
    fn test_list_files_in_archive_order() {
        let data = archive(&[("b.xml", "<b/>"), ("a.xml", "<a/>"), ("c.bin", "x")]);
        let container = OoxmlContainer::from_bytes(data).unwrap();
        assert_eq!(container.list_files(), vec!["b.xml", "a.xml", "c.bin"]);
        assert!(container.exists("a.xml"));
        assert!(!container.exists("d.xml"));
        assert_eq!(container.read_xml_opt("d.xml").unwrap(), None);
        assert!(matches!(
            container.read_xml("d.xml"),
            Err(Error::MissingComponent(_))
        ));
    }

    #[test]
    fn test_raw_copy_preserves_bytes() {
        let data = archive(&[("custom/data.bin", "payload")]);
        let container = OoxmlContainer::from_bytes(data).unwrap();

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        container.raw_copy_into("custom/data.bin", &mut zip).unwrap();
        let copied = OoxmlContainer::from_bytes(zip.finish().unwrap().into_inner()).unwrap();

        assert_eq!(copied.read_binary("custom/data.bin").unwrap(), b"payload");
    }

    #[test]
    fn test_utf16_decoding_function() {
        let utf16_le = b"\xFF\xFE<\0?\0x\0m\0l\0>\0";
        assert_eq!(decode_xml_bytes(utf16_le).unwrap(), "<?xml>");

        let utf16_be = b"\xFE\xFF\0<\0?\0x\0m\0l\0>";
        assert_eq!(decode_xml_bytes(utf16_be).unwrap(), "<?xml>");

        let utf8_bom = b"\xEF\xBB\xBF<?xml>";
        assert_eq!(decode_xml_bytes(utf8_bom).unwrap(), "<?xml>");

        assert_eq!(decode_xml_bytes(b"<?xml>").unwrap(), "<?xml>");
    }

    #[test]
    fn test_utf16_declaration_rewritten() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in r#"<?xml version="1.0" encoding="UTF-16"?><a/>"#.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode_xml_bytes(&bytes).unwrap();
        assert!(decoded.contains(r#"encoding="UTF-8""#));
    }
}
