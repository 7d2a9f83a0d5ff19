//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// In-memory package description.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub entries: Vec<(String, Vec<u8>)>,
}

impl Fixture {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn with(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.set(name, content);
        self
    }

    pub fn set(&mut self, name: &str, content: impl AsRef<[u8]>) {
        let data = content.as_ref().to_vec();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = data,
            None => self.entries.push((name.to_string(), data)),
        }
    }

    pub fn without(mut self, name: &str) -> Self {
        self.entries.retain(|(n, _)| n != name);
        self
    }

    /// Build the archive; `media/` entries are stored, everything else deflated.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in &self.entries {
            let method = if name.starts_with("word/media/") {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

pub fn manifest(overrides: &[(&str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>"#,
    );
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            "\n  <Override PartName=\"{}\" ContentType=\"{}\"/>",
            part, content_type
        ));
    }
    xml.push_str("\n</Types>");
    xml
}

pub fn relationships(records: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"{}\">",
        RELS_NS
    );
    for (id, kind, target) in records {
        let external = target.starts_with("http") || *kind == "attachedTemplate";
        let mode = if external { " TargetMode=\"External\"" } else { "" };
        xml.push_str(&format!(
            "\n  <Relationship Id=\"{}\" Type=\"{}/{}\" Target=\"{}\"{}/>",
            id, REL_BASE, kind, target, mode
        ));
    }
    xml.push_str("\n</Relationships>");
    xml
}

pub fn document(styles: &[&str]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"{}\"><w:body>",
        W_NS
    );
    for style in styles {
        xml.push_str(&format!(
            "<w:p><w:pPr><w:pStyle w:val=\"{}\"/></w:pPr><w:r><w:t>{} text</w:t></w:r></w:p>",
            style, style
        ));
    }
    xml.push_str("<w:p><w:r><w:t>Unstyled</w:t></w:r></w:p></w:body></w:document>");
    xml
}

pub fn styles(declared: &[&str]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:styles xmlns:w=\"{}\"><w:docDefaults/>",
        W_NS
    );
    xml.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
    );
    for id in declared {
        xml.push_str(&format!(
            "<w:style w:type=\"paragraph\" w:styleId=\"{}\"><w:name w:val=\"{}\"/><w:basedOn w:val=\"Normal\"/><w:semiHidden/><w:unhideWhenUsed/></w:style>",
            id, id
        ));
    }
    xml.push_str("</w:styles>");
    xml
}

/// Small PNG-like blob; content only has to survive byte-for-byte.
pub fn image_bytes() -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend((0u16..512).map(|i| (i * 31 % 251) as u8));
    data
}

/// A package exhibiting every detectable defect.
pub fn defective_package() -> Fixture {
    Fixture::new()
        .with(
            "[Content_Types].xml",
            manifest(&[
                (
                    "/word/document.xml",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
                ),
                ("/customXml/item1.xml", "application/xml"),
                ("/word/gone.xml", "application/xml"),
            ]),
        )
        .with(
            "_rels/.rels",
            relationships(&[("rId1", "officeDocument", "/word/document.xml")]),
        )
        .with(
            "word/_rels/document.xml.rels",
            relationships(&[
                ("rId1", "styles", "/word/styles.xml"),
                ("rId2", "image", "/word/media/image1.png"),
                ("rId3", "hyperlink", "https://example.com/word/spec"),
                ("rId4", "attachedTemplate", "/word/Normal.dotm"),
            ]),
        )
        .with("word/document.xml", document(&["Heading1", "Requirement1", "Requirement9"]))
        .with("word/styles.xml", styles(&["Heading1", "Requirement1"]))
        .with("word/media/image1.png", image_bytes())
        .with("customXml/item1.xml", "<item   spacing='kept'/>")
}
