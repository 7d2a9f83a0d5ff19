//! `[Content_Types].xml` model and the document/template kind.

use crate::error::Result;
use crate::xml::{self, XmlElement};
use std::collections::HashSet;
use std::path::Path;

/// Entry name of the package manifest.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub const RELATIONSHIPS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-package.relationships+xml";
pub const XML_CONTENT_TYPE: &str = "application/xml";

pub const DOCUMENT_MAIN_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const TEMPLATE_MAIN_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
pub const MACRO_DOCUMENT_MAIN_CONTENT_TYPE: &str =
    "application/vnd.ms-word.document.macroEnabled.main+xml";
pub const MACRO_TEMPLATE_MAIN_CONTENT_TYPE: &str =
    "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";
pub const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
pub const NUMBERING_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
pub const SETTINGS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";

/// Part names that always get an Override in the canonical manifest.
pub const CANONICAL_OVERRIDES: [&str; 4] = [
    "/word/document.xml",
    "/word/styles.xml",
    "/word/numbering.xml",
    "/word/settings.xml",
];

/// Whether the main part is a document or a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    /// Regular document (.docx)
    #[default]
    Document,
    /// Template (.dotx)
    Template,
    /// Macro-enabled document (.docm)
    MacroEnabledDocument,
    /// Macro-enabled template (.dotm)
    MacroEnabledTemplate,
}

impl DocumentKind {
    /// Classify by file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "dotx" => DocumentKind::Template,
            "docm" => DocumentKind::MacroEnabledDocument,
            "dotm" => DocumentKind::MacroEnabledTemplate,
            _ => DocumentKind::Document,
        }
    }

    /// Classify by the extension of an output path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Content type of `/word/document.xml` for this kind.
    pub fn main_content_type(&self) -> &'static str {
        match self {
            DocumentKind::Document => DOCUMENT_MAIN_CONTENT_TYPE,
            DocumentKind::Template => TEMPLATE_MAIN_CONTENT_TYPE,
            DocumentKind::MacroEnabledDocument => MACRO_DOCUMENT_MAIN_CONTENT_TYPE,
            DocumentKind::MacroEnabledTemplate => MACRO_TEMPLATE_MAIN_CONTENT_TYPE,
        }
    }
}

/// A `Default` manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultEntry {
    pub extension: String,
    pub content_type: String,
}

/// An `Override` manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub part_name: String,
    pub content_type: String,
}

/// Parsed `[Content_Types].xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    pub defaults: Vec<DefaultEntry>,
    pub overrides: Vec<OverrideEntry>,
}

impl ContentTypes {
    /// Parse a manifest. Fails on malformed XML.
    pub fn parse(xml: &str) -> Result<Self> {
        let root = xml::parse(xml)?;
        let mut types = ContentTypes::default();
        for element in root.elements() {
            match element.local_name() {
                "Default" => types.defaults.push(DefaultEntry {
                    extension: element.get_attr("Extension").unwrap_or_default().to_string(),
                    content_type: element.get_attr("ContentType").unwrap_or_default().to_string(),
                }),
                "Override" => types.overrides.push(OverrideEntry {
                    part_name: element.get_attr("PartName").unwrap_or_default().to_string(),
                    content_type: element.get_attr("ContentType").unwrap_or_default().to_string(),
                }),
                _ => {}
            }
        }
        Ok(types)
    }

    /// The canonical manifest for a word-processing package.
    pub fn canonical(kind: DocumentKind) -> Self {
        let defaults = vec![
            DefaultEntry {
                extension: "rels".to_string(),
                content_type: RELATIONSHIPS_CONTENT_TYPE.to_string(),
            },
            DefaultEntry {
                extension: "xml".to_string(),
                content_type: XML_CONTENT_TYPE.to_string(),
            },
        ];
        let override_types = [
            kind.main_content_type(),
            STYLES_CONTENT_TYPE,
            NUMBERING_CONTENT_TYPE,
            SETTINGS_CONTENT_TYPE,
        ];
        let overrides = CANONICAL_OVERRIDES
            .iter()
            .zip(override_types)
            .map(|(part, content_type)| OverrideEntry {
                part_name: part.to_string(),
                content_type: content_type.to_string(),
            })
            .collect();
        Self {
            defaults,
            overrides,
        }
    }

    /// Canonical manifest plus entries of `source` that still apply.
    ///
    /// Defaults for other extensions are kept. Overrides are kept only for
    /// non-canonical parts that appear among `entries`, the archive's entry
    /// names. Part names compare case-insensitively.
    pub fn canonical_with<I, S>(kind: DocumentKind, source: &ContentTypes, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut types = Self::canonical(kind);
        let present: HashSet<String> = entries
            .into_iter()
            .map(|name| name.as_ref().to_ascii_lowercase())
            .collect();

        for entry in &source.defaults {
            if types.default_for(&entry.extension).is_none() {
                types.defaults.push(entry.clone());
            }
        }
        for entry in &source.overrides {
            let entry_path = entry.part_name.trim_start_matches('/').to_ascii_lowercase();
            if types.override_for(&entry.part_name).is_none() && present.contains(&entry_path) {
                types.overrides.push(entry.clone());
            }
        }
        types
    }

    /// Default entry for an extension (case-insensitive).
    pub fn default_for(&self, extension: &str) -> Option<&DefaultEntry> {
        self.defaults
            .iter()
            .find(|d| d.extension.eq_ignore_ascii_case(extension))
    }

    /// Override entry for a part name (case-insensitive, per OPC).
    pub fn override_for(&self, part_name: &str) -> Option<&OverrideEntry> {
        self.overrides
            .iter()
            .find(|o| o.part_name.eq_ignore_ascii_case(part_name))
    }

    /// Build the manifest element tree.
    pub fn to_element(&self) -> XmlElement {
        let defaults = self.defaults.iter().map(|d| {
            XmlElement::new("Default")
                .attr("Extension", d.extension.as_str())
                .attr("ContentType", d.content_type.as_str())
        });
        let overrides = self.overrides.iter().map(|o| {
            XmlElement::new("Override")
                .attr("PartName", o.part_name.as_str())
                .attr("ContentType", o.content_type.as_str())
        });
        XmlElement::new("Types")
            .attr("xmlns", CONTENT_TYPES_NS)
            .children(defaults)
            .children(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(DocumentKind::from_path("out/Spec.dotx"), DocumentKind::Template);
        assert_eq!(DocumentKind::from_path("Spec.DOTX"), DocumentKind::Template);
        assert_eq!(DocumentKind::from_path("Spec.docx"), DocumentKind::Document);
        assert_eq!(DocumentKind::from_path("Spec.DocX"), DocumentKind::Document);
        assert_eq!(DocumentKind::from_path("Spec"), DocumentKind::Document);
        assert_eq!(
            DocumentKind::from_path("Spec.docm"),
            DocumentKind::MacroEnabledDocument
        );
        assert_eq!(
            DocumentKind::from_path("Spec.DOTM"),
            DocumentKind::MacroEnabledTemplate
        );
    }

    #[test]
    fn test_main_content_type() {
        assert!(DocumentKind::Template
            .main_content_type()
            .ends_with("template.main+xml"));
        assert!(DocumentKind::Document
            .main_content_type()
            .ends_with("document.main+xml"));
        assert_eq!(
            DocumentKind::MacroEnabledDocument.main_content_type(),
            "application/vnd.ms-word.document.macroEnabled.main+xml"
        );
        assert_eq!(
            DocumentKind::MacroEnabledTemplate.main_content_type(),
            "application/vnd.ms-word.template.macroEnabledTemplate.main+xml"
        );
    }

    #[test]
    fn test_canonical_manifest() {
        let types = ContentTypes::canonical(DocumentKind::Template);
        assert_eq!(
            types.default_for("XML").unwrap().content_type,
            XML_CONTENT_TYPE
        );
        assert!(types.default_for("rels").is_some());
        for part in CANONICAL_OVERRIDES {
            assert!(types.override_for(part).is_some(), "missing {}", part);
        }
        assert_eq!(
            types.override_for("/word/document.xml").unwrap().content_type,
            TEMPLATE_MAIN_CONTENT_TYPE
        );
    }

    #[test]
    fn test_parse_roundtrip_through_element() {
        let types = ContentTypes::canonical(DocumentKind::Document);
        let bytes = types.to_element().to_xml_bytes().unwrap();
        let parsed = ContentTypes::parse(std::str::from_utf8(&bytes).unwrap()).unwrap();
        assert_eq!(parsed, types);
    }

    #[test]
    fn test_canonical_with_keeps_live_extras() {
        let source = ContentTypes::parse(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="png" ContentType="image/png"/>
  <Default Extension="xml" ContentType="text/xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/word/footer1.xml" ContentType="application/footer"/>
  <Override PartName="/word/document.xml" ContentType="wrong"/>
</Types>"#,
        )
        .unwrap();

        let types =
            ContentTypes::canonical_with(DocumentKind::Document, &source, ["docProps/core.xml"]);

        assert_eq!(types.default_for("png").unwrap().content_type, "image/png");
        assert_eq!(types.default_for("xml").unwrap().content_type, XML_CONTENT_TYPE);
        assert!(types.override_for("/docProps/core.xml").is_some());
        assert!(types.override_for("/word/footer1.xml").is_none());
        assert_eq!(
            types.override_for("/word/document.xml").unwrap().content_type,
            DOCUMENT_MAIN_CONTENT_TYPE
        );
    }

    #[test]
    fn test_canonical_with_matches_part_names_case_insensitively() {
        let source = ContentTypes::parse(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Override PartName="/word/Footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>
  <Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>
</Types>"#,
        )
        .unwrap();

        let types = ContentTypes::canonical_with(
            DocumentKind::Document,
            &source,
            ["word/footer1.xml", "WORD/HEADER1.XML"],
        );

        assert!(types.override_for("/word/footer1.xml").is_some());
        assert_eq!(
            types.override_for("/word/Footer1.xml").unwrap().part_name,
            "/word/Footer1.xml"
        );
        assert!(types.override_for("/word/header1.xml").is_some());
    }
}
