//! Read-only structural inspection of a package.

use crate::container::{OoxmlContainer, Relationship, Relationships};
use crate::content_types::{ContentTypes, CANONICAL_OVERRIDES, CONTENT_TYPES_PART, XML_CONTENT_TYPE};
use crate::error::{Error, Result};
use crate::package::{DOCUMENT_PART, DOCUMENT_RELS_PART, PACKAGE_RELS_PART, STYLES_PART};
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Overrides whose absence marks the manifest as defective.
const REQUIRED_OVERRIDES: [&str; 3] = [
    CANONICAL_OVERRIDES[0],
    CANONICAL_OVERRIDES[1],
    CANONICAL_OVERRIDES[2],
];

/// A single structural defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// `[Content_Types].xml` is not well-formed
    ManifestUnparsable(String),
    /// No `Default` with the expected content type for an extension
    MissingDefault { extension: String },
    /// No `Override` for a required part
    MissingOverride { part_name: String },
    /// A relationships part is not well-formed
    RelationshipsUnparsable { part: String, reason: String },
    /// A relationship target is an absolute in-package path
    AbsoluteTarget {
        part: String,
        id: String,
        target: String,
    },
    /// `word/styles.xml` is not well-formed
    StylesUnparsable(String),
    /// `word/document.xml` is not well-formed
    DocumentUnparsable(String),
    /// A paragraph references a style that is not declared
    UndeclaredStyle { style_id: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::ManifestUnparsable(reason) => write!(f, "manifest unparsable: {}", reason),
            Finding::MissingDefault { extension } => {
                write!(f, "manifest lacks Default for .{}", extension)
            }
            Finding::MissingOverride { part_name } => {
                write!(f, "manifest lacks Override for {}", part_name)
            }
            Finding::RelationshipsUnparsable { part, reason } => {
                write!(f, "{} unparsable: {}", part, reason)
            }
            Finding::AbsoluteTarget { part, id, target } => {
                write!(f, "{} relationship {} has absolute target {}", part, id, target)
            }
            Finding::StylesUnparsable(reason) => write!(f, "styles unparsable: {}", reason),
            Finding::DocumentUnparsable(reason) => write!(f, "document unparsable: {}", reason),
            Finding::UndeclaredStyle { style_id } => {
                write!(f, "style {} is referenced but not declared", style_id)
            }
        }
    }
}

/// Outcome of inspecting a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnosis {
    /// Manifest or style cross-reference defects
    pub needs_fix: bool,
    /// Relationship targets stored as absolute paths
    pub has_leading_slash_targets: bool,
    /// Referenced-but-undeclared paragraph styles
    pub missing_styles: BTreeSet<String>,
    /// Every defect found, in check order
    pub findings: Vec<Finding>,
}

impl Diagnosis {
    /// Whether the package must be rewritten.
    pub fn requires_repair(&self) -> bool {
        self.needs_fix || self.has_leading_slash_targets
    }
}

/// Structural checks over a package. Behavior is fixed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detector;

impl Detector {
    /// Open the archive at `path` and inspect it.
    ///
    /// Only I/O and ZIP-level failures are returned as errors; malformed
    /// parts become findings.
    pub fn inspect_path(path: impl AsRef<Path>) -> Result<Diagnosis> {
        let container = OoxmlContainer::open(path)?;
        Ok(Self::inspect(&container))
    }

    /// Inspect an opened package without modifying it.
    pub fn inspect(container: &OoxmlContainer) -> Diagnosis {
        let mut diagnosis = Diagnosis::default();
        check_manifest(container, &mut diagnosis);
        for part in [PACKAGE_RELS_PART, DOCUMENT_RELS_PART] {
            check_relationships(container, part, &mut diagnosis);
        }
        check_style_references(container, &mut diagnosis);

        debug!(
            needs_fix = diagnosis.needs_fix,
            leading_slash = diagnosis.has_leading_slash_targets,
            findings = diagnosis.findings.len(),
            "package inspected"
        );
        diagnosis
    }
}

fn check_manifest(container: &OoxmlContainer, diagnosis: &mut Diagnosis) {
    let types = match container
        .read_xml_opt(CONTENT_TYPES_PART)
        .and_then(|xml| xml.map(|x| ContentTypes::parse(&x)).transpose())
    {
        Ok(Some(types)) => types,
        Ok(None) => return,
        Err(e) => {
            diagnosis.needs_fix = true;
            diagnosis
                .findings
                .push(Finding::ManifestUnparsable(e.to_string()));
            return;
        }
    };

    let xml_default_ok = types
        .default_for("xml")
        .is_some_and(|d| d.content_type == XML_CONTENT_TYPE);
    if !xml_default_ok {
        diagnosis.needs_fix = true;
        diagnosis.findings.push(Finding::MissingDefault {
            extension: "xml".to_string(),
        });
    }

    for part_name in REQUIRED_OVERRIDES {
        if types.override_for(part_name).is_none() {
            diagnosis.needs_fix = true;
            diagnosis.findings.push(Finding::MissingOverride {
                part_name: part_name.to_string(),
            });
        }
    }
}

fn check_relationships(container: &OoxmlContainer, part: &str, diagnosis: &mut Diagnosis) {
    if !container.exists(part) {
        return;
    }
    let rels = match container.read_relationships(part) {
        Ok(rels) => rels,
        Err(e) => {
            diagnosis.has_leading_slash_targets = true;
            diagnosis.findings.push(Finding::RelationshipsUnparsable {
                part: part.to_string(),
                reason: e.to_string(),
            });
            return;
        }
    };

    for rel in absolute_word_targets(&rels) {
        diagnosis.has_leading_slash_targets = true;
        diagnosis.findings.push(Finding::AbsoluteTarget {
            part: part.to_string(),
            id: rel.id.clone(),
            target: rel.target.clone(),
        });
    }
}

/// Internal relationships whose target starts with `/word/`.
fn absolute_word_targets(rels: &Relationships) -> impl Iterator<Item = &Relationship> {
    rels.iter()
        .filter(|r| !r.external && r.target.starts_with("/word/"))
}

fn check_style_references(container: &OoxmlContainer, diagnosis: &mut Diagnosis) {
    let declared = match container
        .read_xml_opt(STYLES_PART)
        .and_then(|xml| xml.map(|x| declared_style_ids(&x)).transpose())
    {
        Ok(ids) => ids.unwrap_or_default(),
        Err(e) => {
            diagnosis.needs_fix = true;
            diagnosis.findings.push(Finding::StylesUnparsable(e.to_string()));
            BTreeSet::new()
        }
    };

    let referenced = match container
        .read_xml_opt(DOCUMENT_PART)
        .and_then(|xml| xml.map(|x| referenced_paragraph_styles(&x)).transpose())
    {
        Ok(Some(ids)) => ids,
        Ok(None) => return,
        Err(e) => {
            diagnosis.needs_fix = true;
            diagnosis.findings.push(Finding::DocumentUnparsable(e.to_string()));
            return;
        }
    };

    for style_id in referenced.difference(&declared) {
        diagnosis.needs_fix = true;
        diagnosis.missing_styles.insert(style_id.clone());
        diagnosis.findings.push(Finding::UndeclaredStyle {
            style_id: style_id.clone(),
        });
    }
}

/// Collect every `styleId` declared by a `<w:style>` element.
pub fn declared_style_ids(styles_xml: &str) -> Result<BTreeSet<String>> {
    collect_attribute_values(styles_xml, b"style", b"styleId")
}

/// Collect every style id referenced through `<w:pStyle w:val="..."/>`.
///
/// Run-level `rStyle` references are not inspected.
pub fn referenced_paragraph_styles(document_xml: &str) -> Result<BTreeSet<String>> {
    collect_attribute_values(document_xml, b"pStyle", b"val")
}

/// Stream through a part collecting one attribute of one element kind.
///
/// The whole part is read so malformed markup anywhere is reported.
fn collect_attribute_values(
    xml: &str,
    element: &[u8],
    attribute: &[u8],
) -> Result<BTreeSet<String>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut values = BTreeSet::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                seen_root = true;
                collect_from(&e, element, attribute, &mut values)?;
            }
            Ok(Event::Empty(e)) => {
                seen_root = true;
                collect_from(&e, element, attribute, &mut values)?;
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
    }

    if !seen_root {
        return Err(Error::XmlParse("no root element".to_string()));
    }
    if depth != 0 {
        return Err(Error::XmlParse("unexpected end of part".to_string()));
    }
    Ok(values)
}

fn collect_from(
    e: &BytesStart<'_>,
    element: &[u8],
    attribute: &[u8],
    values: &mut BTreeSet<String>,
) -> Result<()> {
    if e.local_name().as_ref() != element {
        return Ok(());
    }
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == attribute {
            let value = attr
                .unescape_value()
                .map_err(|err| Error::XmlParse(err.to_string()))?;
            if !value.is_empty() {
                values.insert(value.into_owned());
            }
        }
    }
    Ok(())
}
