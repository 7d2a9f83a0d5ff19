//! Entry-by-entry reconstruction of a defective package.

use super::detect::referenced_paragraph_styles;
use super::relationships::{ensure_relationship, normalize_relationships, RelsScope};
use super::settings::default_settings;
use super::styles::{add_placeholder_styles, declared_ids, minimal_styles, normalize_styles};
use crate::container::OoxmlContainer;
use crate::content_types::{ContentTypes, DocumentKind, CONTENT_TYPES_PART};
use crate::error::Result;
use crate::package::{
    PackageWriter, DOCUMENT_PART, DOCUMENT_RELS_PART, NUMBERING_PART, NUMBERING_REL_TYPE,
    PACKAGE_RELS_PART, RELATIONSHIPS_NS, SETTINGS_PART, SETTINGS_REL_TYPE, STYLES_PART,
    STYLES_REL_TYPE,
};
use crate::xml::{self, XmlElement};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// Id given to an added settings relationship.
pub const SETTINGS_REL_ID: &str = "Rsettings";

/// What happened to each entry during a rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// Entries replaced by a transformed version
    pub transformed: Vec<String>,
    /// Entries added because the source lacked them
    pub synthesized: Vec<String>,
    /// Entries that should have been transformed but were copied verbatim
    pub verbatim_fallbacks: Vec<String>,
    /// Entries byte-copied untouched
    pub copied: usize,
}

/// Builds a corrected copy of a package.
#[derive(Debug, Clone, Copy)]
pub struct Rewriter {
    kind: DocumentKind,
}

impl Rewriter {
    /// Create a rewriter producing a manifest for `kind`.
    pub fn new(kind: DocumentKind) -> Self {
        Self { kind }
    }

    /// Rewrite the archive at `path` and atomically replace it.
    pub fn rewrite_in_place(&self, path: &Path) -> Result<RewriteOutcome> {
        let source = OoxmlContainer::open(path)?;
        let (writer, outcome) = self.build(&source)?;
        writer.persist(path)?;
        Ok(outcome)
    }

    /// Produce the corrected archive for `source` without touching disk.
    pub fn build(&self, source: &OoxmlContainer) -> Result<(PackageWriter, RewriteOutcome)> {
        let mut writer = PackageWriter::new();
        let mut outcome = RewriteOutcome::default();
        let referenced = referenced_styles(source);

        for name in source.list_files() {
            match name.as_str() {
                CONTENT_TYPES_PART => {
                    writer.add_xml(&name, &self.manifest(source).to_element())?;
                    outcome.transformed.push(name);
                }
                PACKAGE_RELS_PART => {
                    write_relationships(source, &mut writer, &name, RelsScope::Package, &mut outcome)?
                }
                DOCUMENT_RELS_PART => {
                    write_relationships(source, &mut writer, &name, RelsScope::Document, &mut outcome)?
                }
                STYLES_PART => {
                    write_styles(source, &mut writer, &name, referenced.as_ref(), &mut outcome)?
                }
                _ => {
                    writer.copy_raw(source, &name)?;
                    outcome.copied += 1;
                }
            }
        }

        if !source.exists(CONTENT_TYPES_PART) {
            writer.add_xml(CONTENT_TYPES_PART, &ContentTypes::canonical(self.kind).to_element())?;
            outcome.synthesized.push(CONTENT_TYPES_PART.to_string());
        }

        if !source.exists(STYLES_PART) {
            if let Some(missing) = referenced.filter(|r| !r.is_empty()) {
                writer.add_xml(STYLES_PART, &normalize_styles(minimal_styles(&missing)))?;
                outcome.synthesized.push(STYLES_PART.to_string());
            }
        }

        if !source.exists(SETTINGS_PART) {
            writer.add_xml(SETTINGS_PART, &default_settings())?;
            outcome.synthesized.push(SETTINGS_PART.to_string());
        }

        if !source.exists(DOCUMENT_RELS_PART) {
            writer.add_xml(DOCUMENT_RELS_PART, &document_relationships(source, &outcome))?;
            outcome.synthesized.push(DOCUMENT_RELS_PART.to_string());
        }

        debug!(
            transformed = ?outcome.transformed,
            synthesized = ?outcome.synthesized,
            copied = outcome.copied,
            "package rebuilt"
        );
        Ok((writer, outcome))
    }

    /// Canonical manifest, keeping source entries for parts still present.
    fn manifest(&self, source: &OoxmlContainer) -> ContentTypes {
        let existing = source
            .read_xml(CONTENT_TYPES_PART)
            .and_then(|xml| ContentTypes::parse(&xml))
            .unwrap_or_default();
        ContentTypes::canonical_with(self.kind, &existing, source.list_files())
    }
}

/// Relationships part for a document that had none, linking the styles,
/// numbering and settings parts the rebuilt package contains.
fn document_relationships(source: &OoxmlContainer, outcome: &RewriteOutcome) -> XmlElement {
    let present = |part: &str| source.exists(part) || outcome.synthesized.iter().any(|s| s == part);
    let mut root = XmlElement::new("Relationships").attr("xmlns", RELATIONSHIPS_NS);
    for (part, rel_type, target, id) in [
        (STYLES_PART, STYLES_REL_TYPE, "styles.xml", "rId1"),
        (NUMBERING_PART, NUMBERING_REL_TYPE, "numbering.xml", "rId2"),
    ] {
        if present(part) {
            root = ensure_relationship(root, rel_type, target, id).0;
        }
    }
    ensure_relationship(root, SETTINGS_REL_TYPE, "settings.xml", SETTINGS_REL_ID).0
}

/// Paragraph style ids the document references, or `None` when the
/// document is absent or unparsable.
fn referenced_styles(source: &OoxmlContainer) -> Option<BTreeSet<String>> {
    let xml = source.read_xml(DOCUMENT_PART).ok()?;
    match referenced_paragraph_styles(&xml) {
        Ok(ids) => Some(ids),
        Err(e) => {
            warn!(error = %e, "document part unparsable, skipping style augmentation");
            None
        }
    }
}

fn parse_part(source: &OoxmlContainer, name: &str) -> Result<XmlElement> {
    let content = source.read_xml(name)?;
    xml::parse(&content)
}

fn write_relationships(
    source: &OoxmlContainer,
    writer: &mut PackageWriter,
    name: &str,
    scope: RelsScope,
    outcome: &mut RewriteOutcome,
) -> Result<()> {
    let root = match parse_part(source, name) {
        Ok(root) => root,
        Err(e) => {
            warn!(part = name, error = %e, "relationships unparsable, copying verbatim");
            writer.copy_raw(source, name)?;
            outcome.verbatim_fallbacks.push(name.to_string());
            return Ok(());
        }
    };

    let (mut root, changed) = normalize_relationships(root, scope);
    debug!(part = name, changed, "relationship targets normalized");

    if scope == RelsScope::Document {
        let (with_settings, added) =
            ensure_relationship(root, SETTINGS_REL_TYPE, "settings.xml", SETTINGS_REL_ID);
        if added {
            debug!(part = name, "settings relationship added");
        }
        root = with_settings;
    }

    writer.add_xml(name, &root)?;
    outcome.transformed.push(name.to_string());
    Ok(())
}

fn write_styles(
    source: &OoxmlContainer,
    writer: &mut PackageWriter,
    name: &str,
    referenced: Option<&BTreeSet<String>>,
    outcome: &mut RewriteOutcome,
) -> Result<()> {
    let root = match parse_part(source, name) {
        Ok(root) => root,
        Err(e) => {
            warn!(part = name, error = %e, "styles unparsable, copying verbatim");
            writer.copy_raw(source, name)?;
            outcome.verbatim_fallbacks.push(name.to_string());
            return Ok(());
        }
    };

    let root = match referenced {
        Some(referenced) => {
            let declared = declared_ids(&root);
            let missing: BTreeSet<String> = referenced.difference(&declared).cloned().collect();
            if !missing.is_empty() {
                debug!(?missing, "adding placeholder styles");
            }
            add_placeholder_styles(root, &missing)
        }
        None => root,
    };

    writer.add_xml(name, &normalize_styles(root))?;
    outcome.transformed.push(name.to_string());
    Ok(())
}
