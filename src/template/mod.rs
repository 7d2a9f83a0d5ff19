//! Requirements template generation.
//!
//! [`TemplateBuilder`] assembles a complete word-processing package from a
//! [`TemplateConfig`]: heading and requirement styles bound to multilevel
//! numbering, note styles, and a sample paragraph for each. Every build is
//! followed by a [`PackageFixer`] pass so the file on disk opens without a
//! repair prompt even when the configuration references styles it never
//! declares.
//!
//! ```no_run
//! use reqdot::template::{TemplateBuilder, TemplateConfig};
//!
//! let config = TemplateConfig::default().with_font("Arial", 22);
//! let report = TemplateBuilder::new(config).build("Requirements.dotx")?;
//! println!("repaired after build: {}", report.repaired);
//! # Ok::<(), reqdot::Error>(())
//! ```

pub mod config;
pub mod document;
pub mod numbering;
pub mod styles;

pub use config::{LevelStyle, NoteStyle, SampleParagraph, TemplateConfig};

use crate::container::Relationship;
use crate::content_types::{ContentTypes, DocumentKind, CONTENT_TYPES_PART};
use crate::error::Result;
use crate::fixer::settings::default_settings_with_language;
use crate::fixer::{FixReport, PackageFixer};
use crate::package::{
    PackageWriter, DOCUMENT_PART, DOCUMENT_RELS_PART, NUMBERING_PART, NUMBERING_REL_TYPE,
    OFFICE_DOCUMENT_REL_TYPE, PACKAGE_RELS_PART, RELATIONSHIPS_NS, SETTINGS_PART,
    SETTINGS_REL_TYPE, STYLES_PART, STYLES_REL_TYPE,
};
use crate::xml::XmlElement;
use std::path::Path;
use tracing::{debug, info};

/// State shared by the part builders of one build.
#[derive(Debug, Default)]
pub struct BuildContext {
    next_bookmark_id: u32,
}

impl BuildContext {
    /// Fresh context; bookmark ids start at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next bookmark id.
    pub fn next_bookmark_id(&mut self) -> u32 {
        let id = self.next_bookmark_id;
        self.next_bookmark_id += 1;
        id
    }
}

fn relationships(records: &[Relationship]) -> XmlElement {
    XmlElement::new("Relationships")
        .attr("xmlns", RELATIONSHIPS_NS)
        .children(records.iter().map(|r| {
            XmlElement::new("Relationship")
                .attr("Id", r.id.as_str())
                .attr("Type", r.rel_type.as_str())
                .attr("Target", r.target.as_str())
        }))
}

fn internal(id: &str, rel_type: &str, target: &str) -> Relationship {
    Relationship {
        id: id.to_string(),
        rel_type: rel_type.to_string(),
        target: target.to_string(),
        external: false,
    }
}

/// Builds requirements templates.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    config: TemplateConfig,
}

impl TemplateBuilder {
    /// Create a builder for `config`.
    pub fn new(config: TemplateConfig) -> Self {
        Self { config }
    }

    /// The configuration this builder uses.
    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// Every part of the package as `(entry name, root element)`, in
    /// archive order.
    pub fn parts(&self, kind: DocumentKind) -> Result<Vec<(&'static str, XmlElement)>> {
        self.config.validate()?;
        let mut ctx = BuildContext::new();

        let package_rels = relationships(&[internal(
            "rId1",
            OFFICE_DOCUMENT_REL_TYPE,
            DOCUMENT_PART,
        )]);
        let document_rels = relationships(&[
            internal("rId1", STYLES_REL_TYPE, "styles.xml"),
            internal("rId2", NUMBERING_REL_TYPE, "numbering.xml"),
            internal("rId3", SETTINGS_REL_TYPE, "settings.xml"),
        ]);

        Ok(vec![
            (CONTENT_TYPES_PART, ContentTypes::canonical(kind).to_element()),
            (PACKAGE_RELS_PART, package_rels),
            (DOCUMENT_RELS_PART, document_rels),
            (DOCUMENT_PART, document::document_part(&self.config, &mut ctx)),
            (STYLES_PART, styles::styles_part(&self.config)),
            (NUMBERING_PART, numbering::numbering_part(&self.config)),
            (
                SETTINGS_PART,
                default_settings_with_language(&self.config.language),
            ),
        ])
    }

    /// Write the package to `path` without the fixer pass.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let kind = DocumentKind::from_path(path);
        let mut writer = PackageWriter::new();
        for (name, root) in self.parts(kind)? {
            writer.add_xml(name, &root)?;
        }
        writer.persist(path)?;
        debug!(path = %path.display(), ?kind, "template written");
        Ok(())
    }

    /// Write the package to `path`, then run the fixer over it.
    pub fn build(&self, path: impl AsRef<Path>) -> Result<FixReport> {
        let path = path.as_ref();
        self.write(path)?;
        let report = PackageFixer::new().fix(path)?;
        info!(
            path = %path.display(),
            repaired = report.repaired,
            "template generated"
        );
        Ok(report)
    }
}
