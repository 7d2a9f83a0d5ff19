//! # reqdot
//!
//! Requirements-document templates for Word, and a structural fixer for
//! word-processing packages.
//!
//! The generator writes a `.dotx` whose heading and requirement styles are
//! bound to multilevel numbering. The fixer inspects any `.docx`/`.dotx`
//! package for defects that make Word refuse or "repair" a file (an
//! incomplete `[Content_Types].xml`, absolute relationship targets,
//! paragraphs pointing at undeclared styles) and rewrites only the parts
//! that need it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use reqdot::{diagnose, fix_package, generate_template, TemplateConfig};
//!
//! // Build a template; the fixer runs automatically afterwards
//! let report = generate_template("Requirements.dotx", &TemplateConfig::default())?;
//! assert!(!report.diagnosis.requires_repair() || report.repaired);
//!
//! // Inspect and repair a package produced elsewhere
//! let diagnosis = diagnose("export.docx")?;
//! for finding in &diagnosis.findings {
//!     println!("{}", finding);
//! }
//! fix_package("export.docx")?;
//! # Ok::<(), reqdot::Error>(())
//! ```

pub mod container;
pub mod content_types;
pub mod error;
pub mod fixer;
pub mod package;
pub mod template;
pub mod xml;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use content_types::{ContentTypes, DocumentKind};
pub use error::{Error, Result};
pub use fixer::{Diagnosis, FixReport, Finding, PackageFixer};
pub use template::{BuildContext, TemplateBuilder, TemplateConfig};

use std::path::Path;

/// Repair the package at `path` in place when it has structural defects.
///
/// The main content type follows the extension: `.dotx` gets the template
/// type, `.docm`/`.dotm` their macro-enabled types, anything else the
/// document type.
///
/// # Example
///
/// ```no_run
/// let report = reqdot::fix_package("report.docx")?;
/// println!("rewritten: {}", report.repaired);
/// # Ok::<(), reqdot::Error>(())
/// ```
pub fn fix_package(path: impl AsRef<Path>) -> Result<FixReport> {
    PackageFixer::new().fix(path)
}

/// Inspect the package at `path` without modifying it.
pub fn diagnose(path: impl AsRef<Path>) -> Result<Diagnosis> {
    PackageFixer::new().diagnose(path)
}

/// Generate a requirements template at `path`, then fix it.
///
/// # Example
///
/// ```no_run
/// use reqdot::{generate_template, TemplateConfig};
///
/// let config = TemplateConfig::default().with_notes(false);
/// generate_template("Requirements.dotx", &config)?;
/// # Ok::<(), reqdot::Error>(())
/// ```
pub fn generate_template(path: impl AsRef<Path>, config: &TemplateConfig) -> Result<FixReport> {
    TemplateBuilder::new(config.clone()).build(path)
}
