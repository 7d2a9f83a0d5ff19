//! Package repair.
//!
//! [`PackageFixer`] inspects a word-processing package and, only when a
//! structural defect is found, rebuilds it and swaps the result into place:
//!
//! - manifest: replaced by the canonical `[Content_Types].xml`
//! - relationships: targets made relative, settings relationship ensured
//! - styles: placeholders for undeclared ids, then normalization
//! - settings: synthesized when absent
//!
//! Every other entry is copied byte-for-byte. A package without defects is
//! never rewritten, so running the fixer twice is a no-op the second time.
//!
//! ```no_run
//! use reqdot::fixer::PackageFixer;
//!
//! let report = PackageFixer::new().fix("Requirements.dotx")?;
//! if report.repaired {
//!     for finding in &report.diagnosis.findings {
//!         println!("fixed: {}", finding);
//!     }
//! }
//! # Ok::<(), reqdot::Error>(())
//! ```

pub mod detect;
pub mod relationships;
pub mod rewrite;
pub mod settings;
pub mod styles;

pub use detect::{Detector, Diagnosis, Finding};
pub use rewrite::{RewriteOutcome, Rewriter};

use crate::container::OoxmlContainer;
use crate::content_types::DocumentKind;
use crate::error::Result;
use std::path::Path;
use tracing::{debug, info};

/// Result of a fixer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixReport {
    /// What the detector found
    pub diagnosis: Diagnosis,
    /// Whether the archive was rewritten
    pub repaired: bool,
    /// Per-entry details of the rewrite, if one happened
    pub outcome: Option<RewriteOutcome>,
}

/// Detects and repairs structural defects in a package on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageFixer {
    kind: Option<DocumentKind>,
}

impl PackageFixer {
    /// Create a fixer that picks the document kind from the path extension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the main part content type regardless of extension.
    pub fn with_kind(mut self, kind: DocumentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Inspect the package at `path` without modifying it.
    pub fn diagnose(&self, path: impl AsRef<Path>) -> Result<Diagnosis> {
        Detector::inspect_path(path)
    }

    /// Repair the package at `path` in place if it is defective.
    ///
    /// Parse problems inside parts never fail the call; only I/O, ZIP and
    /// replace failures do, and in that case `path` is left untouched.
    pub fn fix(&self, path: impl AsRef<Path>) -> Result<FixReport> {
        let path = path.as_ref();
        let source = OoxmlContainer::open(path)?;
        let diagnosis = Detector::inspect(&source);

        if !diagnosis.requires_repair() {
            debug!(path = %path.display(), "package is compliant, leaving untouched");
            return Ok(FixReport {
                diagnosis,
                repaired: false,
                outcome: None,
            });
        }

        let kind = self.kind.unwrap_or_else(|| DocumentKind::from_path(path));
        let (writer, outcome) = Rewriter::new(kind).build(&source)?;
        drop(source);
        writer.persist(path)?;

        info!(
            path = %path.display(),
            findings = diagnosis.findings.len(),
            transformed = outcome.transformed.len(),
            synthesized = outcome.synthesized.len(),
            "package repaired"
        );
        Ok(FixReport {
            diagnosis,
            repaired: true,
            outcome: Some(outcome),
        })
    }
}
