//! Template configuration tables.

use crate::error::{Error, Result};
use crate::fixer::styles::BASE_STYLE_ID;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum levels in one abstract numbering definition (`w:ilvl` 0-8).
pub const MAX_NUMBERING_LEVELS: usize = 9;

/// One outline level of a numbered style family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStyle {
    /// Style ID (e.g., "Heading1")
    pub style_id: String,
    /// Display name (e.g., "heading 1")
    pub name: String,
    /// Font size in half-points
    pub font_size: u32,
    /// Bold run text
    #[serde(default)]
    pub bold: bool,
    /// Left indent in twips
    #[serde(default)]
    pub indent_left: u32,
    /// Hanging indent in twips (room for the number)
    #[serde(default)]
    pub indent_hanging: u32,
    /// Space before in twips
    #[serde(default)]
    pub space_before: u32,
    /// Space after in twips
    #[serde(default)]
    pub space_after: u32,
}

/// An auxiliary note style (NOTE, RATIONALE, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteStyle {
    pub style_id: String,
    pub name: String,
    /// Label opening sample paragraphs (e.g., "NOTE")
    pub label: String,
    #[serde(default)]
    pub italic: bool,
    /// Left indent in twips
    #[serde(default)]
    pub indent_left: u32,
    /// Background fill as hex RGB
    #[serde(default)]
    pub shading: Option<String>,
}

/// A sample paragraph emitted after the generated ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleParagraph {
    pub style_id: String,
    pub text: String,
}

/// Everything the template builder needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Base font family
    pub font: String,
    /// Base font size in half-points
    pub font_size: u32,
    /// Document language tag
    pub language: String,
    /// Heading levels, outermost first
    pub headings: Vec<LevelStyle>,
    /// Requirement levels, outermost first
    pub requirements: Vec<LevelStyle>,
    /// Text placed before requirement numbers (e.g., "R" gives "R1.2")
    pub requirement_prefix: String,
    /// Note styles
    pub notes: Vec<NoteStyle>,
    /// Emit note styles at all
    pub include_notes: bool,
    /// Extra sample paragraphs appended to the body
    pub extra_samples: Vec<SampleParagraph>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            font: "Calibri".to_string(),
            font_size: 22,
            language: "en-US".to_string(),
            headings: default_headings(),
            requirements: default_requirements(),
            requirement_prefix: "R".to_string(),
            notes: default_notes(),
            include_notes: true,
            extra_samples: Vec::new(),
        }
    }
}

fn default_headings() -> Vec<LevelStyle> {
    const SIZES: [u32; 5] = [32, 28, 26, 24, 22];
    SIZES
        .iter()
        .enumerate()
        .map(|(i, &font_size)| {
            let level = i as u32 + 1;
            LevelStyle {
                style_id: format!("Heading{}", level),
                name: format!("heading {}", level),
                font_size,
                bold: true,
                indent_left: 432 + 144 * i as u32,
                indent_hanging: 432 + 144 * i as u32,
                space_before: if level == 1 { 360 } else { 240 },
                space_after: 120,
            }
        })
        .collect()
}

fn default_requirements() -> Vec<LevelStyle> {
    (0..8u32)
        .map(|i| {
            let level = i + 1;
            LevelStyle {
                style_id: format!("Requirement{}", level),
                name: format!("Requirement {}", level),
                font_size: 22,
                bold: level == 1,
                indent_left: 720 + 360 * i,
                indent_hanging: 720,
                space_before: 60,
                space_after: 60,
            }
        })
        .collect()
}

fn default_notes() -> Vec<NoteStyle> {
    [
        ("Note", "Note", "NOTE", None),
        ("Rationale", "Rationale", "RATIONALE", Some("F2F2F2")),
        ("Example", "Example", "EXAMPLE", None),
    ]
    .into_iter()
    .map(|(id, name, label, shading)| NoteStyle {
        style_id: id.to_string(),
        name: name.to_string(),
        label: label.to_string(),
        italic: true,
        indent_left: 720,
        shading: shading.map(String::from),
    })
    .collect()
}

impl TemplateConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TemplateConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the base font.
    pub fn with_font(mut self, font: impl Into<String>, size: u32) -> Self {
        self.font = font.into();
        self.font_size = size;
        self
    }

    /// Replace the heading levels.
    pub fn with_headings(mut self, headings: Vec<LevelStyle>) -> Self {
        self.headings = headings;
        self
    }

    /// Replace the requirement levels.
    pub fn with_requirements(mut self, requirements: Vec<LevelStyle>) -> Self {
        self.requirements = requirements;
        self
    }

    /// Enable or disable note styles.
    pub fn with_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }

    /// Append a sample paragraph using `style_id`.
    pub fn with_sample(mut self, style_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.extra_samples.push(SampleParagraph {
            style_id: style_id.into(),
            text: text.into(),
        });
        self
    }

    /// Note styles actually emitted.
    pub fn active_notes(&self) -> &[NoteStyle] {
        if self.include_notes {
            &self.notes
        } else {
            &[]
        }
    }

    /// Check level counts and style id uniqueness.
    pub fn validate(&self) -> Result<()> {
        for (family, levels) in [("heading", &self.headings), ("requirement", &self.requirements)] {
            if levels.len() > MAX_NUMBERING_LEVELS {
                return Err(Error::InvalidConfig(format!(
                    "{} {} levels exceed the limit of {}",
                    levels.len(),
                    family,
                    MAX_NUMBERING_LEVELS
                )));
            }
        }

        let mut seen = HashSet::new();
        let ids = self
            .headings
            .iter()
            .map(|l| l.style_id.as_str())
            .chain(self.requirements.iter().map(|l| l.style_id.as_str()))
            .chain(self.active_notes().iter().map(|n| n.style_id.as_str()));
        for id in ids {
            if id.is_empty() {
                return Err(Error::InvalidConfig("empty style id".to_string()));
            }
            if id == BASE_STYLE_ID {
                return Err(Error::InvalidConfig(format!("style id {} is reserved", id)));
            }
            if !seen.insert(id) {
                return Err(Error::InvalidConfig(format!("duplicate style id {}", id)));
            }
        }
        Ok(())
    }
}
