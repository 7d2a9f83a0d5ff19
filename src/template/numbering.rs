//! `word/numbering.xml` construction.

use super::config::{LevelStyle, TemplateConfig};
use crate::package::WORDML_NS;
use crate::xml::XmlElement;

/// `w:numId` linking heading styles to their numbering.
pub const HEADING_NUM_ID: u32 = 1;
/// `w:numId` linking requirement styles to their numbering.
pub const REQUIREMENT_NUM_ID: u32 = 2;

/// Dotted positional counter text for a 0-based level: `%1`, `%1.%2`, ...
pub fn level_text(prefix: &str, level: usize) -> String {
    let counters: Vec<String> = (1..=level + 1).map(|n| format!("%{}", n)).collect();
    format!("{}{}", prefix, counters.join("."))
}

fn numbering_level(level: &LevelStyle, ilvl: usize, prefix: &str) -> XmlElement {
    XmlElement::new("w:lvl")
        .attr("w:ilvl", ilvl.to_string())
        .child(XmlElement::new("w:start").attr("w:val", "1"))
        .child(XmlElement::new("w:numFmt").attr("w:val", "decimal"))
        .child(XmlElement::new("w:pStyle").attr("w:val", level.style_id.as_str()))
        .child(XmlElement::new("w:lvlText").attr("w:val", level_text(prefix, ilvl)))
        .child(XmlElement::new("w:lvlJc").attr("w:val", "left"))
        .child(
            XmlElement::new("w:pPr").child(
                XmlElement::new("w:ind")
                    .attr("w:left", level.indent_left.to_string())
                    .attr("w:hanging", level.indent_hanging.to_string()),
            ),
        )
}

/// One multilevel abstract numbering definition.
pub fn abstract_num(abstract_id: u32, levels: &[LevelStyle], prefix: &str) -> XmlElement {
    XmlElement::new("w:abstractNum")
        .attr("w:abstractNumId", abstract_id.to_string())
        .child(XmlElement::new("w:multiLevelType").attr("w:val", "multilevel"))
        .children(
            levels
                .iter()
                .enumerate()
                .map(|(ilvl, level)| numbering_level(level, ilvl, prefix)),
        )
}

fn num(num_id: u32, abstract_id: u32) -> XmlElement {
    XmlElement::new("w:num")
        .attr("w:numId", num_id.to_string())
        .child(XmlElement::new("w:abstractNumId").attr("w:val", abstract_id.to_string()))
}

/// Numbering part: headings use abstract 0 / num 1, requirements 1 / 2.
///
/// Families with no levels are left out.
pub fn numbering_part(config: &TemplateConfig) -> XmlElement {
    let families = [
        (0, HEADING_NUM_ID, config.headings.as_slice(), ""),
        (
            1,
            REQUIREMENT_NUM_ID,
            config.requirements.as_slice(),
            config.requirement_prefix.as_str(),
        ),
    ];
    let active: Vec<_> = families
        .iter()
        .filter(|(_, _, levels, _)| !levels.is_empty())
        .collect();

    XmlElement::new("w:numbering")
        .attr("xmlns:w", WORDML_NS)
        .children(
            active
                .iter()
                .map(|(abstract_id, _, levels, prefix)| abstract_num(*abstract_id, levels, prefix)),
        )
        .children(
            active
                .iter()
                .map(|(abstract_id, num_id, _, _)| num(*num_id, *abstract_id)),
        )
}
