//! `word/styles.xml` construction.

use super::config::{LevelStyle, NoteStyle, TemplateConfig};
use super::numbering::{HEADING_NUM_ID, REQUIREMENT_NUM_ID};
use crate::fixer::styles::BASE_STYLE_ID;
use crate::package::WORDML_NS;
use crate::xml::XmlElement;

/// UI priority Word assigns to built-in headings.
const HEADING_UI_PRIORITY: &str = "9";

fn val(name: &str, value: impl Into<String>) -> XmlElement {
    XmlElement::new(name).attr("w:val", value)
}

fn doc_defaults(config: &TemplateConfig) -> XmlElement {
    let fonts = XmlElement::new("w:rFonts")
        .attr("w:ascii", config.font.as_str())
        .attr("w:hAnsi", config.font.as_str())
        .attr("w:eastAsia", config.font.as_str())
        .attr("w:cs", config.font.as_str());
    let run = XmlElement::new("w:rPr")
        .child(fonts)
        .child(val("w:sz", config.font_size.to_string()))
        .child(val("w:szCs", config.font_size.to_string()))
        .child(
            XmlElement::new("w:lang")
                .attr("w:val", config.language.as_str())
                .attr("w:eastAsia", config.language.as_str())
                .attr("w:bidi", "ar-SA"),
        );
    let paragraph = XmlElement::new("w:pPr").child(
        XmlElement::new("w:spacing")
            .attr("w:after", "120")
            .attr("w:line", "264")
            .attr("w:lineRule", "auto"),
    );

    XmlElement::new("w:docDefaults")
        .child(XmlElement::new("w:rPrDefault").child(run))
        .child(XmlElement::new("w:pPrDefault").child(paragraph))
}

fn latent_styles() -> XmlElement {
    XmlElement::new("w:latentStyles")
        .attr("w:defLockedState", "0")
        .attr("w:defUIPriority", "99")
        .attr("w:defSemiHidden", "0")
        .attr("w:defUnhideWhenUsed", "0")
        .attr("w:defQFormat", "0")
        .attr("w:count", "376")
}

fn normal_style() -> XmlElement {
    XmlElement::new("w:style")
        .attr("w:type", "paragraph")
        .attr("w:default", "1")
        .attr("w:styleId", BASE_STYLE_ID)
        .child(val("w:name", BASE_STYLE_ID))
        .child(XmlElement::new("w:qFormat"))
}

/// Which family a numbered level belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Heading,
    Requirement,
}

fn level_style(level: &LevelStyle, ilvl: usize, family: Family) -> XmlElement {
    let mut style = XmlElement::new("w:style").attr("w:type", "paragraph");
    if family == Family::Requirement {
        style = style.attr("w:customStyle", "1");
    }
    style = style
        .attr("w:styleId", level.style_id.as_str())
        .child(val("w:name", level.name.as_str()))
        .child(val("w:basedOn", BASE_STYLE_ID));

    let (next, num_id) = match family {
        Family::Heading => (BASE_STYLE_ID, HEADING_NUM_ID),
        Family::Requirement => (level.style_id.as_str(), REQUIREMENT_NUM_ID),
    };
    style = style.child(val("w:next", next));
    if family == Family::Heading {
        style = style.child(val("w:uiPriority", HEADING_UI_PRIORITY));
    }
    style = style.child(XmlElement::new("w:qFormat"));

    let mut paragraph = XmlElement::new("w:pPr");
    if family == Family::Heading {
        paragraph = paragraph.child(XmlElement::new("w:keepNext"));
    }
    paragraph = paragraph
        .child(
            XmlElement::new("w:numPr")
                .child(val("w:ilvl", ilvl.to_string()))
                .child(val("w:numId", num_id.to_string())),
        )
        .child(
            XmlElement::new("w:spacing")
                .attr("w:before", level.space_before.to_string())
                .attr("w:after", level.space_after.to_string()),
        )
        .child(
            XmlElement::new("w:ind")
                .attr("w:left", level.indent_left.to_string())
                .attr("w:hanging", level.indent_hanging.to_string()),
        );
    if family == Family::Heading {
        paragraph = paragraph.child(val("w:outlineLvl", ilvl.to_string()));
    }

    let mut run = XmlElement::new("w:rPr");
    if level.bold {
        run = run.child(XmlElement::new("w:b"));
    }
    run = run
        .child(val("w:sz", level.font_size.to_string()))
        .child(val("w:szCs", level.font_size.to_string()));

    style.child(paragraph).child(run)
}

fn note_style(note: &NoteStyle) -> XmlElement {
    let mut paragraph = XmlElement::new("w:pPr");
    if let Some(fill) = &note.shading {
        paragraph = paragraph.child(
            XmlElement::new("w:shd")
                .attr("w:val", "clear")
                .attr("w:color", "auto")
                .attr("w:fill", fill.as_str()),
        );
    }
    paragraph = paragraph.child(XmlElement::new("w:ind").attr("w:left", note.indent_left.to_string()));

    let mut style = XmlElement::new("w:style")
        .attr("w:type", "paragraph")
        .attr("w:customStyle", "1")
        .attr("w:styleId", note.style_id.as_str())
        .child(val("w:name", note.name.as_str()))
        .child(val("w:basedOn", BASE_STYLE_ID))
        .child(val("w:next", BASE_STYLE_ID))
        .child(XmlElement::new("w:qFormat"))
        .child(paragraph);
    if note.italic {
        style = style.child(XmlElement::new("w:rPr").child(XmlElement::new("w:i")));
    }
    style
}

/// The full styles part for `config`.
pub fn styles_part(config: &TemplateConfig) -> XmlElement {
    let headings = config
        .headings
        .iter()
        .enumerate()
        .map(|(i, level)| level_style(level, i, Family::Heading));
    let requirements = config
        .requirements
        .iter()
        .enumerate()
        .map(|(i, level)| level_style(level, i, Family::Requirement));

    XmlElement::new("w:styles")
        .attr("xmlns:w", WORDML_NS)
        .child(doc_defaults(config))
        .child(latent_styles())
        .child(normal_style())
        .children(headings)
        .children(requirements)
        .children(config.active_notes().iter().map(note_style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixer::styles::declared_ids;

    fn style<'a>(root: &'a XmlElement, id: &str) -> &'a XmlElement {
        root.elements()
            .find(|e| e.get_attr("styleId") == Some(id))
            .unwrap()
    }

    #[test]
    fn test_every_configured_style_declared() {
        let config = TemplateConfig::default();
        let ids = declared_ids(&styles_part(&config));
        assert_eq!(ids.len(), 1 + 5 + 8 + 3);
        for id in ["Normal", "Heading3", "Requirement8", "Rationale"] {
            assert!(ids.contains(id), "{} missing", id);
        }
    }

    #[test]
    fn test_heading_linked_to_numbering() {
        let root = styles_part(&TemplateConfig::default());
        let heading = style(&root, "Heading2");
        let num_pr = heading.find("pPr").unwrap().find("numPr").unwrap();
        assert_eq!(num_pr.find("ilvl").unwrap().get_attr("val"), Some("1"));
        assert_eq!(num_pr.find("numId").unwrap().get_attr("val"), Some("1"));
        assert_eq!(
            heading.find("pPr").unwrap().find("outlineLvl").unwrap().get_attr("val"),
            Some("1")
        );
        assert!(heading.get_attr("customStyle").is_none());
    }

    #[test]
    fn test_requirement_styles_are_custom() {
        let root = styles_part(&TemplateConfig::default());
        let requirement = style(&root, "Requirement4");
        let keys: Vec<&str> = requirement.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["w:type", "w:customStyle", "w:styleId"]);
        assert_eq!(requirement.find("next").unwrap().get_attr("val"), Some("Requirement4"));
        let num_pr = requirement.find("pPr").unwrap().find("numPr").unwrap();
        assert_eq!(num_pr.find("numId").unwrap().get_attr("val"), Some("2"));
    }

    #[test]
    fn test_note_shading_and_defaults() {
        let root = styles_part(&TemplateConfig::default().with_font("Arial", 20));
        let rationale = style(&root, "Rationale");
        assert_eq!(
            rationale.find("pPr").unwrap().find("shd").unwrap().get_attr("fill"),
            Some("F2F2F2")
        );
        assert!(style(&root, "Note").find("pPr").unwrap().find("shd").is_none());

        let defaults = root.find("docDefaults").unwrap();
        let run = defaults.find("rPrDefault").unwrap().find("rPr").unwrap();
        assert_eq!(run.find("rFonts").unwrap().get_attr("ascii"), Some("Arial"));
        assert_eq!(run.find("sz").unwrap().get_attr("val"), Some("20"));
    }

    #[test]
    fn test_notes_disabled() {
        let root = styles_part(&TemplateConfig::default().with_notes(false));
        assert!(!declared_ids(&root).contains("Note"));
    }
}
