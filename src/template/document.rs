//! `word/document.xml` construction: one sample paragraph per style.

use super::config::TemplateConfig;
use super::BuildContext;
use crate::package::WORDML_NS;
use crate::xml::XmlElement;

/// US Letter in twips.
const PAGE_WIDTH: u32 = 12240;
const PAGE_HEIGHT: u32 = 15840;
/// One inch margins.
const PAGE_MARGIN: u32 = 1440;

/// A single-run paragraph, optionally styled.
pub fn paragraph(style_id: Option<&str>, text: &str) -> XmlElement {
    let mut p = XmlElement::new("w:p");
    if let Some(style_id) = style_id {
        p = p.child(
            XmlElement::new("w:pPr").child(XmlElement::new("w:pStyle").attr("w:val", style_id)),
        );
    }
    p.child(
        XmlElement::new("w:r").child(
            XmlElement::new("w:t")
                .attr("xml:space", "preserve")
                .text(text),
        ),
    )
}

/// Wrap the runs of `p` in a bookmark with a fresh id from `ctx`.
fn bookmarked(p: XmlElement, ctx: &mut BuildContext, style_id: &str) -> XmlElement {
    let id = ctx.next_bookmark_id();
    let start = XmlElement::new("w:bookmarkStart")
        .attr("w:id", id.to_string())
        .attr("w:name", format!("_{}_{}", style_id, id));
    let end = XmlElement::new("w:bookmarkEnd").attr("w:id", id.to_string());

    let mut p = p;
    let at = p.position("pPr").map_or(0, |i| i + 1);
    p.insert(at, start);
    p.push(end);
    p
}

fn section_properties() -> XmlElement {
    let margin = PAGE_MARGIN.to_string();
    XmlElement::new("w:sectPr")
        .child(
            XmlElement::new("w:pgSz")
                .attr("w:w", PAGE_WIDTH.to_string())
                .attr("w:h", PAGE_HEIGHT.to_string()),
        )
        .child(
            XmlElement::new("w:pgMar")
                .attr("w:top", margin.as_str())
                .attr("w:right", margin.as_str())
                .attr("w:bottom", margin.as_str())
                .attr("w:left", margin.as_str())
                .attr("w:header", "720")
                .attr("w:footer", "720")
                .attr("w:gutter", "0"),
        )
}

/// Body paragraphs in order: title, headings, requirements, notes, extras.
pub fn body_paragraphs(config: &TemplateConfig, ctx: &mut BuildContext) -> Vec<XmlElement> {
    let mut body = vec![paragraph(None, "Requirements Specification")];

    for (i, heading) in config.headings.iter().enumerate() {
        let p = paragraph(Some(heading.style_id.as_str()), &format!("Heading level {}", i + 1));
        body.push(bookmarked(p, ctx, &heading.style_id));
    }

    for (i, requirement) in config.requirements.iter().enumerate() {
        body.push(paragraph(
            Some(requirement.style_id.as_str()),
            &format!("Level {} requirement: the system shall ...", i + 1),
        ));
    }

    for note in config.active_notes() {
        body.push(paragraph(
            Some(note.style_id.as_str()),
            &format!("{}: supporting text for the requirement above.", note.label),
        ));
    }

    for sample in &config.extra_samples {
        body.push(paragraph(Some(sample.style_id.as_str()), &sample.text));
    }
    body
}

/// The full document part for `config`.
pub fn document_part(config: &TemplateConfig, ctx: &mut BuildContext) -> XmlElement {
    let body = XmlElement::new("w:body")
        .children(body_paragraphs(config, ctx))
        .child(section_properties());

    XmlElement::new("w:document")
        .attr("xmlns:w", WORDML_NS)
        .child(body)
}
