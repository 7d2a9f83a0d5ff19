//! Styles part augmentation and normalization.
//!
//! Both passes take the parsed `w:styles` tree by value and return the
//! transformed tree.

use crate::package::WORDML_NS;
use crate::xml::XmlElement;
use std::collections::BTreeSet;

/// Style every placeholder inherits from.
pub const BASE_STYLE_ID: &str = "Normal";

/// Tracking id given to custom styles that lack one.
pub const PLACEHOLDER_RSID: &str = "00000000";

/// Attribute order consumers expect on custom styles.
const CUSTOM_STYLE_ATTRIBUTE_ORDER: [&str; 4] = ["type", "customStyle", "styleId", "default"];

/// Flags that hide a style from the style picker.
const HIDING_FLAGS: [&str; 2] = ["semiHidden", "unhideWhenUsed"];

/// Property blocks that must follow `rsid` inside a style.
const STYLE_PROPERTY_BLOCKS: [&str; 6] = ["pPr", "rPr", "tblPr", "trPr", "tcPr", "tblStylePr"];

/// Every `styleId` declared by a `w:style` child of the root.
pub fn declared_ids(root: &XmlElement) -> BTreeSet<String> {
    root.elements()
        .filter(|e| e.local_name() == "style")
        .filter_map(|e| e.get_attr("styleId"))
        .map(String::from)
        .collect()
}

/// Paragraph style standing in for an undeclared id.
pub fn placeholder_style(root: &XmlElement, style_id: &str) -> XmlElement {
    let w = |local: &str| root.qualify(local);
    let style = XmlElement::new(w("style"))
        .attr(w("type"), "paragraph")
        .attr(w("styleId"), style_id)
        .child(XmlElement::new(w("name")).attr(w("val"), style_id));
    if style_id == BASE_STYLE_ID {
        return style;
    }
    style.child(XmlElement::new(w("basedOn")).attr(w("val"), BASE_STYLE_ID))
}

/// Append a placeholder for every id in `missing` not already declared.
pub fn add_placeholder_styles(mut root: XmlElement, missing: &BTreeSet<String>) -> XmlElement {
    let declared = declared_ids(&root);
    for style_id in missing.difference(&declared) {
        let style = placeholder_style(&root, style_id);
        root.push(style);
    }
    root
}

/// Default latent-style behavior element.
fn latent_styles(root: &XmlElement) -> XmlElement {
    let w = |local: &str| root.qualify(local);
    XmlElement::new(w("latentStyles"))
        .attr(w("defLockedState"), "0")
        .attr(w("defUIPriority"), "99")
        .attr(w("defSemiHidden"), "0")
        .attr(w("defUnhideWhenUsed"), "0")
        .attr(w("defQFormat"), "0")
        .attr(w("count"), "376")
}

/// Normalize the styles part so every style is visible and well-formed.
///
/// - a `latentStyles` element exists, after `docDefaults` or first
/// - every style has a `name` (its id if absent) followed by `qFormat`
/// - `semiHidden` and `unhideWhenUsed` are removed
/// - custom styles use `customStyle="1"`, a fixed attribute order and
///   carry an `rsid`
pub fn normalize_styles(mut root: XmlElement) -> XmlElement {
    if root.find("latentStyles").is_none() {
        let at = root.position("docDefaults").map_or(0, |i| i + 1);
        let element = latent_styles(&root);
        root.insert(at, element);
    }

    for style in root
        .elements_mut()
        .filter(|e| e.local_name() == "style")
    {
        normalize_style(style);
    }
    root
}

fn normalize_style(style: &mut XmlElement) {
    let val = style.qualify("val");

    if style.find("name").is_none() {
        let id = style.get_attr("styleId").unwrap_or_default().to_string();
        let name = XmlElement::new(style.qualify("name")).attr(val.as_str(), id);
        style.insert(0, name);
    }

    if style.find("qFormat").is_none() {
        let at = style.position("name").map_or(0, |i| i + 1);
        let flag = XmlElement::new(style.qualify("qFormat"));
        style.insert(at, flag);
    }

    for flag in HIDING_FLAGS {
        style.remove_children(flag);
    }

    if !is_custom(style) {
        return;
    }

    if style.get_attr("customStyle") == Some("true") {
        style.set_attr("customStyle", "1");
    }
    for key in CUSTOM_STYLE_ATTRIBUTE_ORDER {
        if let Some(attr) = style.remove_attr(key) {
            style.attributes.push(attr);
        }
    }

    if style.find("rsid").is_none() {
        let rsid = XmlElement::new(style.qualify("rsid")).attr(val.as_str(), PLACEHOLDER_RSID);
        let at = STYLE_PROPERTY_BLOCKS
            .iter()
            .filter_map(|block| style.position(block))
            .min();
        match at {
            Some(at) => style.insert(at, rsid),
            None => style.push(rsid),
        }
    }
}

fn is_custom(style: &XmlElement) -> bool {
    matches!(
        style.get_attr("customStyle"),
        Some("1") | Some("true") | Some("on")
    )
}

/// A minimal styles part: document defaults, `Normal` and placeholders.
///
/// Used when a package has no styles part at all.
pub fn minimal_styles(missing: &BTreeSet<String>) -> XmlElement {
    let root = XmlElement::new("w:styles").attr("xmlns:w", WORDML_NS);
    let doc_defaults = XmlElement::new("w:docDefaults")
        .child(XmlElement::new("w:rPrDefault").child(XmlElement::new("w:rPr")))
        .child(XmlElement::new("w:pPrDefault").child(XmlElement::new("w:pPr")));
    let normal = XmlElement::new("w:style")
        .attr("w:type", "paragraph")
        .attr("w:default", "1")
        .attr("w:styleId", BASE_STYLE_ID)
        .child(XmlElement::new("w:name").attr("w:val", BASE_STYLE_ID));

    let root = root.child(doc_defaults).child(normal);
    add_placeholder_styles(root, missing)
}
