//! Relationship target normalization.

use crate::xml::XmlElement;

/// Which relationships part is being normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelsScope {
    /// `_rels/.rels`, targets relative to the package root
    Package,
    /// `word/_rels/document.xml.rels`, targets relative to `word/`
    Document,
}

/// Make a target relative to the directory of the owning part.
pub fn normalize_target(target: &str, scope: RelsScope) -> String {
    let relative = target.trim_start_matches('/');
    match scope {
        RelsScope::Package => relative.to_string(),
        RelsScope::Document => relative
            .strip_prefix("word/")
            .unwrap_or(relative)
            .to_string(),
    }
}

/// Rewrite every internal `Target` to its relative form.
///
/// Returns the new tree and the number of targets that changed.
pub fn normalize_relationships(mut root: XmlElement, scope: RelsScope) -> (XmlElement, usize) {
    let mut changed = 0;
    for rel in root
        .elements_mut()
        .filter(|e| e.local_name() == "Relationship")
    {
        let external = rel
            .get_attr("TargetMode")
            .is_some_and(|m| m.eq_ignore_ascii_case("external"));
        if external {
            continue;
        }
        let Some(target) = rel.get_attr("Target") else {
            continue;
        };
        let normalized = normalize_target(target, scope);
        if normalized != target {
            rel.set_attr("Target", normalized);
            changed += 1;
        }
    }
    (root, changed)
}

/// Append a relationship of `rel_type` unless one already exists.
///
/// `preferred_id` gets a numeric suffix if another record already uses it.
/// Returns the new tree and whether a record was added.
pub fn ensure_relationship(
    mut root: XmlElement,
    rel_type: &str,
    target: &str,
    preferred_id: &str,
) -> (XmlElement, bool) {
    let relationships: Vec<&XmlElement> = root
        .elements()
        .filter(|e| e.local_name() == "Relationship")
        .collect();

    if relationships
        .iter()
        .any(|r| r.get_attr("Type") == Some(rel_type))
    {
        return (root, false);
    }

    let taken = |id: &str| relationships.iter().any(|r| r.get_attr("Id") == Some(id));
    let mut id = preferred_id.to_string();
    let mut suffix = 2;
    while taken(&id) {
        id = format!("{}{}", preferred_id, suffix);
        suffix += 1;
    }

    let record = XmlElement::new(root.qualify("Relationship"))
        .attr("Id", id)
        .attr("Type", rel_type)
        .attr("Target", target);
    root.push(record);
    (root, true)
}
