//! Minimal `word/settings.xml` for packages that lack one.

use crate::package::WORDML_NS;
use crate::xml::XmlElement;

/// Language tag used for theme fonts.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Settings boilerplate: style pane shows all and visible styles, `en-US`.
pub fn default_settings() -> XmlElement {
    default_settings_with_language(DEFAULT_LANGUAGE)
}

/// Settings boilerplate with a specific language tag.
pub fn default_settings_with_language(language: &str) -> XmlElement {
    XmlElement::new("w:settings")
        .attr("xmlns:w", WORDML_NS)
        .child(
            XmlElement::new("w:stylePaneFormatFilter")
                .attr("w:val", "3F01")
                .attr("w:allStyles", "1")
                .attr("w:visibleStyles", "1"),
        )
        .child(XmlElement::new("w:defaultTabStop").attr("w:val", "720"))
        .child(XmlElement::new("w:characterSpacingControl").attr("w:val", "doNotCompress"))
        .child(XmlElement::new("w:themeFontLang").attr("w:val", language))
}
