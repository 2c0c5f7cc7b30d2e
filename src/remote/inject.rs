//! Collection of escaped attributes for manual, user-triggered loading.

use crate::error::Result;
use crate::html::{decode_attribute_value, ElementAttributes, HtmlBody};
use crate::model::attribute::{AttributeMap, EscapedAttribute};

/// Value prefix marking an inline attachment reference.
const CID_PREFIX: &str = "cid:";

/// `true` if the element carries any escaped attribute or a `style`.
///
/// Escaped names match case-sensitively, as in detection; `style` is a
/// plain HTML attribute and matches in any case.
fn is_selected(element: &ElementAttributes) -> bool {
    element.attributes.iter().any(|(name, _)| {
        name.eq_ignore_ascii_case("style") || EscapedAttribute::from_escaped(name).is_some()
    })
}

/// `true` if the element's `proton-src` points to an inline attachment.
fn is_embedded(element: &ElementAttributes) -> bool {
    element
        .get_attribute(EscapedAttribute::Src.escaped())
        .map(|src| decode_attribute_value(src).starts_with(CID_PREFIX))
        .unwrap_or(false)
}

/// Map of the escaped attributes of one element, values decoded.
fn map_attributes(element: &ElementAttributes) -> AttributeMap {
    let mut map = AttributeMap::new();
    for (name, value) in &element.attributes {
        if let Some(attr) = EscapedAttribute::from_escaped(name) {
            map.insert(attr.escaped(), decode_attribute_value(value));
        }
    }
    map
}

/// Build one [`AttributeMap`] per element carrying escaped attributes or a
/// `style`, in document order.
///
/// Elements whose `proton-src` starts with `cid:` are left out entirely.
/// Style-only elements contribute an empty map.
pub fn prepare_injection(html: &HtmlBody) -> Result<Vec<AttributeMap>> {
    let list = html
        .elements()?
        .iter()
        .filter(|element| is_selected(element) && !is_embedded(element))
        .map(map_attributes)
        .collect();
    Ok(list)
}

/// Coarse check for SVG content anywhere in the markup.
pub fn has_svg(markup: &str) -> bool {
    markup.contains("svg")
}
