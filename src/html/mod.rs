//! The mutable HTML body of a message.
//!
//! [`HtmlBody`] plays the role of the rendered body element: its inner
//! markup can be read and replaced wholesale, and its elements can be
//! scanned or have their attributes rewritten. Tokenizing is done by
//! `lol_html`, which streams the markup and leaves untouched bytes as-is.

use lol_html::{element, rewrite_str, RewriteStrSettings};

use crate::error::Result;

/// Attributes of one element, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementAttributes {
    /// `(name, raw value)` pairs. Names keep their source case.
    pub attributes: Vec<(String, String)>,
}

impl ElementAttributes {
    /// Exact, case-sensitive lookup.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Serialized inner markup of a message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlBody {
    markup: String,
}

impl HtmlBody {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    /// Current serialized markup (the body's `innerHTML`).
    pub fn inner_html(&self) -> &str {
        &self.markup
    }

    /// Replace the whole markup.
    pub fn set_inner_html(&mut self, markup: impl Into<String>) {
        self.markup = markup.into();
    }

    pub fn into_inner(self) -> String {
        self.markup
    }

    /// Every element of the body in document order.
    pub fn elements(&self) -> Result<Vec<ElementAttributes>> {
        let mut found = Vec::new();

        rewrite_str(
            &self.markup,
            RewriteStrSettings {
                element_content_handlers: vec![element!("*", |el| {
                    found.push(ElementAttributes {
                        attributes: el
                            .attributes()
                            .iter()
                            .map(|a| (a.name_preserve_case(), a.value()))
                            .collect(),
                    });
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )?;

        Ok(found)
    }

    /// Rewrite attributes element by element.
    ///
    /// `edit` receives each `(name, raw value)`, name in source case, and
    /// returns the replacement pair, or `None` to keep the attribute.
    /// Elements with no edits keep their original bytes; edited elements
    /// keep attribute order but get lowercased names.
    /// Returns the number of attributes changed.
    pub fn rewrite_attributes<F>(&mut self, mut edit: F) -> Result<usize>
    where
        F: FnMut(&str, &str) -> Option<(String, String)>,
    {
        let mut changed = 0usize;

        let output = rewrite_str(
            &self.markup,
            RewriteStrSettings {
                element_content_handlers: vec![element!("*", |el| {
                    let attrs: Vec<(String, String)> = el
                        .attributes()
                        .iter()
                        .map(|a| (a.name_preserve_case(), a.value()))
                        .collect();

                    let mut edited = Vec::with_capacity(attrs.len());
                    let mut any = false;
                    for (name, value) in &attrs {
                        match edit(name, value) {
                            Some(pair) => {
                                any = true;
                                changed += 1;
                                edited.push(pair);
                            }
                            None => edited.push((name.clone(), value.clone())),
                        }
                    }

                    if any {
                        for (name, _) in &attrs {
                            el.remove_attribute(name);
                        }
                        for (name, value) in &edited {
                            el.set_attribute(name, value)?;
                        }
                    }
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )?;

        self.markup = output;
        Ok(changed)
    }
}

impl From<String> for HtmlBody {
    fn from(markup: String) -> Self {
        Self::new(markup)
    }
}

impl From<&str> for HtmlBody {
    fn from(markup: &str) -> Self {
        Self::new(markup)
    }
}

/// Decode character references in a raw attribute value, as a DOM
/// `getAttribute` would return it.
pub fn decode_attribute_value(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}
