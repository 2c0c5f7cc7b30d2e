//! Escaped attribute names.
//!
//! At parse time every attribute that could make the browser fetch remote
//! content is renamed with a `proton-` prefix. This module owns that fixed
//! name set and the escape/unescape pair.

/// Prefix added to an attribute name to neutralize it.
pub const ESCAPE_PREFIX: &str = "proton-";

/// Length in bytes of [`ESCAPE_PREFIX`].
pub const ESCAPE_PREFIX_LEN: usize = ESCAPE_PREFIX.len();

/// One attribute of the fixed set that may reference remote content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapedAttribute {
    Url,
    XlinkHref,
    Srcset,
    Src,
    Svg,
    Background,
    Poster,
}

impl EscapedAttribute {
    /// All escaped attributes, in detection-pattern order.
    ///
    /// `Srcset` precedes `Src` so the longer name wins during scanning.
    pub const ALL: [EscapedAttribute; 7] = [
        EscapedAttribute::Url,
        EscapedAttribute::XlinkHref,
        EscapedAttribute::Srcset,
        EscapedAttribute::Src,
        EscapedAttribute::Svg,
        EscapedAttribute::Background,
        EscapedAttribute::Poster,
    ];

    /// The real (unescaped) attribute name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::XlinkHref => "xlink:href",
            Self::Srcset => "srcset",
            Self::Src => "src",
            Self::Svg => "svg",
            Self::Background => "background",
            Self::Poster => "poster",
        }
    }

    /// The escaped attribute name, e.g. `proton-src`.
    pub fn escaped(self) -> &'static str {
        match self {
            Self::Url => "proton-url",
            Self::XlinkHref => "proton-xlink:href",
            Self::Srcset => "proton-srcset",
            Self::Src => "proton-src",
            Self::Svg => "proton-svg",
            Self::Background => "proton-background",
            Self::Poster => "proton-poster",
        }
    }

    /// Look up an attribute by its escaped name.
    ///
    /// Case-sensitive, like the detection pattern: `PROTON-SRC` is not an
    /// escaped attribute.
    pub fn from_escaped(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.escaped() == name)
    }
}

impl std::fmt::Display for EscapedAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.escaped())
    }
}

/// Prefix a real attribute name with [`ESCAPE_PREFIX`].
pub fn escape(name: &str) -> String {
    format!("{ESCAPE_PREFIX}{name}")
}

/// Strip the fixed-length escape prefix.
///
/// Returns `None` when `escaped` does not start with [`ESCAPE_PREFIX`].
pub fn unescape(escaped: &str) -> Option<&str> {
    escaped.strip_prefix(ESCAPE_PREFIX)
}

/// Escaped attributes of one element, in source order.
///
/// Serializes as a JSON object `{ "proton-src": "…", … }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(String, String)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `name`, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl serde::Serialize for AttributeMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
