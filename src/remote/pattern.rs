//! Detection of escaped remote references in serialized markup.
//!
//! The pattern is an alternation over every escaped attribute name, in
//! [`EscapedAttribute::ALL`] order. `proton-src` is special: it only matches
//! as `proton-src=` and never when the value that follows starts with `"cid`,
//! since inline `cid:` images belong to the embedded-content pipeline.
//!
//! The `regex` crate has no look-ahead, so the `"cid` exclusion is applied
//! after each candidate match. A rejected candidate resumes scanning one
//! byte further on, which is what a backtracking engine would do.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::attribute::{EscapedAttribute, ESCAPE_PREFIX_LEN};

/// Value prefix that disqualifies a `proton-src=` candidate.
const CID_VALUE_PREFIX: &str = "\"cid";

fn detection_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = EscapedAttribute::ALL
            .iter()
            .map(|attr| match attr {
                EscapedAttribute::Src => format!("{}=", regex::escape(attr.escaped())),
                _ => regex::escape(attr.escaped()),
            })
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("({alternation})")).expect("valid regex")
    })
}

/// One occurrence of an escaped attribute in the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch<'a> {
    /// Byte offset of the match start.
    pub start: usize,
    /// Byte offset one past the match end.
    pub end: usize,
    /// Which attribute matched.
    pub attribute: EscapedAttribute,
    /// Matched text, e.g. `proton-srcset` or `proton-src=`.
    pub text: &'a str,
}

impl<'a> PatternMatch<'a> {
    /// The matched text with the escape prefix removed.
    pub fn unescaped(&self) -> &'a str {
        &self.text[ESCAPE_PREFIX_LEN..]
    }
}

/// Iterator over non-overlapping matches, left to right.
pub struct Matches<'a> {
    haystack: &'a str,
    pos: usize,
}

impl<'a> Iterator for Matches<'a> {
    type Item = PatternMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let re = detection_regex();
        while self.pos <= self.haystack.len() {
            let m = re.find_at(self.haystack, self.pos)?;
            let text = m.as_str();

            // "proton-src=" is the only alternative ending in '='.
            let attribute = match text.strip_suffix('=') {
                Some(_) => EscapedAttribute::Src,
                None => EscapedAttribute::from_escaped(text)?,
            };

            if attribute == EscapedAttribute::Src
                && self.haystack[m.end()..].starts_with(CID_VALUE_PREFIX)
            {
                // The escape prefix is ASCII, so +1 stays on a char boundary.
                self.pos = m.start() + 1;
                continue;
            }

            self.pos = m.end();
            return Some(PatternMatch {
                start: m.start(),
                end: m.end(),
                attribute,
                text,
            });
        }
        None
    }
}

/// All matches of the detection pattern in `markup`.
pub fn find_iter(markup: &str) -> Matches<'_> {
    Matches {
        haystack: markup,
        pos: 0,
    }
}

/// `true` if `markup` contains at least one escaped remote reference.
pub fn is_match(markup: &str) -> bool {
    find_iter(markup).next().is_some()
}

/// Replace every match by its unescaped form.
///
/// Returns the rewritten markup and the number of replacements.
pub fn unescape_all(markup: &str) -> (String, usize) {
    let mut out = String::with_capacity(markup.len());
    let mut last = 0;
    let mut count = 0;

    for m in find_iter(markup) {
        out.push_str(&markup[last..m.start]);
        out.push_str(m.unescaped());
        last = m.end;
        count += 1;
    }
    out.push_str(&markup[last..]);

    (out, count)
}
