//! Loading a message from disk: `.eml` files or bare `.html` bodies.

use std::path::Path;

use crate::error::{RemoteError, Result};
use crate::html::HtmlBody;
use crate::model::message::Message;
use crate::parser::mime::{self, ParsedMessage};

/// Load a message for filtering.
///
/// Files ending in `.html`/`.htm` are taken as a bare body with an unknown
/// sender. Anything else is parsed as an RFC 5322 message (an optional
/// leading MBOX `From ` line is skipped).
pub fn load_message(path: impl AsRef<Path>) -> Result<ParsedMessage> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| RemoteError::io(path, e))?;

    if is_html_file(path) {
        tracing::debug!(path = %path.display(), "Loading bare HTML body");
        return Ok(ParsedMessage {
            html: HtmlBody::new(String::from_utf8_lossy(&data).into_owned()),
            message: Message::default(),
        });
    }

    mime::parse_message(&data)
}

fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_html_file() {
        assert!(is_html_file(Path::new("body.html")));
        assert!(is_html_file(Path::new("BODY.HTM")));
        assert!(!is_html_file(Path::new("message.eml")));
        assert!(!is_html_file(Path::new("noext")));
    }

    #[test]
    fn test_missing_file() {
        let err = load_message("/definitely/not/here.eml").unwrap_err();
        assert!(matches!(err, RemoteError::FileNotFound(_)));
    }

    #[test]
    fn test_load_bare_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.html");
        std::fs::write(&path, r#"<img proton-src="http://x/a.png">"#).unwrap();
        let parsed = load_message(&path).unwrap();
        assert!(parsed.message.sender.is_unknown());
        assert_eq!(parsed.html.inner_html(), r#"<img proton-src="http://x/a.png">"#);
    }
}
