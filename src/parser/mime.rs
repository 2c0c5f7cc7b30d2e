//! MIME message parsing: HTML body, sender, and encryption detection.

use mail_parser::{MessageParser, MimeHeaders, PartType};

use crate::error::{RemoteError, Result};
use crate::html::HtmlBody;
use crate::model::address::Sender;
use crate::model::message::Message;

/// Armor line of an inline PGP message.
const PGP_ARMOR: &str = "-----BEGIN PGP MESSAGE-----";

/// A message ready for the remote-content transformer.
#[derive(Debug, Clone)]
pub struct ParsedMessage {
    /// The first `text/html` part.
    pub html: HtmlBody,
    /// Sender, subject, ID and encryption flag. `show_images` starts unset.
    pub message: Message,
}

/// Parse a complete raw message (headers + body).
///
/// Fails with [`RemoteError::NoHtmlBody`] when the message has no HTML part;
/// text-only messages have nothing to filter.
pub fn parse_message(raw_message: &[u8]) -> Result<ParsedMessage> {
    let message_bytes = skip_from_line(raw_message);

    let parser = MessageParser::default();
    let msg = parser
        .parse(message_bytes)
        .ok_or_else(|| RemoteError::MimeError("Failed to parse message".into()))?;

    let html = msg
        .parts
        .iter()
        .find_map(|part| match &part.body {
            PartType::Html(html) => Some(html.to_string()),
            _ => None,
        })
        .ok_or(RemoteError::NoHtmlBody)?;

    let sender = msg
        .sender()
        .or_else(|| msg.from())
        .and_then(|addr| addr.first())
        .map(|addr| Sender {
            name: addr.name.as_deref().unwrap_or_default().to_string(),
            address: addr.address.as_deref().unwrap_or_default().to_string(),
        })
        .unwrap_or_default();

    let is_encrypted = is_encrypted(&msg);

    let mut message = Message::new(sender, is_encrypted);
    message.id = msg.message_id().unwrap_or_default().to_string();
    message.subject = msg.subject().unwrap_or_default().to_string();

    tracing::debug!(
        sender = %message.sender,
        encrypted = is_encrypted,
        html_len = html.len(),
        "Parsed message"
    );

    Ok(ParsedMessage {
        html: HtmlBody::new(html),
        message,
    })
}

/// `true` for S/MIME or PGP/MIME envelopes and inline PGP bodies.
fn is_encrypted(msg: &mail_parser::Message<'_>) -> bool {
    let envelope = msg
        .parts
        .first()
        .and_then(|root| root.content_type())
        .map(|ct| {
            let main = ct.ctype();
            let sub = ct.subtype().unwrap_or_default();
            (main.eq_ignore_ascii_case("multipart") && sub.eq_ignore_ascii_case("encrypted"))
                || (main.eq_ignore_ascii_case("application")
                    && (sub.eq_ignore_ascii_case("pkcs7-mime")
                        || sub.eq_ignore_ascii_case("x-pkcs7-mime")))
        })
        .unwrap_or(false);

    envelope
        || msg.parts.iter().any(|part| match &part.body {
            PartType::Text(text) => text.contains(PGP_ARMOR),
            _ => false,
        })
}

/// Skip the `From ` separator line at the start of MBOX messages.
fn skip_from_line(data: &[u8]) -> &[u8] {
    // Handle BOM
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}
