//! The message being rendered and its sticky show-images decision.

use super::address::Sender;

/// Per-message remote-content decision.
///
/// `Unset` means nobody has decided yet; `Hidden` is an explicit "no" and
/// must not be conflated with `Unset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowImages {
    #[default]
    Unset,
    Shown,
    Hidden,
}

impl ShowImages {
    /// Decision value for a computed boolean.
    pub fn from_decision(show: bool) -> Self {
        if show {
            Self::Shown
        } else {
            Self::Hidden
        }
    }

    pub fn is_shown(self) -> bool {
        self == Self::Shown
    }

    /// Parse `unset`, `shown`/`true`, `hidden`/`false`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "unset" => Some(Self::Unset),
            "shown" | "true" => Some(Self::Shown),
            "hidden" | "false" => Some(Self::Hidden),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShowImages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unset => "unset",
            Self::Shown => "shown",
            Self::Hidden => "hidden",
        })
    }
}

/// A message as seen by the rendering pipeline.
///
/// Owned by the caller's message store; the transformer only writes
/// [`Message::show_images`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// The `Message-ID` header value, if known.
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Decoded subject line.
    #[serde(rename = "Subject", default)]
    pub subject: String,

    /// Sticky remote-content decision.
    #[serde(rename = "showImages", default)]
    pub show_images: ShowImages,

    #[serde(rename = "Sender")]
    pub sender: Sender,

    /// End-to-end encrypted messages never use the allow-list grant.
    #[serde(rename = "IsEncrypted", default)]
    pub is_encrypted: bool,
}

impl Message {
    /// A message from `sender` with no prior decision.
    pub fn new(sender: Sender, is_encrypted: bool) -> Self {
        Self {
            sender,
            is_encrypted,
            ..Self::default()
        }
    }

    /// Builder-style setter for the prior decision.
    pub fn with_show_images(mut self, show_images: ShowImages) -> Self {
        self.show_images = show_images;
        self
    }
}
