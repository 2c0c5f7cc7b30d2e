//! Sender address parsing (RFC 5322 §3.4 mailbox).

/// The sender of a message.
///
/// # Examples
/// - `"Proton <notify@protonmail.com>"` → `name = "Proton"`, `address = "notify@protonmail.com"`
/// - `"user@example.com"` → `name = ""`, `address = "user@example.com"`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Sender {
    /// Human-readable display name (may be empty).
    #[serde(rename = "Name")]
    pub name: String,
    /// The bare address (`user@domain`), compared against the allow-list.
    #[serde(rename = "Address")]
    pub address: String,
}

impl Sender {
    /// Build a sender from a bare address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            address: address.into(),
        }
    }

    /// Parse a mailbox from a `From:` or `Sender:` header value.
    ///
    /// Supported formats:
    /// - `"user@domain.com"`
    /// - `"<user@domain.com>"`
    /// - `"Display Name <user@domain.com>"`
    /// - `"\"Display, Name\" <user@domain.com>"`
    ///
    /// If parsing fails, the trimmed raw string is stored as `address`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let (Some(open), Some(close)) = (trimmed.rfind('<'), trimmed.rfind('>')) {
            if close > open {
                return Self {
                    name: strip_quotes(&trimmed[..open]),
                    address: trimmed[open + 1..close].trim().to_string(),
                };
            }
        }

        Self::new(trimmed)
    }

    /// `true` when no address is known (e.g. a bare `.html` input).
    pub fn is_unknown(&self) -> bool {
        self.address.is_empty()
    }
}

/// Strip surrounding double-quotes and trim whitespace.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.address)
        } else {
            write!(f, "{} <{}>", self.name, self.address)
        }
    }
}
