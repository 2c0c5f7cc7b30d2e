//! The show/hide decision for remote content.

use serde::{Deserialize, Serialize};

use crate::model::message::Message;

/// Global remote/embedded content settings.
///
/// Stored on disk as the legacy `ShowImages` bitmask
/// ([`RemoteSettings::REMOTE`], [`RemoteSettings::EMBEDDED`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteSettings {
    /// Load remote content automatically for every message.
    pub remote: bool,
    /// Load embedded (`cid:`) content automatically.
    pub embedded: bool,
}

impl RemoteSettings {
    pub const REMOTE: u8 = 1;
    pub const EMBEDDED: u8 = 2;

    pub fn from_bits(bits: u8) -> Self {
        Self {
            remote: bits & Self::REMOTE != 0,
            embedded: bits & Self::EMBEDDED != 0,
        }
    }
}

/// Sender addresses that may load remote content without asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList(Vec<String>);

impl AllowList {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(addresses.into_iter().map(Into::into).collect())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Exact match on the bare address.
    pub fn contains(&self, address: &str) -> bool {
        self.0.iter().any(|a| a == address)
    }

    pub fn addresses(&self) -> &[String] {
        &self.0
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(["notify@protonmail.com"])
    }
}

/// Current navigation state of the reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Regular message view.
    #[default]
    Message,
    /// Print preview. Remote content is always loaded here.
    Printer,
}

/// Why remote content was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// The message already carries a "shown" decision.
    Message,
    /// The global remote-content setting is on.
    Setting,
    /// The sender is allow-listed and the message is not encrypted.
    AllowList,
    /// The print view is active.
    Printer,
}

/// Outcome of [`Policy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub show: bool,
    /// First rule that granted the content, if any.
    pub grant: Option<Grant>,
}

impl Decision {
    fn granted(grant: Grant) -> Self {
        Self {
            show: true,
            grant: Some(grant),
        }
    }

    fn denied() -> Self {
        Self {
            show: false,
            grant: None,
        }
    }
}

/// Settings and allow-list the decision is made against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    pub settings: RemoteSettings,
    pub allow_list: AllowList,
}

impl Policy {
    pub fn new(settings: RemoteSettings, allow_list: AllowList) -> Self {
        Self {
            settings,
            allow_list,
        }
    }

    /// Decide whether remote content of `message` may load in `view`.
    ///
    /// Rules are checked in order and the first grant wins:
    /// 1. the message already says "shown" (`Hidden` and `Unset` do not grant)
    /// 2. the global remote setting
    /// 3. allow-listed sender on an unencrypted message
    /// 4. print view
    pub fn decide(&self, message: &Message, view: View) -> Decision {
        if message.show_images.is_shown() {
            return Decision::granted(Grant::Message);
        }
        if self.settings.remote {
            return Decision::granted(Grant::Setting);
        }
        if !message.is_encrypted && self.allow_list.contains(&message.sender.address) {
            return Decision::granted(Grant::AllowList);
        }
        if view == View::Printer {
            return Decision::granted(Grant::Printer);
        }
        Decision::denied()
    }

    /// Shorthand for `decide(..).show`.
    pub fn should_show_images(&self, message: &Message, view: View) -> bool {
        self.decide(message, view).show
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::address::Sender;
    use crate::model::message::ShowImages;

    fn message(address: &str, encrypted: bool) -> Message {
        Message::new(Sender::new(address), encrypted)
    }

    fn strict() -> Policy {
        Policy::new(RemoteSettings::default(), AllowList::new(["friend@example.com"]))
    }

    #[test]
    fn test_settings_bits() {
        assert_eq!(RemoteSettings::from_bits(0), RemoteSettings::default());
        assert!(RemoteSettings::from_bits(1).remote);
        assert!(!RemoteSettings::from_bits(1).embedded);
        assert!(RemoteSettings::from_bits(2).embedded);
        assert_eq!(
            RemoteSettings::from_bits(3),
            RemoteSettings {
                remote: true,
                embedded: true
            }
        );
    }

    #[test]
    fn test_nothing_grants() {
        let decision = strict().decide(&message("x@example.com", false), View::Message);
        assert_eq!(decision, Decision::denied());
    }

    #[test]
    fn test_prior_shown_grants() {
        let msg = message("x@example.com", true).with_show_images(ShowImages::Shown);
        let decision = strict().decide(&msg, View::Message);
        assert_eq!(decision.grant, Some(Grant::Message));
    }

    #[test]
    fn test_prior_hidden_does_not_grant() {
        let msg = message("x@example.com", false).with_show_images(ShowImages::Hidden);
        assert!(!strict().should_show_images(&msg, View::Message));
    }

    #[test]
    fn test_global_setting_grants() {
        let policy = Policy::new(RemoteSettings::from_bits(RemoteSettings::REMOTE), AllowList::empty());
        let decision = policy.decide(&message("x@example.com", true), View::Message);
        assert_eq!(decision.grant, Some(Grant::Setting));
    }

    #[test]
    fn test_embedded_setting_alone_does_not_grant() {
        let policy = Policy::new(RemoteSettings::from_bits(RemoteSettings::EMBEDDED), AllowList::empty());
        assert!(!policy.should_show_images(&message("x@example.com", false), View::Message));
    }

    #[test]
    fn test_allow_list_requires_unencrypted() {
        let policy = strict();
        let plain = policy.decide(&message("friend@example.com", false), View::Message);
        assert_eq!(plain.grant, Some(Grant::AllowList));
        assert!(!policy.should_show_images(&message("friend@example.com", true), View::Message));
    }

    #[test]
    fn test_allow_list_is_exact() {
        assert!(!strict().should_show_images(&message("Friend@example.com", false), View::Message));
    }

    #[test]
    fn test_printer_always_grants() {
        let msg = message("x@example.com", true).with_show_images(ShowImages::Hidden);
        let decision = strict().decide(&msg, View::Printer);
        assert_eq!(decision.grant, Some(Grant::Printer));
    }

    #[test]
    fn test_default_allow_list() {
        assert!(AllowList::default().contains("notify@protonmail.com"));
    }
}
