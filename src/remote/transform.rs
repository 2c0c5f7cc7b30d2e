//! The remote-content transformer.
//!
//! One call per render pass per message: decide, record the decision on the
//! message if the body has anything to decide about, then either unescape
//! the body or report its references for manual loading.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::html::HtmlBody;
use crate::model::attribute::EscapedAttribute;
use crate::model::message::{Message, ShowImages};

use super::event::{EventSink, RemoteInjected};
use super::inject;
use super::pattern;
use super::policy::{AllowList, Decision, Policy, RemoteSettings, View};

/// Action tag that selects manual injection.
pub const USER_INJECT: &str = "user.inject";

/// Render action requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The user asked to load remote content by hand.
    UserInject,
    /// Any other tag; takes the automatic path.
    Other(String),
}

impl Action {
    pub fn parse(tag: &str) -> Self {
        if tag == USER_INJECT {
            Self::UserInject
        } else {
            Self::Other(tag.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::UserInject => USER_INJECT,
            Self::Other(tag) => tag,
        }
    }
}

/// How the automatic path unescapes the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteStrategy {
    /// Text substitution over the serialized markup, driven by the detection pattern.
    #[default]
    Markup,
    /// Attribute-by-attribute rename over the tokenized elements.
    Dom,
}

impl FromStr for RewriteStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markup" => Ok(Self::Markup),
            "dom" => Ok(Self::Dom),
            other => Err(format!("unknown rewrite strategy '{other}' (expected markup or dom)")),
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// `None` behaves like any non-manual action.
    pub action: Option<Action>,
    pub view: View,
}

impl TransformOptions {
    pub fn new(action: Option<Action>, view: View) -> Self {
        Self { action, view }
    }

    fn is_user_inject(&self) -> bool {
        matches!(self.action, Some(Action::UserInject))
    }
}

/// Which terminal path a transform took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "path")]
pub enum Route {
    /// Remote content not granted; body untouched.
    Blocked,
    /// Automatic path; `rewritten` references were unescaped.
    Rewritten { rewritten: usize },
    /// Manual path; `elements` maps collected, event published or not.
    Reported { elements: usize, published: bool },
}

/// Summary of one [`RemoteContentTransformer::transform`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub decision: Decision,
    /// Detection-pattern matches in the body before any rewrite.
    pub matches: usize,
    /// `true` if `message.show_images` was written.
    pub flag_written: bool,
    #[serde(flatten)]
    pub route: Route,
}

/// Decides and applies the remote-content policy for message bodies.
#[derive(Debug, Clone, Default)]
pub struct RemoteContentTransformer {
    policy: Policy,
    strategy: RewriteStrategy,
}

impl RemoteContentTransformer {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            strategy: RewriteStrategy::default(),
        }
    }

    /// Build from the `[policy]` and `[rewrite]` config sections.
    pub fn from_config(config: &Config) -> Self {
        let policy = Policy::new(
            RemoteSettings::from_bits(config.policy.show_images),
            AllowList::new(config.policy.allow_list.iter().cloned()),
        );
        Self::new(policy).with_strategy(config.rewrite.strategy)
    }

    pub fn with_strategy(mut self, strategy: RewriteStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn strategy(&self) -> RewriteStrategy {
        self.strategy
    }

    /// Apply the policy to `html` for `message`.
    ///
    /// `message.show_images` is written only when the body contains at least
    /// one escaped reference. When granted, the automatic path unescapes the
    /// body in place; the manual path leaves it escaped and publishes at most
    /// one [`RemoteInjected`] to `sink`.
    pub fn transform(
        &self,
        html: &mut HtmlBody,
        message: &mut Message,
        options: &TransformOptions,
        sink: &mut dyn EventSink,
    ) -> Result<Outcome> {
        let decision = self.policy.decide(message, options.view);
        let matches = pattern::find_iter(html.inner_html()).count();

        let flag_written = matches > 0;
        if flag_written {
            message.show_images = ShowImages::from_decision(decision.show);
        }

        debug!(
            sender = %message.sender.address,
            show = decision.show,
            grant = ?decision.grant,
            matches,
            "Remote content decision"
        );

        let route = if !decision.show {
            Route::Blocked
        } else if options.is_user_inject() {
            self.report(html, message, sink)?
        } else {
            Route::Rewritten {
                rewritten: self.rewrite(html)?,
            }
        };

        Ok(Outcome {
            decision,
            matches,
            flag_written,
            route,
        })
    }

    /// Manual path: collect references and publish them, body untouched.
    fn report(&self, html: &HtmlBody, message: &Message, sink: &mut dyn EventSink) -> Result<Route> {
        let list = inject::prepare_injection(html)?;
        let has_svg = inject::has_svg(html.inner_html());
        let elements = list.len();
        let published = !list.is_empty() || has_svg;

        if published {
            debug!(elements, has_svg, "Publishing remote content for manual injection");
            sink.publish(RemoteInjected {
                action: USER_INJECT.to_string(),
                list,
                message: message.clone(),
                has_svg,
            });
        }

        Ok(Route::Reported {
            elements,
            published,
        })
    }

    /// Automatic path: unescape every remote reference in place.
    fn rewrite(&self, html: &mut HtmlBody) -> Result<usize> {
        let rewritten = match self.strategy {
            RewriteStrategy::Markup => {
                let (markup, count) = pattern::unescape_all(html.inner_html());
                html.set_inner_html(markup);
                count
            }
            RewriteStrategy::Dom => html.rewrite_attributes(unescape_attribute)?,
        };
        debug!(rewritten, strategy = ?self.strategy, "Unescaped remote content");
        Ok(rewritten)
    }
}

/// Attribute edit used by [`RewriteStrategy::Dom`].
///
/// Renames escaped attributes, except a `proton-src` whose raw value starts
/// with `cid`, and unescapes `proton-url(` inside inline styles. Names are
/// matched in source case so only what the detection pattern counts is
/// rewritten.
fn unescape_attribute(name: &str, value: &str) -> Option<(String, String)> {
    if name.eq_ignore_ascii_case("style") {
        let needle = EscapedAttribute::Url.escaped();
        return value
            .contains(needle)
            .then(|| (name.to_string(), value.replace(needle, EscapedAttribute::Url.name())));
    }

    let attr = EscapedAttribute::from_escaped(name)?;
    if attr == EscapedAttribute::Src && value.starts_with("cid") {
        return None;
    }
    Some((attr.name().to_string(), value.to_string()))
}
