//! Remote-content policy: detection, decision, rewrite and manual reporting.

pub mod event;
pub mod inject;
pub mod pattern;
pub mod policy;
pub mod transform;

pub use event::{ChannelSink, EventSink, NoopSink, RemoteInjected};
pub use policy::{AllowList, Decision, Grant, Policy, RemoteSettings, View};
pub use transform::{
    Action, Outcome, RemoteContentTransformer, RewriteStrategy, Route, TransformOptions,
};
