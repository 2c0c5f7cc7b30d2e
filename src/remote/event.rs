//! Notification published when remote content awaits manual loading.

use std::sync::mpsc;

use serde::Serialize;

use crate::model::attribute::AttributeMap;
use crate::model::message::Message;

/// Event type tag carried in the serialized envelope.
pub const REMOTE_INJECTED: &str = "remote.injected";

/// Escaped references found in a body rendered with the manual action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteInjected {
    /// The action tag that selected the manual path.
    pub action: String,
    /// One map per element, see [`crate::remote::inject::prepare_injection`].
    pub list: Vec<AttributeMap>,
    /// Snapshot of the message after its flag was updated.
    pub message: Message,
    #[serde(rename = "hasSVG")]
    pub has_svg: bool,
}

/// Wire form: `{ "type": "remote.injected", "data": { … } }`.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: &'a RemoteInjected,
}

impl RemoteInjected {
    pub fn envelope(&self) -> Envelope<'_> {
        Envelope {
            kind: REMOTE_INJECTED,
            data: self,
        }
    }
}

/// Receiver of [`RemoteInjected`] events.
pub trait EventSink {
    fn publish(&mut self, event: RemoteInjected);
}

impl<F> EventSink for F
where
    F: FnMut(RemoteInjected),
{
    fn publish(&mut self, event: RemoteInjected) {
        (*self)(event)
    }
}

/// Forwards events over a channel to another part of the application.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub mpsc::Sender<RemoteInjected>);

impl EventSink for ChannelSink {
    fn publish(&mut self, event: RemoteInjected) {
        if self.0.send(event).is_err() {
            tracing::warn!("Remote content event dropped: receiver is gone");
        }
    }
}

/// Sink that discards everything, for callers that never inject manually.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn publish(&mut self, event: RemoteInjected) {
        tracing::debug!(elements = event.list.len(), "Discarding remote content event");
    }
}
