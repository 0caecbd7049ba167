//! Events produced by the reply dispatcher.
//!
//! The dispatcher never talks to a UI. It builds an [`OutboundEvent`] and
//! hands it to whatever [`EventSink`] the connection was set up with; what
//! the sink does with it afterwards is up to the sink.

use std::sync::mpsc;

use tracing::warn;

/// An event for the rest of the application.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutboundEvent {
    /// Server text to show in the connection's status buffer.
    Generic(String),
    /// The requested nickname is taken.
    NickInUse(String),
    /// A channel's topic (or who set it) changed.
    TopicChanged {
        /// Channel name as stored in the session.
        channel: String,
        /// Human readable notice.
        text: String,
    },
}

impl OutboundEvent {
    /// The human readable text carried by the event.
    pub fn text(&self) -> &str {
        match self {
            OutboundEvent::Generic(text)
            | OutboundEvent::NickInUse(text)
            | OutboundEvent::TopicChanged { text, .. } => text,
        }
    }

    /// The channel the event is scoped to, if any.
    pub fn channel(&self) -> Option<&str> {
        match self {
            OutboundEvent::TopicChanged { channel, .. } => Some(channel),
            _ => None,
        }
    }
}

/// Receiver of dispatcher events.
pub trait EventSink {
    /// Take ownership of one event.
    fn emit(&mut self, event: OutboundEvent);
}

impl EventSink for Vec<OutboundEvent> {
    fn emit(&mut self, event: OutboundEvent) {
        self.push(event);
    }
}

impl EventSink for mpsc::Sender<OutboundEvent> {
    fn emit(&mut self, event: OutboundEvent) {
        if let Err(mpsc::SendError(event)) = self.send(event) {
            warn!(?event, "event receiver dropped, discarding event");
        }
    }
}

impl<K: EventSink + ?Sized> EventSink for &mut K {
    fn emit(&mut self, event: OutboundEvent) {
        (**self).emit(event);
    }
}
