//! Sans-IO interpreter for numeric server replies.
//!
//! [`ReplyDispatcher`] consumes tokenized reply lines one at a time, updates
//! the connection's [`SessionStore`] and pushes [`OutboundEvent`]s to its
//! [`EventSink`]. It performs no I/O of its own and holds no locks.
//!
//! One dispatcher belongs to one connection: the MOTD buffer and the WHO
//! accumulator it owns are per-connection state and are never shared.
//!
//! # Example
//!
//! ```
//! use slirc_session::{
//!     DispatcherConfig, OutboundEvent, ReplyDispatcher, Session, TokenizedLine,
//! };
//!
//! let config = DispatcherConfig::default();
//! let mut dispatcher = ReplyDispatcher::new(Session::new(), Vec::new(), config);
//!
//! for raw in [
//!     ":irc.example.net 375 me :- irc.example.net Message of the day -",
//!     ":irc.example.net 372 me :- Be excellent to each other",
//!     ":irc.example.net 376 me :End of /MOTD command.",
//! ] {
//!     dispatcher.dispatch(&TokenizedLine::parse(raw).unwrap());
//! }
//!
//! let motd = dispatcher.session().motd().unwrap();
//! assert!(motd.ends_with("End of /MOTD command."));
//! assert!(matches!(dispatcher.sink().last(), Some(OutboundEvent::Generic(_))));
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use crate::error::{DispatchError, Result};
use crate::event::{EventSink, OutboundEvent};
use crate::line::{strip_sentinel, TokenizedLine};
use crate::motd::MotdBuffer;
use crate::prefix::nick_from_raw;
use crate::response::ReplyCode;
use crate::session::SessionStore;
use crate::who::WhoParser;

/// Default text of the [`OutboundEvent::NickInUse`] event.
pub const DEFAULT_NICK_IN_USE_MESSAGE: &str = "The nickname you chose is already in use";

/// Default template of the topic notice. `{topic}` and `{nick}` are
/// substituted.
pub const DEFAULT_TOPIC_TEMPLATE: &str = "The topic is now \"{topic}\", set by {nick}";

/// Dispatcher settings.
///
/// `motd_allowed` is consulted when `RPL_ENDOFMOTD` arrives, so changing it
/// through [`ReplyDispatcher::config_mut`] mid-connection takes effect for
/// the next MOTD.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatcherConfig {
    /// Forward the completed MOTD as a generic event.
    pub motd_allowed: bool,
    /// Text of the nick-in-use event.
    pub nick_in_use_message: String,
    /// Template of the topic-changed notice.
    pub topic_template: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            motd_allowed: true,
            nick_in_use_message: DEFAULT_NICK_IN_USE_MESSAGE.to_string(),
            topic_template: DEFAULT_TOPIC_TEMPLATE.to_string(),
        }
    }
}

impl DispatcherConfig {
    /// Render the topic notice for `topic` set by `nick`.
    pub fn topic_notice(&self, topic: &str, nick: &str) -> String {
        self.topic_template
            .replace("{topic}", topic)
            .replace("{nick}", nick)
    }
}

/// Which branch handled a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// An MOTD line was buffered (start or body).
    MotdLine,
    /// The MOTD was stored; `shown` tells whether an event went out.
    MotdComplete { shown: bool },
    /// A channel topic was replaced.
    Topic,
    /// A channel topic was cleared.
    NoTopic,
    /// The topic setter was recorded and announced.
    TopicInfo,
    /// A WHO row was buffered.
    WhoRow,
    /// A WHO response was committed with this many rows.
    WhoComplete(usize),
    /// The nick-in-use event went out.
    NickInUse,
    /// A generic event went out.
    Generic,
    /// The code has no handler; nothing happened.
    Unhandled(u16),
}

/// Numeric reply interpreter for one connection.
#[derive(Debug)]
pub struct ReplyDispatcher<S, K> {
    session: S,
    sink: K,
    config: DispatcherConfig,
    motd: MotdBuffer,
    who: WhoParser,
}

impl<S: SessionStore, K: EventSink> ReplyDispatcher<S, K> {
    pub fn new(session: S, sink: K, config: DispatcherConfig) -> Self {
        Self {
            session,
            sink,
            config,
            motd: MotdBuffer::new(),
            who: WhoParser::new(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DispatcherConfig {
        &mut self.config
    }

    /// The MOTD collected so far in the current sequence.
    pub fn pending_motd(&self) -> &str {
        self.motd.as_str()
    }

    /// WHO rows waiting for their end marker.
    pub fn pending_who_rows(&self) -> usize {
        self.who.pending()
    }

    pub fn into_parts(self) -> (S, K) {
        (self.session, self.sink)
    }

    /// Handle one reply line.
    ///
    /// Errors are logged and swallowed so a bad line cannot stop the
    /// connection's processing. Mutations made before the error stay.
    pub fn dispatch(&mut self, line: &TokenizedLine) {
        if let Err(error) = self.try_dispatch(line) {
            warn!(%error, tokens = ?line.tokens(), "failed to handle server reply");
        }
    }

    /// Tokenize a raw line, then [`dispatch`](Self::dispatch) it.
    pub fn dispatch_raw(&mut self, raw: &str) {
        match TokenizedLine::parse(raw) {
            Ok(line) => self.dispatch(&line),
            Err(error) => warn!(%error, raw, "failed to tokenize server reply"),
        }
    }

    /// Handle one reply line, reporting what happened.
    pub fn try_dispatch(&mut self, line: &TokenizedLine) -> Result<Outcome> {
        let token = line.code_token()?;
        let code: u16 = token.parse().map_err(|cause| DispatchError::MalformedCode {
            token: token.to_string(),
            cause,
        })?;

        let Some(reply) = ReplyCode::from_code(code) else {
            trace!(code, "unhandled server reply");
            return Ok(Outcome::Unhandled(code));
        };

        match reply {
            // MOTDSTART also carries the first line, so it falls through
            // to the RPL_MOTD handling after resetting the buffer.
            ReplyCode::RPL_MOTDSTART | ReplyCode::RPL_MOTD => {
                let content = strip_sentinel(line.param(0)?);
                if reply == ReplyCode::RPL_MOTDSTART {
                    self.motd.reset();
                }
                self.motd.push_line(content);
                Ok(Outcome::MotdLine)
            }
            ReplyCode::RPL_ENDOFMOTD => self.end_of_motd(line),
            ReplyCode::RPL_TOPIC => self.topic(line),
            ReplyCode::RPL_NOTOPIC => self.no_topic(line),
            ReplyCode::RPL_TOPICWHOTIME => self.topic_info(line),
            ReplyCode::RPL_WHOREPLY => {
                self.who.accumulate(line)?;
                Ok(Outcome::WhoRow)
            }
            ReplyCode::RPL_ENDOFWHO => {
                let target = line.param(0).unwrap_or_default();
                let batch = self.who.finalize(target);
                let rows = batch.len();
                debug!(rows, target, "committing who roster");
                self.session.commit_who(batch);
                Ok(Outcome::WhoComplete(rows))
            }
            ReplyCode::ERR_NICKNAMEINUSE => {
                self.sink
                    .emit(OutboundEvent::NickInUse(self.config.nick_in_use_message.clone()));
                Ok(Outcome::NickInUse)
            }
            other => self.fall_through(other, line),
        }
    }

    fn end_of_motd(&mut self, line: &TokenizedLine) -> Result<Outcome> {
        let motd = self.motd.finish(strip_sentinel(line.param(0)?));
        self.session.set_motd(motd.clone());

        let shown = self.config.motd_allowed;
        if shown {
            self.sink.emit(OutboundEvent::Generic(motd));
        }
        Ok(Outcome::MotdComplete { shown })
    }

    fn topic(&mut self, line: &TokenizedLine) -> Result<Outcome> {
        let name = line.param(0)?;
        let topic = strip_sentinel(line.param(1)?);
        let channel = self
            .session
            .channel_mut(name)
            .ok_or_else(|| DispatchError::ChannelNotFound(name.to_string()))?;
        channel.set_topic(topic);
        Ok(Outcome::Topic)
    }

    fn no_topic(&mut self, line: &TokenizedLine) -> Result<Outcome> {
        let name = line.param(0)?;
        let channel = self
            .session
            .channel_mut(name)
            .ok_or_else(|| DispatchError::ChannelNotFound(name.to_string()))?;
        channel.set_topic("");
        Ok(Outcome::NoTopic)
    }

    fn topic_info(&mut self, line: &TokenizedLine) -> Result<Outcome> {
        let name = line.param(0)?;
        let nick = nick_from_raw(line.param(1)?);
        let set_at = line.param(2).ok().and_then(parse_unix_time);

        let channel = self
            .session
            .channel_mut(name)
            .ok_or_else(|| DispatchError::ChannelNotFound(name.to_string()))?;
        channel.set_topic_setter(nick);
        if set_at.is_some() {
            channel.set_topic_set_at(set_at);
        }

        let event = OutboundEvent::TopicChanged {
            channel: channel.name().to_string(),
            text: self.config.topic_notice(channel.topic(), nick),
        };
        self.sink.emit(event);
        Ok(Outcome::TopicInfo)
    }

    fn fall_through(&mut self, reply: ReplyCode, line: &TokenizedLine) -> Result<Outcome> {
        if !reply.is_generic() {
            trace!(code = reply.code(), "unhandled server reply");
            return Ok(Outcome::Unhandled(reply.code()));
        }
        let message = line.param(0)?;
        self.sink.emit(OutboundEvent::Generic(message.to_string()));
        Ok(Outcome::Generic)
    }
}

fn parse_unix_time(raw: &str) -> Option<DateTime<Utc>> {
    let secs = strip_sentinel(raw).parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}
