//! # slirc-session
//!
//! Client-side interpretation of IRC numeric replies.
//!
//! ## Features
//!
//! - Tokenizing raw server lines into reply tokens
//! - Numeric dispatch over a closed set of reply codes
//! - MOTD accumulation across `375`/`372`/`376`
//! - Channel topic and topic-setter tracking
//! - WHO roster accumulation committed on `315`
//! - Typed outbound events for the rest of the application
//!
//! The crate is sans-IO: reading lines off the socket, and delivering events
//! to a UI, belong to the caller.

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ```rust
//! use slirc_session::{DispatcherConfig, OutboundEvent, ReplyDispatcher, Session};
//!
//! let mut session = Session::new();
//! session.join("#rust");
//!
//! let mut dispatcher = ReplyDispatcher::new(session, Vec::new(), DispatcherConfig::default());
//! dispatcher.dispatch_raw(":irc.example.net 332 me #rust :Systems programming");
//! dispatcher.dispatch_raw(":irc.example.net 333 me #rust ferris!crab@rust-lang.org 1700000000");
//!
//! let channel = dispatcher.session().channels().lookup("#rust").unwrap();
//! assert_eq!(channel.topic(), "Systems programming");
//! assert_eq!(channel.topic_setter(), "ferris");
//! assert!(matches!(
//!     dispatcher.sink().as_slice(),
//!     [OutboundEvent::TopicChanged { .. }]
//! ));
//! ```

pub mod casemap;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod line;
pub mod motd;
pub mod prefix;
pub mod response;
pub mod session;
pub mod who;

pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::dispatch::{DispatcherConfig, Outcome, ReplyDispatcher};
pub use self::error::DispatchError;
pub use self::event::{EventSink, OutboundEvent};
pub use self::line::TokenizedLine;
pub use self::motd::MotdBuffer;
pub use self::response::{ParseReplyCodeError, ReplyCode};
pub use self::session::{Channel, ChannelRegistry, Session, SessionStore, User};
pub use self::who::{WhoBatch, WhoParser, WhoRow};
