//! IRC numeric reply codes understood by the reply dispatcher.
//!
//! This is a closed enumeration: only numerics that the dispatcher either
//! handles directly or forwards as generic server text are listed. Any other
//! three-digit code is still a valid line, it just has no variant here.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

mod helpers;

pub use self::helpers::{ParseReplyCodeError, GENERIC_CODES};

/// IRC server reply code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum ReplyCode {
    // === Connection Registration (001-099) ===
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 002 - Your host is running version
    RPL_YOURHOST = 2,
    /// 003 - Server creation date
    RPL_CREATED = 3,
    /// 004 - Server info (name, version, user modes, channel modes)
    RPL_MYINFO = 4,

    // === Luser replies ===
    /// 250 - Highest connection count
    RPL_STATSCONN = 250,
    /// 251 - Luser client count
    RPL_LUSERCLIENT = 251,
    /// 252 - Luser operator count
    RPL_LUSEROP = 252,
    /// 253 - Luser unknown connections
    RPL_LUSERUNKNOWN = 253,
    /// 254 - Luser channel count
    RPL_LUSERCHANNELS = 254,
    /// 255 - Luser local info
    RPL_LUSERME = 255,
    /// 265 - Local users
    RPL_LOCALUSERS = 265,
    /// 266 - Global users
    RPL_GLOBALUSERS = 266,

    // === WHO ===
    /// 315 - End of WHO
    RPL_ENDOFWHO = 315,
    /// 352 - WHO reply row
    RPL_WHOREPLY = 352,

    // === Topic ===
    /// 331 - No topic set
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 333 - Topic set by/time
    RPL_TOPICWHOTIME = 333,

    // === MOTD ===
    /// 372 - MOTD line
    RPL_MOTD = 372,
    /// 375 - MOTD start
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,

    // === Errors ===
    /// 433 - Nickname is already in use
    ERR_NICKNAMEINUSE = 433,
}
