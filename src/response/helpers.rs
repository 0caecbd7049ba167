//! Helper methods and trait implementations for reply codes.
//!
//! - Code conversion (`from_code`, `code`)
//! - Classification (`is_generic`, `is_motd`, `is_error`)
//! - Display/parsing traits

use super::ReplyCode;
use std::str::FromStr;

/// Reply codes whose message field is forwarded to the user verbatim.
pub const GENERIC_CODES: &[ReplyCode] = &[
    ReplyCode::RPL_WELCOME,
    ReplyCode::RPL_YOURHOST,
    ReplyCode::RPL_CREATED,
    ReplyCode::RPL_MYINFO,
    ReplyCode::RPL_STATSCONN,
    ReplyCode::RPL_LUSERCLIENT,
    ReplyCode::RPL_LUSEROP,
    ReplyCode::RPL_LUSERUNKNOWN,
    ReplyCode::RPL_LUSERCHANNELS,
    ReplyCode::RPL_LUSERME,
    ReplyCode::RPL_LOCALUSERS,
    ReplyCode::RPL_GLOBALUSERS,
];

impl ReplyCode {
    /// Every variant, in numeric order.
    pub const ALL: &'static [ReplyCode] = &[
        ReplyCode::RPL_WELCOME,
        ReplyCode::RPL_YOURHOST,
        ReplyCode::RPL_CREATED,
        ReplyCode::RPL_MYINFO,
        ReplyCode::RPL_STATSCONN,
        ReplyCode::RPL_LUSERCLIENT,
        ReplyCode::RPL_LUSEROP,
        ReplyCode::RPL_LUSERUNKNOWN,
        ReplyCode::RPL_LUSERCHANNELS,
        ReplyCode::RPL_LUSERME,
        ReplyCode::RPL_LOCALUSERS,
        ReplyCode::RPL_GLOBALUSERS,
        ReplyCode::RPL_ENDOFWHO,
        ReplyCode::RPL_NOTOPIC,
        ReplyCode::RPL_TOPIC,
        ReplyCode::RPL_TOPICWHOTIME,
        ReplyCode::RPL_WHOREPLY,
        ReplyCode::RPL_MOTD,
        ReplyCode::RPL_MOTDSTART,
        ReplyCode::RPL_ENDOFMOTD,
        ReplyCode::ERR_NICKNAMEINUSE,
    ];

    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Creates a ReplyCode from a numeric code
    pub fn from_code(code: u16) -> Option<ReplyCode> {
        let code = match code {
            1 => ReplyCode::RPL_WELCOME,
            2 => ReplyCode::RPL_YOURHOST,
            3 => ReplyCode::RPL_CREATED,
            4 => ReplyCode::RPL_MYINFO,
            250 => ReplyCode::RPL_STATSCONN,
            251 => ReplyCode::RPL_LUSERCLIENT,
            252 => ReplyCode::RPL_LUSEROP,
            253 => ReplyCode::RPL_LUSERUNKNOWN,
            254 => ReplyCode::RPL_LUSERCHANNELS,
            255 => ReplyCode::RPL_LUSERME,
            265 => ReplyCode::RPL_LOCALUSERS,
            266 => ReplyCode::RPL_GLOBALUSERS,
            315 => ReplyCode::RPL_ENDOFWHO,
            331 => ReplyCode::RPL_NOTOPIC,
            332 => ReplyCode::RPL_TOPIC,
            333 => ReplyCode::RPL_TOPICWHOTIME,
            352 => ReplyCode::RPL_WHOREPLY,
            372 => ReplyCode::RPL_MOTD,
            375 => ReplyCode::RPL_MOTDSTART,
            376 => ReplyCode::RPL_ENDOFMOTD,
            433 => ReplyCode::ERR_NICKNAMEINUSE,
            _ => return None,
        };
        Some(code)
    }

    /// Check if this code belongs to the generic set.
    #[inline]
    pub fn is_generic(&self) -> bool {
        GENERIC_CODES.contains(self)
    }

    /// Check if this code is part of an MOTD sequence (375, 372, 376)
    #[inline]
    pub fn is_motd(&self) -> bool {
        matches!(
            self,
            ReplyCode::RPL_MOTDSTART | ReplyCode::RPL_MOTD | ReplyCode::RPL_ENDOFMOTD
        )
    }

    /// Check if this is an error reply (4xx, 5xx)
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl FromStr for ReplyCode {
    type Err = ParseReplyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u16 = s.parse().map_err(|_| ParseReplyCodeError::InvalidFormat)?;
        ReplyCode::from_code(code).ok_or(ParseReplyCodeError::UnknownCode(code))
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Error when parsing a reply code
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseReplyCodeError {
    /// The string was not a valid number
    InvalidFormat,
    /// The numeric code has no variant
    UnknownCode(u16),
}

impl std::fmt::Display for ParseReplyCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "invalid reply code format"),
            Self::UnknownCode(code) => write!(f, "unknown reply code: {}", code),
        }
    }
}

impl std::error::Error for ParseReplyCodeError {}
