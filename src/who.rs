//! WHO reply accumulation.
//!
//! A WHO response is a run of `352 RPL_WHOREPLY` rows closed by
//! `315 RPL_ENDOFWHO`. Rows are parsed as they arrive and held until the end
//! marker, then handed over as one [`WhoBatch`].
//!
//! Row layout after the sender, code and target tokens:
//!
//! ```text
//! <channel> <user> <host> <server> <nick> <flags> :<hopcount> <realname>
//! ```

use tracing::trace;

use crate::error::{DispatchError, Result};
use crate::line::{strip_sentinel, TokenizedLine};

/// Membership prefixes a WHO flag field may carry, highest rank first.
pub const MEMBERSHIP_PREFIXES: &str = "~&@%+";

/// Presence flags decoded from a WHO row's flag field (`H`, `G*@`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WhoFlags {
    /// `G` (gone) instead of `H` (here).
    pub away: bool,
    /// `*`: the user is an IRC operator.
    pub oper: bool,
    /// Channel membership prefixes in the order the server sent them.
    pub prefixes: String,
}

impl WhoFlags {
    /// Decode a raw flag field.
    pub fn parse(raw: &str) -> Self {
        let mut flags = WhoFlags::default();
        for c in raw.chars() {
            match c {
                'G' => flags.away = true,
                '*' => flags.oper = true,
                c if MEMBERSHIP_PREFIXES.contains(c) => flags.prefixes.push(c),
                _ => {}
            }
        }
        flags
    }

    /// The highest ranked membership prefix, if any.
    pub fn highest_prefix(&self) -> Option<char> {
        MEMBERSHIP_PREFIXES
            .chars()
            .find(|p| self.prefixes.contains(*p))
    }
}

/// One user's presence in one channel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WhoRow {
    pub channel: String,
    pub user: String,
    pub host: String,
    pub server: String,
    pub nick: String,
    pub flags: WhoFlags,
    pub hop_count: u32,
    pub real_name: String,
}

impl WhoRow {
    /// Parse the fixed-position fields of a WHO reply line.
    pub fn from_line(line: &TokenizedLine) -> Result<Self> {
        let tail = strip_sentinel(line.param(6)?);
        let (hops, real_name) = match tail.split_once(' ') {
            Some((hops, name)) => (hops, name.trim()),
            None => (tail, ""),
        };
        let hop_count = hops.parse().map_err(|_| DispatchError::InvalidField {
            field: "hop count",
            value: hops.to_string(),
        })?;

        Ok(WhoRow {
            channel: line.param(0)?.to_string(),
            user: line.param(1)?.to_string(),
            host: line.param(2)?.to_string(),
            server: line.param(3)?.to_string(),
            nick: line.param(4)?.to_string(),
            flags: WhoFlags::parse(line.param(5)?),
            hop_count,
            real_name: real_name.to_string(),
        })
    }

    /// `user@host` for this row.
    pub fn user_host(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// The rows of one complete WHO response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WhoBatch {
    target: String,
    rows: Vec<WhoRow>,
}

impl WhoBatch {
    /// Set the query target reported by `RPL_ENDOFWHO`.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// The query target, empty if the end marker carried none.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn rows(&self) -> &[WhoRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<WhoRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<WhoRow> for WhoBatch {
    fn from_iter<I: IntoIterator<Item = WhoRow>>(iter: I) -> Self {
        WhoBatch {
            target: String::new(),
            rows: iter.into_iter().collect(),
        }
    }
}

/// Collects WHO rows between end markers.
///
/// Only one WHO request is expected in flight per connection; rows from two
/// interleaved requests would land in the same batch.
#[derive(Clone, Debug, Default)]
pub struct WhoParser {
    pending: Vec<WhoRow>,
}

impl WhoParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and hold one `RPL_WHOREPLY` row. A malformed row is not kept.
    pub fn accumulate(&mut self, line: &TokenizedLine) -> Result<()> {
        let row = WhoRow::from_line(line)?;
        trace!(channel = %row.channel, nick = %row.nick, "who row");
        self.pending.push(row);
        Ok(())
    }

    /// Hand over every row held since the previous call, tagged with the
    /// query `target`.
    pub fn finalize(&mut self, target: &str) -> WhoBatch {
        WhoBatch {
            target: target.to_string(),
            rows: std::mem::take(&mut self.pending),
        }
    }

    /// Rows held so far.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
