//! Per-connection session state written by the reply dispatcher.
//!
//! The dispatcher only ever goes through [`SessionStore`], so an
//! application can keep its state wherever it likes (behind a lock shared
//! with the UI, in an actor, ...). [`Session`] is the plain in-memory
//! implementation.
//!
//! The dispatcher never creates channels. Joining is the owner's job; a
//! reply about a channel that is not registered is reported as
//! [`DispatchError::ChannelNotFound`](crate::DispatchError::ChannelNotFound).

mod channel;

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

pub use self::channel::{Channel, ChannelRegistry, Member};

use crate::casemap::{irc_eq, irc_to_lower};
use crate::who::{WhoBatch, WhoFlags, WhoRow};

/// Write target of the reply dispatcher.
pub trait SessionStore {
    /// The registered channel called `name`, if any.
    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel>;

    /// Store the server's message of the day.
    fn set_motd(&mut self, motd: String);

    /// Apply one complete WHO response.
    fn commit_who(&mut self, batch: WhoBatch);
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        (**self).channel_mut(name)
    }

    fn set_motd(&mut self, motd: String) {
        (**self).set_motd(motd);
    }

    fn commit_who(&mut self, batch: WhoBatch) {
        (**self).commit_who(batch);
    }
}

/// A user seen in a WHO response.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    pub nick: String,
    pub user: String,
    pub host: String,
    pub server: String,
    pub real_name: String,
    pub hop_count: u32,
    pub away: bool,
    pub oper: bool,
}

impl From<&WhoRow> for User {
    fn from(row: &WhoRow) -> Self {
        let WhoFlags { away, oper, .. } = row.flags;
        User {
            nick: row.nick.clone(),
            user: row.user.clone(),
            host: row.host.clone(),
            server: row.server.clone(),
            real_name: row.real_name.clone(),
            hop_count: row.hop_count,
            away,
            oper,
        }
    }
}

/// In-memory session state for one server connection.
#[derive(Clone, Debug, Default)]
pub struct Session {
    channels: ChannelRegistry,
    /// Keyed by case-folded nickname.
    users: HashMap<String, User>,
    motd: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut ChannelRegistry {
        &mut self.channels
    }

    /// Shorthand for `channels_mut().join(name)`.
    pub fn join(&mut self, name: &str) -> &mut Channel {
        self.channels.join(name)
    }

    /// Forget a channel and every user that was only known through it.
    pub fn part(&mut self, name: &str) -> Option<Channel> {
        let channel = self.channels.part(name)?;
        self.prune_users(channel.members().map(|m| m.nick.as_str()), &[]);
        Some(channel)
    }

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(&irc_to_lower(nick))
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// The last MOTD received, if the server has sent one.
    pub fn motd(&self) -> Option<&str> {
        self.motd.as_deref()
    }

    /// Drop users in `candidates` that are no longer in any joined channel,
    /// except those listed in `keep`.
    fn prune_users<'a, I>(&mut self, candidates: I, keep: &[&str])
    where
        I: IntoIterator<Item = &'a str>,
    {
        for nick in candidates {
            if keep.iter().any(|k| irc_eq(k, nick)) {
                continue;
            }
            if self.channels.iter().all(|c| c.member(nick).is_none()) {
                self.users.remove(&irc_to_lower(nick));
            }
        }
    }
}

impl SessionStore for Session {
    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.lookup_mut(name).ok()
    }

    fn set_motd(&mut self, motd: String) {
        self.motd = Some(motd);
    }

    fn commit_who(&mut self, batch: WhoBatch) {
        let mut rosters: BTreeMap<String, (String, Vec<Member>)> = BTreeMap::new();
        for row in batch.rows() {
            self.users.insert(irc_to_lower(&row.nick), User::from(row));
            rosters
                .entry(irc_to_lower(&row.channel))
                .or_insert_with(|| (row.channel.clone(), Vec::new()))
                .1
                .push(Member {
                    nick: row.nick.clone(),
                    prefixes: row.flags.prefixes.clone(),
                });
        }

        // A WHO on the channel itself lists every member. Anything else is a
        // subset and is merged in.
        let target = batch.target();
        if self.channels.contains(target) {
            rosters
                .entry(irc_to_lower(target))
                .or_insert_with(|| (target.to_string(), Vec::new()));
        }

        let mut dropped = Vec::new();
        for (name, members) in rosters.into_values() {
            let Ok(channel) = self.channels.lookup_mut(&name) else {
                debug!(channel = %name, "who roster for unjoined channel");
                continue;
            };
            if irc_eq(&name, target) {
                dropped.extend(channel.members().map(|m| m.nick.clone()));
                channel.set_members(members);
            } else {
                for member in members {
                    channel.upsert_member(member);
                }
            }
        }

        let seen: Vec<&str> = batch.rows().iter().map(|r| r.nick.as_str()).collect();
        self.prune_users(dropped.iter().map(String::as_str), &seen);
    }
}
