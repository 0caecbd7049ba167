//! Channels and the registry that owns them.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::casemap::irc_to_lower;
use crate::error::{DispatchError, Result};

/// A user's membership in a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    /// Nickname as last reported by the server.
    pub nick: String,
    /// Membership prefixes (`@`, `+`, ...).
    pub prefixes: String,
}

/// A joined channel and its topic state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    name: String,
    topic: String,
    topic_setter: String,
    topic_set_at: Option<DateTime<Utc>>,
    /// Keyed by case-folded nickname.
    members: BTreeMap<String, Member>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topic: String::new(),
            topic_setter: String::new(),
            topic_set_at: None,
            members: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    /// Nickname of whoever last set the topic. Empty until known.
    pub fn topic_setter(&self) -> &str {
        &self.topic_setter
    }

    pub fn set_topic_setter(&mut self, nick: impl Into<String>) {
        self.topic_setter = nick.into();
    }

    pub fn topic_set_at(&self) -> Option<DateTime<Utc>> {
        self.topic_set_at
    }

    pub fn set_topic_set_at(&mut self, at: Option<DateTime<Utc>>) {
        self.topic_set_at = at;
    }

    /// Members in case-folded nickname order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn member(&self, nick: &str) -> Option<&Member> {
        self.members.get(&irc_to_lower(nick))
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Add a member, or update the prefixes of an existing one.
    pub fn upsert_member(&mut self, member: Member) {
        self.members.insert(irc_to_lower(&member.nick), member);
    }

    /// Replace the whole member list.
    pub fn set_members<I: IntoIterator<Item = Member>>(&mut self, members: I) {
        self.members = members
            .into_iter()
            .map(|m| (irc_to_lower(&m.nick), m))
            .collect();
    }
}

/// Joined channels keyed by RFC 1459 folded name.
#[derive(Clone, Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, Channel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel. Returns the existing entry if already joined.
    pub fn join(&mut self, name: &str) -> &mut Channel {
        self.channels
            .entry(irc_to_lower(name))
            .or_insert_with(|| Channel::new(name))
    }

    /// Forget a channel, returning its last state.
    pub fn part(&mut self, name: &str) -> Option<Channel> {
        self.channels.remove(&irc_to_lower(name))
    }

    pub fn lookup(&self, name: &str) -> Result<&Channel> {
        self.channels
            .get(&irc_to_lower(name))
            .ok_or_else(|| DispatchError::ChannelNotFound(name.to_string()))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Result<&mut Channel> {
        self.channels
            .get_mut(&irc_to_lower(name))
            .ok_or_else(|| DispatchError::ChannelNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(&irc_to_lower(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
