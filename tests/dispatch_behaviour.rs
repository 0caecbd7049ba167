//! End-to-end behaviour of the reply dispatcher.
//!
//! Each module feeds tokenized lines into a fresh dispatcher backed by the
//! in-memory [`Session`] and a recording sink.
//!
//! Run with: `cargo test --test dispatch_behaviour`

use slirc_session::{
    DispatcherConfig, OutboundEvent, ReplyCode, ReplyDispatcher, Session, TokenizedLine,
};

fn dispatcher_with(
    channels: &[&str],
    config: DispatcherConfig,
) -> ReplyDispatcher<Session, Vec<OutboundEvent>> {
    // Surface dispatcher warnings in test output.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut session = Session::new();
    for name in channels {
        session.join(name);
    }
    ReplyDispatcher::new(session, Vec::new(), config)
}

fn dispatcher() -> ReplyDispatcher<Session, Vec<OutboundEvent>> {
    dispatcher_with(&["#test"], DispatcherConfig::default())
}

fn reply(code: &str, params: &[&str]) -> TokenizedLine {
    let mut tokens = vec!["irc.example.net", code, "me"];
    tokens.extend_from_slice(params);
    TokenizedLine::from_tokens(tokens)
}

// =============================================================================
// GENERIC CODES
// =============================================================================

mod generic {
    use super::*;

    #[test]
    fn test_every_generic_code_emits_message_verbatim() {
        for code in slirc_session::response::GENERIC_CODES {
            let mut d = dispatcher();
            let message = format!(":text for {}", code);
            d.dispatch(&reply(&code.to_string(), &[message.as_str()]));
            assert_eq!(d.sink().as_slice(), [OutboundEvent::Generic(message)]);
        }
    }

    #[test]
    fn test_non_generic_unknown_code_emits_nothing() {
        let mut d = dispatcher();
        d.dispatch(&reply("005", &["CHANTYPES=#", ":are supported by this server"]));
        d.dispatch(&reply("999", &[":whatever"]));
        assert!(d.sink().is_empty());
    }

    #[test]
    fn test_malformed_code_does_not_poison_next_line() {
        let mut d = dispatcher();
        d.dispatch(&reply("l0l", &[":nope"]));
        d.dispatch(&reply("001", &[":Welcome"]));
        assert_eq!(
            d.sink().as_slice(),
            [OutboundEvent::Generic(":Welcome".to_string())]
        );
    }
}

// =============================================================================
// MOTD
// =============================================================================

mod motd {
    use super::*;

    fn feed_motd(d: &mut ReplyDispatcher<Session, Vec<OutboundEvent>>) {
        d.dispatch(&reply("375", &[":"]));
        d.dispatch(&reply("372", &[":line1"]));
        d.dispatch(&reply("372", &[":line2"]));
        d.dispatch(&reply("376", &[":last"]));
    }

    #[test]
    fn test_motd_accumulates_and_is_shown() {
        let mut d = dispatcher();
        feed_motd(&mut d);

        assert_eq!(d.session().motd(), Some("line1\nline2\nlast"));
        assert_eq!(
            d.sink().as_slice(),
            [OutboundEvent::Generic("line1\nline2\nlast".to_string())]
        );
        assert_eq!(d.pending_motd(), "");
    }

    #[test]
    fn test_motd_hidden_when_not_permitted() {
        let config = DispatcherConfig {
            motd_allowed: false,
            ..DispatcherConfig::default()
        };
        let mut d = dispatcher_with(&[], config);
        feed_motd(&mut d);

        assert_eq!(d.session().motd(), Some("line1\nline2\nlast"));
        assert!(d.sink().is_empty());
    }

    #[test]
    fn test_start_line_content_is_kept() {
        let mut d = dispatcher();
        d.dispatch(&reply("375", &[":- irc.example.net Message of the day -"]));
        d.dispatch(&reply("372", &[":-   welcome   "]));
        d.dispatch(&reply("376", &[":End of /MOTD command."]));

        assert_eq!(
            d.session().motd(),
            Some("- irc.example.net Message of the day -\n-   welcome\nEnd of /MOTD command.")
        );
    }

    #[test]
    fn test_repeated_start_resets_buffer() {
        let mut d = dispatcher();
        d.dispatch(&reply("375", &[":first"]));
        d.dispatch(&reply("372", &[":stale"]));
        d.dispatch(&reply("375", &[":second"]));
        assert_eq!(d.pending_motd(), "second\n");

        d.dispatch(&reply("375", &[":second"]));
        assert_eq!(d.pending_motd(), "second\n");

        d.dispatch(&reply("376", &[":done"]));
        assert_eq!(d.session().motd(), Some("second\ndone"));
    }

    #[test]
    fn test_motd_lines_emit_nothing_until_end() {
        let mut d = dispatcher();
        d.dispatch(&reply("375", &[":a"]));
        d.dispatch(&reply("372", &[":b"]));
        assert!(d.sink().is_empty());
        assert_eq!(d.session().motd(), None);
    }
}

// =============================================================================
// TOPICS
// =============================================================================

mod topic {
    use super::*;

    #[test]
    fn test_topic_info_sets_setter_and_announces() {
        let mut d = dispatcher();
        d.dispatch(&reply("332", &["#test", ":All about tests"]));
        d.dispatch(&reply("333", &["#test", "nick!user@host", "1700000000"]));

        let channel = d.session().channels().lookup("#test").unwrap();
        assert_eq!(channel.topic(), "All about tests");
        assert_eq!(channel.topic_setter(), "nick");

        match d.sink().as_slice() {
            [OutboundEvent::TopicChanged { channel, text }] => {
                assert_eq!(channel, "#test");
                assert!(text.contains("All about tests"));
                assert!(text.contains("nick"));
                assert!(!text.contains("user@host"));
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn test_topic_on_unknown_channel_is_contained() {
        let mut d = dispatcher();
        d.dispatch(&reply("332", &["#elsewhere", ":ignored"]));
        d.dispatch(&reply("333", &["#elsewhere", "nick!user@host"]));

        assert!(d.session().channels().lookup("#elsewhere").is_err());
        assert_eq!(d.session().channels().lookup("#test").unwrap().topic(), "");
        assert!(d.sink().is_empty());
    }

    #[test]
    fn test_topic_reply_missing_fields() {
        let mut d = dispatcher();
        d.dispatch(&reply("332", &["#test"]));
        assert_eq!(d.session().channels().lookup("#test").unwrap().topic(), "");
    }

    #[test]
    fn test_topic_channel_name_is_case_folded() {
        let mut d = dispatcher_with(&["#Rust[en]"], DispatcherConfig::default());
        d.dispatch(&reply("332", &["#rust{EN}", ":folded"]));
        assert_eq!(
            d.session().channels().lookup("#Rust[en]").unwrap().topic(),
            "folded"
        );
    }
}

// =============================================================================
// NICK IN USE
// =============================================================================

mod nick_in_use {
    use super::*;

    #[test]
    fn test_single_event_independent_of_content() {
        for message in [":Nickname is already in use", ":something else", ""] {
            let mut d = dispatcher();
            d.dispatch(&reply("375", &[":partial"]));
            d.dispatch(&reply("433", &["wanted", message]));

            assert_eq!(d.sink().len(), 1);
            assert!(matches!(d.sink()[0], OutboundEvent::NickInUse(_)));
            assert_eq!(d.pending_motd(), "partial\n");
            assert_eq!(d.session().channels().lookup("#test").unwrap().topic(), "");
        }
    }

    #[test]
    fn test_message_comes_from_config() {
        let config = DispatcherConfig {
            nick_in_use_message: "Nick belegt".to_string(),
            ..DispatcherConfig::default()
        };
        let mut d = dispatcher_with(&[], config);
        d.dispatch(&reply(&ReplyCode::ERR_NICKNAMEINUSE.to_string(), &["x"]));
        assert_eq!(
            d.sink().as_slice(),
            [OutboundEvent::NickInUse("Nick belegt".to_string())]
        );
    }
}

// =============================================================================
// WHO
// =============================================================================

mod who {
    use super::*;

    fn who_row(nick: &str, flags: &str) -> TokenizedLine {
        reply(
            "352",
            &["#test", "~u", "host.example", "irc.example.net", nick, flags, ":0 Real Name"],
        )
    }

    #[test]
    fn test_rows_commit_as_one_batch() {
        let mut d = dispatcher();
        d.dispatch(&who_row("alice", "H@"));
        d.dispatch(&who_row("bob", "H+"));
        d.dispatch(&who_row("carol", "G"));

        // Nothing is visible before the end marker.
        assert_eq!(
            d.session().channels().lookup("#test").unwrap().member_count(),
            0
        );
        assert_eq!(d.pending_who_rows(), 3);

        d.dispatch(&reply("315", &["#test", ":End of /WHO list."]));

        let channel = d.session().channels().lookup("#test").unwrap();
        assert_eq!(channel.member_count(), 3);
        assert_eq!(channel.member("alice").unwrap().prefixes, "@");
        assert!(d.session().user("carol").unwrap().away);
        assert_eq!(d.pending_who_rows(), 0);
        assert!(d.sink().is_empty());
    }

    #[test]
    fn test_end_of_who_without_rows() {
        let mut d = dispatcher();
        assert_eq!(
            d.try_dispatch(&reply("315", &["#test", ":End of /WHO list."])),
            Ok(slirc_session::Outcome::WhoComplete(0))
        );
    }

    #[test]
    fn test_second_request_starts_fresh() {
        let mut d = dispatcher();
        d.dispatch(&who_row("alice", "H"));
        d.dispatch(&reply("315", &["#test", ":End"]));
        d.dispatch(&who_row("dave", "H"));
        d.dispatch(&reply("315", &["#test", ":End"]));

        let channel = d.session().channels().lookup("#test").unwrap();
        assert_eq!(channel.member_count(), 1);
        assert!(channel.member("dave").is_some());
    }

    #[test]
    fn test_who_on_single_nick_keeps_roster() {
        let mut d = dispatcher();
        for nick in ["alice", "bob", "carol"] {
            d.dispatch(&who_row(nick, "H"));
        }
        d.dispatch(&reply("315", &["#test", ":End of /WHO list."]));

        d.dispatch(&who_row("bob", "G"));
        d.dispatch(&reply("315", &["bob", ":End of /WHO list."]));

        let channel = d.session().channels().lookup("#test").unwrap();
        assert_eq!(channel.member_count(), 3);
        assert!(channel.member("alice").is_some());
        assert!(d.session().user("bob").unwrap().away);
    }

    #[test]
    fn test_who_on_mask_merges_prefixes() {
        let mut d = dispatcher();
        d.dispatch(&who_row("alice", "H"));
        d.dispatch(&who_row("bob", "H"));
        d.dispatch(&reply("315", &["#test", ":End of /WHO list."]));

        d.dispatch(&who_row("alice", "H@"));
        d.dispatch(&reply("315", &["*.example", ":End of /WHO list."]));

        let channel = d.session().channels().lookup("#test").unwrap();
        assert_eq!(channel.member_count(), 2);
        assert_eq!(channel.member("alice").unwrap().prefixes, "@");
    }
}

// =============================================================================
// RAW LINES
// =============================================================================

mod raw {
    use super::*;

    #[test]
    fn test_full_session_from_raw_lines() {
        let lines = [
            ":irc.example.net 001 me :Welcome to the Example IRC Network me",
            ":irc.example.net 375 me :- irc.example.net Message of the Day -",
            ":irc.example.net 372 me :- Hello",
            ":irc.example.net 376 me :End of /MOTD command.",
            ":irc.example.net 332 me #test :Testing things",
            ":irc.example.net 333 me #test ferris!crab@example.org 1700000000",
            ":irc.example.net 352 me #test crab example.org irc.example.net ferris H@ :0 Ferris",
            ":irc.example.net 315 me #test :End of /WHO list.",
            ":irc.example.net 433 * me :Nickname is already in use",
        ];

        let mut d = dispatcher();
        for raw in lines {
            d.dispatch_raw(raw);
        }

        let events = d.sink();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], OutboundEvent::Generic(_)));
        assert!(matches!(
            events[1],
            OutboundEvent::Generic(ref m) if m.ends_with("End of /MOTD command.")
        ));
        assert!(matches!(events[2], OutboundEvent::TopicChanged { .. }));
        assert!(matches!(events[3], OutboundEvent::NickInUse(_)));

        let channel = d.session().channels().lookup("#test").unwrap();
        assert_eq!(channel.topic_setter(), "ferris");
        assert!(channel.member("ferris").is_some());
    }
}
