//! Fuzz target for reply tokenizing and dispatch
//!
//! Feeds arbitrary lines through the tokenizer and the dispatcher and makes
//! sure neither of them panics.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_session::{DispatcherConfig, ReplyDispatcher, Session};
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.is_empty() || input.len() > 4096 {
            return;
        }

        let mut session = Session::new();
        session.join("#fuzz");
        let mut dispatcher = ReplyDispatcher::new(session, Vec::new(), DispatcherConfig::default());

        // Several lines per input so MOTD and WHO state carries over.
        for line in input.split('\n') {
            dispatcher.dispatch_raw(line);
        }
    }
});
