//! Property-based tests for the engine's pure functions.
//!
//! Uses proptest to generate random inputs and verify that:
//! 1. Message splitting is lossless and never exceeds its byte budget
//! 2. Mode change lists survive a render → parse roundtrip
//! 3. Case-folded identifiers behave consistently as map keys
//! 4. The dispatcher never panics, whatever arrives

use proptest::prelude::*;

use irc_engine::{
    irc_to_lower, parse_mode_changes, render_mode_changes, split_message, truncate_utf8_safe,
    Identifier, Message, ModeChange, ModePolicy, Session,
};

// =============================================================================
// STRATEGIES
// =============================================================================

/// Valid IRC nickname, including the RFC 1459 special characters.
fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

/// A mode argument: nonempty, no whitespace.
fn mode_arg_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9*!@.]{1,12}").expect("valid regex")
}

/// One mode change that is well-formed under the RFC default policy.
fn mode_change_strategy() -> impl Strategy<Value = ModeChange> {
    prop_oneof![
        // Type D: never an argument.
        (any::<bool>(), prop::sample::select(vec!['i', 'm', 'n', 'p', 's', 't']))
            .prop_map(|(set, mode)| ModeChange { set, mode, arg: String::new() }),
        // Type A (mask list) and membership modes: argument both ways.
        (any::<bool>(), prop::sample::select(vec!['b', 'o', 'v', 'k']), mode_arg_strategy())
            .prop_map(|(set, mode, arg)| ModeChange { set, mode, arg }),
        // Type C: argument on set only.
        mode_arg_strategy().prop_map(|arg| ModeChange { set: true, mode: 'l', arg }),
        Just(ModeChange { set: false, mode: 'l', arg: String::new() }),
    ]
}

fn mode_changes_strategy() -> impl Strategy<Value = Vec<ModeChange>> {
    prop::collection::vec(mode_change_strategy(), 0..8)
}

/// Arbitrary printable text for message bodies (no CR/LF/NUL).
fn body_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{0,600}").expect("valid regex")
}

/// Commands the dispatcher routes, plus numerics and junk.
fn command_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "PING", "PONG", "JOIN", "PART", "QUIT", "NICK", "KICK", "MODE", "TOPIC", "CAP",
        "PRIVMSG", "WALLOPS", "001", "005", "221", "315", "324", "329", "331", "332", "333",
        "346", "347", "348", "349", "352", "353", "366", "367", "368", "728", "729", "999",
    ])
    .prop_map(str::to_string)
}

/// Arbitrary argument vectors, including empty and whitespace-bearing ones.
fn args_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::string::string_regex("[ -~]{0,16}").expect("valid regex"),
        0..6,
    )
}

// =============================================================================
// SPLITTING
// =============================================================================

proptest! {
    /// Chunks respect the budget and concatenate back to the input.
    #[test]
    fn split_is_lossless_within_budget(text in body_strategy(), budget in 4usize..128) {
        let chunks: Vec<&str> = split_message(&text, budget).collect();
        for chunk in &chunks {
            prop_assert!(!chunk.is_empty());
            prop_assert!(chunk.len() <= budget,
                "chunk of {} bytes exceeds budget {}", chunk.len(), budget);
        }
        prop_assert_eq!(chunks.concat(), text);
    }

    /// Splitting makes progress even when the budget cannot fit one code
    /// point; every chunk is still valid UTF-8 by construction.
    #[test]
    fn split_tiny_budget_terminates(text in "[\\PC]{0,40}", budget in 1usize..4) {
        let chunks: Vec<&str> = split_message(&text, budget).collect();
        prop_assert_eq!(chunks.concat(), text);
    }

    /// Truncation returns a prefix that fits and never splits a code point.
    #[test]
    fn truncate_is_bounded_prefix(text in body_strategy(), max in 0usize..64) {
        let out = truncate_utf8_safe(&text, max);
        prop_assert!(out.len() <= max);
        prop_assert!(text.starts_with(out));
    }
}

// =============================================================================
// MODE CHANGES
// =============================================================================

proptest! {
    /// Render → parse is the identity on well-formed change lists.
    #[test]
    fn mode_changes_roundtrip(changes in mode_changes_strategy()) {
        let policy = ModePolicy::rfc_defaults();
        let (modes, args) = render_mode_changes(&changes);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let reparsed = parse_mode_changes(&policy, &modes, &arg_refs)
            .expect("rendered change list should reparse");
        prop_assert_eq!(reparsed, changes, "roundtrip failed for: {} {:?}", modes, args);
    }

    /// Parsing never panics, only returns a structured error.
    #[test]
    fn mode_parse_never_panics(
        modes in "[-+a-z0-9]{0,16}",
        args in prop::collection::vec(mode_arg_strategy(), 0..6),
    ) {
        let policy = ModePolicy::rfc_defaults();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let _ = parse_mode_changes(&policy, &modes, &arg_refs);
    }
}

// =============================================================================
// CASE FOLDING
// =============================================================================

proptest! {
    /// An identifier equals its own folded spelling, and folding is
    /// idempotent.
    #[test]
    fn identifier_folding_consistent(nick in nickname_strategy()) {
        let folded = irc_to_lower(&nick);
        prop_assert_eq!(Identifier::new(nick.clone()), Identifier::new(folded.clone()));
        prop_assert_eq!(irc_to_lower(&folded), folded);
    }

    /// Map lookups succeed under any case-variant of the stored key.
    #[test]
    fn identifier_map_key_case_variants(nick in nickname_strategy()) {
        let mut map = std::collections::HashMap::new();
        map.insert(Identifier::new(nick.clone()), ());
        prop_assert!(map.contains_key(&Identifier::new(nick.to_ascii_uppercase())));
        prop_assert!(map.contains_key(&Identifier::new(irc_to_lower(&nick))));
    }
}

// =============================================================================
// DISPATCH ROBUSTNESS
// =============================================================================

proptest! {
    /// Any routed command with arbitrary arguments is either applied or
    /// ignored; the dispatcher must not panic or emit garbage for junk.
    #[test]
    fn dispatch_never_panics(
        command in command_strategy(),
        args in args_strategy(),
        from_user in any::<bool>(),
    ) {
        let now = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut session = Session::new("testnet", "mynick", now);
        session.handle_message(now, &Message::new("JOIN", vec!["#chan".into()]));

        let mut msg = Message::new(command, args);
        if from_user {
            msg = msg.with_source(irc_engine::Source::parse("alice!a@h"));
        }
        let out = session.handle_message(now, &msg);
        for m in &out {
            prop_assert!(!m.command.is_empty());
        }
    }

    /// Message display → parse is the identity for wire-safe messages.
    #[test]
    fn message_display_roundtrip(
        command in "[A-Z]{3,8}",
        middle in prop::collection::vec("[a-zA-Z0-9#*!@.]{1,10}", 0..3),
        trailing in prop::option::of("[a-zA-Z0-9 ]{0,24}"),
    ) {
        let mut args = middle;
        if let Some(t) = trailing {
            args.push(t);
        }
        let msg = Message::new(command, args);
        let reparsed: Message = msg.to_string().parse().expect("should reparse");
        prop_assert_eq!(msg, reparsed);
    }
}
