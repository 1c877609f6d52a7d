//! Mode-change parsing against server-declared mode semantics.
//!
//! A MODE message carries a compact change string (`+ov-b`) plus positional
//! arguments; which letters consume an argument depends on the mode classes
//! the server advertised via ISUPPORT `CHANMODES` and `PREFIX`. Parsing is a
//! pure function of (policy, change string, arguments).

use crate::error::ModeParseError;

/// Which mode letters take arguments, and under which polarity.
///
/// The four letter classes correspond to the comma-separated groups of
/// ISUPPORT `CHANMODES`; `prefix_modes` pairs each membership mode letter
/// with its sigil, highest privilege first, from `PREFIX`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModePolicy {
    /// Type A: mask-list modes (`b`, ...). Argument always consumed here
    /// since a MODE change (as opposed to a query) always names a mask.
    pub list_modes: Vec<char>,
    /// Type B: argument on both set and unset (`k`, ...).
    pub always_arg: Vec<char>,
    /// Type C: argument on set only (`l`, ...).
    pub set_arg: Vec<char>,
    /// Type D: never an argument (`imnpst`, ...).
    pub never_arg: Vec<char>,
    /// Membership modes: (mode letter, sigil), highest privilege first.
    pub prefix_modes: Vec<(char, char)>,
}

impl ModePolicy {
    /// The RFC defaults used until ISUPPORT arrives.
    pub fn rfc_defaults() -> Self {
        ModePolicy {
            list_modes: vec!['b'],
            always_arg: vec!['k'],
            set_arg: vec!['l'],
            never_arg: "imnpst".chars().collect(),
            prefix_modes: vec![('o', '@'), ('v', '+')],
        }
    }

    /// A policy for own user modes: no letter ever takes an argument.
    pub fn user_modes() -> Self {
        ModePolicy {
            list_modes: Vec::new(),
            always_arg: Vec::new(),
            set_arg: Vec::new(),
            never_arg: Vec::new(),
            prefix_modes: Vec::new(),
        }
    }

    /// The sigil for a membership mode letter, if it is one.
    pub fn sigil_for(&self, letter: char) -> Option<char> {
        self.prefix_modes
            .iter()
            .find(|(m, _)| *m == letter)
            .map(|(_, s)| *s)
    }

    /// The sigils in precedence order, highest first.
    pub fn sigils(&self) -> impl Iterator<Item = char> + '_ {
        self.prefix_modes.iter().map(|(_, s)| *s)
    }

    /// Whether this letter names a mask-list mode.
    pub fn is_list_mode(&self, letter: char) -> bool {
        self.list_modes.contains(&letter)
    }

    fn is_prefix_mode(&self, letter: char) -> bool {
        self.prefix_modes.iter().any(|(m, _)| *m == letter)
    }

    /// Whether `letter` consumes a positional argument under the given
    /// polarity. Unknown letters are treated as never-argument, the most
    /// permissive reading, so unsupported extensions do not derail parsing.
    fn takes_arg(&self, letter: char, set: bool) -> bool {
        if self.list_modes.contains(&letter)
            || self.always_arg.contains(&letter)
            || self.is_prefix_mode(letter)
        {
            true
        } else if self.set_arg.contains(&letter) {
            set
        } else {
            false
        }
    }
}

impl Default for ModePolicy {
    fn default() -> Self {
        Self::rfc_defaults()
    }
}

/// One structured mode change: polarity, letter, consumed argument.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeChange {
    /// `true` for `+`, `false` for `-`.
    pub set: bool,
    /// The mode letter.
    pub mode: char,
    /// The consumed argument; empty if the letter takes none.
    pub arg: String,
}

impl ModeChange {
    pub fn plus(mode: char, arg: impl Into<String>) -> Self {
        ModeChange {
            set: true,
            mode,
            arg: arg.into(),
        }
    }

    pub fn minus(mode: char, arg: impl Into<String>) -> Self {
        ModeChange {
            set: false,
            mode,
            arg: arg.into(),
        }
    }
}

/// Parse a mode-change string and its positional arguments into an ordered
/// change list.
///
/// Deterministic and pure. Fails on a letter before any sign, a trailing
/// dangling sign, a missing argument, or leftover arguments.
pub fn parse_mode_changes(
    policy: &ModePolicy,
    modes: &str,
    args: &[&str],
) -> Result<Vec<ModeChange>, ModeParseError> {
    let mut changes = Vec::new();
    let mut args = args.iter().copied().peekable();
    let mut polarity: Option<bool> = None;
    let mut letters_since_sign = true;

    for c in modes.chars() {
        match c {
            '+' => {
                polarity = Some(true);
                letters_since_sign = false;
            }
            '-' => {
                polarity = Some(false);
                letters_since_sign = false;
            }
            letter => {
                let set = polarity.ok_or(ModeParseError::MissingModeModifier { letter })?;
                letters_since_sign = true;
                let arg = if policy.takes_arg(letter, set) {
                    args.next()
                        .ok_or(ModeParseError::MissingModeArgument { mode: letter })?
                        .to_string()
                } else {
                    String::new()
                };
                changes.push(ModeChange {
                    set,
                    mode: letter,
                    arg,
                });
            }
        }
    }

    if !letters_since_sign {
        let modifier = if polarity == Some(true) { '+' } else { '-' };
        return Err(ModeParseError::DanglingModifier { modifier });
    }
    if args.peek().is_some() {
        return Err(ModeParseError::UnusedArguments(args.count()));
    }

    Ok(changes)
}

/// Render a change list back to the normalized `(mode string, arguments)`
/// pair: one sign per polarity run, arguments in consumption order.
pub fn render_mode_changes(changes: &[ModeChange]) -> (String, Vec<String>) {
    let mut modes = String::new();
    let mut args = Vec::new();
    let mut polarity: Option<bool> = None;

    for change in changes {
        if polarity != Some(change.set) {
            modes.push(if change.set { '+' } else { '-' });
            polarity = Some(change.set);
        }
        modes.push(change.mode);
        if !change.arg.is_empty() {
            args.push(change.arg.clone());
        }
    }

    (modes, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_grant() {
        let policy = ModePolicy::rfc_defaults();
        let changes = parse_mode_changes(&policy, "+o", &["alice"]).unwrap();
        assert_eq!(changes, vec![ModeChange::plus('o', "alice")]);
    }

    #[test]
    fn test_mixed_polarity() {
        let policy = ModePolicy::rfc_defaults();
        let changes =
            parse_mode_changes(&policy, "+ov-b", &["alice", "bob", "*!*@spam.example"]).unwrap();
        assert_eq!(
            changes,
            vec![
                ModeChange::plus('o', "alice"),
                ModeChange::plus('v', "bob"),
                ModeChange::minus('b', "*!*@spam.example"),
            ]
        );
    }

    #[test]
    fn test_set_arg_polarity() {
        let policy = ModePolicy::rfc_defaults();
        // +l consumes, -l does not.
        let changes = parse_mode_changes(&policy, "+l", &["50"]).unwrap();
        assert_eq!(changes, vec![ModeChange::plus('l', "50")]);
        let changes = parse_mode_changes(&policy, "-l", &[]).unwrap();
        assert_eq!(changes, vec![ModeChange::minus('l', "")]);
    }

    #[test]
    fn test_always_arg_both_polarities() {
        let policy = ModePolicy::rfc_defaults();
        let changes = parse_mode_changes(&policy, "-k", &["sekrit"]).unwrap();
        assert_eq!(changes, vec![ModeChange::minus('k', "sekrit")]);
    }

    #[test]
    fn test_unknown_letter_is_never_arg() {
        let policy = ModePolicy::rfc_defaults();
        let changes = parse_mode_changes(&policy, "+z", &[]).unwrap();
        assert_eq!(changes, vec![ModeChange::plus('z', "")]);
    }

    #[test]
    fn test_missing_modifier() {
        let policy = ModePolicy::rfc_defaults();
        assert_eq!(
            parse_mode_changes(&policy, "o", &["alice"]),
            Err(ModeParseError::MissingModeModifier { letter: 'o' })
        );
    }

    #[test]
    fn test_dangling_modifier() {
        let policy = ModePolicy::rfc_defaults();
        assert_eq!(
            parse_mode_changes(&policy, "+o-", &["alice"]),
            Err(ModeParseError::DanglingModifier { modifier: '-' })
        );
    }

    #[test]
    fn test_missing_argument() {
        let policy = ModePolicy::rfc_defaults();
        assert_eq!(
            parse_mode_changes(&policy, "+o", &[]),
            Err(ModeParseError::MissingModeArgument { mode: 'o' })
        );
    }

    #[test]
    fn test_leftover_arguments() {
        let policy = ModePolicy::rfc_defaults();
        assert_eq!(
            parse_mode_changes(&policy, "+i", &["stray"]),
            Err(ModeParseError::UnusedArguments(1))
        );
    }

    #[test]
    fn test_empty_mode_string() {
        let policy = ModePolicy::rfc_defaults();
        assert_eq!(parse_mode_changes(&policy, "", &[]).unwrap(), vec![]);
    }

    #[test]
    fn test_render_normalized_round_trip() {
        let policy = ModePolicy::rfc_defaults();
        let changes =
            parse_mode_changes(&policy, "+o+v-b", &["alice", "bob", "*!*@x"]).unwrap();
        let (modes, args) = render_mode_changes(&changes);
        assert_eq!(modes, "+ov-b");
        assert_eq!(args, vec!["alice", "bob", "*!*@x"]);

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let reparsed = parse_mode_changes(&policy, &modes, &arg_refs).unwrap();
        assert_eq!(reparsed, changes);
    }

    #[test]
    fn test_user_mode_policy_takes_no_args() {
        let policy = ModePolicy::user_modes();
        let changes = parse_mode_changes(&policy, "+iw-x", &[]).unwrap();
        assert_eq!(
            changes,
            vec![
                ModeChange::plus('i', ""),
                ModeChange::plus('w', ""),
                ModeChange::minus('x', ""),
            ]
        );
    }
}
