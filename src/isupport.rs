//! ISUPPORT (RPL_ISUPPORT, numeric 005) parsing.
//!
//! Each parameter between the client nick and the trailing human-readable
//! text is a `KEY` or `KEY=VALUE` token. The engine recognizes the tokens
//! that change mode semantics and message routing; unknown keys are ignored.

use crate::mode::ModePolicy;

/// One `KEY` or `KEY=VALUE` token from an ISUPPORT line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

/// The parsed tokens of one ISUPPORT reply line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    /// Parse raw `KEY[=VALUE]` tokens.
    pub fn parse_params(params: &[&'a str]) -> Self {
        let mut entries = Vec::with_capacity(params.len());
        for &p in params {
            if p.is_empty() {
                continue;
            }
            let (key, value) = match p.find('=') {
                Some(eq) => (&p[..eq], Some(&p[eq + 1..])),
                None => (p, None),
            };
            entries.push(IsupportEntry { key, value });
        }
        Isupport { entries }
    }

    /// Parse the arguments of a numeric 005 reply.
    ///
    /// The first argument is the client nick and the last is the trailing
    /// "are supported by this server" text; both are excluded.
    pub fn from_reply_args(args: &[&'a str]) -> Option<Self> {
        if args.len() < 2 {
            return None;
        }
        Some(Self::parse_params(&args[1..args.len() - 1]))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    /// Value for `key`, if advertised. Outer `None` means the key was
    /// absent; inner `None` means it appeared without a value.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .rfind(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }

    pub fn chantypes(&self) -> Option<&'a str> {
        self.get("CHANTYPES").flatten()
    }

    pub fn statusmsg(&self) -> Option<&'a str> {
        self.get("STATUSMSG").flatten()
    }

    /// `MODES=<n>`: maximum mode changes per MODE line.
    pub fn modes_limit(&self) -> Option<usize> {
        self.get("MODES").flatten().and_then(|v| v.parse().ok())
    }

    pub fn prefix(&self) -> Option<PrefixSpec<'a>> {
        self.get("PREFIX").flatten().and_then(PrefixSpec::parse)
    }

    pub fn chanmodes(&self) -> Option<ChanModes<'a>> {
        self.get("CHANMODES").flatten().and_then(ChanModes::parse)
    }

    /// Fold the recognized tokens of this line into `policy`, leaving
    /// anything the line did not mention untouched.
    pub fn apply_to_policy(&self, policy: &mut ModePolicy) {
        if let Some(cm) = self.chanmodes() {
            policy.list_modes = cm.list.chars().collect();
            policy.always_arg = cm.always_arg.chars().collect();
            policy.set_arg = cm.set_arg.chars().collect();
            policy.never_arg = cm.never_arg.chars().collect();
        }
        if let Some(pf) = self.prefix() {
            policy.prefix_modes = pf.pairs().collect();
        }
    }
}

/// `PREFIX=(ov)@+`: membership mode letters zipped with their sigils.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    pub modes: &'a str,
    pub sigils: &'a str,
}

impl<'a> PrefixSpec<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        let rest = s.strip_prefix('(')?;
        let close = rest.find(')')?;
        let modes = &rest[..close];
        let sigils = &rest[close + 1..];
        if modes.is_empty() || sigils.is_empty() {
            return None;
        }
        Some(PrefixSpec { modes, sigils })
    }

    /// (letter, sigil) pairs, positionally zipped, highest privilege first.
    pub fn pairs(&self) -> impl Iterator<Item = (char, char)> + 'a {
        self.modes.chars().zip(self.sigils.chars())
    }
}

/// `CHANMODES=b,k,l,imnpst`: the four mode-letter groups in fixed order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChanModes<'a> {
    /// Group A: mask-list modes.
    pub list: &'a str,
    /// Group B: argument on set and unset.
    pub always_arg: &'a str,
    /// Group C: argument on set only.
    pub set_arg: &'a str,
    /// Group D: never an argument.
    pub never_arg: &'a str,
}

impl<'a> ChanModes<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        let mut groups = s.splitn(4, ',');
        Some(ChanModes {
            list: groups.next()?,
            always_arg: groups.next()?,
            set_arg: groups.next()?,
            never_arg: groups.next()?,
        })
    }
}
