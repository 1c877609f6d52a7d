//! The parsed-message boundary type.
//!
//! The engine sits behind a transport that frames and decodes the wire
//! protocol; what crosses the boundary is a [`Message`]: an optional source,
//! a command word, and its arguments. `Display` produces the on-wire form
//! (without CR LF) so the transport can send engine output directly, and a
//! deliberately simple `FromStr` lets tests feed recorded traffic without
//! pulling in a full wire parser.

use std::fmt;
use std::str::FromStr;

use crate::casemap::Identifier;

/// A user parsed from a `nick!user@host` message source.
///
/// Servers frequently omit the `user` and `host` portions, so both are
/// optional; the nick is always present.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserInfo {
    /// Nickname, compared case-folded.
    pub nick: Identifier,
    /// Ident / username, if the server included it.
    pub username: Option<String>,
    /// Hostname, if the server included it.
    pub host: Option<String>,
}

impl UserInfo {
    /// Build a `UserInfo` from a bare nick with no user/host information.
    pub fn from_nick(nick: impl Into<Identifier>) -> Self {
        UserInfo {
            nick: nick.into(),
            username: None,
            host: None,
        }
    }

    /// Parse a `nick!user@host` source string. Missing portions stay `None`.
    pub fn parse(raw: &str) -> Self {
        let (nick_user, host) = match raw.split_once('@') {
            Some((nu, h)) => (nu, Some(h.to_string())),
            None => (raw, None),
        };
        let (nick, username) = match nick_user.split_once('!') {
            Some((n, u)) => (n, Some(u.to_string())),
            None => (nick_user, None),
        };
        UserInfo {
            nick: Identifier::new(nick),
            username,
            host,
        }
    }

    /// Render back to `nick!user@host` form, omitting missing portions.
    pub fn to_prefix_string(&self) -> String {
        let mut s = self.nick.as_str().to_string();
        if let Some(u) = &self.username {
            s.push('!');
            s.push_str(u);
        }
        if let Some(h) = &self.host {
            s.push('@');
            s.push_str(h);
        }
        s
    }
}

/// The origin of a message: either a server name or a user prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Source {
    /// A server name (no `!` or `@` present).
    Server(String),
    /// A `nick!user@host` user prefix.
    User(UserInfo),
}

impl Source {
    /// Parse a message prefix (without the leading `:`).
    pub fn parse(raw: &str) -> Self {
        if raw.contains('!') || raw.contains('@') {
            Source::User(UserInfo::parse(raw))
        } else if raw.contains('.') {
            Source::Server(raw.to_string())
        } else {
            // A bare token is most usefully treated as a nick.
            Source::User(UserInfo::parse(raw))
        }
    }

    /// The originating user, if this source is one.
    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            Source::User(u) => Some(u),
            Source::Server(_) => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Server(s) => f.write_str(s),
            Source::User(u) => f.write_str(&u.to_prefix_string()),
        }
    }
}

/// One parsed IRC message: optional source, command word, arguments.
///
/// Numeric replies keep their three-digit command as text (`"005"`); use
/// [`Message::response`] to interpret it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Where the message came from, if the server included a prefix.
    pub source: Option<Source>,
    /// Command word, uppercase by convention (`PRIVMSG`, `005`, ...).
    pub command: String,
    /// Positional arguments, trailing parameter last.
    pub args: Vec<String>,
}

impl Message {
    /// Construct a message with no source.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Message {
            source: None,
            command: command.into(),
            args,
        }
    }

    /// Attach a source prefix.
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    /// The numeric reply code, if the command is a three-digit numeric.
    pub fn response(&self) -> Option<crate::response::Response> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command
                .parse::<u16>()
                .ok()
                .and_then(crate::response::Response::from_code)
        } else {
            None
        }
    }

    /// The nick of the originating user, if any.
    pub fn source_nick(&self) -> Option<&Identifier> {
        self.source.as_ref().and_then(Source::user).map(|u| &u.nick)
    }

    /// Argument at `idx`, as `&str`.
    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }

    // --- constructors for the messages the engine emits ---

    pub fn ping(token: impl Into<String>) -> Self {
        Message::new("PING", vec![token.into()])
    }

    pub fn pong(args: Vec<String>) -> Self {
        Message::new("PONG", args)
    }

    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::new("PRIVMSG", vec![target.into(), text.into()])
    }

    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::new("NOTICE", vec![target.into(), text.into()])
    }

    pub fn cap_ls() -> Self {
        Message::new("CAP", vec!["LS".into(), "302".into()])
    }

    pub fn cap_req(caps: &str) -> Self {
        Message::new("CAP", vec!["REQ".into(), caps.into()])
    }

    pub fn cap_end() -> Self {
        Message::new("CAP", vec!["END".into()])
    }

    pub fn mode(target: impl Into<String>, modes: impl Into<String>, args: Vec<String>) -> Self {
        let mut all = vec![target.into(), modes.into()];
        all.extend(args);
        Message::new("MODE", all)
    }
}

impl fmt::Display for Message {
    /// On-wire form without the trailing CR LF.
    ///
    /// The final argument is written as a trailing parameter (`:`-prefixed)
    /// when it is empty, contains a space, or itself starts with `:`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(src) = &self.source {
            write!(f, ":{} ", src)?;
        }
        f.write_str(&self.command)?;
        if let Some((last, init)) = self.args.split_last() {
            for arg in init {
                write!(f, " {}", arg)?;
            }
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }
        Ok(())
    }
}

/// Parse failure for the test-oriented [`Message`] `FromStr`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("empty message")]
pub struct EmptyMessage;

impl FromStr for Message {
    type Err = EmptyMessage;

    /// Whitespace-splitting parse of one IRC line (no CR LF).
    ///
    /// IRCv3 tag sections are skipped; the engine receives its timestamp out
    /// of band. This is test tooling, not a wire parser.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim_end_matches(['\r', '\n']);

        if let Some(after) = rest.strip_prefix('@') {
            rest = after.split_once(' ').map(|(_, r)| r).unwrap_or("");
        }
        let rest = rest.trim_start();

        let (source, rest) = match rest.strip_prefix(':') {
            Some(after) => {
                let (prefix, r) = after.split_once(' ').unwrap_or((after, ""));
                (Some(Source::parse(prefix)), r)
            }
            None => (None, rest),
        };

        let (head, trailing) = match rest.split_once(" :") {
            Some((h, t)) => (h, Some(t)),
            None => (rest, None),
        };

        let mut words = head.split_ascii_whitespace();
        let command = words.next().ok_or(EmptyMessage)?.to_string();
        let mut args: Vec<String> = words.map(str::to_string).collect();
        if let Some(t) = trailing {
            args.push(t.to_string());
        }

        Ok(Message {
            source,
            command,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefix_message() {
        let msg: Message = ":nick!user@host PRIVMSG #channel :Hello, world!"
            .parse()
            .unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.args, vec!["#channel", "Hello, world!"]);
        let user = msg.source.as_ref().unwrap().user().unwrap();
        assert_eq!(user.nick.as_str(), "nick");
        assert_eq!(user.username.as_deref(), Some("user"));
        assert_eq!(user.host.as_deref(), Some("host"));
    }

    #[test]
    fn test_parse_server_source() {
        let msg: Message = ":irc.example.com 001 me :Welcome".parse().unwrap();
        assert!(matches!(msg.source, Some(Source::Server(_))));
        assert_eq!(msg.command, "001");
        assert_eq!(msg.args, vec!["me", "Welcome"]);
    }

    #[test]
    fn test_parse_skips_tags() {
        let msg: Message = "@time=2023-01-01T00:00:00Z :n!u@h PRIVMSG #c :hi"
            .parse()
            .unwrap();
        assert_eq!(msg.command, "PRIVMSG");
    }

    #[test]
    fn test_display_trailing_rules() {
        assert_eq!(
            Message::privmsg("#c", "two words").to_string(),
            "PRIVMSG #c :two words"
        );
        assert_eq!(Message::privmsg("#c", "one").to_string(), "PRIVMSG #c one");
        assert_eq!(Message::privmsg("#c", "").to_string(), "PRIVMSG #c :");
        assert_eq!(
            Message::privmsg("#c", ":looks-trailing").to_string(),
            "PRIVMSG #c ::looks-trailing"
        );
    }

    #[test]
    fn test_display_round_trip() {
        let original = ":nick!user@host PRIVMSG #channel :Hello, world!";
        let msg: Message = original.parse().unwrap();
        assert_eq!(msg.to_string(), original);
        let reparsed: Message = msg.to_string().parse().unwrap();
        assert_eq!(msg, reparsed);
    }

    #[test]
    fn test_userinfo_partial_prefixes() {
        let u = UserInfo::parse("onlynick");
        assert_eq!(u.nick.as_str(), "onlynick");
        assert!(u.username.is_none() && u.host.is_none());

        let u = UserInfo::parse("nick@host.example");
        assert!(u.username.is_none());
        assert_eq!(u.host.as_deref(), Some("host.example"));
    }

    #[test]
    fn test_empty_line_rejected() {
        assert!("".parse::<Message>().is_err());
        assert!("   ".parse::<Message>().is_err());
    }
}
