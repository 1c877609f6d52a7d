//! # irc-engine
//!
//! A sans-IO session engine for an interactive IRC client.
//!
//! The engine consumes already-parsed server messages plus a notion of
//! "current time" and produces outgoing messages plus updated session state:
//! channel membership and sigils, channel/user modes, mask lists, topics,
//! capability negotiation, and connection liveness. It performs no I/O and
//! never blocks; the transport owns the socket, framing, and scheduling.
//!
//! ## Features
//!
//! - Mode-change parsing driven by server-declared semantics (ISUPPORT
//!   `CHANMODES` / `PREFIX`), with RFC fallbacks until 005 arrives
//! - Multi-line reply accumulation (NAMES, WHO, ban/quiet/invite/except
//!   lists) committed atomically on the terminating numeric
//! - IRCv3 capability negotiation (`multi-prefix`, `server-time`)
//! - Ping/pong liveness producing "send a ping" / "connection is dead"
//!   decisions from deadlines, not timers
//! - Outgoing PRIVMSG/NOTICE splitting that respects the 512-byte line
//!   limit and UTF-8 code-point boundaries
//! - An observer chain that can veto incoming messages and snoop outgoing
//!   ones, for extension subsystems
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use irc_engine::{Message, Session};
//!
//! let mut session = Session::new("libera", "mynick", Utc::now());
//!
//! // Connection start: capability negotiation opener.
//! for msg in session.start() {
//!     // hand msg.to_string() to the transport
//! }
//!
//! // Feed traffic as the transport decodes it.
//! let join: Message = ":mynick!me@host JOIN #rust".parse().unwrap();
//! let replies = session.handle_message(Utc::now(), &join);
//! assert!(replies.is_empty());
//! assert!(session.channel("#rust").is_some());
//! ```

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cap;
pub mod casemap;
pub mod channel;
pub mod error;
pub mod isupport;
pub mod message;
pub mod mode;
pub mod observer;
pub mod ping;
pub mod response;
pub mod session;
pub mod transaction;
pub mod util;

pub use self::cap::{CapNegotiator, CapPhase, Capability};
pub use self::casemap::{irc_eq, irc_to_lower, Identifier};
pub use self::channel::{ChannelState, MaskEntry, TopicProvenance};
pub use self::error::ModeParseError;
pub use self::isupport::{ChanModes, Isupport, IsupportEntry, PrefixSpec};
pub use self::message::{Message, Source, UserInfo};
pub use self::mode::{parse_mode_changes, render_mode_changes, ModeChange, ModePolicy};
pub use self::observer::{MessageObserver, ObserverChain, Verdict};
pub use self::ping::{PingStatus, PingTracker, TimedAction};
pub use self::response::Response;
pub use self::session::{Session, UserDetails};
pub use self::transaction::{MaskFragment, Transaction};
pub use self::util::{split_message, truncate_utf8_safe, MAX_LINE_BODY};
