//! IRCv3 capability negotiation.
//!
//! A small sub-protocol run at connection start: the client asks for the
//! server's capability list, requests the intersection with its own fixed
//! supported set, and closes negotiation regardless of the answer. There is
//! no retry; a NAK simply means running without those extensions.
//!
//! # Reference
//! - IRCv3 Capability Negotiation: <https://ircv3.net/specs/extensions/capability-negotiation>

use tracing::debug;

use crate::message::Message;

/// Capabilities the engine knows how to use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    /// Show all user prefix sigils in NAMES.
    MultiPrefix,
    /// Server-attached timestamps on messages.
    ServerTime,
    /// Anything else a server might offer.
    Custom(String),
}

impl AsRef<str> for Capability {
    fn as_ref(&self) -> &str {
        match self {
            Self::MultiPrefix => "multi-prefix",
            Self::ServerTime => "server-time",
            Self::Custom(s) => s,
        }
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        match s {
            "multi-prefix" => Self::MultiPrefix,
            "server-time" => Self::ServerTime,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// The capabilities this engine requests when offered.
pub const SUPPORTED_CAPS: &[Capability] = &[Capability::MultiPrefix, Capability::ServerTime];

/// Negotiation phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapPhase {
    /// Nothing sent yet.
    #[default]
    Idle,
    /// `CAP LS` sent, waiting for the server's list.
    AwaitingLs,
    /// `CAP REQ` sent, waiting for ACK or NAK.
    AwaitingAck,
    /// `CAP END` sent; negotiation closed.
    Done,
}

/// Drives the CAP LS / REQ / ACK / END exchange.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapNegotiator {
    phase: CapPhase,
    /// Capability names offered across (possibly multi-line) LS replies.
    offered: Vec<String>,
    /// Capabilities the server acknowledged.
    acked: Vec<Capability>,
}

impl CapNegotiator {
    pub fn new() -> Self {
        CapNegotiator::default()
    }

    pub fn phase(&self) -> CapPhase {
        self.phase
    }

    /// Capabilities the server acknowledged, once negotiation is done.
    pub fn acked(&self) -> &[Capability] {
        &self.acked
    }

    /// Kick off negotiation. Emits `CAP LS`.
    pub fn start(&mut self) -> Vec<Message> {
        self.phase = CapPhase::AwaitingLs;
        vec![Message::cap_ls()]
    }

    /// Feed one CAP message's subcommand and arguments (everything after
    /// the client-target argument). Unknown subcommands leave the state
    /// unchanged.
    pub fn handle(&mut self, subcommand: &str, args: &[&str]) -> Vec<Message> {
        match subcommand {
            "LS" => self.on_ls(args),
            "ACK" => self.on_ack(args),
            "NAK" => self.on_nak(args),
            other => {
                debug!(subcommand = other, "ignoring CAP subcommand");
                Vec::new()
            }
        }
    }

    fn on_ls(&mut self, args: &[&str]) -> Vec<Message> {
        if self.phase != CapPhase::AwaitingLs {
            return Vec::new();
        }

        // CAP LS 302 continuation: `CAP * LS * :...` with more lines coming.
        let more = args.first() == Some(&"*");
        let caps = args.last().copied().unwrap_or("");
        self.offered
            .extend(caps.split_whitespace().map(str::to_string));
        if more {
            return Vec::new();
        }

        let wanted: Vec<&str> = SUPPORTED_CAPS
            .iter()
            .map(Capability::as_ref)
            // Offered caps may carry values as `name=value`; match the name.
            .filter(|name| self.offered.iter().any(|o| o.split('=').next() == Some(*name)))
            .collect();

        if wanted.is_empty() {
            self.phase = CapPhase::Done;
            vec![Message::cap_end()]
        } else {
            self.phase = CapPhase::AwaitingAck;
            vec![Message::cap_req(&wanted.join(" "))]
        }
    }

    fn on_ack(&mut self, args: &[&str]) -> Vec<Message> {
        if self.phase != CapPhase::AwaitingAck {
            return Vec::new();
        }
        let caps = args.last().copied().unwrap_or("");
        self.acked
            .extend(caps.split_whitespace().map(Capability::from));
        self.phase = CapPhase::Done;
        vec![Message::cap_end()]
    }

    fn on_nak(&mut self, args: &[&str]) -> Vec<Message> {
        if self.phase != CapPhase::AwaitingAck {
            return Vec::new();
        }
        let caps = args.last().copied().unwrap_or("");
        debug!(rejected = caps, "server rejected capability request");
        self.phase = CapPhase::Done;
        vec![Message::cap_end()]
    }

    /// Whether a capability ended up acknowledged.
    pub fn has(&self, cap: &Capability) -> bool {
        self.acked.contains(cap)
    }
}
