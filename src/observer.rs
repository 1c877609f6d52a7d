//! Observer hook points around the dispatcher.
//!
//! Extension subsystems (message loggers, filters, scripting bridges) see
//! every message before the engine applies it and every command before it is
//! sent. An observer may veto an incoming message, in which case the engine
//! must not apply it. Observers run in registration order; the first veto
//! wins and later observers do not see the message.

use crate::message::Message;

/// An observer's decision about an incoming message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Let the engine apply the message.
    Continue,
    /// Drop the message; the engine must not apply it.
    Drop,
}

/// A hook into the message flow of one session.
pub trait MessageObserver: Send {
    /// Offered each incoming message before it is applied.
    fn on_incoming(&mut self, _msg: &Message) -> Verdict {
        Verdict::Continue
    }

    /// Offered each outgoing message before it is handed to the transport.
    fn on_outgoing(&mut self, _msg: &Message) {}
}

/// An ordered chain of observers.
#[derive(Default)]
pub struct ObserverChain {
    observers: Vec<Box<dyn MessageObserver>>,
}

impl ObserverChain {
    pub fn new() -> Self {
        ObserverChain::default()
    }

    pub fn push(&mut self, observer: Box<dyn MessageObserver>) {
        self.observers.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Offer an incoming message to the chain. The first `Drop` wins.
    pub fn offer_incoming(&mut self, msg: &Message) -> Verdict {
        for obs in &mut self.observers {
            if obs.on_incoming(msg) == Verdict::Drop {
                return Verdict::Drop;
            }
        }
        Verdict::Continue
    }

    /// Let every observer see an outgoing message.
    pub fn offer_outgoing(&mut self, msg: &Message) {
        for obs in &mut self.observers {
            obs.on_outgoing(msg);
        }
    }
}

impl std::fmt::Debug for ObserverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverChain")
            .field("len", &self.observers.len())
            .finish()
    }
}
