//! Accumulator for multi-line reply bursts.
//!
//! NAMES, mask-list enumerations, and WHO all arrive as a run of numbered
//! replies closed by an "end of" terminator; their payload must be gathered
//! across the run and committed atomically on the terminator. Exactly one
//! burst kind is in flight at a time, which the sum type encodes directly.
//!
//! Server interleaving of bursts is a protocol violation, but the engine
//! must never crash on one: an out-of-kind fragment or terminator logs a
//! warning with whatever was displaced and carries on.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::message::UserInfo;

/// One accumulated mask-list line: mask, setter, set time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskFragment {
    pub mask: String,
    pub set_by: String,
    pub set_at: Option<DateTime<Utc>>,
}

/// The in-flight multi-line reply burst, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transaction {
    /// No burst in flight.
    #[default]
    None,
    /// NAMES fragments: the raw name-list text of each 353 line.
    Names(Vec<String>),
    /// Mask-list lines (ban/quiet/invite/except all share this kind).
    MaskList(Vec<MaskFragment>),
    /// WHO reply lines.
    Who(Vec<UserInfo>),
}

impl Transaction {
    fn kind(&self) -> &'static str {
        match self {
            Transaction::None => "none",
            Transaction::Names(_) => "names",
            Transaction::MaskList(_) => "mask-list",
            Transaction::Who(_) => "who",
        }
    }

    fn len(&self) -> usize {
        match self {
            Transaction::None => 0,
            Transaction::Names(v) => v.len(),
            Transaction::MaskList(v) => v.len(),
            Transaction::Who(v) => v.len(),
        }
    }

    /// Discard whatever is accumulated, noisily. Used when a fragment or
    /// terminator of a different kind arrives mid-burst.
    fn displace(&mut self, incoming: &'static str) {
        if !matches!(self, Transaction::None) {
            warn!(
                active = self.kind(),
                incoming,
                dropped = self.len(),
                "transaction kind mismatch; discarding active accumulation"
            );
            *self = Transaction::None;
        }
    }

    /// Append a NAMES fragment, opening a names burst if none is active.
    pub fn push_name(&mut self, fragment: impl Into<String>) {
        match self {
            Transaction::Names(v) => v.push(fragment.into()),
            _ => {
                self.displace("names");
                *self = Transaction::Names(vec![fragment.into()]);
            }
        }
    }

    /// Append a mask-list line, opening a mask-list burst if none is active.
    pub fn push_mask(&mut self, fragment: MaskFragment) {
        match self {
            Transaction::MaskList(v) => v.push(fragment),
            _ => {
                self.displace("mask-list");
                *self = Transaction::MaskList(vec![fragment]);
            }
        }
    }

    /// Append a WHO line, opening a who burst if none is active.
    pub fn push_who(&mut self, user: UserInfo) {
        match self {
            Transaction::Who(v) => v.push(user),
            _ => {
                self.displace("who");
                *self = Transaction::Who(vec![user]);
            }
        }
    }

    /// Commit a names burst: the fragments in arrival order. An empty or
    /// mismatched transaction commits as empty; either way the transaction
    /// resets to `None`.
    pub fn commit_names(&mut self) -> Vec<String> {
        match std::mem::take(self) {
            Transaction::Names(v) => v,
            other => {
                Self::warn_commit("names", &other);
                Vec::new()
            }
        }
    }

    /// Commit a mask-list burst in arrival order.
    pub fn commit_masks(&mut self) -> Vec<MaskFragment> {
        match std::mem::take(self) {
            Transaction::MaskList(v) => v,
            other => {
                Self::warn_commit("mask-list", &other);
                Vec::new()
            }
        }
    }

    /// Commit a who burst in arrival order.
    pub fn commit_who(&mut self) -> Vec<UserInfo> {
        match std::mem::take(self) {
            Transaction::Who(v) => v,
            other => {
                Self::warn_commit("who", &other);
                Vec::new()
            }
        }
    }

    fn warn_commit(expected: &'static str, found: &Transaction) {
        if !matches!(found, Transaction::None) {
            warn!(
                expected,
                active = found.kind(),
                dropped = found.len(),
                "terminator for inactive transaction kind; committing empty"
            );
        }
    }
}
