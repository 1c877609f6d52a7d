//! Per-channel session state.
//!
//! One [`ChannelState`] exists for each channel the local user is joined to.
//! All operations are total: callers decide what to do about missing members
//! (the dispatcher no-ops), so nothing here can fail.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::casemap::Identifier;
use crate::message::{Message, UserInfo};

/// Who set a mask-list entry, and when.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskEntry {
    /// The setter as reported by the server (nick or full prefix).
    pub set_by: String,
    /// Set time, when the server reported one.
    pub set_at: Option<DateTime<Utc>>,
}

/// Topic author and time. Arrives separately from the topic text
/// (numeric 333 vs 332), so it is a separate write.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicProvenance {
    pub author: UserInfo,
    pub at: DateTime<Utc>,
}

/// Everything the engine tracks about one joined channel.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelState {
    /// Current topic text; empty when unset.
    pub topic: String,
    /// Who set the topic and when, if known.
    pub topic_provenance: Option<TopicProvenance>,
    /// Members and their sigils, highest privilege first.
    pub members: HashMap<Identifier, String>,
    /// Single-setting channel modes: letter to argument (empty if none).
    pub modes: HashMap<char, String>,
    /// Mask lists keyed by the list mode letter (`b`, `q`, `I`, `e`).
    pub mask_lists: HashMap<char, HashMap<String, MaskEntry>>,
    /// Channel creation time (numeric 329), if reported.
    pub creation: Option<DateTime<Utc>>,
    /// Outgoing messages held back until the local user gains op.
    pub queued_moderation: Vec<Message>,
}

impl ChannelState {
    pub fn new() -> Self {
        ChannelState::default()
    }

    /// Record `nick` as a member with no sigils. No-op if already present,
    /// preserving any sigils they hold.
    pub fn join(&mut self, nick: Identifier) {
        self.members.entry(nick).or_default();
    }

    /// Remove `nick` from the membership. No-op if absent.
    pub fn part(&mut self, nick: &Identifier) {
        self.members.remove(nick);
    }

    /// Move a member's sigil set from `old` to `new`. No-op if `old` is not
    /// a member.
    pub fn rename(&mut self, old: &Identifier, new: Identifier) {
        if let Some(sigils) = self.members.remove(old) {
            self.members.insert(new, sigils);
        }
    }

    pub fn is_member(&self, nick: &Identifier) -> bool {
        self.members.contains_key(nick)
    }

    /// Replace the topic text only; provenance is written separately.
    pub fn set_topic(&mut self, text: impl Into<String>) {
        self.topic = text.into();
    }

    pub fn set_topic_provenance(&mut self, author: UserInfo, at: DateTime<Utc>) {
        self.topic_provenance = Some(TopicProvenance { author, at });
    }

    /// Give `nick` the sigil, inserted at its precedence position. No-op if
    /// `nick` is not a member or already holds the sigil. `precedence` is
    /// the full sigil order, highest privilege first.
    pub fn grant_sigil(&mut self, nick: &Identifier, sigil: char, precedence: &[char]) {
        let Some(sigils) = self.members.get_mut(nick) else {
            return;
        };
        if sigils.contains(sigil) {
            return;
        }
        let rank = |s: char| precedence.iter().position(|&p| p == s);
        let new_rank = rank(sigil);
        let at = sigils
            .char_indices()
            .find(|&(_, held)| rank(held) > new_rank)
            .map(|(i, _)| i)
            .unwrap_or(sigils.len());
        sigils.insert(at, sigil);
    }

    /// Take the sigil away from `nick`. No-op if absent.
    pub fn revoke_sigil(&mut self, nick: &Identifier, sigil: char) {
        if let Some(sigils) = self.members.get_mut(nick) {
            *sigils = sigils.chars().filter(|&c| c != sigil).collect();
        }
    }

    /// Whether `nick` holds `sigil`.
    pub fn has_sigil(&self, nick: &Identifier, sigil: char) -> bool {
        self.members
            .get(nick)
            .map(|s| s.contains(sigil))
            .unwrap_or(false)
    }

    /// Add or overwrite a mask under the list mode `letter`.
    pub fn add_mask(&mut self, letter: char, mask: impl Into<String>, entry: MaskEntry) {
        self.mask_lists
            .entry(letter)
            .or_default()
            .insert(mask.into(), entry);
    }

    /// Remove a mask from the list mode `letter`. No-op if absent.
    pub fn remove_mask(&mut self, letter: char, mask: &str) {
        if let Some(list) = self.mask_lists.get_mut(&letter) {
            list.remove(mask);
        }
    }

    /// Hold back an outgoing message until the local user gains op.
    pub fn queue_moderation(&mut self, msg: Message) {
        self.queued_moderation.push(msg);
    }

    /// Drain the moderation queue for sending.
    pub fn drain_moderation(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.queued_moderation)
    }
}
