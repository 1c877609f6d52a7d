//! The connection state machine.
//!
//! One [`Session`] tracks everything the client knows about one network
//! connection: joined channels, mode semantics, capability negotiation, and
//! liveness. It is sans-IO: [`Session::handle_message`] consumes one parsed
//! message plus its arrival time and returns the messages to send, never
//! blocking and never touching a socket.
//!
//! Transitions are pure with respect to (state, event): the session is an
//! owned value, so feeding a recorded message sequence into a fresh session
//! always produces the same snapshot.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::cap::CapNegotiator;
use crate::casemap::Identifier;
use crate::channel::{ChannelState, MaskEntry};
use crate::isupport::Isupport;
use crate::message::{Message, Source, UserInfo};
use crate::mode::{parse_mode_changes, ModePolicy};
use crate::observer::{MessageObserver, ObserverChain, Verdict};
use crate::ping::{PingTracker, TimedAction};
use crate::response::Response;
use crate::transaction::{MaskFragment, Transaction};
use crate::util::{split_message, MAX_LINE_BODY};

/// Best-known details for a user seen on any joined channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserDetails {
    pub username: Option<String>,
    pub host: Option<String>,
}

/// Session state for one network connection.
pub struct Session {
    /// Which configured network this session belongs to.
    network_id: String,
    /// The local user; nick tracked through NICK changes and 001.
    own: UserInfo,
    /// Channels currently joined, keyed case-folded.
    channels: HashMap<Identifier, ChannelState>,
    /// Channel-prefix characters (ISUPPORT `CHANTYPES`, default `#&`).
    channel_types: Vec<char>,
    /// Mode semantics (ISUPPORT `CHANMODES` + `PREFIX`, RFC defaults first).
    mode_policy: ModePolicy,
    /// Own user modes, in the order the server granted them.
    user_modes: Vec<char>,
    /// Status-message prefix characters (ISUPPORT `STATUSMSG`).
    statusmsg: Vec<char>,
    /// Maximum mode changes per MODE line (ISUPPORT `MODES`).
    mode_arg_limit: usize,
    /// The in-flight multi-line reply burst.
    transaction: Transaction,
    /// Best-known user@host per nick across joined channels.
    user_cache: HashMap<Identifier, UserDetails>,
    /// Liveness tracking.
    ping: PingTracker,
    /// Capability negotiation.
    cap: CapNegotiator,
    /// Commands held until the 001 welcome confirms registration.
    registration_queue: Vec<Message>,
    registered: bool,
    /// Extension observers around the dispatcher.
    observers: ObserverChain,
}

impl Session {
    pub fn new(network_id: impl Into<String>, nick: impl Into<Identifier>, now: DateTime<Utc>) -> Self {
        Self::with_ping(network_id, nick, PingTracker::new(now))
    }

    /// Like [`Session::new`] with an explicit ping cadence.
    pub fn with_ping_cadence(
        network_id: impl Into<String>,
        nick: impl Into<Identifier>,
        now: DateTime<Utc>,
        interval: TimeDelta,
        timeout: TimeDelta,
    ) -> Self {
        Self::with_ping(network_id, nick, PingTracker::with_cadence(now, interval, timeout))
    }

    fn with_ping(
        network_id: impl Into<String>,
        nick: impl Into<Identifier>,
        ping: PingTracker,
    ) -> Self {
        Session {
            network_id: network_id.into(),
            own: UserInfo::from_nick(nick),
            channels: HashMap::new(),
            channel_types: vec!['#', '&'],
            mode_policy: ModePolicy::rfc_defaults(),
            user_modes: Vec::new(),
            statusmsg: vec!['@', '+'],
            mode_arg_limit: 3,
            transaction: Transaction::None,
            user_cache: HashMap::new(),
            ping,
            cap: CapNegotiator::new(),
            registration_queue: Vec::new(),
            registered: false,
            observers: ObserverChain::new(),
        }
    }

    // --- accessors ---

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn own_user(&self) -> &UserInfo {
        &self.own
    }

    pub fn nick(&self) -> &Identifier {
        &self.own.nick
    }

    pub fn channels(&self) -> impl Iterator<Item = (&Identifier, &ChannelState)> {
        self.channels.iter()
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelState> {
        self.channels.get(&Identifier::new(name))
    }

    pub fn user_modes(&self) -> &[char] {
        &self.user_modes
    }

    pub fn mode_policy(&self) -> &ModePolicy {
        &self.mode_policy
    }

    pub fn channel_types(&self) -> &[char] {
        &self.channel_types
    }

    pub fn statusmsg(&self) -> &[char] {
        &self.statusmsg
    }

    pub fn mode_arg_limit(&self) -> usize {
        self.mode_arg_limit
    }

    pub fn user_details(&self, nick: &str) -> Option<&UserDetails> {
        self.user_cache.get(&Identifier::new(nick))
    }

    pub fn cap(&self) -> &CapNegotiator {
        &self.cap
    }

    pub fn ping(&self) -> &PingTracker {
        &self.ping
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Whether `target` names a channel under the advertised CHANTYPES.
    pub fn is_channel_name(&self, target: &str) -> bool {
        target
            .chars()
            .next()
            .map(|c| self.channel_types.contains(&c))
            .unwrap_or(false)
    }

    /// Register an extension observer at the end of the chain.
    pub fn add_observer(&mut self, observer: Box<dyn MessageObserver>) {
        self.observers.push(observer);
    }

    // --- connection lifecycle ---

    /// Begin capability negotiation. Returns the opening messages to send.
    pub fn start(&mut self) -> Vec<Message> {
        let out = self.cap.start();
        self.emit(out)
    }

    /// Hold a command until registration completes (001). If the session is
    /// already registered the command is returned for immediate sending.
    pub fn queue_on_register(&mut self, msg: Message) -> Vec<Message> {
        if self.registered {
            self.emit(vec![msg])
        } else {
            self.registration_queue.push(msg);
            Vec::new()
        }
    }

    /// Hold a moderation command (kick, ban, ...) for `channel` until the
    /// local user has op there; if already op it is returned immediately.
    pub fn queue_moderation(&mut self, channel: &str, msg: Message) -> Vec<Message> {
        let op_sigil = self.mode_policy.sigil_for('o');
        let own = self.own.nick.clone();
        let Some(chan) = self.channels.get_mut(&Identifier::new(channel)) else {
            debug!(channel, "moderation for unjoined channel dropped");
            return Vec::new();
        };
        let is_op = op_sigil.map(|s| chan.has_sigil(&own, s)).unwrap_or(false);
        if is_op {
            self.emit(vec![msg])
        } else {
            chan.queue_moderation(msg);
            Vec::new()
        }
    }

    // --- timers ---

    /// The next deadline and what to do when it passes.
    pub fn next_timed_action(&self) -> Option<(DateTime<Utc>, TimedAction)> {
        self.ping.next_timed_action()
    }

    /// Apply a fired timed action. `SendPing` emits a PING and arms the
    /// pong deadline; `Disconnect` is the caller's to act on and produces
    /// nothing here.
    pub fn on_timed_action(&mut self, now: DateTime<Utc>, action: TimedAction) -> Vec<Message> {
        match action {
            TimedAction::SendPing => {
                self.ping.record_ping_sent(now);
                let token = now.timestamp().to_string();
                self.emit(vec![Message::ping(token)])
            }
            TimedAction::Disconnect => Vec::new(),
        }
    }

    // --- outgoing construction ---

    /// Build PRIVMSG lines for `text`, split so every line fits the
    /// 512-byte limit as echoed back with our full `nick!user@host` prefix.
    pub fn privmsg(&mut self, target: &str, text: &str) -> Vec<Message> {
        self.split_bodied("PRIVMSG", target, text)
    }

    /// NOTICE counterpart of [`Session::privmsg`].
    pub fn notice(&mut self, target: &str, text: &str) -> Vec<Message> {
        self.split_bodied("NOTICE", target, text)
    }

    fn split_bodied(&mut self, command: &str, target: &str, text: &str) -> Vec<Message> {
        let budget = self.split_budget(command, target);
        let msgs = split_message(text, budget)
            .map(|chunk| Message::new(command, vec![target.to_string(), chunk.to_string()]))
            .collect();
        self.emit(msgs)
    }

    /// Bytes of body that fit one line: 510 minus the relayed
    /// `:nick!user@host CMD target :` overhead.
    fn split_budget(&self, command: &str, target: &str) -> usize {
        let overhead = 1 + self.own.to_prefix_string().len() // ':' prefix
            + 1 + command.len()
            + 1 + target.len()
            + 2; // " :"
        MAX_LINE_BODY.saturating_sub(overhead).max(1)
    }

    // --- incoming dispatch ---

    /// Apply one incoming message, returning the messages to send.
    ///
    /// `when` is the arrival (or server-attached) time; it stamps topic
    /// provenance, mask-list entries, and the ping round trip.
    pub fn handle_message(&mut self, when: DateTime<Utc>, msg: &Message) -> Vec<Message> {
        if self.observers.offer_incoming(msg) == Verdict::Drop {
            debug!(command = %msg.command, "observer vetoed incoming message");
            return Vec::new();
        }

        let out = self.dispatch(when, msg);
        self.emit(out)
    }

    /// Run outgoing messages past the observer chain.
    fn emit(&mut self, out: Vec<Message>) -> Vec<Message> {
        for msg in &out {
            self.observers.offer_outgoing(msg);
        }
        out
    }

    fn dispatch(&mut self, when: DateTime<Utc>, msg: &Message) -> Vec<Message> {
        match msg.command.as_str() {
            "PING" => vec![Message::pong(msg.args.clone())],
            "PONG" => {
                self.ping.record_pong(when);
                Vec::new()
            }
            "JOIN" => self.on_join(msg),
            "PART" => self.on_part(msg),
            "QUIT" => self.on_quit(msg),
            "NICK" => self.on_nick(msg),
            "KICK" => self.on_kick(msg),
            "MODE" => self.on_mode(when, msg),
            "TOPIC" => self.on_topic(when, msg),
            "CAP" => self.on_cap(msg),
            _ => match msg.response() {
                Some(code) => self.on_numeric(when, code, msg),
                None => Vec::new(),
            },
        }
    }

    fn on_join(&mut self, msg: &Message) -> Vec<Message> {
        let Some(user) = msg.source.as_ref().and_then(Source::user).cloned() else {
            return Vec::new();
        };
        let Some(channel) = msg.arg(0) else {
            return Vec::new();
        };
        let chan_id = Identifier::new(channel);

        self.remember_user(&user);

        if user.nick == self.own.nick {
            // First reliable source of our own user@host as others see it.
            if user.username.is_some() {
                self.own.username = user.username.clone();
            }
            if user.host.is_some() {
                self.own.host = user.host.clone();
            }
            self.channels.entry(chan_id.clone()).or_insert_with(ChannelState::new);
        }
        if let Some(chan) = self.channels.get_mut(&chan_id) {
            chan.join(user.nick);
        }
        Vec::new()
    }

    fn on_part(&mut self, msg: &Message) -> Vec<Message> {
        let Some(nick) = msg.source_nick().cloned() else {
            return Vec::new();
        };
        let Some(channel) = msg.arg(0) else {
            return Vec::new();
        };
        let chan_id = Identifier::new(channel);

        if nick == self.own.nick {
            self.drop_channel(&chan_id);
        } else if let Some(chan) = self.channels.get_mut(&chan_id) {
            chan.part(&nick);
            self.forget_if_orphaned(&nick);
        }
        Vec::new()
    }

    fn on_quit(&mut self, msg: &Message) -> Vec<Message> {
        let Some(nick) = msg.source_nick().cloned() else {
            return Vec::new();
        };
        self.user_cache.remove(&nick);
        for chan in self.channels.values_mut() {
            chan.part(&nick);
        }
        Vec::new()
    }

    fn on_nick(&mut self, msg: &Message) -> Vec<Message> {
        let Some(old) = msg.source_nick().cloned() else {
            return Vec::new();
        };
        let Some(new) = msg.arg(0) else {
            return Vec::new();
        };
        let new_id = Identifier::new(new);

        if let Some(details) = self.user_cache.remove(&old) {
            self.user_cache.insert(new_id.clone(), details);
        }
        for chan in self.channels.values_mut() {
            chan.rename(&old, new_id.clone());
        }
        if old == self.own.nick {
            self.own.nick = new_id;
        }
        Vec::new()
    }

    fn on_kick(&mut self, msg: &Message) -> Vec<Message> {
        let (Some(channel), Some(nick)) = (msg.arg(0), msg.arg(1)) else {
            return Vec::new();
        };
        let chan_id = Identifier::new(channel);
        let nick = Identifier::new(nick);

        if nick == self.own.nick {
            self.drop_channel(&chan_id);
        } else if let Some(chan) = self.channels.get_mut(&chan_id) {
            chan.part(&nick);
            self.forget_if_orphaned(&nick);
        }
        Vec::new()
    }

    fn on_topic(&mut self, when: DateTime<Utc>, msg: &Message) -> Vec<Message> {
        let (Some(channel), Some(text)) = (msg.arg(0), msg.arg(1)) else {
            return Vec::new();
        };
        let author = msg
            .source
            .as_ref()
            .and_then(Source::user)
            .cloned()
            .unwrap_or_else(|| UserInfo::from_nick("*"));
        if let Some(chan) = self.channels.get_mut(&Identifier::new(channel)) {
            chan.set_topic(text);
            chan.set_topic_provenance(author, when);
        }
        Vec::new()
    }

    fn on_cap(&mut self, msg: &Message) -> Vec<Message> {
        // `CAP <target> <subcommand> [args...]`; target is our nick or `*`.
        let Some(subcommand) = msg.arg(1) else {
            return Vec::new();
        };
        let rest: Vec<&str> = msg.args[2..].iter().map(String::as_str).collect();
        self.cap.handle(subcommand, &rest)
    }

    fn on_mode(&mut self, when: DateTime<Utc>, msg: &Message) -> Vec<Message> {
        let (Some(target), Some(mode_str)) = (msg.arg(0), msg.arg(1)) else {
            return Vec::new();
        };
        let args: Vec<&str> = msg.args[2..].iter().map(String::as_str).collect();

        if Identifier::new(target) == self.own.nick {
            self.apply_user_modes(mode_str, &args);
            return Vec::new();
        }

        let setter = msg
            .source
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_default();
        let chan_id = Identifier::new(target);
        if self.channels.contains_key(&chan_id) {
            self.apply_channel_modes(&chan_id, &setter, mode_str, &args, when, true)
        } else {
            // MODE for a channel we are not on (or an unknown target).
            Vec::new()
        }
    }

    fn apply_user_modes(&mut self, mode_str: &str, args: &[&str]) {
        let policy = ModePolicy::user_modes();
        let changes = match parse_mode_changes(&policy, mode_str, args) {
            Ok(c) => c,
            Err(err) => {
                warn!(%err, mode_str, "malformed user MODE ignored");
                return;
            }
        };
        for change in changes {
            if change.set {
                if !self.user_modes.contains(&change.mode) {
                    self.user_modes.push(change.mode);
                }
            } else {
                self.user_modes.retain(|&m| m != change.mode);
            }
        }
    }

    /// Apply a channel mode change list. `live` distinguishes a real MODE
    /// message from a CHANNELMODEIS resync; only the former may trigger the
    /// op-grant moderation flush.
    fn apply_channel_modes(
        &mut self,
        chan_id: &Identifier,
        setter: &str,
        mode_str: &str,
        args: &[&str],
        when: DateTime<Utc>,
        live: bool,
    ) -> Vec<Message> {
        let changes = match parse_mode_changes(&self.mode_policy, mode_str, args) {
            Ok(c) => c,
            Err(err) => {
                warn!(%err, channel = %chan_id, mode_str, "malformed channel MODE ignored");
                return Vec::new();
            }
        };

        let precedence: Vec<char> = self.mode_policy.sigils().collect();
        let own = self.own.nick.clone();
        let mut flush = false;

        {
            let Some(chan) = self.channels.get_mut(chan_id) else {
                return Vec::new();
            };
            for change in &changes {
                if let Some(sigil) = self.mode_policy.sigil_for(change.mode) {
                    let nick = Identifier::new(change.arg.as_str());
                    if change.set {
                        chan.grant_sigil(&nick, sigil, &precedence);
                        if live && change.mode == 'o' && nick == own {
                            flush = true;
                        }
                    } else {
                        chan.revoke_sigil(&nick, sigil);
                    }
                } else if self.mode_policy.is_list_mode(change.mode) {
                    if change.set {
                        chan.add_mask(
                            change.mode,
                            change.arg.clone(),
                            MaskEntry {
                                set_by: setter.to_string(),
                                set_at: Some(when),
                            },
                        );
                    } else {
                        chan.remove_mask(change.mode, &change.arg);
                    }
                } else if change.set {
                    chan.modes.insert(change.mode, change.arg.clone());
                } else {
                    chan.modes.remove(&change.mode);
                }
            }
        }

        if flush {
            let drained = self
                .channels
                .get_mut(chan_id)
                .map(ChannelState::drain_moderation)
                .unwrap_or_default();
            drained
        } else {
            Vec::new()
        }
    }

    fn on_numeric(&mut self, when: DateTime<Utc>, code: Response, msg: &Message) -> Vec<Message> {
        use Response::*;
        match code {
            RPL_WELCOME => {
                if let Some(nick) = msg.arg(0) {
                    self.own.nick = Identifier::new(nick);
                }
                self.registered = true;
                std::mem::take(&mut self.registration_queue)
            }
            RPL_ISUPPORT => {
                let refs: Vec<&str> = msg.args.iter().map(String::as_str).collect();
                if let Some(isupport) = Isupport::from_reply_args(&refs) {
                    self.apply_isupport(&isupport);
                }
                Vec::new()
            }
            RPL_UMODEIS => {
                if let Some(mode_str) = msg.arg(1) {
                    self.user_modes.clear();
                    self.apply_user_modes(mode_str, &[]);
                }
                Vec::new()
            }
            RPL_NAMREPLY => {
                // `<me> <symbol> <channel> :<names>`
                if let Some(names) = msg.arg(3) {
                    self.transaction.push_name(names);
                }
                Vec::new()
            }
            RPL_ENDOFNAMES => {
                if let Some(channel) = msg.arg(1) {
                    self.commit_names(channel);
                }
                Vec::new()
            }
            RPL_WHOREPLY => {
                // `<me> <chan> <user> <host> <server> <nick> ...`
                if let (Some(user), Some(host), Some(nick)) =
                    (msg.arg(2), msg.arg(3), msg.arg(5))
                {
                    self.transaction.push_who(UserInfo {
                        nick: Identifier::new(nick),
                        username: Some(user.to_string()),
                        host: Some(host.to_string()),
                    });
                }
                Vec::new()
            }
            RPL_ENDOFWHO => {
                self.commit_who();
                Vec::new()
            }
            RPL_BANLIST => self.push_mask_reply(msg, 2),
            RPL_ENDOFBANLIST => self.commit_mask_reply(msg, 'b'),
            RPL_QUIETLIST => self.push_mask_reply(msg, 3),
            RPL_ENDOFQUIETLIST => self.commit_mask_reply(msg, 'q'),
            RPL_INVITELIST => self.push_mask_reply(msg, 2),
            RPL_ENDOFINVITELIST => self.commit_mask_reply(msg, 'I'),
            RPL_EXCEPTLIST => self.push_mask_reply(msg, 2),
            RPL_ENDOFEXCEPTLIST => self.commit_mask_reply(msg, 'e'),
            RPL_CHANNELMODEIS => {
                // `<me> <channel> <modes> [args...]`
                let (Some(channel), Some(mode_str)) = (msg.arg(1), msg.arg(2)) else {
                    return Vec::new();
                };
                let chan_id = Identifier::new(channel);
                let args: Vec<&str> = msg.args[3..].iter().map(String::as_str).collect();
                if let Some(chan) = self.channels.get_mut(&chan_id) {
                    chan.modes.clear();
                }
                self.apply_channel_modes(&chan_id, "", mode_str, &args, when, false)
            }
            RPL_CREATIONTIME => {
                if let (Some(channel), Some(secs)) = (msg.arg(1), msg.arg(2)) {
                    if let Some(at) = secs.parse().ok().and_then(|s| DateTime::from_timestamp(s, 0)) {
                        if let Some(chan) = self.channels.get_mut(&Identifier::new(channel)) {
                            chan.creation = Some(at);
                        }
                    }
                }
                Vec::new()
            }
            RPL_NOTOPIC => {
                if let Some(channel) = msg.arg(1) {
                    if let Some(chan) = self.channels.get_mut(&Identifier::new(channel)) {
                        chan.set_topic("");
                        chan.topic_provenance = None;
                    }
                }
                Vec::new()
            }
            RPL_TOPIC => {
                if let (Some(channel), Some(text)) = (msg.arg(1), msg.arg(2)) {
                    if let Some(chan) = self.channels.get_mut(&Identifier::new(channel)) {
                        chan.set_topic(text);
                    }
                }
                Vec::new()
            }
            RPL_TOPICWHOTIME => {
                // `<me> <channel> <who> <unix time>`
                if let (Some(channel), Some(who), Some(secs)) =
                    (msg.arg(1), msg.arg(2), msg.arg(3))
                {
                    let author = UserInfo::parse(who);
                    let at = secs
                        .parse()
                        .ok()
                        .and_then(|s| DateTime::from_timestamp(s, 0))
                        .unwrap_or(when);
                    if let Some(chan) = self.channels.get_mut(&Identifier::new(channel)) {
                        chan.set_topic_provenance(author, at);
                    }
                }
                Vec::new()
            }
        }
    }

    fn apply_isupport(&mut self, isupport: &Isupport<'_>) {
        if let Some(types) = isupport.chantypes() {
            self.channel_types = types.chars().collect();
        }
        if let Some(prefixes) = isupport.statusmsg() {
            self.statusmsg = prefixes.chars().collect();
        }
        if let Some(limit) = isupport.modes_limit() {
            self.mode_arg_limit = limit;
        }
        isupport.apply_to_policy(&mut self.mode_policy);
    }

    /// Accumulate one mask-list reply line. `mask_idx` is the argument index
    /// of the mask (the quiet-list numeric carries an extra mode-letter
    /// argument before it).
    fn push_mask_reply(&mut self, msg: &Message, mask_idx: usize) -> Vec<Message> {
        let Some(mask) = msg.arg(mask_idx) else {
            return Vec::new();
        };
        let set_by = msg.arg(mask_idx + 1).unwrap_or("").to_string();
        let set_at = msg
            .arg(mask_idx + 2)
            .and_then(|s| s.parse().ok())
            .and_then(|s| DateTime::from_timestamp(s, 0));
        self.transaction.push_mask(MaskFragment {
            mask: mask.to_string(),
            set_by,
            set_at,
        });
        Vec::new()
    }

    /// Commit the accumulated mask list into the channel named by the
    /// terminator, under `letter`.
    fn commit_mask_reply(&mut self, msg: &Message, letter: char) -> Vec<Message> {
        let fragments = self.transaction.commit_masks();
        let Some(channel) = msg.arg(1) else {
            return Vec::new();
        };
        if let Some(chan) = self.channels.get_mut(&Identifier::new(channel)) {
            let list = chan.mask_lists.entry(letter).or_default();
            list.clear();
            for frag in fragments {
                list.insert(
                    frag.mask,
                    MaskEntry {
                        set_by: frag.set_by,
                        set_at: frag.set_at,
                    },
                );
            }
        }
        Vec::new()
    }

    /// Commit a NAMES burst: authoritative membership resync for `channel`.
    fn commit_names(&mut self, channel: &str) {
        let fragments = self.transaction.commit_names();
        let sigil_set: Vec<char> = self.mode_policy.sigils().collect();
        let Some(chan) = self.channels.get_mut(&Identifier::new(channel)) else {
            return;
        };

        let mut members = HashMap::new();
        for fragment in &fragments {
            for token in fragment.split_whitespace() {
                let sigils: String = token
                    .chars()
                    .take_while(|c| sigil_set.contains(c))
                    .collect();
                let nick = &token[sigils.len()..];
                if nick.is_empty() {
                    continue;
                }
                members.insert(Identifier::new(nick), sigils);
            }
        }
        chan.members = members;
    }

    /// Commit a WHO burst into the user cache, keeping only users still on
    /// some joined channel.
    fn commit_who(&mut self) {
        let users = self.transaction.commit_who();
        for user in users {
            let on_some_channel = self
                .channels
                .values()
                .any(|chan| chan.is_member(&user.nick));
            if on_some_channel {
                self.user_cache.insert(
                    user.nick.clone(),
                    UserDetails {
                        username: user.username,
                        host: user.host,
                    },
                );
            }
        }
    }

    fn remember_user(&mut self, user: &UserInfo) {
        let entry = self.user_cache.entry(user.nick.clone()).or_default();
        if user.username.is_some() {
            entry.username = user.username.clone();
        }
        if user.host.is_some() {
            entry.host = user.host.clone();
        }
    }

    /// Delete a channel on self-PART/KICK, then drop its members from the
    /// user cache unless another joined channel still references them.
    fn drop_channel(&mut self, chan_id: &Identifier) {
        if let Some(chan) = self.channels.remove(chan_id) {
            for nick in chan.members.keys() {
                self.forget_if_orphaned(nick);
            }
        }
    }

    /// Drop a user from the cache once no joined channel references them.
    fn forget_if_orphaned(&mut self, nick: &Identifier) {
        let referenced = self.channels.values().any(|chan| chan.is_member(nick));
        if !referenced {
            self.user_cache.remove(nick);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("network_id", &self.network_id)
            .field("nick", &self.own.nick)
            .field("channels", &self.channels.len())
            .field("registered", &self.registered)
            .finish_non_exhaustive()
    }
}
