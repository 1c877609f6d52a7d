//! IRC numeric reply codes the session engine routes.
//!
//! Servers answer commands with three-digit numerics. The engine only needs
//! the ones that carry session state; everything else falls through the
//! dispatcher untouched.

#![allow(non_camel_case_types)]

/// Numeric reply codes with session-state meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    /// 001 - Welcome; confirms the registered nick.
    RPL_WELCOME = 1,
    /// 005 - ISUPPORT parameter advertisement.
    RPL_ISUPPORT = 5,
    /// 221 - Own user mode string.
    RPL_UMODEIS = 221,
    /// 315 - End of WHO list.
    RPL_ENDOFWHO = 315,
    /// 324 - Channel mode is.
    RPL_CHANNELMODEIS = 324,
    /// 329 - Channel creation time.
    RPL_CREATIONTIME = 329,
    /// 331 - No topic is set.
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic.
    RPL_TOPIC = 332,
    /// 333 - Topic author and time.
    RPL_TOPICWHOTIME = 333,
    /// 346 - Invite-exception list entry.
    RPL_INVITELIST = 346,
    /// 347 - End of invite-exception list.
    RPL_ENDOFINVITELIST = 347,
    /// 348 - Ban-exception list entry.
    RPL_EXCEPTLIST = 348,
    /// 349 - End of ban-exception list.
    RPL_ENDOFEXCEPTLIST = 349,
    /// 352 - WHO reply line.
    RPL_WHOREPLY = 352,
    /// 353 - NAMES reply fragment.
    RPL_NAMREPLY = 353,
    /// 366 - End of NAMES.
    RPL_ENDOFNAMES = 366,
    /// 367 - Ban list entry.
    RPL_BANLIST = 367,
    /// 368 - End of ban list.
    RPL_ENDOFBANLIST = 368,
    /// 728 - Quiet list entry.
    RPL_QUIETLIST = 728,
    /// 729 - End of quiet list.
    RPL_ENDOFQUIETLIST = 729,
}

impl Response {
    /// Look up a numeric code. Unrecognized codes yield `None` and the
    /// dispatcher ignores the reply.
    pub fn from_code(code: u16) -> Option<Response> {
        use Response::*;
        Some(match code {
            1 => RPL_WELCOME,
            5 => RPL_ISUPPORT,
            221 => RPL_UMODEIS,
            315 => RPL_ENDOFWHO,
            324 => RPL_CHANNELMODEIS,
            329 => RPL_CREATIONTIME,
            331 => RPL_NOTOPIC,
            332 => RPL_TOPIC,
            333 => RPL_TOPICWHOTIME,
            346 => RPL_INVITELIST,
            347 => RPL_ENDOFINVITELIST,
            348 => RPL_EXCEPTLIST,
            349 => RPL_ENDOFEXCEPTLIST,
            352 => RPL_WHOREPLY,
            353 => RPL_NAMREPLY,
            366 => RPL_ENDOFNAMES,
            367 => RPL_BANLIST,
            368 => RPL_ENDOFBANLIST,
            728 => RPL_QUIETLIST,
            729 => RPL_ENDOFQUIETLIST,
            _ => return None,
        })
    }

    /// The numeric value of this reply.
    pub fn code(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_round_trip() {
        for code in [1, 5, 221, 315, 324, 329, 331, 332, 333, 352, 353, 366, 367, 368, 728, 729] {
            let resp = Response::from_code(code).unwrap();
            assert_eq!(resp.code(), code);
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(Response::from_code(422), None);
        assert_eq!(Response::from_code(0), None);
    }
}
