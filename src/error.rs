//! Error types for the session engine.
//!
//! The engine recovers locally from almost everything a server can throw at
//! it; the one structured error it surfaces is a malformed mode string,
//! which callers treat as a no-op after logging.

use thiserror::Error;

/// Convenience type alias for Results using [`ModeParseError`].
pub type Result<T, E = ModeParseError> = std::result::Result<T, E>;

/// Errors encountered when parsing a mode-change string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeParseError {
    /// A mode letter appeared before any `+` or `-` modifier.
    #[error("missing mode modifier before '{letter}'")]
    MissingModeModifier {
        /// The letter that lacked a preceding sign.
        letter: char,
    },

    /// The string ended with a `+` or `-` that governs no letters.
    #[error("dangling mode modifier '{modifier}'")]
    DanglingModifier {
        /// The trailing sign character.
        modifier: char,
    },

    /// A mode letter required an argument but none was left to consume.
    #[error("mode '{mode}' requires an argument but none provided")]
    MissingModeArgument {
        /// The mode letter missing its argument.
        mode: char,
    },

    /// More positional arguments were supplied than the modes consumed.
    #[error("unused arguments after mode parsing: {0} left over")]
    UnusedArguments(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModeParseError::MissingModeArgument { mode: 'k' };
        assert_eq!(
            format!("{}", err),
            "mode 'k' requires an argument but none provided"
        );

        let err = ModeParseError::UnusedArguments(2);
        assert_eq!(
            format!("{}", err),
            "unused arguments after mode parsing: 2 left over"
        );
    }
}
