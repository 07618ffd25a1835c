//! Parse-time and access errors.
//!
//! Configuration problems live in [`ConfigError`](crate::ConfigError) next to
//! the validator. Errors raised while scanning tokens carry the switch they
//! concern and an underlying [`OptionError`] cause, so front ends can print
//! either the whole chain or just the switch.

use thiserror::Error;

/// Error type returned by option handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised during the single parse pass.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A `-x` switch (possibly inside a cluster) is not declared.
    #[error("unknown option: -{0}")]
    UnknownShortSwitch(char),
    /// A `--name` switch is not declared.
    #[error("unknown option: --{0}")]
    UnknownLongSwitch(String),
    /// A declared option could not be applied.
    #[error("option {switch}: {cause}")]
    Option {
        /// Spelling of the switch as typed, e.g. `-c` or `--define`.
        switch: String,
        /// What went wrong.
        #[source]
        cause: OptionError,
    },
    /// A positional token appeared but no receiver is declared and the
    /// parser rejects unmatched positionals.
    #[error("unexpected positional argument: {0}")]
    UnexpectedPositional(String),
    /// The parser has already consumed its arguments.
    #[error("arguments have already been parsed")]
    AlreadyParsed,
}

impl ParseError {
    /// Returns the switch an [`Option`](ParseError::Option) error concerns.
    pub fn switch(&self) -> Option<&str> {
        match self {
            Self::Option { switch, .. } => Some(switch),
            _ => None,
        }
    }

    pub(crate) fn option(switch: impl Into<String>, cause: OptionError) -> Self {
        Self::Option {
            switch: switch.into(),
            cause,
        }
    }
}

/// Why a declared option failed to apply.
#[derive(Debug, Error)]
pub enum OptionError {
    /// Fewer tokens remain than the option's arity.
    #[error("expected {expected} argument(s), found {found}")]
    MissingArguments {
        /// Declared arity.
        expected: usize,
        /// Tokens that were left.
        found: usize,
    },
    /// A short option with more than one value is not last in its cluster.
    #[error("takes {arity} arguments and cannot be spliced")]
    SpliceMultiValue {
        /// Declared arity.
        arity: usize,
    },
    /// The option's handler reported a failure.
    #[error(transparent)]
    Handler(HandlerError),
}

/// Misuse of the result accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Results were requested before a parse completed.
    #[error("arguments have not been parsed yet")]
    NotParsed,
    /// The parse stopped at an error; partial results are not exposed.
    #[error("argument parsing failed")]
    ParseFailed,
    /// The switch does not belong to any declared option.
    #[error("no option declared for {0}")]
    UnknownOption(String),
}
