//! Option declaration types.
//!
//! These are the plain, serializable descriptions of what a command line
//! accepts. They carry no behaviour: handlers are attached later through
//! [`OptionSpec`](crate::OptionSpec), and validation happens when the
//! declarations are turned into an [`OptionRegistry`](crate::OptionRegistry).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::{ConfigError, parse_switch};

/// Name used for the positional receiver wherever a switch would be printed.
pub const POSITIONAL_NAME: &str = "<positional>";

/// A validated switch spelling.
///
/// Long names are stored without their leading dashes. [`Display`](fmt::Display)
/// renders the form a user types.
///
/// # Examples
///
/// ```
/// use argdispatch_core::Switch;
///
/// assert_eq!(Switch::parse("-v").unwrap(), Switch::Short('v'));
/// assert_eq!(Switch::parse("--dry-run").unwrap(), Switch::Long("dry-run".into()));
/// assert_eq!(Switch::Long("dry-run".into()).to_string(), "--dry-run");
/// assert!(Switch::parse("--dry-").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Switch {
    /// `-x`
    Short(char),
    /// `--name`
    Long(String),
}

impl Switch {
    /// Parses a user-facing spelling such as `-v` or `--verbose`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the spelling when it is too short or
    /// does not follow the short/long switch grammar.
    pub fn parse(spelling: &str) -> Result<Self, ConfigError> {
        parse_switch(spelling)
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short(c) => write!(f, "-{c}"),
            Self::Long(name) => write!(f, "--{name}"),
        }
    }
}

/// Whether an option keeps only its latest capture or every occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    /// Each occurrence overwrites the previous capture (the default).
    #[default]
    Single,
    /// Every occurrence is kept, in order.
    Multi,
}

/// Index of an option inside its registry, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub usize);

impl OptionId {
    /// Returns the raw declaration index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Declaration of a single option.
///
/// An option is either reached through one or more switch spellings (all
/// aliases of each other) or is the positional receiver, which collects the
/// tokens that are not switches.
///
/// # Examples
///
/// ```
/// use argdispatch_core::{Multiplicity, OptionDecl};
///
/// let define = OptionDecl::value(&["-D", "--define"])
///     .multi()
///     .with_description("Define a cache entry");
/// assert_eq!(define.arity, 1);
/// assert_eq!(define.multiplicity, Multiplicity::Multi);
/// assert_eq!(define.canonical_name(), "--define");
///
/// let files = OptionDecl::positional();
/// assert!(files.positional);
/// assert_eq!(files.canonical_name(), "<positional>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDecl {
    /// Switch spellings, e.g. `["-v", "--verbose"]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub switches: Vec<String>,
    /// Receives tokens that are not switches or switch values.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub positional: bool,
    /// Number of value tokens consumed per occurrence.
    #[serde(default)]
    pub arity: usize,
    /// Single or multi occurrence capture.
    #[serde(default)]
    pub multiplicity: Multiplicity,
    /// Free-form description, carried for front ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OptionDecl {
    /// Declares an option with the given switches consuming `arity` values.
    pub fn with_arity(switches: &[&str], arity: usize) -> Self {
        Self {
            switches: switches.iter().map(|s| s.to_string()).collect(),
            positional: false,
            arity,
            multiplicity: Multiplicity::Single,
            description: None,
        }
    }

    /// Declares a flag (no values).
    ///
    /// # Examples
    ///
    /// ```
    /// use argdispatch_core::OptionDecl;
    ///
    /// let help = OptionDecl::flag(&["-h", "--help"]);
    /// assert_eq!(help.arity, 0);
    /// assert!(help.matches("-h"));
    /// assert!(help.matches("--help"));
    /// ```
    pub fn flag(switches: &[&str]) -> Self {
        Self::with_arity(switches, 0)
    }

    /// Declares an option taking exactly one value.
    pub fn value(switches: &[&str]) -> Self {
        Self::with_arity(switches, 1)
    }

    /// Declares the positional receiver.
    pub fn positional() -> Self {
        Self {
            switches: Vec::new(),
            positional: true,
            arity: 1,
            multiplicity: Multiplicity::Single,
            description: None,
        }
    }

    /// Keeps every occurrence instead of only the latest.
    pub fn multi(mut self) -> Self {
        self.multiplicity = Multiplicity::Multi;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Returns `true` for [`Multiplicity::Multi`].
    pub fn is_multi(&self) -> bool {
        self.multiplicity == Multiplicity::Multi
    }

    /// Returns the name used in messages: the first long switch, else the
    /// first short switch, else [`POSITIONAL_NAME`].
    pub fn canonical_name(&self) -> &str {
        self.switches
            .iter()
            .find(|s| s.starts_with("--"))
            .or(self.switches.first())
            .map(String::as_str)
            .unwrap_or(POSITIONAL_NAME)
    }

    /// Checks whether `spelling` is one of this option's switches.
    pub fn matches(&self, spelling: &str) -> bool {
        self.switches.iter().any(|s| s == spelling)
    }
}

/// What happens to a positional token when no receiver is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPositionals {
    /// Keep the token in [`ParseResults::rest`](crate::ParseResults::rest).
    #[default]
    Collect,
    /// Fail with [`ParseError::UnexpectedPositional`](crate::ParseError::UnexpectedPositional).
    Reject,
}

/// Parse-time policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ParserSettings {
    /// Handling of positional tokens without a declared receiver.
    #[serde(default)]
    pub unmatched_positionals: UnmatchedPositionals,
}

impl ParserSettings {
    /// Settings that reject unmatched positional tokens.
    pub fn strict() -> Self {
        Self {
            unmatched_positionals: UnmatchedPositionals::Reject,
        }
    }
}
