//! Declaration validation.
//!
//! Checks switch spellings against the short/long grammar and the structural
//! invariants of an option set: unique spellings, at most one positional
//! receiver, and a positional arity of one. Validation runs once, when a
//! registry or dispatch table is built, and stops at the first problem.
//!
//! # Examples
//!
//! ```
//! use argdispatch_core::*;
//!
//! let decls = vec![
//!     OptionDecl::flag(&["-v", "--verbose"]),
//!     OptionDecl::value(&["-o", "--output"]),
//! ];
//! assert!(validate_declarations(&decls).is_ok());
//!
//! // `-v` is claimed twice
//! let clash = vec![OptionDecl::flag(&["-v"]), OptionDecl::flag(&["-v", "--version"])];
//! assert_eq!(
//!     validate_declarations(&clash),
//!     Err(ConfigError::DuplicateSwitch("-v".into()))
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{OptionDecl, Switch};

/// Declaration errors.
///
/// Raised while building a registry or dispatch table. A configuration
/// error means no parser can exist for the declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Spelling is shorter than two characters (e.g. `"-"` or `"v"`).
    #[error("option switch cannot be a single character: {0:?}")]
    SingleCharacter(String),
    /// Two-character spelling that is not a dash plus an alphanumeric.
    #[error("short switch must be a dash followed by one alphanumeric character: {0}")]
    InvalidShortSwitch(String),
    /// Longer spelling that is not `--` plus alphanumerics and inner dashes.
    #[error(
        "long switch must be two dashes followed by alphanumerics and dashes, \
         not starting or ending with a dash: {0}"
    )]
    InvalidLongSwitch(String),
    /// A non-positional option lists no switches.
    #[error("option must declare at least one switch")]
    MissingSwitch,
    /// A spelling is used more than once across the option set.
    #[error("duplicate switch: {0}")]
    DuplicateSwitch(String),
    /// More than one option claims the positional receiver.
    #[error("only one positional receiver may be declared")]
    DuplicatePositional,
    /// The positional receiver does not take exactly one value.
    #[error("positional receiver must take exactly one value, got {0}")]
    PositionalArity(usize),
    /// The positional receiver also lists switch spellings.
    #[error("positional receiver cannot declare switches: {0}")]
    PositionalWithSwitches(String),
    /// A shared dispatch table was not compiled from the same declarations
    /// as the registry it is paired with.
    #[error("dispatch table does not match the option registry")]
    TableMismatch,
}

/// Validates an ordered set of declarations.
///
/// # Errors
///
/// Returns the first [`ConfigError`] found, in declaration order.
pub fn validate_declarations<'a>(
    decls: impl IntoIterator<Item = &'a OptionDecl>,
) -> Result<(), ConfigError> {
    let mut seen: HashSet<Switch> = HashSet::new();
    let mut has_positional = false;

    for decl in decls {
        if decl.positional {
            if let Some(first) = decl.switches.first() {
                return Err(ConfigError::PositionalWithSwitches(first.clone()));
            }
            if decl.arity != 1 {
                return Err(ConfigError::PositionalArity(decl.arity));
            }
            if has_positional {
                return Err(ConfigError::DuplicatePositional);
            }
            has_positional = true;
            continue;
        }

        if decl.switches.is_empty() {
            return Err(ConfigError::MissingSwitch);
        }

        for spelling in &decl.switches {
            let switch = parse_switch(spelling)?;
            if !seen.insert(switch) {
                return Err(ConfigError::DuplicateSwitch(spelling.clone()));
            }
        }
    }

    Ok(())
}

pub(crate) fn parse_switch(spelling: &str) -> Result<Switch, ConfigError> {
    let mut chars = spelling.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (None, _, _) | (Some(_), None, _) => Err(ConfigError::SingleCharacter(spelling.to_string())),
        (Some('-'), Some(c), None) if c.is_ascii_alphanumeric() => Ok(Switch::Short(c)),
        (Some(_), Some(_), None) => Err(ConfigError::InvalidShortSwitch(spelling.to_string())),
        _ => match spelling.strip_prefix("--") {
            Some(name) if is_long_name(name) => Ok(Switch::Long(name.to_string())),
            _ => Err(ConfigError::InvalidLongSwitch(spelling.to_string())),
        },
    }
}

fn is_long_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        }
        _ => false,
    }
}
