//! Dispatch table construction.
//!
//! The table maps every switch spelling to the option it reaches and the
//! number of values that option consumes. It is derived once from a
//! validated registry, never changes afterwards, and can be shared between
//! parsers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validate::{ConfigError, parse_switch, validate_declarations};
use crate::{OptionDecl, OptionId, OptionRegistry, Switch};

/// Target of a switch: which option, and how many values it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Option reached by the switch.
    pub option: OptionId,
    /// Number of value tokens consumed.
    pub arity: usize,
}

/// Immutable switch lookup table.
///
/// # Examples
///
/// ```
/// use argdispatch_core::*;
///
/// let table = DispatchTable::build(&[
///     OptionDecl::flag(&["-h", "--help"]),
///     OptionDecl::value(&["-c"]),
///     OptionDecl::positional(),
/// ])
/// .unwrap();
///
/// assert_eq!(table.short('h'), table.long("help"));
/// assert_eq!(table.short('c').unwrap().arity, 1);
/// assert_eq!(table.lookup("--help").unwrap().option, OptionId(0));
/// assert_eq!(table.positional(), Some(OptionId(2)));
/// assert!(table.long("nope").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchTable {
    short: BTreeMap<char, Entry>,
    long: BTreeMap<String, Entry>,
    positional: Option<OptionId>,
}

impl DispatchTable {
    /// Validates `decls` and compiles them.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn build(decls: &[OptionDecl]) -> Result<Self, ConfigError> {
        validate_declarations(decls)?;
        Ok(Self::compile(decls.iter()))
    }

    /// Compiles an already validated registry.
    pub fn from_registry(registry: &OptionRegistry<'_>) -> Self {
        Self::compile(registry.decls())
    }

    /// Callers validate `decls` first; spellings that do not parse are
    /// never present here.
    fn compile<'a>(decls: impl Iterator<Item = &'a OptionDecl>) -> Self {
        let mut table = Self::default();

        for (index, decl) in decls.enumerate() {
            let id = OptionId(index);
            if decl.positional {
                table.positional = Some(id);
                continue;
            }

            let entry = Entry {
                option: id,
                arity: decl.arity,
            };
            for switch in decl.switches.iter().filter_map(|s| parse_switch(s).ok()) {
                match switch {
                    Switch::Short(c) => {
                        table.short.insert(c, entry);
                    }
                    Switch::Long(name) => {
                        table.long.insert(name, entry);
                    }
                }
            }
        }

        tracing::debug!(
            short = table.short.len(),
            long = table.long.len(),
            positional = table.positional.is_some(),
            "Compiled dispatch table"
        );
        table
    }

    /// Entry for `-c`.
    pub fn short(&self, c: char) -> Option<Entry> {
        self.short.get(&c).copied()
    }

    /// Entry for `--name` (pass the name without dashes).
    pub fn long(&self, name: &str) -> Option<Entry> {
        self.long.get(name).copied()
    }

    /// Entry for a full spelling such as `-c` or `--name`.
    pub fn lookup(&self, spelling: &str) -> Option<Entry> {
        match parse_switch(spelling).ok()? {
            Switch::Short(c) => self.short(c),
            Switch::Long(name) => self.long(&name),
        }
    }

    /// The positional receiver, if declared.
    pub fn positional(&self) -> Option<OptionId> {
        self.positional
    }

    /// Short switches in character order.
    pub fn short_entries(&self) -> impl Iterator<Item = (char, Entry)> {
        self.short.iter().map(|(c, entry)| (*c, *entry))
    }

    /// Long switches in name order.
    pub fn long_entries(&self) -> impl Iterator<Item = (&str, Entry)> {
        self.long.iter().map(|(name, entry)| (name.as_str(), *entry))
    }

    /// Total number of switch spellings.
    pub fn len(&self) -> usize {
        self.short.len() + self.long.len()
    }

    /// Returns `true` if no switches are declared.
    pub fn is_empty(&self) -> bool {
        self.short.is_empty() && self.long.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OptionSpec;

    fn decls() -> Vec<OptionDecl> {
        vec![
            OptionDecl::flag(&["--help"]),
            OptionDecl::flag(&["-a"]),
            OptionDecl::flag(&["-b"]),
            OptionDecl::value(&["-c", "--count"]).multi(),
            OptionDecl::with_arity(&["-x"], 2),
        ]
    }

    #[test]
    fn test_build_partitions_switches() {
        let table = DispatchTable::build(&decls()).unwrap();

        assert_eq!(table.len(), 6);
        assert_eq!(
            table.short_entries().map(|(c, _)| c).collect::<Vec<_>>(),
            vec!['a', 'b', 'c', 'x']
        );
        assert_eq!(
            table.long_entries().map(|(n, _)| n).collect::<Vec<_>>(),
            vec!["count", "help"]
        );
        assert_eq!(table.short('x').unwrap().arity, 2);
        assert_eq!(table.short('c'), table.long("count"));
        assert_eq!(table.positional(), None);
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = DispatchTable::build(&decls()).unwrap();
        let second = DispatchTable::build(&decls()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_registry_matches_build() {
        let registry = OptionRegistry::new(
            decls()
                .into_iter()
                .map(OptionSpec::new)
                .chain(std::iter::once(OptionSpec::positional()))
                .collect(),
        )
        .unwrap();

        let table = DispatchTable::from_registry(&registry);
        assert_eq!(table.positional(), Some(OptionId(5)));
        assert_eq!(table.lookup("--help").unwrap().option, OptionId(0));
        assert_eq!(table.lookup("-z"), None);
        assert_eq!(table.lookup("bogus"), None);
    }

    #[test]
    fn test_from_registry_keeps_every_spelling() {
        let registry = OptionRegistry::from_decls(decls()).unwrap();
        let table = DispatchTable::from_registry(&registry);

        let spellings: Vec<&String> = registry.decls().flat_map(|d| &d.switches).collect();
        assert_eq!(table.len(), spellings.len());
        for spelling in spellings {
            assert!(table.lookup(spelling).is_some(), "{spelling}");
        }
    }

    #[test]
    fn test_build_rejects_invalid() {
        let err = DispatchTable::build(&[OptionDecl::flag(&["--bad-"])]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLongSwitch("--bad-".into()));
    }
}
