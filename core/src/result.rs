//! Result sink.
//!
//! Holds what the parse captured for every declared option. Single options
//! keep their latest values; multi options keep every occurrence in order.
//! Results are written only by the parser's single pass and are read-only
//! once handed out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::{Multiplicity, OptionId, OptionRegistry};

/// Captured values of one option.
///
/// # Examples
///
/// ```
/// use argdispatch_core::*;
///
/// let mut parser = Parser::builder()
///     .option(OptionSpec::value(&["-c"]).multi())
///     .option(OptionSpec::value(&["-o"]))
///     .build()
///     .unwrap();
/// parser.parse_tokens(&["-c", "1", "-o", "a", "-c", "2", "-o", "b"]).unwrap();
/// let results = parser.results().unwrap();
///
/// let c = results.get("-c").unwrap();
/// assert_eq!(c.count(), 2);
/// assert_eq!(c.occurrence(0), Some(&["1".to_string()][..]));
/// assert_eq!(c.value(), Some("2"));
///
/// let o = results.get("-o").unwrap();
/// assert_eq!(o.count(), 1);
/// assert_eq!(o.value(), Some("b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionResult {
    /// Latest capture only.
    Single {
        /// Set on the first occurrence, never cleared.
        present: bool,
        /// Values of the latest occurrence.
        values: Vec<String>,
    },
    /// Every capture, in token order.
    Multi {
        /// One entry per occurrence, each with `arity` values.
        occurrences: Vec<Vec<String>>,
    },
}

impl OptionResult {
    /// Empty result for `multiplicity`.
    pub fn empty(multiplicity: Multiplicity) -> Self {
        match multiplicity {
            Multiplicity::Single => Self::Single {
                present: false,
                values: Vec::new(),
            },
            Multiplicity::Multi => Self::Multi {
                occurrences: Vec::new(),
            },
        }
    }

    /// Whether the option occurred at least once.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Single { present, .. } => *present,
            Self::Multi { occurrences } => !occurrences.is_empty(),
        }
    }

    /// Single or multi.
    pub fn multiplicity(&self) -> Multiplicity {
        match self {
            Self::Single { .. } => Multiplicity::Single,
            Self::Multi { .. } => Multiplicity::Multi,
        }
    }

    /// Number of recorded occurrences; at most one for single options.
    pub fn count(&self) -> usize {
        match self {
            Self::Single { present, .. } => usize::from(*present),
            Self::Multi { occurrences } => occurrences.len(),
        }
    }

    /// Values of the latest occurrence.
    pub fn values(&self) -> Option<&[String]> {
        match self {
            Self::Single { present: true, values } => Some(values.as_slice()),
            Self::Single { .. } => None,
            Self::Multi { occurrences } => occurrences.last().map(Vec::as_slice),
        }
    }

    /// First value of the latest occurrence.
    pub fn value(&self) -> Option<&str> {
        self.values()?.first().map(String::as_str)
    }

    /// Values of occurrence `index`.
    pub fn occurrence(&self, index: usize) -> Option<&[String]> {
        match self {
            Self::Single { .. } if index == 0 => self.values(),
            Self::Single { .. } => None,
            Self::Multi { occurrences } => occurrences.get(index).map(Vec::as_slice),
        }
    }

    /// All recorded occurrences, in order.
    pub fn occurrences(&self) -> impl Iterator<Item = &[String]> {
        (0..self.count()).filter_map(move |i| self.occurrence(i))
    }

    pub(crate) fn record(&mut self, captured: &[&str]) {
        let captured = captured.iter().map(|v| v.to_string()).collect();
        match self {
            Self::Single { present, values } => {
                *present = true;
                *values = captured;
            }
            Self::Multi { occurrences } => occurrences.push(captured),
        }
    }
}

/// Everything a parse captured.
///
/// Obtained from [`Parser::results`](crate::Parser::results) once the parse
/// has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResults {
    program: Option<String>,
    options: Vec<OptionResult>,
    labels: Vec<String>,
    names: HashMap<String, OptionId>,
    positional: Option<OptionId>,
    rest: Vec<String>,
}

impl ParseResults {
    pub(crate) fn new(registry: &OptionRegistry<'_>) -> Self {
        let mut names = HashMap::new();
        let mut options = Vec::with_capacity(registry.len());
        let mut labels = Vec::with_capacity(registry.len());

        for (index, decl) in registry.decls().enumerate() {
            for spelling in &decl.switches {
                names.insert(spelling.clone(), OptionId(index));
            }
            options.push(OptionResult::empty(decl.multiplicity));
            labels.push(decl.canonical_name().to_string());
        }

        Self {
            program: None,
            options,
            labels,
            names,
            positional: registry.positional(),
            rest: Vec::new(),
        }
    }

    pub(crate) fn set_program(&mut self, program: &str) {
        self.program = Some(program.to_string());
    }

    pub(crate) fn record(&mut self, id: OptionId, values: &[&str]) {
        if let Some(result) = self.options.get_mut(id.0) {
            result.record(values);
        }
    }

    pub(crate) fn push_rest(&mut self, token: &str) {
        self.rest.push(token.to_string());
    }

    /// Result for the option owning `switch` (e.g. `"-c"` or `"--count"`).
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::UnknownOption`] if no option declares `switch`.
    pub fn get(&self, switch: &str) -> Result<&OptionResult, AccessError> {
        self.names
            .get(switch)
            .and_then(|id| self.options.get(id.0))
            .ok_or_else(|| AccessError::UnknownOption(switch.to_string()))
    }

    /// Shorthand for `get(switch)?.is_present()`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::UnknownOption`] if no option declares `switch`.
    pub fn is_present(&self, switch: &str) -> Result<bool, AccessError> {
        self.get(switch).map(OptionResult::is_present)
    }

    /// Result for option `id`.
    pub fn by_id(&self, id: OptionId) -> Option<&OptionResult> {
        self.options.get(id.0)
    }

    /// Program name (token 0), when the parse was given a full argv.
    pub fn program(&self) -> Option<&str> {
        self.program.as_deref()
    }

    /// Values received by the positional receiver, in order.
    ///
    /// A single-valued receiver only reports the last token it received.
    pub fn positionals(&self) -> Vec<&str> {
        self.positional
            .and_then(|id| self.by_id(id))
            .map(|result| {
                result
                    .occurrences()
                    .filter_map(|values| values.first().map(String::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Positional tokens kept because no receiver is declared.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// `(canonical name, result)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionResult)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.options.iter())
    }

    /// Serializable summary of the parse.
    pub fn report(&self) -> ParseReport {
        ParseReport {
            program: self.program.clone(),
            options: self
                .iter()
                .map(|(name, result)| OptionReport {
                    name: name.to_string(),
                    present: result.is_present(),
                    occurrences: result.occurrences().map(<[String]>::to_vec).collect(),
                })
                .collect(),
            positionals: self.positionals().into_iter().map(String::from).collect(),
            rest: self.rest.clone(),
        }
    }
}

/// Flat, serializable view of [`ParseResults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Program name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// One entry per declared option, in declaration order.
    pub options: Vec<OptionReport>,
    /// Values received by the positional receiver.
    pub positionals: Vec<String>,
    /// Unmatched positional tokens.
    pub rest: Vec<String>,
}

/// Report entry for one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionReport {
    /// Canonical name (see [`OptionDecl::canonical_name`](crate::OptionDecl::canonical_name)).
    pub name: String,
    /// Whether the option occurred.
    pub present: bool,
    /// Captured occurrences.
    pub occurrences: Vec<Vec<String>>,
}

impl OptionReport {
    /// Number of occurrences.
    pub fn count(&self) -> usize {
        self.occurrences.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OptionDecl;

    #[test]
    fn test_single_overwrites_and_stays_present() {
        let mut result = OptionResult::empty(Multiplicity::Single);
        assert!(!result.is_present());
        assert_eq!(result.values(), None);
        assert_eq!(result.count(), 0);

        result.record(&["a", "b"]);
        result.record(&["c", "d"]);

        assert!(result.is_present());
        assert_eq!(result.count(), 1);
        assert_eq!(result.values(), Some(&["c".to_string(), "d".to_string()][..]));
        assert_eq!(result.occurrence(1), None);
    }

    #[test]
    fn test_single_flag_presence() {
        let mut result = OptionResult::empty(Multiplicity::Single);
        result.record(&[]);

        assert!(result.is_present());
        assert_eq!(result.values(), Some(&[][..]));
        assert_eq!(result.value(), None);
    }

    #[test]
    fn test_multi_keeps_order() {
        let mut result = OptionResult::empty(Multiplicity::Multi);
        result.record(&["1"]);
        result.record(&["2"]);
        result.record(&["3"]);

        assert_eq!(result.count(), 3);
        assert_eq!(result.occurrence(1), Some(&["2".to_string()][..]));
        assert_eq!(
            result
                .occurrences()
                .map(|o| o[0].as_str())
                .collect::<Vec<_>>(),
            vec!["1", "2", "3"]
        );
        assert_eq!(result.value(), Some("3"));
    }

    #[test]
    fn test_results_lookup_by_alias() {
        let registry = OptionRegistry::from_decls(vec![
            OptionDecl::value(&["-c", "--count"]),
            OptionDecl::positional().multi(),
        ])
        .unwrap();
        let mut results = ParseResults::new(&registry);
        results.record(OptionId(0), &["7"]);
        results.record(OptionId(1), &["a"]);
        results.record(OptionId(1), &["b"]);

        assert_eq!(results.get("--count").unwrap().value(), Some("7"));
        assert_eq!(results.get("-c"), results.get("--count"));
        assert_eq!(results.is_present("-c"), Ok(true));
        assert_eq!(
            results.get("-x"),
            Err(AccessError::UnknownOption("-x".into()))
        );
        assert_eq!(results.positionals(), vec!["a", "b"]);
    }

    #[test]
    fn test_report_lists_options_in_order() {
        let registry = OptionRegistry::from_decls(vec![
            OptionDecl::flag(&["-a"]),
            OptionDecl::value(&["-D", "--define"]).multi(),
        ])
        .unwrap();
        let mut results = ParseResults::new(&registry);
        results.set_program("cmake");
        results.record(OptionId(1), &["A=1"]);
        results.push_rest("src");

        let report = results.report();
        assert_eq!(report.program.as_deref(), Some("cmake"));
        assert_eq!(report.options[0].name, "-a");
        assert!(!report.options[0].present);
        assert_eq!(report.options[1].name, "--define");
        assert_eq!(report.options[1].count(), 1);
        assert_eq!(report.rest, vec!["src".to_string()]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["options"][1]["occurrences"][0][0], "A=1");
    }
}
