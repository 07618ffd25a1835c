//! Single-pass argument parser.
//!
//! The parser walks the token vector left to right against a
//! [`DispatchTable`]. It starts in option mode and switches, irreversibly, to
//! positional-only mode on a bare `--`. In option mode:
//!
//! - `--name` is looked up whole in the long switch map and consumes the
//!   next `arity` tokens.
//! - `-abc` is a cluster of short switches. Flags apply in place. The last
//!   switch of a cluster consumes the next `arity` tokens. A single-value
//!   switch in the middle of a cluster takes the rest of the token as its
//!   value (`-Dkey=val`). A multi-value switch in the middle is an error.
//! - Anything else is positional.
//!
//! Handlers run synchronously in token order. The first error aborts the
//! parse, and the results of an aborted parse are not available.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{AccessError, OptionError, ParseError};
use crate::{
    ConfigError, DispatchTable, OptionId, OptionRegistry, OptionSpec, POSITIONAL_NAME,
    ParseResults, ParserSettings, UnmatchedPositionals,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Options,
    PositionalOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Fresh,
    Parsed,
    Failed,
}

enum Token<'t> {
    Terminator,
    Long(&'t str),
    Cluster(&'t str),
    Positional,
}

fn classify(token: &str) -> Token<'_> {
    if token == "--" {
        return Token::Terminator;
    }
    if let Some(name) = token.strip_prefix("--") {
        return Token::Long(name);
    }
    match token.strip_prefix('-') {
        Some(cluster) if cluster.starts_with(|c: char| c.is_ascii_alphanumeric()) => {
            Token::Cluster(cluster)
        }
        _ => Token::Positional,
    }
}

/// Argument parser built from an [`OptionRegistry`].
///
/// A parser consumes exactly one argument vector. Calling a parse method a
/// second time fails with [`ParseError::AlreadyParsed`].
///
/// # Examples
///
/// ```
/// use argdispatch_core::*;
///
/// let mut parser = Parser::builder()
///     .option(OptionSpec::flag(&["--help"]))
///     .option(OptionSpec::flag(&["-a"]))
///     .option(OptionSpec::flag(&["-b"]))
///     .option(OptionSpec::value(&["-c"]))
///     .build()
///     .unwrap();
///
/// parser.parse(&["prog", "-a", "-c", "X"]).unwrap();
/// let results = parser.results().unwrap();
///
/// assert_eq!(results.program(), Some("prog"));
/// assert!(results.get("-a").unwrap().is_present());
/// assert!(!results.get("-b").unwrap().is_present());
/// assert_eq!(results.get("-c").unwrap().value(), Some("X"));
/// assert!(matches!(parser.parse(&["prog"]), Err(ParseError::AlreadyParsed)));
/// ```
#[derive(Debug)]
pub struct Parser<'h> {
    registry: OptionRegistry<'h>,
    table: Arc<DispatchTable>,
    settings: ParserSettings,
    results: ParseResults,
    lifecycle: Lifecycle,
}

impl<'h> Parser<'h> {
    /// Starts a [`ParserBuilder`].
    pub fn builder() -> ParserBuilder<'h> {
        ParserBuilder::default()
    }

    /// Creates a parser with default settings.
    pub fn new(registry: OptionRegistry<'h>) -> Self {
        Self::with_settings(registry, ParserSettings::default())
    }

    /// Creates a parser with explicit settings.
    pub fn with_settings(registry: OptionRegistry<'h>, settings: ParserSettings) -> Self {
        let table = Arc::new(DispatchTable::from_registry(&registry));
        Self::assemble(registry, table, settings)
    }

    /// Creates a parser that reuses an already compiled table.
    ///
    /// Parsers for the same declarations can share one table this way; each
    /// parser still owns its registry (handlers) and results.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TableMismatch`] if `table` was not compiled
    /// from the registry's declarations.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use argdispatch_core::*;
    ///
    /// let decls = vec![OptionDecl::flag(&["-v"]), OptionDecl::value(&["-o"])];
    /// let table = Arc::new(DispatchTable::build(&decls).unwrap());
    ///
    /// let first = Parser::with_table(
    ///     OptionRegistry::from_decls(decls.clone()).unwrap(),
    ///     Arc::clone(&table),
    ///     ParserSettings::default(),
    /// )
    /// .unwrap();
    /// let second = first.share(OptionRegistry::from_decls(decls).unwrap()).unwrap();
    /// assert!(Arc::ptr_eq(first.table(), second.table()));
    /// ```
    pub fn with_table(
        registry: OptionRegistry<'h>,
        table: Arc<DispatchTable>,
        settings: ParserSettings,
    ) -> Result<Self, ConfigError> {
        if *table != DispatchTable::from_registry(&registry) {
            return Err(ConfigError::TableMismatch);
        }
        Ok(Self::assemble(registry, table, settings))
    }

    /// Creates a fresh parser for `registry` that shares this parser's table
    /// and settings.
    ///
    /// # Errors
    ///
    /// Same as [`with_table`](Self::with_table).
    pub fn share<'o>(&self, registry: OptionRegistry<'o>) -> Result<Parser<'o>, ConfigError> {
        Parser::with_table(registry, Arc::clone(&self.table), self.settings)
    }

    fn assemble(
        registry: OptionRegistry<'h>,
        table: Arc<DispatchTable>,
        settings: ParserSettings,
    ) -> Self {
        let results = ParseResults::new(&registry);
        Self {
            registry,
            table,
            settings,
            results,
            lifecycle: Lifecycle::Fresh,
        }
    }

    /// The compiled dispatch table.
    pub fn table(&self) -> &Arc<DispatchTable> {
        &self.table
    }

    /// The registry this parser was built from.
    pub fn registry(&self) -> &OptionRegistry<'h> {
        &self.registry
    }

    /// Parse-time settings.
    pub fn settings(&self) -> ParserSettings {
        self.settings
    }

    /// Whether a parse has been attempted.
    pub fn is_parsed(&self) -> bool {
        self.lifecycle != Lifecycle::Fresh
    }

    /// Parses a full argument vector. Token 0 is the program name and is
    /// not parsed.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] met, or
    /// [`ParseError::AlreadyParsed`] on a second call.
    pub fn parse<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<(), ParseError> {
        self.begin()?;
        let tokens: Vec<&str> = argv.iter().map(AsRef::as_ref).collect();
        if let Some(program) = tokens.first() {
            self.results.set_program(program);
        }
        let outcome = self.scan(tokens.get(1..).unwrap_or_default());
        self.finish(outcome)
    }

    /// Parses tokens that do not include a program name.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse).
    pub fn parse_tokens<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<(), ParseError> {
        self.begin()?;
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        let outcome = self.scan(&tokens);
        self.finish(outcome)
    }

    /// Parses the current process arguments.
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse).
    pub fn parse_env(&mut self) -> Result<(), ParseError> {
        let argv: Vec<String> = std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.parse(&argv)
    }

    /// Results of a completed parse.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotParsed`] before a parse and
    /// [`AccessError::ParseFailed`] after a failed one.
    pub fn results(&self) -> Result<&ParseResults, AccessError> {
        match self.lifecycle {
            Lifecycle::Parsed => Ok(&self.results),
            Lifecycle::Fresh => Err(AccessError::NotParsed),
            Lifecycle::Failed => Err(AccessError::ParseFailed),
        }
    }

    /// Consumes the parser and returns its results.
    ///
    /// # Errors
    ///
    /// Same as [`results`](Self::results).
    pub fn into_results(self) -> Result<ParseResults, AccessError> {
        self.results()?;
        Ok(self.results)
    }

    fn begin(&self) -> Result<(), ParseError> {
        if self.lifecycle != Lifecycle::Fresh {
            return Err(ParseError::AlreadyParsed);
        }
        Ok(())
    }

    fn finish(&mut self, outcome: Result<(), ParseError>) -> Result<(), ParseError> {
        self.lifecycle = match outcome {
            Ok(()) => Lifecycle::Parsed,
            Err(_) => Lifecycle::Failed,
        };
        outcome
    }

    fn scan(&mut self, tokens: &[&str]) -> Result<(), ParseError> {
        let mut state = ScanState::Options;
        let mut cursor = 0;

        while let Some(&token) = tokens.get(cursor) {
            if state == ScanState::PositionalOnly {
                self.apply_positional(token)?;
                cursor += 1;
                continue;
            }

            cursor = match classify(token) {
                Token::Terminator => {
                    debug!(position = cursor, "End of options");
                    state = ScanState::PositionalOnly;
                    cursor + 1
                }
                Token::Long(name) => self.apply_long(name, tokens, cursor)?,
                Token::Cluster(cluster) => self.apply_cluster(cluster, tokens, cursor)?,
                Token::Positional => {
                    self.apply_positional(token)?;
                    cursor + 1
                }
            };
        }

        Ok(())
    }

    /// Applies `--name` at `cursor` and returns the next cursor.
    fn apply_long(
        &mut self,
        name: &str,
        tokens: &[&str],
        cursor: usize,
    ) -> Result<usize, ParseError> {
        let entry = self
            .table
            .long(name)
            .ok_or_else(|| ParseError::UnknownLongSwitch(name.to_string()))?;
        let switch = format!("--{name}");
        let values = following(tokens, cursor, entry.arity)
            .map_err(|cause| ParseError::option(switch.as_str(), cause))?;
        self.dispatch(entry.option, &switch, values)?;
        Ok(cursor + 1 + entry.arity)
    }

    /// Applies the short switch cluster of the token at `cursor` (without its
    /// leading dash) and returns the next cursor.
    fn apply_cluster(
        &mut self,
        cluster: &str,
        tokens: &[&str],
        cursor: usize,
    ) -> Result<usize, ParseError> {
        for (offset, c) in cluster.char_indices() {
            let entry = self
                .table
                .short(c)
                .ok_or(ParseError::UnknownShortSwitch(c))?;
            let switch = format!("-{c}");
            let rest = &cluster[offset + c.len_utf8()..];

            if rest.is_empty() {
                let values = following(tokens, cursor, entry.arity)
                    .map_err(|cause| ParseError::option(switch.as_str(), cause))?;
                self.dispatch(entry.option, &switch, values)?;
                return Ok(cursor + 1 + entry.arity);
            }

            match entry.arity {
                0 => self.dispatch(entry.option, &switch, &[])?,
                1 => {
                    self.dispatch(entry.option, &switch, &[rest])?;
                    return Ok(cursor + 1);
                }
                arity => {
                    return Err(ParseError::option(
                        switch,
                        OptionError::SpliceMultiValue { arity },
                    ));
                }
            }
        }

        Ok(cursor + 1)
    }

    fn apply_positional(&mut self, token: &str) -> Result<(), ParseError> {
        match (self.table.positional(), self.settings.unmatched_positionals) {
            (Some(id), _) => {
                trace!(token, "Positional argument");
                self.dispatch(id, POSITIONAL_NAME, &[token])
            }
            (None, UnmatchedPositionals::Collect) => {
                trace!(token, "Unmatched positional argument");
                self.results.push_rest(token);
                Ok(())
            }
            (None, UnmatchedPositionals::Reject) => {
                Err(ParseError::UnexpectedPositional(token.to_string()))
            }
        }
    }

    fn dispatch(&mut self, id: OptionId, switch: &str, values: &[&str]) -> Result<(), ParseError> {
        debug!(switch, option = id.index(), ?values, "Matched option");
        self.results.record(id, values);
        if let Some(handler) = self.registry.handler_mut(id) {
            handler(values).map_err(|err| ParseError::option(switch, OptionError::Handler(err)))?;
        }
        Ok(())
    }
}

/// The `arity` tokens after `cursor`.
fn following<'a, 't>(
    tokens: &'a [&'t str],
    cursor: usize,
    arity: usize,
) -> Result<&'a [&'t str], OptionError> {
    let start = cursor + 1;
    start
        .checked_add(arity)
        .and_then(|end| tokens.get(start..end))
        .ok_or(OptionError::MissingArguments {
            expected: arity,
            found: tokens.len().saturating_sub(start),
        })
}

/// Builder for [`Parser`].
///
/// # Examples
///
/// ```
/// use argdispatch_core::*;
///
/// let mut parser = Parser::builder()
///     .option(OptionSpec::flag(&["-a"]))
///     .settings(ParserSettings::strict())
///     .build()
///     .unwrap();
/// let err = parser.parse_tokens(&["-a", "stray"]).unwrap_err();
/// assert!(matches!(err, ParseError::UnexpectedPositional(ref t) if t == "stray"));
/// ```
#[derive(Debug, Default)]
pub struct ParserBuilder<'h> {
    specs: Vec<OptionSpec<'h>>,
    settings: ParserSettings,
}

impl<'h> ParserBuilder<'h> {
    /// Adds an option.
    pub fn option(mut self, spec: impl Into<OptionSpec<'h>>) -> Self {
        self.specs.push(spec.into());
        self
    }

    /// Adds several options.
    pub fn options(mut self, specs: impl IntoIterator<Item = OptionSpec<'h>>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Sets parse-time settings.
    pub fn settings(mut self, settings: ParserSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Validates the options and builds the parser.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn build(self) -> Result<Parser<'h>, ConfigError> {
        let registry = OptionRegistry::new(self.specs)?;
        Ok(Parser::with_settings(registry, self.settings))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::OptionDecl;

    fn parser(decls: Vec<OptionDecl>) -> Parser<'static> {
        Parser::new(OptionRegistry::from_decls(decls).unwrap())
    }

    #[test]
    fn test_classify() {
        assert!(matches!(classify("--"), Token::Terminator));
        assert!(matches!(classify("--all"), Token::Long("all")));
        assert!(matches!(classify("-ab"), Token::Cluster("ab")));
        assert!(matches!(classify("-"), Token::Positional));
        assert!(matches!(classify("-.x"), Token::Positional));
        assert!(matches!(classify("file"), Token::Positional));
    }

    #[test]
    fn test_cluster_of_flags() {
        let mut p = parser(vec![OptionDecl::flag(&["-a"]), OptionDecl::flag(&["-b"])]);
        p.parse_tokens(&["-ab"]).unwrap();

        let results = p.results().unwrap();
        assert!(results.get("-a").unwrap().is_present());
        assert!(results.get("-b").unwrap().is_present());
    }

    #[test]
    fn test_cluster_last_switch_takes_following_tokens() {
        let mut p = parser(vec![
            OptionDecl::flag(&["-v"]),
            OptionDecl::with_arity(&["-x"], 2),
        ]);
        p.parse_tokens(&["-vx", "1", "2", "tail"]).unwrap();

        let results = p.results().unwrap();
        assert!(results.get("-v").unwrap().is_present());
        assert_eq!(
            results.get("-x").unwrap().values(),
            Some(&["1".to_string(), "2".to_string()][..])
        );
        assert_eq!(results.rest(), &["tail".to_string()]);
    }

    #[test]
    fn test_splice_matches_separate_token() {
        let mut spliced = parser(vec![OptionDecl::value(&["-D"])]);
        spliced.parse_tokens(&["-Dkey=val"]).unwrap();

        let mut separate = parser(vec![OptionDecl::value(&["-D"])]);
        separate.parse_tokens(&["-D", "key=val"]).unwrap();

        assert_eq!(
            spliced.results().unwrap().get("-D").unwrap().value(),
            Some("key=val")
        );
        assert_eq!(
            spliced.results().unwrap().get("-D"),
            separate.results().unwrap().get("-D")
        );
    }

    #[test]
    fn test_splice_stops_cluster_scan() {
        let mut p = parser(vec![
            OptionDecl::flag(&["-a"]),
            OptionDecl::flag(&["-b"]),
            OptionDecl::value(&["-o"]),
        ]);
        p.parse_tokens(&["-aob"]).unwrap();

        let results = p.results().unwrap();
        assert!(results.get("-a").unwrap().is_present());
        assert_eq!(results.get("-o").unwrap().value(), Some("b"));
        assert!(!results.get("-b").unwrap().is_present());
    }

    #[test]
    fn test_multi_value_splice_rejected() {
        let mut p = parser(vec![OptionDecl::with_arity(&["-x"], 2)]);
        let err = p.parse_tokens(&["-xYZ"]).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Option {
                ref switch,
                cause: OptionError::SpliceMultiValue { arity: 2 },
            } if switch == "-x"
        ));
    }

    #[test]
    fn test_long_option_values() {
        let mut p = parser(vec![OptionDecl::with_arity(&["--size"], 2)]);
        p.parse_tokens(&["--size", "640", "480"]).unwrap();

        assert_eq!(
            p.results().unwrap().get("--size").unwrap().values(),
            Some(&["640".to_string(), "480".to_string()][..])
        );
    }

    #[test]
    fn test_long_option_missing_values() {
        let mut p = parser(vec![OptionDecl::with_arity(&["--size"], 2)]);
        let err = p.parse_tokens(&["--size", "640"]).unwrap_err();

        assert!(matches!(
            err,
            ParseError::Option {
                cause: OptionError::MissingArguments {
                    expected: 2,
                    found: 1
                },
                ..
            }
        ));
        assert_eq!(err.switch(), Some("--size"));
    }

    #[test]
    fn test_value_may_look_like_switch() {
        let mut p = parser(vec![OptionDecl::value(&["-c"]), OptionDecl::flag(&["-a"])]);
        p.parse_tokens(&["-c", "-a"]).unwrap();

        let results = p.results().unwrap();
        assert_eq!(results.get("-c").unwrap().value(), Some("-a"));
        assert!(!results.get("-a").unwrap().is_present());
    }

    #[test]
    fn test_unknown_switches() {
        let mut p = parser(vec![OptionDecl::flag(&["-a"])]);
        assert!(matches!(
            p.parse_tokens(&["--nope"]),
            Err(ParseError::UnknownLongSwitch(ref n)) if n == "nope"
        ));

        let mut p = parser(vec![OptionDecl::flag(&["-a"])]);
        assert!(matches!(
            p.parse_tokens(&["-az"]),
            Err(ParseError::UnknownShortSwitch('z'))
        ));
    }

    #[test]
    fn test_terminator_switches_to_positional_only() {
        let mut p = parser(vec![
            OptionDecl::flag(&["-a"]),
            OptionDecl::positional().multi(),
        ]);
        p.parse_tokens(&["x", "--", "-a", "--", "--long"]).unwrap();

        let results = p.results().unwrap();
        assert!(!results.get("-a").unwrap().is_present());
        assert_eq!(results.positionals(), vec!["x", "-a", "--", "--long"]);
    }

    #[test]
    fn test_lone_dash_is_positional() {
        let mut p = parser(vec![OptionDecl::positional().multi()]);
        p.parse_tokens(&["-", "-.5"]).unwrap();

        assert_eq!(p.results().unwrap().positionals(), vec!["-", "-.5"]);
    }

    #[test]
    fn test_handlers_run_in_token_order() {
        let log = RefCell::new(Vec::new());
        let mut p = Parser::builder()
            .option(OptionSpec::flag(&["-a"]).on(|_| {
                log.borrow_mut().push("a".to_string());
                Ok(())
            }))
            .option(OptionSpec::value(&["-c"]).multi().on(|v| {
                log.borrow_mut().push(format!("c={}", v[0]));
                Ok(())
            }))
            .option(OptionSpec::positional().on(|v| {
                log.borrow_mut().push(format!("pos={}", v[0]));
                Ok(())
            }))
            .build()
            .unwrap();

        p.parse_tokens(&["-c", "1", "file", "-ac2"]).unwrap();
        drop(p);

        assert_eq!(
            log.into_inner(),
            vec!["c=1", "pos=file", "a", "c=2"]
        );
    }

    #[test]
    fn test_handler_error_is_wrapped() {
        let mut p = Parser::builder()
            .option(
                OptionSpec::value(&["-n", "--number"])
                    .on(|v| v[0].parse::<u32>().map(|_| ()).map_err(Into::into)),
            )
            .build()
            .unwrap();

        let err = p.parse_tokens(&["--number", "ten"]).unwrap_err();
        assert_eq!(err.switch(), Some("--number"));
        assert!(matches!(
            err,
            ParseError::Option {
                cause: OptionError::Handler(_),
                ..
            }
        ));
        assert_eq!(p.results().unwrap_err(), AccessError::ParseFailed);
    }

    #[test]
    fn test_results_before_parse() {
        let p = parser(vec![OptionDecl::flag(&["-a"])]);
        assert!(!p.is_parsed());
        assert_eq!(p.results().unwrap_err(), AccessError::NotParsed);
    }

    #[test]
    fn test_second_parse_is_refused() {
        let mut p = parser(vec![OptionDecl::flag(&["-a"])]);
        p.parse(&["prog", "-a"]).unwrap();

        assert!(matches!(
            p.parse(&["prog"]),
            Err(ParseError::AlreadyParsed)
        ));
        assert!(matches!(
            p.parse_tokens(&["-a"]),
            Err(ParseError::AlreadyParsed)
        ));
        assert!(p.results().unwrap().get("-a").unwrap().is_present());
    }

    #[test]
    fn test_oversized_arity_is_missing_arguments() {
        for (decl, token) in [
            (OptionDecl::with_arity(&["-b"], usize::MAX), "-b"),
            (OptionDecl::with_arity(&["--big"], usize::MAX), "--big"),
        ] {
            let mut p = parser(vec![decl]);
            let err = p.parse_tokens(&[token, "x"]).unwrap_err();

            assert_eq!(err.switch(), Some(token));
            assert!(matches!(
                err,
                ParseError::Option {
                    cause: OptionError::MissingArguments {
                        expected: usize::MAX,
                        found: 1
                    },
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_parsers_share_one_table() {
        let decls = vec![OptionDecl::flag(&["-a"]), OptionDecl::value(&["-c"])];
        let first = parser(decls.clone());
        let mut second = first
            .share(OptionRegistry::from_decls(decls).unwrap())
            .unwrap();

        assert!(Arc::ptr_eq(first.table(), second.table()));
        second.parse_tokens(&["-c", "1"]).unwrap();
        assert!(!first.is_parsed());
        assert_eq!(second.results().unwrap().get("-c").unwrap().value(), Some("1"));
    }

    #[test]
    fn test_mismatched_table_is_rejected() {
        let table = Arc::new(DispatchTable::build(&[OptionDecl::flag(&["-a"])]).unwrap());
        let registry = OptionRegistry::from_decls(vec![OptionDecl::flag(&["-b"])]).unwrap();

        let err = Parser::with_table(registry, table, ParserSettings::default()).unwrap_err();
        assert_eq!(err, ConfigError::TableMismatch);
    }

    #[test]
    fn test_empty_argv() {
        let mut p = parser(vec![OptionDecl::flag(&["-a"])]);
        p.parse::<&str>(&[]).unwrap();

        let results = p.into_results().unwrap();
        assert_eq!(results.program(), None);
        assert!(!results.get("-a").unwrap().is_present());
    }
}
