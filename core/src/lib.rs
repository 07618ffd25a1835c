//! Option declarations, dispatch tables and a single-pass argument parser.
//!
//! The crate is organised leaves first:
//!
//! - [`OptionDecl`] / [`OptionSpec`]: switch spellings, arity and
//!   multiplicity, plus an optional handler.
//! - [`OptionRegistry`]: the validated option set. Malformed or duplicate
//!   switches and extra positional receivers are rejected here with a
//!   [`ConfigError`], before any parsing can happen.
//! - [`DispatchTable`]: switch → (option, arity) lookup compiled once from
//!   the registry.
//! - [`Parser`]: walks the argument vector once, handling `--` terminators,
//!   short switch clusters and spliced values, and reports a [`ParseError`]
//!   on the first problem.
//! - [`ParseResults`]: per-option captures ([`OptionResult`]) plus the
//!   positional tokens.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use argdispatch_core::*;
//!
//! let defines = RefCell::new(Vec::new());
//! let mut parser = Parser::builder()
//!     .option(OptionSpec::flag(&["-h", "--help"]))
//!     .option(OptionSpec::value(&["-D"]).multi().on(|values| {
//!         defines.borrow_mut().push(values[0].to_string());
//!         Ok(())
//!     }))
//!     .option(OptionSpec::positional())
//!     .build()
//!     .unwrap();
//!
//! parser
//!     .parse(&["cmake", "-DCMAKE_BUILD_TYPE=Release", "-D", "FOO=1", "src"])
//!     .unwrap();
//!
//! let results = parser.results().unwrap();
//! assert!(!results.is_present("--help").unwrap());
//! assert_eq!(results.get("-D").unwrap().count(), 2);
//! assert_eq!(results.positionals(), vec!["src"]);
//! drop(parser);
//! assert_eq!(defines.into_inner(), vec!["CMAKE_BUILD_TYPE=Release", "FOO=1"]);
//! ```

mod error;
mod parser;
mod registry;
mod result;
mod table;
mod types;
mod validate;

pub use error::{AccessError, HandlerError, OptionError, ParseError};
pub use parser::{Parser, ParserBuilder};
pub use registry::{Handler, OptionRegistry, OptionSpec};
pub use result::{OptionReport, OptionResult, ParseReport, ParseResults};
pub use table::{DispatchTable, Entry};
pub use types::*;
pub use validate::{ConfigError, validate_declarations};
