//! YAML/JSON manifests for argdispatch option declarations.
//!
//! A [`Manifest`] stores the declarations of one program and the settings its
//! parser runs with, so declarations can live next to the program instead of
//! in code. Manifests compile to the same [`DispatchTable`] and
//! [`Parser`] the builder API produces, without handlers.
//!
//! # Quick start
//!
//! ```no_run
//! use argdispatch_manifest::Manifest;
//!
//! let manifest = Manifest::load("cmake.yaml").unwrap();
//! let mut parser = manifest.parser().unwrap();
//! parser.parse_env().unwrap();
//!
//! let results = parser.results().unwrap();
//! for define in results.get("-D").unwrap().occurrences() {
//!     println!("define {}", define[0]);
//! }
//! ```
//!
//! [`DispatchTable`]: argdispatch_core::DispatchTable
//! [`Parser`]: argdispatch_core::Parser

mod error;
mod manifest;

pub use error::{ManifestError, Result};
pub use manifest::{MANIFEST_VERSION, Manifest, ManifestFormat};
