//! Option declaration manifests.
//!
//! A manifest is the serializable form of a parser's configuration: an
//! ordered list of [`OptionDecl`]s plus [`ParserSettings`]. Manifests are
//! read and written as YAML or JSON, chosen by file extension.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! program: cmake
//! settings:
//!   unmatched_positionals: collect
//! options:
//!   - switches: ["-D"]
//!     arity: 1
//!     multiplicity: multi
//!   - switches: ["-h", "--help"]
//!   - positional: true
//!     arity: 1
//!     multiplicity: multi
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use argdispatch_core::{
    DispatchTable, OptionDecl, OptionRegistry, Parser, ParserSettings, validate_declarations,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ManifestError, Result};

/// Current manifest format version.
pub const MANIFEST_VERSION: &str = "1.0";

/// On-disk encoding of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// `.yml` / `.yaml`
    Yaml,
    /// `.json`
    Json,
}

impl ManifestFormat {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::UnsupportedFormat`] for any other extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use argdispatch_manifest::ManifestFormat;
    ///
    /// assert_eq!(ManifestFormat::from_path("cli.yaml").unwrap(), ManifestFormat::Yaml);
    /// assert_eq!(ManifestFormat::from_path("cli.json").unwrap(), ManifestFormat::Json);
    /// assert!(ManifestFormat::from_path("cli.toml").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml" | "yaml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ManifestError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Declarations and settings for one program.
///
/// # Examples
///
/// ```
/// use argdispatch_core::OptionDecl;
/// use argdispatch_manifest::Manifest;
///
/// let manifest = Manifest::new("cmake")
///     .with_option(OptionDecl::value(&["-D"]).multi())
///     .with_option(OptionDecl::positional());
/// assert!(manifest.validate().is_ok());
///
/// let mut parser = manifest.parser().unwrap();
/// parser.parse(&["cmake", "-DA=1", "src"]).unwrap();
/// assert_eq!(parser.results().unwrap().positionals(), vec!["src"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version (e.g., `"1.0"`).
    pub version: String,
    /// Program the declarations belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parse-time settings.
    #[serde(default)]
    pub settings: ParserSettings,
    /// Ordered option declarations.
    #[serde(default)]
    pub options: Vec<OptionDecl>,
}

impl Manifest {
    /// Creates an empty manifest for `program`.
    pub fn new(program: &str) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            program: Some(program.to_string()),
            description: None,
            settings: ParserSettings::default(),
            options: Vec::new(),
        }
    }

    /// Appends a declaration.
    pub fn with_option(mut self, decl: OptionDecl) -> Self {
        self.options.push(decl);
        self
    }

    /// Replaces the settings.
    pub fn with_settings(mut self, settings: ParserSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Program name, or `"<unnamed>"`.
    pub fn name(&self) -> &str {
        self.program.as_deref().unwrap_or("<unnamed>")
    }

    /// Loads a manifest, picking the format from the file extension.
    ///
    /// The manifest is not validated; call [`validate`](Self::validate) or
    /// one of the compile methods.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ManifestError::IoError) if the file cannot be
    /// read, [`UnsupportedFormat`](ManifestError::UnsupportedFormat) for an
    /// unknown extension, or a JSON/YAML error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ManifestFormat::from_path(path)?;
        let reader = BufReader::new(File::open(path)?);
        let manifest: Self = match format {
            ManifestFormat::Yaml => serde_yaml::from_reader(reader)?,
            ManifestFormat::Json => serde_json::from_reader(reader)?,
        };
        debug!(
            path = %path.display(),
            program = manifest.name(),
            options = manifest.options.len(),
            "Loaded manifest"
        );
        Ok(manifest)
    }

    /// Saves the manifest, picking the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ManifestError::IoError) if the file cannot be
    /// written, or a JSON/YAML error if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = ManifestFormat::from_path(path)?;
        let writer = BufWriter::new(File::create(path)?);
        match format {
            ManifestFormat::Yaml => serde_yaml::to_writer(writer, self)?,
            ManifestFormat::Json => serde_json::to_writer_pretty(writer, self)?,
        }
        Ok(())
    }

    /// Parses a YAML manifest.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](ManifestError::YamlError) if parsing fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a JSON manifest.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](ManifestError::JsonError) if parsing fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the version field and the option declarations.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidManifest`](ManifestError::InvalidManifest) for an
    /// empty version, or [`ConfigError`](ManifestError::ConfigError) for
    /// invalid declarations.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ManifestError::InvalidManifest(
                "version cannot be empty".to_string(),
            ));
        }
        validate_declarations(&self.options)?;
        Ok(())
    }

    /// Compiles the dispatch table.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn dispatch_table(&self) -> Result<DispatchTable> {
        self.validate()?;
        Ok(DispatchTable::build(&self.options)?)
    }

    /// Builds a handler-less registry.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn registry(&self) -> Result<OptionRegistry<'static>> {
        self.validate()?;
        Ok(OptionRegistry::from_decls(self.options.clone())?)
    }

    /// Builds a parser using the manifest's settings.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn parser(&self) -> Result<Parser<'static>> {
        Ok(Parser::with_settings(self.registry()?, self.settings))
    }
}
