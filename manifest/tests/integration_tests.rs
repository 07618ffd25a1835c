use std::path::Path;

use argdispatch_core::{
    ConfigError, DispatchTable, OptionDecl, ParseError, ParserSettings, UnmatchedPositionals,
};
use argdispatch_manifest::{Manifest, ManifestError};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cmake_manifest() -> Manifest {
    let mut manifest = Manifest::new("cmake")
        .with_option(OptionDecl::value(&["-D"]).multi())
        .with_option(OptionDecl::flag(&["--help", "-h"]).with_description("Print usage"))
        .with_option(OptionDecl::positional().multi());
    manifest.description = Some("cmake front end".into());
    manifest
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

#[test]
fn test_yaml_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cmake.yaml");

    let manifest = cmake_manifest();
    manifest.save(&path).unwrap();
    let loaded = Manifest::load(&path).unwrap();

    assert_eq!(loaded, manifest);
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("multiplicity: multi"));
}

#[test]
fn test_json_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cmake.json");

    let manifest = cmake_manifest().with_settings(ParserSettings::strict());
    manifest.save(&path).unwrap();
    let loaded = Manifest::load(&path).unwrap();

    assert_eq!(loaded, manifest);
    assert_eq!(
        loaded.settings.unmatched_positionals,
        UnmatchedPositionals::Reject
    );
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = Manifest::load(dir.path().join("absent.yml"));
    assert!(matches!(result, Err(ManifestError::IoError(_))));
}

#[test]
fn test_load_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "cmake.toml", "version = \"1.0\"");
    let result = Manifest::load(&path);
    assert!(matches!(result, Err(ManifestError::UnsupportedFormat(p)) if p == path));
}

#[test]
fn test_load_malformed_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "bad.yml", "options: [ {switches: ");
    assert!(matches!(
        Manifest::load(&path),
        Err(ManifestError::YamlError(_))
    ));
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

#[test]
fn test_manifest_table_matches_builder_table() {
    let manifest = cmake_manifest();
    let from_manifest = manifest.dispatch_table().unwrap();
    let direct = DispatchTable::build(&manifest.options).unwrap();

    assert_eq!(from_manifest, direct);
    assert_eq!(from_manifest.short('h').map(|e| e.arity), Some(0));
    assert_eq!(from_manifest.long("help").map(|e| e.option.index()), Some(1));
}

#[test]
fn test_loaded_manifest_drives_a_parse() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "tar.yml",
        r#"
version: "1.0"
program: tar
options:
  - switches: ["-x"]
  - switches: ["-v"]
  - switches: ["-f", "--file"]
    arity: 1
"#,
    );

    let mut parser = Manifest::load(&path).unwrap().parser().unwrap();
    parser.parse(&["tar", "-xvf", "archive.tar", "extra"]).unwrap();
    let results = parser.results().unwrap();

    assert!(results.is_present("-x").unwrap());
    assert!(results.is_present("-v").unwrap());
    assert_eq!(results.get("--file").unwrap().value(), Some("archive.tar"));
    assert_eq!(results.rest(), &["extra".to_string()]);
}

#[test]
fn test_invalid_declarations_in_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "bad.json",
        r#"{"version": "1.0", "options": [{"switches": ["--trailing-"]}]}"#,
    );

    let manifest = Manifest::load(&path).unwrap();
    assert!(matches!(
        manifest.parser(),
        Err(ManifestError::ConfigError(ConfigError::InvalidLongSwitch(_)))
    ));
}

#[test]
fn test_strict_manifest_rejects_stray_tokens() {
    let manifest = Manifest::from_yaml_str(
        r#"
version: "1.0"
settings:
  unmatched_positionals: reject
options:
  - switches: ["-q"]
"#,
    )
    .unwrap();

    let mut parser = manifest.parser().unwrap();
    let err = parser.parse(&["prog", "-q", "stray"]).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedPositional(ref t) if t == "stray"));
}
