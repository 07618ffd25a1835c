use std::fmt;
use std::path::{Path, PathBuf};

use argdispatch_core::{DispatchTable, ParseReport, POSITIONAL_NAME};
use argdispatch_manifest::{Manifest, ManifestError};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for tables and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "argdispatch")]
#[command(about = "Check option manifests and run argument parses against them")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a manifest's option declarations.
    Check(CheckArgs),
    /// Print the compiled dispatch table of a manifest.
    Table(TableArgs),
    /// Parse tokens against a manifest and print what was captured.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Manifest file (.yml, .yaml or .json).
    manifest: PathBuf,
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Manifest file (.yml, .yaml or .json).
    manifest: PathBuf,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Manifest file (.yml, .yaml or .json).
    manifest: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Program name reported as token 0 (defaults to the manifest's program).
    #[arg(long)]
    program: Option<String>,
    /// Tokens to parse, after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

/// A failed subcommand and the exit status it maps to.
#[derive(Debug)]
enum Failure {
    /// Manifest could not be read or its declarations are invalid.
    Config(String),
    /// The tokens were rejected.
    Parse(String),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Parse(_) => 2,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) | Self::Parse(msg) => f.write_str(msg),
        }
    }
}

impl From<ManifestError> for Failure {
    fn from(err: ManifestError) -> Self {
        Self::Config(err.to_string())
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Table(args) => run_table(args),
        Command::Parse(args) => run_parse(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_check(args: CheckArgs) -> Result<(), Failure> {
    let manifest = load_manifest(&args.manifest)?;
    manifest.validate()?;
    println!("ok: {} options", manifest.options.len());
    Ok(())
}

fn run_table(args: TableArgs) -> Result<(), Failure> {
    let manifest = load_manifest(&args.manifest)?;
    let table = manifest.dispatch_table()?;
    let view = TableView::new(&manifest, &table);

    let raw = match args.format {
        CliOutputFormat::Json => to_json(&view)?,
        CliOutputFormat::Yaml => to_yaml(&view)?,
        CliOutputFormat::Table => render_table(&view),
    };
    print!("{raw}");
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), Failure> {
    let manifest = load_manifest(&args.manifest)?;
    let mut parser = manifest.parser()?;

    let program = args
        .program
        .or_else(|| manifest.program.clone())
        .unwrap_or_else(|| "prog".to_string());
    let mut argv = Vec::with_capacity(args.tokens.len() + 1);
    argv.push(program);
    argv.extend(args.tokens);
    debug!(tokens = argv.len() - 1, program = %argv[0], "Parsing tokens");

    parser
        .parse(&argv)
        .map_err(|err| Failure::Parse(err.to_string()))?;
    let report = parser
        .results()
        .map_err(|err| Failure::Parse(err.to_string()))?
        .report();

    let raw = match args.format {
        CliOutputFormat::Json => to_json(&report)?,
        CliOutputFormat::Yaml => to_yaml(&report)?,
        CliOutputFormat::Table => render_report(&report),
    };
    print!("{raw}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_manifest(path: &Path) -> Result<Manifest, Failure> {
    Manifest::load(path)
        .map_err(|err| Failure::Config(format!("Failed to load '{}': {err}", path.display())))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, Failure> {
    serde_json::to_string_pretty(value)
        .map(|mut raw| {
            raw.push('\n');
            raw
        })
        .map_err(|e| Failure::Config(format!("JSON serialization failed: {e}")))
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String, Failure> {
    serde_yaml::to_string(value)
        .map_err(|e| Failure::Config(format!("YAML serialization failed: {e}")))
}

/// Printable view of a dispatch table, one row per switch spelling.
#[derive(Debug, Serialize)]
struct TableView {
    #[serde(skip_serializing_if = "Option::is_none")]
    program: Option<String>,
    switches: Vec<TableRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    positional: Option<usize>,
}

#[derive(Debug, Serialize)]
struct TableRow {
    switch: String,
    option: usize,
    name: String,
    arity: usize,
}

impl TableView {
    fn new(manifest: &Manifest, table: &DispatchTable) -> Self {
        let name_of = |index: usize| {
            manifest
                .options
                .get(index)
                .map(|decl| decl.canonical_name().to_string())
                .unwrap_or_default()
        };

        let short = table.short_entries().map(|(c, entry)| (format!("-{c}"), entry));
        let long = table
            .long_entries()
            .map(|(name, entry)| (format!("--{name}"), entry));
        let switches = short
            .chain(long)
            .map(|(switch, entry)| TableRow {
                switch,
                option: entry.option.index(),
                name: name_of(entry.option.index()),
                arity: entry.arity,
            })
            .collect();

        Self {
            program: manifest.program.clone(),
            switches,
            positional: table.positional().map(|id| id.index()),
        }
    }
}

fn render_table(view: &TableView) -> String {
    let mut out = String::new();
    if let Some(program) = &view.program {
        out.push_str(&format!("program: {program}\n"));
    }
    out.push_str(&format!("{:<20} {:>6} {:>5}  {}\n", "SWITCH", "OPTION", "ARITY", "NAME"));
    for row in &view.switches {
        out.push_str(&format!(
            "{:<20} {:>6} {:>5}  {}\n",
            row.switch, row.option, row.arity, row.name
        ));
    }
    if let Some(index) = view.positional {
        out.push_str(&format!("{POSITIONAL_NAME:<20} {index:>6} {:>5}\n", 1));
    }
    out
}

fn render_report(report: &ParseReport) -> String {
    let mut out = String::new();
    if let Some(program) = &report.program {
        out.push_str(&format!("program: {program}\n"));
    }
    for option in &report.options {
        let values: Vec<String> = option
            .occurrences
            .iter()
            .map(|occurrence| occurrence.join(" "))
            .collect();
        let marker = if option.present { "yes" } else { "no" };
        out.push_str(&format!(
            "{:<20} {:<4} {}\n",
            option.name,
            marker,
            values.join(" | ")
        ));
    }
    if !report.rest.is_empty() {
        out.push_str(&format!("rest: {}\n", report.rest.join(" ")));
    }
    out
}
