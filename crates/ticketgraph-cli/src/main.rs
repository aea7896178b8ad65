#![forbid(unsafe_code)]

use anyhow::{Context as _, Result};
use clap::Parser;
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use ticketgraph_core::config::{Config, resolve_config};
use ticketgraph_core::{CsvSource, HeaderNames, Options, merge_sources, write_diagram};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Path value meaning stdin for `--in` and stdout for `--out`.
const STDIO_PATH: &str = "-";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tgraph: render issue-tracker blocking links as a PlantUML diagram",
    long_about = None,
    after_help = "EXAMPLES:\n    # Convert an export using the defaults (tickets.csv -> tickets.txt)\n    tgraph\n\n    # Merge a second project's export and highlight two tickets\n    tgraph --in web.csv --supplemental api.csv --highlight-keys WEB-4,API-9\n\n    # Keep orphans, drop summaries, write to stdout\n    tgraph --in web.csv --out - --hide-orphans false --hide-summary"
)]
struct Cli {
    /// CSV export to process (`-` reads stdin).
    #[arg(long = "in", value_name = "PATH", default_value = "tickets.csv")]
    input: PathBuf,

    /// Diagram file to create (`-` writes stdout).
    #[arg(long, value_name = "PATH", default_value = "tickets.txt")]
    out: PathBuf,

    /// Extra export merged before the main one; failures are only logged.
    #[arg(long, value_name = "PATH")]
    supplemental: Option<PathBuf>,

    /// Don't show ticket summaries.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    hide_summary: Option<bool>,

    /// Don't show tickets without relationships [default: true].
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    hide_orphans: Option<bool>,

    /// Don't show these tickets (comma delimited).
    #[arg(long, value_name = "KEYS", value_delimiter = ',')]
    hide_keys: Vec<String>,

    /// Always show these tickets, even if hidden or orphaned (comma delimited).
    #[arg(long, value_name = "KEYS", value_delimiter = ',')]
    show_keys: Vec<String>,

    /// Highlight these tickets (comma delimited).
    #[arg(long, value_name = "KEYS", value_delimiter = ',')]
    highlight_keys: Vec<String>,

    /// Color for highlighted tickets [default: paleGreen].
    #[arg(long, value_name = "COLOR")]
    highlight_color: Option<String>,

    /// Point at which PlantUML starts wrapping text [default: 150].
    #[arg(long, value_name = "N")]
    wrap_width: Option<u32>,

    /// Config file (default: ./ticketgraph.toml, then the user config dir).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layer flags over the config file. Key lists given on the command line
    /// replace the config file's lists.
    fn options(&self, config: &Config) -> Options {
        let mut options = Options::from_config(config);

        if let Some(hide_summary) = self.hide_summary {
            options.hide_summary = hide_summary;
        }
        if let Some(hide_orphans) = self.hide_orphans {
            options.hide_orphans = hide_orphans;
        }
        if !self.hide_keys.is_empty() {
            options.keys.hide = self.hide_keys.iter().collect();
        }
        if !self.show_keys.is_empty() {
            options.keys.show = self.show_keys.iter().collect();
        }
        if !self.highlight_keys.is_empty() {
            options.keys.highlight = self.highlight_keys.iter().collect();
        }
        if let Some(color) = &self.highlight_color {
            options.highlight_color.clone_from(color);
        }
        if let Some(width) = self.wrap_width {
            options.wrap_width = width;
        }

        options
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TICKETGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "ticketgraph=debug,tgraph=debug,info"
        } else {
            "ticketgraph=info,tgraph=info,warn"
        })
    });

    let format = env::var("TICKETGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn read_primary(path: &Path, names: &HeaderNames) -> Result<CsvSource> {
    let source = if path.as_os_str() == STDIO_PATH {
        CsvSource::from_reader("stdin", io::stdin().lock(), names)
    } else {
        CsvSource::open(path, names)
    };
    source.with_context(|| format!("can't read input file ({})", path.display()))
}

/// A failed supplemental source is logged and dropped.
fn read_supplemental(path: &Path, names: &HeaderNames) -> Option<CsvSource> {
    match CsvSource::open(path, names) {
        Ok(source) => Some(source),
        Err(err) => {
            warn!(error = %err, "problem processing supplemental, continuing without it");
            None
        }
    }
}

fn create_output(path: &Path) -> Result<Box<dyn Write>> {
    if path.as_os_str() == STDIO_PATH {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(path)
        .with_context(|| format!("can't create output file ({})", path.display()))?;
    Ok(Box::new(file))
}

fn run(cli: &Cli) -> Result<()> {
    let working_dir = env::current_dir().context("failed to resolve working directory")?;
    let (config, config_path) =
        resolve_config(cli.config.as_deref(), &working_dir).context("failed to load config")?;
    if let Some(path) = &config_path {
        info!(path = %path.display(), "using config");
    }

    let options = cli.options(&config);
    let names = &config.columns;

    let supplemental = cli
        .supplemental
        .as_deref()
        .and_then(|path| read_supplemental(path, names));
    let primary = read_primary(&cli.input, names)?;

    let tickets = merge_sources(supplemental.as_ref(), &primary, &options.keys);

    let sink = create_output(&cli.out)?;
    write_diagram(&tickets, &options, sink).context("processing failed")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    run(&cli)
}
