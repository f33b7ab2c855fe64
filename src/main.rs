//! bmson-timing — print the normalized timing structure of a bmson chart.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};

use bmson_timing::chart::Bmson;
use bmson_timing::config::{Config, OutputFormat};
use bmson_timing::timing::TimingDirective;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// bmson chart to read.
    chart: PathBuf,
    /// Output format (overrides the config file).
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Reject non-finite or non-positive tempos.
    #[arg(long)]
    strict: bool,
    /// Single-line JSON output.
    #[arg(long)]
    compact: bool,
    /// Config file (default: ~/.bmson-timing/config.yaml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Writes log records to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn render(
    directives: &[TimingDirective],
    format: OutputFormat,
    pretty: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let text = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(directives)?,
        OutputFormat::Json => serde_json::to_string(directives)?,
        OutputFormat::Yaml => serde_yaml::to_string(directives)?,
    };
    Ok(text)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let level = match cli.verbose {
        0 => config.level_filter(),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    init_logger(level);

    let chart = Bmson::from_path(&cli.chart)?;
    let directives = if cli.strict || config.strict {
        chart.timing_structure_checked()?
    } else {
        chart.timing_structure()
    };

    let format = cli.format.unwrap_or(config.format);
    let pretty = config.pretty && !cli.compact;
    let text = render(&directives, format, pretty)?;
    println!("{}", text.trim_end());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
