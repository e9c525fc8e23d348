use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;
use tracing::debug;

use qti_migrator::{
    config::{Config, ConfigError},
    logging::{init_logging, LogConfig},
    reporter::ReportError,
    xml,
    AnalysisReporter, MigrationError, MigrationRequest, ReportFormat, SchemaTransformationEngine,
};

/// Standard stream placeholder for `--input` and `--output`.
const STDIO: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "qti-migrator")]
#[command(about = "Migrate IMS QTI assessment documents between schema versions")]
struct Cli {
    /// Config file (defaults to ~/.qti-migrator.yaml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Report detail, 0 (counts only) to 3 (everything)
    #[arg(short, long, global = true, value_name = "0-3",
          value_parser = clap::value_parser!(u8).range(0..=3))]
    verbosity: Option<u8>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze and migrate a QTI document
    Migrate(MigrateArgs),
    /// Print the version
    Version,
}

#[derive(Args, Debug)]
struct MigrateArgs {
    /// Input file, or - for stdin
    #[arg(short, long, default_value = STDIO)]
    input: String,

    /// Output file, or - for stdout
    #[arg(short, long, default_value = STDIO)]
    output: String,

    /// Source QTI version (e.g. 1.2, 2.1, 2.2)
    #[arg(short, long)]
    from: String,

    /// Target QTI version (e.g. 2.1, 3.0)
    #[arg(short, long)]
    to: String,

    /// Only print the analysis report
    #[arg(short, long)]
    preview: bool,

    /// Overwrite an existing output file
    #[arg(long)]
    force: bool,

    /// Report format: text, json or yaml
    #[arg(long, value_name = "FORMAT")]
    report_format: Option<ReportFormat>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("output file already exists: {0} (use --force to overwrite)")]
    OutputExists(String),

    #[error("migration cannot proceed due to errors. See report above for details")]
    Blocked,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("\n❌ Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Version => {
            println!("qti-migrator v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Migrate(args) => {
            let config = Config::resolve(cli.config.as_deref())?;
            let verbosity = cli.verbosity.unwrap_or(config.verbosity);

            let log_config = LogConfig::from_verbosity(verbosity).with_format(config.log_format);
            if let Err(e) = init_logging(&log_config) {
                eprintln!("warning: logging disabled: {}", e);
            }

            migrate(&args, &config, verbosity)
        }
    }
}

fn migrate(args: &MigrateArgs, config: &Config, verbosity: u8) -> Result<(), CliError> {
    let force = args.force || config.force;
    if args.output != STDIO && Path::new(&args.output).exists() && !force {
        return Err(CliError::OutputExists(args.output.clone()));
    }

    let xml = read_input(&args.input)?;
    debug!(input = %args.input, bytes = xml.len(), "read input");

    let request = MigrationRequest::new(args.from.as_str(), args.to.as_str())
        .with_preview(args.preview)
        .with_verbosity(verbosity);
    let engine = SchemaTransformationEngine::default();
    let result = engine.run(&xml, &request)?;

    if verbosity >= 1 || args.preview || result.is_blocked() {
        let reporter =
            AnalysisReporter::new().with_format(args.report_format.unwrap_or(config.report_format));
        eprintln!("{}", reporter.format_report(&result.report)?);
    }

    if result.is_blocked() {
        return Err(CliError::Blocked);
    }

    let Some(output) = result.output else {
        return Ok(());
    };

    write_output(&args.output, &output)?;
    if args.output != STDIO && verbosity >= 1 {
        eprintln!("Migration completed successfully. Output written to: {}", args.output);
    }
    Ok(())
}

fn read_input(path: &str) -> Result<String, MigrationError> {
    let mut bytes = Vec::new();
    let read = if path == STDIO {
        io::stdin().read_to_end(&mut bytes).map(|_| ())
    } else {
        fs::File::open(path).and_then(|mut file| file.read_to_end(&mut bytes).map(|_| ()))
    };
    read.map_err(|source| MigrationError::io(path, source))?;
    xml::decode_input(bytes)
}

fn write_output(path: &str, content: &str) -> Result<(), MigrationError> {
    let written = if path == STDIO {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes()).and_then(|_| stdout.flush())
    } else {
        fs::write(path, content)
    };
    written.map_err(|source| MigrationError::io(path, source))
}
