//! drawio-libgen CLI
//!
//! Usage:
//!   drawio-libgen [OPTIONS]
//!
//! Options:
//!   -i, --input <DIR>      Folder with one subfolder per style [default: svg]
//!   -o, --output <DIR>     Folder receiving the libraries [default: draw.io_libraries]
//!   -c, --config <FILE>    Configuration file (TOML format)
//!   -r, --rule <RULE>      Title rule STYLE=TEXT or STYLE=FIND=REPLACE
//!   --show-subvariant      Keep the subvariant name in titles
//!   --no-title-cleanup     Do not apply title rules
//!   -v, --verbose          More log output (repeatable)
//!   -q, --quiet            Only log errors
//!   -h, --help             Print help

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use drawio_libgen::config::parse_rule;
use drawio_libgen::{generate_libraries, Config, LibraryError};

#[derive(Parser)]
#[command(name = "drawio-libgen")]
#[command(about = "Build draw.io shape libraries from folders of SVG icons")]
struct Cli {
    /// Folder with one subfolder per style
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Folder receiving the generated libraries
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Title rule for a style: STYLE=TEXT removes TEXT, STYLE=FIND=REPLACE replaces FIND
    #[arg(short, long = "rule", value_name = "RULE")]
    rules: Vec<String>,

    /// Keep the subvariant name in titles
    #[arg(long)]
    show_subvariant: bool,

    /// Do not apply title rules
    #[arg(long)]
    no_title_cleanup: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log_level(&cli));
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(1);
        }
    };

    let result = generate_libraries(&config, |context| {
        println!("Generating library for {}", context.library_name());
    });

    match result {
        Ok(written) => {
            for path in &written {
                log::debug!("wrote '{}'", path.display());
            }
            println!("Finished");
        }
        Err(e) => {
            report_error(&e);
            process::exit(1);
        }
    }
}

fn log_level(cli: &Cli) -> log::LevelFilter {
    if cli.quiet {
        return log::LevelFilter::Error;
    }
    match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

/// Defaults, then the config file, then command-line flags
fn build_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .map_err(|e| format!("loading config '{}': {}", path.display(), e))?,
        None => Config::default(),
    };

    if let Some(input) = &cli.input {
        config = config.with_input(input);
    }
    if let Some(output) = &cli.output {
        config = config.with_output(output);
    }
    if cli.show_subvariant {
        config = config.with_hide_subvariant(false);
    }
    if cli.no_title_cleanup {
        config = config.with_title_cleanup(false);
    }
    for spec in &cli.rules {
        let (style, rule) = parse_rule(spec).map_err(|e| e.to_string())?;
        config = config.with_rule(style, rule);
    }

    Ok(config)
}

/// Print an error, with a source excerpt when the location is known
fn report_error(error: &LibraryError) {
    eprintln!("Error: {}", error);

    let convert_error = error.convert_error();
    if convert_error.span().is_none() {
        return;
    }
    if let Ok(source) = fs::read_to_string(convert_error.path()) {
        if let Some(report) = convert_error.format(&source) {
            eprint!("{}", report);
        }
    }
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            match record.level() {
                log::Level::Error => eprintln!("Error: {}", record.args()),
                log::Level::Warn => eprintln!("Warning: {}", record.args()),
                log::Level::Info => eprintln!("Info: {}", record.args()),
                log::Level::Debug => eprintln!("Debug: {}", record.args()),
                log::Level::Trace => eprintln!("Trace: {}", record.args()),
            }
        }
    }

    fn flush(&self) {}
}
