use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use comment_roundtrip::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "comment-roundtrip",
    version,
    about = "Embed EXIF comments into a PNG and a JPEG, read them back, and fail on any difference"
)]
struct Cli {
    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Directory the fixture and output paths are relative to
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(0);
    }

    let mut config = config::Config::load(cli.config.as_deref())?;

    // Override root from CLI flag
    if let Some(ref root) = cli.root {
        config.files.root = root.clone();
    }

    println!("Starting Comment Tests...");
    let summary = pipeline::run_all(&config);

    for report in &summary.scenarios {
        let name = report.format.name();
        match report.error {
            None => println!("{name} Comment Test Passed"),
            Some(ref err) => eprintln!("{name} Comment Test Failed: {err}"),
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if summary.passed() {
        println!("All Comment Tests Passed.");
    }

    Ok(summary.exit_code())
}
