use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use linkcheck::{scan, Report, ScanOptions};

/// Reports internal links in a static site that point at missing files.
#[derive(Parser, Debug)]
#[command(name = "check-links", version, about)]
struct Args {
    /// Site root to scan.
    #[arg(env = "LINKCHECK_ROOT", default_value = ".")]
    root: PathBuf,

    /// Extension of pages to scan. Repeatable.
    #[arg(long = "ext", default_values_t = ["html".to_string()])]
    extensions: Vec<String>,

    /// Directory name to skip. Repeatable.
    #[arg(long = "skip-dir", default_values_t = ["node_modules".to_string(), ".git".to_string()])]
    skip_dirs: Vec<String>,

    /// Only log warnings and errors.
    #[arg(long, short)]
    quiet: bool,
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &Report) {
    if report.is_clean() {
        println!("OK: No missing internal links found.");
        return;
    }
    println!("Missing links (source file → href → resolved path):");
    for link in &report.missing {
        println!(
            "  {}  →  {}  ({})",
            link.from.display(),
            link.href,
            link.resolved.display()
        );
    }
}

fn run(args: Args) -> anyhow::Result<Report> {
    let options = ScanOptions {
        root: args.root.clone(),
        extensions: args.extensions,
        skip_dirs: args.skip_dirs,
    };
    scan(&options).with_context(|| format!("failed to check links under {}", args.root.display()))
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.quiet);

    match run(args) {
        Ok(report) => {
            print_report(&report);
            if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}
