#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]

use std::ffi::OsString;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub mod commands;
pub mod project;

#[derive(Parser, Debug)]
#[command(
    name = "typegap",
    version,
    about = "Generate a typed TypeScript client for an HTTP API"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate definitions, enums and service proxies
    Generate(commands::generate::GenerateArgs),
    /// Show the compiled routes and discovered types
    Inspect(commands::inspect::InspectArgs),
}

/// Run with the process arguments and return the exit code.
pub fn run() -> i32 {
    run_from(std::env::args_os())
}

pub fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => {
            init_tracing();
            match cli.command {
                Some(Commands::Generate(args)) => commands::generate::run(args),
                Some(Commands::Inspect(args)) => commands::inspect::run(args),
                None => {
                    let mut cmd = Cli::command();
                    let _ = cmd.print_help();
                    println!();
                    0
                }
            }
        }
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn init_tracing() {
    // TYPEGAP_LOG takes a plain level ("debug") or a full filter spec
    let filter = match std::env::var("TYPEGAP_LOG") {
        Ok(level) if is_plain_level(&level) => format!("typegap_core={level},typegap_cli={level}"),
        Ok(spec) => spec,
        Err(_) => "typegap_core=info,typegap_cli=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    // Tests drive the CLI repeatedly in one process.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}
