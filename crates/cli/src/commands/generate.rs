use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};
use typegap_core::Generator;

use crate::project::{ProjectConfig, load_description, output_files, write_files};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// API description document (JSON, or TOML by extension)
    #[arg(long, short = 'd', value_name = "FILE")]
    pub description: PathBuf,
    /// Configuration file [default: ./typegap.toml if present]
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Output directory, overriding `[output] dir`
    #[arg(long = "out-dir", short = 'o', value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
    /// Compare against the files on disk instead of writing them
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written { written: usize, unchanged: usize },
    UpToDate,
    /// Files whose generated contents differ from disk.
    Stale(Vec<PathBuf>),
}

pub fn run(args: GenerateArgs) -> i32 {
    match generate(&args) {
        Ok(Outcome::Written { written, unchanged }) => {
            println!("generated {written} file(s), {unchanged} unchanged");
            0
        }
        Ok(Outcome::UpToDate) => {
            println!("up to date");
            0
        }
        Ok(Outcome::Stale(paths)) => {
            eprintln!("{} generated file(s) are out of date", paths.len());
            2
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

pub fn generate(args: &GenerateArgs) -> Result<Outcome, String> {
    let project = ProjectConfig::load(args.config.as_deref())?;
    let description = load_description(&args.description)?;
    let out_dir = args.out_dir.clone().unwrap_or_else(|| project.output.dir.clone());

    let generator = Generator::from_description(project.generator, description).map_err(|err| err.to_string())?;
    let output = generator.generate().map_err(|err| err.to_string())?;
    for diagnostic in &output.diagnostics {
        warn!(type_name = %diagnostic.type_name, "{}", diagnostic.message);
    }

    let files = output_files(&output, &project.output, &out_dir);
    if args.check {
        let mut stale = Vec::new();
        for file in &files {
            if !file.is_current()? {
                print!("{}", file.diff()?);
                stale.push(file.path.clone());
            }
        }
        return Ok(if stale.is_empty() {
            Outcome::UpToDate
        } else {
            Outcome::Stale(stale)
        });
    }

    let mut changed = Vec::new();
    for file in &files {
        if !file.is_current()? {
            changed.push(file);
        }
    }
    write_files(&changed)?;
    let written = changed.len();
    info!(
        out_dir = %out_dir.display(),
        written,
        routes = output.routes.len(),
        types = output.types.len(),
        "Client generated."
    );
    Ok(Outcome::Written {
        written,
        unchanged: files.len() - written,
    })
}
