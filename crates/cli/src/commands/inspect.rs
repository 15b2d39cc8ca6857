use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::Serialize;
use typegap_core::{Generator, RouteSummary, TypeSummary};

use crate::project::{ProjectConfig, load_description};

#[derive(ValueEnum, Clone, Debug, Copy, Default, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum Format {
    /// One route per line
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// API description document (JSON, or TOML by extension)
    #[arg(long, short = 'd', value_name = "FILE")]
    pub description: PathBuf,
    /// Configuration file [default: ./typegap.toml if present]
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub routes: Vec<RouteSummary>,
    pub types: Vec<TypeSummary>,
    pub diagnostics: Vec<String>,
}

pub fn run(args: InspectArgs) -> i32 {
    match inspect(&args).and_then(|report| render(&report, args.format)) {
        Ok(text) => {
            print!("{text}");
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

pub fn inspect(args: &InspectArgs) -> Result<Report, String> {
    let project = ProjectConfig::load(args.config.as_deref())?;
    let description = load_description(&args.description)?;
    let output = Generator::from_description(project.generator, description)
        .and_then(|generator| generator.generate())
        .map_err(|err| err.to_string())?;
    Ok(Report {
        routes: output.routes,
        types: output.types,
        diagnostics: output.diagnostics.iter().map(ToString::to_string).collect(),
    })
}

pub fn render(report: &Report, format: Format) -> Result<String, String> {
    match format {
        Format::Json => serde_json::to_string_pretty(report)
            .map(|json| json + "\n")
            .map_err(|err| format!("Failed to serialize report: {err}")),
        Format::Text => {
            let mut out = String::new();
            for route in &report.routes {
                out.push_str(&format!(
                    "{:<6} {} -> {}.{}",
                    route.http_method, route.template, route.controller, route.method_name
                ));
                if let Some(body) = &route.body {
                    out.push_str(&format!(" body={body}"));
                }
                if !route.query.is_empty() {
                    out.push_str(&format!(" query={}", route.query.join(",")));
                }
                out.push('\n');
            }
            for ty in &report.types {
                out.push_str(&format!("{:<12} {}\n", ty.kind, ty.name));
            }
            for diagnostic in &report.diagnostics {
                out.push_str(&format!("warning: {diagnostic}\n"));
            }
            Ok(out)
        }
    }
}
