use anyhow::{Context, Result};
use argscan::{HelpConfig, OptionParser};
use serde::Serialize;
use std::ffi::OsString;
use tracing_subscriber::{EnvFilter, fmt};

/// Overrides the maximum width of the option column in `--help`.
const HELP_WIDTH_ENV: &str = "ARGSCAN_HELP_WIDTH";

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    verbosity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
    positionals: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let config = help_config_from_env()?;
    let mut args = match utf8_args(std::env::args_os()) {
        Ok(args) => args,
        Err(bad) => usage_error(format!("argument is not valid UTF-8: {bad}")),
    };

    let mut verbose: Vec<bool> = Vec::new();
    let mut output: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut count: Option<u32> = None;
    let mut json = false;

    let shown_help = {
        let mut parser = OptionParser::new().with_config(config);
        parser
            .set_banner("Usage: argscan [OPTIONS] [ARGS]...")
            .register("v,verbose", &mut verbose, "Increase verbosity (repeatable)")
            .register("o,output", &mut output, "Output path")
            .register("t,tag", &mut tags, "Add a tag (repeatable)")
            .register("n,count", &mut count, "Number of iterations")
            .register("json", &mut json, "Print the report as JSON");

        if let Err(err) = parser.parse(&mut args) {
            usage_error(err);
        }
        parser.has_shown_help()
    };
    if shown_help {
        return Ok(());
    }

    let report = Report {
        verbosity: verbose.len(),
        output,
        tags,
        count,
        positionals: args.into_iter().skip(1).collect(),
    };
    tracing::debug!(?report, "parsed command line");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Collect process arguments, stopping at the first one that is not UTF-8.
fn utf8_args(raw: impl IntoIterator<Item = OsString>) -> Result<Vec<String>, String> {
    raw.into_iter()
        .map(|arg| arg.into_string().map_err(|bad| bad.to_string_lossy().into_owned()))
        .collect()
}

fn usage_error(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    eprintln!("Run with --help to see available options.");
    std::process::exit(2);
}

fn print_report(report: &Report) {
    println!("verbosity: {}", report.verbosity);
    if let Some(output) = &report.output {
        println!("output: {output}");
    }
    if !report.tags.is_empty() {
        println!("tags: {}", report.tags.join(", "));
    }
    if let Some(count) = report.count {
        println!("count: {count}");
    }
    for arg in &report.positionals {
        println!("arg: {arg}");
    }
}

fn help_config_from_env() -> Result<HelpConfig> {
    let mut config = HelpConfig::default();
    if let Ok(raw) = std::env::var(HELP_WIDTH_ENV) {
        config.max_column_width = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {HELP_WIDTH_ENV} value: {raw:?}"))?;
    }
    Ok(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
