//! CLI tool for annostyle - styles a JSON table and outputs JSON cells
//!
//! Usage:
//!   annostyle_cli <table.json>                         # Output JSON to stdout
//!   annostyle_cli <table.json> rules.json              # Apply a rule set first
//!   annostyle_cli <table.json> [rules.json] -o out.json  # Output JSON to file
//!   annostyle_cli <table.json> -c config.json          # Engine configuration

use annostyle::{style_table_json, EngineConfig};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

const USAGE: &str =
    "Usage: annostyle_cli <table.json> [rules.json] [-c config.json] [-o output.json]";

struct Args {
    table: String,
    rules: Option<String>,
    config: Option<String>,
    output: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Option<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut output = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" => output = Some(args.next()?),
            "-c" => config = Some(args.next()?),
            _ => positional.push(arg),
        }
    }
    let mut positional = positional.into_iter();
    let table = positional.next()?;
    let rules = positional.next();
    if positional.next().is_some() {
        return None;
    }
    Some(Args {
        table,
        rules,
        config,
        output,
    })
}

fn read(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Error reading {path}: {e}"))
}

fn run(args: &Args) -> Result<(), String> {
    let table = read(&args.table)?;
    let rules = args.rules.as_deref().map(read).transpose()?;
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .map_err(|e| format!("Error loading config {path}: {e}"))?,
        None => EngineConfig::default(),
    };

    let json = style_table_json(&table, rules.as_deref(), config)
        .map_err(|e| format!("Error styling {}: {e}", args.table))?;

    match &args.output {
        Some(path) => {
            fs::write(path, &json).map_err(|e| format!("Error writing {path}: {e}"))?;
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(json.as_bytes())
                .and_then(|()| writeln!(stdout))
                .map_err(|e| format!("Error writing output: {e}"))?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let Some(args) = parse_args(env::args().skip(1)) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
