// File: src/main.rs
//
// Command-line entry point for the formula engine.
// Dispatches to run (formula file), eval (inline source), fetch (quote
// service), or repl. Bars come from a CSV/JSON file when --data is given,
// otherwise a synthetic random walk so formulas can be tried instantly.

use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use formula::market::{self, Bar};
use formula::quotes::QuoteClient;
use formula::repl::Repl;
use formula::{FormulaEngine, FormulaResult};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(ClapParser)]
#[command(
    name = "formula",
    about = "Compile and run technical-indicator formulas over market data",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a formula file
    Run {
        /// Path to the formula source file
        file: PathBuf,
        /// CSV or JSON bar file (synthetic bars when omitted)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Number of synthetic bars when no data file is given
        #[arg(long, default_value_t = 120)]
        bars: usize,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate formula source given on the command line
    Eval {
        /// Formula source, statements separated by ';' or newlines
        source: String,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long, default_value_t = 120)]
        bars: usize,
        #[arg(long)]
        json: bool,
    },

    /// Run a formula over bars fetched from a quote service
    Fetch {
        /// Symbol to fetch, e.g. sz000001
        symbol: String,
        /// Formula source to run over the fetched bars
        source: String,
        /// Base URL of the candle endpoint
        #[arg(long)]
        endpoint: String,
        /// Number of daily bars to request
        #[arg(long, default_value_t = 120)]
        count: usize,
        #[arg(long)]
        json: bool,
    },

    /// Launch the interactive REPL
    Repl {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long, default_value_t = 120)]
        bars: usize,
    },
}

fn main() -> ExitCode {
    match dispatch(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Run { file, data, bars, json } => {
            let source = fs::read_to_string(&file)?;
            let bars = load_bars(data.as_deref(), bars)?;
            run_source(&source, &bars, json)
        }
        Commands::Eval { source, data, bars, json } => {
            let bars = load_bars(data.as_deref(), bars)?;
            run_source(&source, &bars, json)
        }
        Commands::Fetch { symbol, source, endpoint, count, json } => {
            let client = QuoteClient::new(endpoint)?;
            let bars = client.fetch_daily(&symbol, count)?;
            println!("fetched {} bars for {}", bars.len(), symbol);
            run_source(&source, &bars, json)
        }
        Commands::Repl { data, bars } => {
            let bars = load_bars(data.as_deref(), bars)?;
            Repl::new(bars)?.run()
        }
    }
}

fn load_bars(data: Option<&std::path::Path>, synthetic: usize) -> Result<Vec<Bar>, Box<dyn Error>> {
    match data {
        Some(path) => market::load_bars(path),
        None => Ok(market::random_walk(synthetic, 100.0)),
    }
}

fn run_source(source: &str, bars: &[Bar], json: bool) -> Result<(), Box<dyn Error>> {
    let engine = FormulaEngine::new();
    match engine.run(source, bars) {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.pretty());
            Err("formula failed".into())
        }
    }
}

fn print_result(result: &FormulaResult) {
    for line in &result.outputs {
        let values: Vec<String> = line
            .data
            .iter()
            .map(|v| {
                if v.is_nan() {
                    "NaN".to_string()
                } else {
                    format!("{:.4}", v)
                }
            })
            .collect();
        println!("{}: [{}]", line.name.bright_green().bold(), values.join(", "));
    }

    if !result.variables.is_empty() {
        let mut names: Vec<&String> = result.variables.keys().collect();
        names.sort();
        for name in names {
            println!("{} = {}", name.bright_yellow(), result.variables[name]);
        }
    }
}
