// Demo: MA cross strategy - golden cross and death cross detection.
//
// Golden cross: fast MA crosses above slow MA (bullish signal).
// Death cross: slow MA crosses above fast MA (bearish signal).
//
// Bars come from a quote service when FORMULA_QUOTE_URL is set (first
// argument is the symbol), otherwise from a synthetic random walk.
//
// Run with: cargo run --example ma_cross [SYMBOL]

use formula::market::random_walk;
use formula::quotes::QuoteClient;
use formula::{Bar, FormulaEngine};
use std::env;

fn load_bars() -> Vec<Bar> {
    let symbol = env::args().nth(1).unwrap_or_else(|| "sz000001".to_string());

    if let Ok(endpoint) = env::var("FORMULA_QUOTE_URL") {
        match QuoteClient::new(endpoint).and_then(|c| c.fetch_daily(&symbol, 120)) {
            Ok(bars) => {
                println!("fetched {} bars for {}", bars.len(), symbol);
                return bars;
            }
            Err(e) => eprintln!("quote fetch failed ({}), using synthetic bars", e),
        }
    }

    random_walk(120, 100.0)
}

fn run_strategy(engine: &FormulaEngine, bars: &[Bar], fast: usize, slow: usize) {
    println!("--- MA{}/MA{} cross ---", fast, slow);

    let source = format!(
        "FAST := MA(CLOSE, {fast})\nSLOW := MA(CLOSE, {slow})\n\
         GOLDEN := CROSS(FAST, SLOW)\nDEATH := CROSS(SLOW, FAST)"
    );

    let result = match engine.run(&source, bars) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", e.pretty());
            return;
        }
    };

    let golden = &result.output("GOLDEN").unwrap().data;
    let death = &result.output("DEATH").unwrap().data;

    let mut signals = 0;
    for i in 0..bars.len() {
        if golden[i] == 1.0 {
            println!("  bar {:3}: golden cross at close {:.2}", i, bars[i].close);
            signals += 1;
        }
        if death[i] == 1.0 {
            println!("  bar {:3}: death cross at close {:.2}", i, bars[i].close);
            signals += 1;
        }
    }
    if signals == 0 {
        println!("  no crossings in this window");
    }
    println!();
}

fn main() {
    let bars = load_bars();
    let engine = FormulaEngine::new();

    run_strategy(&engine, &bars, 5, 10);
    run_strategy(&engine, &bars, 10, 20);
    run_strategy(&engine, &bars, 20, 60);
}
