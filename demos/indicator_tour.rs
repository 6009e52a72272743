// Demo: a tour of the built-in indicator functions over a small fixed
// bar set. Run with: cargo run --example indicator_tour

use formula::{Bar, FormulaEngine, FormulaResult};

fn sample_bars() -> Vec<Bar> {
    vec![
        Bar::new(100.0, 107.0, 99.0, 105.0, 1000.0, 100_000.0),
        Bar::new(105.0, 108.0, 102.0, 103.0, 1100.0, 110_000.0),
        Bar::new(103.0, 109.0, 101.0, 107.0, 1200.0, 120_000.0),
        Bar::new(107.0, 112.0, 106.0, 110.0, 1300.0, 130_000.0),
        Bar::new(110.0, 113.0, 107.0, 108.0, 1400.0, 140_000.0),
        Bar::new(108.0, 114.0, 107.0, 111.0, 1500.0, 150_000.0),
        Bar::new(111.0, 115.0, 108.0, 109.0, 1600.0, 160_000.0),
        Bar::new(109.0, 116.0, 108.0, 112.0, 1700.0, 170_000.0),
        Bar::new(112.0, 117.0, 110.0, 115.0, 1800.0, 180_000.0),
        Bar::new(115.0, 118.0, 112.0, 113.0, 1900.0, 190_000.0),
    ]
}

fn print_result(title: &str, result: &FormulaResult) {
    println!("{}", title);
    for line in &result.outputs {
        let values: Vec<String> = line
            .data
            .iter()
            .map(|v| if v.is_nan() { "NaN".to_string() } else { format!("{:.2}", v) })
            .collect();
        println!("  {}: [{}]", line.name, values.join(", "));
    }
    for (name, value) in &result.variables {
        println!("  {} = {}", name, value);
    }
    println!();
}

fn main() {
    let bars = sample_bars();
    let engine = FormulaEngine::new();

    let demos = [
        ("1. Simple moving average", "MA5 := MA(CLOSE, 5)"),
        ("2. Exponential moving average", "EMA5 := EMA(CLOSE, 5)"),
        ("3. Standard deviation", "STD5 := STD(CLOSE, 5)"),
        ("4. Weighted moving average", "WMA5 := WMA(CLOSE, 5)"),
        ("5. Trailing extrema", "HH := HHV(HIGH, 3)\nLL := LLV(LOW, 3)"),
        ("6. Lookback", "PREV := REF(CLOSE, 1)\nCHG := CLOSE - REF(CLOSE, 1)"),
        ("7. Conditions", "UP := CLOSE > OPEN\nSTREAK := EVERY(CLOSE > OPEN, 2)"),
        ("8. Range check", "INBAND := BETWEEN(CLOSE, 104, 112)"),
        (
            "9. Crossing with style metadata",
            "FAST : MA(CLOSE, 2), COLOR red, LINETHICK 2\nSLOW : MA(CLOSE, 4), COLOR blue\nSIG := CROSS(FAST, SLOW)",
        ),
    ];

    println!("=== formula indicator tour ===\n");
    for (title, source) in demos {
        match engine.run(source, &bars) {
            Ok(result) => print_result(title, &result),
            Err(e) => eprintln!("{}: {}", title, e.pretty()),
        }
    }
}
