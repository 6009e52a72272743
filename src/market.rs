// File: src/market.rs
//
// Market data holders and loaders.
// A Bar is one time step's open/high/low/close/volume/amount record; a run
// operates over an ordered slice of bars, index 0 = oldest. The core treats
// the slice as immutable for the duration of a run; validation lives here
// in the data layer, not in the pipeline.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// One OHLCV record. `amount` is the traded amount (volume * price); the
/// timestamp is optional because synthetic and test data rarely carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64, amount: f64) -> Self {
        Bar { open, high, low, close, volume, amount, time: None }
    }

    /// Checks the logical constraints a well-formed bar must satisfy:
    /// high >= low, volume >= 0, amount >= 0.
    pub fn validate(&self) -> Result<(), InvalidBar> {
        if self.high < self.low {
            return Err(InvalidBar(format!(
                "high ({}) must be >= low ({})",
                self.high, self.low
            )));
        }
        if self.volume < 0.0 {
            return Err(InvalidBar(format!("volume must be non-negative, got {}", self.volume)));
        }
        if self.amount < 0.0 {
            return Err(InvalidBar(format!("amount must be non-negative, got {}", self.amount)));
        }
        Ok(())
    }
}

/// A bar that violates the data-layer constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidBar(pub String);

impl fmt::Display for InvalidBar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid bar: {}", self.0)
    }
}

impl Error for InvalidBar {}

/// Loads and validates bars from a CSV or JSON file, chosen by extension.
/// CSV files need an `open,high,low,close,volume,amount` header.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, Box<dyn Error>> {
    let bars: Vec<Bar> = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_reader(File::open(path)?)?,
        _ => {
            let mut reader = csv::Reader::from_path(path)?;
            reader.deserialize().collect::<Result<Vec<Bar>, _>>()?
        }
    };

    for (index, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| format!("bar {}: {}", index, e))?;
    }

    Ok(bars)
}

/// Synthetic random-walk bars for demos and the REPL, when no data file is
/// given. Prices are floored above zero so the bars always validate.
pub fn random_walk(count: usize, start_price: f64) -> Vec<Bar> {
    let mut rng = rand::thread_rng();
    let mut close = start_price;

    (0..count)
        .map(|_| {
            let open = close;
            close = (open + rng.gen_range(-1.5..1.5)).max(1.0);
            let high = open.max(close) + rng.gen_range(0.0..0.8);
            let low = (open.min(close) - rng.gen_range(0.0..0.8)).max(0.5);
            let volume = rng.gen_range(1_000.0..10_000.0_f64).round();
            let amount = volume * close;
            Bar { open, high, low, close, volume, amount, time: None }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_bar_passes() {
        assert!(Bar::new(10.0, 12.0, 9.0, 11.0, 1000.0, 11000.0).validate().is_ok());
    }

    #[test]
    fn high_below_low_is_rejected() {
        let err = Bar::new(10.0, 9.0, 12.0, 11.0, 1000.0, 0.0).validate().unwrap_err();
        assert!(err.to_string().contains("high"));
    }

    #[test]
    fn negative_volume_and_amount_are_rejected() {
        assert!(Bar::new(1.0, 2.0, 0.5, 1.5, -1.0, 0.0).validate().is_err());
        assert!(Bar::new(1.0, 2.0, 0.5, 1.5, 1.0, -0.5).validate().is_err());
    }

    #[test]
    fn random_walk_bars_always_validate() {
        for bar in random_walk(200, 100.0) {
            bar.validate().unwrap();
        }
    }
}
