// File: src/quotes.rs
//
// Blocking HTTP client that pulls OHLCV candles from a quote service and
// converts them into the engine's Bar format. Lives entirely outside the
// core pipeline: the engine never performs I/O itself.

use crate::market::Bar;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Failure while talking to or decoding from the quote service.
#[derive(Debug)]
pub enum QuoteError {
    Http(reqwest::Error),
    Endpoint(String),
}

impl fmt::Display for QuoteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QuoteError::Http(e) => write!(f, "quote request failed: {}", e),
            QuoteError::Endpoint(message) => write!(f, "quote endpoint error: {}", message),
        }
    }
}

impl Error for QuoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            QuoteError::Http(e) => Some(e),
            QuoteError::Endpoint(_) => None,
        }
    }
}

impl From<reqwest::Error> for QuoteError {
    fn from(e: reqwest::Error) -> Self {
        QuoteError::Http(e)
    }
}

/// One candle as the quote service serves it. `amount` is optional; when
/// the service omits it we approximate with volume * close.
#[derive(Debug, Deserialize)]
struct Candle {
    #[serde(default)]
    time: Option<DateTime<Utc>>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(default)]
    amount: Option<f64>,
}

impl Candle {
    fn into_bar(self) -> Bar {
        let amount = self.amount.unwrap_or(self.volume * self.close);
        Bar {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            amount,
            time: self.time,
        }
    }
}

/// Client for a JSON candle endpoint:
/// `GET {base_url}/candles?symbol=...&interval=1d&limit=N` returning an
/// array of candles, oldest first.
pub struct QuoteClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl QuoteClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, QuoteError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(QuoteClient { http, base_url: base_url.into() })
    }

    /// Fetches up to `count` daily bars for `symbol`, oldest first, and
    /// validates them before handing them to the engine.
    pub fn fetch_daily(&self, symbol: &str, count: usize) -> Result<Vec<Bar>, QuoteError> {
        let url = format!("{}/candles", self.base_url.trim_end_matches('/'));
        let limit = count.to_string();

        let candles: Vec<Candle> = self
            .http
            .get(&url)
            .query(&[("symbol", symbol), ("interval", "1d"), ("limit", limit.as_str())])
            .send()?
            .error_for_status()?
            .json()?;

        if candles.is_empty() {
            return Err(QuoteError::Endpoint(format!("no candles returned for {}", symbol)));
        }

        let bars: Vec<Bar> = candles.into_iter().map(Candle::into_bar).collect();
        for (index, bar) in bars.iter().enumerate() {
            bar.validate()
                .map_err(|e| QuoteError::Endpoint(format!("candle {}: {}", index, e)))?;
        }

        Ok(bars)
    }
}
