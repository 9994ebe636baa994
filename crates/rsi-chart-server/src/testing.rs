//! Deterministic providers and fixtures for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Tz;
use rsi_chart_core::bar::{PriceBar, PriceSeries};
use rsi_chart_core::interval::Interval;
use rsi_chart_providers::error::ProviderError;
use rsi_chart_providers::provider::PriceSeriesProvider;
use rust_decimal::Decimal;

pub type Call = (String, Interval, String);

enum Reply {
    Series(PriceSeries),
    Empty,
    Fail(String),
}

/// Replays one canned reply and records every fetch.
pub struct StubProvider {
    reply: Reply,
    calls: Mutex<Vec<Call>>,
}

impl StubProvider {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_series(series: PriceSeries) -> Self {
        Self::new(Reply::Series(series))
    }

    pub fn empty() -> Self {
        Self::new(Reply::Empty)
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Reply::Fail(message.to_string()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSeriesProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        range: &str,
    ) -> Result<PriceSeries, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), interval, range.to_string()));

        match &self.reply {
            Reply::Series(series) => {
                let mut series = series.clone();
                series.symbol = symbol.to_string();
                Ok(series)
            }
            Reply::Empty => Ok(PriceSeries::empty(symbol)),
            Reply::Fail(message) => Err(ProviderError::Api {
                status: 503,
                message: message.clone(),
            }),
        }
    }
}

fn bar(timestamp: chrono::DateTime<Utc>, close: Decimal) -> PriceBar {
    PriceBar {
        timestamp,
        open: close,
        high: close + Decimal::ONE,
        low: close - Decimal::ONE,
        close,
        volume: 1_000,
    }
}

/// `len` daily bars at the New York open with closes 10, 11, 12, ...
pub fn daily_series(len: usize) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2025, 1, 2, 14, 30, 0).unwrap();
    let bars = (0..len)
        .map(|i| bar(start + Duration::days(i as i64), Decimal::from(10 + i as i64)))
        .collect();
    PriceSeries::new("AAPL", Tz::America__New_York, bars)
}

/// `len` hourly bars with a zig-zag close around 100.
pub fn intraday_series(len: usize) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2025, 1, 15, 14, 30, 0).unwrap();
    let bars = (0..len)
        .map(|i| {
            let close = Decimal::from(100 + (i as i64 * 7) % 5);
            bar(start + Duration::hours(i as i64), close)
        })
        .collect();
    PriceSeries::new("AAPL", Tz::America__New_York, bars)
}
