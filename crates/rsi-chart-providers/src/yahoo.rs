use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use rsi_chart_core::bar::{PriceBar, PriceSeries};
use rsi_chart_core::interval::Interval;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::provider::PriceSeriesProvider;

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const NOT_FOUND_CODE: &str = "Not Found";

/// Yahoo Finance chart API provider.
/// No authentication required. Intraday history is limited upstream
/// (about 7 days for 1m bars, 60 days below 1h).
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(YAHOO_CHART_URL.to_string())
    }

    /// Create with a custom base URL (for testing or a proxy).
    pub fn with_base_url(base_url: String) -> Result<Self, ProviderError> {
        let client = Client::builder().user_agent("Mozilla/5.0").build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    meta: Option<YahooMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

fn f64_to_decimal(val: f64) -> Result<Decimal, ProviderError> {
    Decimal::try_from(val).map_err(|e| ProviderError::Parse(format!("invalid decimal value: {e}")))
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn exchange_timezone(result: &YahooResult) -> Tz {
    let Some(name) = result
        .meta
        .as_ref()
        .and_then(|m| m.exchange_timezone_name.as_deref())
    else {
        return Tz::UTC;
    };
    name.parse().unwrap_or_else(|_| {
        warn!("unknown exchange timezone {name:?}, bucketing in UTC");
        Tz::UTC
    })
}

fn parse_yahoo_result(result: &YahooResult) -> Result<Vec<PriceBar>, ProviderError> {
    let Some(timestamps) = result.timestamp.as_ref() else {
        // Yahoo omits timestamps when the range holds no bars
        return Ok(Vec::new());
    };

    let Some(quote) = result.indicators.quote.first() else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        // skip bars with missing prices
        let (Some(open), Some(high), Some(low), Some(close)) = (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
        ) else {
            continue;
        };
        let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

        let timestamp = Utc
            .timestamp_opt(ts, 0)
            .single()
            .ok_or_else(|| ProviderError::Parse(format!("invalid unix timestamp: {ts}")))?;

        bars.push(PriceBar {
            timestamp,
            open: f64_to_decimal(open)?,
            high: f64_to_decimal(high)?,
            low: f64_to_decimal(low)?,
            close: f64_to_decimal(close)?,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    Ok(bars)
}

/// Turn a chart API response into a series.
///
/// A `Not Found` chart error means the symbol is unknown and maps to an empty
/// series; any other chart error or non-success status is an API error.
fn parse_chart_body(symbol: &str, status: u16, body: &str) -> Result<PriceSeries, ProviderError> {
    let parsed = serde_json::from_str::<YahooResponse>(body);

    if let Ok(YahooResponse {
        chart: YahooChart {
            error: Some(error), ..
        },
    }) = &parsed
    {
        if error.code == NOT_FOUND_CODE {
            debug!("{symbol}: not found upstream ({})", error.description);
            return Ok(PriceSeries::empty(symbol));
        }
        return Err(ProviderError::Api {
            status,
            message: format!("{}: {}", error.code, error.description),
        });
    }

    if !(200..300).contains(&status) {
        return Err(ProviderError::Api {
            status,
            message: body.to_string(),
        });
    }

    let body = parsed.map_err(|e| ProviderError::Parse(format!("failed to parse response: {e}")))?;

    let results = body
        .chart
        .result
        .ok_or_else(|| ProviderError::Parse("no results in response".into()))?;

    let Some(result) = results.first() else {
        return Ok(PriceSeries::empty(symbol));
    };

    let bars = parse_yahoo_result(result)?;
    Ok(PriceSeries::new(symbol, exchange_timezone(result), bars))
}

#[async_trait]
impl PriceSeriesProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        range: &str,
    ) -> Result<PriceSeries, ProviderError> {
        debug!("{symbol}: requesting {interval} bars over {range}");

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, symbol))
            .query(&[
                ("interval", interval.as_str()),
                ("range", range),
                ("includePrePost", "false"),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 60,
            });
        }

        let status = response.status().as_u16();
        let body = response.text().await?;
        let series = parse_chart_body(symbol, status, &body)?;

        debug!("{symbol}: received {} bar(s)", series.bars.len());
        Ok(series)
    }
}
