use std::sync::Arc;

use rsi_chart_core::chart::{ChartType, RsiStyle, price_figure, rsi_figure};
use rsi_chart_core::interval::Interval;
use rsi_chart_core::rsi::rsi_for_bars;
use rsi_chart_core::rsi_candle::aggregate_rsi_candles;
use rsi_chart_providers::provider::PriceSeriesProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ServiceSettings;
use crate::error::ChartError;

const DEFAULT_SYMBOL: &str = "AAPL";

/// Raw `/update_chart` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChartQuery {
    pub symbol: Option<String>,
    pub chart_type: Option<String>,
    pub interval: Option<String>,
    pub rsi_style: Option<String>,
    pub period: Option<String>,
}

/// A validated chart request with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: String,
    pub chart_type: ChartType,
    pub interval: Interval,
    pub rsi_style: RsiStyle,
    pub period: usize,
}

/// Both figures, each serialized to a JSON string for the page to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub chart: String,
    pub rsi: String,
}

/// Fetches bars and renders the price and RSI figures for one request.
pub struct ChartService {
    provider: Arc<dyn PriceSeriesProvider>,
    settings: ServiceSettings,
}

impl ChartService {
    pub fn new(provider: Arc<dyn PriceSeriesProvider>, settings: ServiceSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Apply defaults and validate every parameter.
    pub fn resolve(&self, query: &UpdateChartQuery) -> Result<ChartRequest, ChartError> {
        let symbol = match query.symbol.as_deref().map(str::trim) {
            None => DEFAULT_SYMBOL.to_string(),
            Some(s) => validate_symbol(s)?,
        };

        let chart_type = parse_or_default(query.chart_type.as_deref())?;
        let rsi_style = parse_or_default(query.rsi_style.as_deref())?;

        let interval = match query.interval.as_deref() {
            Some(s) => s
                .parse::<Interval>()
                .map_err(|e| ChartError::InvalidRequest(format!("{e}")))?,
            None => Interval::Day1,
        };

        let period = match query.period.as_deref().map(str::trim) {
            Some(s) => match s.parse::<usize>() {
                Ok(p) if p > 0 => p,
                _ => {
                    return Err(ChartError::InvalidRequest(format!(
                        "period must be a positive integer, got {s:?}"
                    )));
                }
            },
            None => self.settings.rsi_period,
        };

        Ok(ChartRequest {
            symbol,
            chart_type,
            interval,
            rsi_style,
            period,
        })
    }

    pub async fn update_chart(&self, query: &UpdateChartQuery) -> Result<ChartPayload, ChartError> {
        let request = self.resolve(query)?;
        self.render(&request).await
    }

    /// One fetch, compute and render cycle.
    pub async fn render(&self, request: &ChartRequest) -> Result<ChartPayload, ChartError> {
        let range = self
            .settings
            .range
            .as_deref()
            .unwrap_or_else(|| request.interval.default_range());

        let series = self
            .provider
            .fetch_series(&request.symbol, request.interval, range)
            .await
            .map_err(ChartError::Fetch)?;

        if series.is_empty() {
            info!(
                "{}: no {} bars over {range} from {}",
                request.symbol,
                request.interval,
                self.provider.name()
            );
            return Err(ChartError::NoData);
        }

        let rsi = rsi_for_bars(&series.bars, request.period)?;
        let timestamps = series.timestamps();

        let candles = match request.rsi_style {
            RsiStyle::Candlestick => Some(aggregate_rsi_candles(
                &timestamps,
                &rsi,
                request.interval,
                series.timezone,
            )?),
            RsiStyle::Line => None,
        };

        debug!(
            "{}: {} bar(s), {} defined RSI value(s), {} RSI candle(s)",
            request.symbol,
            series.bars.len(),
            rsi.iter().flatten().count(),
            candles.as_ref().map_or(0, Vec::len),
        );

        let price = price_figure(
            &request.symbol,
            request.interval,
            &series.bars,
            request.chart_type,
            series.timezone,
        );
        let oscillator = rsi_figure(&timestamps, &rsi, candles.as_deref(), series.timezone);

        Ok(ChartPayload {
            chart: price.to_json()?,
            rsi: oscillator.to_json()?,
        })
    }
}

fn parse_or_default<T>(value: Option<&str>) -> Result<T, ChartError>
where
    T: std::str::FromStr<Err = rsi_chart_core::error::CoreError> + Default,
{
    match value {
        Some(s) => s
            .parse()
            .map_err(|e| ChartError::InvalidRequest(format!("{e}"))),
        None => Ok(T::default()),
    }
}

/// Upper-case the symbol and reject anything that is not a plausible ticker
/// (letters, digits and `. - ^ =`, as in `BRK-B`, `^GSPC`, `EURUSD=X`).
fn validate_symbol(symbol: &str) -> Result<String, ChartError> {
    if symbol.is_empty() || symbol.len() > 20 {
        return Err(ChartError::InvalidRequest(format!(
            "invalid symbol {symbol:?}"
        )));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(ChartError::InvalidRequest(format!(
            "invalid symbol {symbol:?}"
        )));
    }
    Ok(symbol.to_ascii_uppercase())
}
