use async_trait::async_trait;
use rsi_chart_core::bar::PriceSeries;
use rsi_chart_core::interval::Interval;

use crate::error::ProviderError;

/// Source of historical price bars.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Provider name (for logging/display).
    fn name(&self) -> &str;

    /// Fetch bars for `symbol` at `interval` granularity covering `range`
    /// (upstream range vocabulary, e.g. `7d`, `60d`, `2y`).
    /// Bars are sorted by timestamp. Unknown symbols yield an empty series.
    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        range: &str,
    ) -> Result<PriceSeries, ProviderError>;
}
