use clap::Parser;
use rsi_chart_core::rsi::DEFAULT_RSI_PERIOD;

pub const DEFAULT_STOCKS: &[&str] = &["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

#[derive(Debug, Parser)]
#[command(
    name = "rsi-chart",
    about = "Serve price and RSI charts for stock symbols"
)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Default RSI lookback period, overridable per request
    #[arg(long, default_value_t = DEFAULT_RSI_PERIOD)]
    pub rsi_period: usize,

    /// History window to fetch (e.g. 60d, 2y). Defaults to the longest
    /// window the upstream serves for the requested interval.
    #[arg(long)]
    pub range: Option<String>,

    /// Symbols listed on the landing page (comma-separated)
    #[arg(long, value_delimiter = ',', default_values_t = default_stocks())]
    pub stocks: Vec<String>,

    /// Override the Yahoo Finance chart API base URL
    #[arg(long)]
    pub yahoo_url: Option<String>,
}

/// Request defaults shared by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub rsi_period: usize,
    pub range: Option<String>,
    pub stocks: Vec<String>,
}

fn default_stocks() -> Vec<String> {
    DEFAULT_STOCKS.iter().map(|s| s.to_string()).collect()
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            range: None,
            stocks: default_stocks(),
        }
    }
}

impl Cli {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn settings(&self) -> anyhow::Result<ServiceSettings> {
        if self.rsi_period == 0 {
            anyhow::bail!("--rsi-period must be at least 1");
        }
        let stocks: Vec<String> = self
            .stocks
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(ServiceSettings {
            rsi_period: self.rsi_period,
            range: self.range.clone(),
            stocks,
        })
    }
}
