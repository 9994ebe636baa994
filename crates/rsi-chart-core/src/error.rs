use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("RSI period must be at least 1")]
    InvalidPeriod,

    #[error("Length mismatch: {timestamps} timestamp(s) but {values} RSI value(s)")]
    LengthMismatch { timestamps: usize, values: usize },

    #[error("Unsupported interval: {0}")]
    UnsupportedInterval(String),

    #[error("Unknown chart type: {0}. Expected: candlestick, line, bar")]
    UnknownChartType(String),

    #[error("Unknown RSI style: {0}. Expected: candlestick, line")]
    UnknownRsiStyle(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
