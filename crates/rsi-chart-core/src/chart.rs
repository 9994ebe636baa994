//! Plotly-compatible figures for the price and RSI charts.
//!
//! Figures are plain serde structures; undefined values serialize as `null`
//! so the browser draws a gap instead of a point. Plotly ignores UTC offsets
//! in date strings, so `x` values are exchange-local wall-clock times.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::bar::PriceBar;
use crate::error::CoreError;
use crate::interval::Interval;
use crate::rsi_candle::RsiCandle;

const RSI_LINE_COLOR: &str = "blue";
const BACKGROUND: &str = "white";

/// Rendering style of the price chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartType {
    #[default]
    Candlestick,
    Line,
    Bar,
}

impl FromStr for ChartType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "candlestick" => Ok(ChartType::Candlestick),
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            other => Err(CoreError::UnknownChartType(other.to_string())),
        }
    }
}

/// Rendering style of the RSI chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RsiStyle {
    /// Per-bucket OHLC candles of the RSI values.
    #[default]
    Candlestick,
    /// One point per bar.
    Line,
}

impl FromStr for RsiStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "candlestick" => Ok(RsiStyle::Candlestick),
            "line" => Ok(RsiStyle::Line),
            other => Err(CoreError::UnknownRsiStyle(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick {
        x: Vec<NaiveDateTime>,
        open: Vec<Option<f64>>,
        high: Vec<Option<f64>>,
        low: Vec<Option<f64>>,
        close: Vec<Option<f64>>,
        name: String,
    },
    Scatter {
        x: Vec<NaiveDateTime>,
        y: Vec<Option<f64>>,
        mode: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<LineStyle>,
    },
    Bar {
        x: Vec<NaiveDateTime>,
        y: Vec<Option<f64>>,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub plot_bgcolor: String,
    pub paper_bgcolor: String,
}

impl Layout {
    fn new(title: impl Into<String>, x_title: &str, y_title: &str) -> Self {
        Self {
            title: Title::new(title),
            xaxis: Axis::new(x_title),
            yaxis: Axis::new(y_title),
            plot_bgcolor: BACKGROUND.to_string(),
            paper_bgcolor: BACKGROUND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl Axis {
    fn new(title: &str) -> Self {
        Self {
            title: Title::new(title),
            range: None,
        }
    }
}

fn price(value: Decimal) -> Option<f64> {
    value.to_f64()
}

fn wall_clock(timestamp: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    timestamp.with_timezone(&tz).naive_local()
}

/// Price chart for `bars` in the requested style, dated on the `tz` clock.
pub fn price_figure(
    symbol: &str,
    interval: Interval,
    bars: &[PriceBar],
    chart_type: ChartType,
    tz: Tz,
) -> Figure {
    let x: Vec<NaiveDateTime> = bars.iter().map(|b| wall_clock(b.timestamp, tz)).collect();
    let closes: Vec<Option<f64>> = bars.iter().map(|b| price(b.close)).collect();

    let trace = match chart_type {
        ChartType::Candlestick => Trace::Candlestick {
            x,
            open: bars.iter().map(|b| price(b.open)).collect(),
            high: bars.iter().map(|b| price(b.high)).collect(),
            low: bars.iter().map(|b| price(b.low)).collect(),
            close: closes,
            name: symbol.to_string(),
        },
        ChartType::Line => Trace::Scatter {
            x,
            y: closes,
            mode: "lines".to_string(),
            name: "Close Price".to_string(),
            line: None,
        },
        ChartType::Bar => Trace::Bar {
            x,
            y: closes,
            name: "Close Price".to_string(),
        },
    };

    Figure {
        data: vec![trace],
        layout: Layout::new(
            format!("{symbol} Stock Chart ({interval} Interval)"),
            "Date",
            "Price",
        ),
    }
}

/// RSI chart: candles when `candles` is given, otherwise one line point per bar.
pub fn rsi_figure(
    timestamps: &[DateTime<Utc>],
    rsi: &[Option<f64>],
    candles: Option<&[RsiCandle]>,
    tz: Tz,
) -> Figure {
    let (trace, title) = match candles {
        Some(candles) => (
            Trace::Candlestick {
                x: candles.iter().map(|c| wall_clock(c.bucket, tz)).collect(),
                open: candles.iter().map(|c| c.open).collect(),
                high: candles.iter().map(|c| c.high).collect(),
                low: candles.iter().map(|c| c.low).collect(),
                close: candles.iter().map(|c| c.close).collect(),
                name: "RSI".to_string(),
            },
            "RSI Candlestick Chart",
        ),
        None => (
            Trace::Scatter {
                x: timestamps.iter().map(|ts| wall_clock(*ts, tz)).collect(),
                y: rsi.to_vec(),
                mode: "lines".to_string(),
                name: "RSI".to_string(),
                line: Some(LineStyle {
                    color: RSI_LINE_COLOR.to_string(),
                }),
            },
            "RSI Chart",
        ),
    };

    let mut layout = Layout::new(title, "Date", "RSI");
    layout.yaxis.range = Some([0.0, 100.0]);

    Figure {
        data: vec![trace],
        layout,
    }
}
