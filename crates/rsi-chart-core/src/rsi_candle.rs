use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::interval::Interval;

/// RSI values of one bucket summarized as OHLC.
///
/// Each field is `None` when the bucket holds no defined RSI value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiCandle {
    pub bucket: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

impl RsiCandle {
    fn from_values(bucket: DateTime<Utc>, values: &[Option<f64>]) -> Self {
        let mut defined = values.iter().flatten().copied();
        let Some(first) = defined.next() else {
            return Self {
                bucket,
                open: None,
                high: None,
                low: None,
                close: None,
            };
        };

        let (high, low, last) = defined.fold((first, first, first), |(hi, lo, _), v| {
            (hi.max(v), lo.min(v), v)
        });

        Self {
            bucket,
            open: Some(first),
            high: Some(high),
            low: Some(low),
            close: Some(last),
        }
    }
}

/// Group per-bar RSI values into interval buckets and summarize each bucket.
///
/// `timestamps` and `rsi` must be aligned. Buckets are keyed by
/// [`Interval::floor`] on the `tz` wall clock and returned in ascending order;
/// every bucket that received a bar yields exactly one candle.
pub fn aggregate_rsi_candles(
    timestamps: &[DateTime<Utc>],
    rsi: &[Option<f64>],
    interval: Interval,
    tz: Tz,
) -> Result<Vec<RsiCandle>, CoreError> {
    if timestamps.len() != rsi.len() {
        return Err(CoreError::LengthMismatch {
            timestamps: timestamps.len(),
            values: rsi.len(),
        });
    }

    let mut buckets: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();
    for (ts, value) in timestamps.iter().zip(rsi) {
        buckets
            .entry(interval.floor(*ts, tz))
            .or_default()
            .push(*value);
    }

    Ok(buckets
        .iter()
        .map(|(bucket, values)| RsiCandle::from_values(*bucket, values))
        .collect())
}
