use crate::bar::PriceBar;
use crate::error::CoreError;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Relative Strength Index over simple moving averages of gains and losses.
///
/// The output is aligned 1:1 with `closes`. Index `i` is `Some` only when the
/// `period` deltas ending at `i` are all finite, so the first defined value is
/// at index `period`. A window with no gains and no losses (flat prices) has
/// no defined ratio and yields `None`; a window with gains but no losses
/// yields exactly 100.
pub fn compute_rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>, CoreError> {
    if period == 0 {
        return Err(CoreError::InvalidPeriod);
    }

    let mut rsi = vec![None; closes.len()];
    if closes.len() <= period {
        return Ok(rsi);
    }

    // deltas[j] is the change into bar j + 1
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    for (start, window) in deltas.windows(period).enumerate() {
        if window.iter().any(|d| !d.is_finite()) {
            continue;
        }
        let gain: f64 = window.iter().map(|d| d.max(0.0)).sum();
        let loss: f64 = window.iter().map(|d| (-d).max(0.0)).sum();
        rsi[start + period] = rsi_from_averages(gain / period as f64, loss / period as f64);
    }

    Ok(rsi)
}

/// RSI over the closing prices of `bars`.
pub fn rsi_for_bars(bars: &[PriceBar], period: usize) -> Result<Vec<Option<f64>>, CoreError> {
    let closes: Vec<f64> = bars.iter().map(PriceBar::close_f64).collect();
    compute_rsi(&closes, period)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { None } else { Some(100.0) };
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
