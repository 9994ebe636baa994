pub mod bar;
pub mod chart;
pub mod error;
pub mod interval;
pub mod rsi;
pub mod rsi_candle;
