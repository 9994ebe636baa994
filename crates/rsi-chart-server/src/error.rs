use axum::Json;
use axum::response::{IntoResponse, Response};
use rsi_chart_core::error::CoreError;
use rsi_chart_providers::error::ProviderError;
use serde_json::json;
use thiserror::Error;

/// Per-request failure, reported to the browser as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("No data available for the selected stock or interval.")]
    NoData,

    #[error("Error fetching data: {0}")]
    Fetch(#[source] ProviderError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reported under the same prefix as fetch failures; the page does not
    /// distinguish the two.
    #[error("Error fetching data: {0}")]
    Compute(#[from] CoreError),
}

impl IntoResponse for ChartError {
    fn into_response(self) -> Response {
        tracing::warn!("update_chart failed: {self}");
        // The page reads `error` from a 200 response, so the status stays OK.
        Json(json!({ "error": self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_client_contract() {
        assert_eq!(
            ChartError::NoData.to_string(),
            "No data available for the selected stock or interval."
        );
        let fetch = ChartError::Fetch(ProviderError::RateLimited {
            retry_after_secs: 60,
        });
        assert_eq!(
            fetch.to_string(),
            "Error fetching data: Rate limited, retry after 60s"
        );
        assert_eq!(
            ChartError::InvalidRequest("bad".into()).to_string(),
            "Invalid request: bad"
        );
    }

    #[test]
    fn compute_failures_share_the_fetch_prefix() {
        let err = ChartError::from(CoreError::InvalidPeriod);
        assert_eq!(
            err.to_string(),
            format!("Error fetching data: {}", CoreError::InvalidPeriod)
        );
    }

    #[test]
    fn response_is_ok_with_error_body() {
        let response = ChartError::NoData.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
