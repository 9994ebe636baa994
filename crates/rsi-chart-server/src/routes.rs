use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use rsi_chart_core::interval::Interval;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::error::ChartError;
use crate::service::{ChartPayload, ChartService, UpdateChartQuery};

const INDEX_TEMPLATE: &str = include_str!("../assets/index.html");

pub fn router(service: Arc<ChartService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/update_chart", get(update_chart))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// GET / - landing page with the stock picker.
async fn index(State(service): State<Arc<ChartService>>) -> Html<String> {
    Html(render_index(&service.settings().stocks))
}

/// GET /update_chart?symbol=AAPL&chartType=candlestick&interval=1d
async fn update_chart(
    State(service): State<Arc<ChartService>>,
    Query(query): Query<UpdateChartQuery>,
) -> Result<Json<ChartPayload>, ChartError> {
    service.update_chart(&query).await.map(Json)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn render_index(stocks: &[String]) -> String {
    let stock_options: String = stocks
        .iter()
        .map(|s| {
            let s = escape_html(s);
            format!("<option value=\"{s}\">{s}</option>")
        })
        .collect();

    let interval_options: String = Interval::all()
        .iter()
        .map(|i| {
            let selected = if *i == Interval::Day1 { " selected" } else { "" };
            format!("<option value=\"{i}\"{selected}>{i}</option>")
        })
        .collect();

    INDEX_TEMPLATE
        .replace("{{stock_options}}", &stock_options)
        .replace("{{interval_options}}", &interval_options)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
