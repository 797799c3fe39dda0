use chrono::DateTime;
use serde::Deserialize;

use crate::models::tick::PricePoint;

/// Top-level payload of the v8 chart endpoint.
#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartApiError>,
}

/// Error object the API embeds instead of a result.
#[derive(Deserialize, Debug)]
pub struct ChartApiError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    /// Unix seconds, one entry per bar.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    pub quote: Vec<QuoteBlock>,
}

#[derive(Deserialize, Debug)]
pub struct QuoteBlock {
    /// Close per bar; `null` where the venue printed no trade.
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// Converts one chart result into canonical observations.
///
/// Bars without a close, with a non-finite close, or with a non-positive
/// close are discarded. Timestamps are unix seconds, canonicalized to UTC.
pub fn close_points(result: &ChartResult) -> Vec<PricePoint> {
    let closes = match result.indicators.quote.first() {
        Some(quote) => &quote.close,
        None => return Vec::new(),
    };

    result
        .timestamp
        .iter()
        .zip(closes.iter())
        .filter_map(|(&secs, close)| {
            let price = (*close)?;
            if !price.is_finite() || price <= 0.0 {
                return None;
            }
            let timestamp = DateTime::from_timestamp(secs, 0)?;
            Some(PricePoint { timestamp, price })
        })
        .collect()
}
