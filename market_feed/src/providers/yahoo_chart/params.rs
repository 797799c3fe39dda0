use crate::models::granularity::Granularity;
use crate::models::request_params::{FetchWindow, HistoryRequest};
use crate::providers::errors::FeedError;

/// Longest window Yahoo serves for 1-minute bars.
const MAX_DAYS_ONE_MINUTE: i64 = 8;
/// Longest window Yahoo serves for 5-minute bars.
const MAX_DAYS_FIVE_MINUTE: i64 = 60;

/// Validates a request against the chart API's window/granularity limits.
pub fn validate_request(req: &HistoryRequest) -> Result<(), FeedError> {
    if req.symbols.is_empty() {
        return Err(FeedError::Validation(
            "at least one symbol is required".to_string(),
        ));
    }
    let days = req.window.span_days();
    if days <= 0 {
        return Err(FeedError::Validation(
            "requested window must span at least one day".to_string(),
        ));
    }
    match req.granularity {
        Granularity::OneMinute if days > MAX_DAYS_ONE_MINUTE => Err(FeedError::Validation(format!(
            "1-minute bars are limited to {MAX_DAYS_ONE_MINUTE} days, got {days}"
        ))),
        Granularity::FiveMinute if days > MAX_DAYS_FIVE_MINUTE => {
            Err(FeedError::Validation(format!(
                "5-minute bars are limited to {MAX_DAYS_FIVE_MINUTE} days, got {days}"
            )))
        }
        _ => Ok(()),
    }
}

/// Builds the query string for one chart request.
///
/// Regular-session bars only: pre/post-market observations would distort the
/// session-open reference.
pub fn construct_params(req: &HistoryRequest) -> Vec<(String, String)> {
    let mut query = vec![
        (
            "interval".to_string(),
            req.granularity.api_code().to_string(),
        ),
        ("includePrePost".to_string(), "false".to_string()),
    ];

    match &req.window {
        FetchWindow::LastDays(days) => {
            query.push(("range".to_string(), format!("{days}d")));
        }
        FetchWindow::Range { start, end } => {
            query.push(("period1".to_string(), start.timestamp().to_string()));
            query.push(("period2".to_string(), end.timestamp().to_string()));
        }
    }

    query
}
