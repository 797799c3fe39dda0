pub mod granularity;
pub mod request_params;
pub mod tick;
