//! Market-data acquisition for the QBIT-5 snapshot pipeline.
//!
//! Canonical price models, the [`providers::PriceSource`] trait with a Yahoo
//! chart-API implementation, and the timezone conversion boundary. Provider
//! timestamps are canonicalized to UTC at ingest; all wall-clock conversions
//! happen through [`tz`].

pub mod models;
pub mod providers;
pub mod tz;
