//! # Domain Module
//!
//! Business logic for the infant-care log.
//!
//! - **Aggregation**: pure reducers over event slices (`reducers`), the
//!   daily highlights built from them (`highlights`), and per-day chart
//!   series (`chart_series`), with the window and unit helpers they share
//!   (`date_window`, `units`)
//! - **Services**: `EventService` and `ProfileService`, which tie the
//!   aggregation core to storage and to the active profile
//!
//! Nothing in the aggregation core touches storage or the clock; services
//! pass in the events and the time window explicitly.

pub mod chart_series;
pub mod commands;
pub mod date_window;
pub mod event_service;
pub mod highlights;
pub mod models;
pub mod profile_service;
pub mod reducers;
pub mod units;

pub use event_service::EventService;
pub use profile_service::ProfileService;
