pub mod apis;
pub mod client;
pub mod common;
pub mod config;
pub mod logging;
pub mod parser;
pub mod server;

pub use common::{CarrierApi, Result, Status, StatusInfo, TrackerError, TrackingInfo, TrackingQuery};
