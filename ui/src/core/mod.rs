//! Platform-agnostic orchestration core. Nothing in here touches the
//! DOM; the browser edges live behind `cfg(target_arch = "wasm32")`.

pub mod api;
pub mod chart;
pub mod connection;
pub mod credentials;
pub mod format;
pub mod notify;
pub mod platform;
pub mod request;
pub mod schedule;
pub mod session;
pub mod timing;
