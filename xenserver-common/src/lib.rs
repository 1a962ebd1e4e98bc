//! # xenserver-common
//!
//! Shared utilities for the xenserver tools.
//!
//! ## Logging
//!
//! ```rust,ignore
//! use xenserver_common::init_logging;
//!
//! init_logging("info").unwrap();
//! tracing::info!("ready");
//! ```

pub mod logging;

pub use logging::{init_logging, init_logging_json, LogFormat};
