//! # xenserver-api
//!
//! Typed access to the XenServer / XCP-ng management API (XenAPI).
//!
//! The [`XenApi`] trait is the capability the descriptor layer consumes:
//! one method per remote call, grouped by object class, returning typed
//! references and records.
//!
//! ## Backends
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              XenApi Trait               │
//! │  (get_by_name_label, get_record, ...)   │
//! └─────────────────────┬───────────────────┘
//!                       │
//!         ┌─────────────┴─────────────┐
//!         ▼                           ▼
//! ┌───────────────────┐     ┌───────────────────┐
//! │   JsonRpcClient   │     │    MockXenApi     │
//! │ (HTTP, /jsonrpc)  │     │    (in memory)    │
//! └───────────────────┘     └───────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xenserver_api::{MockXenApi, VmRecord, XenApi};
//!
//! #[tokio::main]
//! async fn main() {
//!     let api = MockXenApi::new();
//!     let vm = api.insert_vm(VmRecord::default()).unwrap();
//!     let record = api.vm_get_record(&vm).await.unwrap();
//! }
//! ```

pub mod error;
pub mod jsonrpc;
pub mod method;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{ApiError, Result};
pub use jsonrpc::{ClientConfig, JsonRpcClient};
pub use mock::{MockCall, MockXenApi};
pub use traits::XenApi;
pub use types::*;
