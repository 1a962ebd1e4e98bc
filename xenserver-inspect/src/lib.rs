//! # xenserver-inspect
//!
//! Small CLI over the descriptor layer: load an object and print it as JSON,
//! or push VM memory, VM VCPU and VBD changes.
//!
//! ## Usage
//! ```bash
//! xenserver-inspect --url https://xen-master --session OpaqueRef:... show vm --name web-01
//! xenserver-inspect --config /etc/xenserver-inspect/config.yaml set-vcpus --uuid <vm-uuid> --count 4
//! ```

pub mod cli;
pub mod commands;
pub mod config;
