//! # xenserver-descriptors
//!
//! Local descriptors for XenAPI objects.
//!
//! Each descriptor mirrors one remote object. It is resolved from a human
//! identifier (name label or UUID) to an opaque reference, then populated
//! from the remote record. VM and VBD can also push selected fields back.
//!
//! Descriptors nest the way the objects reference each other:
//!
//! ```text
//!          VM ◄──────────┬───────────┐
//!                        │           │
//!              Network ◄─ VIF        VBD ─► VDI ─► SR
//!
//!          VLAN ─► PIF (tagged), PIF (untagged)
//! ```
//!
//! All calls go through a [`XenApi`](xenserver_api::XenApi) and are issued
//! strictly one after another.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xenserver_descriptors::{Resolvable, VmDescriptor};
//!
//! let mut vm = VmDescriptor::by_name("web-01");
//! vm.load(&api).await?;
//! vm.vcpu_count = 4;
//! vm.update_vcpus(&api).await?;
//! ```

pub mod error;
pub mod network;
pub mod pif;
pub mod resolvable;
pub mod sr;
pub mod template_device;
pub mod vbd;
pub mod vdi;
pub mod vif;
pub mod vlan;
pub mod vm;
pub mod warning;

pub use error::{DescriptorError, DescriptorKind, Result};
pub use network::NetworkDescriptor;
pub use pif::PifDescriptor;
pub use resolvable::{NestedPolicy, Resolvable};
pub use sr::SrDescriptor;
pub use vbd::VbdDescriptor;
pub use vdi::VdiDescriptor;
pub use vif::VifDescriptor;
pub use vlan::VlanDescriptor;
pub use vm::{Range, VmDescriptor};
pub use warning::PopulateWarning;
