//! Error types for descriptor operations.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use xenserver_api::ApiError;

/// The object class a descriptor mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DescriptorKind {
    Network,
    Vm,
    Vif,
    Sr,
    Vdi,
    Vbd,
    Pif,
    Vlan,
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "Network",
            Self::Vm => "VM",
            Self::Vif => "VIF",
            Self::Sr => "Storage repository",
            Self::Vdi => "VDI",
            Self::Vbd => "VBD",
            Self::Pif => "PIF",
            Self::Vlan => "VLAN",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while resolving, populating or committing a descriptor.
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// None of the identifier fields accepted for this kind were set.
    #[error("{kind}: {fields} should be specified")]
    MissingIdentifier {
        kind: DescriptorKind,
        fields: &'static str,
    },

    /// A name lookup returned no objects.
    #[error("{kind} {name:?} not found")]
    NotFound {
        kind: DescriptorKind,
        name: String,
    },

    /// Any error reported by the XenAPI backend, unchanged.
    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Result type alias for descriptor operations.
pub type Result<T> = std::result::Result<T, DescriptorError>;
