//! Type definitions for XenAPI references and object records.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Key/value bag attached to most XenAPI objects (`other_config`, `platform`, ...).
pub type StringMap = HashMap<String, String>;

/// The reference XenAPI returns for "no object".
pub const NULL_REF: &str = "OpaqueRef:NULL";

// =============================================================================
// OPAQUE REFERENCES
// =============================================================================

macro_rules! opaque_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw reference string.
            pub fn new(reference: impl Into<String>) -> Self {
                Self(reference.into())
            }

            /// The null reference.
            pub fn null() -> Self {
                Self(NULL_REF.to_string())
            }

            /// Raw reference string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True for the empty string and for `OpaqueRef:NULL`.
            pub fn is_null(&self) -> bool {
                self.0.is_empty() || self.0 == NULL_REF
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(reference: &str) -> Self {
                Self::new(reference)
            }
        }

        impl From<String> for $name {
            fn from(reference: String) -> Self {
                Self(reference)
            }
        }
    };
}

opaque_ref!(
    /// Reference to an authenticated session.
    SessionRef
);
opaque_ref!(
    /// Reference to a `network` object.
    NetworkRef
);
opaque_ref!(
    /// Reference to a `VM` object.
    VmRef
);
opaque_ref!(
    /// Reference to a `VIF` object.
    VifRef
);
opaque_ref!(
    /// Reference to an `SR` object.
    SrRef
);
opaque_ref!(
    /// Reference to a `VDI` object.
    VdiRef
);
opaque_ref!(
    /// Reference to a `VBD` object.
    VbdRef
);
opaque_ref!(
    /// Reference to a `PIF` object.
    PifRef
);
opaque_ref!(
    /// Reference to a `VLAN` object.
    VlanRef
);
opaque_ref!(
    /// Reference to a `PCI` object.
    PciRef
);

// =============================================================================
// ENUMS
// =============================================================================

/// VM power state as reported by `VM.power_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VmPowerState {
    Halted,
    Paused,
    Running,
    Suspended,
    #[default]
    #[serde(other)]
    Unknown,
}

/// VBD access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VbdMode {
    /// Read-only
    #[serde(rename = "RO")]
    Ro,
    /// Read-write
    #[default]
    #[serde(rename = "RW")]
    Rw,
}

impl VbdMode {
    /// Wire name (`RO` / `RW`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ro => "RO",
            Self::Rw => "RW",
        }
    }
}

impl fmt::Display for VbdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VbdMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RO" => Ok(Self::Ro),
            "RW" => Ok(Self::Rw),
            _ => Err(ApiError::Parse(format!("invalid VBD mode: {}", s))),
        }
    }
}

/// VBD device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VbdType {
    #[serde(rename = "CD")]
    Cd,
    #[default]
    Disk,
    Floppy,
    #[serde(other)]
    Unknown,
}

// =============================================================================
// RECORDS
// =============================================================================

/// `network.get_record` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkRecord {
    pub uuid: String,
    pub name_label: String,
    pub name_description: String,
    #[serde(rename = "MTU", deserialize_with = "int64")]
    pub mtu: i64,
    pub bridge: String,
    pub other_config: StringMap,
}

/// `VM.get_record` result.
///
/// `platform` is not part of the record; see `VM.get_platform`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmRecord {
    pub uuid: String,
    pub name_label: String,
    pub name_description: String,
    pub power_state: VmPowerState,
    #[serde(rename = "PV_bootloader")]
    pub pv_bootloader: String,
    #[serde(rename = "VCPUs_max", deserialize_with = "int64")]
    pub vcpus_max: i64,
    #[serde(rename = "VCPUs_at_startup", deserialize_with = "int64")]
    pub vcpus_at_startup: i64,
    #[serde(deserialize_with = "int64")]
    pub memory_static_min: i64,
    #[serde(deserialize_with = "int64")]
    pub memory_static_max: i64,
    #[serde(deserialize_with = "int64")]
    pub memory_dynamic_min: i64,
    #[serde(deserialize_with = "int64")]
    pub memory_dynamic_max: i64,
    #[serde(rename = "VIFs")]
    pub vifs: Vec<VifRef>,
    #[serde(rename = "VBDs")]
    pub vbds: Vec<VbdRef>,
    #[serde(rename = "attached_PCIs")]
    pub attached_pcis: Vec<PciRef>,
    pub other_config: StringMap,
    pub xenstore_data: StringMap,
    #[serde(rename = "HVM_boot_params")]
    pub hvm_boot_params: StringMap,
    pub is_a_template: bool,
}

/// `VIF.get_record` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VifRecord {
    pub uuid: String,
    /// Device order as a decimal string (`"0"`, `"1"`, ...)
    pub device: String,
    pub network: NetworkRef,
    #[serde(rename = "VM")]
    pub vm: VmRef,
    #[serde(rename = "MAC")]
    pub mac: String,
    #[serde(rename = "MTU", deserialize_with = "int64")]
    pub mtu: i64,
    #[serde(rename = "MAC_autogenerated")]
    pub mac_autogenerated: bool,
    pub other_config: StringMap,
}

/// `SR.get_record` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrRecord {
    pub uuid: String,
    pub name_label: String,
    pub name_description: String,
    #[serde(rename = "type")]
    pub sr_type: String,
    pub content_type: String,
    pub shared: bool,
    pub sm_config: StringMap,
    pub other_config: StringMap,
}

/// `VDI.get_record` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VdiRecord {
    pub uuid: String,
    pub name_label: String,
    pub name_description: String,
    #[serde(rename = "SR")]
    pub sr: SrRef,
    /// Size in bytes
    #[serde(deserialize_with = "int64")]
    pub virtual_size: i64,
    pub sharable: bool,
    pub read_only: bool,
    pub other_config: StringMap,
}

/// `VBD.get_record` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VbdRecord {
    pub uuid: String,
    #[serde(rename = "VM")]
    pub vm: VmRef,
    #[serde(rename = "VDI")]
    pub vdi: VdiRef,
    pub device: String,
    pub userdevice: String,
    pub bootable: bool,
    pub mode: VbdMode,
    #[serde(rename = "type")]
    pub vbd_type: VbdType,
    pub other_config: StringMap,
}

/// `PIF.get_record` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PifRecord {
    pub uuid: String,
    pub device: String,
    #[serde(rename = "MAC")]
    pub mac: String,
    pub network: NetworkRef,
}

/// `VLAN.get_record` result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VlanRecord {
    pub uuid: String,
    #[serde(rename = "tagged_PIF")]
    pub tagged_pif: PifRef,
    #[serde(rename = "untagged_PIF")]
    pub untagged_pif: PifRef,
    #[serde(deserialize_with = "int64")]
    pub tag: i64,
    pub other_config: StringMap,
}

/// XenAPI `int` fields arrive as JSON numbers over JSON-RPC but as decimal
/// strings from older hosts; accept both.
fn int64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(value) => Ok(value),
        IntOrString::Str(value) => value
            .trim()
            .parse()
            .map_err(serde::de::Error::custom),
    }
}
