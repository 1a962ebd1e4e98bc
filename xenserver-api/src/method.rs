//! XenAPI wire method names.
//!
//! Shared by the JSON-RPC backend (which sends them) and the mock backend
//! (which records them in its call log).

pub const NETWORK_GET_BY_NAME_LABEL: &str = "network.get_by_name_label";
pub const NETWORK_GET_BY_UUID: &str = "network.get_by_uuid";
pub const NETWORK_GET_RECORD: &str = "network.get_record";

pub const VM_GET_BY_NAME_LABEL: &str = "VM.get_by_name_label";
pub const VM_GET_BY_UUID: &str = "VM.get_by_uuid";
pub const VM_GET_RECORD: &str = "VM.get_record";
pub const VM_GET_PLATFORM: &str = "VM.get_platform";
pub const VM_SET_MEMORY_LIMITS: &str = "VM.set_memory_limits";
pub const VM_SET_VCPUS_MAX: &str = "VM.set_VCPUs_max";
pub const VM_SET_VCPUS_AT_STARTUP: &str = "VM.set_VCPUs_at_startup";

pub const VIF_GET_BY_UUID: &str = "VIF.get_by_uuid";
pub const VIF_GET_RECORD: &str = "VIF.get_record";

pub const SR_GET_BY_NAME_LABEL: &str = "SR.get_by_name_label";
pub const SR_GET_BY_UUID: &str = "SR.get_by_uuid";
pub const SR_GET_RECORD: &str = "SR.get_record";

pub const VDI_GET_BY_NAME_LABEL: &str = "VDI.get_by_name_label";
pub const VDI_GET_BY_UUID: &str = "VDI.get_by_uuid";
pub const VDI_GET_RECORD: &str = "VDI.get_record";

pub const VBD_GET_BY_UUID: &str = "VBD.get_by_uuid";
pub const VBD_GET_RECORD: &str = "VBD.get_record";
pub const VBD_SET_BOOTABLE: &str = "VBD.set_bootable";
pub const VBD_SET_MODE: &str = "VBD.set_mode";
pub const VBD_SET_OTHER_CONFIG: &str = "VBD.set_other_config";

pub const PIF_GET_BY_UUID: &str = "PIF.get_by_uuid";
pub const PIF_GET_RECORD: &str = "PIF.get_record";

pub const VLAN_GET_BY_UUID: &str = "VLAN.get_by_uuid";
pub const VLAN_GET_RECORD: &str = "VLAN.get_record";
