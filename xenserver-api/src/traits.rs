//! Core XenAPI capability trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::*;

/// Per-class XenAPI operations.
///
/// An implementation owns the session and the transport; callers only see
/// typed references and records. Every method is a single remote call and
/// returns the backend's error unchanged.
#[async_trait]
pub trait XenApi: Send + Sync {
    // =========================================================================
    // network
    // =========================================================================

    /// `network.get_by_name_label`
    async fn network_get_by_name_label(&self, name: &str) -> Result<Vec<NetworkRef>>;

    /// `network.get_by_uuid`
    async fn network_get_by_uuid(&self, uuid: &str) -> Result<NetworkRef>;

    /// `network.get_record`
    async fn network_get_record(&self, network: &NetworkRef) -> Result<NetworkRecord>;

    // =========================================================================
    // VM
    // =========================================================================

    /// `VM.get_by_name_label`
    async fn vm_get_by_name_label(&self, name: &str) -> Result<Vec<VmRef>>;

    /// `VM.get_by_uuid`
    async fn vm_get_by_uuid(&self, uuid: &str) -> Result<VmRef>;

    /// `VM.get_record`
    async fn vm_get_record(&self, vm: &VmRef) -> Result<VmRecord>;

    /// `VM.get_platform`
    async fn vm_get_platform(&self, vm: &VmRef) -> Result<StringMap>;

    /// `VM.set_memory_limits`
    ///
    /// Sets all four memory bounds in one call.
    async fn vm_set_memory_limits(
        &self,
        vm: &VmRef,
        static_min: i64,
        static_max: i64,
        dynamic_min: i64,
        dynamic_max: i64,
    ) -> Result<()>;

    /// `VM.set_VCPUs_max`
    async fn vm_set_vcpus_max(&self, vm: &VmRef, value: i64) -> Result<()>;

    /// `VM.set_VCPUs_at_startup`
    async fn vm_set_vcpus_at_startup(&self, vm: &VmRef, value: i64) -> Result<()>;

    // =========================================================================
    // VIF
    // =========================================================================

    /// `VIF.get_by_uuid`
    async fn vif_get_by_uuid(&self, uuid: &str) -> Result<VifRef>;

    /// `VIF.get_record`
    async fn vif_get_record(&self, vif: &VifRef) -> Result<VifRecord>;

    // =========================================================================
    // SR
    // =========================================================================

    /// `SR.get_by_name_label`
    async fn sr_get_by_name_label(&self, name: &str) -> Result<Vec<SrRef>>;

    /// `SR.get_by_uuid`
    async fn sr_get_by_uuid(&self, uuid: &str) -> Result<SrRef>;

    /// `SR.get_record`
    async fn sr_get_record(&self, sr: &SrRef) -> Result<SrRecord>;

    // =========================================================================
    // VDI
    // =========================================================================

    /// `VDI.get_by_name_label`
    async fn vdi_get_by_name_label(&self, name: &str) -> Result<Vec<VdiRef>>;

    /// `VDI.get_by_uuid`
    async fn vdi_get_by_uuid(&self, uuid: &str) -> Result<VdiRef>;

    /// `VDI.get_record`
    async fn vdi_get_record(&self, vdi: &VdiRef) -> Result<VdiRecord>;

    // =========================================================================
    // VBD
    // =========================================================================

    /// `VBD.get_by_uuid`
    async fn vbd_get_by_uuid(&self, uuid: &str) -> Result<VbdRef>;

    /// `VBD.get_record`
    async fn vbd_get_record(&self, vbd: &VbdRef) -> Result<VbdRecord>;

    /// `VBD.set_bootable`
    async fn vbd_set_bootable(&self, vbd: &VbdRef, value: bool) -> Result<()>;

    /// `VBD.set_mode`
    async fn vbd_set_mode(&self, vbd: &VbdRef, value: VbdMode) -> Result<()>;

    /// `VBD.set_other_config`
    ///
    /// Replaces the whole map.
    async fn vbd_set_other_config(&self, vbd: &VbdRef, value: &StringMap) -> Result<()>;

    // =========================================================================
    // PIF / VLAN
    // =========================================================================

    /// `PIF.get_by_uuid`
    async fn pif_get_by_uuid(&self, uuid: &str) -> Result<PifRef>;

    /// `PIF.get_record`
    async fn pif_get_record(&self, pif: &PifRef) -> Result<PifRecord>;

    /// `VLAN.get_by_uuid`
    async fn vlan_get_by_uuid(&self, uuid: &str) -> Result<VlanRef>;

    /// `VLAN.get_record`
    async fn vlan_get_record(&self, vlan: &VlanRef) -> Result<VlanRecord>;
}
