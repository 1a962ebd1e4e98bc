//! VM descriptor.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument};
use xenserver_api::{StringMap, VmPowerState, VmRef, XenApi};

use crate::error::{DescriptorKind, Result};
use crate::resolvable::{first_match, Identifier, Resolvable};

/// Inclusive lower/upper bound pair (memory limits, in bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

/// Local snapshot of a `VM` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VmDescriptor {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub power_state: VmPowerState,
    /// True when the VM boots through a PV bootloader
    pub is_pv: bool,
    pub static_memory: Range,
    pub dynamic_memory: Range,
    pub vcpu_count: i64,
    pub vif_count: usize,
    pub vbd_count: usize,
    pub pci_count: usize,
    pub other_config: StringMap,
    pub xenstore_data: StringMap,
    pub hvm_boot_parameters: StringMap,
    pub platform: StringMap,
    pub is_a_template: bool,

    pub vm_ref: VmRef,
}

impl VmDescriptor {
    /// Descriptor to be resolved by name label.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Descriptor to be resolved by UUID.
    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }

    /// Push `static_memory` and `dynamic_memory` in a single call.
    #[instrument(skip(self, api), fields(vm_ref = %self.vm_ref))]
    pub async fn update_memory(&self, api: &dyn XenApi) -> Result<()> {
        api.vm_set_memory_limits(
            &self.vm_ref,
            self.static_memory.min,
            self.static_memory.max,
            self.dynamic_memory.min,
            self.dynamic_memory.max,
        )
        .await?;

        info!(static_memory = ?self.static_memory, dynamic_memory = ?self.dynamic_memory, "VM memory limits updated");
        Ok(())
    }

    /// Push `vcpu_count` as both the maximum and the at-startup VCPU count.
    ///
    /// The two values are set by separate calls; if setting the maximum
    /// fails, the at-startup value is left as it was.
    #[instrument(skip(self, api), fields(vm_ref = %self.vm_ref, vcpus = self.vcpu_count))]
    pub async fn update_vcpus(&self, api: &dyn XenApi) -> Result<()> {
        api.vm_set_vcpus_max(&self.vm_ref, self.vcpu_count).await?;
        api.vm_set_vcpus_at_startup(&self.vm_ref, self.vcpu_count).await?;

        info!("VM VCPUs updated");
        Ok(())
    }
}

#[async_trait]
impl Resolvable for VmDescriptor {
    type Reference = VmRef;

    fn with_reference(reference: VmRef) -> Self {
        Self {
            vm_ref: reference,
            ..Default::default()
        }
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Vm
    }

    fn reference(&self) -> &VmRef {
        &self.vm_ref
    }

    #[instrument(skip(self, api), fields(kind = "VM"))]
    async fn resolve(&mut self, api: &dyn XenApi) -> Result<()> {
        let vm_ref = match Identifier::name_or_uuid(self.kind(), &self.name, &self.uuid)? {
            Identifier::Name(name) => first_match(self.kind(), name, api.vm_get_by_name_label(name).await?)?,
            Identifier::Uuid(uuid) => api.vm_get_by_uuid(uuid).await?,
        };

        debug!(vm_ref = %vm_ref, "Resolved VM");
        self.vm_ref = vm_ref;
        Ok(())
    }

    #[instrument(skip(self, api), fields(kind = "VM"))]
    async fn populate(&mut self, api: &dyn XenApi) -> Result<()> {
        let record = api.vm_get_record(&self.vm_ref).await?;
        // Not part of the record; needs its own call.
        let platform = api.vm_get_platform(&self.vm_ref).await?;

        self.uuid = record.uuid;
        self.name = record.name_label;
        self.description = record.name_description;
        self.power_state = record.power_state;
        self.is_pv = !record.pv_bootloader.is_empty();
        self.vcpu_count = record.vcpus_max;
        self.static_memory = Range::new(record.memory_static_min, record.memory_static_max);
        self.dynamic_memory = Range::new(record.memory_dynamic_min, record.memory_dynamic_max);
        self.vif_count = record.vifs.len();
        self.vbd_count = record.vbds.len();
        self.pci_count = record.attached_pcis.len();
        self.other_config = record.other_config;
        self.xenstore_data = record.xenstore_data;
        self.hvm_boot_parameters = record.hvm_boot_params;
        self.is_a_template = record.is_a_template;
        self.platform = platform;

        Ok(())
    }
}
