//! VBD descriptor.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use xenserver_api::{StringMap, VbdMode, VbdRef, VbdType, XenApi};

use crate::error::{DescriptorKind, Result};
use crate::resolvable::{populate_nested, require_uuid, NestedPolicy, Resolvable};
use crate::template_device;
use crate::vdi::VdiDescriptor;
use crate::vm::VmDescriptor;
use crate::warning::PopulateWarning;

/// Local snapshot of a `VBD` object.
///
/// The attached VM and VDI are re-fetched on every populate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VbdDescriptor {
    pub uuid: String,
    pub vm: Option<VmDescriptor>,
    pub vdi: Option<VdiDescriptor>,
    pub device: String,
    pub user_device: String,
    pub mode: VbdMode,
    #[serde(rename = "type")]
    pub vbd_type: VbdType,
    pub bootable: bool,
    pub other_config: StringMap,
    /// Stored in `other_config`, see [`template_device`]
    pub is_template_device: bool,
    pub warnings: Vec<PopulateWarning>,

    #[serde(skip)]
    pub vm_policy: NestedPolicy,
    #[serde(skip)]
    pub vdi_policy: NestedPolicy,

    pub vbd_ref: VbdRef,
}

impl VbdDescriptor {
    /// Descriptor to be resolved by UUID.
    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }

    /// Push `bootable`, `mode` and the template-device flag.
    ///
    /// Three separate calls, in that order. The flag is written into the
    /// local `other_config` just before the whole map is pushed. The first
    /// failing call aborts the rest; calls already made are not undone.
    #[instrument(skip(self, api), fields(vbd_ref = %self.vbd_ref))]
    pub async fn commit(&mut self, api: &dyn XenApi) -> Result<()> {
        api.vbd_set_bootable(&self.vbd_ref, self.bootable).await?;
        api.vbd_set_mode(&self.vbd_ref, self.mode).await?;

        template_device::encode(&mut self.other_config, self.is_template_device);
        api.vbd_set_other_config(&self.vbd_ref, &self.other_config).await?;

        info!(bootable = self.bootable, mode = %self.mode, template_device = self.is_template_device, "VBD committed");
        Ok(())
    }
}

#[async_trait]
impl Resolvable for VbdDescriptor {
    type Reference = VbdRef;

    fn with_reference(reference: VbdRef) -> Self {
        Self {
            vbd_ref: reference,
            ..Default::default()
        }
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Vbd
    }

    fn reference(&self) -> &VbdRef {
        &self.vbd_ref
    }

    #[instrument(skip(self, api), fields(kind = "VBD"))]
    async fn resolve(&mut self, api: &dyn XenApi) -> Result<()> {
        let uuid = require_uuid(self.kind(), &self.uuid)?;
        let vbd_ref = api.vbd_get_by_uuid(uuid).await?;

        debug!(vbd_ref = %vbd_ref, "Resolved VBD");
        self.vbd_ref = vbd_ref;
        Ok(())
    }

    #[instrument(skip(self, api), fields(kind = "VBD"))]
    async fn populate(&mut self, api: &dyn XenApi) -> Result<()> {
        debug!(vbd_ref = %self.vbd_ref, "Populating VBD");
        let record = api.vbd_get_record(&self.vbd_ref).await?;

        self.warnings.clear();
        self.uuid = record.uuid;
        self.vbd_type = record.vbd_type;
        self.device = record.device;
        self.user_device = record.userdevice;
        self.bootable = record.bootable;
        self.mode = record.mode;
        self.other_config = record.other_config;

        self.is_template_device = match template_device::decode(&self.other_config) {
            Ok(flag) => flag,
            Err(warning) => {
                warn!(vbd_uuid = %self.uuid, "{}", warning);
                self.warnings.push(warning);
                false
            }
        };

        populate_nested(&mut self.vm, self.vm_policy, &record.vm, api).await?;
        populate_nested(&mut self.vdi, self.vdi_policy, &record.vdi, api).await?;

        Ok(())
    }
}
