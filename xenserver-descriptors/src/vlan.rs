//! VLAN descriptor.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};
use xenserver_api::{PifRef, StringMap, VlanRef, XenApi};

use crate::error::{DescriptorKind, Result};
use crate::pif::PifDescriptor;
use crate::resolvable::{require_uuid, Resolvable};

/// Local snapshot of a `VLAN` object.
///
/// Either PIF may be absent on the server; the matching descriptor is then
/// left at its default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VlanDescriptor {
    pub uuid: String,
    pub tag: i64,
    pub tagged_pif: PifDescriptor,
    pub untagged_pif: PifDescriptor,
    pub other_config: StringMap,

    pub vlan_ref: VlanRef,
}

impl VlanDescriptor {
    /// Descriptor to be resolved by UUID.
    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }
}

async fn load_pif(reference: &PifRef, api: &dyn XenApi) -> Result<PifDescriptor> {
    if reference.is_null() {
        return Ok(PifDescriptor::default());
    }
    let mut pif = PifDescriptor::with_reference(reference.clone());
    pif.populate(api).await?;
    Ok(pif)
}

#[async_trait]
impl Resolvable for VlanDescriptor {
    type Reference = VlanRef;

    fn with_reference(reference: VlanRef) -> Self {
        Self {
            vlan_ref: reference,
            ..Default::default()
        }
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Vlan
    }

    fn reference(&self) -> &VlanRef {
        &self.vlan_ref
    }

    #[instrument(skip(self, api), fields(kind = "VLAN"))]
    async fn resolve(&mut self, api: &dyn XenApi) -> Result<()> {
        let uuid = require_uuid(self.kind(), &self.uuid)?;
        let vlan_ref = api.vlan_get_by_uuid(uuid).await?;

        debug!(vlan_ref = %vlan_ref, "Resolved VLAN");
        self.vlan_ref = vlan_ref;
        Ok(())
    }

    #[instrument(skip(self, api), fields(kind = "VLAN"))]
    async fn populate(&mut self, api: &dyn XenApi) -> Result<()> {
        let record = api.vlan_get_record(&self.vlan_ref).await?;

        self.uuid = record.uuid;
        self.tag = record.tag;
        self.other_config = record.other_config;

        // Tagged first, then untagged.
        self.tagged_pif = load_pif(&record.tagged_pif, api).await?;
        self.untagged_pif = load_pif(&record.untagged_pif, api).await?;

        Ok(())
    }
}
