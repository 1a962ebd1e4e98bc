//! VIF descriptor.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use xenserver_api::{StringMap, VifRef, XenApi};

use crate::error::{DescriptorKind, Result};
use crate::network::NetworkDescriptor;
use crate::resolvable::{populate_nested, require_uuid, NestedPolicy, Resolvable};
use crate::vm::VmDescriptor;
use crate::warning::PopulateWarning;

/// Local snapshot of a `VIF` object.
///
/// `network` and `vm` are fetched on the first populate and kept afterwards
/// unless their policy is changed to [`NestedPolicy::AlwaysRefresh`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VifDescriptor {
    pub network: Option<NetworkDescriptor>,
    pub vm: Option<VmDescriptor>,
    pub uuid: String,
    pub mtu: i64,
    pub mac: String,
    pub is_autogenerated_mac: bool,
    /// Device index; 0 when the remote `device` string is not an integer
    pub device_order: i64,
    pub other_config: StringMap,
    pub warnings: Vec<PopulateWarning>,

    #[serde(skip)]
    pub network_policy: NestedPolicy,
    #[serde(skip)]
    pub vm_policy: NestedPolicy,

    pub vif_ref: VifRef,
}

impl Default for VifDescriptor {
    fn default() -> Self {
        Self {
            network: None,
            vm: None,
            uuid: String::new(),
            mtu: 0,
            mac: String::new(),
            is_autogenerated_mac: false,
            device_order: 0,
            other_config: StringMap::new(),
            warnings: Vec::new(),
            network_policy: NestedPolicy::ReuseIfPresent,
            vm_policy: NestedPolicy::ReuseIfPresent,
            vif_ref: VifRef::default(),
        }
    }
}

impl VifDescriptor {
    /// Descriptor to be resolved by UUID.
    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Resolvable for VifDescriptor {
    type Reference = VifRef;

    fn with_reference(reference: VifRef) -> Self {
        Self {
            vif_ref: reference,
            ..Default::default()
        }
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Vif
    }

    fn reference(&self) -> &VifRef {
        &self.vif_ref
    }

    #[instrument(skip(self, api), fields(kind = "VIF"))]
    async fn resolve(&mut self, api: &dyn XenApi) -> Result<()> {
        let uuid = require_uuid(self.kind(), &self.uuid)?;
        let vif_ref = api.vif_get_by_uuid(uuid).await?;

        debug!(vif_ref = %vif_ref, "Resolved VIF");
        self.vif_ref = vif_ref;
        Ok(())
    }

    #[instrument(skip(self, api), fields(kind = "VIF"))]
    async fn populate(&mut self, api: &dyn XenApi) -> Result<()> {
        let record = api.vif_get_record(&self.vif_ref).await?;

        self.warnings.clear();
        self.uuid = record.uuid;
        self.mtu = record.mtu;
        self.device_order = match record.device.parse() {
            Ok(order) => order,
            Err(_) => {
                let warning = PopulateWarning::UnparsableDeviceOrder {
                    device: record.device.clone(),
                };
                warn!(vif_uuid = %self.uuid, "{}", warning);
                self.warnings.push(warning);
                0
            }
        };
        self.is_autogenerated_mac = record.mac_autogenerated;
        self.mac = record.mac;
        self.other_config = record.other_config;

        populate_nested(&mut self.network, self.network_policy, &record.network, api).await?;
        populate_nested(&mut self.vm, self.vm_policy, &record.vm, api).await?;

        Ok(())
    }
}
