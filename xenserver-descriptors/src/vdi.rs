//! VDI descriptor.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};
use xenserver_api::{VdiRef, XenApi};

use crate::error::{DescriptorKind, Result};
use crate::resolvable::{first_match, populate_nested, Identifier, NestedPolicy, Resolvable};
use crate::sr::SrDescriptor;

/// Local snapshot of a `VDI` object. The owning SR is re-fetched on every populate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VdiDescriptor {
    pub name: String,
    pub uuid: String,
    pub sr: Option<SrDescriptor>,
    pub is_shared: bool,
    pub is_read_only: bool,
    /// Virtual size in bytes
    pub size: i64,

    #[serde(skip)]
    pub sr_policy: NestedPolicy,

    pub vdi_ref: VdiRef,
}

impl VdiDescriptor {
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
}

#[async_trait]
impl Resolvable for VdiDescriptor {
    type Reference = VdiRef;

    fn with_reference(reference: VdiRef) -> Self {
        Self {
            vdi_ref: reference,
            ..Default::default()
        }
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Vdi
    }

    fn reference(&self) -> &VdiRef {
        &self.vdi_ref
    }

    #[instrument(skip(self, api), fields(kind = "VDI"))]
    async fn resolve(&mut self, api: &dyn XenApi) -> Result<()> {
        let vdi_ref = match Identifier::name_or_uuid(self.kind(), &self.name, &self.uuid)? {
            Identifier::Name(name) => first_match(self.kind(), name, api.vdi_get_by_name_label(name).await?)?,
            Identifier::Uuid(uuid) => api.vdi_get_by_uuid(uuid).await?,
        };

        debug!(vdi_ref = %vdi_ref, "Resolved VDI");
        self.vdi_ref = vdi_ref;
        Ok(())
    }

    #[instrument(skip(self, api), fields(kind = "VDI"))]
    async fn populate(&mut self, api: &dyn XenApi) -> Result<()> {
        let record = api.vdi_get_record(&self.vdi_ref).await?;

        self.uuid = record.uuid;
        self.name = record.name_label;
        self.is_read_only = record.read_only;
        self.is_shared = record.sharable;
        self.size = record.virtual_size;

        populate_nested(&mut self.sr, self.sr_policy, &record.sr, api).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xenserver_api::{method, MockXenApi, SrRecord, VdiRecord};

    fn setup() -> (MockXenApi, VdiRef) {
        let api = MockXenApi::new();
        let sr = api
            .insert_sr(SrRecord { name_label: "nfs-sr".to_string(), ..Default::default() })
            .unwrap();
        let vdi = api
            .insert_vdi(VdiRecord {
                name_label: "root disk".to_string(),
                sr,
                virtual_size: 10 * 1024 * 1024 * 1024,
                sharable: false,
                read_only: true,
                ..Default::default()
            })
            .unwrap();
        (api, vdi)
    }

    #[tokio::test]
    async fn test_load_by_name() {
        let (api, vdi_ref) = setup();

        let mut vdi = VdiDescriptor::by_name("root disk");
        vdi.load(&api).await.unwrap();

        assert_eq!(vdi.vdi_ref, vdi_ref);
        assert_eq!(vdi.size, 10 * 1024 * 1024 * 1024);
        assert!(vdi.is_read_only);
        assert!(!vdi.is_shared);
        assert_eq!(vdi.sr.as_ref().map(|sr| sr.name.as_str()), Some("nfs-sr"));
    }

    #[tokio::test]
    async fn test_sr_is_always_refreshed() {
        let (api, vdi_ref) = setup();

        let mut vdi = VdiDescriptor::with_reference(vdi_ref);
        vdi.populate(&api).await.unwrap();
        api.clear_calls().unwrap();

        vdi.populate(&api).await.unwrap();
        assert_eq!(api.methods().unwrap(), vec![method::VDI_GET_RECORD, method::SR_GET_RECORD]);
    }

    #[tokio::test]
    async fn test_sr_failure_fails_populate() {
        let (api, vdi_ref) = setup();
        api.fail_on(method::SR_GET_RECORD).unwrap();

        let mut vdi = VdiDescriptor::with_reference(vdi_ref);
        assert!(vdi.populate(&api).await.is_err());
        assert!(vdi.sr.is_none());
    }
}
