//! Storage repository descriptor.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};
use xenserver_api::{SrRef, XenApi};

use crate::error::{DescriptorKind, Result};
use crate::resolvable::{first_match, Identifier, Resolvable};

/// Local snapshot of an `SR` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SrDescriptor {
    pub name: String,
    pub uuid: String,
    pub description: String,
    /// Set by the caller; the SR record does not carry a host
    pub host: String,
    #[serde(rename = "type")]
    pub sr_type: String,
    pub content_type: String,
    pub shared: bool,

    pub sr_ref: SrRef,
}

impl SrDescriptor {
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
impl Resolvable for SrDescriptor {
    type Reference = SrRef;

    fn with_reference(reference: SrRef) -> Self {
        Self {
            sr_ref: reference,
            ..Default::default()
        }
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Sr
    }

    fn reference(&self) -> &SrRef {
        &self.sr_ref
    }

    #[instrument(skip(self, api), fields(kind = "SR"))]
    async fn resolve(&mut self, api: &dyn XenApi) -> Result<()> {
        let sr_ref = match Identifier::name_or_uuid(self.kind(), &self.name, &self.uuid)? {
            Identifier::Name(name) => first_match(self.kind(), name, api.sr_get_by_name_label(name).await?)?,
            Identifier::Uuid(uuid) => api.sr_get_by_uuid(uuid).await?,
        };

        debug!(sr_ref = %sr_ref, "Resolved SR");
        self.sr_ref = sr_ref;
        Ok(())
    }

    #[instrument(skip(self, api), fields(kind = "SR"))]
    async fn populate(&mut self, api: &dyn XenApi) -> Result<()> {
        let record = api.sr_get_record(&self.sr_ref).await?;
        debug!(sm_config = ?record.sm_config, "SR sm_config");

        self.uuid = record.uuid;
        self.name = record.name_label;
        self.description = record.name_description;
        self.shared = record.shared;
        self.sr_type = record.sr_type;
        self.content_type = record.content_type;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DescriptorError;
    use xenserver_api::{MockXenApi, SrRecord};

    #[tokio::test]
    async fn test_duplicate_names_pick_first() {
        let api = MockXenApi::new();
        let first = api
            .insert_sr(SrRecord {
                name_label: "Local storage".to_string(),
                sr_type: "lvm".to_string(),
                ..Default::default()
            })
            .unwrap();
        api.insert_sr(SrRecord {
            name_label: "Local storage".to_string(),
            sr_type: "ext".to_string(),
            ..Default::default()
        })
        .unwrap();

        for _ in 0..2 {
            let mut sr = SrDescriptor::by_name("Local storage");
            sr.load(&api).await.unwrap();
            assert_eq!(sr.sr_ref, first);
            assert_eq!(sr.sr_type, "lvm");
        }
    }

    #[tokio::test]
    async fn test_populate_keeps_host() {
        let api = MockXenApi::new();
        let sr_ref = api
            .insert_sr(SrRecord {
                name_label: "nfs".to_string(),
                content_type: "user".to_string(),
                shared: true,
                ..Default::default()
            })
            .unwrap();

        let mut sr = SrDescriptor::with_reference(sr_ref);
        sr.host = "xen-01".to_string();
        sr.populate(&api).await.unwrap();

        assert!(sr.shared);
        assert_eq!(sr.content_type, "user");
        assert_eq!(sr.host, "xen-01");
    }

    #[tokio::test]
    async fn test_no_identifier() {
        let api = MockXenApi::new();

        let err = SrDescriptor::default().load(&api).await.unwrap_err();
        assert!(matches!(err, DescriptorError::MissingIdentifier { kind: DescriptorKind::Sr, .. }));
        assert!(api.calls().unwrap().is_empty());
    }
}
