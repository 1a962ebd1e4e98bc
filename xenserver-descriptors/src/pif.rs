//! PIF descriptor.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};
use xenserver_api::{PifRef, XenApi};

use crate::error::{DescriptorKind, Result};
use crate::resolvable::{require_uuid, Resolvable};

/// Local snapshot of a `PIF` object. Only the UUID is mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PifDescriptor {
    pub uuid: String,

    pub pif_ref: PifRef,
}

impl PifDescriptor {
    /// Descriptor to be resolved by UUID.
    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Resolvable for PifDescriptor {
    type Reference = PifRef;

    fn with_reference(reference: PifRef) -> Self {
        Self {
            pif_ref: reference,
            ..Default::default()
        }
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Pif
    }

    fn reference(&self) -> &PifRef {
        &self.pif_ref
    }

    #[instrument(skip(self, api), fields(kind = "PIF"))]
    async fn resolve(&mut self, api: &dyn XenApi) -> Result<()> {
        let uuid = require_uuid(self.kind(), &self.uuid)?;
        let pif_ref = api.pif_get_by_uuid(uuid).await?;

        debug!(pif_ref = %pif_ref, "Resolved PIF");
        self.pif_ref = pif_ref;
        Ok(())
    }

    #[instrument(skip(self, api), fields(kind = "PIF"))]
    async fn populate(&mut self, api: &dyn XenApi) -> Result<()> {
        let record = api.pif_get_record(&self.pif_ref).await?;
        self.uuid = record.uuid;
        Ok(())
    }
}
