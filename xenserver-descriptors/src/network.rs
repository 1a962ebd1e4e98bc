//! Network descriptor.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};
use xenserver_api::{NetworkRef, XenApi};

use crate::error::{DescriptorKind, Result};
use crate::resolvable::{first_match, Identifier, Resolvable};

/// Local snapshot of a `network` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkDescriptor {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub bridge: String,
    pub mtu: i64,

    pub network_ref: NetworkRef,
}

impl NetworkDescriptor {
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
impl Resolvable for NetworkDescriptor {
    type Reference = NetworkRef;

    fn with_reference(reference: NetworkRef) -> Self {
        Self {
            network_ref: reference,
            ..Default::default()
        }
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Network
    }

    fn reference(&self) -> &NetworkRef {
        &self.network_ref
    }

    #[instrument(skip(self, api), fields(kind = "Network"))]
    async fn resolve(&mut self, api: &dyn XenApi) -> Result<()> {
        let network_ref = match Identifier::name_or_uuid(self.kind(), &self.name, &self.uuid)? {
            Identifier::Name(name) => {
                first_match(self.kind(), name, api.network_get_by_name_label(name).await?)?
            }
            Identifier::Uuid(uuid) => api.network_get_by_uuid(uuid).await?,
        };

        debug!(network_ref = %network_ref, "Resolved network");
        self.network_ref = network_ref;
        Ok(())
    }

    #[instrument(skip(self, api), fields(kind = "Network"))]
    async fn populate(&mut self, api: &dyn XenApi) -> Result<()> {
        let record = api.network_get_record(&self.network_ref).await?;

        self.uuid = record.uuid;
        self.name = record.name_label;
        self.description = record.name_description;
        self.mtu = record.mtu;
        self.bridge = record.bridge;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DescriptorError;
    use xenserver_api::{MockXenApi, NetworkRecord};

    fn network(name: &str, bridge: &str) -> NetworkRecord {
        NetworkRecord {
            name_label: name.to_string(),
            name_description: format!("{} network", name),
            bridge: bridge.to_string(),
            mtu: 1500,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_load_by_name() {
        let api = MockXenApi::new();
        let network_ref = api.insert_network(network("prod-net", "xenbr0")).unwrap();

        let mut descriptor = NetworkDescriptor::by_name("prod-net");
        descriptor.load(&api).await.unwrap();

        assert_eq!(descriptor.network_ref, network_ref);
        assert_eq!(descriptor.bridge, "xenbr0");
        assert_eq!(descriptor.mtu, 1500);
        assert_eq!(descriptor.description, "prod-net network");
        assert!(!descriptor.uuid.is_empty());
    }

    #[tokio::test]
    async fn test_load_by_uuid() {
        let api = MockXenApi::new();
        let record = NetworkRecord {
            uuid: "net-uuid".to_string(),
            ..network("storage", "xenbr1")
        };
        api.insert_network(record).unwrap();

        let mut descriptor = NetworkDescriptor::by_uuid("net-uuid");
        descriptor.load(&api).await.unwrap();

        assert_eq!(descriptor.name, "storage");
        assert_eq!(api.methods().unwrap(), vec!["network.get_by_uuid", "network.get_record"]);
    }

    #[tokio::test]
    async fn test_missing_name_is_not_found() {
        let api = MockXenApi::new();

        let mut descriptor = NetworkDescriptor::by_name("prod-net");
        let err = descriptor.load(&api).await.unwrap_err();

        assert!(matches!(err, DescriptorError::NotFound { kind: DescriptorKind::Network, .. }));
        assert!(err.to_string().contains("prod-net"));
        assert!(descriptor.network_ref.is_null());
    }
}
