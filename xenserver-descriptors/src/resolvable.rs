//! The resolve/populate capability shared by every descriptor.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tracing::debug;
use xenserver_api::XenApi;

use crate::error::{DescriptorError, DescriptorKind, Result};

/// Identifier fields accepted by name-or-UUID kinds.
pub(crate) const NAME_OR_UUID: &str = "either name_label or uuid";

/// Identifier field accepted by UUID-only kinds.
pub(crate) const UUID_ONLY: &str = "uuid";

/// Two-phase access to a remote object.
///
/// `resolve` turns the human identifier (name label and/or UUID) into an
/// opaque reference; `populate` fetches the record behind the reference and
/// overwrites every mapped field. `load` runs both.
#[async_trait]
pub trait Resolvable: Send {
    /// Opaque reference type for this class.
    type Reference: Clone + fmt::Display + Send + Sync;

    /// Build a descriptor that only knows its reference, ready for `populate`.
    fn with_reference(reference: Self::Reference) -> Self
    where
        Self: Sized;

    /// Which class this descriptor mirrors.
    fn kind(&self) -> DescriptorKind;

    /// Current reference (null until resolved or constructed with one).
    fn reference(&self) -> &Self::Reference;

    /// Look up the reference from the identifier fields.
    ///
    /// Fails with `MissingIdentifier` before issuing any remote call when no
    /// accepted identifier is set.
    async fn resolve(&mut self, api: &dyn XenApi) -> Result<()>;

    /// Fetch the record for the current reference into this descriptor.
    async fn populate(&mut self, api: &dyn XenApi) -> Result<()>;

    /// Resolve, then populate.
    async fn load(&mut self, api: &dyn XenApi) -> Result<()> {
        self.resolve(api).await?;
        self.populate(api).await
    }
}

/// How a nested descriptor is handled when its parent is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NestedPolicy {
    /// Keep an already-present nested descriptor untouched; fetch only when absent.
    ReuseIfPresent,
    /// Rebuild and re-fetch the nested descriptor on every populate.
    #[default]
    AlwaysRefresh,
}

/// The identifier a name-or-UUID resolve will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Identifier<'a> {
    Name(&'a str),
    Uuid(&'a str),
}

impl<'a> Identifier<'a> {
    /// Name wins over UUID; neither is an error.
    pub(crate) fn name_or_uuid(kind: DescriptorKind, name: &'a str, uuid: &'a str) -> Result<Self> {
        if !name.is_empty() {
            Ok(Self::Name(name))
        } else if !uuid.is_empty() {
            Ok(Self::Uuid(uuid))
        } else {
            Err(DescriptorError::MissingIdentifier {
                kind,
                fields: NAME_OR_UUID,
            })
        }
    }
}

/// The UUID for a UUID-only resolve.
pub(crate) fn require_uuid(kind: DescriptorKind, uuid: &str) -> Result<&str> {
    if uuid.is_empty() {
        return Err(DescriptorError::MissingIdentifier {
            kind,
            fields: UUID_ONLY,
        });
    }
    Ok(uuid)
}

/// First reference of a name lookup, in the order the server returned them.
pub(crate) fn first_match<R>(kind: DescriptorKind, name: &str, references: Vec<R>) -> Result<R> {
    if references.len() > 1 {
        debug!(kind = %kind, name = %name, matches = references.len(), "Name is ambiguous, using first match");
    }
    references.into_iter().next().ok_or_else(|| DescriptorError::NotFound {
        kind,
        name: name.to_string(),
    })
}

/// Populate the nested descriptor in `slot` from `reference` according to `policy`.
///
/// On failure `slot` keeps its previous value and the error is returned.
pub(crate) async fn populate_nested<T>(
    slot: &mut Option<T>,
    policy: NestedPolicy,
    reference: &T::Reference,
    api: &dyn XenApi,
) -> Result<()>
where
    T: Resolvable,
{
    if let Some(present) = slot.as_ref() {
        if policy == NestedPolicy::ReuseIfPresent {
            debug!(kind = %present.kind(), reference = %present.reference(), "Reusing nested descriptor");
            return Ok(());
        }
    }

    let mut nested = T::with_reference(reference.clone());
    debug!(kind = %nested.kind(), reference = %nested.reference(), "Populating nested descriptor");
    nested.populate(api).await?;
    *slot = Some(nested);
    Ok(())
}
