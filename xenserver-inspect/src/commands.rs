//! Subcommand handlers.
//!
//! Every handler takes the backend as `&dyn XenApi` and returns the
//! descriptor it ended up with, as JSON, for `main` to print.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};
use xenserver_api::{VbdMode, XenApi};
use xenserver_descriptors::{
    NetworkDescriptor, PifDescriptor, Range, Resolvable, SrDescriptor, VbdDescriptor, VdiDescriptor, VifDescriptor,
    VlanDescriptor, VmDescriptor,
};

use crate::cli::{Command, ObjectKind};

/// Run one subcommand against `api`.
pub async fn run(command: &Command, api: &dyn XenApi) -> Result<Value> {
    match command {
        Command::Show { kind, name, uuid } => show(*kind, name.as_deref(), uuid.as_deref(), api).await,
        Command::SetMemory {
            uuid,
            static_min,
            static_max,
            dynamic_min,
            dynamic_max,
        } => {
            set_memory(
                uuid,
                Range::new(*static_min, *static_max),
                Range::new(*dynamic_min, *dynamic_max),
                api,
            )
            .await
        }
        Command::SetVcpus { uuid, count } => set_vcpus(uuid, *count, api).await,
        Command::SetVbd {
            uuid,
            bootable,
            mode,
            template_device,
        } => {
            let mode = mode
                .as_deref()
                .map(str::parse::<VbdMode>)
                .transpose()
                .context("Invalid --mode")?;
            set_vbd(uuid, *bootable, mode, *template_device, api).await
        }
    }
}

/// Load one object by name or UUID.
#[instrument(skip(api))]
pub async fn show(kind: ObjectKind, name: Option<&str>, uuid: Option<&str>, api: &dyn XenApi) -> Result<Value> {
    let name = name.unwrap_or_default().to_string();
    let uuid = uuid.unwrap_or_default().to_string();

    if !name.is_empty() && !kind.accepts_name() {
        bail!("{:?} objects can only be looked up by --uuid", kind);
    }

    match kind {
        ObjectKind::Network => load(NetworkDescriptor { name, uuid, ..Default::default() }, api).await,
        ObjectKind::Vm => load(VmDescriptor { name, uuid, ..Default::default() }, api).await,
        ObjectKind::Sr => load(SrDescriptor { name, uuid, ..Default::default() }, api).await,
        ObjectKind::Vdi => load(VdiDescriptor { name, uuid, ..Default::default() }, api).await,
        ObjectKind::Vif => load(VifDescriptor::by_uuid(uuid), api).await,
        ObjectKind::Vbd => load(VbdDescriptor::by_uuid(uuid), api).await,
        ObjectKind::Pif => load(PifDescriptor::by_uuid(uuid), api).await,
        ObjectKind::Vlan => load(VlanDescriptor::by_uuid(uuid), api).await,
    }
}

async fn load<D>(mut descriptor: D, api: &dyn XenApi) -> Result<Value>
where
    D: Resolvable + Serialize,
{
    descriptor
        .load(api)
        .await
        .with_context(|| format!("Failed to load {}", descriptor.kind()))?;
    to_json(&descriptor)
}

fn to_json<D: Serialize>(descriptor: &D) -> Result<Value> {
    serde_json::to_value(descriptor).context("Failed to serialize descriptor")
}

/// Push new memory limits, then re-read the VM.
#[instrument(skip(api))]
pub async fn set_memory(uuid: &str, static_memory: Range, dynamic_memory: Range, api: &dyn XenApi) -> Result<Value> {
    if static_memory.min > dynamic_memory.min
        || dynamic_memory.min > dynamic_memory.max
        || dynamic_memory.max > static_memory.max
    {
        bail!("Memory limits must satisfy static_min <= dynamic_min <= dynamic_max <= static_max");
    }

    let mut vm = VmDescriptor::by_uuid(uuid);
    vm.load(api).await.context("Failed to load VM")?;

    vm.static_memory = static_memory;
    vm.dynamic_memory = dynamic_memory;
    vm.update_memory(api).await.context("Failed to update VM memory")?;
    vm.populate(api).await.context("Failed to reload VM")?;

    info!(vm = %vm.name, "Memory limits applied");
    to_json(&vm)
}

/// Push a new VCPU count, then re-read the VM.
#[instrument(skip(api))]
pub async fn set_vcpus(uuid: &str, count: i64, api: &dyn XenApi) -> Result<Value> {
    if count < 1 {
        bail!("VCPU count must be at least 1");
    }

    let mut vm = VmDescriptor::by_uuid(uuid);
    vm.load(api).await.context("Failed to load VM")?;

    vm.vcpu_count = count;
    vm.update_vcpus(api).await.context("Failed to update VM VCPUs")?;
    vm.populate(api).await.context("Failed to reload VM")?;

    info!(vm = %vm.name, vcpus = count, "VCPU count applied");
    to_json(&vm)
}

/// Change the given VBD fields, commit, then re-read the VBD.
#[instrument(skip(api))]
pub async fn set_vbd(
    uuid: &str,
    bootable: Option<bool>,
    mode: Option<VbdMode>,
    template_device: Option<bool>,
    api: &dyn XenApi,
) -> Result<Value> {
    let mut vbd = VbdDescriptor::by_uuid(uuid);
    vbd.load(api).await.context("Failed to load VBD")?;

    if let Some(bootable) = bootable {
        vbd.bootable = bootable;
    }
    if let Some(mode) = mode {
        vbd.mode = mode;
    }
    if let Some(template_device) = template_device {
        vbd.is_template_device = template_device;
    }

    vbd.commit(api).await.context("Failed to commit VBD")?;
    vbd.populate(api).await.context("Failed to reload VBD")?;

    info!(vbd = %vbd.uuid, "VBD changes applied");
    to_json(&vbd)
}
