//! Mock XenAPI backend for testing and development.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::method;
use crate::traits::XenApi;
use crate::types::*;

/// A call observed by [`MockXenApi`], in the order it was issued.
///
/// `params` mirrors the JSON-RPC parameter list without the session.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub method: String,
    pub params: Vec<Value>,
}

/// Mock XenAPI backend.
///
/// Keeps objects in memory, in insertion order, so name lookups return
/// duplicates in a stable order. Useful for:
/// - Unit and integration testing of the descriptor layer
/// - Development without a XenServer host
///
/// Setter calls update the stored records, so a commit followed by a fresh
/// `get_record` sees the new values.
pub struct MockXenApi {
    state: RwLock<MockState>,
}

struct MockState {
    networks: Table<NetworkRecord>,
    vms: Table<VmRecord>,
    platforms: HashMap<String, StringMap>,
    vifs: Table<VifRecord>,
    srs: Table<SrRecord>,
    vdis: Table<VdiRecord>,
    vbds: Table<VbdRecord>,
    pifs: Table<PifRecord>,
    vlans: Table<VlanRecord>,
    calls: Vec<MockCall>,
    failures: HashSet<String>,
}

impl MockXenApi {
    /// Create an empty mock backend.
    pub fn new() -> Self {
        info!("Creating mock XenAPI backend");
        Self {
            state: RwLock::new(MockState {
                networks: Table::new("network"),
                vms: Table::new("VM"),
                platforms: HashMap::new(),
                vifs: Table::new("VIF"),
                srs: Table::new("SR"),
                vdis: Table::new("VDI"),
                vbds: Table::new("VBD"),
                pifs: Table::new("PIF"),
                vlans: Table::new("VLAN"),
                calls: Vec::new(),
                failures: HashSet::new(),
            }),
        }
    }

    fn state(&self) -> Result<RwLockWriteGuard<'_, MockState>> {
        self.state
            .write()
            .map_err(|_| ApiError::Internal("Lock poisoned".to_string()))
    }

    /// Record the call, then fail it if a failure was injected for `method`.
    fn begin(&self, method: &str, params: Vec<Value>) -> Result<RwLockWriteGuard<'_, MockState>> {
        let mut state = self.state()?;
        debug!(method = %method, "Mock XenAPI call");
        state.calls.push(MockCall {
            method: method.to_string(),
            params,
        });
        if state.failures.contains(method) {
            return Err(ApiError::failure("INTERNAL_ERROR", [format!("injected failure for {}", method)]));
        }
        Ok(state)
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    /// Store a network and return its reference.
    pub fn insert_network(&self, mut record: NetworkRecord) -> Result<NetworkRef> {
        fill_uuid(&mut record.uuid);
        let mut state = self.state()?;
        Ok(NetworkRef::new(state.networks.insert(record)))
    }

    /// Store a VM and return its reference.
    pub fn insert_vm(&self, mut record: VmRecord) -> Result<VmRef> {
        fill_uuid(&mut record.uuid);
        let mut state = self.state()?;
        Ok(VmRef::new(state.vms.insert(record)))
    }

    /// Set the map returned by `VM.get_platform`.
    pub fn set_vm_platform(&self, vm: &VmRef, platform: StringMap) -> Result<()> {
        let mut state = self.state()?;
        state.vms.record(vm.as_str())?;
        state.platforms.insert(vm.to_string(), platform);
        Ok(())
    }

    /// Store a VIF and return its reference.
    pub fn insert_vif(&self, mut record: VifRecord) -> Result<VifRef> {
        fill_uuid(&mut record.uuid);
        let mut state = self.state()?;
        Ok(VifRef::new(state.vifs.insert(record)))
    }

    /// Store an SR and return its reference.
    pub fn insert_sr(&self, mut record: SrRecord) -> Result<SrRef> {
        fill_uuid(&mut record.uuid);
        let mut state = self.state()?;
        Ok(SrRef::new(state.srs.insert(record)))
    }

    /// Store a VDI and return its reference.
    pub fn insert_vdi(&self, mut record: VdiRecord) -> Result<VdiRef> {
        fill_uuid(&mut record.uuid);
        let mut state = self.state()?;
        Ok(VdiRef::new(state.vdis.insert(record)))
    }

    /// Store a VBD and return its reference.
    pub fn insert_vbd(&self, mut record: VbdRecord) -> Result<VbdRef> {
        fill_uuid(&mut record.uuid);
        let mut state = self.state()?;
        Ok(VbdRef::new(state.vbds.insert(record)))
    }

    /// Store a PIF and return its reference.
    pub fn insert_pif(&self, mut record: PifRecord) -> Result<PifRef> {
        fill_uuid(&mut record.uuid);
        let mut state = self.state()?;
        Ok(PifRef::new(state.pifs.insert(record)))
    }

    /// Store a VLAN and return its reference.
    pub fn insert_vlan(&self, mut record: VlanRecord) -> Result<VlanRef> {
        fill_uuid(&mut record.uuid);
        let mut state = self.state()?;
        Ok(VlanRef::new(state.vlans.insert(record)))
    }

    /// Delete an object of any class, as if another client destroyed it.
    pub fn destroy(&self, reference: &str) -> Result<()> {
        let mut state = self.state()?;
        state.networks.remove(reference);
        state.vms.remove(reference);
        state.platforms.remove(reference);
        state.vifs.remove(reference);
        state.srs.remove(reference);
        state.vdis.remove(reference);
        state.vbds.remove(reference);
        state.pifs.remove(reference);
        state.vlans.remove(reference);
        Ok(())
    }

    /// Current stored VM record.
    pub fn vm_record(&self, vm: &VmRef) -> Result<VmRecord> {
        self.state()?.vms.record(vm.as_str())
    }

    /// Current stored VBD record.
    pub fn vbd_record(&self, vbd: &VbdRef) -> Result<VbdRecord> {
        self.state()?.vbds.record(vbd.as_str())
    }

    // =========================================================================
    // Failure injection and call log
    // =========================================================================

    /// Make every subsequent call to `method` fail.
    pub fn fail_on(&self, method: &str) -> Result<()> {
        self.state()?.failures.insert(method.to_string());
        Ok(())
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) -> Result<()> {
        self.state()?.failures.clear();
        Ok(())
    }

    /// All calls issued so far.
    pub fn calls(&self) -> Result<Vec<MockCall>> {
        Ok(self.state()?.calls.clone())
    }

    /// Method names of all calls issued so far.
    pub fn methods(&self) -> Result<Vec<String>> {
        Ok(self.state()?.calls.iter().map(|c| c.method.clone()).collect())
    }

    /// Forget the call log.
    pub fn clear_calls(&self) -> Result<()> {
        self.state()?.calls.clear();
        Ok(())
    }
}

impl Default for MockXenApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl XenApi for MockXenApi {
    async fn network_get_by_name_label(&self, name: &str) -> Result<Vec<NetworkRef>> {
        let state = self.begin(method::NETWORK_GET_BY_NAME_LABEL, vec![json!(name)])?;
        Ok(state.networks.find_name(name).into_iter().map(NetworkRef::new).collect())
    }

    async fn network_get_by_uuid(&self, uuid: &str) -> Result<NetworkRef> {
        let state = self.begin(method::NETWORK_GET_BY_UUID, vec![json!(uuid)])?;
        state.networks.find_uuid(uuid).map(NetworkRef::new)
    }

    async fn network_get_record(&self, network: &NetworkRef) -> Result<NetworkRecord> {
        let state = self.begin(method::NETWORK_GET_RECORD, vec![json!(network)])?;
        state.networks.record(network.as_str())
    }

    async fn vm_get_by_name_label(&self, name: &str) -> Result<Vec<VmRef>> {
        let state = self.begin(method::VM_GET_BY_NAME_LABEL, vec![json!(name)])?;
        Ok(state.vms.find_name(name).into_iter().map(VmRef::new).collect())
    }

    async fn vm_get_by_uuid(&self, uuid: &str) -> Result<VmRef> {
        let state = self.begin(method::VM_GET_BY_UUID, vec![json!(uuid)])?;
        state.vms.find_uuid(uuid).map(VmRef::new)
    }

    async fn vm_get_record(&self, vm: &VmRef) -> Result<VmRecord> {
        let state = self.begin(method::VM_GET_RECORD, vec![json!(vm)])?;
        state.vms.record(vm.as_str())
    }

    async fn vm_get_platform(&self, vm: &VmRef) -> Result<StringMap> {
        let state = self.begin(method::VM_GET_PLATFORM, vec![json!(vm)])?;
        state.vms.record(vm.as_str())?;
        Ok(state.platforms.get(vm.as_str()).cloned().unwrap_or_default())
    }

    async fn vm_set_memory_limits(
        &self,
        vm: &VmRef,
        static_min: i64,
        static_max: i64,
        dynamic_min: i64,
        dynamic_max: i64,
    ) -> Result<()> {
        let mut state = self.begin(
            method::VM_SET_MEMORY_LIMITS,
            vec![json!(vm), json!(static_min), json!(static_max), json!(dynamic_min), json!(dynamic_max)],
        )?;
        let record = state.vms.record_mut(vm.as_str())?;
        record.memory_static_min = static_min;
        record.memory_static_max = static_max;
        record.memory_dynamic_min = dynamic_min;
        record.memory_dynamic_max = dynamic_max;
        Ok(())
    }

    async fn vm_set_vcpus_max(&self, vm: &VmRef, value: i64) -> Result<()> {
        let mut state = self.begin(method::VM_SET_VCPUS_MAX, vec![json!(vm), json!(value)])?;
        state.vms.record_mut(vm.as_str())?.vcpus_max = value;
        Ok(())
    }

    async fn vm_set_vcpus_at_startup(&self, vm: &VmRef, value: i64) -> Result<()> {
        let mut state = self.begin(method::VM_SET_VCPUS_AT_STARTUP, vec![json!(vm), json!(value)])?;
        state.vms.record_mut(vm.as_str())?.vcpus_at_startup = value;
        Ok(())
    }

    async fn vif_get_by_uuid(&self, uuid: &str) -> Result<VifRef> {
        let state = self.begin(method::VIF_GET_BY_UUID, vec![json!(uuid)])?;
        state.vifs.find_uuid(uuid).map(VifRef::new)
    }

    async fn vif_get_record(&self, vif: &VifRef) -> Result<VifRecord> {
        let state = self.begin(method::VIF_GET_RECORD, vec![json!(vif)])?;
        state.vifs.record(vif.as_str())
    }

    async fn sr_get_by_name_label(&self, name: &str) -> Result<Vec<SrRef>> {
        let state = self.begin(method::SR_GET_BY_NAME_LABEL, vec![json!(name)])?;
        Ok(state.srs.find_name(name).into_iter().map(SrRef::new).collect())
    }

    async fn sr_get_by_uuid(&self, uuid: &str) -> Result<SrRef> {
        let state = self.begin(method::SR_GET_BY_UUID, vec![json!(uuid)])?;
        state.srs.find_uuid(uuid).map(SrRef::new)
    }

    async fn sr_get_record(&self, sr: &SrRef) -> Result<SrRecord> {
        let state = self.begin(method::SR_GET_RECORD, vec![json!(sr)])?;
        state.srs.record(sr.as_str())
    }

    async fn vdi_get_by_name_label(&self, name: &str) -> Result<Vec<VdiRef>> {
        let state = self.begin(method::VDI_GET_BY_NAME_LABEL, vec![json!(name)])?;
        Ok(state.vdis.find_name(name).into_iter().map(VdiRef::new).collect())
    }

    async fn vdi_get_by_uuid(&self, uuid: &str) -> Result<VdiRef> {
        let state = self.begin(method::VDI_GET_BY_UUID, vec![json!(uuid)])?;
        state.vdis.find_uuid(uuid).map(VdiRef::new)
    }

    async fn vdi_get_record(&self, vdi: &VdiRef) -> Result<VdiRecord> {
        let state = self.begin(method::VDI_GET_RECORD, vec![json!(vdi)])?;
        state.vdis.record(vdi.as_str())
    }

    async fn vbd_get_by_uuid(&self, uuid: &str) -> Result<VbdRef> {
        let state = self.begin(method::VBD_GET_BY_UUID, vec![json!(uuid)])?;
        state.vbds.find_uuid(uuid).map(VbdRef::new)
    }

    async fn vbd_get_record(&self, vbd: &VbdRef) -> Result<VbdRecord> {
        let state = self.begin(method::VBD_GET_RECORD, vec![json!(vbd)])?;
        state.vbds.record(vbd.as_str())
    }

    async fn vbd_set_bootable(&self, vbd: &VbdRef, value: bool) -> Result<()> {
        let mut state = self.begin(method::VBD_SET_BOOTABLE, vec![json!(vbd), json!(value)])?;
        state.vbds.record_mut(vbd.as_str())?.bootable = value;
        Ok(())
    }

    async fn vbd_set_mode(&self, vbd: &VbdRef, value: VbdMode) -> Result<()> {
        let mut state = self.begin(method::VBD_SET_MODE, vec![json!(vbd), json!(value)])?;
        state.vbds.record_mut(vbd.as_str())?.mode = value;
        Ok(())
    }

    async fn vbd_set_other_config(&self, vbd: &VbdRef, value: &StringMap) -> Result<()> {
        let mut state = self.begin(method::VBD_SET_OTHER_CONFIG, vec![json!(vbd), json!(value)])?;
        state.vbds.record_mut(vbd.as_str())?.other_config = value.clone();
        Ok(())
    }

    async fn pif_get_by_uuid(&self, uuid: &str) -> Result<PifRef> {
        let state = self.begin(method::PIF_GET_BY_UUID, vec![json!(uuid)])?;
        state.pifs.find_uuid(uuid).map(PifRef::new)
    }

    async fn pif_get_record(&self, pif: &PifRef) -> Result<PifRecord> {
        let state = self.begin(method::PIF_GET_RECORD, vec![json!(pif)])?;
        state.pifs.record(pif.as_str())
    }

    async fn vlan_get_by_uuid(&self, uuid: &str) -> Result<VlanRef> {
        let state = self.begin(method::VLAN_GET_BY_UUID, vec![json!(uuid)])?;
        state.vlans.find_uuid(uuid).map(VlanRef::new)
    }

    async fn vlan_get_record(&self, vlan: &VlanRef) -> Result<VlanRecord> {
        let state = self.begin(method::VLAN_GET_RECORD, vec![json!(vlan)])?;
        state.vlans.record(vlan.as_str())
    }
}

fn fill_uuid(uuid: &mut String) {
    if uuid.is_empty() {
        *uuid = Uuid::new_v4().to_string();
    }
}

/// Objects of one class, keyed by reference, in insertion order.
struct Table<R> {
    class: &'static str,
    rows: Vec<(String, R)>,
}

trait MockObject: Clone {
    fn uuid(&self) -> &str;

    fn name_label(&self) -> &str {
        ""
    }
}

impl<R: MockObject> Table<R> {
    fn new(class: &'static str) -> Self {
        Self { class, rows: Vec::new() }
    }

    fn insert(&mut self, record: R) -> String {
        let reference = format!("OpaqueRef:{}", Uuid::new_v4());
        self.rows.push((reference.clone(), record));
        reference
    }

    fn remove(&mut self, reference: &str) {
        self.rows.retain(|(r, _)| r != reference);
    }

    fn record(&self, reference: &str) -> Result<R> {
        self.rows
            .iter()
            .find(|(r, _)| r == reference)
            .map(|(_, record)| record.clone())
            .ok_or_else(|| ApiError::failure("HANDLE_INVALID", [self.class, reference]))
    }

    fn record_mut(&mut self, reference: &str) -> Result<&mut R> {
        self.rows
            .iter_mut()
            .find(|(r, _)| r == reference)
            .map(|(_, record)| record)
            .ok_or_else(|| ApiError::failure("HANDLE_INVALID", [self.class, reference]))
    }

    fn find_uuid(&self, uuid: &str) -> Result<String> {
        self.rows
            .iter()
            .find(|(_, record)| record.uuid() == uuid)
            .map(|(r, _)| r.clone())
            .ok_or_else(|| ApiError::failure("UUID_INVALID", [self.class, uuid]))
    }

    fn find_name(&self, name: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter(|(_, record)| record.name_label() == name)
            .map(|(r, _)| r.clone())
            .collect()
    }
}

macro_rules! mock_object {
    ($record:ty) => {
        impl MockObject for $record {
            fn uuid(&self) -> &str {
                &self.uuid
            }
        }
    };
    ($record:ty, named) => {
        impl MockObject for $record {
            fn uuid(&self) -> &str {
                &self.uuid
            }

            fn name_label(&self) -> &str {
                &self.name_label
            }
        }
    };
}

mock_object!(NetworkRecord, named);
mock_object!(VmRecord, named);
mock_object!(SrRecord, named);
mock_object!(VdiRecord, named);
mock_object!(VifRecord);
mock_object!(VbdRecord);
mock_object!(PifRecord);
mock_object!(VlanRecord);
