//! Integration tests for the descriptor graph.
//!
//! These tests load whole object graphs from the mock backend and check the
//! call sequence the descriptors produce.

use xenserver_api::{
    method, MockXenApi, NetworkRecord, SrRecord, VbdMode, VbdRecord, VdiRecord, VifRecord, VifRef, VbdRef,
    VmPowerState, VmRecord,
};
use xenserver_descriptors::{
    DescriptorError, DescriptorKind, NetworkDescriptor, Resolvable, SrDescriptor, VbdDescriptor, VdiDescriptor,
    VifDescriptor, VmDescriptor,
};

struct Graph {
    api: MockXenApi,
    vif: VifRef,
    vbd: VbdRef,
}

/// One running VM with a NIC on "lan" and a root disk on "nfs-sr".
fn graph() -> Graph {
    let api = MockXenApi::new();

    let sr = api
        .insert_sr(SrRecord {
            uuid: "sr-uuid".to_string(),
            name_label: "nfs-sr".to_string(),
            sr_type: "nfs".to_string(),
            shared: true,
            ..Default::default()
        })
        .unwrap();
    let vdi = api
        .insert_vdi(VdiRecord {
            uuid: "vdi-uuid".to_string(),
            name_label: "web-01 root".to_string(),
            sr,
            virtual_size: 8 * 1024 * 1024 * 1024,
            ..Default::default()
        })
        .unwrap();
    let network = api
        .insert_network(NetworkRecord {
            uuid: "net-uuid".to_string(),
            name_label: "lan".to_string(),
            bridge: "xenbr0".to_string(),
            mtu: 1500,
            ..Default::default()
        })
        .unwrap();
    let vm = api
        .insert_vm(VmRecord {
            uuid: "vm-uuid".to_string(),
            name_label: "web-01".to_string(),
            power_state: VmPowerState::Running,
            vcpus_max: 2,
            memory_static_min: 512,
            memory_static_max: 2048,
            memory_dynamic_min: 1024,
            memory_dynamic_max: 2048,
            ..Default::default()
        })
        .unwrap();
    let vif = api
        .insert_vif(VifRecord {
            uuid: "vif-uuid".to_string(),
            device: "0".to_string(),
            network,
            vm: vm.clone(),
            mac: "aa:bb:cc:00:00:01".to_string(),
            mtu: 1500,
            ..Default::default()
        })
        .unwrap();
    let vbd = api
        .insert_vbd(VbdRecord {
            uuid: "vbd-uuid".to_string(),
            vm,
            vdi,
            device: "xvda".to_string(),
            userdevice: "0".to_string(),
            bootable: true,
            mode: VbdMode::Rw,
            ..Default::default()
        })
        .unwrap();

    Graph { api, vif, vbd }
}

/// A VIF pulls in its network and VM.
#[tokio::test]
async fn test_vif_graph() {
    let g = graph();

    let mut vif = VifDescriptor::by_uuid("vif-uuid");
    vif.load(&g.api).await.unwrap();

    assert_eq!(vif.vif_ref, g.vif);
    let network = vif.network.as_ref().unwrap();
    assert_eq!(network.name, "lan");
    assert_eq!(network.bridge, "xenbr0");
    let vm = vif.vm.as_ref().unwrap();
    assert_eq!(vm.name, "web-01");
    assert_eq!(vm.dynamic_memory.min, 1024);

    assert_eq!(
        g.api.methods().unwrap(),
        vec![
            method::VIF_GET_BY_UUID,
            method::VIF_GET_RECORD,
            method::NETWORK_GET_RECORD,
            method::VM_GET_RECORD,
            method::VM_GET_PLATFORM,
        ]
    );
}

/// A VBD pulls in its VM, then its VDI and the VDI's SR.
#[tokio::test]
async fn test_vbd_graph() {
    let g = graph();

    let mut vbd = VbdDescriptor::by_uuid("vbd-uuid");
    vbd.load(&g.api).await.unwrap();

    assert_eq!(vbd.vbd_ref, g.vbd);
    assert!(vbd.bootable);
    assert_eq!(vbd.vm.as_ref().unwrap().uuid, "vm-uuid");
    let vdi = vbd.vdi.as_ref().unwrap();
    assert_eq!(vdi.uuid, "vdi-uuid");
    let sr = vdi.sr.as_ref().unwrap();
    assert_eq!(sr.uuid, "sr-uuid");
    assert_eq!(sr.sr_type, "nfs");

    assert_eq!(
        g.api.methods().unwrap(),
        vec![
            method::VBD_GET_BY_UUID,
            method::VBD_GET_RECORD,
            method::VM_GET_RECORD,
            method::VM_GET_PLATFORM,
            method::VDI_GET_RECORD,
            method::SR_GET_RECORD,
        ]
    );
}

/// Populating twice against an unchanged server gives the same descriptor.
#[tokio::test]
async fn test_populate_is_idempotent() {
    let g = graph();

    let mut vbd = VbdDescriptor::with_reference(g.vbd.clone());
    vbd.populate(&g.api).await.unwrap();
    let first = vbd.clone();
    vbd.populate(&g.api).await.unwrap();
    assert_eq!(vbd, first);

    let mut vif = VifDescriptor::with_reference(g.vif.clone());
    vif.populate(&g.api).await.unwrap();
    let first = vif.clone();
    vif.populate(&g.api).await.unwrap();
    assert_eq!(vif, first);
}

/// Name lookups with several matches take the first one, every time.
#[tokio::test]
async fn test_duplicate_names_resolve_to_first() {
    let g = graph();
    let duplicate = g
        .api
        .insert_network(NetworkRecord { name_label: "lan".to_string(), ..Default::default() })
        .unwrap();

    let mut network = NetworkDescriptor::by_name("lan");
    network.load(&g.api).await.unwrap();
    assert_eq!(network.uuid, "net-uuid");
    assert_ne!(network.network_ref, duplicate);
}

/// Name-or-UUID kinds fail before any remote call when both are empty.
#[tokio::test]
async fn test_missing_identifier_makes_no_calls() {
    let g = graph();

    let errors = vec![
        NetworkDescriptor::default().resolve(&g.api).await.unwrap_err(),
        VmDescriptor::default().resolve(&g.api).await.unwrap_err(),
        SrDescriptor::default().resolve(&g.api).await.unwrap_err(),
        VdiDescriptor::default().resolve(&g.api).await.unwrap_err(),
    ];

    let kinds: Vec<_> = errors
        .iter()
        .map(|e| match e {
            DescriptorError::MissingIdentifier { kind, .. } => *kind,
            other => panic!("unexpected error: {:?}", other),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![DescriptorKind::Network, DescriptorKind::Vm, DescriptorKind::Sr, DescriptorKind::Vdi]
    );
    assert_eq!(
        errors[2].to_string(),
        "Storage repository: either name_label or uuid should be specified"
    );
    assert!(g.api.calls().unwrap().is_empty());
}

/// A failing nested fetch fails the parent and stops the chain.
#[tokio::test]
async fn test_nested_failure_propagates() {
    let g = graph();
    g.api.fail_on(method::NETWORK_GET_RECORD).unwrap();

    let mut vif = VifDescriptor::with_reference(g.vif.clone());
    let err = vif.populate(&g.api).await.unwrap_err();

    assert!(matches!(err, DescriptorError::Remote(_)));
    assert!(vif.network.is_none());
    assert!(vif.vm.is_none());
    assert_eq!(
        g.api.methods().unwrap(),
        vec![method::VIF_GET_RECORD, method::NETWORK_GET_RECORD]
    );
}

/// An object destroyed after resolve surfaces as a remote error on populate.
#[tokio::test]
async fn test_destroyed_object() {
    let g = graph();

    let mut vm = VmDescriptor::by_uuid("vm-uuid");
    vm.resolve(&g.api).await.unwrap();
    g.api.destroy(vm.vm_ref.as_str()).unwrap();

    match vm.populate(&g.api).await.unwrap_err() {
        DescriptorError::Remote(e) => assert_eq!(e.code(), Some("HANDLE_INVALID")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(vm.name, "");
}

/// Unknown names are reported with the kind and the name.
#[tokio::test]
async fn test_unknown_name() {
    let g = graph();

    let err = VdiDescriptor::by_name("swap").load(&g.api).await.unwrap_err();
    assert_eq!(err.to_string(), "VDI \"swap\" not found");
}
