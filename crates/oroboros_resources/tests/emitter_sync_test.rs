//! Integration test: emitter lifecycle against a host-resident GPU buffer.
//!
//! The host service plays both the device and the simulation pass: tests
//! write accumulator values straight into the buffer the way the compute
//! step would, then check what the CPU write protocol does with them.

use std::sync::Arc;

use oroboros_resources::{
    merge_record, EmitterConfig, EmitterManager, EmitterRecord, GpuBufferService, GpuError, GpuRecord, Handle,
    HostBufferService, Node, NodeManager, ResourceError, INVALID_INDEX,
};
use oroboros_resources::emitter::MAX_EMITTERS;

fn setup(hide_on_destroy: bool) -> (Arc<HostBufferService>, EmitterManager) {
    let service = Arc::new(HostBufferService::new());
    let emitters = EmitterManager::new(service.clone(), MAX_EMITTERS, hide_on_destroy).unwrap();
    (service, emitters)
}

/// Overwrites the resident accumulator of `slot`, as the simulation pass would.
fn simulate_step(service: &HostBufferService, emitters: &EmitterManager, slot: u32, accumulator: f32) {
    let buffer = emitters.mirror().buffer_id();
    let mut bytes = [0u8; EmitterRecord::STRIDE];
    service.read(buffer, slot, &mut bytes).unwrap();

    let mut record: EmitterRecord = bytemuck::pod_read_unaligned(&bytes);
    record.time_accumulator = accumulator;
    service.write(buffer, slot, bytemuck::bytes_of(&record)).unwrap();
}

fn node(index: u32) -> Handle<Node> {
    Handle::from_raw_parts(index, 0)
}

#[test]
fn test_rate_change_keeps_running_accumulator() {
    let (service, mut emitters) = setup(false);
    let handle = emitters
        .create(node(0), EmitterConfig::default().with_emission_rate(5.0))
        .unwrap();
    assert_eq!(emitters.record(handle).unwrap().time_accumulator, 0.0);

    simulate_step(&service, &emitters, handle.index(), 2.3);

    emitters.get_mut(handle).unwrap().config.emission_rate = 8.0;
    emitters.write_to_gpu(handle, true).unwrap();

    let record = emitters.record(handle).unwrap();
    assert_eq!(record.emission_rate, 8.0);
    assert_eq!(record.time_accumulator, 2.3);
    assert_eq!(record.visible, 1);
}

#[test]
fn test_write_without_preserve_resets_accumulator() {
    let (service, mut emitters) = setup(false);
    let handle = emitters.create(node(0), EmitterConfig::default()).unwrap();

    simulate_step(&service, &emitters, handle.index(), 7.75);
    emitters.write_to_gpu(handle, false).unwrap();

    assert_eq!(emitters.record(handle).unwrap().time_accumulator, 0.0);
}

#[test]
fn test_destroyed_slot_reused_with_next_generation() {
    let (_, mut emitters) = setup(false);
    let first = emitters.create(node(0), EmitterConfig::default()).unwrap();
    let second = emitters.create(node(1), EmitterConfig::default()).unwrap();
    let third = emitters.create(node(2), EmitterConfig::default()).unwrap();
    assert_eq!([first.index(), second.index(), third.index()], [0, 1, 2]);

    assert!(emitters.destroy(second));
    let fourth = emitters
        .create(node(3), EmitterConfig::default().with_emission_rate(42.0))
        .unwrap();

    assert_eq!(fourth.index(), second.index());
    assert_eq!(fourth.generation(), second.generation() + 1);

    assert!(emitters.get(second).unwrap_err().is_invalid_handle());
    assert!(emitters.write_to_gpu(second, true).unwrap_err().is_invalid_handle());
    assert!(!emitters.destroy(second));

    assert_eq!(emitters.get(fourth).unwrap().config.emission_rate, 42.0);
    assert_eq!(emitters.count(), 3);
}

#[test]
fn test_index_past_capacity_touches_nothing() {
    let (service, mut emitters) = setup(false);
    emitters.create(node(0), EmitterConfig::default()).unwrap();

    let buffer = emitters.mirror().buffer_id();
    let before = service.resident_bytes(buffer).unwrap();
    let writes = service.write_count();

    let outside = Handle::from_raw_parts(MAX_EMITTERS, 0);
    let error = emitters.write_to_gpu(outside, true).unwrap_err();

    assert_eq!(
        error,
        ResourceError::Gpu(GpuError::OutOfCapacity {
            index: MAX_EMITTERS,
            capacity: MAX_EMITTERS,
        })
    );
    assert!(error.is_capacity());
    assert_eq!(service.resident_bytes(buffer).unwrap(), before);
    assert_eq!(service.write_count(), writes);
}

#[test]
fn test_every_slot_reads_back_what_was_written() {
    let (_, mut emitters) = setup(false);

    let handles: Vec<_> = (0..MAX_EMITTERS)
        .map(|i| {
            let config = EmitterConfig::default()
                .with_emission_rate(i as f32)
                .with_lifetime(0.5 + i as f32);
            emitters.create(node(i), config).unwrap()
        })
        .collect();

    for handle in handles {
        let expected = merge_record(emitters.get(handle).unwrap(), None);
        assert_eq!(emitters.record(handle).unwrap(), expected);
        assert_eq!(emitters.mirror().read(handle.index()).unwrap().node_index, handle.index());
    }
}

#[test]
fn test_full_pool_rejects_create_without_writing() {
    let service = Arc::new(HostBufferService::new());
    let mut emitters = EmitterManager::new(service.clone(), 2, false).unwrap();
    emitters.create(node(0), EmitterConfig::default()).unwrap();
    emitters.create(node(1), EmitterConfig::default()).unwrap();
    let writes = service.write_count();

    let error = emitters.create(node(2), EmitterConfig::default()).unwrap_err();
    assert!(error.is_capacity());
    assert_eq!(emitters.count(), 2);
    assert_eq!(service.write_count(), writes);
}

#[test]
fn test_failed_create_produces_no_handle() {
    let (service, mut emitters) = setup(false);
    service.fail_next_write(GpuError::OutOfDeviceMemory);

    let result = emitters.create(node(0), EmitterConfig::default());
    assert_eq!(result, Err(ResourceError::Gpu(GpuError::OutOfDeviceMemory)));
    assert_eq!(emitters.count(), 0);
    assert_eq!(emitters.iter().count(), 0);

    let handle = emitters.create(node(0), EmitterConfig::default()).unwrap();
    assert_eq!(handle.index(), 0);
}

#[test]
fn test_device_error_leaves_previous_record() {
    let (service, mut emitters) = setup(false);
    let handle = emitters
        .create(node(0), EmitterConfig::default().with_emission_rate(5.0))
        .unwrap();
    simulate_step(&service, &emitters, handle.index(), 1.25);

    emitters.update(handle, EmitterConfig::default().with_emission_rate(9.0)).unwrap();
    service.fail_next_write(GpuError::DeviceLost);

    let error = emitters.write_to_gpu(handle, true).unwrap_err();
    assert_eq!(error, ResourceError::Gpu(GpuError::DeviceLost));

    let record = emitters.record(handle).unwrap();
    assert_eq!(record.emission_rate, 5.0);
    assert_eq!(record.time_accumulator, 1.25);
}

#[test]
fn test_texture_binding_reaches_record() {
    let (_, mut emitters) = setup(false);
    let handle = emitters.create(node(0), EmitterConfig::default()).unwrap();
    assert_eq!(emitters.record(handle).unwrap().texture_index, INVALID_INDEX);

    emitters.set_texture(handle, Some(Handle::from_raw_parts(17, 3))).unwrap();
    emitters.write_to_gpu(handle, true).unwrap();
    assert_eq!(emitters.record(handle).unwrap().texture_index, 17);

    emitters.set_texture(handle, None).unwrap();
    emitters.write_to_gpu(handle, true).unwrap();
    assert_eq!(emitters.record(handle).unwrap().texture_index, INVALID_INDEX);
}

#[test]
fn test_stale_node_index_is_written() {
    let (_, mut emitters) = setup(false);
    let mut nodes = NodeManager::new(8);
    let _anchor = nodes.create(Node::default()).unwrap();
    let target = nodes.create(Node::default()).unwrap();

    let handle = emitters.create(target, EmitterConfig::default()).unwrap();
    assert!(nodes.destroy(target));

    emitters.write_to_gpu(handle, true).unwrap();
    assert_eq!(emitters.record(handle).unwrap().node_index, target.index());
    assert!(!nodes.is_alive(emitters.get(handle).unwrap().node()));
}

#[test]
fn test_destroy_keeps_stale_record_visible_by_default() {
    let (_, mut emitters) = setup(false);
    let handle = emitters.create(node(0), EmitterConfig::default()).unwrap();

    assert!(emitters.destroy(handle));
    assert_eq!(emitters.mirror().read(handle.index()).unwrap().visible, 1);
}

#[test]
fn test_hide_on_destroy_clears_visibility() {
    let (service, mut emitters) = setup(true);
    let handle = emitters.create(node(0), EmitterConfig::default()).unwrap();
    simulate_step(&service, &emitters, handle.index(), 3.0);

    assert!(emitters.destroy(handle));

    let record = emitters.mirror().read(handle.index()).unwrap();
    assert_eq!(record.visible, 0);
    assert_eq!(record.time_accumulator, 3.0);
}

#[test]
fn test_hide_on_destroy_failure_still_destroys() {
    let (service, mut emitters) = setup(true);
    let handle = emitters.create(node(0), EmitterConfig::default()).unwrap();
    service.fail_next_write(GpuError::DeviceLost);

    assert!(emitters.destroy(handle));
    assert_eq!(emitters.count(), 0);
}

#[test]
fn test_dropped_manager_returns_its_buffer() {
    let service = Arc::new(HostBufferService::with_budget(4 * EmitterRecord::STRIDE));

    // A level reload rebuilds its emitters on the same device every time
    for _ in 0..3 {
        let mut emitters = EmitterManager::new(service.clone(), 4, false).unwrap();
        let handle = emitters.create(node(0), EmitterConfig::default()).unwrap();
        assert_eq!(emitters.record(handle).unwrap().visible, 1);
        assert_eq!(service.allocated_bytes(), 4 * EmitterRecord::STRIDE);

        drop(emitters);
        assert_eq!(service.allocated_bytes(), 0);
    }
}
