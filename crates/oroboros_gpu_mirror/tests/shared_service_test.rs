//! Integration test: one host service shared by an update stage and a render stage.

use std::sync::Arc;
use std::thread;

use bytemuck::{Pod, Zeroable};
use oroboros_gpu_mirror::{GpuBufferService, GpuMirrorBuffer, GpuRecord, HostBufferService};

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
struct LightRecord {
    color: [f32; 4],
    radius: f32,
    index: u32,
    _pad: [u32; 2],
}

impl GpuRecord for LightRecord {
    const NAME: &'static str = "lights";
}

#[test]
fn test_render_stage_sees_update_stage_writes() {
    let service = Arc::new(HostBufferService::new());
    let mut lights: GpuMirrorBuffer<LightRecord> =
        GpuMirrorBuffer::new(service.clone(), 64).unwrap();
    let buffer = lights.buffer_id();

    // Update stage: runs to completion before the render stage starts
    let update = thread::spawn(move || {
        for i in 0..64 {
            let record = LightRecord {
                color: [1.0, 0.5, 0.25, 1.0],
                radius: i as f32,
                index: i,
                _pad: [0; 2],
            };
            lights.write(i, &record).unwrap();
        }
        lights
    });
    let lights = update.join().unwrap();

    // Render stage: reads the raw buffer, never the mirror
    let render_service = Arc::clone(&service);
    let render = thread::spawn(move || {
        let bytes = render_service.resident_bytes(buffer).unwrap();
        bytes
            .chunks_exact(LightRecord::STRIDE)
            .map(bytemuck::pod_read_unaligned::<LightRecord>)
            .map(|r| r.index)
            .sum::<u32>()
    });

    assert_eq!(render.join().unwrap(), (0..64).sum::<u32>());
    assert_eq!(lights.read(10).unwrap().radius, 10.0);
    assert_eq!(service.write_count(), 64);
}

#[test]
fn test_raw_service_read_matches_record_bytes() {
    let service = HostBufferService::new();
    let buffer = service
        .create_buffer(LightRecord::NAME, LightRecord::STRIDE, 4)
        .unwrap();

    let record = LightRecord {
        color: [0.0, 1.0, 0.0, 1.0],
        radius: 3.5,
        index: 2,
        _pad: [0; 2],
    };
    service.write(buffer, 2, bytemuck::bytes_of(&record)).unwrap();

    let mut out = LightRecord::zeroed();
    service
        .read(buffer, 2, bytemuck::bytes_of_mut(&mut out))
        .unwrap();
    assert_eq!(out, record);
}
