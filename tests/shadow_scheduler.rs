use glam::{Mat4, Vec3};
use kestrel_shadows::camera3d::Camera3D;
use kestrel_shadows::config::ShadowConfig;
use kestrel_shadows::light::{Light, LightArray, LightKind};
use kestrel_shadows::renderer::{BackendCommand, DrawItem, MeshHandle, RecordingBackend};
use kestrel_shadows::scene::Scene;
use kestrel_shadows::shadow::{ShadowFrameInput, ShadowFrameStats, ShadowScheduler, SHADOW_MAP_RESOLUTION};

fn scene(lights: &[Light]) -> Scene {
    let camera = Camera3D::new(Vec3::new(0.0, 6.0, 18.0), Vec3::ZERO, 60f32.to_radians(), 0.1, 150.0);
    Scene::new(camera, lights.iter().copied().collect::<LightArray>())
}

fn draws() -> Vec<DrawItem> {
    vec![
        DrawItem::new(MeshHandle(1), Mat4::from_scale(Vec3::new(50.0, 1.0, 50.0))),
        DrawItem::new(MeshHandle(0), Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0))),
        DrawItem::new(MeshHandle(0), Mat4::from_translation(Vec3::new(4.0, 1.0, 2.0))),
    ]
}

fn frame(
    scheduler: &mut ShadowScheduler<RecordingBackend>,
    backend: &mut RecordingBackend,
    scene: &Scene,
    config: &ShadowConfig,
) -> anyhow::Result<ShadowFrameStats> {
    let draws = draws();
    scheduler.render_frame(backend, ShadowFrameInput { scene, aspect: 16.0 / 9.0, config, draws: &draws })
}

fn sun() -> Light {
    Light::directional(Vec3::new(0.4, -0.8, 0.35))
}

#[test]
fn non_casting_light_is_lit_but_never_depth_rendered() {
    let scene = scene(&[sun(), Light::point(Vec3::new(2.0, 4.0, 0.0)).with_shadows(false)]);
    let config = ShadowConfig::default();
    let mut backend = RecordingBackend::new();
    let mut scheduler = ShadowScheduler::new();
    let stats = frame(&mut scheduler, &mut backend, &scene, &config).expect("frame");

    assert_eq!(backend.depth_draws_for_slot(1), 0);
    assert!(backend.allocations_for_slot(1).is_empty());
    assert_eq!(stats.lit_lights, 2);
    assert_eq!(stats.shadowed_lights, 1);
    let lit = backend.lit_passes();
    assert_eq!(lit.len(), 1);
    match lit[0] {
        BackendCommand::LitPass { bound, uniform, draws } => {
            assert_eq!(uniform.counts[0], 2);
            assert!(bound[0].is_some());
            assert!(bound[1].is_none());
            assert_eq!(*draws, 3);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn directional_to_spot_toggle_reallocates_to_one_slice() {
    let config = ShadowConfig {
        cascade_percentages: vec![5.0, 10.0, 20.0, 30.0, 45.0, 60.0, 80.0, 100.0],
        ..ShadowConfig::default()
    };
    let mut scene = scene(&[sun()]);
    let mut backend = RecordingBackend::new();
    let mut scheduler = ShadowScheduler::new();

    let first = frame(&mut scheduler, &mut backend, &scene, &config).expect("directional frame");
    assert_eq!(first.depth_passes, 8);
    assert_eq!(backend.allocations_for_slot(0), vec![8]);

    let spot = Light::spot(Vec3::new(0.0, 8.0, 0.0), Vec3::NEG_Y, 20.0, 30.0);
    assert!(scene.set_light(0, spot));
    backend.clear();
    let second = frame(&mut scheduler, &mut backend, &scene, &config).expect("spot frame");
    assert_eq!(second.reallocations, 1);
    assert_eq!(second.depth_passes, 1);
    assert_eq!(backend.allocations_for_slot(0), vec![1]);

    let commands = backend.commands();
    let alloc = commands
        .iter()
        .position(|cmd| matches!(cmd, BackendCommand::CreateDepthTarget { slot: 0, .. }))
        .expect("allocation");
    let first_depth = commands
        .iter()
        .position(|cmd| matches!(cmd, BackendCommand::ClearDepthSlice { slot: 0, .. }))
        .expect("depth pass");
    assert!(alloc < first_depth, "reallocation must precede the next depth pass");
    let camera = scheduler.light_camera(0).expect("light camera");
    assert_eq!(camera.kind(), LightKind::Spot);
    assert_eq!(camera.depth_layers(), 1);
}

#[test]
fn steady_frames_do_not_reallocate() {
    let scene = scene(&[sun(), Light::spot(Vec3::new(-3.0, 6.0, 2.0), Vec3::new(0.3, -1.0, 0.0), 15.0, 25.0)]);
    let config = ShadowConfig::default();
    let mut backend = RecordingBackend::new();
    let mut scheduler = ShadowScheduler::new();
    assert_eq!(frame(&mut scheduler, &mut backend, &scene, &config).expect("frame").reallocations, 2);
    for _ in 0..3 {
        assert_eq!(frame(&mut scheduler, &mut backend, &scene, &config).expect("frame").reallocations, 0);
    }
}

#[test]
fn unmoving_scene_produces_identical_boxes_each_frame() {
    let scene = scene(&[sun()]);
    let config = ShadowConfig::default();
    let mut backend = RecordingBackend::new();
    let mut scheduler = ShadowScheduler::new();

    frame(&mut scheduler, &mut backend, &scene, &config).expect("first frame");
    let camera = scheduler.light_camera(0).expect("camera");
    let first: Vec<_> = (0..camera.cascade_count()).map(|c| camera.cascade_box(c).copied()).collect();
    let first_matrices = camera.view_projections().to_vec();

    frame(&mut scheduler, &mut backend, &scene, &config).expect("second frame");
    let camera = scheduler.light_camera(0).expect("camera");
    let second: Vec<_> = (0..camera.cascade_count()).map(|c| camera.cascade_box(c).copied()).collect();
    assert!(first.iter().all(Option::is_some));
    assert_eq!(first, second);
    assert_eq!(first_matrices, camera.view_projections().to_vec());
}

#[test]
fn invalid_slot_is_skipped_entirely() {
    let mut empty = sun();
    empty.kind = LightKind::None;
    let scene = scene(&[empty, sun()]);
    let config = ShadowConfig::default();
    let mut backend = RecordingBackend::new();
    let mut scheduler = ShadowScheduler::new();
    let stats = frame(&mut scheduler, &mut backend, &scene, &config).expect("frame");
    assert_eq!(stats.lit_lights, 1);
    assert_eq!(backend.depth_draws_for_slot(0), 0);
    assert_eq!(backend.depth_draws_for_slot(1), config.cascade_percentages.len());
}

#[test]
fn allocation_failure_is_fatal() {
    let scene = scene(&[sun()]);
    let config = ShadowConfig::default();
    let mut backend = RecordingBackend::new();
    backend.fail_allocations(true);
    let mut scheduler = ShadowScheduler::new();
    let err = frame(&mut scheduler, &mut backend, &scene, &config).unwrap_err();
    assert!(format!("{err:#}").contains("light slot 0"), "error should name the slot: {err:#}");
    assert!(backend.lit_passes().is_empty());
}

#[test]
fn shadow_casting_flag_only_filters_depth_casters() {
    let scene = scene(&[sun()]);
    let config = ShadowConfig { cascade_percentages: vec![100.0], ..ShadowConfig::default() };
    let mut draws = draws();
    draws[0] = draws[0].with_shadows(false);
    draws[2].visible = false;
    let mut backend = RecordingBackend::new();
    let mut scheduler = ShadowScheduler::new();
    scheduler
        .render_frame(&mut backend, ShadowFrameInput { scene: &scene, aspect: 1.0, config: &config, draws: &draws })
        .expect("frame");
    let depth_draws: Vec<usize> = backend
        .commands()
        .iter()
        .filter_map(|cmd| match cmd {
            BackendCommand::DrawDepth { draws, .. } => Some(*draws),
            _ => None,
        })
        .collect();
    assert_eq!(depth_draws, vec![2]);
    match backend.lit_passes()[0] {
        BackendCommand::LitPass { draws, .. } => assert_eq!(*draws, 2),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn lit_pass_receives_each_lights_matrices_and_shadow_flags() {
    let spot = Light::spot(Vec3::new(-3.0, 6.0, 2.0), Vec3::new(0.3, -1.0, 0.0), 15.0, 25.0);
    let lamp = Light::point(Vec3::new(2.0, 4.0, 0.0)).with_shadows(false);
    let scene = scene(&[sun(), spot, lamp]);
    let config = ShadowConfig {
        cascade_percentages: vec![25.0, 50.0, 100.0],
        sample_count: 12,
        pcf_enabled: true,
        ..ShadowConfig::default()
    };
    let mut backend = RecordingBackend::new();
    let mut scheduler = ShadowScheduler::new();
    frame(&mut scheduler, &mut backend, &scene, &config).expect("frame");
    let uniform = backend.last_lit_uniform().expect("lit pass uniform");

    let splits = scheduler.splits().expect("splits");
    assert_eq!(uniform.cascades.cascade_count(), 3);
    for (cascade, boundary) in splits.boundaries().iter().enumerate() {
        assert_eq!(uniform.cascades.boundary(cascade), *boundary);
    }
    assert_eq!(uniform.cascades.params, [3, 12, 1, SHADOW_MAP_RESOLUTION]);
    assert_eq!(uniform.counts[0], 3);

    let expected_info = [
        [LightKind::Directional.gpu_tag(), 3, 1, 0],
        [LightKind::Spot.gpu_tag(), 1, 1, 1],
        [LightKind::Point.gpu_tag(), 0, 0, 2],
    ];
    for (slot, info) in expected_info.iter().enumerate() {
        assert_eq!(uniform.lights[slot].info, *info, "light slot {slot}");
    }
    for slot in 0..2 {
        let camera = scheduler.light_camera(slot).expect("light camera");
        for (cascade, view_proj) in camera.view_projections().iter().enumerate() {
            assert_eq!(uniform.lights[slot].view_proj[cascade], view_proj.to_cols_array_2d());
        }
    }
    let camera = &scene.camera;
    let camera_view_proj = camera.projection_matrix(16.0 / 9.0) * camera.view_matrix();
    assert_eq!(uniform.view_proj, camera_view_proj.to_cols_array_2d());
}
