use glam::{Mat4, Vec3};
use kestrel_shadows::camera3d::Camera3D;
use kestrel_shadows::config::ShadowConfig;
use kestrel_shadows::light::{Light, LightArray};
use kestrel_shadows::mesh::Mesh;
use kestrel_shadows::renderer::{DrawItem, ShadowBackend, WgpuShadowBackend};
use kestrel_shadows::scene::Scene;
use kestrel_shadows::shadow::{ShadowFrameInput, ShadowScheduler, SHADOW_MAP_RESOLUTION};

fn headless_backend() -> Option<WgpuShadowBackend> {
    match pollster::block_on(WgpuShadowBackend::new_headless(320, 180)) {
        Ok(backend) => Some(backend),
        Err(err) => {
            eprintln!("skipping GPU test: {err:#}");
            None
        }
    }
}

#[test]
fn depth_targets_have_one_layer_per_slice() {
    let Some(mut backend) = headless_backend() else {
        return;
    };
    let target = backend.create_depth_target(0, 4, 256).expect("create depth target");
    assert_eq!(target.layers(), 4);
    assert_eq!(target.resolution(), 256);
    assert_eq!(target.texture().depth_or_array_layers(), 4);
}

#[test]
fn scheduler_submits_frames_on_gpu() {
    let Some(mut backend) = headless_backend() else {
        return;
    };
    let cube = backend.upload_mesh(&Mesh::cube(1.0));
    let ground = backend.upload_mesh(&Mesh::plane(40.0));
    let draws = vec![
        DrawItem::new(ground, Mat4::IDENTITY),
        DrawItem::new(cube, Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0))),
        DrawItem::new(cube, Mat4::from_translation(Vec3::new(3.0, 0.5, -2.0))),
    ];
    let lights: LightArray = [
        Light::directional(Vec3::new(0.4, -0.8, 0.35)),
        Light::spot(Vec3::new(0.0, 6.0, 0.0), Vec3::NEG_Y, 20.0, 30.0),
        Light::point(Vec3::new(2.0, 3.0, 2.0)).with_shadows(false),
    ]
    .into_iter()
    .collect();
    let camera = Camera3D::new(Vec3::new(0.0, 5.0, 12.0), Vec3::ZERO, 60f32.to_radians(), 0.1, 100.0);
    let scene = Scene::new(camera, lights);
    let config = ShadowConfig::default();
    let mut scheduler = ShadowScheduler::new();
    for _ in 0..2 {
        let stats = scheduler
            .render_frame(
                &mut backend,
                ShadowFrameInput { scene: &scene, aspect: 320.0 / 180.0, config: &config, draws: &draws },
            )
            .expect("gpu frame");
        assert_eq!(stats.depth_passes, config.cascade_percentages.len() + 1);
    }
    assert_eq!(backend.frames_submitted(), 2);
    let sun = scheduler.light_camera(0).and_then(|camera| camera.depth_target()).expect("sun depth target");
    assert_eq!(sun.resolution(), SHADOW_MAP_RESOLUTION);
}
