use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3};
use std::time::Duration;
use winit::dpi::PhysicalSize;

use kestrel_shadows::camera3d::viewport_aspect;
use kestrel_shadows::cli::CliOverrides;
use kestrel_shadows::config::AppConfig;
use kestrel_shadows::mesh::Mesh;
use kestrel_shadows::renderer::{DrawItem, MeshHandle, RecordingBackend, ShadowBackend, WgpuShadowBackend};
use kestrel_shadows::scene::{Scene, SceneDefinition};
use kestrel_shadows::shadow::{ShadowFrameInput, ShadowScheduler};
use kestrel_shadows::time::Time;

const DEFAULT_FRAMES: u32 = 3;
const FIXED_STEP: Duration = Duration::from_millis(16);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            log::error!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(&cli) {
        log::error!("Application error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: &CliOverrides) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default("config/app.json"),
    };
    config.apply_overrides(&cli.config_overrides());
    let scene = match &cli.scene {
        Some(path) => Scene::load_from_path(path)?,
        None => Scene::from_definition(&SceneDefinition::demo()),
    };
    let frames = cli.frames.unwrap_or(DEFAULT_FRAMES);

    if cli.gpu.unwrap_or(false) {
        let mut backend =
            pollster::block_on(WgpuShadowBackend::new_headless(config.viewport.width, config.viewport.height))
                .context("Creating headless GPU backend")?;
        let cube = backend.upload_mesh(&Mesh::cube(1.0));
        let ground = backend.upload_mesh(&Mesh::plane(1.0));
        let draws = demo_draws(cube, ground);
        run_frames(&mut backend, scene, &config, &draws, frames)?;
        log::info!("[renderer] submitted {} frames", backend.frames_submitted());
    } else {
        let mut backend = RecordingBackend::new();
        let draws = demo_draws(MeshHandle(0), MeshHandle(1));
        run_frames(&mut backend, scene, &config, &draws, frames)?;
        log::info!("[renderer] recorded {} commands", backend.commands().len());
    }
    Ok(())
}

fn run_frames<B: ShadowBackend>(
    backend: &mut B,
    mut scene: Scene,
    config: &AppConfig,
    draws: &[DrawItem],
    frames: u32,
) -> Result<()> {
    let aspect = viewport_aspect(PhysicalSize::new(config.viewport.width, config.viewport.height));
    let mut scheduler = ShadowScheduler::new();
    let mut time = Time::fixed(FIXED_STEP);
    for _ in 0..frames {
        time.tick();
        scene.update(time.elapsed_seconds());
        let stats = scheduler.render_frame(
            backend,
            ShadowFrameInput { scene: &scene, aspect, config: &config.shadow, draws },
        )?;
        log::info!(
            "[shadow] frame {}: {} depth passes, {} shadowed / {} lit lights, {} reallocations",
            time.frame(),
            stats.depth_passes,
            stats.shadowed_lights,
            stats.lit_lights,
            stats.reallocations
        );
        if let Some(splits) = scheduler.splits() {
            log::debug!("[shadow] cascade boundaries {:?}", splits.boundaries());
        }
        for camera in scheduler.light_cameras() {
            for cascade in 0..camera.cascade_count() {
                if let Some(bounds) = camera.cascade_box(cascade) {
                    log::debug!(
                        "[shadow] slot {} cascade {} extent {:.3}",
                        camera.slot(),
                        cascade,
                        bounds.extents().x
                    );
                }
            }
        }
    }
    Ok(())
}

/// Ground plane plus a ring of boxes of varying height.
fn demo_draws(cube: MeshHandle, ground: MeshHandle) -> Vec<DrawItem> {
    let mut draws = vec![DrawItem::new(ground, Mat4::from_scale(Vec3::new(120.0, 1.0, 120.0)))];
    for i in 0..12 {
        let angle = i as f32 / 12.0 * std::f32::consts::TAU;
        let height = 1.0 + (i % 4) as f32;
        let position = Vec3::new(angle.cos() * 9.0, height * 0.5, angle.sin() * 9.0);
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(1.5, height, 1.5),
            Quat::from_rotation_y(angle),
            position,
        );
        draws.push(DrawItem::new(cube, model));
    }
    draws
}
