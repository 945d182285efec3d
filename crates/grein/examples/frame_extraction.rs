//! Frame Extraction: scene to render snapshot.
//!
//! Builds a small grid of meshes under a moving parent, then runs the
//! update/extract/submit loop a renderer would drive. The "render side" only
//! ever reads the published snapshot.
//!
//! An optional JSON config path can be given as the first argument.
//!
//! Run with: `RUST_LOG=grein=trace cargo run -p grein --example frame_extraction`

use std::collections::HashMap;

use grein::prelude::*;
use grein::render::GpuMeshInstance;

const CUBE_MESH: RenderId = 1;
const CUBE_MATERIAL: RenderId = 1;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SceneConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("failed to load {path}: {err}");
                std::process::exit(1);
            }
        },
        None => SceneConfig::default(),
    };
    let main_tag = config.main_camera_tag.clone();
    let (width, height) = config.default_viewport;
    let mut scene = SceneGraph::with_config(config);

    let platform = scene.create_entity("Platform");
    for x in 0..3 {
        for z in 0..3 {
            let cube = scene.create_entity(format!("Cube{x}{z}"));
            let registry = scene.registry_mut();
            registry.get_mut::<TransformComponent>(cube).local_position =
                Vec3::new(x as f32 * 2.0, 0.0, z as f32 * 2.0);
            registry.emplace(cube, MeshRendererComponent::new(CUBE_MESH, CUBE_MATERIAL));
            scene.set_parent(cube, platform);
        }
    }
    // One mesh whose asset never loaded; extraction skips it.
    let pending = scene.create_entity("Pending");
    scene.registry_mut().emplace(
        pending,
        MeshRendererComponent {
            mesh_asset_path: "meshes/statue.asset".into(),
            ..MeshRendererComponent::default()
        },
    );

    let camera = scene.create_entity(main_tag);
    scene.registry_mut().get_mut::<TransformComponent>(camera).local_position = Vec3::new(2.0, 6.0, 12.0);
    scene.add_camera(camera, CameraComponent::default());

    let bounds: HashMap<RenderId, Aabb> = HashMap::from([(CUBE_MESH, Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)))]);
    let mut buffer = FrameSnapshotBuffer::new();

    for frame in 0..3 {
        scene.registry_mut().get_mut::<TransformComponent>(platform).local_position.y = frame as f32;
        scene.mark_transform_dirty(platform);
        scene.update_transforms();
        scene.update_cameras(width, height);

        extract_frame_snapshot(scene.registry(), &bounds, &scene.config().main_camera_tag, buffer.acquire_write());
        buffer.submit_write();

        render(frame, buffer.read());
    }
}

fn render(frame: u32, snapshot: &FrameSnapshot) {
    let instances: Vec<GpuMeshInstance> = snapshot.gpu_instances();
    let bytes: &[u8] = bytemuck::cast_slice(&instances);
    println!(
        "frame {frame}: camera at {:?}, {} instances ({} bytes)",
        snapshot.main_view.camera_position,
        instances.len(),
        bytes.len()
    );
    for mesh in &snapshot.dynamic_meshes {
        let center = mesh.world_bounds.center();
        println!("  mesh {} center ({:.1}, {:.1}, {:.1})", mesh.mesh_id, center.x, center.y, center.z);
    }
}
