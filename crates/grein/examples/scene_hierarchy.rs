//! Entity Hierarchies: headless solar system.
//!
//! Planets orbit the sun; moons orbit their planet, all through parent/child
//! links. Each frame spins the orbit pivots, propagates transforms, and prints
//! world positions. Halfway through, one planet is destroyed and its moon goes
//! with it.
//!
//! Run with: `RUST_LOG=debug cargo run -p grein --example scene_hierarchy`

use grein::prelude::*;

// ── Orbit component ─────────────────────────────────────────────────────

/// Radians per second around the local Z axis.
struct Orbit {
    speed: f32,
}

const FRAMES: u32 = 6;
const DT: f32 = 0.25;

fn main() {
    env_logger::init();

    let mut scene = SceneGraph::new();
    let sun = scene.create_entity("Sun");

    let mut planets = Vec::new();
    for (i, (distance, speed)) in [(4.0, 1.0), (7.0, 0.6), (11.0, 0.3)].into_iter().enumerate() {
        let planet = spawn_orbiter(&mut scene, sun, &format!("Planet{i}"), distance, speed);
        spawn_orbiter(&mut scene, planet, &format!("Moon{i}"), 1.0, 3.0);
        planets.push(planet);
    }

    let cam = scene.create_entity("MainCamera");
    scene.registry_mut().get_mut::<TransformComponent>(cam).local_position = Vec3::new(0.0, 0.0, 30.0);
    scene.add_camera(cam, CameraComponent::default());

    for frame in 0..FRAMES {
        if frame == FRAMES / 2 {
            let doomed = planets.remove(1);
            println!("-- destroying {}", scene.name_of(doomed).unwrap_or("?"));
            // Take the orbit pivot too; the moon goes with the planet.
            let pivot = scene.parent_of(doomed).unwrap_or(doomed);
            scene.destroy_entity(pivot);
        }

        spin_orbits(&mut scene, DT);
        let updated = scene.on_update(DT);
        scene.update_cameras(1280, 720);

        println!("frame {frame}: {updated} transforms recomputed");
        print_tree(&scene, sun, 1);
    }

    let stats = scene.registry().stats();
    println!("{} entities alive, {} free slots", stats.alive, stats.free_slots);
}

/// A pivot entity that rotates, with the body offset along X underneath it.
fn spawn_orbiter(scene: &mut SceneGraph, parent: Entity, name: &str, distance: f32, speed: f32) -> Entity {
    let pivot = scene.create_entity(format!("{name}Pivot"));
    scene.registry_mut().emplace(pivot, Orbit { speed });
    scene.set_parent(pivot, parent);

    let body = scene.create_entity(name);
    scene.registry_mut().get_mut::<TransformComponent>(body).local_position = Vec3::new(distance, 0.0, 0.0);
    scene.set_parent(body, pivot);
    body
}

fn spin_orbits(scene: &mut SceneGraph, dt: f32) {
    let spun = scene
        .registry_mut()
        .each_mut::<(Orbit, TransformComponent)>(|_, (orbit, transform)| {
            transform.local_rotation.z += orbit.speed * dt;
            transform.is_dirty = true;
        });
    log::debug!("spun {spun} pivots");
}

fn print_tree(scene: &SceneGraph, entity: Entity, depth: usize) {
    for child in scene.children_of(entity) {
        if !scene.registry().has::<Orbit>(child) {
            let position = scene.registry().get::<TransformComponent>(child).world_position();
            println!(
                "{:indent$}{} at ({:6.2}, {:6.2})",
                "",
                scene.name_of(child).unwrap_or("?"),
                position.x,
                position.y,
                indent = depth * 2
            );
        }
        print_tree(scene, child, depth + 1);
    }
}
