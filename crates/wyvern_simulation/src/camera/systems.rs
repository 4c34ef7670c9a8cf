//! Camera systems (PostUpdate, после всей locomotion)

use bevy::prelude::*;

use super::components::ChaseCamera;
use super::events::SetCameraTarget;
use super::rig::{
    base_distance, desired_position, flight_look, ground_look, heading_yaw, look_at_point, obstruction_target,
    smooth_position, step_effective_distance, CameraMode, LookAngles,
};
use crate::flight::{FlightDeactivated, FlightState, FlightTuning};
use crate::input::PlayerInput;
use crate::logger;
use crate::physics::{layers, SpatialFilter, SpatialIndex, SpatialQuery};

/// Система: SetCameraTarget + сброс flight offsets после деактивации полёта
pub fn handle_camera_signals(
    mut retargets: EventReader<SetCameraTarget>,
    mut deactivations: EventReader<FlightDeactivated>,
    mut cameras: Query<&mut ChaseCamera>,
    targets: Query<&Transform, Without<ChaseCamera>>,
) {
    for request in retargets.read() {
        let Ok(mut camera) = cameras.get_mut(request.camera) else {
            logger::log_warning(&format!("SetCameraTarget: {:?} is not a chase camera", request.camera));
            continue;
        };
        if camera.target() != request.target || !camera.is_enabled() {
            logger::log(&format!("🎥 Camera {:?} target → {:?}", request.camera, request.target));
        }
        camera.set_target(request.target);
    }

    for deactivated in deactivations.read() {
        let heading = targets
            .get(deactivated.carrier)
            .map(|transform| heading_yaw(transform.rotation))
            .ok();

        for mut camera in cameras.iter_mut() {
            if camera.flight_source() != Some(deactivated.mount) {
                continue;
            }
            let yaw = heading.unwrap_or(camera.ground_yaw());
            camera.reset_flight_offsets(yaw);
        }
    }
}

/// Система: chase камера
///
/// Порядок внутри frame (как LateUpdate):
/// 1. look input → orbit (ground) / offsets (flight)
/// 2. позиция → сглаживание к desired (с текущей effective distance)
/// 3. linecast target → камера → effective distance следующего frame
pub fn follow_target(
    time: Res<Time>,
    spatial: Res<SpatialIndex>,
    mut cameras: Query<(Entity, &mut ChaseCamera, &mut Transform)>,
    targets: Query<(&Transform, Option<&PlayerInput>), Without<ChaseCamera>>,
    mounts: Query<(&FlightState, &FlightTuning)>,
) {
    let dt = time.delta_secs();

    for (entity, mut camera, mut transform) in cameras.iter_mut() {
        if !camera.is_enabled() {
            continue;
        }

        let Ok((target, input)) = targets.get(camera.target()) else {
            logger::log_error(&format!(
                "❌ Camera {:?}: target {:?} not found, camera disabled",
                entity,
                camera.target()
            ));
            camera.disable();
            continue;
        };

        let flight = camera
            .flight_source()
            .and_then(|mount| mounts.get(mount).ok())
            .filter(|(state, _)| state.is_active());
        let (mode, speed, forward_speed) = match flight {
            Some((state, tuning)) => (CameraMode::Flight, state.current_speed(), tuning.speed.forward_speed),
            None => (CameraMode::Ground, 0.0, 0.0),
        };
        if mode != camera.mode() {
            logger::log(&format!("🎥 Camera {:?} mode {:?} → {:?}", entity, camera.mode(), mode));
            camera.set_mode(mode);
        }

        let look = input.map_or(Vec2::ZERO, |input| input.look_axis);
        let config = camera.config;

        let angles = match mode {
            CameraMode::Ground => {
                let orbit = ground_look(camera.orbit(), look, &config);
                camera.set_orbit(orbit);
                orbit
            }
            CameraMode::Flight => {
                let offsets = flight_look(camera.offsets(), look, dt, &config);
                camera.set_offsets(offsets);
                LookAngles {
                    yaw: heading_yaw(target.rotation) + offsets.yaw,
                    pitch: offsets.pitch,
                }
            }
        };

        let desired = desired_position(target.translation, angles, config.height, camera.effective_distance());
        transform.translation = smooth_position(transform.translation, desired, config.lerp_speed, dt);
        transform.look_at(look_at_point(target.translation, config.height), Vec3::Y);

        // Obstruction: target → камера, только environment слой.
        // Коллайдер, на котором стоит target (пол), препятствием не считается.
        let hit = spatial
            .linecast(
                target.translation,
                transform.translation,
                SpatialFilter::new(layers::ENVIRONMENT).ignoring_start_contacts(),
            )
            .map(|hit| hit.distance);
        let base = base_distance(mode, speed, forward_speed, &config);
        let obstruction = obstruction_target(hit, base, &config);
        let distance = step_effective_distance(camera.effective_distance(), obstruction, dt, &config);
        camera.set_effective_distance(distance);
    }
}
