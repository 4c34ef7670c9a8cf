//! Ground systems

use bevy::prelude::*;

use super::controller::{GroundController, GroundInput};
use crate::camera::ChaseCamera;
use crate::input::{InputRouting, PlayerInput};
use crate::physics::SpatialIndex;

/// Система: ground locomotion rider'а
///
/// Работает только при включённом controller'е и Ground routing.
/// "Вперёд" берётся из yaw камеры, следящей за rider'ом (нет камеры → world -Z).
pub fn ground_locomotion(
    time: Res<Time>,
    spatial: Res<SpatialIndex>,
    mut riders: Query<(Entity, &mut GroundController, &mut Transform, &PlayerInput, Option<&InputRouting>)>,
    cameras: Query<&ChaseCamera>,
) {
    let dt = time.delta_secs();

    for (entity, mut controller, mut transform, input, routing) in riders.iter_mut() {
        if !controller.is_enabled() || routing.copied().unwrap_or_default() != InputRouting::Ground {
            continue;
        }

        let camera_yaw = cameras
            .iter()
            .find(|camera| camera.is_enabled() && camera.target() == entity)
            .map_or(0.0, |camera| camera.ground_yaw());

        let motion = controller.step(GroundInput::from_player(input, camera_yaw), &transform, spatial.as_ref(), dt);
        if motion.jumped {
            crate::logger::log(&format!("Rider {:?} jumped", entity));
        }
        transform.translation = motion.translation;
        transform.rotation = motion.rotation;
    }
}
