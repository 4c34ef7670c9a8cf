//! Collision layers — centralised constants (rapier `Group` bits)
//!
//! ## Layers:
//! - GROUP_1: Environment (terrain, стены, потолки — всё что блокирует камеру и ground checks)
//! - GROUP_2: Rider (capsule игрока)
//! - GROUP_3: Mount (dragon collider, цель interaction queries)
//!
//! ## Использование:
//! ```ignore
//! commands.spawn((Collider::ball(2.0), layers::mount_groups()));
//! index.overlap_sphere(position, radius, SpatialFilter::new(layers::MOUNT));
//! ```

use bevy_rapier3d::prelude::{CollisionGroups, Group};

pub const ENVIRONMENT: Group = Group::GROUP_1;
pub const RIDER: Group = Group::GROUP_2;
pub const MOUNT: Group = Group::GROUP_3;

/// Environment blocks everything
pub fn environment_groups() -> CollisionGroups {
    CollisionGroups::new(ENVIRONMENT, Group::ALL)
}

pub fn rider_groups() -> CollisionGroups {
    CollisionGroups::new(RIDER, ENVIRONMENT | MOUNT)
}

pub fn mount_groups() -> CollisionGroups {
    CollisionGroups::new(MOUNT, ENVIRONMENT | RIDER)
}
