//! Physics query boundary
//!
//! Raycast/overlap — boundary calls (hit/no-hit + distance).
//! Rapier physics step не запускаем: используем только shapes `Collider` + `CollisionGroups`.

pub mod layers;
pub mod spatial;

pub use spatial::{
    sync_spatial_index, IndexedCollider, RayHit, SpatialFilter, SpatialIndex, SpatialPlugin, SpatialQuery,
};
