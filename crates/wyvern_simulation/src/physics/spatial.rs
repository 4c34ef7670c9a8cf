//! Spatial queries: raycast / linecast / overlap по снапшоту коллайдеров
//!
//! Архитектура:
//! - `SpatialQuery` trait — boundary, через который locomotion/camera/interaction спрашивают мир
//! - `SpatialIndex` resource — снапшот `Collider` + `Transform` + `CollisionGroups`,
//!   обновляется `sync_spatial_index` в начале каждой фазы frame'а
//!
//! Снапшот убирает конфликт доступа к `Transform` (системы сами двигают rider/mount).

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, CollisionGroups, Group};

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    /// Расстояние от origin до точки попадания
    pub distance: f32,
    pub point: Vec3,
}

/// Контакт ближе этого к origin считается стартовым (луч начат на поверхности или внутри)
pub const START_CONTACT_EPSILON: f32 = 1e-4;

/// Фильтр query: маска слоёв + entity, которого игнорируем (сам источник луча)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialFilter {
    pub mask: Group,
    pub exclude: Option<Entity>,
    /// Raycast пропускает коллайдеры, в которых (или на которых) стоит origin
    pub skip_start_contacts: bool,
}

impl SpatialFilter {
    pub fn new(mask: Group) -> Self {
        Self {
            mask,
            exclude: None,
            skip_start_contacts: false,
        }
    }

    pub fn excluding(mut self, entity: Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    /// Line-of-sight режим: пол под target'ом не считается препятствием
    pub fn ignoring_start_contacts(mut self) -> Self {
        self.skip_start_contacts = true;
        self
    }

    fn accepts(&self, entity: Entity, groups: Group) -> bool {
        self.exclude != Some(entity) && groups.intersects(self.mask)
    }
}

/// Boundary для physics queries
pub trait SpatialQuery {
    /// Ближайшее попадание луча (direction нормализуется)
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, filter: SpatialFilter) -> Option<RayHit>;

    /// Все entities, пересекающие сферу
    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: SpatialFilter) -> Vec<Entity>;

    /// Первое препятствие на отрезке from → to
    fn linecast(&self, from: Vec3, to: Vec3, filter: SpatialFilter) -> Option<RayHit> {
        let segment = to - from;
        let length = segment.length();
        if length <= f32::EPSILON {
            return None;
        }
        self.cast_ray(from, segment / length, length, filter)
    }

    /// Есть ли хоть что-то в сфере
    fn check_sphere(&self, center: Vec3, radius: f32, filter: SpatialFilter) -> bool {
        !self.overlap_sphere(center, radius, filter).is_empty()
    }
}

/// Один коллайдер в снапшоте
#[derive(Clone)]
pub struct IndexedCollider {
    pub entity: Entity,
    pub collider: Collider,
    pub translation: Vec3,
    pub rotation: Quat,
    pub memberships: Group,
}

/// Снапшот коллайдеров мира
#[derive(Resource, Clone, Default)]
pub struct SpatialIndex {
    colliders: Vec<IndexedCollider>,
}

impl SpatialIndex {
    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    pub fn insert(&mut self, entity: Entity, collider: Collider, transform: &Transform, memberships: Group) {
        self.colliders.push(IndexedCollider {
            entity,
            collider,
            translation: transform.translation,
            rotation: transform.rotation,
            memberships,
        });
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl SpatialQuery for SpatialIndex {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, filter: SpatialFilter) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut best: Option<RayHit> = None;
        for entry in self.colliders.iter() {
            if !filter.accepts(entry.entity, entry.memberships) {
                continue;
            }
            let Some(distance) =
                entry
                    .collider
                    .cast_ray(entry.translation, entry.rotation, origin, direction, max_distance, true)
            else {
                continue;
            };
            if filter.skip_start_contacts && distance <= START_CONTACT_EPSILON {
                continue;
            }

            // Tie-break по index — детерминированный порядок
            let closer = match best {
                None => true,
                Some(hit) => {
                    distance < hit.distance
                        || (distance == hit.distance && entry.entity.index() < hit.entity.index())
                }
            };
            if closer {
                best = Some(RayHit {
                    entity: entry.entity,
                    distance,
                    point: origin + direction * distance,
                });
            }
        }
        best
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: SpatialFilter) -> Vec<Entity> {
        self.colliders
            .iter()
            .filter(|entry| filter.accepts(entry.entity, entry.memberships))
            .filter(|entry| {
                entry
                    .collider
                    .distance_to_point(entry.translation, entry.rotation, center, true)
                    <= radius
            })
            .map(|entry| entry.entity)
            .collect()
    }
}

/// Система: пересобрать снапшот коллайдеров
///
/// Коллайдер без `CollisionGroups` считается членом всех групп (rapier default).
pub fn sync_spatial_index(
    mut index: ResMut<SpatialIndex>,
    colliders: Query<(Entity, &Collider, &Transform, Option<&CollisionGroups>)>,
) {
    index.clear();
    for (entity, collider, transform, groups) in colliders.iter() {
        let memberships = groups.map_or(Group::ALL, |g| g.memberships);
        index.insert(entity, collider.clone(), transform, memberships);
    }
}

/// Spatial Plugin
///
/// Снапшот обновляется дважды за frame:
/// - Update / SimSet::Sync — до interaction и locomotion
/// - PostUpdate / CameraSet::Sync — после locomotion, до камеры
pub struct SpatialPlugin;

impl Plugin for SpatialPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpatialIndex>()
            .add_systems(Update, sync_spatial_index.in_set(crate::SimSet::Sync))
            .add_systems(PostUpdate, sync_spatial_index.in_set(crate::CameraSet::Sync));
    }
}
