//! Attachment relation: entity привязан к owner с local offset
//!
//! Вместо scene-graph reparenting: владелец + local transform,
//! `resolve_attachments` каждый frame пишет world Transform прикреплённого entity.
//! Цепочки (attached → attached) не поддерживаются: owner сам не должен иметь Attachment.

use bevy::prelude::*;

use crate::logger;

/// Привязка к owner entity
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Attachment {
    pub owner: Entity,
    pub local_translation: Vec3,
    pub local_rotation: Quat,
}

impl Attachment {
    pub fn new(owner: Entity, local_translation: Vec3, local_rotation: Quat) -> Self {
        Self {
            owner,
            local_translation,
            local_rotation,
        }
    }

    /// Привязка, сохраняющая текущую world позу `world` под `owner_transform`
    pub fn preserving_world(owner: Entity, owner_transform: &Transform, world: &Transform) -> Self {
        let inverse_rotation = owner_transform.rotation.inverse();
        Self {
            owner,
            local_translation: inverse_rotation * (world.translation - owner_transform.translation),
            local_rotation: (inverse_rotation * world.rotation).normalize(),
        }
    }

    /// World поза для данной позы owner'а (без учёта scale)
    pub fn compose(&self, owner_transform: &Transform, pose: Quat) -> (Vec3, Quat) {
        let translation = owner_transform.translation + owner_transform.rotation * self.local_translation;
        let rotation = (owner_transform.rotation * self.local_rotation * pose).normalize();
        (translation, rotation)
    }
}

/// Визуальная local ротация поверх attachment (наклон модели mount)
///
/// Не влияет на heading owner'а. Identity вне полёта.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct VisualPose {
    pub rotation: Quat,
}

impl Default for VisualPose {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
        }
    }
}

/// Система: Attachment → world Transform
///
/// Работает после locomotion (SimSet::Attachments), чтобы owner уже сдвинулся в этом frame.
pub fn resolve_attachments(
    mut attached: Query<(Entity, &Attachment, Option<&VisualPose>, &mut Transform)>,
    owners: Query<&Transform, Without<Attachment>>,
) {
    for (entity, attachment, pose, mut transform) in attached.iter_mut() {
        let Ok(owner_transform) = owners.get(attachment.owner) else {
            logger::log_warning(&format!(
                "Attachment: owner {:?} of {:?} not found (despawned or nested attachment)",
                attachment.owner, entity
            ));
            continue;
        };

        let pose = pose.map_or(Quat::IDENTITY, |p| p.rotation);
        let (translation, rotation) = attachment.compose(owner_transform, pose);
        transform.translation = translation;
        transform.rotation = rotation;
    }
}

/// Attachment Plugin
pub struct AttachmentPlugin;

impl Plugin for AttachmentPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Attachment>()
            .register_type::<VisualPose>()
            .add_systems(Update, resolve_attachments.in_set(crate::SimSet::Attachments));
    }
}
