//! Camera events

use bevy::prelude::*;

/// Запрос: переключить target камеры
///
/// Пишется interaction системой на mount/dismount. Валидный target
/// снова включает камеру, если она отключилась из-за пропавшего target.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SetCameraTarget {
    pub camera: Entity,
    pub target: Entity,
}
