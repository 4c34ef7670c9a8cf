//! Interaction signals (для UI / host)

use bevy::prelude::*;

/// Mount вошёл в proximity радиус (показать UI prompt)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct MountRangeEntered {
    pub rider: Entity,
    pub mount: Entity,
}

/// Mount вышел из радиуса / rider сел на него (спрятать UI prompt)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct MountRangeExited {
    pub rider: Entity,
    pub mount: Entity,
}

/// Видимость модели rider'а изменилась
#[derive(Event, Debug, Clone, PartialEq)]
pub struct VisualsToggled {
    pub visuals: Entity,
    pub visible: bool,
}

/// Ground control rider'а включён/выключен
#[derive(Event, Debug, Clone, PartialEq)]
pub struct GroundControlToggled {
    pub rider: Entity,
    pub enabled: bool,
}
