//! Flight events: запросы переходов и сигналы о переходах

use bevy::prelude::*;

/// Почему полёт закончился
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DeactivationReason {
    /// Игрок сам спешился (ToggleFlight)
    Dismount,
    /// Carrier пропал посреди полёта — безопасный сброс
    LostCarrier,
    /// Interactor отключён / симуляция закрывается
    Teardown,
}

/// Запрос: Grounded → Flying
///
/// Генерируется interaction системой после успешного raycast по mount.
#[derive(Event, Debug, Clone)]
pub struct ActivateFlightRequest {
    pub mount: Entity,
    pub carrier: Entity,
}

/// Запрос: Flying → Grounded
#[derive(Event, Debug, Clone)]
pub struct DeactivateFlightRequest {
    pub mount: Entity,
    pub reason: DeactivationReason,
}

/// Сигнал: полёт активирован (ровно один на переход)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FlightActivated {
    pub mount: Entity,
    pub carrier: Entity,
}

/// Сигнал: полёт деактивирован (ровно один на переход)
///
/// Обрабатывается:
/// - interaction (dismount: вернуть ground control, visuals, attachment)
/// - camera (сброс flight offsets)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FlightDeactivated {
    pub mount: Entity,
    /// Carrier на момент деактивации (при LostCarrier entity уже despawned)
    pub carrier: Entity,
    pub reason: DeactivationReason,
}
