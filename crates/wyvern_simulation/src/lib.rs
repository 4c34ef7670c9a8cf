//! WYVERN Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: rider + dragon locomotion.
//!
//! Подсистемы:
//! - flight: FlightState (Grounded ⇄ Flying) + motion integrator
//! - ground: walk / run / crouch / jump
//! - interaction: proximity prompt, mount / dismount handoff
//! - camera: chase камера (late phase, PostUpdate)
//! - attachment: rider ⇄ mount связь без scene graph
//! - physics: raycast / overlap boundary поверх rapier shapes
//!
//! Host владеет game loop: `RiderSimulation::tick` = один `app.update()` на frame.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

// Публичные модули
pub mod attachment;
pub mod camera;
pub mod error;
pub mod flight;
pub mod ground;
pub mod input;
pub mod interaction;
pub mod logger;
pub mod physics;
pub mod signals;
pub mod simulation;

// Re-export основных типов
pub use attachment::{Attachment, AttachmentPlugin, VisualPose};
pub use camera::{CameraMode, CameraPlugin, ChaseCamera, ChaseCameraConfig, SetCameraTarget};
pub use error::{ConfigError, SetupError};
pub use flight::{
    DeactivationReason, FlightActivated, FlightControl, FlightDeactivated, FlightPhase, FlightPlugin, FlightState,
    FlightTuning, MotionState, SpeedEnvelope, VerticalEnvelope, VisualEnvelope,
};
pub use ground::{GroundConfig, GroundController, GroundPlugin};
pub use input::{InputRouting, PlayerInput};
pub use interaction::{InteractionConfig, InteractionPlugin, MountInteractor, Mountable, RiderVisuals};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use physics::{SpatialIndex, SpatialPlugin, SpatialQuery};
pub use signals::{SignalLog, SignalsPlugin, SimSignal};
pub use simulation::{EnvironmentBlock, FrameInput, FrameReport, RiderSimulation, SceneSetup};

/// Фазы frame'а (Update), строго по порядку
///
/// Locomotion и flight обновляются до того, как камера (PostUpdate) читает transforms.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Снапшот коллайдеров
    Sync,
    /// Proximity prompt, Interact / ToggleFlight triggers
    Interaction,
    /// Carrier guard + применение запросов активации/деактивации
    FlightTransitions,
    /// Реакция на FlightActivated / FlightDeactivated (mount / dismount protocol)
    Handoff,
    /// Flight motion + ground movement
    Locomotion,
    /// Attachment → world Transform
    Attachments,
    /// SignalLog + сброс one-shot triggers
    Signals,
}

/// Late phase (PostUpdate)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraSet {
    /// Снапшот коллайдеров после locomotion
    Sync,
    Follow,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimSet::Sync,
                SimSet::Interaction,
                SimSet::FlightTransitions,
                SimSet::Handoff,
                SimSet::Locomotion,
                SimSet::Attachments,
                SimSet::Signals,
            )
                .chain(),
        )
        .configure_sets(PostUpdate, (CameraSet::Sync, CameraSet::Follow).chain());

        app.register_type::<PlayerInput>()
            .register_type::<InputRouting>()
            .add_plugins((
                SpatialPlugin,
                AttachmentPlugin,
                FlightPlugin,
                GroundPlugin,
                InteractionPlugin,
                CameraPlugin,
                SignalsPlugin,
            ));
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время двигается только вручную (`TimeUpdateStrategy::ManualDuration`),
/// поэтому одинаковые dt дают одинаковые результаты.
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO));

    // Длинные frames не режем (по умолчанию Time<Virtual> обрезает до 250ms)
    if let Some(mut virtual_time) = app.world_mut().get_resource_mut::<Time<Virtual>>() {
        virtual_time.set_max_delta(Duration::from_secs(10));
    }

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
