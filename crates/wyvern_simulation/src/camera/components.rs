//! ChaseCamera component (CameraState)

use bevy::prelude::*;

use super::config::ChaseCameraConfig;
use super::rig::{desired_position, look_at_point, CameraMode, LookAngles};

/// Состояние chase камеры
///
/// Владелец — camera система. `effective_distance` пересчитывается каждый frame
/// из скорости и препятствий.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ChaseCamera {
    pub config: ChaseCameraConfig,
    target: Entity,
    /// Mount, чей FlightState определяет режим и скорость
    flight_source: Option<Entity>,
    mode: CameraMode,
    /// Ground: абсолютные yaw/pitch
    orbit: LookAngles,
    /// Flight: offset от heading carrier'а
    offsets: LookAngles,
    effective_distance: f32,
    enabled: bool,
}

impl ChaseCamera {
    pub fn new(config: ChaseCameraConfig, target: Entity, flight_source: Option<Entity>) -> Self {
        Self {
            config,
            target,
            flight_source,
            mode: CameraMode::Ground,
            orbit: LookAngles::default(),
            offsets: LookAngles::default(),
            effective_distance: config.distance,
            enabled: true,
        }
    }

    /// Стартовый ground yaw (градусы)
    pub fn facing(mut self, yaw: f32) -> Self {
        self.orbit.yaw = yaw;
        self
    }

    pub fn target(&self) -> Entity {
        self.target
    }

    pub fn flight_source(&self) -> Option<Entity> {
        self.flight_source
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn orbit(&self) -> LookAngles {
        self.orbit
    }

    pub fn offsets(&self) -> LookAngles {
        self.offsets
    }

    pub fn effective_distance(&self) -> f32 {
        self.effective_distance
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Yaw, который в ground mode задаёт направление тела
    pub fn ground_yaw(&self) -> f32 {
        self.orbit.yaw
    }

    pub fn set_target(&mut self, target: Entity) {
        self.target = target;
        self.enabled = true;
    }

    /// Runtime missing reference: камера выключается, остальная симуляция работает
    pub(crate) fn disable(&mut self) {
        self.enabled = false;
    }

    pub(crate) fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
    }

    pub(crate) fn set_orbit(&mut self, orbit: LookAngles) {
        self.orbit = orbit;
    }

    pub(crate) fn set_offsets(&mut self, offsets: LookAngles) {
        self.offsets = offsets;
    }

    pub(crate) fn set_effective_distance(&mut self, distance: f32) {
        self.effective_distance = distance;
    }

    /// Сброс flight offsets; orbit продолжает с heading'а, на котором закончился полёт
    pub fn reset_flight_offsets(&mut self, heading_yaw: f32) {
        self.offsets = LookAngles::default();
        self.orbit = LookAngles {
            yaw: heading_yaw,
            pitch: self.orbit.pitch,
        };
    }

    /// Transform камеры сразу в желаемой позиции (без сглаживания), для спавна
    pub fn snapped_transform(&self, target: &Transform) -> Transform {
        let position = desired_position(
            target.translation,
            self.orbit,
            self.config.height,
            self.effective_distance,
        );
        Transform::from_translation(position)
            .looking_at(look_at_point(target.translation, self.config.height), Vec3::Y)
    }
}
