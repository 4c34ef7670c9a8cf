//! Chase camera tunables

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseCameraConfig {
    /// Базовая дистанция в ground mode
    pub distance: f32,
    /// Высота камеры над target
    pub height: f32,
    /// Скорость сглаживания позиции (1/сек)
    pub lerp_speed: f32,
    /// Градусы на единицу look input
    pub rotation_speed: f32,
    /// Flight: дистанция на нулевой скорости
    pub min_speed_distance: f32,
    /// Flight: дистанция на forward_speed
    pub max_speed_distance: f32,
    /// Скорость сглаживания effective distance (1/сек)
    pub zoom_speed: f32,
    pub min_obstruction_distance: f32,
    pub max_obstruction_distance: f32,
    /// Ground pitch clamp (±градусы)
    pub pitch_limit: f32,
    /// Flight: предел yaw offset от heading carrier'а (градусы)
    pub flight_max_yaw_offset: f32,
    /// Flight: предел pitch offset (градусы)
    pub flight_max_pitch_offset: f32,
    /// Flight: скорость возврата offsets к нулю (градусы/сек)
    pub offset_return_speed: f32,
    /// |look| ниже этого порога — offsets возвращаются к центру
    pub look_deadzone: f32,
}

impl Default for ChaseCameraConfig {
    fn default() -> Self {
        Self {
            distance: 5.0,
            height: 2.0,
            lerp_speed: 10.0,
            rotation_speed: 3.0,
            min_speed_distance: 5.0,
            max_speed_distance: 15.0,
            zoom_speed: 5.0,
            min_obstruction_distance: 1.0,
            max_obstruction_distance: 7.0,
            pitch_limit: 60.0,
            flight_max_yaw_offset: 45.0,
            flight_max_pitch_offset: 30.0,
            offset_return_speed: 90.0,
            look_deadzone: 0.1,
        }
    }
}

impl ChaseCameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("camera.distance", self.distance),
            ("camera.lerp_speed", self.lerp_speed),
            ("camera.zoom_speed", self.zoom_speed),
            ("camera.min_obstruction_distance", self.min_obstruction_distance),
            ("camera.min_speed_distance", self.min_speed_distance),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive(name));
            }
        }

        let non_negative = [
            ("camera.rotation_speed", self.rotation_speed),
            ("camera.flight_max_yaw_offset", self.flight_max_yaw_offset),
            ("camera.flight_max_pitch_offset", self.flight_max_pitch_offset),
            ("camera.offset_return_speed", self.offset_return_speed),
            ("camera.look_deadzone", self.look_deadzone),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative(name));
            }
        }

        if self.max_obstruction_distance < self.min_obstruction_distance {
            return Err(ConfigError::Invalid(
                "camera.max_obstruction_distance",
                "less than min_obstruction_distance",
            ));
        }
        if self.max_speed_distance < self.min_speed_distance {
            return Err(ConfigError::Invalid(
                "camera.max_speed_distance",
                "less than min_speed_distance",
            ));
        }
        if !(self.pitch_limit > 0.0 && self.pitch_limit < 90.0) {
            return Err(ConfigError::Invalid("camera.pitch_limit", "must be in (0, 90)"));
        }
        Ok(())
    }
}
