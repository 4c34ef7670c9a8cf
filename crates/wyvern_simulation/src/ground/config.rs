//! Ground locomotion tunables

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub crouch_speed: f32,
    /// Поворот тела к направлению движения (градусы/сек)
    pub rotation_speed: f32,
    pub jump_height: f32,
    /// Отрицательная (m/s²)
    pub gravity: f32,
    /// Вертикальная скорость, к которой прижимаемся на земле
    pub grounded_velocity: f32,
    /// Центр ground check сферы над ступнями
    pub ground_check_offset: f32,
    pub ground_check_radius: f32,
    /// Центр ceiling check сферы над ступнями
    pub ceiling_check_height: f32,
    pub ceiling_check_radius: f32,
    /// Capsule в полный рост
    pub standing_height: f32,
    pub standing_center: f32,
    /// Радиус тела для wall probe
    pub body_radius: f32,
    /// Move input короче этого игнорируется
    pub move_deadzone: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            walk_speed: 3.0,
            run_speed: 6.0,
            crouch_speed: 1.5,
            rotation_speed: 500.0,
            jump_height: 2.0,
            gravity: -9.81,
            grounded_velocity: -2.0,
            ground_check_offset: 0.0,
            ground_check_radius: 0.4,
            ceiling_check_height: 1.9,
            ceiling_check_radius: 0.2,
            standing_height: 2.0,
            standing_center: 1.0,
            body_radius: 0.4,
            move_deadzone: 0.1,
        }
    }
}

impl GroundConfig {
    /// Начальная скорость прыжка: sqrt(h * -2g)
    pub fn jump_velocity(&self) -> f32 {
        (self.jump_height * -2.0 * self.gravity).max(0.0).sqrt()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("ground.walk_speed", self.walk_speed),
            ("ground.run_speed", self.run_speed),
            ("ground.crouch_speed", self.crouch_speed),
            ("ground.rotation_speed", self.rotation_speed),
            ("ground.ground_check_radius", self.ground_check_radius),
            ("ground.ceiling_check_radius", self.ceiling_check_radius),
            ("ground.standing_height", self.standing_height),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive(name));
            }
        }
        if !(self.jump_height >= 0.0) {
            return Err(ConfigError::Negative("ground.jump_height"));
        }
        if !(self.body_radius >= 0.0) {
            return Err(ConfigError::Negative("ground.body_radius"));
        }
        if !(self.gravity < 0.0) {
            return Err(ConfigError::Invalid("ground.gravity", "must point down (negative)"));
        }
        if !(self.standing_center > 0.0) {
            return Err(ConfigError::NonPositive("ground.standing_center"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_velocity() {
        let config = GroundConfig::default();
        assert!((config.jump_velocity() - (2.0f32 * 2.0 * 9.81).sqrt()).abs() < 1e-5);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_upward_gravity_rejected() {
        let config = GroundConfig {
            gravity: 9.81,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid("ground.gravity", _))));
    }
}
