//! Interaction tunables

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Дальность луча Interact
    pub interaction_range: f32,
    /// Радиус proximity scan (UI prompt)
    pub ui_detection_radius: f32,
    /// Origin луча поднят над root rider'а
    pub ray_origin_height: f32,
    /// Local offset mount'а под rider'ом во время полёта
    pub mount_local_offset: [f32; 3],
    /// Local yaw mount'а под rider'ом (градусы, > 0 вправо)
    pub mount_local_yaw: f32,
    /// Dismount: mount ставится на столько вперёд от rider'а
    pub dismount_forward_offset: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            interaction_range: 3.0,
            ui_detection_radius: 5.0,
            ray_origin_height: 0.5,
            mount_local_offset: [0.0, 0.0, 0.0],
            mount_local_yaw: 0.0,
            dismount_forward_offset: 2.0,
        }
    }
}

impl InteractionConfig {
    pub fn mount_translation(&self) -> Vec3 {
        Vec3::from_array(self.mount_local_offset)
    }

    pub fn mount_rotation(&self) -> Quat {
        Quat::from_rotation_y(-self.mount_local_yaw.to_radians())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.interaction_range > 0.0) {
            return Err(ConfigError::NonPositive("interaction.interaction_range"));
        }
        if !(self.ui_detection_radius > 0.0) {
            return Err(ConfigError::NonPositive("interaction.ui_detection_radius"));
        }
        if !(self.dismount_forward_offset >= 0.0) {
            return Err(ConfigError::Negative("interaction.dismount_forward_offset"));
        }
        if !self.mount_local_offset.iter().all(|v| v.is_finite()) || !self.mount_local_yaw.is_finite() {
            return Err(ConfigError::Invalid("interaction.mount_local_offset", "must be finite"));
        }
        Ok(())
    }
}
