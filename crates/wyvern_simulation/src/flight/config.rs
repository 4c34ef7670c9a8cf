//! Flight tunables: speed / vertical / visual envelopes.
//!
//! Read-only после загрузки. Host может грузить их через serde (формат не важен).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Speed envelope: разгон, торможение, реверс, связь climb/dive со скоростью
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct SpeedEnvelope {
    /// Максимальная крейсерская скорость вперёд (m/s)
    pub forward_speed: f32,
    /// Скорость, ниже которой mount считается тормозящим (для анимации хоста)
    pub brake_speed: f32,
    /// Минимальная (отрицательная) скорость заднего хода (m/s)
    pub reverse_speed: f32,
    /// Разгон при throttle > 0 и при реверсе (m/s²)
    pub acceleration: f32,
    /// Затухание при throttle == 0 (m/s²)
    pub deceleration: f32,
    /// Торможение при throttle < 0 и speed > 0 (m/s²)
    pub brake_acceleration: f32,
    /// Потеря скорости при наборе высоты (m/s² на единицу нормированного climb)
    pub speed_loss_on_climb: f32,
    /// Прирост скорости при пикировании (m/s² на единицу нормированного dive)
    pub speed_gain_on_dive: f32,
    /// Потолок скорости в пике = forward_speed * multiplier
    pub max_dive_speed_multiplier: f32,
}

impl Default for SpeedEnvelope {
    fn default() -> Self {
        Self {
            forward_speed: 15.0,
            brake_speed: 5.0,
            reverse_speed: -5.0,
            acceleration: 5.0,
            deceleration: 2.0,
            brake_acceleration: 8.0,
            speed_loss_on_climb: 2.0,
            speed_gain_on_dive: 4.0,
            max_dive_speed_multiplier: 1.5,
        }
    }
}

impl SpeedEnvelope {
    /// Верхняя граница скорости (пике)
    pub fn max_speed(&self) -> f32 {
        self.forward_speed * self.max_dive_speed_multiplier
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forward_speed <= 0.0 {
            return Err(ConfigError::NonPositive("speed.forward_speed"));
        }
        if self.reverse_speed > 0.0 {
            return Err(ConfigError::Invalid(
                "speed.reverse_speed",
                "must be zero or negative",
            ));
        }
        if self.max_dive_speed_multiplier < 1.0 {
            return Err(ConfigError::Invalid(
                "speed.max_dive_speed_multiplier",
                "must be at least 1.0",
            ));
        }
        for (name, value) in [
            ("speed.acceleration", self.acceleration),
            ("speed.deceleration", self.deceleration),
            ("speed.brake_acceleration", self.brake_acceleration),
            ("speed.speed_loss_on_climb", self.speed_loss_on_climb),
            ("speed.speed_gain_on_dive", self.speed_gain_on_dive),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative(name));
            }
        }
        Ok(())
    }
}

/// Vertical envelope: climb/dive ramp
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct VerticalEnvelope {
    /// Вертикальная скорость на нулевой горизонтальной скорости (m/s)
    pub min_vertical_speed: f32,
    /// Доля forward_speed, доступная для вертикали на полной скорости
    pub max_vertical_speed_factor: f32,
    /// Сколько секунд держать input до полного ramp (x3 множитель)
    pub vertical_ramp_up_time: f32,
    /// Скорость сброса hold-time и blend rate вертикали
    pub vertical_ramp_down_speed: f32,
    /// Blend rate при смене направления (climb ↔ dive)
    pub vertical_inertia: f32,
}

impl Default for VerticalEnvelope {
    fn default() -> Self {
        Self {
            min_vertical_speed: 2.0,
            max_vertical_speed_factor: 0.5,
            vertical_ramp_up_time: 1.5,
            vertical_ramp_down_speed: 3.0,
            vertical_inertia: 1.5,
        }
    }
}

impl VerticalEnvelope {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_vertical_speed_factor <= 0.0 {
            return Err(ConfigError::NonPositive("vertical.max_vertical_speed_factor"));
        }
        if self.vertical_ramp_up_time <= 0.0 {
            return Err(ConfigError::NonPositive("vertical.vertical_ramp_up_time"));
        }
        if self.vertical_ramp_down_speed <= 0.0 {
            return Err(ConfigError::NonPositive("vertical.vertical_ramp_down_speed"));
        }
        if self.min_vertical_speed < 0.0 {
            return Err(ConfigError::Negative("vertical.min_vertical_speed"));
        }
        if self.vertical_inertia < 0.0 {
            return Err(ConfigError::Negative("vertical.vertical_inertia"));
        }
        Ok(())
    }
}

/// Visual envelope: pitch/roll наклон модели (не влияет на heading)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct VisualEnvelope {
    /// Базовый угол pitch (градусы)
    pub pitch_angle: f32,
    /// Базовый угол roll (градусы)
    pub roll_angle: f32,
    /// Blend rate target-углов и второй (slerp) слой сглаживания
    pub rotation_smoothness: f32,
    pub rotation_ramp_up_time: f32,
    /// Доля угла на нулевой скорости
    pub min_rotation_factor: f32,
    pub rotation_return_speed: f32,
    /// Blend rate при смене знака input
    pub rotation_inertia: f32,
}

impl Default for VisualEnvelope {
    fn default() -> Self {
        Self {
            pitch_angle: 25.0,
            roll_angle: 35.0,
            rotation_smoothness: 4.0,
            rotation_ramp_up_time: 0.8,
            min_rotation_factor: 0.3,
            rotation_return_speed: 2.0,
            rotation_inertia: 2.0,
        }
    }
}

impl VisualEnvelope {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rotation_ramp_up_time <= 0.0 {
            return Err(ConfigError::NonPositive("visual.rotation_ramp_up_time"));
        }
        if self.rotation_return_speed <= 0.0 {
            return Err(ConfigError::NonPositive("visual.rotation_return_speed"));
        }
        if !(0.0..=1.0).contains(&self.min_rotation_factor) {
            return Err(ConfigError::Invalid(
                "visual.min_rotation_factor",
                "must be within [0, 1]",
            ));
        }
        if self.rotation_smoothness < 0.0 || self.rotation_inertia < 0.0 {
            return Err(ConfigError::Negative("visual.rotation_smoothness/rotation_inertia"));
        }
        Ok(())
    }
}

/// Полный набор tunables для mount (component на dragon entity)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct FlightTuning {
    pub speed: SpeedEnvelope,
    pub vertical: VerticalEnvelope,
    pub visual: VisualEnvelope,
    /// Скорость поворота по yaw (градусы/сек при полном input)
    #[serde(default = "default_yaw_speed")]
    pub yaw_speed: f32,
}

fn default_yaw_speed() -> f32 {
    60.0
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self::new(
            SpeedEnvelope::default(),
            VerticalEnvelope::default(),
            VisualEnvelope::default(),
        )
    }
}

impl FlightTuning {
    pub fn new(speed: SpeedEnvelope, vertical: VerticalEnvelope, visual: VisualEnvelope) -> Self {
        Self {
            speed,
            vertical,
            visual,
            yaw_speed: default_yaw_speed(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.speed.validate()?;
        self.vertical.validate()?;
        self.visual.validate()?;
        if self.yaw_speed < 0.0 {
            return Err(ConfigError::Negative("yaw_speed"));
        }
        let vertical_ceiling =
            self.speed.forward_speed * self.vertical.max_vertical_speed_factor * 3.0;
        if self.vertical.min_vertical_speed > vertical_ceiling {
            return Err(ConfigError::Invalid(
                "vertical.min_vertical_speed",
                "exceeds forward_speed * max_vertical_speed_factor * 3",
            ));
        }
        Ok(())
    }
}
