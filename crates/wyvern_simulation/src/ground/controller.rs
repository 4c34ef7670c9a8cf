//! Ground controller: walk / run / crouch / jump
//!
//! Кинематический: без rapier step. Коллизии — два probe через SpatialQuery:
//! - wall probe вдоль горизонтального смещения (не заходим в стены)
//! - floor probe вниз при падении (ступни не проваливаются сквозь пол)

use bevy::prelude::*;

use super::config::GroundConfig;
use crate::input::{InputRouting, PlayerInput};
use crate::physics::{layers, SpatialFilter, SpatialQuery};

/// Input одного тика ground движения
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundInput {
    /// x — strafe вправо, y — вперёд
    pub move_axis: Vec2,
    pub sprint: bool,
    pub jump: bool,
    /// Crouch/Stand toggle
    pub crouch: bool,
    /// Yaw камеры (градусы, > 0 вправо): направление "вперёд" для move input
    pub camera_yaw: f32,
}

impl GroundInput {
    pub fn from_player(input: &PlayerInput, camera_yaw: f32) -> Self {
        Self {
            move_axis: input.move_axis,
            sprint: input.sprint,
            jump: input.jump,
            crouch: input.crouch,
            camera_yaw,
        }
    }
}

/// Результат тика: новая поза root'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundMotion {
    pub translation: Vec3,
    pub rotation: Quat,
    pub jumped: bool,
}

/// Ground locomotion state на rider entity
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
#[require(PlayerInput, InputRouting)]
pub struct GroundController {
    pub config: GroundConfig,
    enabled: bool,
    y_velocity: f32,
    grounded: bool,
    crouching: bool,
    capsule_height: f32,
    capsule_center: f32,
    /// Горизонтальная скорость / run_speed (для анимации хоста)
    planar_speed_ratio: f32,
}

impl Default for GroundController {
    fn default() -> Self {
        Self::new(GroundConfig::default())
    }
}

impl GroundController {
    pub fn new(config: GroundConfig) -> Self {
        Self {
            config,
            enabled: true,
            y_velocity: 0.0,
            grounded: false,
            crouching: false,
            capsule_height: config.standing_height,
            capsule_center: config.standing_center,
            planar_speed_ratio: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Выключение (mount) замораживает состояние; включение сбрасывает вертикальную скорость
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.y_velocity = 0.0;
        }
        if !enabled {
            self.planar_speed_ratio = 0.0;
        }
        self.enabled = enabled;
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    pub fn y_velocity(&self) -> f32 {
        self.y_velocity
    }

    pub fn capsule_height(&self) -> f32 {
        self.capsule_height
    }

    /// Высота центра capsule над ступнями
    pub fn capsule_center(&self) -> f32 {
        self.capsule_center
    }

    pub fn planar_speed_ratio(&self) -> f32 {
        self.planar_speed_ratio
    }

    /// Один тик ground движения
    ///
    /// Порядок: ground check → поворот/скорость → jump → crouch toggle → gravity → probes.
    pub fn step(
        &mut self,
        input: GroundInput,
        transform: &Transform,
        spatial: &impl SpatialQuery,
        dt: f32,
    ) -> GroundMotion {
        let mut motion = GroundMotion {
            translation: transform.translation,
            rotation: transform.rotation,
            jumped: false,
        };
        if !self.enabled || dt <= 0.0 || !dt.is_finite() {
            return motion;
        }

        let config = self.config;
        let environment = SpatialFilter::new(layers::ENVIRONMENT);
        let feet = transform.translation;

        // Ground check
        self.grounded = spatial.check_sphere(
            feet + Vec3::Y * config.ground_check_offset,
            config.ground_check_radius,
            environment,
        );
        if self.grounded && self.y_velocity < 0.0 {
            self.y_velocity = config.grounded_velocity;
        }

        // Направление относительно камеры, тело поворачивается к нему
        let direction = input.move_axis.normalize_or_zero();
        let mut planar = Vec3::ZERO;
        if direction.length() >= config.move_deadzone {
            let target_angle = direction.x.atan2(direction.y).to_degrees() + input.camera_yaw;
            let target_rotation = Quat::from_rotation_y(-target_angle.to_radians());
            motion.rotation = rotate_towards(transform.rotation, target_rotation, config.rotation_speed * dt);

            let speed = if self.crouching {
                config.crouch_speed
            } else if input.sprint {
                config.run_speed
            } else {
                config.walk_speed
            };
            planar = (target_rotation * Vec3::NEG_Z) * speed;
        }

        if input.jump && self.grounded && !self.crouching {
            self.y_velocity = config.jump_velocity();
            motion.jumped = true;
        }

        if input.crouch {
            self.toggle_crouch(feet, spatial);
        }

        self.y_velocity += config.gravity * dt;

        // Wall probe
        let body_center = feet + Vec3::Y * self.capsule_center;
        let mut horizontal = planar * dt;
        let horizontal_length = horizontal.length();
        if horizontal_length > f32::EPSILON {
            let hit = spatial.cast_ray(
                body_center,
                horizontal / horizontal_length,
                horizontal_length + config.body_radius,
                environment,
            );
            if let Some(hit) = hit {
                let allowed = (hit.distance - config.body_radius).max(0.0);
                horizontal *= allowed / horizontal_length;
            }
        }

        // Floor probe
        let mut vertical = self.y_velocity * dt;
        if vertical < 0.0 {
            let probe = self.capsule_center + vertical.abs();
            if let Some(hit) = spatial.cast_ray(body_center, Vec3::NEG_Y, probe, environment) {
                let floor = body_center.y - hit.distance;
                if feet.y + vertical < floor {
                    vertical = (floor - feet.y).min(0.0);
                }
            }
        }

        motion.translation = feet + horizontal + Vec3::Y * vertical;
        self.planar_speed_ratio = horizontal.length() / dt / config.run_speed;
        motion
    }

    /// Crouch: capsule пополам, центр ниже на четверть роста.
    /// Stand: только если ceiling check пуст.
    fn toggle_crouch(&mut self, feet: Vec3, spatial: &impl SpatialQuery) {
        let config = self.config;
        if self.crouching {
            let blocked = spatial.check_sphere(
                feet + Vec3::Y * config.ceiling_check_height,
                config.ceiling_check_radius,
                SpatialFilter::new(layers::ENVIRONMENT),
            );
            if !blocked {
                self.crouching = false;
                self.capsule_height = config.standing_height;
                self.capsule_center = config.standing_center;
            }
        } else {
            self.crouching = true;
            self.capsule_height = config.standing_height / 2.0;
            self.capsule_center = config.standing_center - config.standing_height / 4.0;
        }
    }
}

/// Поворот не больше чем на `max_degrees`
pub fn rotate_towards(from: Quat, to: Quat, max_degrees: f32) -> Quat {
    let angle = from.angle_between(to);
    let max_angle = max_degrees.max(0.0).to_radians();
    if angle <= max_angle || angle <= f32::EPSILON {
        to
    } else {
        from.slerp(to, max_angle / angle).normalize()
    }
}
