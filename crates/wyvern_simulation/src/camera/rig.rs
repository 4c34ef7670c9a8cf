//! Chase camera math (без ECS)
//!
//! Углы в градусах. Yaw > 0 — вправо, pitch > 0 — камера выше target и смотрит вниз.
//! Камера стоит "сзади" target: local offset `(0, height, +distance)` (forward = -Z).

use bevy::prelude::*;

use super::config::ChaseCameraConfig;

/// Режим камеры (выводится из FlightState.active)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum CameraMode {
    #[default]
    Ground,
    Flight,
}

/// Ориентация камеры
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct LookAngles {
    pub yaw: f32,
    pub pitch: f32,
}

/// Ground: look input напрямую крутит камеру, pitch clamp ±pitch_limit
pub fn ground_look(angles: LookAngles, look: Vec2, config: &ChaseCameraConfig) -> LookAngles {
    let limit = config.pitch_limit;
    LookAngles {
        yaw: wrap_degrees(angles.yaw + look.x * config.rotation_speed),
        pitch: (angles.pitch - look.y * config.rotation_speed).max(-limit).min(limit),
    }
}

/// Flight: ограниченный offset от heading carrier'а
///
/// Ниже deadzone offsets линейно возвращаются к нулю (`offset_return_speed`).
pub fn flight_look(offsets: LookAngles, look: Vec2, dt: f32, config: &ChaseCameraConfig) -> LookAngles {
    if look.length() < config.look_deadzone {
        let step = config.offset_return_speed * dt.max(0.0);
        return LookAngles {
            yaw: move_towards(offsets.yaw, 0.0, step),
            pitch: move_towards(offsets.pitch, 0.0, step),
        };
    }

    let max_yaw = config.flight_max_yaw_offset;
    let max_pitch = config.flight_max_pitch_offset;
    LookAngles {
        yaw: (offsets.yaw + look.x * config.rotation_speed).max(-max_yaw).min(max_yaw),
        pitch: (offsets.pitch - look.y * config.rotation_speed).max(-max_pitch).min(max_pitch),
    }
}

/// Базовая дистанция режима
///
/// Flight: lerp(min, max) по `inverse_lerp(0, forward_speed, |speed|)`.
pub fn base_distance(mode: CameraMode, speed: f32, forward_speed: f32, config: &ChaseCameraConfig) -> f32 {
    match mode {
        CameraMode::Ground => config.distance,
        CameraMode::Flight => {
            let t = inverse_lerp(0.0, forward_speed, speed.abs());
            lerp(config.min_speed_distance, config.max_speed_distance, t)
        }
    }
}

/// Ротация камеры из yaw/pitch
pub fn camera_rotation(angles: LookAngles) -> Quat {
    Quat::from_euler(EulerRot::YXZ, -angles.yaw.to_radians(), -angles.pitch.to_radians(), 0.0)
}

/// Heading (yaw) transform'а, проекция forward на XZ
pub fn heading_yaw(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::NEG_Z;
    if forward.x.abs() < f32::EPSILON && forward.z.abs() < f32::EPSILON {
        return 0.0;
    }
    forward.x.atan2(-forward.z).to_degrees()
}

/// Желаемая позиция: target + rotation * (0, height, distance)
pub fn desired_position(target: Vec3, angles: LookAngles, height: f32, distance: f32) -> Vec3 {
    target + camera_rotation(angles) * Vec3::new(0.0, height, distance)
}

/// Точка, в которую смотрит камера (target + половина высоты)
pub fn look_at_point(target: Vec3, height: f32) -> Vec3 {
    target + Vec3::Y * (height * 0.5)
}

/// Сглаживание позиции: lerp с t = min(1, lerp_speed * dt)
pub fn smooth_position(current: Vec3, desired: Vec3, lerp_speed: f32, dt: f32) -> Vec3 {
    current.lerp(desired, (lerp_speed * dt).max(0.0).min(1.0))
}

/// Целевая дистанция с учётом препятствия
///
/// Hit → max(min_obstruction_distance, distance_to_hit), иначе базовая дистанция режима.
pub fn obstruction_target(hit_distance: Option<f32>, base: f32, config: &ChaseCameraConfig) -> f32 {
    match hit_distance {
        Some(distance) => distance.max(config.min_obstruction_distance),
        None => base,
    }
}

/// Effective distance: lerp к target с t = min(1, zoom_speed * dt), затем clamp
pub fn step_effective_distance(current: f32, target: f32, dt: f32, config: &ChaseCameraConfig) -> f32 {
    let t = (config.zoom_speed * dt).max(0.0).min(1.0);
    lerp(current, target, t)
        .max(config.min_obstruction_distance)
        .min(config.max_obstruction_distance)
}

pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Yaw в (-180, 180]
fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_effective_distance_zooms_out_to_base() {
        let config = ChaseCameraConfig {
            zoom_speed: 5.0,
            ..Default::default()
        };
        // Ground, без препятствий: 3 → base 5 при zoom 5, dt 1
        let target = obstruction_target(None, base_distance(CameraMode::Ground, 0.0, 15.0, &config), &config);
        assert_eq!(target, 5.0);
        assert_eq!(step_effective_distance(3.0, target, 1.0, &config), 5.0);

        // Маленький dt — частичный шаг
        let partial = step_effective_distance(3.0, target, 0.1, &config);
        assert!(approx(partial, 3.0 + 2.0 * 0.5), "partial = {}", partial);
    }

    #[test]
    fn test_effective_distance_clamped() {
        let config = ChaseCameraConfig::default();
        assert_eq!(step_effective_distance(6.0, 15.0, 1.0, &config), config.max_obstruction_distance);
        assert_eq!(step_effective_distance(2.0, 0.2, 1.0, &config), config.min_obstruction_distance);
    }

    #[test]
    fn test_obstruction_shortens_distance() {
        let config = ChaseCameraConfig::default();
        assert_eq!(obstruction_target(Some(2.5), 5.0, &config), 2.5);
        assert_eq!(obstruction_target(Some(0.3), 5.0, &config), config.min_obstruction_distance);
    }

    #[test]
    fn test_flight_distance_follows_speed() {
        let config = ChaseCameraConfig::default();
        assert_eq!(base_distance(CameraMode::Flight, 0.0, 15.0, &config), config.min_speed_distance);
        assert_eq!(base_distance(CameraMode::Flight, 15.0, 15.0, &config), config.max_speed_distance);
        assert_eq!(base_distance(CameraMode::Flight, -7.5, 15.0, &config), 10.0);
        // Пике быстрее forward_speed — не дальше max
        assert_eq!(base_distance(CameraMode::Flight, 22.0, 15.0, &config), config.max_speed_distance);
    }

    #[test]
    fn test_ground_pitch_clamped() {
        let config = ChaseCameraConfig::default();
        let mut angles = LookAngles::default();
        for _ in 0..100 {
            angles = ground_look(angles, Vec2::new(1.0, -1.0), &config);
        }
        assert_eq!(angles.pitch, config.pitch_limit);
        assert!(angles.yaw > -180.0 && angles.yaw <= 180.0);
    }

    #[test]
    fn test_flight_offsets_bounded_and_recenter() {
        let config = ChaseCameraConfig::default();
        let mut offsets = LookAngles::default();
        for _ in 0..100 {
            offsets = flight_look(offsets, Vec2::new(1.0, 1.0), 0.016, &config);
        }
        assert_eq!(offsets.yaw, config.flight_max_yaw_offset);
        assert_eq!(offsets.pitch, -config.flight_max_pitch_offset);

        // Input в deadzone: линейный возврат
        let released = flight_look(offsets, Vec2::new(0.05, 0.0), 0.1, &config);
        assert!(approx(released.yaw, config.flight_max_yaw_offset - config.offset_return_speed * 0.1));

        let mut offsets = released;
        for _ in 0..100 {
            offsets = flight_look(offsets, Vec2::ZERO, 0.1, &config);
        }
        assert_eq!(offsets, LookAngles::default());
    }

    #[test]
    fn test_desired_position_behind_and_above() {
        let position = desired_position(Vec3::ZERO, LookAngles::default(), 2.0, 5.0);
        assert!((position - Vec3::new(0.0, 2.0, 5.0)).length() < 1e-4);

        // Yaw 90 (вправо): target смотрит в +X, камера сзади — в -X
        let turned = desired_position(Vec3::ZERO, LookAngles { yaw: 90.0, pitch: 0.0 }, 0.0, 5.0);
        assert!((turned - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-4, "turned = {:?}", turned);

        // Pitch > 0 поднимает камеру
        let raised = desired_position(Vec3::ZERO, LookAngles { yaw: 0.0, pitch: 30.0 }, 0.0, 5.0);
        assert!(raised.y > 0.0);
    }

    #[test]
    fn test_heading_yaw_matches_rotation() {
        assert!(approx(heading_yaw(Quat::IDENTITY), 0.0));
        assert!(approx(heading_yaw(Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2)), 90.0));
        let angles = LookAngles { yaw: -35.0, pitch: 0.0 };
        assert!(approx(heading_yaw(camera_rotation(angles)), -35.0));
    }

    #[test]
    fn test_smooth_position_never_overshoots() {
        let smoothed = smooth_position(Vec3::ZERO, Vec3::X * 10.0, 10.0, 1.0);
        assert_eq!(smoothed, Vec3::X * 10.0);
        let partial = smooth_position(Vec3::ZERO, Vec3::X * 10.0, 10.0, 0.01);
        assert!(approx(partial.x, 1.0));
    }

    #[test]
    fn test_look_at_point_half_height() {
        assert_eq!(look_at_point(Vec3::new(1.0, 0.0, 0.0), 2.0), Vec3::new(1.0, 1.0, 0.0));
    }
}
