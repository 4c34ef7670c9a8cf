//! Motion integrator — чистая per-tick функция полёта
//!
//! Вход: control (throttle/yaw/vertical), dt, предыдущее `MotionState`, `FlightTuning`.
//! Выход: новое `MotionState` + перемещения за тик. Без side effects, без ECS.
//!
//! Порядок внутри тика:
//! 1. speed (throttle → разгон/тормоз/реверс/затухание, затем climb/dive coupling)
//! 2. vertical (hold-time ramp, асимметричная инерция при развороте)
//! 3. visual pitch/roll target-углы (тот же ramp паттерн)
//! 4. slerp текущей visual ориентации к target (второй, более медленный слой)

use bevy::prelude::*;

use super::config::{FlightTuning, SpeedEnvelope, VerticalEnvelope, VisualEnvelope};

/// Порог нормированной вертикальной скорости для climb/dive coupling
pub const CLIMB_DIVE_THRESHOLD: f32 = 0.1;

/// Предел visual pitch/roll (градусы)
pub const MAX_VISUAL_ANGLE: f32 = 90.0;

/// Нормированный control input для одного тика полёта
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct FlightControl {
    /// [-1, 1]: >0 разгон, <0 тормоз/реверс
    pub throttle: f32,
    /// [-1, 1]: >0 поворот вправо
    pub yaw: f32,
    /// [-1, 1]: >0 climb, <0 dive
    pub vertical: f32,
}

impl FlightControl {
    pub fn new(throttle: f32, yaw: f32, vertical: f32) -> Self {
        Self { throttle, yaw, vertical }
    }

    /// Маппинг осей player-root схемы: move.y → throttle, move.x → yaw
    pub fn from_axes(move_axis: Vec2, vertical_axis: f32) -> Self {
        Self::new(move_axis.y, move_axis.x, vertical_axis)
    }

    /// NaN/inf → 0, затем clamp в [-1, 1]
    pub fn sanitized(self) -> Self {
        fn axis(value: f32) -> f32 {
            if value.is_finite() {
                value.clamp(-1.0, 1.0)
            } else {
                0.0
            }
        }
        Self {
            throttle: axis(self.throttle),
            yaw: axis(self.yaw),
            vertical: axis(self.vertical),
        }
    }
}

/// Динамическое состояние полёта между тиками
///
/// Инвариант (вне полёта): всё нули, ориентация identity (`MotionState::default()`).
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct MotionState {
    /// Продольная скорость (m/s), отрицательная = задний ход
    pub speed: f32,
    /// Вертикальная скорость (m/s), world up
    pub vertical_speed: f32,
    /// Сколько держится vertical input (сек, [0, ramp_up_time])
    pub vertical_hold_time: f32,
    /// Target pitch (градусы, [-90, 90])
    pub visual_pitch: f32,
    /// Target roll (градусы, [-90, 90])
    pub visual_roll: f32,
    pub pitch_hold_time: f32,
    pub roll_hold_time: f32,
    /// Сглаженная local ориентация модели mount
    pub visual_orientation: Quat,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            speed: 0.0,
            vertical_speed: 0.0,
            vertical_hold_time: 0.0,
            visual_pitch: 0.0,
            visual_roll: 0.0,
            pitch_hold_time: 0.0,
            roll_hold_time: 0.0,
            visual_orientation: Quat::IDENTITY,
        }
    }
}

impl MotionState {
    pub fn is_at_rest(&self) -> bool {
        *self == Self::default()
    }
}

/// Результат одного тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    pub state: MotionState,
    /// Смещение вдоль local forward carrier'а
    pub forward_displacement: f32,
    /// Смещение вдоль world up
    pub vertical_displacement: f32,
    /// Поворот carrier'а по yaw (градусы, >0 вправо)
    pub yaw_delta: f32,
}

impl MotionStep {
    fn unchanged(state: MotionState) -> Self {
        Self {
            state,
            forward_displacement: 0.0,
            vertical_displacement: 0.0,
            yaw_delta: 0.0,
        }
    }
}

/// Один тик полёта
///
/// Детерминирован для любого `dt > 0` (fixed или variable). `dt <= 0` → состояние не меняется.
pub fn integrate(
    control: FlightControl,
    dt: f32,
    prev: &MotionState,
    tuning: &FlightTuning,
) -> MotionStep {
    if dt <= 0.0 || !dt.is_finite() {
        return MotionStep::unchanged(*prev);
    }
    let control = control.sanitized();

    let speed = step_speed(
        control.throttle,
        prev.speed,
        prev.vertical_speed,
        dt,
        &tuning.speed,
        &tuning.vertical,
    );

    let normalized_speed = normalized_speed(speed, &tuning.speed);

    let (vertical_speed, vertical_hold_time) = step_vertical(
        control.vertical,
        normalized_speed,
        prev.vertical_speed,
        prev.vertical_hold_time,
        dt,
        &tuning.speed,
        &tuning.vertical,
    );

    // Pitch следует за vertical input, roll за yaw input
    let speed_influence = speed_influence(normalized_speed, &tuning.visual);
    let pitch = step_visual_axis(
        control.vertical,
        AxisState { angle: prev.visual_pitch, hold_time: prev.pitch_hold_time },
        tuning.visual.pitch_angle,
        speed_influence,
        dt,
        &tuning.visual,
    );
    let roll = step_visual_axis(
        control.yaw,
        AxisState { angle: prev.visual_roll, hold_time: prev.roll_hold_time },
        tuning.visual.roll_angle,
        speed_influence,
        dt,
        &tuning.visual,
    );

    let target_orientation = visual_orientation(pitch.angle, roll.angle);
    let blend = (tuning.visual.rotation_smoothness * dt).min(1.0);
    let visual_orientation = prev.visual_orientation.slerp(target_orientation, blend).normalize();

    let state = MotionState {
        speed,
        vertical_speed,
        vertical_hold_time,
        visual_pitch: pitch.angle,
        visual_roll: roll.angle,
        pitch_hold_time: pitch.hold_time,
        roll_hold_time: roll.hold_time,
        visual_orientation,
    };

    MotionStep {
        state,
        forward_displacement: speed * dt,
        vertical_displacement: vertical_speed * dt,
        yaw_delta: control.yaw * tuning.yaw_speed * dt,
    }
}

/// Speed update (throttle, climb/dive coupling, clamps)
///
/// Результат всегда в `[reverse_speed, forward_speed * max_dive_speed_multiplier]`.
pub fn step_speed(
    throttle: f32,
    speed: f32,
    vertical_speed: f32,
    dt: f32,
    envelope: &SpeedEnvelope,
    vertical: &VerticalEnvelope,
) -> f32 {
    let mut speed = speed;

    if throttle > 0.0 {
        speed = (speed + envelope.acceleration * dt).min(envelope.forward_speed);
    } else if throttle < 0.0 {
        if speed > 0.0 {
            // Торможение до нуля, в реверс не проваливаемся за один тик
            speed = (speed + throttle * envelope.brake_acceleration * dt).max(0.0);
        } else {
            speed = (speed + throttle * envelope.acceleration * dt).max(envelope.reverse_speed);
        }
    } else {
        speed = move_towards(speed, 0.0, envelope.deceleration * dt);
    }

    // Climb съедает скорость, dive добавляет (до потолка пике)
    let climb = normalized_climb(vertical_speed, envelope, vertical);
    if climb > CLIMB_DIVE_THRESHOLD {
        speed -= envelope.speed_loss_on_climb * climb.abs() * dt;
    } else if climb < -CLIMB_DIVE_THRESHOLD {
        speed = (speed + envelope.speed_gain_on_dive * climb.abs() * dt).min(envelope.max_speed());
    }

    if throttle == 0.0 {
        speed = speed.max(0.0).min(envelope.forward_speed);
    } else if speed < envelope.reverse_speed && throttle >= 0.0 {
        speed = lerp(speed, 0.0, (envelope.deceleration * dt).min(1.0));
    }

    speed.max(envelope.reverse_speed).min(envelope.max_speed())
}

/// Vertical update → (vertical_speed, hold_time)
pub fn step_vertical(
    input: f32,
    normalized_speed: f32,
    vertical_speed: f32,
    hold_time: f32,
    dt: f32,
    envelope: &SpeedEnvelope,
    vertical: &VerticalEnvelope,
) -> (f32, f32) {
    let ramp_up_time = vertical.vertical_ramp_up_time;
    let hold_time = ramp_hold_time(
        input,
        hold_time,
        dt,
        ramp_up_time,
        vertical.vertical_ramp_down_speed,
    );
    let ramp_factor = (hold_time / ramp_up_time).clamp(0.0, 1.0);

    let max_vertical = vertical.max_vertical_speed_factor * envelope.forward_speed;
    let target = (vertical.min_vertical_speed
        + normalized_speed * (max_vertical - vertical.min_vertical_speed))
        * (1.0 + 2.0 * ramp_factor);
    let target = target.max(vertical.min_vertical_speed).min(max_vertical * 3.0);

    let rate = if is_reversal(input, vertical_speed) {
        vertical.vertical_inertia
    } else {
        vertical.vertical_ramp_down_speed
    };
    let vertical_speed = lerp(vertical_speed, input * target, (rate * dt).min(1.0));

    (vertical_speed, hold_time)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisState {
    pub angle: f32,
    pub hold_time: f32,
}

/// Одна ось visual наклона (pitch или roll)
pub fn step_visual_axis(
    input: f32,
    prev: AxisState,
    base_angle: f32,
    speed_influence: f32,
    dt: f32,
    visual: &VisualEnvelope,
) -> AxisState {
    let ramp_up_time = visual.rotation_ramp_up_time;
    let hold_time = ramp_hold_time(input, prev.hold_time, dt, ramp_up_time, visual.rotation_return_speed);
    let axis_ramp = (hold_time / ramp_up_time).clamp(0.0, 1.0);

    let target_angle = base_angle * speed_influence * (1.0 + 0.5 * axis_ramp);
    let desired = -input * target_angle;

    let rate = if is_reversal(-input, prev.angle) {
        visual.rotation_inertia
    } else {
        visual.rotation_smoothness
    };
    let angle = lerp(prev.angle, desired, (rate * dt).min(1.0))
        .clamp(-MAX_VISUAL_ANGLE, MAX_VISUAL_ANGLE);

    AxisState { angle, hold_time }
}

/// Hold-time ramp: растёт на dt пока input != 0, иначе спадает
/// со скоростью `dt * ramp_up_time / return_speed`.
pub fn ramp_hold_time(input: f32, hold_time: f32, dt: f32, ramp_up_time: f32, return_speed: f32) -> f32 {
    let next = if input != 0.0 {
        hold_time + dt
    } else {
        hold_time - dt * ramp_up_time / return_speed
    };
    next.clamp(0.0, ramp_up_time)
}

/// |speed| / forward_speed в [0, 1]
pub fn normalized_speed(speed: f32, envelope: &SpeedEnvelope) -> f32 {
    (speed.abs() / envelope.forward_speed).clamp(0.0, 1.0)
}

/// Вертикальная скорость, нормированная на потолок вертикали, в [-1, 1]
pub fn normalized_climb(vertical_speed: f32, envelope: &SpeedEnvelope, vertical: &VerticalEnvelope) -> f32 {
    let ceiling = envelope.forward_speed * vertical.max_vertical_speed_factor * 3.0;
    (vertical_speed / ceiling).clamp(-1.0, 1.0)
}

pub fn speed_influence(normalized_speed: f32, visual: &VisualEnvelope) -> f32 {
    lerp(visual.min_rotation_factor, 1.0, normalized_speed)
}

/// Target local ориентация модели из pitch/roll (градусы)
///
/// Pitch хранится со знаком "nose down > 0": climb даёт отрицательный pitch и нос вверх.
/// Roll < 0 опускает правое крыло (поворот вправо).
pub fn visual_orientation(pitch: f32, roll: f32) -> Quat {
    Quat::from_rotation_x((-pitch).to_radians()) * Quat::from_rotation_z(roll.to_radians())
}

/// Разворот: input и текущее значение ненулевые и разных знаков
fn is_reversal(input: f32, current: f32) -> bool {
    input != 0.0 && current != 0.0 && input.signum() != current.signum()
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}
