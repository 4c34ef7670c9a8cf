//! Player input boundary
//!
//! Host (input-abstraction слой) пишет `PlayerInput` на rider entity каждый frame.
//! Симуляция читает только нормализованные оси и discrete triggers.
//!
//! Flow:
//! 1. Host заполняет PlayerInput (оси + triggers этого frame)
//! 2. Interaction / ground / flight системы читают его согласно `InputRouting`
//! 3. `consume_triggers` (SimSet::Signals) сбрасывает one-shot triggers

use bevy::prelude::*;

use crate::flight::FlightControl;

/// Input одного frame
///
/// Оси: `move_axis.y > 0` — вперёд (ground) / throttle (flight),
/// `move_axis.x > 0` — вправо (strafe / yaw).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    /// Climb (+1) / dive (-1)
    pub vertical_axis: f32,
    /// Camera look delta (x — yaw, y — pitch)
    pub look_axis: Vec2,
    /// Run modifier (held)
    pub sprint: bool,
    // One-shot triggers (pressed в этом frame)
    pub jump: bool,
    pub crouch: bool,
    pub interact: bool,
    pub toggle_flight: bool,
}

impl PlayerInput {
    /// Flight control из осей (player-root-relative схема)
    pub fn flight_control(&self) -> FlightControl {
        FlightControl::from_axes(self.move_axis, self.vertical_axis)
    }

    pub fn clear_triggers(&mut self) {
        self.jump = false;
        self.crouch = false;
        self.interact = false;
        self.toggle_flight = false;
    }
}

/// Активная action map rider'а
///
/// Переключается flight transitions: activation → Flight, deactivation → Ground.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum InputRouting {
    #[default]
    Ground,
    Flight,
}

/// Система: сброс one-shot triggers в конце frame
pub fn consume_triggers(mut inputs: Query<&mut PlayerInput>) {
    for mut input in inputs.iter_mut() {
        if input.jump || input.crouch || input.interact || input.toggle_flight {
            input.clear_triggers();
        }
    }
}
