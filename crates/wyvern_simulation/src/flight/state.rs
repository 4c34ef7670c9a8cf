//! Flight state machine: Grounded ⇄ Flying
//!
//! `FlightState` живёт на mount entity и меняется только через
//! `activate` / `deactivate` / `tick`. Поля приватные — снаружи только чтение.

use bevy::prelude::*;

use super::config::FlightTuning;
use super::integrator::{integrate, FlightControl, MotionState, MotionStep};
use crate::attachment::VisualPose;

/// Фаза полёта (промежуточных состояний нет)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum FlightPhase {
    /// Начальное состояние, mount стоит на земле
    #[default]
    Grounded,
    /// Mount несёт carrier'а, integrator активен
    Flying,
}

/// Авторитетное состояние полёта mount'а
///
/// Инвариант: `Grounded` ⇒ `motion == MotionState::default()` и `carrier == None`.
#[derive(Component, Debug, Clone, PartialEq, Default, Reflect)]
#[reflect(Component)]
#[require(FlightTuning, VisualPose)]
pub struct FlightState {
    phase: FlightPhase,
    motion: MotionState,
    /// Rider, к transform которого применяется движение
    carrier: Option<Entity>,
}

impl FlightState {
    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == FlightPhase::Flying
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn carrier(&self) -> Option<Entity> {
        self.carrier
    }

    pub fn current_speed(&self) -> f32 {
        self.motion.speed
    }

    pub fn vertical_speed(&self) -> f32 {
        self.motion.vertical_speed
    }

    /// Grounded → Flying
    ///
    /// Guard: не активен. Сбрасывает динамику и запоминает carrier.
    /// Возвращает `false` (no-op) если уже летим.
    pub fn activate(&mut self, carrier: Entity) -> bool {
        if self.is_active() {
            return false;
        }
        self.motion = MotionState::default();
        self.carrier = Some(carrier);
        self.phase = FlightPhase::Flying;
        true
    }

    /// Flying → Grounded
    ///
    /// Guard: активен. Обнуляет всю динамику и carrier.
    /// Возвращает отпущенного carrier'а, `None` (no-op) если не летим.
    pub fn deactivate(&mut self) -> Option<Entity> {
        if !self.is_active() {
            return None;
        }
        let carrier = self.carrier.take();
        self.motion = MotionState::default();
        self.phase = FlightPhase::Grounded;
        carrier
    }

    /// Один тик integrator'а. `None` вне полёта.
    pub fn tick(&mut self, control: FlightControl, dt: f32, tuning: &FlightTuning) -> Option<MotionStep> {
        if !self.is_active() {
            return None;
        }
        let step = integrate(control, dt, &self.motion, tuning);
        self.motion = step.state;
        Some(step)
    }
}
