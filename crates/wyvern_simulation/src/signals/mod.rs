//! Signals: журнал внешних сигналов за frame
//!
//! Все outward events (UI prompt, flight on/off, visuals, ground control, camera target)
//! складываются в `SignalLog`. Порядок внутри frame'а фиксированный: по виду сигнала
//! (порядок вариантов `SimSignal`), внутри одного вида в порядке записи событий.
//! Host забирает их через `RiderSimulation::tick` (drain), так что каждый сигнал
//! виден ровно один раз.

use bevy::prelude::*;

use crate::camera::SetCameraTarget;
use crate::flight::{DeactivationReason, FlightActivated, FlightDeactivated};
use crate::input::consume_triggers;
use crate::interaction::{GroundControlToggled, MountRangeEntered, MountRangeExited, VisualsToggled};

/// Один внешний сигнал
#[derive(Debug, Clone, PartialEq)]
pub enum SimSignal {
    MountRangeEntered { rider: Entity, mount: Entity },
    MountRangeExited { rider: Entity, mount: Entity },
    FlightActivated { mount: Entity, carrier: Entity },
    FlightDeactivated { mount: Entity, carrier: Entity, reason: DeactivationReason },
    VisualsToggled { visuals: Entity, visible: bool },
    GroundControlToggled { rider: Entity, enabled: bool },
    CameraTargetChanged { camera: Entity, target: Entity },
}

/// Накопитель сигналов (очищается host'ом через `drain`)
#[derive(Resource, Debug, Default)]
pub struct SignalLog {
    signals: Vec<SimSignal>,
}

impl SignalLog {
    pub fn push(&mut self, signal: SimSignal) {
        self.signals.push(signal);
    }

    pub fn drain(&mut self) -> Vec<SimSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn signals(&self) -> &[SimSignal] {
        &self.signals
    }
}

/// Система: events этого frame → SignalLog
///
/// Сигналы группируются по виду, а не по моменту записи внутри frame'а.
#[allow(clippy::too_many_arguments)]
pub fn record_signals(
    mut log: ResMut<SignalLog>,
    mut entered: EventReader<MountRangeEntered>,
    mut exited: EventReader<MountRangeExited>,
    mut activated: EventReader<FlightActivated>,
    mut deactivated: EventReader<FlightDeactivated>,
    mut visuals: EventReader<VisualsToggled>,
    mut ground: EventReader<GroundControlToggled>,
    mut retargets: EventReader<SetCameraTarget>,
) {
    for event in entered.read() {
        log.push(SimSignal::MountRangeEntered {
            rider: event.rider,
            mount: event.mount,
        });
    }
    for event in exited.read() {
        log.push(SimSignal::MountRangeExited {
            rider: event.rider,
            mount: event.mount,
        });
    }
    for event in activated.read() {
        log.push(SimSignal::FlightActivated {
            mount: event.mount,
            carrier: event.carrier,
        });
    }
    for event in deactivated.read() {
        log.push(SimSignal::FlightDeactivated {
            mount: event.mount,
            carrier: event.carrier,
            reason: event.reason,
        });
    }
    for event in visuals.read() {
        log.push(SimSignal::VisualsToggled {
            visuals: event.visuals,
            visible: event.visible,
        });
    }
    for event in ground.read() {
        log.push(SimSignal::GroundControlToggled {
            rider: event.rider,
            enabled: event.enabled,
        });
    }
    for event in retargets.read() {
        log.push(SimSignal::CameraTargetChanged {
            camera: event.camera,
            target: event.target,
        });
    }
}

/// Signals Plugin
///
/// SimSet::Signals: record_signals → consume_triggers (конец Update)
pub struct SignalsPlugin;

impl Plugin for SignalsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SignalLog>().add_systems(
            Update,
            (record_signals, consume_triggers)
                .chain()
                .in_set(crate::SimSet::Signals),
        );
    }
}
