//! Interaction controller: on-foot ⇄ flight handoff
//!
//! Два независимых механизма:
//! - Proximity scan (sphere overlap) → MountRangeEntered / MountRangeExited (edge-triggered)
//! - Directional confirm (raycast по Interact) → ActivateFlightRequest
//!
//! Mount protocol (только по FlightActivated): ground control off, visuals off,
//! mount прикрепляется к rider'у, камера на rider'а, prompt спрятан.
//! Dismount (по FlightDeactivated): всё обратно, mount впереди rider'а, attachment → home.

use bevy::prelude::*;

pub mod components;
pub mod config;
pub mod events;
pub mod systems;

pub use components::{MountInteractor, Mountable, RiderVisuals};
pub use config::InteractionConfig;
pub use events::{GroundControlToggled, MountRangeEntered, MountRangeExited, VisualsToggled};
pub use systems::{
    dismount_placement, handle_flight_activated, handle_flight_deactivated, request_dismount, scan_mount_proximity,
    try_mount,
};

/// Interaction Plugin
///
/// Порядок выполнения (Update):
/// 1. SimSet::Interaction — scan_mount_proximity → try_mount → request_dismount
/// 2. SimSet::Handoff — handle_flight_deactivated → handle_flight_activated (после apply_flight_requests)
pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<MountInteractor>()
            .register_type::<Mountable>()
            .register_type::<RiderVisuals>()
            .add_event::<MountRangeEntered>()
            .add_event::<MountRangeExited>()
            .add_event::<VisualsToggled>()
            .add_event::<GroundControlToggled>();

        app.add_systems(
            Update,
            (scan_mount_proximity, try_mount, request_dismount)
                .chain()
                .in_set(crate::SimSet::Interaction),
        )
        .add_systems(
            Update,
            (handle_flight_deactivated, handle_flight_activated)
                .chain()
                .in_set(crate::SimSet::Handoff),
        );
    }
}
