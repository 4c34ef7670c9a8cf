//! Flight module: dragon flight mode
//!
//! ECS ответственность:
//! - FlightState (Grounded ⇄ Flying) на mount entity
//! - Motion integrator: speed / vertical / visual pitch-roll dynamics
//! - Движение carrier'а (rider root) по результату integrator'а
//!
//! Flow:
//! 1. Interaction → ActivateFlightRequest / DeactivateFlightRequest
//! 2. guard_carrier_authority → DeactivateFlightRequest(LostCarrier)
//! 3. apply_flight_requests → FlightActivated / FlightDeactivated (ровно один на переход)
//! 4. flight_motion → Transform carrier'а + VisualPose mount'а

use bevy::prelude::*;

pub mod config;
pub mod events;
pub mod integrator;
pub mod state;
pub mod systems;


pub use config::{FlightTuning, SpeedEnvelope, VerticalEnvelope, VisualEnvelope};
pub use events::{
    ActivateFlightRequest, DeactivateFlightRequest, DeactivationReason, FlightActivated, FlightDeactivated,
};
pub use integrator::{integrate, FlightControl, MotionState, MotionStep};
pub use state::{FlightPhase, FlightState};
pub use systems::{apply_flight_requests, flight_motion, guard_carrier_authority};

/// Flight Plugin
///
/// Порядок выполнения (Update):
/// 1. SimSet::FlightTransitions — guard_carrier_authority → apply_flight_requests
/// 2. SimSet::Locomotion — flight_motion
pub struct FlightPlugin;

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<FlightState>()
            .register_type::<FlightTuning>()
            .add_event::<ActivateFlightRequest>()
            .add_event::<DeactivateFlightRequest>()
            .add_event::<FlightActivated>()
            .add_event::<FlightDeactivated>();

        app.add_systems(
            Update,
            (guard_carrier_authority, apply_flight_requests)
                .chain()
                .in_set(crate::SimSet::FlightTransitions),
        )
        .add_systems(Update, flight_motion.in_set(crate::SimSet::Locomotion));
    }
}
