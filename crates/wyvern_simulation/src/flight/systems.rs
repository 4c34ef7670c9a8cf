//! Flight systems: переходы Grounded ⇄ Flying и per-tick движение carrier'а

use bevy::prelude::*;

use super::config::FlightTuning;
use super::events::{
    ActivateFlightRequest, DeactivateFlightRequest, DeactivationReason, FlightActivated, FlightDeactivated,
};
use super::integrator::FlightControl;
use super::state::FlightState;
use crate::attachment::VisualPose;
use crate::input::{InputRouting, PlayerInput};
use crate::logger;

/// Система: принудительная деактивация, если carrier пропал посреди полёта
///
/// Carrier despawned (или потерял Transform) → DeactivateFlightRequest(LostCarrier).
/// Повторный запрос безопасен: `deactivate` на Grounded — no-op.
pub fn guard_carrier_authority(
    mounts: Query<(Entity, &FlightState)>,
    carriers: Query<(), (With<Transform>, Without<FlightState>)>,
    mut requests: EventWriter<DeactivateFlightRequest>,
) {
    for (mount, state) in mounts.iter() {
        if !state.is_active() {
            continue;
        }

        let lost = match state.carrier() {
            Some(carrier) => carriers.get(carrier).is_err(),
            None => true,
        };
        if lost {
            logger::log_warning(&format!(
                "⚠️ Mount {:?}: carrier {:?} lost mid-flight, forcing deactivation",
                mount,
                state.carrier()
            ));
            requests.write(DeactivateFlightRequest {
                mount,
                reason: DeactivationReason::LostCarrier,
            });
        }
    }
}

/// Система: применить запросы переходов
///
/// Порядок: сначала deactivation (безопасное состояние), потом activation.
/// Сигнал FlightActivated/FlightDeactivated пишется только если переход реально произошёл.
pub fn apply_flight_requests(
    mut activations: EventReader<ActivateFlightRequest>,
    mut deactivations: EventReader<DeactivateFlightRequest>,
    mut mounts: Query<(&mut FlightState, &mut VisualPose)>,
    mut carriers: Query<Option<&mut InputRouting>, (With<Transform>, Without<FlightState>)>,
    mut activated: EventWriter<FlightActivated>,
    mut deactivated: EventWriter<FlightDeactivated>,
) {
    for request in deactivations.read() {
        let Ok((mut state, mut pose)) = mounts.get_mut(request.mount) else {
            logger::log_warning(&format!(
                "Deactivate request for {:?} ignored: not a mount",
                request.mount
            ));
            continue;
        };

        let Some(carrier) = state.deactivate() else {
            // Уже на земле (повторный сигнал)
            continue;
        };
        pose.rotation = Quat::IDENTITY;

        if let Ok(Some(mut routing)) = carriers.get_mut(carrier) {
            *routing = InputRouting::Ground;
        }

        logger::log_info(&format!(
            "🛬 Flight deactivated: mount {:?}, carrier {:?}, reason {:?}",
            request.mount, carrier, request.reason
        ));
        deactivated.write(FlightDeactivated {
            mount: request.mount,
            carrier,
            reason: request.reason,
        });
    }

    for request in activations.read() {
        let Ok((mut state, mut pose)) = mounts.get_mut(request.mount) else {
            logger::log_warning(&format!(
                "Activate request for {:?} ignored: not a mount",
                request.mount
            ));
            continue;
        };

        // Carrier должен существовать: переход либо целиком, либо никак
        let Ok(routing) = carriers.get_mut(request.carrier) else {
            logger::log_warning(&format!(
                "Activate request for {:?} rejected: carrier {:?} not found",
                request.mount, request.carrier
            ));
            continue;
        };

        if !state.activate(request.carrier) {
            // Уже летим (activate-while-active)
            continue;
        }
        pose.rotation = Quat::IDENTITY;

        if let Some(mut routing) = routing {
            *routing = InputRouting::Flight;
        }

        logger::log_info(&format!(
            "🐉 Flight activated: mount {:?}, carrier {:?}",
            request.mount, request.carrier
        ));
        activated.write(FlightActivated {
            mount: request.mount,
            carrier: request.carrier,
        });
    }
}

/// Система: один тик полёта
///
/// Integrator → yaw carrier'а, затем смещение вдоль его forward и world up.
/// Visual наклон пишется в VisualPose mount'а (heading carrier'а не трогает).
/// Flight control читается только если action map carrier'а = Flight.
pub fn flight_motion(
    time: Res<Time>,
    mut mounts: Query<(&mut FlightState, &FlightTuning, &mut VisualPose)>,
    mut carriers: Query<(&mut Transform, Option<&PlayerInput>, Option<&InputRouting>), Without<FlightState>>,
) {
    let dt = time.delta_secs();

    for (mut state, tuning, mut pose) in mounts.iter_mut() {
        let Some(carrier) = state.carrier() else {
            continue;
        };
        let Ok((mut transform, input, routing)) = carriers.get_mut(carrier) else {
            // guard_carrier_authority разберётся в следующем frame
            continue;
        };

        let control = match (input, routing) {
            (Some(input), Some(InputRouting::Flight)) => input.flight_control(),
            _ => FlightControl::default(),
        };

        let Some(step) = state.tick(control, dt, tuning) else {
            continue;
        };

        transform.rotate_y(-step.yaw_delta.to_radians());
        let forward = transform.forward();
        transform.translation += forward * step.forward_displacement + Vec3::Y * step.vertical_displacement;

        pose.rotation = step.state.visual_orientation;
    }
}
