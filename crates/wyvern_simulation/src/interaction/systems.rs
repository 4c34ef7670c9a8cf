//! Interaction systems: proximity prompt, mount request, mount / dismount protocol

use bevy::prelude::*;

use super::components::{MountInteractor, Mountable, RiderVisuals};
use super::events::{GroundControlToggled, MountRangeEntered, MountRangeExited, VisualsToggled};
use crate::attachment::Attachment;
use crate::camera::SetCameraTarget;
use crate::flight::{
    ActivateFlightRequest, DeactivateFlightRequest, DeactivationReason, FlightActivated, FlightDeactivated, FlightState,
};
use crate::ground::GroundController;
use crate::input::{InputRouting, PlayerInput};
use crate::logger;
use crate::physics::{layers, SpatialFilter, SpatialIndex, SpatialQuery};

/// Поза mount'а после dismount: впереди rider'а, с его ротацией
pub fn dismount_placement(rider: &Transform, forward_offset: f32) -> (Vec3, Quat) {
    (rider.translation + rider.forward() * forward_offset, rider.rotation)
}

fn hide_prompt(rider: Entity, interactor: &mut MountInteractor, exited: &mut EventWriter<MountRangeExited>) {
    if interactor.ui_active() {
        interactor.set_ui_active(false);
        exited.write(MountRangeExited {
            rider,
            mount: interactor.mount(),
        });
    }
}

/// Система: proximity scan (edge-triggered UI prompt)
///
/// - mount не найден → interactor выключается (missing reference)
/// - interactor выключен в полёте → DeactivateFlightRequest(Teardown)
/// - в полёте prompt всегда спрятан
pub fn scan_mount_proximity(
    spatial: Res<SpatialIndex>,
    mut interactors: Query<(Entity, &mut MountInteractor, &Transform)>,
    mounts: Query<&FlightState, With<Mountable>>,
    mut entered: EventWriter<MountRangeEntered>,
    mut exited: EventWriter<MountRangeExited>,
    mut deactivations: EventWriter<DeactivateFlightRequest>,
) {
    for (rider, mut interactor, transform) in interactors.iter_mut() {
        let mount = interactor.mount();

        let Ok(flight) = mounts.get(mount) else {
            if interactor.is_enabled() {
                logger::log_error(&format!(
                    "❌ Rider {:?}: mount {:?} not found (needs Mountable + FlightState), interactor disabled",
                    rider, mount
                ));
                interactor.set_enabled(false);
            }
            hide_prompt(rider, &mut interactor, &mut exited);
            continue;
        };

        if !interactor.is_enabled() {
            if flight.is_active() && interactor.current_mount() == Some(mount) {
                logger::log_warning(&format!(
                    "Rider {:?}: interactor disabled mid-flight, forcing deactivation of {:?}",
                    rider, mount
                ));
                deactivations.write(DeactivateFlightRequest {
                    mount,
                    reason: DeactivationReason::Teardown,
                });
            }
            hide_prompt(rider, &mut interactor, &mut exited);
            continue;
        }

        if flight.is_active() {
            hide_prompt(rider, &mut interactor, &mut exited);
            continue;
        }

        let filter = SpatialFilter::new(layers::MOUNT).excluding(rider);
        let in_range = spatial
            .overlap_sphere(transform.translation, interactor.config.ui_detection_radius, filter)
            .contains(&mount);

        if in_range && !interactor.ui_active() {
            interactor.set_ui_active(true);
            logger::log(&format!("👀 Mount {:?} in range of rider {:?}", mount, rider));
            entered.write(MountRangeEntered { rider, mount });
        } else if !in_range && interactor.ui_active() {
            logger::log(&format!("Mount {:?} left range of rider {:?}", mount, rider));
            hide_prompt(rider, &mut interactor, &mut exited);
        }
    }
}

/// Система: Interact trigger → raycast → ActivateFlightRequest
///
/// Только в Ground routing, только пока prompt активен и mount не летит.
/// Луч: от root + ray_origin_height вдоль forward rider'а, слой MOUNT.
/// Сам mount protocol выполняется только после подтверждения (`handle_flight_activated`).
pub fn try_mount(
    spatial: Res<SpatialIndex>,
    interactors: Query<(Entity, &MountInteractor, &Transform, &PlayerInput, Option<&InputRouting>)>,
    mounts: Query<&FlightState, With<Mountable>>,
    mut activations: EventWriter<ActivateFlightRequest>,
) {
    for (rider, interactor, transform, input, routing) in interactors.iter() {
        if !input.interact {
            continue;
        }
        if routing.copied().unwrap_or_default() != InputRouting::Ground {
            continue;
        }
        if !interactor.is_enabled() || !interactor.ui_active() {
            continue;
        }

        let mount = interactor.mount();
        if mounts.get(mount).map_or(true, |flight| flight.is_active()) {
            continue;
        }

        let config = interactor.config;
        let origin = transform.translation + Vec3::Y * config.ray_origin_height;
        let filter = SpatialFilter::new(layers::MOUNT).excluding(rider);
        let hit = spatial.cast_ray(origin, transform.forward().as_vec3(), config.interaction_range, filter);
        if hit.map(|hit| hit.entity) != Some(mount) {
            logger::log(&format!("Interact: rider {:?} is not facing mount {:?}", rider, mount));
            continue;
        }

        logger::log(&format!("Rider {:?} requests mount {:?}", rider, mount));
        activations.write(ActivateFlightRequest { mount, carrier: rider });
    }
}

/// Система: FlightActivated → mount protocol
///
/// Ground control off, visuals off, mount прикрепляется к rider'у (home запоминается),
/// камера на rider'а, prompt спрятан. Отклонённый запрос сигнала не даёт,
/// так что частичного состояния не бывает.
#[allow(clippy::too_many_arguments)]
pub fn handle_flight_activated(
    mut commands: Commands,
    mut activations: EventReader<FlightActivated>,
    mut riders: Query<(&mut MountInteractor, Option<&mut GroundController>)>,
    mut mounts: Query<(&mut Mountable, Option<&Attachment>)>,
    mut visuals: Query<&mut RiderVisuals>,
    mut retarget: EventWriter<SetCameraTarget>,
    mut exited: EventWriter<MountRangeExited>,
    mut visuals_toggled: EventWriter<VisualsToggled>,
    mut ground_toggled: EventWriter<GroundControlToggled>,
) {
    for event in activations.read() {
        let rider = event.carrier;
        let Ok((mut interactor, ground)) = riders.get_mut(rider) else {
            // Полёт активирован не через interactor — protocol не наш
            continue;
        };
        if interactor.mount() != event.mount {
            continue;
        }
        let Ok((mut mountable, home)) = mounts.get_mut(event.mount) else {
            continue;
        };

        // Ground control off
        if let Some(mut ground) = ground {
            if ground.is_enabled() {
                ground.set_enabled(false);
                ground_toggled.write(GroundControlToggled { rider, enabled: false });
            }
        }

        // Visuals off
        if let Some(visuals_entity) = interactor.visuals() {
            if let Ok(mut rider_visuals) = visuals.get_mut(visuals_entity) {
                rider_visuals.visible = false;
                visuals_toggled.write(VisualsToggled {
                    visuals: visuals_entity,
                    visible: false,
                });
            }
        }

        // Mount → под rider'а
        let config = interactor.config;
        mountable.store_home(home.copied());
        commands.entity(event.mount).insert(Attachment::new(
            rider,
            config.mount_translation(),
            config.mount_rotation(),
        ));

        if let Some(camera) = interactor.camera() {
            retarget.write(SetCameraTarget { camera, target: rider });
        }

        hide_prompt(rider, &mut interactor, &mut exited);
        interactor.set_current_mount(Some(event.mount));

        logger::log_info(&format!("🐲 Rider {:?} mounted {:?}", rider, event.mount));
    }
}

/// Система: ToggleFlight в полёте → DeactivateFlightRequest(Dismount)
pub fn request_dismount(
    interactors: Query<(Entity, &MountInteractor, &PlayerInput, Option<&InputRouting>)>,
    mounts: Query<&FlightState>,
    mut requests: EventWriter<DeactivateFlightRequest>,
) {
    for (rider, interactor, input, routing) in interactors.iter() {
        if !input.toggle_flight || routing.copied() != Some(InputRouting::Flight) {
            continue;
        }
        let Some(mount) = interactor.current_mount() else {
            continue;
        };
        if mounts.get(mount).is_ok_and(|state| state.is_active()) {
            logger::log(&format!("Rider {:?} requests dismount from {:?}", rider, mount));
            requests.write(DeactivateFlightRequest {
                mount,
                reason: DeactivationReason::Dismount,
            });
        }
    }
}

/// Система: FlightDeactivated → dismount protocol
///
/// Rider (если ещё есть): ground control и visuals обратно, камера на rider'а.
/// Mount: ставится впереди rider'а, attachment возвращается к `home`.
/// Повторный сигнал для того же mount — no-op (current mount уже сброшен).
pub fn handle_flight_deactivated(
    mut commands: Commands,
    mut deactivations: EventReader<FlightDeactivated>,
    mut riders: Query<
        (Entity, &mut MountInteractor, &Transform, Option<&mut GroundController>),
        Without<Mountable>,
    >,
    mut mounts: Query<(&mut Mountable, &mut Transform), Without<MountInteractor>>,
    owners: Query<&Transform, (Without<Mountable>, Without<MountInteractor>)>,
    mut visuals: Query<&mut RiderVisuals>,
    mut retarget: EventWriter<SetCameraTarget>,
    mut visuals_toggled: EventWriter<VisualsToggled>,
    mut ground_toggled: EventWriter<GroundControlToggled>,
) {
    for event in deactivations.read() {
        let mut placement = None;

        let rider = riders
            .iter_mut()
            .find(|(_, interactor, _, _)| interactor.current_mount() == Some(event.mount));
        if let Some((rider, mut interactor, rider_transform, ground)) = rider {
            interactor.set_current_mount(None);

            if let Some(mut ground) = ground {
                if !ground.is_enabled() {
                    ground.set_enabled(true);
                    ground_toggled.write(GroundControlToggled { rider, enabled: true });
                }
            }

            if let Some(visuals_entity) = interactor.visuals() {
                if let Ok(mut rider_visuals) = visuals.get_mut(visuals_entity) {
                    rider_visuals.visible = true;
                    visuals_toggled.write(VisualsToggled {
                        visuals: visuals_entity,
                        visible: true,
                    });
                }
            }

            if let Some(camera) = interactor.camera() {
                retarget.write(SetCameraTarget { camera, target: rider });
            }

            placement = Some(dismount_placement(
                rider_transform,
                interactor.config.dismount_forward_offset,
            ));
            logger::log_info(&format!(
                "🧍 Rider {:?} dismounted {:?} ({:?})",
                rider, event.mount, event.reason
            ));
        }

        let Ok((mut mountable, mut mount_transform)) = mounts.get_mut(event.mount) else {
            continue;
        };
        if !mountable.is_mounted() {
            continue;
        }

        // Без rider'а mount остаётся там, где его застала деактивация
        if let Some((translation, rotation)) = placement {
            mount_transform.translation = translation;
            mount_transform.rotation = rotation;
        }

        match mountable.take_home() {
            Some(home) => match owners.get(home.owner) {
                Ok(owner_transform) => {
                    commands.entity(event.mount).insert(Attachment::preserving_world(
                        home.owner,
                        owner_transform,
                        &mount_transform,
                    ));
                }
                Err(_) => {
                    logger::log_warning(&format!(
                        "Mount {:?}: home owner {:?} is gone, leaving mount at scene root",
                        event.mount, home.owner
                    ));
                    commands.entity(event.mount).remove::<Attachment>();
                }
            },
            None => {
                commands.entity(event.mount).remove::<Attachment>();
            }
        }
    }
}
