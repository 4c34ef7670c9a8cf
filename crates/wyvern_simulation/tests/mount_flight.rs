//! Mount / flight integration test
//!
//! Полный цикл через RiderSimulation:
//! - proximity prompt (edge-triggered)
//! - посадка → полёт → спешивание (home attachment восстанавливается)
//! - повторные запросы переходов не дают дублей сигналов
//! - carrier пропал посреди полёта / teardown
//! - камера: режим, effective distance, препятствия на линии target → камера
//! - tick с длинным / невалидным dt
//! - два rider'а на один mount: только carrier получает протокол посадки

use bevy::prelude::*;
use wyvern_simulation::flight::{ActivateFlightRequest, DeactivateFlightRequest};
use wyvern_simulation::*;

const DT: f32 = 1.0 / 60.0;

fn init(setup: SceneSetup) -> RiderSimulation {
    match RiderSimulation::init(setup) {
        Ok(simulation) => simulation,
        Err(err) => panic!("setup failed: {}", err),
    }
}

fn idle() -> FrameInput {
    FrameInput::default()
}

fn interact() -> FrameInput {
    FrameInput {
        interact: true,
        ..default()
    }
}

fn toggle_flight() -> FrameInput {
    FrameInput {
        toggle_flight: true,
        ..default()
    }
}

fn throttle() -> FrameInput {
    FrameInput {
        move_axis: Vec2::Y,
        ..default()
    }
}

fn count(signals: &[SimSignal], predicate: impl Fn(&SimSignal) -> bool) -> usize {
    signals.iter().filter(|signal| predicate(signal)).count()
}

/// Сесть на mount: idle tick (забирает сигналы warm-up'а), затем Interact
fn mount_up(simulation: &mut RiderSimulation) -> FrameReport {
    simulation.tick(DT, idle());
    simulation.tick(DT, interact())
}

#[test]
fn test_prompt_fires_once_per_range_crossing() {
    let mut simulation = init(SceneSetup {
        rider_position: Vec3::new(0.0, 0.0, 12.0),
        mount_position: Vec3::ZERO,
        ..default()
    });
    let rider = simulation.rider();
    let mount = simulation.mount();

    let mut signals = Vec::new();
    let mut prompt_seen = false;
    // Идём к mount'у (-Z), до ~z = 4
    for _ in 0..160 {
        let report = simulation.tick(DT, throttle());
        prompt_seen |= report.prompt_visible;
        signals.extend(report.signals);
    }
    assert!(prompt_seen);
    assert_eq!(
        count(&signals, |s| *s == SimSignal::MountRangeEntered { rider, mount }),
        1,
        "signals = {:?}",
        signals
    );
    assert_eq!(count(&signals, |s| matches!(s, SimSignal::MountRangeExited { .. })), 0);

    // Пятимся назад — prompt прячется ровно один раз
    signals.clear();
    let backwards = FrameInput {
        move_axis: Vec2::NEG_Y,
        ..default()
    };
    for _ in 0..160 {
        let report = simulation.tick(DT, backwards);
        signals.extend(report.signals);
    }
    assert_eq!(count(&signals, |s| *s == SimSignal::MountRangeExited { rider, mount }), 1);
    assert_eq!(count(&signals, |s| matches!(s, SimSignal::MountRangeEntered { .. })), 0);
    assert!(!simulation.tick(DT, idle()).prompt_visible);
}

#[test]
fn test_interact_requires_facing_mount() {
    // Rider смотрит в +Z, mount сзади (в -Z), но в радиусе prompt'а
    let mut simulation = init(SceneSetup {
        rider_yaw: 180.0,
        ..default()
    });

    let report = simulation.tick(DT, idle());
    assert!(report.prompt_visible);

    let report = simulation.tick(DT, interact());
    assert_eq!(report.flight_phase, FlightPhase::Grounded);
    assert!(report.signals.is_empty(), "signals = {:?}", report.signals);
    assert!(report.prompt_visible);
}

#[test]
fn test_mount_fly_dismount_roundtrip() {
    let perch_position = Vec3::new(0.0, 0.0, -2.5);
    let mut simulation = init(SceneSetup {
        mount_perch: Some(perch_position),
        ..default()
    });
    let rider = simulation.rider();
    let mount = simulation.mount();
    let camera = simulation.camera();
    let visuals = simulation.visuals();
    let perch = simulation.perch().expect("perch spawned");

    // === Посадка ===
    let report = mount_up(&mut simulation);
    assert_eq!(report.flight_phase, FlightPhase::Flying);
    assert!(!report.prompt_visible);
    assert_eq!(
        report.signals,
        vec![
            SimSignal::MountRangeExited { rider, mount },
            SimSignal::FlightActivated { mount, carrier: rider },
            SimSignal::VisualsToggled { visuals, visible: false },
            SimSignal::GroundControlToggled { rider, enabled: false },
            SimSignal::CameraTargetChanged { camera, target: rider },
        ]
    );
    assert!((report.mount.translation - report.rider.translation).length() < 1e-4);
    {
        let world = simulation.world();
        assert_eq!(world.get::<Attachment>(mount).map(|a| a.owner), Some(rider));
        assert_eq!(world.get::<InputRouting>(rider), Some(&InputRouting::Flight));
        assert_eq!(world.get::<RiderVisuals>(visuals).map(|v| v.visible), Some(false));
        assert!(world.get::<GroundController>(rider).is_some_and(|g| !g.is_enabled()));
        assert!(world.get::<Mountable>(mount).is_some_and(|m| m.is_mounted()));
    }

    // === Полёт вперёд ===
    let mut report = report;
    for _ in 0..120 {
        report = simulation.tick(DT, throttle());
        assert!(report.signals.is_empty(), "signals = {:?}", report.signals);
    }
    assert!(report.speed > 5.0, "speed = {}", report.speed);
    assert!(report.rider.translation.z < -5.0, "rider = {:?}", report.rider.translation);
    assert!((report.mount.translation - report.rider.translation).length() < 1e-4);
    assert_eq!(
        simulation.world().get::<ChaseCamera>(camera).map(|c| c.mode()),
        Some(CameraMode::Flight)
    );

    // === Спешивание ===
    let rider_before = report.rider;
    let report = simulation.tick(DT, toggle_flight());
    assert_eq!(report.flight_phase, FlightPhase::Grounded);
    assert_eq!(report.speed, 0.0);
    assert_eq!(
        report.signals,
        vec![
            SimSignal::FlightDeactivated {
                mount,
                carrier: rider,
                reason: DeactivationReason::Dismount,
            },
            SimSignal::VisualsToggled { visuals, visible: true },
            SimSignal::GroundControlToggled { rider, enabled: true },
            SimSignal::CameraTargetChanged { camera, target: rider },
        ]
    );

    // Mount впереди rider'а, с его ротацией
    let expected = rider_before.translation + rider_before.forward() * InteractionConfig::default().dismount_forward_offset;
    assert!(
        (report.mount.translation - expected).length() < 1e-3,
        "mount = {:?}, expected {:?}",
        report.mount.translation,
        expected
    );
    assert!(report.mount.rotation.angle_between(rider_before.rotation) < 1e-3);

    {
        let world = simulation.world();
        assert_eq!(world.get::<Attachment>(mount).map(|a| a.owner), Some(perch));
        assert_eq!(world.get::<InputRouting>(rider), Some(&InputRouting::Ground));
        assert_eq!(world.get::<RiderVisuals>(visuals).map(|v| v.visible), Some(true));
        assert!(world.get::<GroundController>(rider).is_some_and(|g| g.is_enabled()));
        assert!(world.get::<Mountable>(mount).is_some_and(|m| !m.is_mounted()));
    }

    // Mount остаётся на месте спешивания (home attachment сохраняет world pose)
    let placed = report.mount;
    let report = simulation.tick(DT, idle());
    assert!((report.mount.translation - placed.translation).length() < 1e-3);
    assert_eq!(report.flight_phase, FlightPhase::Grounded);
}

#[test]
fn test_duplicate_transition_requests_are_noops() {
    let mut simulation = init(SceneSetup::default());
    let rider = simulation.rider();
    let mount = simulation.mount();

    let report = mount_up(&mut simulation);
    assert_eq!(count(&report.signals, |s| matches!(s, SimSignal::FlightActivated { .. })), 1);

    // Activate-while-active
    simulation
        .world_mut()
        .send_event(ActivateFlightRequest { mount, carrier: rider });
    let report = simulation.tick(DT, idle());
    assert_eq!(report.flight_phase, FlightPhase::Flying);
    assert!(report.signals.is_empty(), "signals = {:?}", report.signals);

    // Два deactivate в одном frame → один сигнал
    for _ in 0..2 {
        simulation.world_mut().send_event(DeactivateFlightRequest {
            mount,
            reason: DeactivationReason::Dismount,
        });
    }
    let report = simulation.tick(DT, idle());
    assert_eq!(report.flight_phase, FlightPhase::Grounded);
    assert_eq!(
        count(&report.signals, |s| matches!(s, SimSignal::FlightDeactivated { .. })),
        1
    );

    // Deactivate на земле — no-op
    simulation.world_mut().send_event(DeactivateFlightRequest {
        mount,
        reason: DeactivationReason::Dismount,
    });
    let report = simulation.tick(DT, idle());
    assert_eq!(
        count(&report.signals, |s| matches!(s, SimSignal::FlightDeactivated { .. })),
        0
    );
}

#[test]
fn test_toggle_flight_on_ground_does_nothing() {
    let mut simulation = init(SceneSetup::default());
    simulation.tick(DT, idle());

    let report = simulation.tick(DT, toggle_flight());
    assert_eq!(report.flight_phase, FlightPhase::Grounded);
    assert!(report.signals.is_empty(), "signals = {:?}", report.signals);
}

#[test]
fn test_lost_carrier_forces_safe_deactivation() {
    let mut simulation = init(SceneSetup::default());
    let rider = simulation.rider();
    let mount = simulation.mount();
    let camera = simulation.camera();

    mount_up(&mut simulation);
    let mut last = simulation.tick(DT, throttle());
    for _ in 0..30 {
        last = simulation.tick(DT, throttle());
    }

    simulation.world_mut().despawn(rider);
    let report = simulation.tick(DT, throttle());

    assert_eq!(report.flight_phase, FlightPhase::Grounded);
    assert_eq!(
        report.signals,
        vec![SimSignal::FlightDeactivated {
            mount,
            carrier: rider,
            reason: DeactivationReason::LostCarrier,
        }]
    );

    // Mount остаётся там, где его застала деактивация, и больше ни к кому не прикреплён
    assert!((report.mount.translation - last.mount.translation).length() < 1e-3);
    let world = simulation.world();
    assert!(world.get::<Attachment>(mount).is_none());
    assert!(world.get::<Mountable>(mount).is_some_and(|m| !m.is_mounted()));
    assert!(world.get::<ChaseCamera>(camera).is_some_and(|c| !c.is_enabled()));

    // Дальше симуляция просто продолжает работать
    let report = simulation.tick(DT, idle());
    assert!(report.signals.is_empty());
}

#[test]
fn test_teardown_mid_flight_restores_ground_state() {
    let mut simulation = init(SceneSetup::default());
    let rider = simulation.rider();
    let mount = simulation.mount();

    mount_up(&mut simulation);
    for _ in 0..10 {
        simulation.tick(DT, throttle());
    }

    let report = simulation.teardown();
    assert_eq!(report.flight_phase, FlightPhase::Grounded);
    assert!(report.signals.contains(&SimSignal::FlightDeactivated {
        mount,
        carrier: rider,
        reason: DeactivationReason::Teardown,
    }));
    assert!(report
        .signals
        .contains(&SimSignal::GroundControlToggled { rider, enabled: true }));
}

#[test]
fn test_teardown_on_ground_is_quiet() {
    let mut simulation = init(SceneSetup {
        rider_position: Vec3::new(0.0, 0.0, 50.0),
        ..default()
    });
    simulation.tick(DT, idle());

    let report = simulation.teardown();
    assert_eq!(report.flight_phase, FlightPhase::Grounded);
    assert!(report.signals.is_empty(), "signals = {:?}", report.signals);
}

#[test]
fn test_camera_distance_follows_flight_speed() {
    let mut simulation = init(SceneSetup::default());
    let camera = simulation.camera();
    let config = ChaseCameraConfig::default();

    let report = simulation.tick(DT, idle());
    assert!((report.camera_distance - config.distance).abs() < 1e-3);

    mount_up(&mut simulation);
    let mut report = simulation.tick(DT, throttle());
    for _ in 0..600 {
        report = simulation.tick(DT, throttle());
    }

    // На крейсерской скорости base distance = max_speed_distance, но clamp по max_obstruction
    assert!(
        (report.camera_distance - config.max_obstruction_distance).abs() < 1e-2,
        "distance = {}",
        report.camera_distance
    );
    assert_eq!(
        simulation.world().get::<ChaseCamera>(camera).map(|c| c.mode()),
        Some(CameraMode::Flight)
    );

    // Спешились — камера обратно в ground режим
    simulation.tick(DT, toggle_flight());
    simulation.tick(DT, idle());
    assert_eq!(
        simulation.world().get::<ChaseCamera>(camera).map(|c| c.mode()),
        Some(CameraMode::Ground)
    );
}

#[test]
fn test_camera_pulls_in_behind_obstruction() {
    let config = ChaseCameraConfig::default();
    let mut environment = SceneSetup::default().environment;
    // Стена между rider'ом (z = 30) и камерой (z = 35)
    environment.push(EnvironmentBlock::new(
        Vec3::new(0.0, 2.0, 33.0),
        Vec3::new(5.0, 3.0, 0.25),
    ));
    let mut simulation = init(SceneSetup {
        rider_position: Vec3::new(0.0, 0.0, 30.0),
        mount_position: Vec3::ZERO,
        environment,
        ..default()
    });

    let mut report = simulation.tick(DT, idle());
    for _ in 0..10 {
        report = simulation.tick(DT, idle());
    }

    assert!(report.camera_distance < config.distance - 0.5, "distance = {}", report.camera_distance);
    assert!(report.camera_distance >= config.min_obstruction_distance);
}

#[test]
fn test_invalid_setup_is_rejected() {
    let result = RiderSimulation::init(SceneSetup {
        mount_collider_radius: 0.0,
        ..default()
    });
    assert!(matches!(result, Err(SetupError::MountWithoutCollider(_))));

    let mut flight = FlightTuning::default();
    flight.speed.forward_speed = -1.0;
    let result = RiderSimulation::init(SceneSetup { flight, ..default() });
    assert!(matches!(
        result,
        Err(SetupError::FlightTuning(ConfigError::NonPositive(_)))
    ));
}

#[test]
fn test_long_frame_is_integrated_in_full() {
    let mut flight = FlightTuning::default();
    flight.speed.forward_speed = 100.0;
    flight.speed.acceleration = 1.0;
    let mut simulation = init(SceneSetup { flight, ..default() });

    mount_up(&mut simulation);
    let report = simulation.tick(20.0, throttle());

    // min(0 + 1 * 20, 100): кадр не обрезан до max_delta часов
    assert!((report.speed - 20.0).abs() < 1e-3, "speed = {}", report.speed);
}

#[test]
fn test_out_of_range_dt_runs_empty_frame() {
    let mut simulation = init(SceneSetup::default());
    mount_up(&mut simulation);
    let before = simulation.tick(DT, throttle());

    // Больше, чем помещается в Duration / в часы Instant
    for dt in [1.0e20, 1.0e19, f32::INFINITY, f32::NAN, -1.0] {
        let report = simulation.tick(dt, throttle());
        assert_eq!(report.flight_phase, FlightPhase::Flying);
        assert_eq!(report.speed, before.speed, "dt = {}", dt);
        assert_eq!(report.rider.translation, before.rider.translation, "dt = {}", dt);
    }

    // Обычный кадр после этого работает как раньше
    let report = simulation.tick(DT, throttle());
    assert!(report.speed > before.speed);
}

#[test]
fn test_low_curb_on_target_line_pulls_camera_in() {
    let config = ChaseCameraConfig::default();
    let mut environment = SceneSetup::default().environment;
    // Бордюр 0.8 м прямо за rider'ом (z = 30): на линии root → камера,
    // но ниже линии от точки фокуса (target + половина высоты)
    environment.push(EnvironmentBlock::new(
        Vec3::new(0.0, 0.4, 30.7),
        Vec3::new(5.0, 0.4, 0.2),
    ));
    let mut simulation = init(SceneSetup {
        rider_position: Vec3::new(0.0, 0.0, 30.0),
        mount_position: Vec3::ZERO,
        environment,
        ..default()
    });

    let mut report = simulation.tick(DT, idle());
    for _ in 0..10 {
        report = simulation.tick(DT, idle());
    }

    assert!(report.camera_distance < config.distance - 0.5, "distance = {}", report.camera_distance);
    assert!(report.camera_distance >= config.min_obstruction_distance);
}

#[test]
fn test_floor_under_rider_is_not_an_obstruction() {
    let config = ChaseCameraConfig::default();
    let mut simulation = init(SceneSetup {
        rider_position: Vec3::new(0.0, 0.0, 30.0),
        mount_position: Vec3::ZERO,
        ..default()
    });

    let mut report = simulation.tick(DT, idle());
    for _ in 0..30 {
        report = simulation.tick(DT, idle());
    }
    assert!((report.camera_distance - config.distance).abs() < 1e-3, "distance = {}", report.camera_distance);
}

#[test]
fn test_rejected_mount_request_leaves_no_partial_state() {
    let mut simulation = init(SceneSetup::default());
    let first = simulation.rider();
    let mount = simulation.mount();

    // Второй rider с другой стороны mount'а, смотрит на него (+Z)
    let second = simulation
        .world_mut()
        .spawn((
            Transform::from_xyz(0.0, 0.0, -5.0).with_rotation(Quat::from_rotation_y(-std::f32::consts::PI)),
            GroundController::default(),
            PlayerInput::default(),
            InputRouting::Ground,
            MountInteractor::new(InteractionConfig::default(), mount),
        ))
        .id();

    let report = simulation.tick(DT, idle());
    assert!(report.prompt_visible);
    assert!(simulation
        .world()
        .get::<MountInteractor>(second)
        .is_some_and(|interactor| interactor.ui_active()));

    // Оба жмут Interact в одном frame
    if let Some(mut input) = simulation.world_mut().get_mut::<PlayerInput>(second) {
        input.interact = true;
    }
    let report = simulation.tick(DT, interact());

    assert_eq!(report.flight_phase, FlightPhase::Flying);
    assert_eq!(
        count(&report.signals, |s| matches!(s, SimSignal::FlightActivated { .. })),
        1,
        "signals = {:?}",
        report.signals
    );
    assert_eq!(
        count(&report.signals, |s| matches!(s, SimSignal::GroundControlToggled { .. })),
        1
    );

    let world = simulation.world();
    let carrier = world
        .get::<FlightState>(mount)
        .and_then(|state| state.carrier())
        .expect("mount has a carrier");
    let loser = if carrier == first { second } else { first };

    assert_eq!(world.get::<Attachment>(mount).map(|a| a.owner), Some(carrier));
    assert_eq!(
        world.get::<MountInteractor>(carrier).and_then(|i| i.current_mount()),
        Some(mount)
    );

    // Проигравший rider остался на земле целиком
    assert_eq!(world.get::<MountInteractor>(loser).and_then(|i| i.current_mount()), None);
    assert!(world.get::<GroundController>(loser).is_some_and(|g| g.is_enabled()));
    assert_eq!(world.get::<InputRouting>(loser), Some(&InputRouting::Ground));
}
