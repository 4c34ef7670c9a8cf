//! Property-based тесты детерминизма
//!
//! Одинаковый input script + одинаковые dt → идентичные миры

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wyvern_simulation::{world_snapshot, FlightState, FrameInput, RiderSimulation, SceneSetup};

/// Случайный, но воспроизводимый input script (посадка на 5-м tick'е)
fn input_script(seed: u64, ticks: usize) -> Vec<(f32, FrameInput)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..ticks)
        .map(|tick| {
            let dt = rng.gen_range(1.0 / 120.0..1.0 / 30.0);
            let input = FrameInput {
                move_axis: Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)),
                vertical_axis: rng.gen_range(-1.0..=1.0),
                look_axis: Vec2::new(rng.gen_range(-5.0..=5.0), rng.gen_range(-2.0..=2.0)),
                sprint: rng.gen_bool(0.3),
                jump: rng.gen_bool(0.02),
                crouch: rng.gen_bool(0.01),
                interact: tick == 5,
                toggle_flight: tick > 5 && rng.gen_bool(0.005),
            };
            (dt, input)
        })
        .collect()
}

/// Запускает симуляцию и возвращает snapshot мира
fn run_simulation(seed: u64, ticks: usize) -> (Vec<u8>, Vec<u8>) {
    let mut simulation = match RiderSimulation::init(SceneSetup::default()) {
        Ok(simulation) => simulation,
        Err(err) => panic!("setup failed: {}", err),
    };

    for (dt, input) in input_script(seed, ticks) {
        simulation.tick(dt, input);
    }

    let world = simulation.world_mut();
    (world_snapshot::<Transform>(world), world_snapshot::<FlightState>(world))
}

#[test]
fn test_determinism_same_script() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 600;

    let first = run_simulation(SEED, TICK_COUNT);
    let second = run_simulation(SEED, TICK_COUNT);

    assert_eq!(
        first, second,
        "Симуляция с одинаковым script (seed {}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 300;

    // Запускаем 5 раз — все должны быть идентичны
    let snapshots: Vec<_> = (0..5).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_mounted_flight_stays_finite() {
    let mut simulation = match RiderSimulation::init(SceneSetup::default()) {
        Ok(simulation) => simulation,
        Err(err) => panic!("setup failed: {}", err),
    };

    for (dt, input) in input_script(7, 900) {
        let report = simulation.tick(dt, input);
        assert!(report.rider.translation.is_finite(), "rider ушёл в NaN");
        assert!(report.camera.translation.is_finite(), "камера ушла в NaN");
        assert!(report.speed.is_finite() && report.vertical_speed.is_finite());
    }
}
