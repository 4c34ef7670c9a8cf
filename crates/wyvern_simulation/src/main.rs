//! Headless симуляция WYVERN
//!
//! Скриптованный прогон без рендера: подойти к дракону, сесть, полетать, спешиться.

use bevy::prelude::*;
use wyvern_simulation::{log_error, FrameInput, RiderSimulation, SceneSetup};

const DT: f32 = 1.0 / 60.0;

/// Input для tick'а по простому сценарию
fn scripted_input(tick: usize) -> FrameInput {
    match tick {
        // Сесть (дракон прямо перед rider'ом)
        10 => FrameInput {
            interact: true,
            ..default()
        },
        // Разгон + набор высоты с поворотом вправо
        11..=300 => FrameInput {
            move_axis: Vec2::new(if tick > 200 { 0.5 } else { 0.0 }, 1.0),
            vertical_axis: if tick < 150 { 1.0 } else { 0.0 },
            ..default()
        },
        // Отпускаем throttle
        301..=499 => FrameInput::default(),
        500 => FrameInput {
            toggle_flight: true,
            ..default()
        },
        _ => FrameInput::default(),
    }
}

fn main() {
    println!("Starting WYVERN headless simulation (dt: {:.4})", DT);

    let mut simulation = match RiderSimulation::init(SceneSetup::default()) {
        Ok(simulation) => simulation,
        Err(err) => {
            log_error(&format!("Scene setup failed: {}", err));
            return;
        }
    };

    for tick in 0..600 {
        let report = simulation.tick(DT, scripted_input(tick));

        for signal in report.signals.iter() {
            println!("Tick {}: {:?}", tick, signal);
        }

        if tick % 100 == 0 {
            println!(
                "Tick {}: {:?} speed {:.2} vertical {:.2} rider {:?} camera distance {:.2}",
                tick,
                report.flight_phase,
                report.speed,
                report.vertical_speed,
                report.rider.translation,
                report.camera_distance
            );
        }
    }

    let report = simulation.teardown();
    println!("Simulation complete! Final phase: {:?}", report.flight_phase);
}
