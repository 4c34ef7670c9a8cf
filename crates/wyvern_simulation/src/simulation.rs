//! RiderSimulation: явный simulation object для host game loop
//!
//! `init` собирает сцену (все ссылки передаются при создании, никакого scene lookup),
//! `tick` = один frame, `teardown` форсирует безопасное завершение полёта.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::Collider;

use crate::attachment::{Attachment, VisualPose};
use crate::camera::{ChaseCamera, ChaseCameraConfig};
use crate::error::SetupError;
use crate::flight::{FlightPhase, FlightState, FlightTuning};
use crate::ground::{GroundConfig, GroundController};
use crate::input::{InputRouting, PlayerInput};
use crate::interaction::{InteractionConfig, MountInteractor, Mountable, RiderVisuals};
use crate::logger;
use crate::physics::layers;
use crate::signals::{SignalLog, SimSignal};
use crate::{create_headless_app, SimulationPlugin};

/// Input одного frame (то, что host собрал со своих устройств)
pub type FrameInput = PlayerInput;

/// Статичный environment коллайдер (box)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentBlock {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl EnvironmentBlock {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents }
    }

    /// Пол: верхняя грань на `height`
    pub fn floor(height: f32, half_size: f32) -> Self {
        Self::new(
            Vec3::new(0.0, height - 0.5, 0.0),
            Vec3::new(half_size, 0.5, half_size),
        )
    }
}

/// Описание сцены для `RiderSimulation::init`
#[derive(Debug, Clone)]
pub struct SceneSetup {
    pub rider_position: Vec3,
    /// Градусы, > 0 вправо
    pub rider_yaw: f32,
    pub mount_position: Vec3,
    pub mount_yaw: f32,
    pub mount_collider_radius: f32,
    /// Опора mount'а (его "parent" до посадки). `None` — mount в корне сцены.
    pub mount_perch: Option<Vec3>,
    pub environment: Vec<EnvironmentBlock>,
    pub flight: FlightTuning,
    pub ground: GroundConfig,
    pub interaction: InteractionConfig,
    pub camera: ChaseCameraConfig,
}

impl Default for SceneSetup {
    fn default() -> Self {
        Self {
            rider_position: Vec3::ZERO,
            rider_yaw: 0.0,
            mount_position: Vec3::new(0.0, 0.0, -2.5),
            mount_yaw: 0.0,
            mount_collider_radius: 1.0,
            mount_perch: None,
            environment: vec![EnvironmentBlock::floor(0.0, 200.0)],
            flight: FlightTuning::default(),
            ground: GroundConfig::default(),
            interaction: InteractionConfig::default(),
            camera: ChaseCameraConfig::default(),
        }
    }
}

impl SceneSetup {
    pub fn validate(&self) -> Result<(), SetupError> {
        self.flight.validate().map_err(SetupError::FlightTuning)?;
        self.ground.validate().map_err(SetupError::Ground)?;
        self.interaction.validate().map_err(SetupError::Interaction)?;
        self.camera.validate().map_err(SetupError::Camera)?;
        if !(self.mount_collider_radius > 0.0) {
            return Err(SetupError::MountWithoutCollider(self.mount_collider_radius));
        }
        Ok(())
    }
}

/// Что произошло за frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Сигналы frame'а, каждый ровно один раз. Сгруппированы по виду
    /// (порядок `SimSignal`), внутри вида в порядке записи.
    pub signals: Vec<SimSignal>,
    pub rider: Transform,
    pub mount: Transform,
    pub camera: Transform,
    pub flight_phase: FlightPhase,
    pub speed: f32,
    pub vertical_speed: f32,
    /// Local наклон модели mount'а
    pub mount_visual: Quat,
    pub prompt_visible: bool,
    pub camera_distance: f32,
}

fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_rotation_y(-yaw.to_radians())
}

/// Rider + mount + chase camera поверх headless Bevy App
pub struct RiderSimulation {
    app: App,
    rider: Entity,
    mount: Entity,
    camera: Entity,
    visuals: Entity,
    perch: Option<Entity>,
}

impl RiderSimulation {
    pub fn init(setup: SceneSetup) -> Result<Self, SetupError> {
        setup.validate()?;

        let mut app = create_headless_app();
        app.add_plugins(SimulationPlugin);

        let world = app.world_mut();

        for block in setup.environment.iter() {
            world.spawn((
                Transform::from_translation(block.center),
                Collider::cuboid(block.half_extents.x, block.half_extents.y, block.half_extents.z),
                layers::environment_groups(),
            ));
        }

        let rider_transform = Transform::from_translation(setup.rider_position).with_rotation(yaw_rotation(setup.rider_yaw));
        let capsule_half = (setup.ground.standing_height * 0.5 - setup.ground.body_radius).max(0.0);
        let rider = world
            .spawn((
                rider_transform,
                GroundController::new(setup.ground),
                PlayerInput::default(),
                InputRouting::Ground,
                Collider::capsule_y(capsule_half, setup.ground.body_radius),
                layers::rider_groups(),
            ))
            .id();

        let visuals = world
            .spawn((
                rider_transform,
                RiderVisuals::default(),
                Attachment::new(rider, Vec3::ZERO, Quat::IDENTITY),
            ))
            .id();

        let mount_transform =
            Transform::from_translation(setup.mount_position).with_rotation(yaw_rotation(setup.mount_yaw));
        let mount = world
            .spawn((
                mount_transform,
                FlightState::default(),
                setup.flight,
                VisualPose::default(),
                Mountable::default(),
                Collider::ball(setup.mount_collider_radius),
                layers::mount_groups(),
            ))
            .id();

        let perch = setup.mount_perch.map(|position| {
            let perch_transform = Transform::from_translation(position);
            let perch = world.spawn(perch_transform).id();
            world
                .entity_mut(mount)
                .insert(Attachment::preserving_world(perch, &perch_transform, &mount_transform));
            perch
        });

        let chase = ChaseCamera::new(setup.camera, rider, Some(mount)).facing(setup.rider_yaw);
        let camera_transform = chase.snapped_transform(&rider_transform);
        let camera = world.spawn((camera_transform, chase)).id();

        world.entity_mut(rider).insert(
            MountInteractor::new(setup.interaction, mount)
                .with_visuals(visuals)
                .with_camera(camera),
        );

        logger::log_info(&format!(
            "🌍 Scene ready: rider {:?}, mount {:?}, camera {:?}, {} environment blocks",
            rider,
            mount,
            camera,
            setup.environment.len()
        ));

        let mut simulation = Self {
            app,
            rider,
            mount,
            camera,
            visuals,
            perch,
        };
        // Первый update только инициализирует часы (delta = 0)
        simulation.step(0.0);
        Ok(simulation)
    }

    pub fn rider(&self) -> Entity {
        self.rider
    }

    pub fn mount(&self) -> Entity {
        self.mount
    }

    pub fn camera(&self) -> Entity {
        self.camera
    }

    pub fn visuals(&self) -> Entity {
        self.visuals
    }

    pub fn perch(&self) -> Option<Entity> {
        self.perch
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// Один frame: input → Update (locomotion) → PostUpdate (камера)
    pub fn tick(&mut self, dt: f32, input: FrameInput) -> FrameReport {
        if let Some(mut player_input) = self.app.world_mut().get_mut::<PlayerInput>(self.rider) {
            *player_input = input;
        }
        self.step(dt);
        self.report()
    }

    /// Завершение: interactor выключается, полёт (если есть) принудительно заканчивается
    pub fn teardown(mut self) -> FrameReport {
        if let Some(mut interactor) = self.app.world_mut().get_mut::<MountInteractor>(self.rider) {
            interactor.set_enabled(false);
        }
        if let Some(mut player_input) = self.app.world_mut().get_mut::<PlayerInput>(self.rider) {
            *player_input = PlayerInput::default();
        }
        self.step(0.0);
        logger::log_info("Simulation teardown complete");
        self.report()
    }

    fn step(&mut self, dt: f32) {
        let duration = self.frame_duration(dt);

        // Time<Virtual> не должен обрезать кадр: integrator принимает любой dt
        if duration > Duration::ZERO {
            if let Some(mut virtual_time) = self.app.world_mut().get_resource_mut::<Time<Virtual>>() {
                if virtual_time.max_delta() < duration {
                    virtual_time.set_max_delta(duration);
                }
            }
        }

        self.app.insert_resource(TimeUpdateStrategy::ManualDuration(duration));
        self.app.update();
    }

    /// dt → Duration кадра. NaN, dt <= 0 и dt вне диапазона часов → пустой кадр.
    fn frame_duration(&self, dt: f32) -> Duration {
        if !dt.is_finite() || dt <= 0.0 {
            return Duration::ZERO;
        }

        let fits_clock = |duration: Duration| {
            self.app.world().get_resource::<Time<Real>>().is_none_or(|real| {
                let last = real.last_update().unwrap_or(real.startup());
                last.checked_add(duration).is_some() && real.elapsed().checked_add(duration).is_some()
            })
        };

        match Duration::try_from_secs_f32(dt) {
            Ok(duration) if fits_clock(duration) => duration,
            _ => {
                logger::log_warning(&format!("tick: dt {} is out of range, frame runs with dt = 0", dt));
                Duration::ZERO
            }
        }
    }

    fn report(&mut self) -> FrameReport {
        let world = self.app.world_mut();
        let signals = world
            .get_resource_mut::<SignalLog>()
            .map(|mut log| log.drain())
            .unwrap_or_default();

        let transform_of = |entity: Entity| world.get::<Transform>(entity).copied().unwrap_or_default();
        let rider = transform_of(self.rider);
        let mount = transform_of(self.mount);
        let camera = transform_of(self.camera);

        let flight = world.get::<FlightState>(self.mount);
        let (flight_phase, speed, vertical_speed, mount_visual) = match flight {
            Some(state) => (
                state.phase(),
                state.current_speed(),
                state.vertical_speed(),
                state.motion().visual_orientation,
            ),
            None => (FlightPhase::Grounded, 0.0, 0.0, Quat::IDENTITY),
        };

        FrameReport {
            signals,
            rider,
            mount,
            camera,
            flight_phase,
            speed,
            vertical_speed,
            mount_visual,
            prompt_visible: world
                .get::<MountInteractor>(self.rider)
                .is_some_and(|interactor| interactor.ui_active()),
            camera_distance: world
                .get::<ChaseCamera>(self.camera)
                .map_or(0.0, |camera| camera.effective_distance()),
        }
    }
}
