//! Chase camera (third-person)
//!
//! Late phase: работает в PostUpdate, читает transforms после locomotion этого frame.
//!
//! - Ground: look input крутит камеру, её yaw задаёт направление ground движения
//! - Flight: ограниченные offsets от heading carrier'а, дистанция растёт со скоростью
//! - Obstruction: linecast target → камера по environment слою

use bevy::prelude::*;

pub mod components;
pub mod config;
pub mod events;
pub mod rig;
pub mod systems;

pub use components::ChaseCamera;
pub use config::ChaseCameraConfig;
pub use events::SetCameraTarget;
pub use rig::{CameraMode, LookAngles};
pub use systems::{follow_target, handle_camera_signals};

/// Camera Plugin
///
/// PostUpdate / CameraSet::Follow: handle_camera_signals → follow_target
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ChaseCamera>()
            .add_event::<SetCameraTarget>()
            .add_systems(
                PostUpdate,
                (handle_camera_signals, follow_target)
                    .chain()
                    .in_set(crate::CameraSet::Follow),
            );
    }
}
