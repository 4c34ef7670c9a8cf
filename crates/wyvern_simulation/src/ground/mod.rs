//! Ground locomotion (on-foot)
//!
//! Walk / run / crouch / jump, camera-relative направление.
//! Interaction выключает controller на время полёта.

use bevy::prelude::*;

pub mod config;
pub mod controller;
pub mod systems;


pub use config::GroundConfig;
pub use controller::{rotate_towards, GroundController, GroundInput, GroundMotion};
pub use systems::ground_locomotion;

/// Ground Plugin
pub struct GroundPlugin;

impl Plugin for GroundPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<GroundController>()
            .add_systems(Update, ground_locomotion.in_set(crate::SimSet::Locomotion));
    }
}
