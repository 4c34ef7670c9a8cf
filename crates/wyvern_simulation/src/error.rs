//! Ошибки конструирования симуляции
//!
//! Runtime-ошибки (пропавший entity) не поднимаются наверх: компонент
//! отключает себя и пишет в лог. Здесь только то, что ломает `init`.

use thiserror::Error;

/// Невалидный tunable
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("{0}: {1}")]
    Invalid(&'static str, &'static str),
}

/// Ошибка сборки сцены для `RiderSimulation::init`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    #[error("invalid flight tuning: {0}")]
    FlightTuning(ConfigError),
    #[error("invalid ground config: {0}")]
    Ground(ConfigError),
    #[error("invalid interaction config: {0}")]
    Interaction(ConfigError),
    #[error("invalid camera config: {0}")]
    Camera(ConfigError),
    #[error("mount collider radius must be positive (got {0})")]
    MountWithoutCollider(f32),
}
