//! Interaction components

use bevy::prelude::*;

use super::config::InteractionConfig;
use crate::attachment::Attachment;

/// Interaction controller на rider entity
///
/// Ссылки на mount / visuals / camera не владеющие: entity ids, заданные при сборке сцены.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MountInteractor {
    pub config: InteractionConfig,
    /// Mountable, которым управляет этот rider
    mount: Entity,
    visuals: Option<Entity>,
    camera: Option<Entity>,
    /// UI prompt показан (mount в proximity радиусе)
    ui_active: bool,
    /// Mount, на котором rider сейчас летит
    current_mount: Option<Entity>,
    enabled: bool,
}

impl MountInteractor {
    pub fn new(config: InteractionConfig, mount: Entity) -> Self {
        Self {
            config,
            mount,
            visuals: None,
            camera: None,
            ui_active: false,
            current_mount: None,
            enabled: true,
        }
    }

    pub fn with_visuals(mut self, visuals: Entity) -> Self {
        self.visuals = Some(visuals);
        self
    }

    pub fn with_camera(mut self, camera: Entity) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn mount(&self) -> Entity {
        self.mount
    }

    pub fn visuals(&self) -> Option<Entity> {
        self.visuals
    }

    pub fn camera(&self) -> Option<Entity> {
        self.camera
    }

    pub fn ui_active(&self) -> bool {
        self.ui_active
    }

    pub fn current_mount(&self) -> Option<Entity> {
        self.current_mount
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Host выключает/включает interactor. Выключение в полёте форсирует деактивацию.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_ui_active(&mut self, active: bool) {
        self.ui_active = active;
    }

    pub(crate) fn set_current_mount(&mut self, mount: Option<Entity>) {
        self.current_mount = mount;
    }
}

/// Mount, на которого можно сесть
///
/// `home` — attachment до посадки (`None` = mount в корне сцены).
/// Пока rider летит, mount прикреплён к нему; dismount возвращает `home`.
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Mountable {
    home: Option<Attachment>,
    mounted: bool,
}

impl Mountable {
    pub fn home(&self) -> Option<&Attachment> {
        self.home.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Запомнить attachment до посадки
    pub(crate) fn store_home(&mut self, home: Option<Attachment>) {
        self.home = home;
        self.mounted = true;
    }

    /// Забрать attachment до посадки (после этого mount снова "свободен")
    pub(crate) fn take_home(&mut self) -> Option<Attachment> {
        self.mounted = false;
        self.home.take()
    }
}

/// Видимая модель rider'а (прячется на время полёта)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct RiderVisuals {
    pub visible: bool,
}

impl Default for RiderVisuals {
    fn default() -> Self {
        Self { visible: true }
    }
}
