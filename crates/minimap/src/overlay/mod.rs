mod clock;
mod layout;
mod session;
mod texture;

use tracing::info;

use crate::config::MinimapConfig;
use crate::geometry::DisplayMode;
use crate::host::OverlaySurface;
use crate::input::{EdgeDetector, InputAction, InputSnapshot};
use crate::locator::SceneGraph;
use crate::projection::MapProjection;

pub use clock::format_clock_text;
pub use layout::{ModeGeometry, OverlayLayout};
pub use session::Session;
pub use texture::circle_texture;

/// Top-level driver, called once per host frame. Holds at most one live
/// [`Session`]; every call is safe before a session exists.
#[derive(Debug)]
pub struct OverlayController {
    config: MinimapConfig,
    projection: MapProjection,
    session: Option<Session>,
    minimap_visible: bool,
    clock_visible: bool,
    edges: EdgeDetector,
}

impl OverlayController {
    pub fn new(config: MinimapConfig) -> Self {
        let projection = MapProjection::new(config.calibration);
        Self {
            config,
            projection,
            session: None,
            minimap_visible: true,
            clock_visible: true,
            edges: EdgeDetector::default(),
        }
    }

    pub fn config(&self) -> &MinimapConfig {
        &self.config
    }

    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Toggle state reported back to the host.
    pub fn overlay_visible(&self) -> bool {
        self.minimap_visible
    }

    pub fn clock_visible(&self) -> bool {
        self.clock_visible
    }

    pub fn display_mode(&self) -> Option<DisplayMode> {
        self.session.as_ref().map(Session::mode)
    }

    /// Starts a fresh session when the configured scene loads; any other
    /// scene ends the current one.
    pub fn on_scene_loaded<S: OverlaySurface + ?Sized>(&mut self, scene_name: &str, surface: &mut S) {
        self.end_session(surface);
        if scene_name != self.config.session_scene {
            return;
        }
        info!(scene = scene_name, "overlay_session_started");
        self.session = Some(Session::start(
            &self.config,
            surface,
            self.minimap_visible,
            self.clock_visible,
        ));
    }

    pub fn on_scene_unloaded<S: OverlaySurface + ?Sized>(&mut self, surface: &mut S) {
        self.end_session(surface);
    }

    pub fn tick<G, S>(&mut self, dt_seconds: f32, input: &InputSnapshot, graph: &G, surface: &mut S)
    where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        for action in self.edges.pressed(input) {
            match action {
                InputAction::ToggleOverlay => self.set_overlay_visible(!self.minimap_visible, surface),
                InputAction::ToggleClock => self.set_clock_visible(!self.clock_visible, surface),
                InputAction::ToggleDoubleSize => {
                    if let Some(mode) = self.display_mode() {
                        self.set_display_mode(mode.toggled(), graph, surface);
                    }
                }
            }
        }

        if let Some(session) = self.session.as_mut() {
            session.tick(
                dt_seconds,
                graph,
                surface,
                &self.projection,
                &self.config,
                self.minimap_visible,
            );
        }
    }

    pub fn set_overlay_visible<S: OverlaySurface + ?Sized>(&mut self, visible: bool, surface: &mut S) {
        self.minimap_visible = visible;
        if let Some(session) = self.session.as_ref() {
            session.set_minimap_visible(surface, visible);
        }
        info!(visible, "overlay_toggled");
    }

    pub fn set_clock_visible<S: OverlaySurface + ?Sized>(&mut self, visible: bool, surface: &mut S) {
        self.clock_visible = visible;
        if let Some(session) = self.session.as_ref() {
            session.set_clock_visible(surface, visible);
        }
    }

    pub fn set_display_mode<G, S>(&mut self, mode: DisplayMode, graph: &G, surface: &mut S)
    where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        if let Some(session) = self.session.as_mut() {
            session.set_display_mode(mode, graph, surface, &self.projection, self.minimap_visible);
        }
    }

    fn end_session<S: OverlaySurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(session) = self.session.take() {
            session.teardown(surface);
            info!("overlay_session_ended");
        }
    }
}
