use tracing::{debug, info, warn};

use crate::config::{Landmark, LandmarkStyle, MinimapConfig};
use crate::geometry::{DisplayMode, Vec2};
use crate::host::{
    Anchor, ImageRef, LocateError, OverlaySurface, PrimitiveDesc, PrimitiveId, PrimitiveKind,
    SceneHandle, SceneNode,
};
use crate::locator::{
    first_child_image, SceneGraph, PLAYER_ICON_PATH, POI_CONTAINER_PATH, PROPERTY_ICON_PATH,
};
use crate::markers::{MarkerKind, MarkerReconciler, OverlayMarker};
use crate::projection::{direction_indicator_offset, smooth_toward, MapProjection};
use crate::scan::{ResolutionScanner, ScanReport};

use super::clock::ClockMirror;
use super::layout::{ModeGeometry, OverlayLayout};

const LANDMARK_ICON_SCALE: f32 = 0.5;
const LANDMARK_SQUARE_SIZE: f32 = 5.0;
const PROPERTY_FALLBACK_COLOR: [u8; 4] = [255, 255, 255, 255];
const WAYPOINT_COLOR: [u8; 4] = [255, 0, 0, 255];

/// Everything that lives for one overlay session, from scene enter to scene
/// exit. Nothing here outlives the scene that created it.
#[derive(Debug)]
pub struct Session {
    scanner: ResolutionScanner,
    reconciler: MarkerReconciler,
    clock: ClockMirror,
    layout: OverlayLayout,
    mode: DisplayMode,
    landmarks: Vec<OverlayMarker>,
    map_image: Option<ImageRef>,
}

impl Session {
    pub(crate) fn start<S: OverlaySurface + ?Sized>(
        config: &MinimapConfig,
        surface: &mut S,
        minimap_visible: bool,
        clock_visible: bool,
    ) -> Self {
        let mode = DisplayMode::default();
        let layout = OverlayLayout::build(surface, mode);
        layout.set_minimap_visible(surface, mode, minimap_visible);
        layout.set_clock_visible(surface, clock_visible);
        let mut scanner = ResolutionScanner::new(&config.timings);
        scanner.start();
        Self {
            scanner,
            reconciler: MarkerReconciler::new(config),
            clock: ClockMirror::new(config.timings.clock_interval_seconds),
            layout,
            mode,
            landmarks: Vec::new(),
            map_image: None,
        }
    }

    pub fn scanner(&self) -> &ResolutionScanner {
        &self.scanner
    }

    pub fn reconciler(&self) -> &MarkerReconciler {
        &self.reconciler
    }

    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn landmarks(&self) -> &[OverlayMarker] {
        &self.landmarks
    }

    pub fn map_image(&self) -> Option<ImageRef> {
        self.map_image
    }

    pub(crate) fn tick<G, S>(
        &mut self,
        dt_seconds: f32,
        graph: &G,
        surface: &mut S,
        projection: &MapProjection,
        config: &MinimapConfig,
        tracking_enabled: bool,
    ) where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        if let Some(report) = self.scanner.tick(dt_seconds, graph) {
            self.on_scan_complete(&report, graph, surface, projection, config);
        }

        if tracking_enabled {
            self.track_player(dt_seconds, graph, surface, projection, config);
        }

        self.reconciler.tick(
            dt_seconds,
            graph,
            surface,
            Some(self.layout.map_content),
            projection,
        );
        self.clock
            .tick(dt_seconds, graph, surface, self.layout.clock_text);
    }

    /// Resizes for `mode` and re-centres on the player without smoothing.
    pub(crate) fn set_display_mode<G, S>(
        &mut self,
        mode: DisplayMode,
        graph: &G,
        surface: &mut S,
        projection: &MapProjection,
        minimap_visible: bool,
    ) where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        self.mode = mode;
        self.layout.apply_mode(surface, mode, minimap_visible);
        if let Some(player) = self.player_node(graph) {
            let target = self.target_for(&player, projection);
            surface.set_anchored_position(self.layout.map_content, target);
        }
        info!(mode = ?mode, "display_mode_changed");
    }

    pub(crate) fn set_minimap_visible<S: OverlaySurface + ?Sized>(
        &self,
        surface: &mut S,
        visible: bool,
    ) {
        self.layout.set_minimap_visible(surface, self.mode, visible);
    }

    pub(crate) fn set_clock_visible<S: OverlaySurface + ?Sized>(&self, surface: &mut S, visible: bool) {
        self.layout.set_clock_visible(surface, visible);
    }

    pub(crate) fn teardown<S: OverlaySurface + ?Sized>(mut self, surface: &mut S) {
        self.reconciler.clear(surface);
        self.layout.destroy(surface);
        debug!("overlay_session_torn_down");
    }

    fn player_node<G: SceneGraph + ?Sized>(&self, graph: &G) -> Option<SceneNode> {
        self.scanner
            .resolved()
            .player
            .and_then(|player| graph.node(player))
    }

    fn target_for(&self, player: &SceneNode, projection: &MapProjection) -> Vec2 {
        let center = ModeGeometry::for_mode(self.mode).dynamic_center();
        projection.project(player.position, self.mode, center)
    }

    fn track_player<G, S>(
        &mut self,
        dt_seconds: f32,
        graph: &G,
        surface: &mut S,
        projection: &MapProjection,
        config: &MinimapConfig,
    ) where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        let Some(player) = self.player_node(graph) else {
            return;
        };
        let Some(current) = surface.anchored_position(self.layout.map_content) else {
            return;
        };
        let target = self.target_for(&player, projection);
        let next = smooth_toward(current, target, dt_seconds, config.timings.smoothing_rate);
        surface.set_anchored_position(self.layout.map_content, next);
        surface.set_anchored_position(
            self.layout.direction_indicator,
            direction_indicator_offset(player.yaw_degrees, config.direction_indicator_radius),
        );
    }

    fn on_scan_complete<G, S>(
        &mut self,
        report: &ScanReport,
        graph: &G,
        surface: &mut S,
        projection: &MapProjection,
        config: &MinimapConfig,
    ) where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        self.map_image = report
            .resolved
            .viewport
            .and_then(|viewport| borrow_map_image(graph, viewport));
        match self.map_image {
            Some(image) => {
                surface.set_image(self.layout.map_content, image);
                surface.set_enabled(self.layout.map_content, false);
                surface.set_enabled(self.layout.map_content, true);
                surface.set_visible(self.layout.grid, false);
                info!(image = image.0, "map_image_applied");
            }
            None => {
                self.layout.build_grid(surface);
                info!("map_image_unavailable_using_grid");
            }
        }

        if let Some(icon) = content_icon(graph, PLAYER_ICON_PATH) {
            surface.set_image(self.layout.player_marker, icon);
            surface.set_enabled(self.layout.player_marker, false);
            surface.set_enabled(self.layout.player_marker, true);
            debug!("player_marker_icon_applied");
        }

        self.place_landmarks(graph, surface, projection, &config.landmarks);
    }

    fn place_landmarks<G, S>(
        &mut self,
        graph: &G,
        surface: &mut S,
        projection: &MapProjection,
        landmarks: &[Landmark],
    ) where
        G: SceneGraph + ?Sized,
        S: OverlaySurface + ?Sized,
    {
        if !self.landmarks.is_empty() || !surface.is_alive(self.layout.map_content) {
            return;
        }
        let property_icon = content_icon(graph, PROPERTY_ICON_PATH);
        for landmark in landmarks {
            let position = projection.content_local(landmark.position, 0.0);
            let desc = landmark_desc(self.layout.map_content, landmark.style, property_icon)
                .with_anchor(Anchor::Center)
                .with_anchored_position(position);
            let id = surface.create(desc);
            self.landmarks.push(OverlayMarker {
                id,
                anchored_position: position,
                kind: MarkerKind::StaticLandmark,
            });
        }
        info!(count = self.landmarks.len(), "static_landmarks_placed");
    }
}

fn borrow_map_image<G: SceneGraph + ?Sized>(graph: &G, viewport: SceneHandle) -> Option<ImageRef> {
    match first_child_image(graph, viewport) {
        Ok(image) => image,
        Err(error) => {
            warn!(error = %error, "map_image_lookup_failed");
            None
        }
    }
}

fn content_icon<G: SceneGraph + ?Sized>(graph: &G, relative: &[&str]) -> Option<ImageRef> {
    let lookup = || -> Result<Option<ImageRef>, LocateError> {
        let Some(content) = graph.find(POI_CONTAINER_PATH)? else {
            return Ok(None);
        };
        Ok(graph
            .find_from(content, relative)?
            .and_then(|icon| graph.image(icon)))
    };
    match lookup() {
        Ok(icon) => icon,
        Err(error) => {
            debug!(error = %error, "content_icon_lookup_failed");
            None
        }
    }
}

fn landmark_desc(
    parent: PrimitiveId,
    style: LandmarkStyle,
    property_icon: Option<ImageRef>,
) -> PrimitiveDesc {
    let square = Vec2::new(LANDMARK_SQUARE_SIZE, LANDMARK_SQUARE_SIZE);
    match (style, property_icon) {
        (LandmarkStyle::Property, Some(icon)) => PrimitiveDesc::new(
            "StaticMarker_Property",
            Some(parent),
            PrimitiveKind::Image {
                image: Some(icon),
                color: PROPERTY_FALLBACK_COLOR,
            },
        )
        .with_scale(LANDMARK_ICON_SCALE),
        (LandmarkStyle::Property, None) => PrimitiveDesc::new(
            "StaticMarker_Property",
            Some(parent),
            PrimitiveKind::Panel {
                color: PROPERTY_FALLBACK_COLOR,
            },
        )
        .with_size(square),
        (LandmarkStyle::Waypoint, _) => PrimitiveDesc::new(
            "StaticMarker_Waypoint",
            Some(parent),
            PrimitiveKind::Panel {
                color: WAYPOINT_COLOR,
            },
        )
        .with_size(square),
    }
}
