//! Minimap overlay for a running host simulation.
//!
//! The host hands over its scene graph, an overlay primitive surface and a
//! per-frame input snapshot; [`OverlayController`] does the rest.

pub mod config;
pub mod geometry;
pub mod host;
pub mod input;
pub mod locator;
pub mod markers;
pub mod overlay;
pub mod projection;
pub mod scan;

pub use config::{Calibration, Landmark, LandmarkStyle, MinimapConfig, Timings};
pub use geometry::{DisplayMode, Vec2, Vec3};
pub use host::{
    Anchor, Color, ImageRef, LocateError, MemoryScene, MemorySurface, OverlaySurface,
    PrimitiveDesc, PrimitiveId, PrimitiveKind, PrimitiveRecord, SceneHandle, SceneNode,
};
pub use input::{InputAction, InputSnapshot};
pub use locator::{
    first_child_image, SceneGraph, CLOCK_PATH, MAP_APP_PATH, PLAYER_ICON_PATH, PLAYER_PATH,
    POI_CONTAINER_PATH, POI_ICON_CHILD, PROPERTY_ICON_PATH, VIEWPORT_PATH,
};
pub use markers::{MarkerKind, MarkerReconciler, OverlayMarker, ReconcileReport};
pub use overlay::{
    circle_texture, format_clock_text, ModeGeometry, OverlayController, OverlayLayout, Session,
};
pub use projection::{direction_indicator_offset, dynamic_center, smooth_toward, MapProjection};
pub use scan::{ResolutionScanner, ResolvedEntities, ScanPhase, ScanReport, ScanTarget};
