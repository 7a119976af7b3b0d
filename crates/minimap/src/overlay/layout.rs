use crate::geometry::{DisplayMode, Vec2};
use crate::host::{Anchor, Color, OverlaySurface, PrimitiveDesc, PrimitiveId, PrimitiveKind};
use crate::projection::dynamic_center;

use super::texture::circle_texture;

const FRAME_SIZE: f32 = 150.0;
const MASK_SIZE: f32 = 140.0;
const BORDER_SIZE: f32 = 150.0;
const DISPLAY_BOTTOM_INSET: f32 = 50.0;
const MAP_CONTENT_SIZE: f32 = 500.0;
const GRID_CELL_COUNT: i32 = 10;
const GRID_CELL_SIZE: f32 = 20.0;
const PLAYER_MARKER_SIZE: f32 = 5.0;
const DIRECTION_INDICATOR_SIZE: f32 = 6.0;
const CLOCK_SIZE: Vec2 = Vec2 { x: 100.0, y: 50.0 };

const MASK_COLOR: Color = [255, 255, 255, 255];
const BORDER_COLOR: Color = [0, 0, 0, 255];
const GRID_LINE_COLOR: Color = [77, 77, 77, 255];
const PLAYER_MARKER_COLOR: Color = [51, 153, 255, 255];
const DIRECTION_INDICATOR_COLOR: Color = [255, 255, 255, 255];
const CLOCK_BG_COLOR: Color = [51, 51, 51, 128];
const CLOCK_TEXT_COLOR: Color = [255, 255, 255, 255];

/// Sizes and anchors that change with the display mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeGeometry {
    pub frame_size: Vec2,
    pub frame_position: Vec2,
    pub display_bottom_inset: f32,
    pub mask_size: Vec2,
    pub border_size: Vec2,
    pub clock_position: Vec2,
}

impl ModeGeometry {
    pub fn for_mode(mode: DisplayMode) -> Self {
        let factor = mode.scale_factor();
        let (frame_position, clock_position) = match mode {
            DisplayMode::Normal => (Vec2::new(-20.0, -20.0), Vec2::new(0.0, 10.0)),
            DisplayMode::Double => (Vec2::new(-20.0, -60.0), Vec2::new(0.0, 40.0)),
        };
        Self {
            frame_size: Vec2::new(FRAME_SIZE, FRAME_SIZE) * factor,
            frame_position,
            display_bottom_inset: DISPLAY_BOTTOM_INSET * factor,
            mask_size: Vec2::new(MASK_SIZE, MASK_SIZE) * factor,
            border_size: Vec2::new(BORDER_SIZE, BORDER_SIZE) * factor,
            clock_position,
        }
    }

    pub fn dynamic_center(&self) -> Vec2 {
        dynamic_center(self.mask_size)
    }
}

/// Handles to every primitive the overlay owns. Destroying `root` destroys
/// the rest.
#[derive(Debug, Clone)]
pub struct OverlayLayout {
    pub root: PrimitiveId,
    pub frame: PrimitiveId,
    pub display: PrimitiveId,
    pub border: PrimitiveId,
    pub mask: PrimitiveId,
    pub map_content: PrimitiveId,
    pub grid: PrimitiveId,
    pub player_marker: PrimitiveId,
    pub direction_indicator: PrimitiveId,
    pub clock_container: PrimitiveId,
    pub clock_text: PrimitiveId,
    grid_lines: Vec<PrimitiveId>,
}

impl OverlayLayout {
    pub fn build<S: OverlaySurface + ?Sized>(surface: &mut S, mode: DisplayMode) -> Self {
        let geometry = ModeGeometry::for_mode(mode);
        let root = surface.create(PrimitiveDesc::new("MinimapContainer", None, PrimitiveKind::Group));
        let frame = surface.create(
            PrimitiveDesc::new("MinimapFrame", Some(root), PrimitiveKind::Group)
                .with_anchor(Anchor::TopRight)
                .with_size(geometry.frame_size)
                .with_anchored_position(geometry.frame_position),
        );
        let display = surface.create(
            PrimitiveDesc::new("MinimapDisplay", Some(frame), PrimitiveKind::Group).with_anchor(
                Anchor::StretchInsetBottom(geometry.display_bottom_inset as u32),
            ),
        );
        let border = surface.create(
            PrimitiveDesc::new(
                "MinimapBorder",
                Some(display),
                PrimitiveKind::Texture {
                    texture: circle_texture(BORDER_SIZE as u32, BORDER_COLOR),
                    clip_children: false,
                },
            )
            .with_size(geometry.border_size),
        );
        let mask = surface.create(
            PrimitiveDesc::new(
                "MinimapMask",
                Some(display),
                PrimitiveKind::Texture {
                    texture: circle_texture(MASK_SIZE as u32, MASK_COLOR),
                    clip_children: true,
                },
            )
            .with_size(geometry.mask_size),
        );
        let map_content = surface.create(
            PrimitiveDesc::new(
                "MapContent",
                Some(mask),
                PrimitiveKind::Image {
                    image: None,
                    color: [255, 255, 255, 255],
                },
            )
            .with_size(Vec2::new(MAP_CONTENT_SIZE, MAP_CONTENT_SIZE)),
        );
        let grid = surface.create(
            PrimitiveDesc::new("GridContainer", Some(map_content), PrimitiveKind::Group)
                .with_size(Vec2::new(MAP_CONTENT_SIZE, MAP_CONTENT_SIZE)),
        );
        let player_marker = surface.create(
            PrimitiveDesc::new(
                "PlayerMarker",
                Some(mask),
                PrimitiveKind::Image {
                    image: None,
                    color: PLAYER_MARKER_COLOR,
                },
            )
            .with_size(Vec2::new(PLAYER_MARKER_SIZE, PLAYER_MARKER_SIZE)),
        );
        let direction_indicator = surface.create(
            PrimitiveDesc::new(
                "DirectionIndicator",
                Some(player_marker),
                PrimitiveKind::Panel {
                    color: DIRECTION_INDICATOR_COLOR,
                },
            )
            .with_size(Vec2::new(DIRECTION_INDICATOR_SIZE, DIRECTION_INDICATOR_SIZE)),
        );
        let clock_container = surface.create(
            PrimitiveDesc::new(
                "MinimapTimeContainer",
                Some(frame),
                PrimitiveKind::Panel {
                    color: CLOCK_BG_COLOR,
                },
            )
            .with_anchor(Anchor::BottomCenter)
            .with_size(CLOCK_SIZE)
            .with_anchored_position(geometry.clock_position),
        );
        let clock_text = surface.create(
            PrimitiveDesc::new(
                "MinimapTime",
                Some(clock_container),
                PrimitiveKind::Text {
                    text: "Time".to_string(),
                    color: CLOCK_TEXT_COLOR,
                },
            )
            .with_size(CLOCK_SIZE),
        );

        Self {
            root,
            frame,
            display,
            border,
            mask,
            map_content,
            grid,
            player_marker,
            direction_indicator,
            clock_container,
            clock_text,
            grid_lines: Vec::new(),
        }
    }

    /// Resizes everything for `mode`. The clock follows the minimap only
    /// while the minimap is shown.
    pub fn apply_mode<S: OverlaySurface + ?Sized>(
        &self,
        surface: &mut S,
        mode: DisplayMode,
        minimap_visible: bool,
    ) {
        let geometry = ModeGeometry::for_mode(mode);
        surface.set_size(self.frame, geometry.frame_size);
        surface.set_anchored_position(self.frame, geometry.frame_position);
        surface.set_anchor(
            self.display,
            Anchor::StretchInsetBottom(geometry.display_bottom_inset as u32),
        );
        surface.set_size(self.mask, geometry.mask_size);
        surface.set_size(self.border, geometry.border_size);
        self.place_clock(surface, mode, minimap_visible);
    }

    pub fn set_minimap_visible<S: OverlaySurface + ?Sized>(
        &self,
        surface: &mut S,
        mode: DisplayMode,
        visible: bool,
    ) {
        surface.set_visible(self.display, visible);
        self.place_clock(surface, mode, visible);
    }

    pub fn set_clock_visible<S: OverlaySurface + ?Sized>(&self, surface: &mut S, visible: bool) {
        surface.set_visible(self.clock_container, visible);
    }

    pub fn grid_built(&self) -> bool {
        !self.grid_lines.is_empty()
    }

    /// Fallback backdrop for when no map image could be borrowed from the
    /// host. Builds once.
    pub fn build_grid<S: OverlaySurface + ?Sized>(&mut self, surface: &mut S) {
        if self.grid_built() {
            return;
        }
        let span = GRID_CELL_COUNT as f32 * GRID_CELL_SIZE;
        for i in 0..=GRID_CELL_COUNT {
            let offset = (i - GRID_CELL_COUNT / 2) as f32 * GRID_CELL_SIZE;
            let horizontal = surface.create(
                PrimitiveDesc::new(
                    format!("HLine_{i}"),
                    Some(self.grid),
                    PrimitiveKind::Panel {
                        color: GRID_LINE_COLOR,
                    },
                )
                .with_size(Vec2::new(span, 1.0))
                .with_anchored_position(Vec2::new(0.0, offset)),
            );
            let vertical = surface.create(
                PrimitiveDesc::new(
                    format!("VLine_{i}"),
                    Some(self.grid),
                    PrimitiveKind::Panel {
                        color: GRID_LINE_COLOR,
                    },
                )
                .with_size(Vec2::new(1.0, span))
                .with_anchored_position(Vec2::new(offset, 0.0)),
            );
            self.grid_lines.push(horizontal);
            self.grid_lines.push(vertical);
        }
        surface.set_visible(self.grid, true);
    }

    pub fn destroy<S: OverlaySurface + ?Sized>(self, surface: &mut S) {
        surface.destroy(self.root);
    }

    fn place_clock<S: OverlaySurface + ?Sized>(
        &self,
        surface: &mut S,
        mode: DisplayMode,
        minimap_visible: bool,
    ) {
        if minimap_visible {
            surface.set_anchor(self.clock_container, Anchor::BottomCenter);
            surface.set_anchored_position(
                self.clock_container,
                ModeGeometry::for_mode(mode).clock_position,
            );
        } else {
            surface.set_anchor(self.clock_container, Anchor::TopRight);
            surface.set_anchored_position(self.clock_container, Vec2::ZERO);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemorySurface;

    #[test]
    fn double_mode_doubles_mask_and_center() {
        let normal = ModeGeometry::for_mode(DisplayMode::Normal);
        let double = ModeGeometry::for_mode(DisplayMode::Double);

        assert_eq!(normal.mask_size, Vec2::new(140.0, 140.0));
        assert_eq!(normal.dynamic_center(), Vec2::new(70.0, 70.0));
        assert_eq!(double.mask_size, Vec2::new(280.0, 280.0));
        assert_eq!(double.dynamic_center(), Vec2::new(140.0, 140.0));
        assert_eq!(double.frame_position, Vec2::new(-20.0, -60.0));
    }

    #[test]
    fn build_creates_the_primitive_tree() {
        let mut surface = MemorySurface::new();
        let layout = OverlayLayout::build(&mut surface, DisplayMode::Normal);

        assert_eq!(surface.alive_count(), 11);
        assert_eq!(surface.children_of(layout.mask), vec![layout.map_content, layout.player_marker]);
        assert!(!layout.grid_built());
    }

    #[test]
    fn grid_has_eleven_lines_each_way_and_builds_once() {
        let mut surface = MemorySurface::new();
        let mut layout = OverlayLayout::build(&mut surface, DisplayMode::Normal);

        layout.build_grid(&mut surface);
        layout.build_grid(&mut surface);

        assert_eq!(surface.children_of(layout.grid).len(), 22);
        let top = surface.find_by_name("HLine_10");
        assert_eq!(
            surface.anchored_position(top[0]),
            Some(Vec2::new(0.0, 100.0))
        );
    }

    #[test]
    fn apply_mode_resizes_mask_border_and_frame() {
        let mut surface = MemorySurface::new();
        let layout = OverlayLayout::build(&mut surface, DisplayMode::Normal);

        layout.apply_mode(&mut surface, DisplayMode::Double, true);

        let size_of = |id| surface.record(id).expect("record").desc.size;
        assert_eq!(size_of(layout.mask), Vec2::new(280.0, 280.0));
        assert_eq!(size_of(layout.border), Vec2::new(300.0, 300.0));
        assert_eq!(size_of(layout.frame), Vec2::new(300.0, 300.0));
        assert_eq!(
            surface.anchored_position(layout.clock_container),
            Some(Vec2::new(0.0, 40.0))
        );
    }

    #[test]
    fn hiding_minimap_moves_clock_to_corner() {
        let mut surface = MemorySurface::new();
        let layout = OverlayLayout::build(&mut surface, DisplayMode::Normal);

        layout.set_minimap_visible(&mut surface, DisplayMode::Normal, false);

        let clock = surface.record(layout.clock_container).expect("clock");
        assert_eq!(clock.desc.anchor, Anchor::TopRight);
        assert_eq!(clock.desc.anchored_position, Vec2::ZERO);
        assert!(!surface.record(layout.display).expect("display").visible);
    }

    #[test]
    fn destroy_removes_everything() {
        let mut surface = MemorySurface::new();
        let mut layout = OverlayLayout::build(&mut surface, DisplayMode::Double);
        layout.build_grid(&mut surface);

        layout.destroy(&mut surface);

        assert_eq!(surface.alive_count(), 0);
    }
}
