//! Capabilities the overlay consumes from the host: scene-graph queries and
//! a surface for placing overlay primitives.

mod memory;

use image::RgbaImage;
use thiserror::Error;

use crate::geometry::{Vec2, Vec3};

pub use memory::{MemoryScene, MemorySurface, PrimitiveRecord};

/// Non-owning reference to a host scene node. The node can be destroyed at
/// any time; resolve it through [`crate::SceneGraph::node`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("host scene query for '{segment}' failed: {reason}")]
    HostFault { segment: String, reason: String },
}

pub type Color = [u8; 4];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    Center,
    TopRight,
    BottomCenter,
    /// Fills the parent, inset from the bottom edge by the given amount.
    StretchInsetBottom(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveKind {
    Group,
    Panel { color: Color },
    /// Software-rendered sprite. `clip_children` turns it into a mask.
    Texture {
        texture: RgbaImage,
        clip_children: bool,
    },
    Image {
        image: Option<ImageRef>,
        color: Color,
    },
    Text { text: String, color: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveDesc {
    pub name: String,
    pub parent: Option<PrimitiveId>,
    pub kind: PrimitiveKind,
    pub anchor: Anchor,
    pub size: Vec2,
    pub anchored_position: Vec2,
    pub scale: f32,
}

impl PrimitiveDesc {
    pub fn new(name: impl Into<String>, parent: Option<PrimitiveId>, kind: PrimitiveKind) -> Self {
        Self {
            name: name.into(),
            parent,
            kind,
            anchor: Anchor::Center,
            size: Vec2::ZERO,
            anchored_position: Vec2::ZERO,
            scale: 1.0,
        }
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_anchored_position(mut self, anchored_position: Vec2) -> Self {
        self.anchored_position = anchored_position;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Placement surface for overlay primitives. Calls on a dead id are no-ops;
/// destroying a primitive destroys its children.
pub trait OverlaySurface {
    fn create(&mut self, desc: PrimitiveDesc) -> PrimitiveId;
    fn destroy(&mut self, id: PrimitiveId);
    fn is_alive(&self, id: PrimitiveId) -> bool;
    fn anchored_position(&self, id: PrimitiveId) -> Option<Vec2>;
    fn set_anchored_position(&mut self, id: PrimitiveId, position: Vec2);
    fn set_size(&mut self, id: PrimitiveId, size: Vec2);
    fn set_anchor(&mut self, id: PrimitiveId, anchor: Anchor);
    fn set_visible(&mut self, id: PrimitiveId, visible: bool);
    fn set_image(&mut self, id: PrimitiveId, image: ImageRef);
    /// Host image components only pick up a new reference on an
    /// enabled=false then enabled=true transition.
    fn set_enabled(&mut self, id: PrimitiveId, enabled: bool);
    fn set_text(&mut self, id: PrimitiveId, text: &str);
}
